use alloc::{boxed::Box, sync::Arc};
use core::{
    any::{type_name, Any, TypeId},
    cmp::Ordering,
    fmt::{self, Display, Formatter},
};

/// Shared, type-erased instance produced by the container
pub type Instance = Arc<dyn Any + Send + Sync>;

pub(crate) type BoxedAny = Box<dyn Any + Send + Sync>;

#[derive(Debug, Clone, Copy)]
pub struct TypeInfo {
    pub name: &'static str,
    pub id: TypeId,
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeInfo {}

impl PartialOrd for TypeInfo {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TypeInfo {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl Display for TypeInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl TypeInfo {
    #[inline]
    #[must_use]
    pub fn of<T>() -> Self
    where
        T: ?Sized + 'static,
    {
        Self {
            name: type_name::<T>(),
            id: TypeId::of::<T>(),
        }
    }

    #[inline]
    #[must_use]
    pub fn short_name(&self) -> &'static str {
        self.name.rsplit_once("::").map_or(self.name, |(_, name)| name)
    }
}

#[cfg(test)]
mod tests {
    use super::TypeInfo;

    mod nested {
        pub struct Logger;
    }

    #[test]
    fn test_identity_ignores_name() {
        let info = TypeInfo::of::<nested::Logger>();
        let renamed = TypeInfo {
            name: "Logger",
            ..info
        };

        assert_eq!(info, renamed);
        assert_ne!(info, TypeInfo::of::<u8>());
    }

    #[test]
    fn test_short_name() {
        assert_eq!(TypeInfo::of::<nested::Logger>().short_name(), "Logger");
        assert_eq!(TypeInfo::of::<u8>().short_name(), "u8");
    }
}
