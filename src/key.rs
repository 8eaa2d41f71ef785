use alloc::{borrow::Cow, string::String, sync::Arc};
use core::{
    any::TypeId,
    cmp::Ordering,
    fmt::{self, Debug, Display, Formatter},
};

use crate::{any::TypeInfo, resolver::Resolver, Container};

/// Registry index identifying a dependency.
///
/// Keys compare by identity: type keys by [`TypeId`], tokens by their text
/// and resolver keys by the allocation that holds the resolver, so two
/// separately built resolvers are never equal even if they wrap the same key.
#[derive(Clone)]
pub enum Key {
    Type(TypeInfo),
    Token(Cow<'static, str>),
    Resolver(Arc<Resolver>),
}

#[derive(PartialEq, Eq, PartialOrd, Ord)]
enum Identity<'a> {
    Type(TypeId),
    Token(&'a str),
    Resolver(usize),
}

impl Key {
    #[inline]
    #[must_use]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::Type(TypeInfo::of::<T>())
    }

    #[inline]
    #[must_use]
    pub fn token(name: impl Into<Cow<'static, str>>) -> Self {
        Self::Token(name.into())
    }

    #[inline]
    #[must_use]
    pub fn type_info(&self) -> Option<&TypeInfo> {
        match self {
            Key::Type(type_info) => Some(type_info),
            Key::Token(_) | Key::Resolver(_) => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_resolver(&self) -> Option<&Resolver> {
        match self {
            Key::Resolver(resolver) => Some(resolver),
            Key::Type(_) | Key::Token(_) => None,
        }
    }

    /// `true` for the key the container answers with itself
    #[inline]
    #[must_use]
    pub fn is_container(&self) -> bool {
        matches!(self, Key::Type(type_info) if type_info.id == TypeId::of::<Container>())
    }

    fn identity(&self) -> Identity<'_> {
        match self {
            Key::Type(type_info) => Identity::Type(type_info.id),
            Key::Token(name) => Identity::Token(name),
            Key::Resolver(resolver) => Identity::Resolver(Arc::as_ptr(resolver) as usize),
        }
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}

impl Eq for Key {}

impl PartialOrd for Key {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Key {
    fn cmp(&self, other: &Self) -> Ordering {
        self.identity().cmp(&other.identity())
    }
}

impl From<TypeInfo> for Key {
    fn from(type_info: TypeInfo) -> Self {
        Self::Type(type_info)
    }
}

impl From<Resolver> for Key {
    fn from(resolver: Resolver) -> Self {
        Self::Resolver(Arc::new(resolver))
    }
}

impl From<&'static str> for Key {
    fn from(name: &'static str) -> Self {
        Self::Token(Cow::Borrowed(name))
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Self::Token(Cow::Owned(name))
    }
}

impl Display for Key {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Key::Type(type_info) => f.write_str(type_info.name),
            Key::Token(name) => write!(f, "\"{name}\""),
            Key::Resolver(resolver) => Display::fmt(resolver, f),
        }
    }
}

impl Debug for Key {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Key::Type(type_info) => f.debug_tuple("Type").field(&type_info.name).finish(),
            Key::Token(name) => f.debug_tuple("Token").field(name).finish(),
            Key::Resolver(resolver) => f.debug_tuple("Resolver").field(&format_args!("{resolver}")).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::{collections::BTreeMap, string::ToString as _};

    use super::Key;
    use crate::{resolver::Resolver, Container};

    struct Logger;

    #[test]
    fn test_identity() {
        assert_eq!(Key::of::<Logger>(), Key::of::<Logger>());
        assert_eq!(Key::token("api-url"), Key::from(alloc::string::String::from("api-url")));
        assert_ne!(Key::of::<Logger>(), Key::token("Logger"));

        let lazy = Key::from(Resolver::lazy(Key::of::<Logger>()));
        assert_eq!(lazy, lazy.clone());
        assert_ne!(lazy, Key::from(Resolver::lazy(Key::of::<Logger>())));
    }

    #[test]
    fn test_usable_as_map_key() {
        let mut map = BTreeMap::new();
        map.insert(Key::of::<Logger>(), 1);
        map.insert(Key::token("logger"), 2);
        map.insert(Key::of::<Logger>(), 3);

        assert_eq!(map.len(), 2);
        assert_eq!(map[&Key::of::<Logger>()], 3);
    }

    #[test]
    fn test_container_sentinel() {
        assert!(Key::of::<Container>().is_container());
        assert!(!Key::of::<Logger>().is_container());
        assert!(!Key::token("container").is_container());
    }

    #[test]
    fn test_display() {
        assert_eq!(Key::token("api-url").to_string(), "\"api-url\"");
        assert_eq!(Key::of::<u8>().to_string(), "u8");
        assert_eq!(Key::from(Resolver::all(Key::of::<u8>())).to_string(), "All(u8)");
    }
}
