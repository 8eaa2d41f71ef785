use core::any::type_name;

use crate::{component::Component, errors::ResolveErrorKind, key::Key, Container};

/// Lifetime strategy consulted once, when [`Container::auto_register`] enters a type into the registry.
///
/// The default body is the abstract-method guard: a strategy that doesn't
/// override [`Registration::register`] fails with [`ResolveErrorKind::UnimplementedStrategy`].
/// An implementation returns the key it registered the component under.
pub trait Registration: Send + Sync {
    #[allow(clippy::missing_errors_doc)]
    fn register(&self, _container: &Container, _key: Key, _component: Component) -> Result<Key, ResolveErrorKind> {
        Err(ResolveErrorKind::UnimplementedStrategy {
            strategy: type_name::<Self>(),
            method: "register",
        })
    }
}

/// Registers a handler that invokes the component on every resolution
#[derive(Debug, Clone, Default)]
pub struct Transient {
    key: Option<Key>,
}

impl Transient {
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self { key: None }
    }

    /// Registers under `key` instead of the key being auto-registered
    #[inline]
    #[must_use]
    pub fn with_key(key: impl Into<Key>) -> Self {
        Self { key: Some(key.into()) }
    }
}

impl Registration for Transient {
    fn register(&self, container: &Container, key: Key, component: Component) -> Result<Key, ResolveErrorKind> {
        let key = self.key.clone().unwrap_or(key);
        container.register_transient(key.clone(), Some(component))?;
        Ok(key)
    }
}

/// Registers a handler that invokes the component once and then reuses the instance
#[derive(Debug, Clone, Default)]
pub struct Singleton {
    key: Option<Key>,
}

impl Singleton {
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self { key: None }
    }

    /// Registers under `key` instead of the key being auto-registered
    #[inline]
    #[must_use]
    pub fn with_key(key: impl Into<Key>) -> Self {
        Self { key: Some(key.into()) }
    }
}

impl Registration for Singleton {
    fn register(&self, container: &Container, key: Key, component: Component) -> Result<Key, ResolveErrorKind> {
        let key = self.key.clone().unwrap_or(key);
        container.register_singleton(key.clone(), Some(component))?;
        Ok(key)
    }
}
