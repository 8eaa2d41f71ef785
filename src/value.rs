use alloc::{sync::Arc, vec::Vec};
use core::fmt::{self, Debug, Formatter};

use crate::{any::Instance, errors::ResolveErrorKind, key::Key, Container};

/// Result of a resolution.
///
/// Plain registrations produce [`Value::Instance`]; the other variants come
/// from resolver keys (`All`, `Lazy`, `Optional`/`Parent`).
#[derive(Clone)]
pub enum Value {
    Instance(Instance),
    Sequence(Vec<Value>),
    Accessor(Accessor),
    Null,
}

impl Value {
    #[inline]
    #[must_use]
    pub fn instance<T: Send + Sync + 'static>(value: T) -> Self {
        Self::Instance(Arc::new(value))
    }

    #[inline]
    #[must_use]
    pub fn from_arc<T: Send + Sync + 'static>(value: Arc<T>) -> Self {
        Self::Instance(value)
    }

    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Value::Instance(_) => "instance",
            Value::Sequence(_) => "sequence",
            Value::Accessor(_) => "accessor",
            Value::Null => "null",
        }
    }

    /// Downcasts an instance to a concrete type, giving the value back on mismatch
    #[allow(clippy::missing_errors_doc)]
    pub fn downcast<T: Send + Sync + 'static>(self) -> Result<Arc<T>, Value> {
        match self {
            Value::Instance(instance) => instance.downcast::<T>().map_err(Value::Instance),
            value => Err(value),
        }
    }

    /// `true` if both are the very same instance
    #[must_use]
    pub fn same_instance(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Instance(left), Value::Instance(right)) => Arc::ptr_eq(left, right),
            _ => false,
        }
    }

    #[must_use]
    pub(crate) fn found(&self) -> &'static str {
        match self {
            Value::Instance(_) => "instance of another type",
            value => value.kind(),
        }
    }
}

impl Debug for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::Instance(_) => f.write_str("Instance(..)"),
            Value::Sequence(values) => f.debug_tuple("Sequence").field(values).finish(),
            Value::Accessor(accessor) => f.debug_tuple("Accessor").field(&accessor.key).finish(),
            Value::Null => f.write_str("Null"),
        }
    }
}

/// Deferred lookup of a key, handed out by the `Lazy` resolver.
/// Each [`Accessor::get`] resolves the key again at call time.
#[derive(Clone)]
pub struct Accessor {
    container: Container,
    key: Key,
}

impl Accessor {
    #[inline]
    #[must_use]
    pub(crate) fn new(container: Container, key: Key) -> Self {
        Self { container, key }
    }

    #[inline]
    #[must_use]
    pub fn key(&self) -> &Key {
        &self.key
    }

    #[allow(clippy::missing_errors_doc)]
    pub fn get(&self) -> Result<Value, ResolveErrorKind> {
        self.container.get(&self.key)
    }
}
