use alloc::{sync::Arc, vec::Vec};
use core::{
    any::type_name,
    fmt::{self, Display, Formatter},
};
use tracing::debug;

use crate::{errors::ResolveErrorKind, key::Key, value::Accessor, Container, Value};

/// Custom resolution strategy used through [`Resolver::Custom`].
///
/// The default body is the abstract-method guard: a strategy that doesn't
/// override [`Resolve::resolve`] fails with [`ResolveErrorKind::UnimplementedStrategy`].
pub trait Resolve: Send + Sync {
    #[allow(clippy::missing_errors_doc)]
    fn resolve(&self, _container: &Container) -> Result<Value, ResolveErrorKind> {
        Err(ResolveErrorKind::UnimplementedStrategy {
            strategy: type_name::<Self>(),
            method: "resolve",
        })
    }
}

/// Key-shaped strategy that replaces the registry lookup for a single dependency slot.
///
/// A resolver is used by wrapping it into a [`Key`]; [`Container::get`] hands such keys
/// to [`Resolver::resolve`] and never touches the registry for them.
#[derive(Clone)]
pub enum Resolver {
    /// Yields an [`Accessor`] that resolves the key when called
    Lazy(Key),
    /// Yields every registered instance for the key, in registration order
    All(Key),
    /// Yields the instance only if a handler is registered, otherwise [`Value::Null`].
    /// Never auto-registers.
    Optional { key: Key, check_parent: bool },
    /// Resolves from the parent container, [`Value::Null`] for a root
    Parent(Key),
    /// Invokes the component declared for the key on every resolution, bypassing the registry
    NewInstance(Key),
    Custom(Arc<dyn Resolve>),
}

impl Resolver {
    #[inline]
    #[must_use]
    pub fn lazy(key: impl Into<Key>) -> Self {
        Self::Lazy(key.into())
    }

    #[inline]
    #[must_use]
    pub fn all(key: impl Into<Key>) -> Self {
        Self::All(key.into())
    }

    #[inline]
    #[must_use]
    pub fn optional(key: impl Into<Key>, check_parent: bool) -> Self {
        Self::Optional {
            key: key.into(),
            check_parent,
        }
    }

    #[inline]
    #[must_use]
    pub fn parent(key: impl Into<Key>) -> Self {
        Self::Parent(key.into())
    }

    #[inline]
    #[must_use]
    pub fn new_instance(key: impl Into<Key>) -> Self {
        Self::NewInstance(key.into())
    }

    #[inline]
    #[must_use]
    pub fn custom(resolver: impl Resolve + 'static) -> Self {
        Self::Custom(Arc::new(resolver))
    }

    /// Key the resolver wraps, if any
    #[must_use]
    pub fn key(&self) -> Option<&Key> {
        match self {
            Resolver::Lazy(key)
            | Resolver::All(key)
            | Resolver::Optional { key, .. }
            | Resolver::Parent(key)
            | Resolver::NewInstance(key) => Some(key),
            Resolver::Custom(_) => None,
        }
    }

    #[allow(clippy::missing_errors_doc)]
    pub fn resolve(&self, container: &Container) -> Result<Value, ResolveErrorKind> {
        match self {
            Resolver::Lazy(key) => Ok(Value::Accessor(Accessor::new(container.detached(), key.clone()))),
            Resolver::All(key) => container.get_all(key).map(Value::Sequence),
            Resolver::Optional { key, check_parent } => {
                if container.has_handler(key, *check_parent) {
                    container.get(key)
                } else {
                    debug!("Optional dependency isn't registered");
                    Ok(Value::Null)
                }
            }
            Resolver::Parent(key) => match container.parent() {
                Some(parent) => parent.get(key),
                None => {
                    debug!("No parent container");
                    Ok(Value::Null)
                }
            },
            Resolver::NewInstance(key) => {
                let component = container.component_for(key)?;
                container.invoke(&component)
            }
            Resolver::Custom(resolver) => resolver.resolve(container),
        }
    }
}

impl Display for Resolver {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Resolver::Lazy(key) => write!(f, "Lazy({key})"),
            Resolver::All(key) => write!(f, "All({key})"),
            Resolver::Optional { key, check_parent } => write!(f, "Optional({key}, check_parent: {check_parent})"),
            Resolver::Parent(key) => write!(f, "Parent({key})"),
            Resolver::NewInstance(key) => write!(f, "NewInstance({key})"),
            Resolver::Custom(_) => f.write_str("Custom"),
        }
    }
}

pub(crate) fn sequence_of<T>(values: Vec<Value>) -> Result<Vec<Arc<T>>, Value>
where
    T: Send + Sync + 'static,
{
    values.into_iter().map(Value::downcast::<T>).collect()
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::sync::Arc;
    use core::sync::atomic::{AtomicU8, Ordering};
    use tracing_test::traced_test;

    use super::{Resolve, Resolver};
    use crate::{Component, Container, Key, Metadata, ResolveErrorKind, Value};

    struct Logger;

    struct Plugin(u8);

    #[test]
    #[traced_test]
    fn test_lazy_resolves_at_call_time() {
        let container = Container::default();
        let key = Key::from(Resolver::lazy(Key::token("plugin")));

        let Value::Accessor(accessor) = container.get(&key).unwrap() else {
            panic!("Lazy resolver should give an accessor");
        };
        container.register_instance(Key::token("plugin"), Plugin(1));

        let plugin = accessor.get().unwrap().downcast::<Plugin>().unwrap();
        assert_eq!(plugin.0, 1);
        assert_eq!(accessor.key(), &Key::token("plugin"));
    }

    #[test]
    #[traced_test]
    fn test_all_keeps_registration_order() {
        let container = Container::default();
        for index in 0..3 {
            container.register_instance(Key::token("plugin"), Plugin(index));
        }

        let Value::Sequence(values) = container.get(&Resolver::all(Key::token("plugin")).into()).unwrap() else {
            panic!("All resolver should give a sequence");
        };
        let plugins = super::sequence_of::<Plugin>(values).unwrap();

        assert_eq!(plugins.iter().map(|plugin| plugin.0).collect::<alloc::vec::Vec<_>>(), [0, 1, 2]);
    }

    #[test]
    #[traced_test]
    fn test_optional_checks_parent_only_when_asked() {
        let instantiator_call_count = Arc::new(AtomicU8::new(0));
        let parent = Container::new(Metadata::new().component(Component::new({
            let instantiator_call_count = instantiator_call_count.clone();
            move || {
                instantiator_call_count.fetch_add(1, Ordering::SeqCst);
                Ok(Logger)
            }
        })));
        parent.register_singleton(Key::of::<Logger>(), None).unwrap();
        let child = parent.create_child();

        let local_only = child.get(&Resolver::optional(Key::of::<Logger>(), false).into()).unwrap();
        let with_parent = child.get(&Resolver::optional(Key::of::<Logger>(), true).into()).unwrap();

        assert!(local_only.is_null());
        assert!(with_parent.downcast::<Logger>().is_ok());
        // Optional never auto-registers
        assert!(!child.has_handler(&Key::of::<Logger>(), false));
        assert_eq!(instantiator_call_count.load(Ordering::SeqCst), 1);
    }

    #[test]
    #[traced_test]
    fn test_parent_skips_local_registration() {
        let parent = Container::default();
        parent.register_instance(Key::token("plugin"), Plugin(1));
        let child = parent.create_child();
        child.register_instance(Key::token("plugin"), Plugin(2));

        let key = Key::from(Resolver::parent(Key::token("plugin")));

        assert_eq!(child.get(&key).unwrap().downcast::<Plugin>().unwrap().0, 1);
        assert_eq!(child.resolve_key::<Plugin>(&Key::token("plugin")).unwrap().0, 2);
        assert!(parent.get(&key).unwrap().is_null());
    }

    #[test]
    #[traced_test]
    fn test_new_instance_bypasses_registry() {
        let container = Container::new(Metadata::new().component(Component::new(|| Ok(Logger))));
        let key = Key::from(Resolver::new_instance(Key::of::<Logger>()));

        let first = container.get(&key).unwrap();
        let second = container.get(&key).unwrap();

        assert!(!first.same_instance(&second));
        assert!(!container.has_handler(&Key::of::<Logger>(), true));
        assert!(matches!(
            container.get(&Resolver::new_instance(Key::token("logger")).into()),
            Err(ResolveErrorKind::InvalidKey { .. })
        ));
    }

    #[test]
    #[traced_test]
    fn test_custom_resolver() {
        struct Unfinished;

        impl Resolve for Unfinished {}

        struct Constant;

        impl Resolve for Constant {
            fn resolve(&self, _container: &Container) -> Result<Value, ResolveErrorKind> {
                Ok(Value::instance(Plugin(42)))
            }
        }

        let container = Container::default();

        assert!(matches!(
            container.get(&Resolver::custom(Unfinished).into()),
            Err(ResolveErrorKind::UnimplementedStrategy { method: "resolve", .. })
        ));
        assert_eq!(
            container
                .get(&Resolver::custom(Constant).into())
                .unwrap()
                .downcast::<Plugin>()
                .unwrap()
                .0,
            42
        );
    }
}
