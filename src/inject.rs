use alloc::{sync::Arc, vec::Vec};
use core::{any::type_name, marker::PhantomData};

use crate::{
    dependency_resolver::{Arguments, DependencyResolver},
    errors::{InstantiateErrorKind, ResolveErrorKind},
    key::Key,
    resolver::{sequence_of, Resolver},
    value::Accessor,
    Value,
};

fn incorrect_argument<Dep>(index: usize, value: &Value) -> InstantiateErrorKind {
    InstantiateErrorKind::IncorrectArgumentType {
        index,
        expected: type_name::<Dep>(),
        found: value.found(),
    }
}

fn take_instance<Dep: Send + Sync + 'static>(arguments: &mut Arguments) -> Result<Arc<Dep>, InstantiateErrorKind> {
    let (index, value) = arguments.next_value()?;
    value.downcast().map_err(|value| incorrect_argument::<Dep>(index, &value))
}

fn take_optional<Dep: Send + Sync + 'static>(arguments: &mut Arguments) -> Result<Option<Arc<Dep>>, InstantiateErrorKind> {
    let (index, value) = arguments.next_value()?;
    match value {
        Value::Null => Ok(None),
        value => value
            .downcast()
            .map(Some)
            .map_err(|value| incorrect_argument::<Dep>(index, &value)),
    }
}

/// Dependency resolved through the plain key of `Dep`
pub struct Inject<Dep>(pub Arc<Dep>);

impl<Dep: Send + Sync + 'static> DependencyResolver for Inject<Dep> {
    fn keys(keys: &mut Vec<Key>) {
        keys.push(Key::of::<Dep>());
    }

    fn resolve(arguments: &mut Arguments) -> Result<Self, InstantiateErrorKind> {
        take_instance(arguments).map(Self)
    }
}

/// Every instance registered for `Dep`, through the `All` resolver
pub struct InjectAll<Dep>(pub Vec<Arc<Dep>>);

impl<Dep: Send + Sync + 'static> DependencyResolver for InjectAll<Dep> {
    fn keys(keys: &mut Vec<Key>) {
        keys.push(Resolver::all(Key::of::<Dep>()).into());
    }

    fn resolve(arguments: &mut Arguments) -> Result<Self, InstantiateErrorKind> {
        let (index, value) = arguments.next_value()?;
        match value {
            Value::Sequence(values) => sequence_of(values)
                .map(Self)
                .map_err(|value| incorrect_argument::<Dep>(index, &value)),
            value => Err(incorrect_argument::<Vec<Arc<Dep>>>(index, &value)),
        }
    }
}

/// Deferred `Dep`, through the `Lazy` resolver
pub struct InjectLazy<Dep>(pub Deferred<Dep>);

impl<Dep: Send + Sync + 'static> DependencyResolver for InjectLazy<Dep> {
    fn keys(keys: &mut Vec<Key>) {
        keys.push(Resolver::lazy(Key::of::<Dep>()).into());
    }

    fn resolve(arguments: &mut Arguments) -> Result<Self, InstantiateErrorKind> {
        let (index, value) = arguments.next_value()?;
        match value {
            Value::Accessor(accessor) => Ok(Self(Deferred {
                accessor,
                _marker: PhantomData,
            })),
            value => Err(incorrect_argument::<Deferred<Dep>>(index, &value)),
        }
    }
}

/// `Dep` if it's registered in the resolving container itself, through the `Optional` resolver
pub struct InjectOptional<Dep>(pub Option<Arc<Dep>>);

impl<Dep: Send + Sync + 'static> DependencyResolver for InjectOptional<Dep> {
    fn keys(keys: &mut Vec<Key>) {
        keys.push(Resolver::optional(Key::of::<Dep>(), false).into());
    }

    fn resolve(arguments: &mut Arguments) -> Result<Self, InstantiateErrorKind> {
        take_optional(arguments).map(Self)
    }
}

/// `Dep` from the parent container, through the `Parent` resolver
pub struct InjectParent<Dep>(pub Option<Arc<Dep>>);

impl<Dep: Send + Sync + 'static> DependencyResolver for InjectParent<Dep> {
    fn keys(keys: &mut Vec<Key>) {
        keys.push(Resolver::parent(Key::of::<Dep>()).into());
    }

    fn resolve(arguments: &mut Arguments) -> Result<Self, InstantiateErrorKind> {
        take_optional(arguments).map(Self)
    }
}

/// Argument supplied by the caller of [`crate::Container::invoke_with`].
/// It declares no key, so it must come after every key-declaring parameter.
pub struct Dynamic<T>(pub Arc<T>);

impl<T: Send + Sync + 'static> DependencyResolver for Dynamic<T> {
    fn keys(_keys: &mut Vec<Key>) {}

    fn resolve(arguments: &mut Arguments) -> Result<Self, InstantiateErrorKind> {
        take_instance(arguments).map(Self)
    }
}

/// Typed view over an [`Accessor`]
pub struct Deferred<Dep> {
    accessor: Accessor,
    _marker: PhantomData<fn() -> Dep>,
}

impl<Dep: Send + Sync + 'static> Deferred<Dep> {
    /// Resolves `Dep` now
    #[allow(clippy::missing_errors_doc)]
    pub fn get(&self) -> Result<Arc<Dep>, ResolveErrorKind> {
        self.accessor.get()?.downcast().map_err(|value| ResolveErrorKind::IncorrectType {
            expected: type_name::<Dep>(),
            found: value.found(),
        })
    }
}

impl<Dep> Clone for Deferred<Dep> {
    fn clone(&self) -> Self {
        Self {
            accessor: self.accessor.clone(),
            _marker: PhantomData,
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::{sync::Arc, vec};
    use tracing_test::traced_test;

    use super::{Inject, InjectAll, InjectLazy, InjectOptional, InjectParent};
    use crate::{Component, Container, InstantiateErrorKind, Key, Metadata, ResolveErrorKind};

    #[derive(Debug)]
    struct Logger;

    struct Plugin(u8);

    #[test]
    #[traced_test]
    fn test_extractors_through_container() {
        struct Host {
            logger: Arc<Logger>,
            plugins: vec::Vec<Arc<Plugin>>,
            missing: Option<Arc<u8>>,
            parent_logger: Option<Arc<Logger>>,
        }

        let parent = Container::new(
            Metadata::new()
                .component(Component::new(|| Ok(Logger)))
                .component(Component::new(
                    |Inject(logger): Inject<Logger>,
                     InjectAll(plugins): InjectAll<Plugin>,
                     InjectOptional(missing): InjectOptional<u8>,
                     InjectParent(parent_logger): InjectParent<Logger>| {
                        Ok(Host {
                            logger,
                            plugins,
                            missing,
                            parent_logger,
                        })
                    },
                )),
        );
        let child = parent.create_child();
        child.register_transient(Key::of::<Host>(), None).unwrap();
        child.register_instance(Key::of::<Plugin>(), Plugin(1));
        child.register_instance(Key::of::<Plugin>(), Plugin(2));

        let host = child.resolve::<Host>().unwrap();

        assert_eq!(host.plugins.iter().map(|plugin| plugin.0).collect::<vec::Vec<_>>(), [1, 2]);
        assert!(host.missing.is_none());
        // the child has no local logger, so both come from the parent's singleton
        let logger = parent.resolve::<Logger>().unwrap();
        assert!(Arc::ptr_eq(&host.logger, &logger));
        assert!(Arc::ptr_eq(host.parent_logger.as_ref().unwrap(), &logger));
    }

    #[test]
    #[traced_test]
    fn test_lazy_breaks_cycle() {
        struct Left(InjectLazy<Right>);
        struct Right(Arc<Left>);

        let container = Container::new(
            Metadata::new()
                .component(Component::new(|right: InjectLazy<Right>| Ok(Left(right))))
                .component(Component::new(|Inject(left): Inject<Left>| Ok(Right(left)))),
        );

        let left = container.resolve::<Left>().unwrap();
        let right = left.0 .0.get().unwrap();

        assert!(Arc::ptr_eq(&right.0, &left));
    }

    #[test]
    #[traced_test]
    fn test_wrong_argument_type() {
        let container = Container::new(
            Metadata::new().component(Component::new(|Inject(_plugin): Inject<Plugin>| Ok(Logger)).with_keys([Key::token("plugin")])),
        );
        container.register_instance(Key::token("plugin"), 1u8);

        let err = container.resolve::<Logger>().unwrap_err();

        assert!(matches!(
            err.root_cause(),
            ResolveErrorKind::Instantiate(InstantiateErrorKind::IncorrectArgumentType { index: 0, .. })
        ));
    }
}
