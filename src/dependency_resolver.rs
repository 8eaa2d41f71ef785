use alloc::{collections::VecDeque, vec::Vec};

use crate::{errors::InstantiateErrorKind, key::Key, Value};

/// Positional arguments handed to an activator: resolved dependencies in
/// key order, followed by the dynamic values passed to [`crate::Container::invoke_with`]
pub struct Arguments {
    values: VecDeque<Value>,
    index: usize,
}

impl Arguments {
    #[inline]
    #[must_use]
    pub fn new(values: Vec<Value>) -> Self {
        Self {
            values: values.into(),
            index: 0,
        }
    }

    #[inline]
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.values.len()
    }

    /// Takes the next argument with its zero-based position
    #[allow(clippy::missing_errors_doc)]
    pub fn next_value(&mut self) -> Result<(usize, Value), InstantiateErrorKind> {
        let index = self.index;
        match self.values.pop_front() {
            Some(value) => {
                self.index += 1;
                Ok((index, value))
            }
            None => Err(InstantiateErrorKind::MissingArgument { index }),
        }
    }
}

/// Constructor parameter that declares the key it needs and knows how to
/// turn the resolved [`Value`] back into a typed argument.
pub trait DependencyResolver: Sized {
    /// Appends the keys this parameter declares, in positional order
    fn keys(keys: &mut Vec<Key>);

    #[allow(clippy::missing_errors_doc)]
    fn resolve(arguments: &mut Arguments) -> Result<Self, InstantiateErrorKind>;
}

macro_rules! impl_dependency_resolver {
    (
        [$($ty:ident),*]
    ) => {
        #[allow(non_snake_case, unused_mut)]
        impl<$($ty,)*> DependencyResolver for ($($ty,)*)
        where
            $( $ty: DependencyResolver, )*
        {
            #[inline]
            #[allow(unused_variables)]
            fn keys(keys: &mut Vec<Key>) {
                $( $ty::keys(keys); )*
            }

            #[inline]
            #[allow(unused_variables)]
            fn resolve(arguments: &mut Arguments) -> Result<Self, InstantiateErrorKind> {
                Ok(($($ty::resolve(arguments)?,)*))
            }
        }
    };
}

all_the_tuples!(impl_dependency_resolver);

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::{vec, vec::Vec};

    use super::{Arguments, DependencyResolver};
    use crate::{
        inject::{Dynamic, Inject, InjectAll, InjectOptional},
        InstantiateErrorKind, Key, Value,
    };

    struct Logger;
    struct Plugin;

    #[test]
    #[allow(dead_code)]
    fn test_dependency_resolver_impls() {
        fn resolver<T: DependencyResolver>() {}
        fn resolver_with_dep<Dep: Send + Sync + 'static>() {
            resolver::<Inject<Dep>>();
            resolver::<InjectAll<Dep>>();
            resolver::<(Inject<Dep>, InjectOptional<Dep>, Dynamic<Dep>)>();
        }
    }

    #[test]
    fn test_keys_keep_parameter_order() {
        let mut keys = Vec::new();
        <(Inject<Logger>, Dynamic<u8>, Inject<Plugin>)>::keys(&mut keys);

        assert_eq!(keys, [Key::of::<Logger>(), Key::of::<Plugin>()]);
    }

    #[test]
    fn test_resolve_positional() {
        let mut arguments = Arguments::new(vec![Value::instance(Logger), Value::instance(3u8)]);

        let (Inject(_logger), Dynamic(number)) = <(Inject<Logger>, Dynamic<u8>)>::resolve(&mut arguments).unwrap();

        assert_eq!(*number, 3);
        assert_eq!(arguments.remaining(), 0);
    }

    #[test]
    fn test_resolve_reports_position() {
        let mut arguments = Arguments::new(vec![Value::instance(Logger), Value::instance(Logger)]);

        assert!(matches!(
            <(Inject<Logger>, Inject<Plugin>)>::resolve(&mut arguments),
            Err(InstantiateErrorKind::IncorrectArgumentType { index: 1, .. })
        ));

        let mut arguments = Arguments::new(vec![Value::instance(Logger)]);

        assert!(matches!(
            <(Inject<Logger>, Inject<Logger>)>::resolve(&mut arguments),
            Err(InstantiateErrorKind::MissingArgument { index: 1 })
        ));
    }
}
