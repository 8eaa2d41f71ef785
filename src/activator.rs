use alloc::sync::Arc;

use crate::{
    any::Instance,
    component::Component,
    dependency_resolver::Arguments,
    errors::InstantiateErrorKind,
    Value,
};

/// Turns a component plus its resolved arguments into a value
pub trait Activator: Send + Sync {
    #[allow(clippy::missing_errors_doc)]
    fn invoke(&self, component: &Component, arguments: Arguments) -> Result<Value, InstantiateErrorKind>;

    /// Verb used in construction error messages
    fn activating(&self) -> &'static str {
        "invoking"
    }
}

/// Builds a new instance from whatever the constructor returns. The default activator.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassActivator;

impl Activator for ClassActivator {
    fn invoke(&self, component: &Component, arguments: Arguments) -> Result<Value, InstantiateErrorKind> {
        component.construct(arguments).map(|provides| Value::Instance(Instance::from(provides)))
    }

    fn activating(&self) -> &'static str {
        "instantiating"
    }
}

/// Calls the constructor as a plain function and hands its result back as is.
///
/// A constructor returning a [`Value`] or an [`Instance`] passes it through unchanged,
/// so a factory can give out an already shared instance. Any other result is wrapped
/// like [`ClassActivator`] does.
#[derive(Debug, Clone, Copy, Default)]
pub struct FactoryActivator;

impl Activator for FactoryActivator {
    fn invoke(&self, component: &Component, arguments: Arguments) -> Result<Value, InstantiateErrorKind> {
        let provides = component.construct(arguments)?;
        let provides = match provides.downcast::<Value>() {
            Ok(value) => return Ok(*value),
            Err(provides) => provides,
        };
        match provides.downcast::<Instance>() {
            Ok(instance) => Ok(Value::Instance(*instance)),
            Err(provides) => Ok(Value::Instance(Arc::from(provides))),
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::sync::Arc;

    use super::{Activator as _, ClassActivator, FactoryActivator};
    use crate::{any::Instance, Arguments, Component, Value};

    struct Logger;

    #[test]
    fn test_class_activator_builds_new_instances() {
        let component = Component::new(|| Ok(Logger));

        let first = ClassActivator.invoke(&component, Arguments::new(alloc::vec![])).unwrap();
        let second = ClassActivator.invoke(&component, Arguments::new(alloc::vec![])).unwrap();

        assert!(first.clone().downcast::<Logger>().is_ok());
        assert!(!first.same_instance(&second));
    }

    #[test]
    fn test_factory_activator_passes_result_through() {
        let shared = Arc::new(Logger);
        let component = Component::new({
            let shared = shared.clone();
            move || Ok(Value::from_arc(shared.clone()))
        });
        let erased = Component::new({
            let shared = shared.clone();
            move || Ok(shared.clone() as Instance)
        });

        let value = FactoryActivator.invoke(&component, Arguments::new(alloc::vec![])).unwrap();
        let from_erased = FactoryActivator.invoke(&erased, Arguments::new(alloc::vec![])).unwrap();

        assert!(Arc::ptr_eq(&value.downcast::<Logger>().unwrap(), &shared));
        assert!(Arc::ptr_eq(&from_erased.downcast::<Logger>().unwrap(), &shared));
    }

    #[test]
    fn test_factory_activator_wraps_plain_result() {
        let component = Component::new(|| Ok(Logger));

        let value = FactoryActivator.invoke(&component, Arguments::new(alloc::vec![])).unwrap();

        assert!(value.downcast::<Logger>().is_ok());
        assert_eq!(FactoryActivator.activating(), "invoking");
        assert_eq!(ClassActivator.activating(), "instantiating");
    }
}
