use alloc::{collections::BTreeMap, sync::Arc, vec::Vec};
use core::any::TypeId;

use crate::{
    activator::Activator,
    any::{Instance, TypeInfo},
    component::Component,
    registration::Registration,
};

/// Kind of object that can be attached to a type in [`Metadata`]
pub trait Capability: 'static {
    type Value: Clone + Send + Sync + 'static;
}

/// The component that builds the type, used by auto-registration
pub enum Components {}

impl Capability for Components {
    type Value = Component;
}

/// Lifetime strategy applied when the type is auto-registered
pub enum Registrations {}

impl Capability for Registrations {
    type Value = Arc<dyn Registration>;
}

/// How the type's component is turned into an instance
pub enum Activators {}

impl Capability for Activators {
    type Value = Arc<dyn Activator>;
}

/// A type that describes itself to the container.
/// See [`Metadata::declare`].
pub trait Injectable: Send + Sync + Sized + 'static {
    #[must_use]
    fn component() -> Component;

    #[must_use]
    fn registration() -> Option<Arc<dyn Registration>> {
        None
    }

    #[must_use]
    fn activator() -> Option<Arc<dyn Activator>> {
        None
    }
}

/// Side table of objects attached to types: their components and strategies.
///
/// Filled once while setting the application up, then shared read-only by
/// every container of a tree. Several objects of one capability may be
/// attached to a type; lookups return the first one.
#[derive(Clone, Default)]
pub struct Metadata {
    entries: BTreeMap<(TypeInfo, TypeId), Vec<Instance>>,
}

impl Metadata {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach<C: Capability>(&mut self, class: TypeInfo, value: C::Value) -> &mut Self {
        self.entries
            .entry((class, TypeId::of::<C>()))
            .or_default()
            .push(Arc::new(value));
        self
    }

    #[must_use]
    pub fn lookup<C: Capability>(&self, class: &TypeInfo) -> Option<C::Value> {
        self.entries
            .get(&(*class, TypeId::of::<C>()))
            .and_then(|values| values.first())
            .and_then(|value| value.downcast_ref::<C::Value>())
            .cloned()
    }

    /// Attaches the component and strategies a type declares about itself
    #[must_use]
    pub fn declare<T: Injectable>(mut self) -> Self {
        let class = TypeInfo::of::<T>();
        self.attach::<Components>(class, T::component());
        if let Some(registration) = T::registration() {
            self.attach::<Registrations>(class, registration);
        }
        if let Some(activator) = T::activator() {
            self.attach::<Activators>(class, activator);
        }
        self
    }

    #[must_use]
    pub fn component(mut self, component: Component) -> Self {
        self.attach::<Components>(component.provides(), component);
        self
    }

    #[must_use]
    pub fn registration<T: 'static>(mut self, registration: impl Registration + 'static) -> Self {
        self.attach::<Registrations>(TypeInfo::of::<T>(), Arc::new(registration));
        self
    }

    #[must_use]
    pub fn activator<T: 'static>(mut self, activator: impl Activator + 'static) -> Self {
        self.attach::<Activators>(TypeInfo::of::<T>(), Arc::new(activator));
        self
    }
}
