use alloc::{collections::BTreeMap, sync::Arc, vec::Vec};
use core::cell::RefCell;
use parking_lot::ReentrantMutex;
use tracing::debug;

use crate::{
    component::Component,
    errors::ResolveErrorKind,
    key::Key,
    service::{service_fn, BoxCloneService, Service},
    Container, Value,
};

/// Produces a value for a key, given the container it's registered in
pub(crate) type Factory = BoxCloneService<Container, Value, ResolveErrorKind>;

/// Key to ordered factories. The first factory answers [`Container::get`],
/// all of them answer [`Container::get_all`].
#[derive(Default, Clone)]
pub(crate) struct Registry {
    factories: BTreeMap<Key, Vec<Factory>>,
}

impl Registry {
    pub(crate) fn push(&mut self, key: Key, factory: Factory) {
        self.factories.entry(key).or_default().push(factory);
    }

    #[must_use]
    pub(crate) fn first(&self, key: &Key) -> Option<Factory> {
        self.factories.get(key).and_then(|factories| factories.first()).cloned()
    }

    #[must_use]
    pub(crate) fn all(&self, key: &Key) -> Option<Vec<Factory>> {
        self.factories.get(key).cloned()
    }

    #[must_use]
    pub(crate) fn contains(&self, key: &Key) -> bool {
        self.factories.contains_key(key)
    }

    pub(crate) fn remove(&mut self, key: &Key) -> Option<Vec<Factory>> {
        self.factories.remove(key)
    }

    #[must_use]
    pub(crate) fn len(&self) -> usize {
        self.factories.len()
    }
}

pub(crate) fn instance_factory(value: Value) -> Factory {
    BoxCloneService::new(service_fn(move |_container: Container| -> Result<Value, ResolveErrorKind> {
        Ok(value.clone())
    }))
}

pub(crate) fn transient_factory(component: Component) -> Factory {
    BoxCloneService::new(service_fn(move |container: Container| container.invoke(&component)))
}

pub(crate) fn alias_factory(original: Key) -> Factory {
    BoxCloneService::new(service_fn(move |container: Container| container.get(&original)))
}

pub(crate) fn handler_factory<F>(handler: F) -> Factory
where
    F: Fn(&Container) -> Result<Value, ResolveErrorKind> + Clone + Send + Sync + 'static,
{
    BoxCloneService::new(service_fn(move |container: Container| handler(&container)))
}

/// Invokes its component once and hands out the same value afterwards.
///
/// All clones share one slot. The lock is re-entrant so a cycle through the
/// same singleton on one thread reaches the cycle check instead of deadlocking,
/// while other threads wait for the first construction to finish.
#[derive(Clone)]
pub(crate) struct CachedFactory {
    component: Component,
    slot: Arc<ReentrantMutex<RefCell<Option<Value>>>>,
}

impl CachedFactory {
    #[must_use]
    pub(crate) fn new(component: Component) -> Self {
        Self {
            component,
            slot: Arc::new(ReentrantMutex::new(RefCell::new(None))),
        }
    }

    #[must_use]
    pub(crate) fn into_factory(self) -> Factory {
        BoxCloneService::new(self)
    }
}

impl Service<Container> for CachedFactory {
    type Response = Value;
    type Error = ResolveErrorKind;

    fn call(&mut self, container: Container) -> Result<Self::Response, Self::Error> {
        let guard = self.slot.lock();

        let cached = guard.borrow().clone();
        if let Some(value) = cached {
            debug!("Found in cache");
            return Ok(value);
        }
        debug!("Not found in cache");

        let value = container.invoke(&self.component)?;

        let mut slot = guard.borrow_mut();
        match &*slot {
            // A re-entrant call on this thread finished first, keep its value
            Some(value) => Ok(value.clone()),
            None => {
                *slot = Some(value.clone());
                debug!("Cached");
                Ok(value)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::sync::Arc;
    use core::sync::atomic::{AtomicU8, Ordering};
    use std::thread;
    use tracing_test::traced_test;

    use super::{instance_factory, transient_factory, CachedFactory, Registry};
    use crate::{service::Service as _, Component, Container, Key, Value};

    struct Logger;

    #[test]
    #[traced_test]
    fn test_factories_keep_registration_order() {
        let mut registry = Registry::default();
        let key = Key::token("number");
        registry.push(key.clone(), instance_factory(Value::instance(1u8)));
        registry.push(key.clone(), instance_factory(Value::instance(2u8)));

        let container = Container::default();
        let first = registry.first(&key).unwrap().call(container.clone()).unwrap();
        let all = registry.all(&key).unwrap();

        assert_eq!(*first.downcast::<u8>().unwrap(), 1);
        assert_eq!(all.len(), 2);
        assert!(registry.contains(&key));
        assert_eq!(registry.remove(&key).map(|factories| factories.len()), Some(2));
        assert!(registry.first(&key).is_none());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    #[traced_test]
    fn test_cached_factory_shares_slot_between_clones() {
        let instantiator_call_count = Arc::new(AtomicU8::new(0));
        let component = Component::new({
            let instantiator_call_count = instantiator_call_count.clone();
            move || {
                instantiator_call_count.fetch_add(1, Ordering::SeqCst);
                Ok(Logger)
            }
        });
        let container = Container::default();

        let mut transient = transient_factory(component.clone());
        let mut cached = CachedFactory::new(component).into_factory();
        let mut cached_clone = cached.clone();

        let first = cached.call(container.clone()).unwrap();
        let second = cached_clone.call(container.clone()).unwrap();
        let fresh = transient.call(container).unwrap();

        assert!(first.same_instance(&second));
        assert!(!first.same_instance(&fresh));
        assert_eq!(instantiator_call_count.load(Ordering::SeqCst), 2);
    }

    #[test]
    #[traced_test]
    fn test_cached_factory_constructs_once_across_threads() {
        let instantiator_call_count = Arc::new(AtomicU8::new(0));
        let cached = CachedFactory::new(Component::new({
            let instantiator_call_count = instantiator_call_count.clone();
            move || {
                instantiator_call_count.fetch_add(1, Ordering::SeqCst);
                Ok(Logger)
            }
        }))
        .into_factory();
        let container = Container::default();

        let handles: alloc::vec::Vec<_> = (0..4)
            .map(|_| {
                let mut cached = cached.clone();
                let container = container.clone();
                thread::spawn(move || cached.call(container).unwrap())
            })
            .collect();
        let values: alloc::vec::Vec<_> = handles.into_iter().map(|handle| handle.join().unwrap()).collect();

        assert!(values.windows(2).all(|pair| pair[0].same_instance(&pair[1])));
        assert_eq!(instantiator_call_count.load(Ordering::SeqCst), 1);
    }
}
