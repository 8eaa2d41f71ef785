use alloc::{borrow::Cow, collections::BTreeMap, sync::Arc};
use core::fmt::{self, Debug, Formatter};
use parking_lot::Mutex;

use crate::{activator::Activator, component::ComponentId, key::Key};

/// How to build a component: its activator and the keys of its arguments, in parameter order
#[derive(Clone)]
pub struct ConstructionInfo {
    activator: Arc<dyn Activator>,
    keys: Cow<'static, [Key]>,
}

impl ConstructionInfo {
    #[inline]
    #[must_use]
    pub fn new(activator: Arc<dyn Activator>, keys: Cow<'static, [Key]>) -> Self {
        Self { activator, keys }
    }

    #[inline]
    #[must_use]
    pub fn activator(&self) -> &dyn Activator {
        &*self.activator
    }

    #[inline]
    #[must_use]
    pub fn keys(&self) -> &[Key] {
        &self.keys
    }
}

impl Debug for ConstructionInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructionInfo")
            .field("activating", &self.activator.activating())
            .field("keys", &self.keys)
            .finish()
    }
}

/// Memoized [`ConstructionInfo`] per component.
///
/// Clones share the same map, so a child container created from a parent
/// reuses everything the tree already computed.
#[derive(Clone, Default)]
pub struct ConstructionInfoCache {
    map: Arc<Mutex<BTreeMap<ComponentId, Arc<ConstructionInfo>>>>,
}

impl ConstructionInfoCache {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.map.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.lock().is_empty()
    }

    #[must_use]
    pub fn contains(&self, component: &ComponentId) -> bool {
        self.map.lock().contains_key(component)
    }

    #[must_use]
    pub fn get(&self, component: &ComponentId) -> Option<Arc<ConstructionInfo>> {
        self.map.lock().get(component).cloned()
    }

    /// Stores the info unless another caller stored one first, returning the one kept
    pub(crate) fn insert(&self, component: ComponentId, info: ConstructionInfo) -> Arc<ConstructionInfo> {
        self.map.lock().entry(component).or_insert_with(|| Arc::new(info)).clone()
    }
}

#[cfg(test)]
mod tests {
    use alloc::{borrow::Cow, sync::Arc, vec};

    use super::{ConstructionInfo, ConstructionInfoCache};
    use crate::{activator::ClassActivator, Activator as _, Component, FactoryActivator, Key};

    struct Logger;

    #[test]
    fn test_first_insert_wins() {
        let cache = ConstructionInfoCache::new();
        let shared = cache.clone();
        let id = Component::new(|| Ok(Logger)).id();

        let first = cache.insert(id, ConstructionInfo::new(Arc::new(ClassActivator), Cow::Borrowed(&[])));
        let second = shared.insert(
            id,
            ConstructionInfo::new(Arc::new(FactoryActivator), Cow::Owned(vec![Key::token("logger")])),
        );

        assert!(Arc::ptr_eq(&first, &second));
        assert!(shared.get(&id).unwrap().keys().is_empty());
        assert_eq!(cache.get(&id).unwrap().activator().activating(), "instantiating");
        assert_eq!(cache.len(), 1);
        assert!(!ConstructionInfoCache::new().contains(&id));
    }
}
