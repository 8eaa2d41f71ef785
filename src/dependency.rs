use alloc::vec::Vec;

use crate::key::Key;

/// Explicit dependency list of a component, overriding its constructor signature
#[derive(Clone)]
pub enum DependencyDescriptor {
    Keys(Vec<Key>),
    /// Evaluated every time construction info is computed
    Provider(fn() -> Vec<Key>),
}

impl DependencyDescriptor {
    #[must_use]
    pub fn keys(&self) -> Vec<Key> {
        match self {
            DependencyDescriptor::Keys(keys) => keys.clone(),
            DependencyDescriptor::Provider(provider) => provider(),
        }
    }
}

impl From<Vec<Key>> for DependencyDescriptor {
    fn from(keys: Vec<Key>) -> Self {
        Self::Keys(keys)
    }
}

pub(crate) const EMPTY_KEYS: &[Key] = &[];
