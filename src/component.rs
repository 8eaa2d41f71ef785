use alloc::{boxed::Box, sync::Arc, vec::Vec};
use core::{
    any::Any,
    fmt::{self, Debug, Formatter},
    sync::atomic::{AtomicUsize, Ordering},
};

use crate::{
    any::{BoxedAny, TypeInfo},
    dependency::DependencyDescriptor,
    dependency_resolver::{Arguments, DependencyResolver},
    errors::InstantiateErrorKind,
    instantiator::Instantiator,
    key::Key,
    service::{service_fn, BoxCloneService, Service as _},
};

static NEXT_INSTANCE: AtomicUsize = AtomicUsize::new(0);

/// Identity of a component: the type it provides and a number unique to the
/// component value. Clones share it, while [`Component::new`] and every
/// [`Component::with_inject`] take a fresh one, so components that differ in
/// constructor or declared keys never share cached construction info.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ComponentId {
    provides: TypeInfo,
    instance: usize,
}

impl ComponentId {
    fn next(provides: TypeInfo) -> Self {
        Self {
            provides,
            instance: NEXT_INSTANCE.fetch_add(1, Ordering::Relaxed),
        }
    }

    #[inline]
    #[must_use]
    pub const fn provides(&self) -> TypeInfo {
        self.provides
    }
}

pub(crate) type BoxedCloneConstructor = BoxCloneService<Arguments, BoxedAny, InstantiateErrorKind>;

/// Something the container can invoke: a constructor plus the dependency keys it declares
#[derive(Clone)]
pub struct Component {
    id: ComponentId,
    constructor: BoxedCloneConstructor,
    parameters: Arc<[Key]>,
    inject: Option<DependencyDescriptor>,
}

impl Component {
    #[must_use]
    pub fn new<Inst, Deps>(mut instantiator: Inst) -> Self
    where
        Inst: Instantiator<Deps, Error = InstantiateErrorKind> + Send + Sync,
        Inst::Provides: Send + Sync,
        Deps: DependencyResolver + 'static,
    {
        let mut parameters = Vec::new();
        Deps::keys(&mut parameters);

        Self {
            id: ComponentId::next(TypeInfo::of::<Inst::Provides>()),
            constructor: BoxCloneService::new(service_fn(move |mut arguments: Arguments| {
                let dependencies = Deps::resolve(&mut arguments)?;
                let provides = instantiator.instantiate(dependencies)?;
                Ok(Box::new(provides) as BoxedAny)
            })),
            parameters: parameters.into(),
            inject: None,
        }
    }

    /// Replaces the dependency keys derived from the constructor signature.
    /// The result is a new component with its own [`ComponentId`].
    #[inline]
    #[must_use]
    pub fn with_inject(mut self, inject: DependencyDescriptor) -> Self {
        self.id = ComponentId::next(self.id.provides);
        self.inject = Some(inject);
        self
    }

    #[inline]
    #[must_use]
    pub fn with_keys(self, keys: impl IntoIterator<Item = Key>) -> Self {
        self.with_inject(DependencyDescriptor::Keys(keys.into_iter().collect()))
    }

    #[inline]
    #[must_use]
    pub fn with_provider(self, provider: fn() -> Vec<Key>) -> Self {
        self.with_inject(DependencyDescriptor::Provider(provider))
    }

    #[inline]
    #[must_use]
    pub const fn id(&self) -> ComponentId {
        self.id
    }

    #[inline]
    #[must_use]
    pub const fn provides(&self) -> TypeInfo {
        self.id.provides
    }

    /// Key the component is registered under when no other key is given
    #[inline]
    #[must_use]
    pub fn key(&self) -> Key {
        Key::Type(self.id.provides)
    }

    /// Keys derived from the constructor's parameter types
    #[inline]
    #[must_use]
    pub fn parameters(&self) -> &[Key] {
        &self.parameters
    }

    #[inline]
    #[must_use]
    pub fn inject(&self) -> Option<&DependencyDescriptor> {
        self.inject.as_ref()
    }

    /// Runs the constructor on positional arguments. Used by [`crate::Activator`] implementations.
    #[allow(clippy::missing_errors_doc)]
    pub fn construct(&self, arguments: Arguments) -> Result<Box<dyn Any + Send + Sync>, InstantiateErrorKind> {
        self.constructor.clone().call(arguments)
    }
}

impl Debug for Component {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("provides", &self.id.provides.name)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}
