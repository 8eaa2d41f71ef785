use alloc::{borrow::Cow, boxed::Box, sync::Arc, vec::Vec};
use core::{
    any::type_name,
    fmt::{self, Debug, Formatter},
};
use parking_lot::{Mutex, ReentrantMutex};
use tracing::{debug, error, info_span};

use crate::{
    activator::{Activator, ClassActivator},
    cache::{ConstructionInfo, ConstructionInfoCache},
    component::Component,
    config::Config,
    context::ResolutionContext,
    dependency::EMPTY_KEYS,
    dependency_resolver::Arguments,
    errors::{ArgumentInfo, InstantiateErrorKind, ResolveErrorKind},
    key::Key,
    metadata::{Activators, Components, Metadata, Registrations},
    registry::{alias_factory, handler_factory, instance_factory, transient_factory, CachedFactory, Registry},
    resolver::sequence_of,
    service::Service as _,
    Value,
};

/// Fallback source of dependency keys for components that declare none explicitly.
/// Returning `None` passes the component on to the next locator.
pub type ParameterInfoLocator = Arc<dyn Fn(&Component) -> Option<Vec<Key>> + Send + Sync>;

/// Registry of factories with a parent link, the hub of resolution.
///
/// The handle is cheap to clone; clones share the same registry.
/// A handle also carries the chain of components being invoked through it,
/// which is how cycles are detected.
#[derive(Clone)]
pub struct Container {
    inner: Arc<ContainerInner>,
    context: ResolutionContext,
}

struct ContainerInner {
    registry: Mutex<Registry>,
    // Held while `get` checks and auto-registers a missing key
    auto_registration: ReentrantMutex<()>,
    cache: ConstructionInfoCache,
    metadata: Arc<Metadata>,
    locators: Mutex<Vec<ParameterInfoLocator>>,
    config: Config,
    parent: Option<Arc<ContainerInner>>,
    root: Option<Arc<ContainerInner>>,
}

impl Container {
    /// Creates a root container with default config and a fresh construction-info cache
    #[inline]
    #[must_use]
    pub fn new(metadata: Metadata) -> Self {
        Self::new_with_config(metadata, Config::default())
    }

    #[inline]
    #[must_use]
    pub fn new_with_config(metadata: Metadata, config: Config) -> Self {
        Self::new_with_cache(metadata, config, ConstructionInfoCache::new())
    }

    /// Creates a root container that reuses `cache`, which may already be shared with other trees
    #[must_use]
    pub fn new_with_cache(metadata: Metadata, config: Config, cache: ConstructionInfoCache) -> Self {
        Self {
            inner: Arc::new(ContainerInner {
                registry: Mutex::new(Registry::default()),
                auto_registration: ReentrantMutex::new(()),
                cache,
                metadata: Arc::new(metadata),
                locators: Mutex::new(Vec::new()),
                config,
                parent: None,
                root: None,
            }),
            context: ResolutionContext::default(),
        }
    }

    /// Creates a child with an empty registry.
    /// The child shares this container's metadata, construction-info cache and config,
    /// and starts with a copy of its parameter-info locators.
    #[must_use]
    pub fn create_child(&self) -> Container {
        let locators = self.inner.locators.lock().clone();
        Container {
            inner: Arc::new(ContainerInner {
                registry: Mutex::new(Registry::default()),
                auto_registration: ReentrantMutex::new(()),
                cache: self.inner.cache.clone(),
                metadata: self.inner.metadata.clone(),
                locators: Mutex::new(locators),
                config: self.inner.config,
                parent: Some(self.inner.clone()),
                root: Some(self.root_inner()),
            }),
            context: ResolutionContext::default(),
        }
    }
}

impl Container {
    /// Registers a value that every resolution of `key` returns as is
    pub fn register_instance<T: Send + Sync + 'static>(&self, key: impl Into<Key>, instance: T) {
        self.register_value(key, Value::instance(instance));
    }

    pub fn register_value(&self, key: impl Into<Key>, value: Value) {
        let key = key.into();
        debug!(%key, "Registered instance");
        self.inner.registry.lock().push(key, instance_factory(value));
    }

    /// Registers a factory that invokes `component` on every resolution of `key`.
    /// Without a component, the one declared in metadata for `key` is used.
    ///
    /// # Errors
    /// Returns [`ResolveErrorKind::InvalidKey`] if no component is given and none is declared for `key`
    pub fn register_transient(&self, key: impl Into<Key>, component: Option<Component>) -> Result<(), ResolveErrorKind> {
        let key = key.into();
        let component = match component {
            Some(component) => component,
            None => self.component_for(&key)?,
        };
        debug!(%key, "Registered transient");
        self.inner.registry.lock().push(key, transient_factory(component));
        Ok(())
    }

    /// Registers a factory that invokes `component` on the first resolution of `key`
    /// and returns that same value afterwards.
    /// Without a component, the one declared in metadata for `key` is used.
    ///
    /// # Errors
    /// Returns [`ResolveErrorKind::InvalidKey`] if no component is given and none is declared for `key`
    pub fn register_singleton(&self, key: impl Into<Key>, component: Option<Component>) -> Result<(), ResolveErrorKind> {
        let key = key.into();
        let component = match component {
            Some(component) => component,
            None => self.component_for(&key)?,
        };
        debug!(%key, "Registered singleton");
        self.inner
            .registry
            .lock()
            .push(key, CachedFactory::new(component).into_factory());
        Ok(())
    }

    /// Registers `component` with the lifetime strategy declared for its type,
    /// or as a singleton if none is declared.
    /// `key` defaults to the component's own type key.
    /// Returns the key the component ended up registered under, which a strategy
    /// with its own key may choose differently.
    ///
    /// # Errors
    /// Returns whatever error the declared strategy fails with
    pub fn auto_register(&self, component: Component, key: Option<Key>) -> Result<Key, ResolveErrorKind> {
        let key = key.unwrap_or_else(|| component.key());
        match self.inner.metadata.lookup::<Registrations>(&component.provides()) {
            Some(registration) => {
                debug!(%key, "Auto-registering with declared strategy");
                registration.register(self, key, component)
            }
            None => {
                debug!(%key, "Auto-registering as singleton");
                self.register_singleton(key.clone(), Some(component))?;
                Ok(key)
            }
        }
    }

    /// Auto-registers each component in turn, stopping at the first failure
    ///
    /// # Errors
    /// Returns the first error of [`Self::auto_register`]
    pub fn auto_register_all(&self, components: impl IntoIterator<Item = Component>) -> Result<(), ResolveErrorKind> {
        for component in components {
            self.auto_register(component, None)?;
        }
        Ok(())
    }

    /// Appends a raw factory to the factories of `key`
    pub fn register_handler<F>(&self, key: impl Into<Key>, handler: F)
    where
        F: Fn(&Container) -> Result<Value, ResolveErrorKind> + Clone + Send + Sync + 'static,
    {
        let key = key.into();
        debug!(%key, "Registered handler");
        self.inner.registry.lock().push(key, handler_factory(handler));
    }

    /// Makes `alias` resolve whatever `original` resolves to at the time of the call
    pub fn register_alias(&self, original: impl Into<Key>, alias: impl Into<Key>) {
        let (original, alias) = (original.into(), alias.into());
        debug!(%original, %alias, "Registered alias");
        self.inner.registry.lock().push(alias, alias_factory(original));
    }

    /// Removes every factory of `key`. Returns `false` if there were none.
    pub fn unregister(&self, key: &Key) -> bool {
        self.inner.registry.lock().remove(key).is_some()
    }

    /// Adds a fallback source of dependency keys, tried after the ones added before it
    pub fn add_parameter_info_locator<F>(&self, locator: F)
    where
        F: Fn(&Component) -> Option<Vec<Key>> + Send + Sync + 'static,
    {
        self.inner.locators.lock().push(Arc::new(locator));
    }
}

impl Container {
    /// Resolves `key`.
    ///
    /// The container's own key resolves to the container; a resolver key is handed to its resolver.
    /// Otherwise the first local factory answers, then the parent chain, and a root
    /// finally auto-registers the component declared for `key` and uses it.
    /// When the declared strategy registers under a key of its own, `key` becomes an
    /// alias of that key so later calls don't register again.
    /// Auto-registration is serialized per container, so concurrent first calls register once.
    ///
    /// # Errors
    /// - Returns [`ResolveErrorKind::InvalidKey`] if the key needs a component and none is declared
    /// - Returns [`ResolveErrorKind::Construction`] if a component fails to be invoked
    /// - Returns whatever a resolver or factory fails with
    pub fn get(&self, key: &Key) -> Result<Value, ResolveErrorKind> {
        let span = info_span!("get", %key);
        let _guard = span.enter();

        if key.is_container() {
            debug!("Resolved the container itself");
            return Ok(Value::instance(self.detached()));
        }

        if let Some(resolver) = key.as_resolver() {
            return resolver.resolve(self);
        }

        let factory = self.inner.registry.lock().first(key);
        if let Some(mut factory) = factory {
            return factory.call(self.clone());
        }

        if let Some(parent) = self.parent() {
            debug!("Not registered, delegating to parent");
            return parent.get(key);
        }

        let factory = {
            let _registering = self.inner.auto_registration.lock();
            // Another caller may have registered the key while we waited
            let factory = self.inner.registry.lock().first(key);
            match factory {
                Some(factory) => Some(factory),
                None => {
                    debug!("Not registered");
                    let component = self.component_for(key)?;
                    let registered = self.auto_register(component, Some(key.clone()))?;
                    if registered != *key {
                        self.register_alias(registered.clone(), key.clone());
                    }
                    self.inner.registry.lock().first(&registered)
                }
            }
        };
        match factory {
            Some(mut factory) => factory.call(self.clone()),
            None => {
                let err = ResolveErrorKind::InvalidKey { key: key.clone() };
                error!("{}", err);
                Err(err)
            }
        }
    }

    /// Resolves every factory registered for `key`, in registration order.
    /// Falls back to the parent chain when `key` isn't registered locally, never auto-registers.
    ///
    /// # Errors
    /// Returns the first error a factory fails with
    pub fn get_all(&self, key: &Key) -> Result<Vec<Value>, ResolveErrorKind> {
        let span = info_span!("get_all", %key);
        let _guard = span.enter();

        let factories = self.inner.registry.lock().all(key);
        match factories {
            Some(factories) => factories
                .into_iter()
                .map(|mut factory| factory.call(self.clone()))
                .collect(),
            None => match self.parent() {
                Some(parent) => {
                    debug!("Not registered, delegating to parent");
                    parent.get_all(key)
                }
                None => {
                    debug!("Not registered");
                    Ok(Vec::new())
                }
            },
        }
    }

    /// `true` if `key` is registered here, or in an ancestor when `check_parent` is set
    #[must_use]
    pub fn has_handler(&self, key: &Key, check_parent: bool) -> bool {
        if self.inner.registry.lock().contains(key) {
            return true;
        }
        check_parent && self.parent().is_some_and(|parent| parent.has_handler(key, true))
    }

    /// Invokes `component` with its dependencies resolved from this container
    ///
    /// # Errors
    /// - Returns [`ResolveErrorKind::CyclicDependency`] if `component` is already being invoked on this chain
    /// - Returns [`ResolveErrorKind::Construction`] if a dependency or the activation fails
    pub fn invoke(&self, component: &Component) -> Result<Value, ResolveErrorKind> {
        self.invoke_with(component, Vec::new())
    }

    /// Like [`Self::invoke`], with `dynamic` values passed after the resolved dependencies
    ///
    /// # Errors
    /// See [`Self::invoke`]
    pub fn invoke_with(&self, component: &Component, dynamic: Vec<Value>) -> Result<Value, ResolveErrorKind> {
        let span = info_span!("invoke", component = component.provides().name);
        let _guard = span.enter();

        let id = component.id();
        let resolving = if self.inner.config.detect_cycles {
            if self.context.contains(&id) {
                let err = ResolveErrorKind::CyclicDependency {
                    chain: self.context.chain_to(id),
                };
                error!("{}", err);
                return Err(err);
            }
            Container {
                inner: self.inner.clone(),
                context: self.context.push(id),
            }
        } else {
            self.clone()
        };

        let info = self.construction_info(component);
        let activating = info.activator().activating();
        let construction_error = |argument: Option<ArgumentInfo>, source: ResolveErrorKind| {
            let err = ResolveErrorKind::Construction {
                component: component.provides(),
                activating,
                argument,
                source: Box::new(source),
            };
            error!("{}", err);
            err
        };

        let mut values = Vec::with_capacity(info.keys().len() + dynamic.len());
        for (index, key) in info.keys().iter().enumerate() {
            match resolving.get(key) {
                Ok(value) => values.push(value),
                Err(err) => {
                    return Err(construction_error(
                        Some(ArgumentInfo {
                            index,
                            key: key.clone(),
                        }),
                        err,
                    ))
                }
            }
        }
        values.extend(dynamic);

        info.activator()
            .invoke(component, Arguments::new(values))
            .map_err(|err| {
                let argument = match &err {
                    InstantiateErrorKind::MissingArgument { index } | InstantiateErrorKind::IncorrectArgumentType { index, .. } => {
                        info.keys().get(*index).map(|key| ArgumentInfo {
                            index: *index,
                            key: key.clone(),
                        })
                    }
                    InstantiateErrorKind::Custom(_) => None,
                };
                construction_error(argument, err.into())
            })
    }

    /// Resolves the type key of `T` and downcasts the result
    ///
    /// # Errors
    /// Returns [`ResolveErrorKind::IncorrectType`] if the value isn't a `T`, or whatever [`Self::get`] fails with
    pub fn resolve<T: Send + Sync + 'static>(&self) -> Result<Arc<T>, ResolveErrorKind> {
        self.resolve_key(&Key::of::<T>())
    }

    /// Resolves `key` and downcasts the result
    ///
    /// # Errors
    /// See [`Self::resolve`]
    pub fn resolve_key<T: Send + Sync + 'static>(&self, key: &Key) -> Result<Arc<T>, ResolveErrorKind> {
        self.get(key)?.downcast().map_err(|value| {
            let err = ResolveErrorKind::IncorrectType {
                expected: type_name::<T>(),
                found: value.found(),
            };
            error!("{}", err);
            err
        })
    }

    /// Resolves every value registered for the type key of `T` and downcasts them
    ///
    /// # Errors
    /// Returns [`ResolveErrorKind::IncorrectType`] if any value isn't a `T`, or whatever [`Self::get_all`] fails with
    pub fn resolve_all<T: Send + Sync + 'static>(&self) -> Result<Vec<Arc<T>>, ResolveErrorKind> {
        sequence_of(self.get_all(&Key::of::<T>())?).map_err(|value| {
            let err = ResolveErrorKind::IncorrectType {
                expected: type_name::<T>(),
                found: value.found(),
            };
            error!("{}", err);
            err
        })
    }
}

impl Container {
    /// The parent, carrying this handle's resolution chain
    #[must_use]
    pub fn parent(&self) -> Option<Container> {
        self.inner.parent.as_ref().map(|inner| Container {
            inner: inner.clone(),
            context: self.context.clone(),
        })
    }

    /// The topmost ancestor, or this container for a root
    #[must_use]
    pub fn root(&self) -> Container {
        Container {
            inner: self.root_inner(),
            context: self.context.clone(),
        }
    }

    #[inline]
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.inner.parent.is_none()
    }

    /// `true` if both handles point to the same container
    #[inline]
    #[must_use]
    pub fn ptr_eq(&self, other: &Container) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    #[inline]
    #[must_use]
    pub fn metadata(&self) -> &Metadata {
        &self.inner.metadata
    }

    #[inline]
    #[must_use]
    pub fn construction_info_cache(&self) -> &ConstructionInfoCache {
        &self.inner.cache
    }

    /// Same container with an empty resolution chain
    #[must_use]
    pub(crate) fn detached(&self) -> Container {
        Container {
            inner: self.inner.clone(),
            context: ResolutionContext::default(),
        }
    }

    /// Component declared in metadata for a type key
    pub(crate) fn component_for(&self, key: &Key) -> Result<Component, ResolveErrorKind> {
        key.type_info()
            .and_then(|class| self.inner.metadata.lookup::<Components>(class))
            .ok_or_else(|| {
                let err = ResolveErrorKind::InvalidKey { key: key.clone() };
                error!("{}", err);
                err
            })
    }

    fn root_inner(&self) -> Arc<ContainerInner> {
        self.inner.root.clone().unwrap_or_else(|| self.inner.clone())
    }

    fn construction_info(&self, component: &Component) -> Arc<ConstructionInfo> {
        if let Some(info) = self.inner.cache.get(&component.id()) {
            debug!("Found construction info in cache");
            return info;
        }
        debug!("Construction info not cached");
        self.inner
            .cache
            .insert(component.id(), self.create_construction_info(component))
    }

    fn create_construction_info(&self, component: &Component) -> ConstructionInfo {
        let activator: Arc<dyn Activator> = match self.inner.metadata.lookup::<Activators>(&component.provides()) {
            Some(activator) => activator,
            None => Arc::new(ClassActivator),
        };

        let keys = if let Some(inject) = component.inject() {
            Cow::Owned(inject.keys())
        } else if let Some(keys) = self.locate_parameter_info(component) {
            Cow::Owned(keys)
        } else if !component.parameters().is_empty() {
            Cow::Owned(component.parameters().to_vec())
        } else {
            Cow::Borrowed(EMPTY_KEYS)
        };

        ConstructionInfo::new(activator, keys)
    }

    fn locate_parameter_info(&self, component: &Component) -> Option<Vec<Key>> {
        let locators = self.inner.locators.lock().clone();
        locators.iter().find_map(|locator| locator(component))
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new(Metadata::new())
    }
}

impl Debug for Container {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("root", &self.is_root())
            .field("registered_keys", &self.inner.registry.lock().len())
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}
