#![cfg_attr(not(test), no_std)]

extern crate alloc;

#[macro_use]
pub(crate) mod macros;

pub(crate) mod activator;
pub(crate) mod any;
pub(crate) mod cache;
pub(crate) mod component;
pub(crate) mod config;
pub(crate) mod container;
pub(crate) mod context;
pub(crate) mod dependency;
pub(crate) mod dependency_resolver;
pub(crate) mod errors;
pub(crate) mod inject;
pub(crate) mod instantiator;
pub(crate) mod key;
pub(crate) mod metadata;
pub(crate) mod registration;
pub(crate) mod registry;
pub(crate) mod resolver;
pub(crate) mod service;
pub(crate) mod value;

pub use activator::{Activator, ClassActivator, FactoryActivator};
pub use any::{Instance, TypeInfo};
pub use cache::{ConstructionInfo, ConstructionInfoCache};
pub use component::{Component, ComponentId};
pub use config::Config;
pub use container::{Container, ParameterInfoLocator};
pub use dependency::DependencyDescriptor;
pub use dependency_resolver::{Arguments, DependencyResolver};
pub use errors::{ArgumentInfo, InstantiateErrorKind, ResolveErrorKind};
pub use inject::{Deferred, Dynamic, Inject, InjectAll, InjectLazy, InjectOptional, InjectParent};
pub use instantiator::{instance, Instantiator};
pub use key::Key;
pub use metadata::{Activators, Capability, Components, Injectable, Metadata, Registrations};
pub use registration::{Registration, Singleton, Transient};
pub use resolver::{Resolve, Resolver};
pub use value::{Accessor, Value};
