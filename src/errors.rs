mod dependency_resolver;
mod instantiate;

pub use dependency_resolver::{ArgumentInfo, ResolveErrorKind};
pub use instantiate::InstantiateErrorKind;
