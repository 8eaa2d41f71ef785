use alloc::boxed::Box;
use core::fmt::{self, Display, Formatter};

use super::instantiate::InstantiateErrorKind;
use crate::{any::TypeInfo, key::Key};

#[derive(thiserror::Error, Debug)]
pub enum ResolveErrorKind {
    #[error("Invalid key `{key}`: no component is declared for it")]
    InvalidKey { key: Key },
    #[error("`{strategy}` must implement `{method}`")]
    UnimplementedStrategy { strategy: &'static str, method: &'static str },
    #[error("Incorrect value type. Found: {found}, expected: {expected}")]
    IncorrectType { expected: &'static str, found: &'static str },
    #[error("{}", CyclicChain(.chain))]
    CyclicDependency { chain: Box<[TypeInfo]> },
    #[error(
        "Error {activating} {}.{} Check the inner error for details.",
        .component.short_name(), ArgumentNote(.argument),
    )]
    Construction {
        component: TypeInfo,
        activating: &'static str,
        argument: Option<ArgumentInfo>,
        #[source]
        source: Box<ResolveErrorKind>,
    },
    #[error(transparent)]
    Instantiate(#[from] InstantiateErrorKind),
}

/// Position and key of a constructor argument that couldn't be satisfied
#[derive(Debug, Clone)]
pub struct ArgumentInfo {
    pub index: usize,
    pub key: Key,
}

impl ResolveErrorKind {
    /// Walks [`Self::Construction`] wrappers down to the error that started the failure
    #[must_use]
    pub fn root_cause(&self) -> &ResolveErrorKind {
        let mut err = self;
        while let ResolveErrorKind::Construction { source, .. } = err {
            err = source;
        }
        err
    }
}

struct CyclicChain<'a>(&'a [TypeInfo]);

impl Display for CyclicChain<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Cyclic dependency detected: ")?;
        for (index, type_info) in self.0.iter().enumerate() {
            if index > 0 {
                write!(f, " -> ")?;
            }
            write!(f, "{}", type_info.short_name())?;
        }
        Ok(())
    }
}

struct ArgumentNote<'a>(&'a Option<ArgumentInfo>);

impl Display for ArgumentNote<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(ArgumentInfo { index, key }) => {
                write!(f, " The argument at index {index} (key: {key}) could not be satisfied.")
            }
            None => Ok(()),
        }
    }
}
