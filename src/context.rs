use alloc::{boxed::Box, sync::Arc, vec::Vec};

use crate::{any::TypeInfo, component::ComponentId};

struct Frame {
    component: ComponentId,
    parent: Option<Arc<Frame>>,
}

/// Components being invoked along one resolution chain, innermost first.
///
/// Carried by each [`crate::Container`] handle rather than stored in the
/// container, so separate chains (and threads) never see each other.
#[derive(Clone, Default)]
pub(crate) struct ResolutionContext {
    head: Option<Arc<Frame>>,
}

impl ResolutionContext {
    #[must_use]
    pub(crate) fn push(&self, component: ComponentId) -> Self {
        Self {
            head: Some(Arc::new(Frame {
                component,
                parent: self.head.clone(),
            })),
        }
    }

    #[must_use]
    pub(crate) fn contains(&self, component: &ComponentId) -> bool {
        self.frames().any(|frame| frame.component == *component)
    }

    /// Provided types from the outermost invocation to `last`
    #[must_use]
    pub(crate) fn chain_to(&self, last: ComponentId) -> Box<[TypeInfo]> {
        let mut chain: Vec<_> = self.frames().map(|frame| frame.component.provides()).collect();
        chain.reverse();
        chain.push(last.provides());
        chain.into_boxed_slice()
    }

    fn frames(&self) -> impl Iterator<Item = &Frame> {
        let mut next = self.head.as_deref();
        core::iter::from_fn(move || {
            let frame = next?;
            next = frame.parent.as_deref();
            Some(frame)
        })
    }
}
