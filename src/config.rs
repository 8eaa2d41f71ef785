/// Config for a container tree, inherited by every child
/// ## Fields
/// - `detect_cycles`:
///   If `true`, invoking a component that is already being invoked further up the
///   same resolution chain fails with [`crate::ResolveErrorKind::CyclicDependency`].
///
///   If `false`, such a cycle recurses until the stack is exhausted.
///   Use the `Lazy` resolver to break intended cycles in either case.
#[derive(Debug, Clone, Copy)]
pub struct Config {
    pub detect_cycles: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self { detect_cycles: true }
    }
}
