#[derive(thiserror::Error, Debug)]
pub enum InstantiateErrorKind {
    #[error("Argument at index {index} is missing")]
    MissingArgument { index: usize },
    #[error("Argument at index {index} has incorrect type. Found: {found}, expected: {expected}")]
    IncorrectArgumentType {
        index: usize,
        expected: &'static str,
        found: &'static str,
    },
    #[error(transparent)]
    Custom(#[from] anyhow::Error),
}
