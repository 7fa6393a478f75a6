use thiserror::Error;

pub type Result<T> = std::result::Result<T, GraphError>;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Invalid direction '{0}' (expected forward or reverse)")]
    InvalidDirection(String),

    #[error(transparent)]
    InvalidKind(#[from] archmap_facts::ParseKindError),
}
