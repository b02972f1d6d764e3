use thiserror::Error;

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("board outline is not closed: ring with {vertices} vertices")]
    InvalidOutline { vertices: usize },

    #[error("unknown net '{0}'")]
    UnknownNet(String),

    #[error("board sanity check failed: {0}")]
    CheckFailed(String),
}
