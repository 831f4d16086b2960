use thiserror::Error;

pub type Result<T> = std::result::Result<T, M72Error>;

#[derive(Debug, Error)]
pub enum M72Error {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("layout error: {0}")]
    Layout(String),
}
