use thiserror::Error;

pub type SceneResult<T> = Result<T, SceneError>;

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("date axis requires a base interval")]
    MissingBaseInterval,

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("unknown reference `{0}` in snapshot")]
    UnknownRef(String),

    #[error("malformed snapshot: {0}")]
    MalformedSnapshot(String),
}
