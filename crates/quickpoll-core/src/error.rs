use quickpoll_db::DbError;
use std::fmt;
use thiserror::Error;

/// What a [`CoreError::NotFound`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Poll,
    Option,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Poll => f.write_str("poll"),
            Resource::Option => f.write_str("option"),
        }
    }
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("{0} not found")]
    NotFound(Resource),
    #[error("store error: {0}")]
    Store(#[from] DbError),
    #[error("store call timed out: {0}")]
    StoreTimeout(&'static str),
}

impl CoreError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        CoreError::InvalidInput(msg.into())
    }
}
