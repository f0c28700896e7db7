use std::fmt;

#[derive(Debug)]
pub enum StoreError {
    Closed,
    LockPoisoned(String),
    Storage(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Closed => write!(f, "store is closed"),
            StoreError::LockPoisoned(msg) => write!(f, "lock poisoned: {msg}"),
            StoreError::Storage(msg) => write!(f, "storage error: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}
