use serde::{Deserialize, Serialize};

/// One item produced by a scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub key: String,
    /// `None` for key-only queries.
    pub value: Option<Vec<u8>>,
    /// Byte length of the value, set only when sizes were requested.
    pub size: Option<usize>,
}

impl Entry {
    pub fn new(key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            value: Some(value.into()),
            size: None,
        }
    }

    pub fn key_only(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: None,
            size: None,
        }
    }

    /// The value, or an empty slice when it was not loaded.
    pub fn value_bytes(&self) -> &[u8] {
        self.value.as_deref().unwrap_or_default()
    }
}
