use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatastoreConfig {
    /// Capacity of a query's result channel.
    pub result_buffer: usize,
    /// Capacity used instead when the query is key-only; entries are small.
    pub keys_only_buffer: usize,
}

impl DatastoreConfig {
    pub(crate) fn buffer_for(&self, keys_only: bool) -> usize {
        if keys_only {
            self.keys_only_buffer
        } else {
            self.result_buffer
        }
    }
}

impl Default for DatastoreConfig {
    fn default() -> Self {
        Self {
            result_buffer: 1,
            keys_only_buffer: 128,
        }
    }
}
