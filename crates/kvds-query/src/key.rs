use std::fmt;

use serde::{Deserialize, Serialize};

const SEP: char = '/';

/// Hierarchical, slash-delimited key.
///
/// Keys built with [`Key::new`] are always clean:
///
/// - start with `/`
/// - never end with `/`, except the root key `/`
/// - contain no empty, `.` or `..` segments (`..` is resolved lexically)
///
/// The byte form used by the store is the UTF-8 of the string form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub struct Key(String);

impl Key {
    pub fn new(s: impl AsRef<str>) -> Self {
        Key(clean(s.as_ref()))
    }

    pub fn root() -> Self {
        Key(SEP.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    /// Path segments, e.g. `["a", "b"]` for `/a/b`. Empty for the root.
    pub fn namespaces(&self) -> Vec<&str> {
        self.0.split(SEP).filter(|s| !s.is_empty()).collect()
    }

    /// Last segment; empty for the root.
    pub fn name(&self) -> &str {
        self.0.rsplit(SEP).next().unwrap_or("")
    }

    pub fn parent(&self) -> Key {
        match self.0.rfind(SEP) {
            Some(0) | None => Key::root(),
            Some(idx) => Key(self.0[..idx].to_string()),
        }
    }

    pub fn child(&self, name: impl AsRef<str>) -> Key {
        Key::new(format!("{}/{}", self.0, name.as_ref()))
    }

    pub fn is_top_level(&self) -> bool {
        self.namespaces().len() == 1
    }

    pub fn is_ancestor_of(&self, other: &Key) -> bool {
        if self.is_root() {
            return !other.is_root();
        }
        other
            .0
            .strip_prefix(self.0.as_str())
            .is_some_and(|rest| rest.starts_with(SEP))
    }

    pub fn is_descendant_of(&self, other: &Key) -> bool {
        other.is_ancestor_of(self)
    }
}

impl Default for Key {
    fn default() -> Self {
        Key::root()
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::new(s)
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::new(s)
    }
}

impl From<Key> for String {
    fn from(key: Key) -> Self {
        key.0
    }
}

impl AsRef<[u8]> for Key {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

/// Turn a query prefix into the byte prefix of a scan: the clean key with a
/// trailing separator, so `/a` matches `/a/b` but not `/ab`. The root stays
/// `/`.
pub fn normalize_prefix(prefix: &str) -> String {
    let mut prefix = clean(prefix);
    if prefix != "/" {
        prefix.push(SEP);
    }
    prefix
}

fn clean(s: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in s.split(SEP) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            segment => segments.push(segment),
        }
    }

    if segments.is_empty() {
        return SEP.to_string();
    }
    let mut out = String::with_capacity(s.len() + 1);
    for segment in segments {
        out.push(SEP);
        out.push_str(segment);
    }
    out
}
