use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque post identifier. Gateway-assigned ids are UUIDs; posts created
/// while the gateway was unreachable carry a `local-` prefixed id instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PostId(String);

impl PostId {
    pub fn new(value: String) -> Result<Self, String> {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed == "undefined" {
            return Err("Post id cannot be empty".to_string());
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Id for a post that only exists on this client.
    pub fn local(now_millis: i64) -> Self {
        Self(format!("local-{now_millis}"))
    }

    pub fn is_local(&self) -> bool {
        self.0.starts_with("local-")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<PostId> for String {
    fn from(id: PostId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_and_undefined() {
        assert!(PostId::new("  ".to_string()).is_err());
        assert!(PostId::new("undefined".to_string()).is_err());
    }

    #[test]
    fn local_ids_are_recognizable() {
        let id = PostId::local(1_700_000_000_000);
        assert!(id.is_local());
        assert_eq!(id.as_str(), "local-1700000000000");
    }
}
