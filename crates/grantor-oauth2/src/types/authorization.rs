//! Resource-owner approval record.

use serde::{Deserialize, Serialize};

/// Records that a resource owner has approved a client for a scope set.
///
/// Created at approval time (outside the engine) and read during
/// authorization requests to support non-interactive re-approval: a request
/// whose scope is covered by a stored approval goes straight through.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Authorization {
    /// The approving resource owner.
    pub username: String,

    /// The approved client.
    pub client_id: String,

    /// Approved scope names (order-irrelevant set).
    pub scope: Vec<String>,
}

impl Authorization {
    /// Creates a new approval record.
    #[must_use]
    pub fn new(
        username: impl Into<String>,
        client_id: impl Into<String>,
        scope: Vec<String>,
    ) -> Self {
        Self {
            username: username.into(),
            client_id: client_id.into(),
            scope,
        }
    }

    /// Returns `true` if this approval covers the requested scope set.
    #[must_use]
    pub fn covers(&self, requested: &[String]) -> bool {
        super::scope::scope_is_subset(requested, &self.scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_covers() {
        let authorization = Authorization::new(
            "demousername2",
            "http://democlient2.com/",
            vec!["demoscope1".to_string(), "demoscope2".to_string()],
        );

        assert!(authorization.covers(&["demoscope1".to_string()]));
        assert!(authorization.covers(&[
            "demoscope1".to_string(),
            "demoscope2".to_string()
        ]));
        assert!(authorization.covers(&[]));
        assert!(!authorization.covers(&["demoscope3".to_string()]));
    }
}
