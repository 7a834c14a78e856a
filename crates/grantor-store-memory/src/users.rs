//! In-memory resource-owner directory.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use grantor_oauth2::AuthResult;
use grantor_oauth2::store::CredentialVerifier;

/// A username/password directory held in memory.
///
/// Passwords are stored as-is; this is demo and test tooling, not a place
/// to keep real credentials.
#[derive(Default)]
pub struct MemoryUserDirectory {
    users: RwLock<HashMap<String, String>>,
}

impl MemoryUserDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a directory pre-populated with the given users.
    #[must_use]
    pub fn with_users(
        users: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>,
    ) -> Self {
        Self {
            users: RwLock::new(
                users
                    .into_iter()
                    .map(|(username, password)| (username.into(), password.into()))
                    .collect(),
            ),
        }
    }

    /// Adds or replaces a user.
    pub async fn insert(&self, username: impl Into<String>, password: impl Into<String>) {
        self.users
            .write()
            .await
            .insert(username.into(), password.into());
    }
}

#[async_trait]
impl CredentialVerifier for MemoryUserDirectory {
    async fn verify(&self, username: &str, password: &str) -> AuthResult<bool> {
        let users = self.users.read().await;
        Ok(users
            .get(username)
            .is_some_and(|stored| constant_time_eq(stored, password)))
    }
}

/// Byte-wise comparison that does not short-circuit on the first mismatch.
fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes().zip(b.bytes()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_verify() {
        let users = MemoryUserDirectory::with_users([("demousername1", "demopassword1")]);

        assert!(users.verify("demousername1", "demopassword1").await.unwrap());
        assert!(!users.verify("demousername1", "wrong").await.unwrap());
        assert!(!users.verify("nobody", "demopassword1").await.unwrap());
    }

    #[tokio::test]
    async fn test_insert_replaces_password() {
        let users = MemoryUserDirectory::new();
        users.insert("demousername1", "first").await;
        users.insert("demousername1", "second").await;

        assert!(!users.verify("demousername1", "first").await.unwrap());
        assert!(users.verify("demousername1", "second").await.unwrap());
    }
}
