//! In-memory user directory
//!
//! A minimal registration/listing collaborator for the API surface. Real
//! deployments replace this with the account service; the directory keeps
//! the HTTP layer honest without dragging a database into this crate.

use chrono::{DateTime, Utc};
use domain::{DomainError, TenantId, UserId};
use serde::Serialize;
use tokio::sync::RwLock;

use crate::error::ApplicationError;

/// A registered user
#[derive(Debug, Clone, Serialize)]
pub struct UserRecord {
    /// Unique user identifier
    pub id: UserId,
    /// Tenant the user belongs to
    pub tenant_id: TenantId,
    /// E-mail address (unique within the directory)
    pub email: String,
    /// Display name
    pub full_name: String,
    /// Optional phone number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// When the user registered
    pub created_at: DateTime<Utc>,
}

/// Process-local user store
#[derive(Debug, Default)]
pub struct UserDirectory {
    users: RwLock<Vec<UserRecord>>,
}

impl UserDirectory {
    /// Create an empty directory
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new user
    ///
    /// E-mail addresses are unique; re-registering one fails.
    pub async fn register(
        &self,
        email: impl Into<String>,
        full_name: impl Into<String>,
        phone: Option<String>,
    ) -> Result<UserRecord, ApplicationError> {
        let email = email.into();
        let mut users = self.users.write().await;

        if users.iter().any(|u| u.email.eq_ignore_ascii_case(&email)) {
            return Err(DomainError::ValidationError(format!(
                "email already registered: {email}"
            ))
            .into());
        }

        let record = UserRecord {
            id: UserId::new(),
            tenant_id: TenantId::default(),
            email,
            full_name: full_name.into(),
            phone,
            created_at: Utc::now(),
        };
        users.push(record.clone());
        Ok(record)
    }

    /// List users with 1-based pagination
    ///
    /// Returns the page slice and the total number of users.
    pub async fn list(&self, page: usize, limit: usize) -> (Vec<UserRecord>, usize) {
        let users = self.users.read().await;
        let total = users.len();
        let start = page.saturating_sub(1).saturating_mul(limit);
        let slice = users.iter().skip(start).take(limit).cloned().collect();
        (slice, total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn register_assigns_id_and_timestamps() {
        let directory = UserDirectory::new();
        let user = directory
            .register("trader@example.in", "Asha Rao", None)
            .await
            .unwrap();

        assert_eq!(user.email, "trader@example.in");
        assert!(user.phone.is_none());
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected_case_insensitively() {
        let directory = UserDirectory::new();
        directory
            .register("trader@example.in", "Asha Rao", None)
            .await
            .unwrap();

        let err = directory
            .register("Trader@Example.in", "Imposter", None)
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::Domain(_)));
    }

    #[tokio::test]
    async fn list_pages_from_one() {
        let directory = UserDirectory::new();
        for i in 0..5 {
            directory
                .register(format!("u{i}@example.in"), format!("User {i}"), None)
                .await
                .unwrap();
        }

        let (page1, total) = directory.list(1, 2).await;
        assert_eq!(total, 5);
        assert_eq!(page1.len(), 2);
        assert_eq!(page1[0].email, "u0@example.in");

        let (page3, _) = directory.list(3, 2).await;
        assert_eq!(page3.len(), 1);
        assert_eq!(page3[0].email, "u4@example.in");
    }

    #[tokio::test]
    async fn list_past_the_end_is_empty() {
        let directory = UserDirectory::new();
        let (items, total) = directory.list(7, 10).await;
        assert!(items.is_empty());
        assert_eq!(total, 0);
    }
}
