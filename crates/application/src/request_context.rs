//! Request context for propagating identity and request metadata
//!
//! `RequestContext` carries the authenticated identity and per-request
//! metadata from the HTTP middleware into application services. It is
//! created once at request entry and never shared across requests.

use chrono::{DateTime, Utc};
use domain::{TenantId, UserId};
use uuid::Uuid;

/// Context for a single request
///
/// Created by the security middleware after the request clears the pipeline
/// and attached to the request extensions. Provides:
///
/// - `user_id`: the authenticated user making the request
/// - `tenant_id`: the tenant the user belongs to
/// - `request_id`: a unique identifier for tracing/log correlation
/// - `timestamp`: when the request was received
#[derive(Debug, Clone)]
pub struct RequestContext {
    user_id: UserId,
    tenant_id: TenantId,
    request_id: Uuid,
    timestamp: DateTime<Utc>,
}

impl RequestContext {
    /// Create a new request context for the given identity
    #[must_use]
    pub fn new(user_id: UserId, tenant_id: TenantId) -> Self {
        Self {
            user_id,
            tenant_id,
            request_id: Uuid::new_v4(),
            timestamp: Utc::now(),
        }
    }

    /// Create a request context with a specific request ID
    ///
    /// Used when the ID was already assigned upstream (request-id middleware).
    #[must_use]
    pub fn with_request_id(user_id: UserId, tenant_id: TenantId, request_id: Uuid) -> Self {
        Self {
            user_id,
            tenant_id,
            request_id,
            timestamp: Utc::now(),
        }
    }

    /// Get the authenticated user ID
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Get the tenant ID
    #[must_use]
    pub const fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    /// Get the unique request identifier
    #[must_use]
    pub const fn request_id(&self) -> Uuid {
        self.request_id
    }

    /// Get the timestamp when the request was received
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}
