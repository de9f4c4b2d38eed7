//! Backup job handlers
//!
//! Jobs are queued in process memory; the worker that executes them is an
//! external collaborator.

use axum::{Extension, Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::sync::RwLock;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{error::ApiError, middleware::ValidatedData, state::AppState};

/// Backup payload, already validated against `backup.create`
#[derive(Debug, Deserialize)]
pub struct BackupRequest {
    #[serde(rename = "type")]
    pub backup_type: String,
    pub priority: String,
    pub compression: bool,
    pub encryption: bool,
}

/// A queued backup job
#[derive(Debug, Clone, Serialize)]
pub struct BackupJob {
    /// Job identifier
    pub id: Uuid,
    /// full, incremental or differential
    #[serde(rename = "type")]
    pub backup_type: String,
    /// high, normal or low
    pub priority: String,
    /// Compress the archive
    pub compression: bool,
    /// Encrypt the archive
    pub encryption: bool,
    /// Always "queued" until a worker picks the job up
    pub status: String,
    /// When the job was requested
    pub requested_at: DateTime<Utc>,
}

/// Process-local backup job queue
#[derive(Debug, Default)]
pub struct BackupQueue {
    jobs: RwLock<Vec<BackupJob>>,
}

impl BackupQueue {
    /// Create an empty queue
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a job
    pub async fn enqueue(&self, job: BackupJob) {
        self.jobs.write().await.push(job);
    }

    /// Page through queued jobs, newest first
    pub async fn list(&self, page: usize, limit: usize) -> (Vec<BackupJob>, usize) {
        let jobs = self.jobs.read().await;
        let total = jobs.len();
        let start = page.saturating_sub(1).saturating_mul(limit);
        let slice = jobs.iter().rev().skip(start).take(limit).cloned().collect();
        (slice, total)
    }
}

/// Queue a backup job
#[instrument(skip_all)]
pub async fn create_backup(
    State(state): State<AppState>,
    Extension(validated): Extension<ValidatedData>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let request: BackupRequest = validated.body_as()?;

    let job = BackupJob {
        id: Uuid::new_v4(),
        backup_type: request.backup_type,
        priority: request.priority,
        compression: request.compression,
        encryption: request.encryption,
        status: "queued".to_string(),
        requested_at: Utc::now(),
    };
    info!(job_id = %job.id, backup_type = %job.backup_type, "Backup job queued");
    state.backups.enqueue(job.clone()).await;

    Ok((
        StatusCode::ACCEPTED,
        Json(json!({"success": true, "data": job})),
    ))
}

/// List queued backup jobs
pub async fn list_backups(
    State(state): State<AppState>,
    Extension(validated): Extension<ValidatedData>,
) -> Result<Json<Value>, ApiError> {
    let pagination: super::users::Pagination = validated.query_as()?;
    let (items, total) = state.backups.list(pagination.page, pagination.limit).await;

    Ok(Json(json!({
        "success": true,
        "data": {
            "items": items,
            "page": pagination.page,
            "limit": pagination.limit,
            "total": total,
        }
    })))
}
