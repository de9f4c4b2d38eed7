//! Application state shared across handlers

use std::sync::Arc;

use application::{PredictionService, UserDirectory};
use infrastructure::AppConfig;

use crate::handlers::backups::BackupQueue;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Prediction service over the completion port
    pub prediction_service: Arc<PredictionService>,
    /// In-memory user directory
    pub user_directory: Arc<UserDirectory>,
    /// Queued backup jobs
    pub backups: Arc<BackupQueue>,
    /// Application configuration
    pub config: Arc<AppConfig>,
}
