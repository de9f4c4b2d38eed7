//! Application services

mod prediction_service;
mod user_directory;

pub use prediction_service::{ArticleInput, PredictionService};
pub use user_directory::{UserDirectory, UserRecord};
