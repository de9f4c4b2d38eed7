//! Domain entities

mod prediction;

pub use prediction::{Prediction, PredictionKind};
