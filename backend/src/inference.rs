use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use once_cell::sync::Lazy;
use serde::Serialize;

use crate::models::{FormInput, PredictionResult};

const MODEL_VERSION: &str = "0.1.0-placeholder";

static MODEL: Lazy<Arc<ModelInference>> = Lazy::new(|| Arc::new(ModelInference::new()));

/// Shared model instance for the whole server.
pub fn get_model() -> Arc<ModelInference> {
    MODEL.clone()
}

/// Where a prediction request came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictionSource {
    /// A form session submit.
    Session,
    /// A one-shot `/api/predict` call.
    Stateless,
}

/// Placeholder earthquake model.
///
/// The form parameters are collected but never read: every prediction is the
/// same literal record.
#[derive(Debug, Default)]
pub struct ModelInference {
    session_submits: AtomicU64,
    stateless_predictions: AtomicU64,
}

impl ModelInference {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn predict(&self, _features: &FormInput, source: PredictionSource) -> PredictionResult {
        let counter = match source {
            PredictionSource::Session => &self.session_submits,
            PredictionSource::Stateless => &self.stateless_predictions,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        PredictionResult {
            predicted_magnitude: 6.5,
            expected_depth: 10,
            probability_of_occurrence: "75%".to_string(),
        }
    }

    pub fn get_stats(&self) -> PredictionStats {
        PredictionStats {
            session_submits: self.session_submits.load(Ordering::Relaxed),
            stateless_predictions: self.stateless_predictions.load(Ordering::Relaxed),
        }
    }

    pub fn get_model_info(&self) -> ModelInfo {
        ModelInfo {
            version: MODEL_VERSION.to_string(),
            input_independent: true,
            features: vec![
                "latitude".to_string(),
                "longitude".to_string(),
                "country".to_string(),
                "city".to_string(),
                "depth".to_string(),
                "magnitude".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PredictionStats {
    pub session_submits: u64,
    pub stateless_predictions: u64,
}

#[derive(Serialize)]
pub struct ModelInfo {
    pub version: String,
    pub input_independent: bool,
    pub features: Vec<String>,
}
