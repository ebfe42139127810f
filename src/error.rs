use thiserror::Error;

/// Main error type for the pick engine
#[derive(Error, Debug)]
pub enum PickwiseError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // Request validation errors
    #[error("Validation failed: {0}")]
    Validation(String),

    // Selection outcome
    #[error("No viable candidate: {evaluated} candidates from {games} games failed viability")]
    NoViableCandidate { games: usize, evaluated: usize },

    // Collaborator errors
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Scoring error: {0}")]
    Scoring(#[from] ScoringError),

    // Model loading errors
    #[error("Model error: {0}")]
    Model(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl PickwiseError {
    /// True for errors caused by the caller's request rather than the engine
    pub fn is_client_error(&self) -> bool {
        matches!(self, PickwiseError::Validation(_) | PickwiseError::Json(_))
    }
}

/// Result type alias for PickwiseError
pub type Result<T> = std::result::Result<T, PickwiseError>;

/// Errors raised by team/odds/weather data providers.
///
/// Always recovered inside the engine by substituting defaults.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    #[error("Provider unavailable: {0}")]
    Unavailable(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid credentials for {0}")]
    InvalidCredentials(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

/// Errors raised while computing one feature group
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FeatureError {
    #[error("Non-finite value for {field}: {value}")]
    NonFinite { field: &'static str, value: f64 },
}

/// Errors raised while scoring one candidate
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScoringError {
    #[error("Model inference failed: {0}")]
    Inference(String),

    #[error("Missing feature: {0}")]
    MissingFeature(String),

    #[error("Invalid probability: {0}")]
    InvalidProbability(f64),

    #[error("Invalid odds: {0}")]
    InvalidOdds(f64),
}
