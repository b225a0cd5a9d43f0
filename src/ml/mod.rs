//! Model building blocks: column encoding, minority oversampling and a
//! random-forest classifier, bundled into the serialized [`pipeline::RiskPipeline`].

pub mod encoder;
pub mod forest;
pub mod pipeline;
pub mod smote;
pub mod tree;

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("No rows supplied to {0}")]
    EmptyInput(&'static str),

    #[error("Feature and label counts differ ({features} rows, {labels} labels)")]
    LengthMismatch { features: usize, labels: usize },

    #[error("Expected {expected} features, got {actual}")]
    FeatureWidth { expected: usize, actual: usize },

    #[error("Label index {label} out of range for {n_classes} classes")]
    LabelOutOfRange { label: usize, n_classes: usize },

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Non-finite value in column {0}")]
    NonFinite(String),

    #[error("Invalid model parameter: {0}")]
    InvalidParameter(String),

    #[error("Corrupt model artifact: {0}")]
    Corrupt(String),

    #[error("Failed to read or write model artifact: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to (de)serialize model artifact: {0}")]
    Serialize(#[from] serde_json::Error),
}
