use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeskError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Credential hashing error: {0}")]
    Hashing(#[from] bcrypt::BcryptError),

    #[error("Validation failed: {reason}")]
    Validation { reason: String },

    #[error("Classifier artifact unavailable; complaint submission is disabled")]
    ClassifierUnavailable,

    #[error("Complaint {complaint_id} not found")]
    ComplaintNotFound { complaint_id: i64 },

    #[error("Username '{username}' is already taken")]
    DuplicateUsername { username: String },

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Role mismatch: '{username}' is not registered as {claimed}")]
    RoleMismatch { username: String, claimed: String },

    #[error("Forbidden: {reason}")]
    Forbidden { reason: String },

    #[error("Integrity violation: {context}")]
    Integrity { context: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type DeskResult<T> = Result<T, DeskError>;
