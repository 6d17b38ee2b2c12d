use thiserror::Error;

#[derive(Debug, Error)]
pub enum FleetFinanceError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("storage error: {0}")]
    Storage(String),

    #[error("concurrent modification of {entity} {id}")]
    StateConflict { entity: &'static str, id: String },
}

impl FleetFinanceError {
    /// True for errors the caller can fix by correcting input; these are
    /// never worth retrying as-is.
    pub fn is_validation(&self) -> bool {
        matches!(self, FleetFinanceError::Validation { .. })
    }
}
