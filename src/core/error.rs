use thiserror::Error;

pub type ModelResult<T> = Result<T, ModelError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("invalid {name} ({value}): {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },
}

impl ModelError {
    pub(crate) fn invalid(name: &'static str, value: f64, reason: &'static str) -> Self {
        ModelError::InvalidParameter {
            name,
            value,
            reason,
        }
    }

    pub fn parameter_name(&self) -> &'static str {
        match self {
            ModelError::InvalidParameter { name, .. } => *name,
        }
    }
}
