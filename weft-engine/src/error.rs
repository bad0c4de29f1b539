use thiserror::Error;

use crate::validate::ValidationReport;

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Error, Debug, Clone)]
pub enum EngineError {
    #[error("Unknown component '{component_id}'")]
    ComponentNotFound { component_id: String },

    #[error("Validation failed for component '{component_id}': {}", report.errors.join("; "))]
    ValidationFailed {
        component_id: String,
        report: ValidationReport,
    },

    #[error("No live instance with id '{instance_id}'")]
    InstanceNotFound { instance_id: String },

    #[error("No group with id '{group_id}'")]
    GroupNotFound { group_id: String },

    #[error("Invalid prop '{prop}' for component '{component_id}': {reason}")]
    InvalidProp {
        component_id: String,
        prop: String,
        reason: String,
    },

    #[error("Invalid placement target '{selector}': {reason}")]
    InvalidTarget { selector: String, reason: String },

    #[error("Template error in component '{component_id}': {message}")]
    TemplateError {
        component_id: String,
        message: String,
    },
}

impl EngineError {
    /// Errors that abort before any state mutation. Currently all of them,
    /// kept as a method so callers do not hard-code the taxonomy.
    pub fn is_fatal(&self) -> bool {
        true
    }
}
