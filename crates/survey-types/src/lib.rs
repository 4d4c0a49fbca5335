//! Shared types, errors, and records for the survey scope engine.
//!
//! This crate provides the foundational types used across all other survey crates:
//! - `SurveyError` — unified error taxonomy
//! - `GeologicalInput` — the project description a run is evaluated against
//! - `Tier` / `DocumentClass` / `Normative` — regulatory precedence and citations
//! - `WorkItem` / `Statistics` / `RulesEngineResult` — what a run produces

pub mod input;
pub mod normative;
pub mod result;
pub mod work;

pub use input::GeologicalInput;
pub use normative::{DocumentClass, Normative, Tier};
pub use result::{
    AppliedBlock, CalculatedValue, RuleDiagnostic, RuleStage, RulesEngineResult, Statistics,
};
pub use work::{SurveyModule, WorkCategory, WorkItem};

/// Unified error type for all survey subsystems.
#[derive(Debug, thiserror::Error)]
pub enum SurveyError {
    // === Configuration Errors ===
    #[error("Block '{block}' declares no variants")]
    EmptyVariants { block: String },

    #[error("Block id '{block}' is declared more than once")]
    DuplicateBlock { block: String },

    #[error("Block '{block}' depends on unknown block '{dependency}'")]
    UnknownDependency { block: String, dependency: String },

    #[error("Dependency cycle detected at block '{block}'")]
    DependencyCycle { block: String },

    #[error("Registry validation failed: {0}")]
    ValidationError(String),

    // === Rule Evaluation Errors ===
    #[error("Rule '{block}' failed during {stage}: {message}")]
    RuleEvaluation {
        block: String,
        stage: RuleStage,
        message: String,
    },

    #[error("Required input field '{field}' is missing")]
    MissingField { field: String },

    /// A declarative condition that does not parse. Recovered per block.
    #[error("Malformed condition '{expression}': {message}")]
    ConditionParse { expression: String, message: String },

    // === Generic ===
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl SurveyError {
    /// Returns `true` for malformed-registry errors that abort a run.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            SurveyError::EmptyVariants { .. }
                | SurveyError::DuplicateBlock { .. }
                | SurveyError::UnknownDependency { .. }
                | SurveyError::DependencyCycle { .. }
                | SurveyError::ValidationError(_)
        )
    }

    /// The offending block id, if the error names one.
    pub fn block_id(&self) -> Option<&str> {
        match self {
            SurveyError::EmptyVariants { block }
            | SurveyError::DuplicateBlock { block }
            | SurveyError::UnknownDependency { block, .. }
            | SurveyError::DependencyCycle { block }
            | SurveyError::RuleEvaluation { block, .. } => Some(block),
            _ => None,
        }
    }

    /// Shorthand for a `MissingField` error, used by rule functions that
    /// genuinely cannot proceed without a value.
    pub fn missing(field: impl Into<String>) -> Self {
        SurveyError::MissingField {
            field: field.into(),
        }
    }
}

/// A convenience alias for `Result<T, SurveyError>`.
pub type Result<T> = std::result::Result<T, SurveyError>;
