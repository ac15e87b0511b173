use thiserror::Error;

use crate::{CompileError, EvaluationError, LocaleError};

/// Unified error type for the convenience entry points.
///
/// Returned by [`compile_json()`](crate::compile_json) and usable with `?`
/// across compilation, evaluation and locale lookup.
#[derive(Debug, Error)]
pub enum SieveError {
    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Evaluation(#[from] EvaluationError),

    #[error("invalid rule JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Locale(#[from] LocaleError),
}
