// ABOUTME: Error types for evaluation and read failures in the interpreter

use crate::heap::Heap;
use crate::value::Value;
use thiserror::Error;

pub const ARITY_ONE: &str = "1";
pub const ARITY_TWO: &str = "2";
pub const ARITY_AT_LEAST_ONE: &str = "at least 1";
pub const ARITY_ONE_OR_TWO: &str = "1-2";

#[derive(Error, Debug, Clone)]
pub enum EvalError {
    /// Type mismatch with function name, expected type, actual type, and position.
    #[error("{function}: expected {expected}, got {actual} at argument {position}")]
    TypeMismatch {
        function: String,
        expected: String,
        actual: String,
        position: usize,
    },

    /// Arity error with function name, expected count/range, and actual count.
    #[error("{function}: expected {expected} argument{}, got {actual}", if *.expected == "1" { "" } else { "s" })]
    ArityError {
        function: String,
        expected: String,
        actual: usize,
    },

    /// Catch-all runtime error with function context (division by zero, vector
    /// index out of range, etc).
    #[error("{function}: {message}")]
    RuntimeError { function: String, message: String },

    #[error("Undefined symbol: {0}")]
    UndefinedSymbol(String),

    #[error("read error: {0}")]
    ReadError(String),
}

impl EvalError {
    pub fn type_error(
        heap: &Heap,
        function: &str,
        expected: &str,
        actual: &Value,
        position: usize,
    ) -> Self {
        EvalError::TypeMismatch {
            function: function.to_string(),
            expected: expected.to_string(),
            actual: heap.type_name_of(*actual).to_string(),
            position,
        }
    }

    pub fn arity_error(function: &str, expected: impl Into<String>, actual: usize) -> Self {
        EvalError::ArityError {
            function: function.to_string(),
            expected: expected.into(),
            actual,
        }
    }

    pub fn runtime_error(function: &str, message: impl Into<String>) -> Self {
        EvalError::RuntimeError {
            function: function.to_string(),
            message: message.into(),
        }
    }
}
