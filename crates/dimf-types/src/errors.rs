use thiserror::Error;

/// Main error type for the dimf system.
#[derive(Error, Debug)]
pub enum DimfError {
    #[error("Script error: {0}")]
    Script(#[from] ScriptError),

    #[error("Batch error: {0}")]
    Batch(#[from] BatchError),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),
}

/// Result type alias for dimf operations.
pub type DimfResult<T> = Result<T, DimfError>;

/// Errors produced while interpreting a configuration script.
///
/// Every failure raised during line processing is wrapped in
/// [`ScriptError::Line`] so callers always see the 1-based line number and
/// the literal offending text.
#[derive(Error, Debug)]
pub enum ScriptError {
    #[error("unknown command '{command}'")]
    UnknownCommand { command: String },

    #[error("{}", unknown_field_message(.name, .suggestion))]
    UnknownField {
        name: String,
        /// Closest registered name by edit distance, when close enough to
        /// be a plausible typo.
        suggestion: Option<String>,
    },

    #[error("could not parse value '{value}' for field '{name}'")]
    MalformedValue { name: String, value: String },

    #[error("unknown initializer '{token}', expected one of zero, interpolate_zeros, fourier_component")]
    UnknownInitializer { token: String },

    #[error("unexpected trailing tokens '{rest}'")]
    TrailingTokens { rest: String },

    #[error("missing {what}")]
    MissingArgument { what: String },

    #[error("could not load samples from '{path}': {message}")]
    LoadSamples { path: String, message: String },

    #[error("could not evaluate line {number}: '{text}': {source}")]
    Line {
        number: usize,
        text: String,
        source: Box<ScriptError>,
    },
}

fn unknown_field_message(name: &str, suggestion: &Option<String>) -> String {
    match suggestion {
        Some(s) => format!("unknown field name '{name}', did you mean '{s}'?"),
        None => format!("unknown field name '{name}'"),
    }
}

/// Errors raised by the batch runner before or while driving tasks.
#[derive(Error, Debug)]
pub enum BatchError {
    /// Only one batch may run at a time; starting a second is a usage error
    /// surfaced before any work begins.
    #[error("a batch is already running")]
    AlreadyRunning,

    #[error("failed to build worker pool: {0}")]
    PoolBuild(String),
}

/// Failure of the optimization engine for a single task.
#[derive(Error, Debug)]
#[error("optimization engine failed: {message}")]
pub struct EngineError {
    pub message: String,
}

impl EngineError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_field_includes_suggestion() {
        let err = ScriptError::UnknownField {
            name: "sarmSize".into(),
            suggestion: Some("swarmSize".into()),
        };
        let message = err.to_string();
        assert!(message.contains("sarmSize"));
        assert!(message.contains("did you mean 'swarmSize'?"));
    }

    #[test]
    fn unknown_field_without_suggestion_is_plain() {
        let err = ScriptError::UnknownField {
            name: "bogus".into(),
            suggestion: None,
        };
        assert_eq!(err.to_string(), "unknown field name 'bogus'");
    }

    #[test]
    fn line_wrapper_carries_context_and_source() {
        let err = ScriptError::Line {
            number: 3,
            text: "set sarmSize 200".into(),
            source: Box::new(ScriptError::UnknownField {
                name: "sarmSize".into(),
                suggestion: Some("swarmSize".into()),
            }),
        };
        let message = err.to_string();
        assert!(message.contains("line 3"));
        assert!(message.contains("set sarmSize 200"));
        assert!(message.contains("swarmSize"));
    }

    #[test]
    fn umbrella_conversions() {
        let err: DimfError = BatchError::AlreadyRunning.into();
        assert!(matches!(err, DimfError::Batch(BatchError::AlreadyRunning)));

        let err: DimfError = EngineError::new("diverged").into();
        assert!(err.to_string().contains("diverged"));
    }
}
