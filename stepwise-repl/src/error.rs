use ariadne::Source;
use stepwise_engine::{registry::error::ValidationError, EngineError};
use stepwise_parser::Error as ParseError;

/// Utility enum to package errors that can occur while running a command.
pub enum Error {
    /// The expression could not be parsed.
    ParseError(ParseError),

    /// The engine rejected the request.
    EngineError(EngineError),

    /// The model file could not be read or validated.
    ModelError(String),

    /// The command cannot run in the current state.
    Usage(&'static str),
}

impl Error {
    /// Report the error to stderr.
    ///
    /// Parse errors point into `input` with an [`ariadne`] report.
    pub fn report_to_stderr(&self, input: &str) {
        match self {
            Self::ParseError(err) => {
                let report = err.build_report("input");
                if let Err(io) = report.eprint(("input", Source::from(input))) {
                    eprintln!("{}", io);
                }
            },
            Self::EngineError(err) => eprintln!("error: {}", err),
            Self::ModelError(msg) => eprintln!("error: {}", msg),
            Self::Usage(msg) => eprintln!("{}", msg),
        }
    }
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        Self::ParseError(err)
    }
}

impl From<EngineError> for Error {
    fn from(err: EngineError) -> Self {
        Self::EngineError(err)
    }
}

impl From<ValidationError> for Error {
    fn from(err: ValidationError) -> Self {
        Self::ModelError(err.to_string())
    }
}
