//! CLI failures and the exit codes they map to.
//!
//! | code | meaning                                                    |
//! |------|------------------------------------------------------------|
//! | 0    | success                                                    |
//! | 2    | argument parse error (reported by clap)                    |
//! | 10   | simulation failure (unknown engine, cell or index lookup)  |
//! | 11   | file read or write failed                                  |
//! | 12   | rejected input (params, time step, audio frames, seed file) |
//! | 13   | JSON output could not be produced                          |

use noise_flow_core::EngineError;
use std::fmt;

pub enum CliError {
    /// The engine could not be built or failed while ticking.
    Engine(EngineError),
    /// The engine rejected a user-supplied value.
    Config(EngineError),
    Io(String),
    /// Malformed input the CLI parses itself.
    Input(String),
    Serialization(String),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Engine(_) => 10,
            CliError::Io(_) => 11,
            CliError::Config(_) | CliError::Input(_) => 12,
            CliError::Serialization(_) => 13,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Engine(e) => write!(f, "{e}"),
            CliError::Config(e) => write!(f, "invalid configuration: {e}"),
            CliError::Io(msg) | CliError::Input(msg) => f.write_str(msg),
            CliError::Serialization(msg) => write!(f, "cannot serialize output: {msg}"),
        }
    }
}

impl From<EngineError> for CliError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::Io(msg) => CliError::Io(msg),
            EngineError::InvalidExtent { .. }
            | EngineError::InvalidCellSize(_)
            | EngineError::InvalidParameter { .. }
            | EngineError::InvalidTimeStep(_)
            | EngineError::InvalidColor(_)
            | EngineError::InvalidGradient(_) => CliError::Config(e),
            EngineError::UnknownEngine(_)
            | EngineError::IndexOutOfBounds { .. }
            | EngineError::CellOutOfBounds { .. } => CliError::Engine(e),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Serialization(e.to_string())
    }
}
