//! Exit code constants for the foodie-tours CLI.
//!
//! | Code | Constant | Description |
//! |------|----------|-------------|
//! | 0 | `SUCCESS` | At least one itinerary was generated |
//! | 1 | `INTERNAL` | General/internal failure |
//! | 2 | `CLI_ARGS` | Invalid CLI arguments or configuration |
//! | 3 | `NO_TOURS` | Every requested city failed |
//! | 4 | `EXPORT_FAILED` | The exchange document could not be written |

use crate::error::{ConfigError, TourError};

/// Process exit code.
///
/// Use the named constants, or [`as_i32()`](Self::as_i32) to get the numeric
/// value for `std::process::exit()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(i32);

impl ExitCode {
    /// Success - at least one itinerary was generated
    pub const SUCCESS: ExitCode = ExitCode(0);

    /// Internal error - general failure
    pub const INTERNAL: ExitCode = ExitCode(1);

    /// CLI arguments error - invalid arguments or configuration
    pub const CLI_ARGS: ExitCode = ExitCode(2);

    /// No tours - every requested city produced a failure outcome
    pub const NO_TOURS: ExitCode = ExitCode(3);

    /// Export failed - the exchange document could not be written
    pub const EXPORT_FAILED: ExitCode = ExitCode(4);

    /// Get the numeric exit code value.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self.0
    }
}

impl From<&ConfigError> for ExitCode {
    fn from(_: &ConfigError) -> Self {
        ExitCode::CLI_ARGS
    }
}

impl From<&TourError> for ExitCode {
    fn from(err: &TourError) -> Self {
        match err {
            TourError::Misconfiguration(_) => ExitCode::CLI_ARGS,
            _ => ExitCode::INTERNAL,
        }
    }
}
