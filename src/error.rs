//! Errors propagate internally as `anyhow::Error`. At the boundary of a public operation they are
//! tagged with an `ErrorType` so that the CLI (and tests) can tell what kind of failure occurred
//! without parsing messages.

use std::fmt::{Display, Formatter};

pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// The kinds of failure that are surfaced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    /// Input rejected at the point of entry, e.g. an empty description or a non-positive amount.
    /// The mutation is not applied.
    Validation,
    /// An import file could not be read or contained no valid rows. The dataset is untouched.
    Import,
    /// A transaction id or report period matched nothing.
    NotFound,
    /// The persisted store could not be written.
    Store,
    /// The data directory or `config.json` is missing or invalid.
    Config,
    /// Any other filesystem failure.
    Io,
}

impl ErrorType {
    /// Finds the `ErrorType` tag attached to `error`, if any.
    pub fn of(error: &Error) -> Option<ErrorType> {
        error.downcast_ref::<ErrorType>().copied()
    }

    /// Creates a new error with `message` tagged as `self`.
    pub(crate) fn err(self, message: impl Display) -> Error {
        anyhow::Error::msg(message.to_string()).context(self)
    }
}

impl Display for ErrorType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorType::Validation => "Invalid input",
            ErrorType::Import => "Import failed",
            ErrorType::NotFound => "Not found",
            ErrorType::Store => "Storage error",
            ErrorType::Config => "Configuration error",
            ErrorType::Io => "I/O error",
        };
        f.write_str(s)
    }
}

/// Tags the error side of a `Result` with an `ErrorType`.
pub trait IntoResult<T> {
    /// Converts the error into a public error of kind `error_type`. An error that already carries
    /// a tag keeps it; the innermost classification wins.
    fn pub_result(self, error_type: ErrorType) -> Result<T>;
}

impl<T, E> IntoResult<T> for std::result::Result<T, E>
where
    E: Into<Error>,
{
    fn pub_result(self, error_type: ErrorType) -> Result<T> {
        self.map_err(|e| {
            let e = e.into();
            if ErrorType::of(&e).is_some() {
                e
            } else {
                e.context(error_type)
            }
        })
    }
}
