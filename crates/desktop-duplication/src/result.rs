use core::fmt::Display;

use thiserror::Error;
use windows_core::HRESULT;

/// A shortcut for `Result<T, WinError>`.
pub type LabelledWinResult<T> = Result<T, WinError>;

/// A Windows error labelled with the call that produced it.
#[derive(Debug, Error)]
pub struct WinError {
    call: &'static str,
    #[source]
    source: windows_result::Error,
}

impl WinError {
    /// Label a `windows_result::Error` with the call that produced it.
    pub fn new(source: windows_result::Error, call: &'static str) -> Self {
        Self { call, source }
    }

    /// Create a WinError for a call that reported failure through an `HRESULT`.
    pub fn from_hresult(code: HRESULT, call: &'static str) -> Self {
        Self {
            call,
            source: windows_result::Error::from_hresult(code),
        }
    }

    /// The failing call.
    pub fn call(&self) -> &'static str {
        self.call
    }

    /// The status code the call failed with.
    pub fn code(&self) -> HRESULT {
        self.source.code()
    }
}

impl Display for WinError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "Windows {} call failed with {}:\n{}",
            self.call,
            self.source.code(),
            self.source.message()
        )
    }
}
