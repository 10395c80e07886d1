use std::process;

use tracing::error;
use windows::Win32::UI::WindowsAndMessaging::{MB_ICONERROR, MB_OK, MB_SETFOREGROUND};

use crate::utilities::windows_helpers::display_message;

/// Log `error`, tell the user which operation failed, then exit with code 1.
pub fn report_fatal<Err: core::fmt::Display>(error: Err, operation: &str) -> ! {
    error!("{operation} failed: {error}");

    let user_message = format!(
        "ERROR:\n{operation} failed.\n\n{error}\n\nSee the logs for more details, the overlay will exit."
    );
    display_message(&user_message, MB_ICONERROR | MB_OK | MB_SETFOREGROUND);

    process::exit(1);
}

/// Treat a failure as fatal.
pub trait Failure<T> {
    /// Unwrap the value or [`report_fatal`] naming `operation`.
    fn report_fatal(self, operation: &str) -> T;
}

impl<T, E: core::fmt::Display> Failure<T> for Result<T, E> {
    fn report_fatal(self, operation: &str) -> T {
        match self {
            Ok(value) => value,
            Err(error) => report_fatal(error, operation),
        }
    }
}

impl<T> Failure<T> for Option<T> {
    fn report_fatal(self, operation: &str) -> T {
        match self {
            Some(value) => value,
            None => report_fatal("Was None", operation),
        }
    }
}
