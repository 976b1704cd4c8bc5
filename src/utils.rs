//! # Argument Helpers
//!
//! Small helpers for building external-tool argument vectors.
//!
//! Arguments are kept as `OsString` so file names reach the tools byte for
//! byte, including names that are not valid UTF-8.

use std::ffi::{OsStr, OsString};

/// Converts an iterable of string-like items into owned OS strings.
///
/// ```rust
/// use page_watermarker::utils::to_os_args;
///
/// let percent = 40;
/// let args = to_os_args(["convert", "in.png", "-resize", &format!("{}%", percent)]);
/// assert_eq!(args[3], "40%");
/// ```
pub fn to_os_args<T, I>(items: I) -> Vec<OsString>
where
    T: AsRef<OsStr>,
    I: IntoIterator<Item = T>,
{
    items.into_iter().map(|item| item.as_ref().to_os_string()).collect()
}

/// One owned argument from anything that borrows as an `OsStr` (`&str`, `String`, `&Path`, ...)
pub fn os_arg<S: AsRef<OsStr> + ?Sized>(item: &S) -> OsString {
    item.as_ref().to_os_string()
}

/// Builds a `Vec<OsString>` from mixed string and path values.
///
/// ```rust
/// use page_watermarker::args;
/// use std::path::Path;
///
/// let x = 100;
/// let canvas = Path::new("/p/media/00000001.tif");
/// let args = args!["-geometry", format!("+{}+{}", x, x), canvas];
/// assert_eq!(args, vec!["-geometry", "+100+100", "/p/media/00000001.tif"]);
/// ```
#[macro_export]
macro_rules! args {
    [$($item:expr),* $(,)?] => {
        ::std::vec![$($crate::utils::os_arg(&$item)),*]
    };
}
