//! Utility macros.

/// Returns early with an error if a condition is not met.
///
/// Like `assert!`, but returns `Err($error)` instead of panicking. Used for the
/// protocol checks where a violation aborts the current exchange.
///
/// # Example
///
/// ```ignore
/// ensure!(body.len() as u64 <= length, ParseError::invalid_body("body exceeds content-length"));
/// ```
macro_rules! ensure {
    ($predicate:expr, $error:expr) => {
        if !$predicate {
            return Err($error);
        }
    };
}

pub(crate) use ensure;
