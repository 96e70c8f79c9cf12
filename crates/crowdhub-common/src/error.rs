//! Error conversion macros and utilities
//!
//! Reduces boilerplate in error type conversions across the workspace,
//! replacing the manual `impl From<X> for Error` blocks each crate would
//! otherwise repeat.

/// Implement `From<SourceError>` for a target error variant.
///
/// # Example
///
/// ```ignore
/// use crowdhub_common::impl_error_from;
///
/// #[derive(Debug)]
/// enum MyError {
///     Io(std::io::Error),
///     Parse(std::num::ParseIntError),
/// }
///
/// impl_error_from!(std::io::Error => MyError::Io);
/// impl_error_from!(std::num::ParseIntError => MyError::Parse);
/// ```
#[macro_export]
macro_rules! impl_error_from {
    ($source:ty => $target:ident::$variant:ident) => {
        impl From<$source> for $target {
            fn from(err: $source) -> Self {
                $target::$variant(err)
            }
        }
    };

    // Variant with custom transformation
    ($source:ty => $target:ident::$variant:ident, |$e:ident| $transform:expr) => {
        impl From<$source> for $target {
            fn from($e: $source) -> Self {
                $target::$variant($transform)
            }
        }
    };
}

/// Implement several `From` conversions at once.
///
/// # Example
///
/// ```ignore
/// use crowdhub_common::impl_errors_from;
///
/// impl_errors_from!(MyError {
///     Io(std::io::Error),
///     Json(serde_json::Error),
/// });
/// ```
#[macro_export]
macro_rules! impl_errors_from {
    ($target:ident { $($variant:ident($source:ty)),* $(,)? }) => {
        $(
            impl From<$source> for $target {
                fn from(err: $source) -> Self {
                    $target::$variant(err)
                }
            }
        )*
    };
}

/// Helper trait for attaching context to errors
pub trait ErrorContext<T, E> {
    /// Add context to an error
    fn with_context<F, S>(self, f: F) -> Result<T, E>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}
