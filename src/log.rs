//! Logging macros that forward to `tracing` when the `with_tracing` feature is on.

#[cfg(feature = "with_tracing")]
macro_rules! debug {
    ($($arg:tt)*) => { ::tracing::debug!($($arg)*) };
}

#[cfg(not(feature = "with_tracing"))]
macro_rules! debug {
    ($($arg:tt)*) => {{}};
}

#[cfg(feature = "with_tracing")]
macro_rules! info {
    ($($arg:tt)*) => { ::tracing::info!($($arg)*) };
}

#[cfg(not(feature = "with_tracing"))]
macro_rules! info {
    ($($arg:tt)*) => {{}};
}

#[cfg(feature = "with_tracing")]
macro_rules! warning {
    ($($arg:tt)*) => { ::tracing::warn!($($arg)*) };
}

#[cfg(not(feature = "with_tracing"))]
macro_rules! warning {
    ($($arg:tt)*) => {{}};
}

#[cfg(feature = "with_tracing")]
macro_rules! error {
    ($($arg:tt)*) => { ::tracing::error!($($arg)*) };
}

#[cfg(not(feature = "with_tracing"))]
macro_rules! error {
    ($($arg:tt)*) => {{}};
}

pub(crate) use debug;
pub(crate) use error;
pub(crate) use info;
pub(crate) use warning;
