//! Logging macros: `tracing` when the `tracing` feature is on, nothing
//! otherwise.

#[cfg(feature = "tracing")]
pub(crate) use tracing::{debug, trace};

#[cfg(not(feature = "tracing"))]
macro_rules! debug {
    ($($tt:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace {
    ($($tt:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
pub(crate) use debug;
#[cfg(not(feature = "tracing"))]
pub(crate) use trace;
