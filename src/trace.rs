//! Structured events, compiled in only with the `tracing` feature.

/// Emits a `tracing` event with the crate's target.
///
/// Expands to an empty block when the `tracing` feature is disabled, so
/// arguments are never evaluated in that configuration.
macro_rules! event {
    ($level:ident, $($arg:tt)+) => {{
        #[cfg(feature = "tracing")]
        ::tracing::$level!(target: "guarded", $($arg)+);
    }};
}

pub(crate) use event;
