//! Error taxonomy for the attitude estimator

/// Errors surfaced by the estimator and the filter core.
///
/// An absent first sample is deliberately not represented here: before the
/// sensor transport delivers anything, the estimator is waiting, not failing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EstimatorError {
    /// Configuration rejected at startup. Fatal.
    #[error("invalid settings: {0}")]
    InvalidSettings(&'static str),

    /// A tilt denominator vanished (e.g. freefall along two axes), so the
    /// angle is undefined. Reported per tick; the loop keeps running.
    #[error("degenerate tilt geometry: zero denominator on the {0} axis")]
    DegenerateTilt(&'static str),

    /// Shutdown was requested during a blocking wait before the run loop
    /// reached steady state.
    #[error("cancelled by shutdown request")]
    Cancelled,
}
