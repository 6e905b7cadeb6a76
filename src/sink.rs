//! Output sink seam between the tick loop and downstream consumers

use nalgebra::UnitQuaternion;

use crate::types::AttitudeEstimate;

/// Downstream consumer of per-tick estimator output
///
/// Called once per successful tick, angles first, then the derived
/// orientation. Publication is fire-and-forget: no acknowledgment, no
/// backpressure. Ticks whose fusion step fails publish nothing.
pub trait AttitudeSink {
    /// Deliver the fused roll/pitch/yaw angles in radians
    fn publish_angles(&mut self, estimate: &AttitudeEstimate);

    /// Deliver the equivalent world-frame rotation (zero translation)
    fn publish_orientation(&mut self, rotation: &UnitQuaternion<f32>);
}

/// Sink that drops everything, for running the estimator headless
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl AttitudeSink for NullSink {
    fn publish_angles(&mut self, _estimate: &AttitudeEstimate) {}

    fn publish_orientation(&mut self, _rotation: &UnitQuaternion<f32>) {}
}
