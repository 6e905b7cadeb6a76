//! Sample source seam between the sensor transport and the tick loop

use std::sync::Arc;

use parking_lot::RwLock;

use crate::types::ImuSample;

/// Latest-value view of an asynchronously updated IMU stream
///
/// `latest` returns whatever reading the transport most recently delivered,
/// or `None` before the first one arrives. There is no buffering or
/// sequencing: if the transport outpaces the tick loop, intermediate samples
/// are silently skipped; if it lags, the same sample is reused across ticks.
pub trait SampleSource {
    fn latest(&self) -> Option<ImuSample>;
}

/// Shared single-slot handoff for the most recent sample
///
/// The reception path (any thread) writes whole samples with [`publish`];
/// the tick loop reads whole samples with [`latest`]. Swapping the entire
/// sample under one lock means a reader can never observe a torn sample
/// with angular velocity from one physical reading and acceleration from
/// another. Clones share the same slot.
///
/// [`publish`]: SharedSample::publish
/// [`latest`]: SampleSource::latest
///
/// # Example
/// ```
/// use imu_attitude::{ImuSample, SampleSource, SharedSample};
/// use nalgebra::Vector3;
///
/// let slot = SharedSample::new();
/// let writer = slot.clone();
///
/// assert!(slot.latest().is_none());
/// writer.publish(ImuSample::new(Vector3::zeros(), Vector3::new(0.0, 0.0, 9.81)));
/// assert!(slot.latest().is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct SharedSample {
    slot: Arc<RwLock<Option<ImuSample>>>,
}

impl SharedSample {
    /// Create an empty slot (no sample observed yet)
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the slot content with a newer sample
    pub fn publish(&self, sample: ImuSample) {
        *self.slot.write() = Some(sample);
    }
}

impl SampleSource for SharedSample {
    fn latest(&self) -> Option<ImuSample> {
        *self.slot.read()
    }
}
