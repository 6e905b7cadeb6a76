//! Stationary bias calibration for the attitude estimator

use nalgebra::Vector3;

use crate::types::{BiasEstimate, ImuSample};

/// Accumulates a fixed number of stationary samples into per-axis bias means
///
/// While the body is at rest the true angular velocity is zero and the true
/// acceleration is gravity alone, so the running mean of each axis is the
/// sensor's constant offset (plus gravity on the accelerometer z axis).
/// The accumulator is a terminal computation: it fills once, produces one
/// [`BiasEstimate`], and is never re-entered. Pacing and cancellation are
/// the caller's concern.
///
/// # Example
/// ```
/// use imu_attitude::{BiasCalibrator, ImuSample};
/// use nalgebra::Vector3;
///
/// let mut calibrator = BiasCalibrator::new(4);
/// let resting = ImuSample::new(Vector3::zeros(), Vector3::new(0.0, 0.0, 9.81));
/// while calibrator.finish().is_none() {
///     calibrator.add_sample(&resting);
/// }
/// let bias = calibrator.finish().unwrap();
/// assert_eq!(bias.accel.z, 9.81);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct BiasCalibrator {
    /// Number of samples required before a bias can be produced
    target: usize,
    /// Samples accumulated so far
    count: usize,
    accel_sum: Vector3<f32>,
    gyro_sum: Vector3<f32>,
}

impl BiasCalibrator {
    /// Create an accumulator expecting `target` samples
    ///
    /// `target` must be at least 1; settings validation enforces this before
    /// a calibrator is ever constructed by the estimator.
    pub fn new(target: usize) -> Self {
        Self {
            target,
            count: 0,
            accel_sum: Vector3::zeros(),
            gyro_sum: Vector3::zeros(),
        }
    }

    /// Fold one stationary sample into the running sums
    ///
    /// Samples beyond the target are ignored so the committed mean stays a
    /// mean over exactly `target` readings.
    pub fn add_sample(&mut self, sample: &ImuSample) {
        if self.is_complete() {
            return;
        }
        self.count += 1;
        self.accel_sum += sample.accel;
        self.gyro_sum += sample.gyro;
    }

    /// Whether the accumulator has seen all required samples
    pub fn is_complete(&self) -> bool {
        self.count >= self.target
    }

    /// Samples still needed before a bias can be produced
    pub fn remaining(&self) -> usize {
        self.target - self.count
    }

    /// The committed bias, or `None` while accumulation is incomplete
    ///
    /// Returning `None` mid-window is what guarantees a cancelled
    /// calibration never commits a partial bias.
    pub fn finish(&self) -> Option<BiasEstimate> {
        if !self.is_complete() {
            return None;
        }
        let n = self.target as f32;
        Some(BiasEstimate {
            accel: self.accel_sum / n,
            gyro: self.gyro_sum / n,
        })
    }
}
