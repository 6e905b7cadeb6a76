//! Complementary-filter attitude estimation for a single IMU stream
//!
//! This crate estimates the 3-axis orientation (roll, pitch, yaw) of a rigid
//! body from gyroscope and accelerometer readings. A stationary calibration
//! phase averages a fixed window of samples into per-axis bias constants,
//! then a fixed-rate fusion loop blends the accelerometer-derived tilt with
//! the gyro-integrated angle using a first-order complementary filter. Yaw
//! is gyro integration only and drifts without bound by design.
//!
//! # Features
//!
//! - Stationary bias calibration over a configurable sample window
//! - Fixed-weight complementary fusion of tilt and gyro integration
//! - Explicit wait → calibrate → run phase machine with cooperative
//!   cancellation at every blocking point
//! - Torn-read-free latest-sample handoff between the sensor transport
//!   and the tick loop
//! - Per-tick orientation quaternion derived from the fused Euler angles
//!
//! # Quick Start
//!
//! ```no_run
//! use imu_attitude::{
//!     AttitudeEstimator, EstimatorSettings, ImuSample, NullSink, SharedSample, Shutdown,
//! };
//! use nalgebra::Vector3;
//!
//! let slot = SharedSample::new();
//! let shutdown = Shutdown::new();
//!
//! // The sensor transport publishes readings from its own thread
//! let sensor = slot.clone();
//! std::thread::spawn(move || {
//!     sensor.publish(ImuSample::new(Vector3::zeros(), Vector3::new(0.0, 0.0, 9.81)));
//! });
//!
//! // The estimator waits for the first sample, calibrates while the body
//! // is still, then fuses until shutdown is requested
//! let mut estimator =
//!     AttitudeEstimator::new(EstimatorSettings::default(), shutdown.clone()).unwrap();
//! estimator.run(&slot, &mut NullSink).unwrap();
//! ```
//!
//! The crate owns no transport: samples arrive through [`SampleSource`] and
//! results leave through [`AttitudeSink`], both implemented by the caller
//! (or by the provided [`SharedSample`] slot on the input side).

mod calibration;
mod error;
mod estimator;
mod filter;
mod sink;
mod source;
mod types;

pub use calibration::BiasCalibrator;
pub use error::EstimatorError;
pub use estimator::{AttitudeEstimator, Phase, Shutdown};
pub use filter::ComplementaryFilter;
pub use sink::{AttitudeSink, NullSink};
pub use source::{SampleSource, SharedSample};
pub use types::{AttitudeEstimate, BiasEstimate, EstimatorSettings, ImuSample};
