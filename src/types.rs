//! Core data types and configuration for the attitude estimator

use nalgebra::{UnitQuaternion, Vector3};

use crate::error::EstimatorError;

/// One raw IMU reading
///
/// Angular velocity is in radians per second, linear acceleration in m/s².
/// Samples arrive asynchronously from the sensor transport; the estimator
/// always consumes the most recently received one (latest-value semantics,
/// not a queue).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImuSample {
    /// Angular velocity (x, y, z) in rad/s
    pub gyro: Vector3<f32>,
    /// Linear acceleration (x, y, z) in m/s²
    pub accel: Vector3<f32>,
}

impl ImuSample {
    pub fn new(gyro: Vector3<f32>, accel: Vector3<f32>) -> Self {
        Self { gyro, accel }
    }
}

/// Per-axis sensor bias measured during the stationary calibration phase
///
/// Each component is the arithmetic mean of that axis over the calibration
/// window. Created once by [`crate::BiasCalibrator`] and immutable afterwards.
/// The accelerometer z mean absorbs gravity while the body is level; see
/// [`crate::ComplementaryFilter`] for how the tilt computation accounts for
/// that.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiasEstimate {
    /// Mean linear acceleration per axis in m/s²
    pub accel: Vector3<f32>,
    /// Mean angular velocity per axis in rad/s
    pub gyro: Vector3<f32>,
}

impl BiasEstimate {
    /// A zero bias, for feeding pre-calibrated data straight to the filter
    pub fn zero() -> Self {
        Self {
            accel: Vector3::zeros(),
            gyro: Vector3::zeros(),
        }
    }
}

/// Fused roll/pitch/yaw output of one filter tick, in radians
///
/// `phi` is the tilt about the x axis, `theta` the tilt about the y axis,
/// `psi` the gyro-integrated heading. Yaw is uncorrected and drifts without
/// bound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttitudeEstimate {
    /// Tilt about the x axis in radians
    pub phi: f32,
    /// Tilt about the y axis in radians
    pub theta: f32,
    /// Heading about the z axis in radians (gyro integration only)
    pub psi: f32,
}

impl AttitudeEstimate {
    /// Equivalent orientation of the body relative to the world frame
    ///
    /// Composes rotations about x by `phi`, y by `theta`, and z by `psi`, in
    /// that order. Downstream consumers that label `theta` as roll and `phi`
    /// as pitch get the same quaternion from this composition, so the
    /// naming difference carries no numeric consequence. Pure rotation,
    /// zero translation.
    pub fn orientation(&self) -> UnitQuaternion<f32> {
        UnitQuaternion::from_euler_angles(self.phi, self.theta, self.psi)
    }
}

/// Estimator configuration
///
/// All values are fixed for the lifetime of the process; there is no runtime
/// reconfiguration. Validated once at estimator construction.
///
/// # Example
/// ```
/// use imu_attitude::EstimatorSettings;
///
/// let settings = EstimatorSettings {
///     update_rate_hz: 50.0,       // tick at 50 Hz instead of the default 10
///     calibration_samples: 500,   // longer stationary window
///     ..Default::default()
/// };
/// assert!(settings.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct EstimatorSettings {
    /// Gravity magnitude in m/s²
    ///
    /// Part of the configuration surface for downstream consumers; the
    /// arctangent tilt formulation itself does not divide by gravity.
    pub gravity: f32,
    /// Tick rate of the filter loop in Hz
    pub update_rate_hz: f32,
    /// Complementary blend weight for `phi`, in [0, 1]
    ///
    /// 1.0 trusts the accelerometer tilt entirely, 0.0 tracks pure gyro
    /// integration.
    pub rho_phi: f32,
    /// Complementary blend weight for `theta`, in [0, 1]
    pub rho_theta: f32,
    /// Number of stationary samples averaged into the bias estimate
    pub calibration_samples: usize,
}

impl Default for EstimatorSettings {
    fn default() -> Self {
        Self {
            gravity: 9.81,
            update_rate_hz: 10.0,
            rho_phi: 0.9,
            rho_theta: 0.9,
            calibration_samples: 200,
        }
    }
}

impl EstimatorSettings {
    /// Reject configurations that would make the tick period or the bias
    /// division meaningless. Fatal at startup; never checked again.
    pub fn validate(&self) -> Result<(), EstimatorError> {
        if !(self.update_rate_hz > 0.0) {
            return Err(EstimatorError::InvalidSettings(
                "update_rate_hz must be positive",
            ));
        }
        if self.calibration_samples == 0 {
            return Err(EstimatorError::InvalidSettings(
                "calibration_samples must be at least 1",
            ));
        }
        Ok(())
    }

    /// Tick period in seconds
    pub fn dt(&self) -> f32 {
        1.0 / self.update_rate_hz
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = EstimatorSettings::default();
        assert_eq!(settings.gravity, 9.81);
        assert_eq!(settings.update_rate_hz, 10.0);
        assert_eq!(settings.rho_phi, 0.9);
        assert_eq!(settings.rho_theta, 0.9);
        assert_eq!(settings.calibration_samples, 200);
        assert!(settings.validate().is_ok());
        assert!((settings.dt() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_settings_validation() {
        let zero_rate = EstimatorSettings {
            update_rate_hz: 0.0,
            ..Default::default()
        };
        assert!(zero_rate.validate().is_err());

        let negative_rate = EstimatorSettings {
            update_rate_hz: -10.0,
            ..Default::default()
        };
        assert!(negative_rate.validate().is_err());

        // NaN never compares greater than zero, so it must be rejected too
        let nan_rate = EstimatorSettings {
            update_rate_hz: f32::NAN,
            ..Default::default()
        };
        assert!(nan_rate.validate().is_err());

        let no_samples = EstimatorSettings {
            calibration_samples: 0,
            ..Default::default()
        };
        assert!(no_samples.validate().is_err());
    }

    #[test]
    fn test_orientation_composition() {
        let level = AttitudeEstimate {
            phi: 0.0,
            theta: 0.0,
            psi: 0.0,
        };
        assert!(level.orientation().angle().abs() < 1e-6);

        // A yaw-only estimate rotates about z alone
        let yawed = AttitudeEstimate {
            phi: 0.0,
            theta: 0.0,
            psi: 0.5,
        };
        let (roll, pitch, yaw) = yawed.orientation().euler_angles();
        assert!(roll.abs() < 1e-6);
        assert!(pitch.abs() < 1e-6);
        assert!((yaw - 0.5).abs() < 1e-6);
    }
}
