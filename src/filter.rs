//! Complementary-filter fusion of gyro and accelerometer readings

use crate::error::EstimatorError;
use crate::types::{AttitudeEstimate, BiasEstimate, EstimatorSettings, ImuSample};

/// First-order complementary filter producing roll/pitch/yaw per tick
///
/// Blends two estimates of each tilt angle: the accelerometer-derived tilt
/// (accurate at rest, corrupted by linear acceleration during motion) and
/// the gyro-integrated angle (smooth short-term, drifts with bias). The
/// blend is a fixed linear interpolation — `rho` close to 1 weights the
/// accelerometer heavily. Yaw has no accelerometer reference and is pure
/// gyro integration; it drifts without bound.
///
/// Two properties of the update are load-bearing and must not be "fixed":
///
/// * the z acceleration term in both tilt denominators is used raw, without
///   bias correction, because the z mean from calibration absorbs gravity
///   and subtracting it would hollow out the denominator;
/// * the state carried to the next tick is the gyro-only integral, never
///   the fused angle. Feeding the fused angle back would change the
///   filter's transfer function and drift behavior.
#[derive(Debug, Clone, Copy)]
pub struct ComplementaryFilter {
    /// Tick period in seconds
    dt: f32,
    /// Blend weight for phi
    rho_phi: f32,
    /// Blend weight for theta
    rho_theta: f32,
    /// Bias constants committed by calibration
    bias: BiasEstimate,
    /// Previous tick's gyro-only integrals (phi, theta, psi) in radians
    phi_prev: f32,
    theta_prev: f32,
    psi_prev: f32,
}

impl ComplementaryFilter {
    /// Create a filter with zeroed state
    ///
    /// The settings are expected to be validated already; an estimator never
    /// constructs a filter from rejected settings.
    pub fn new(settings: &EstimatorSettings, bias: BiasEstimate) -> Self {
        Self {
            dt: settings.dt(),
            rho_phi: settings.rho_phi,
            rho_theta: settings.rho_theta,
            bias,
            phi_prev: 0.0,
            theta_prev: 0.0,
            psi_prev: 0.0,
        }
    }

    /// Run one fusion tick over the given sample
    ///
    /// On a degenerate sample (a tilt denominator of exactly zero, e.g.
    /// freefall along two axes) the tick is rejected before any state is
    /// mutated: no output, no change to the gyro baseline. The caller logs
    /// the fault and proceeds to the next tick.
    pub fn update(&mut self, sample: &ImuSample) -> Result<AttitudeEstimate, EstimatorError> {
        let ax = sample.accel.x - self.bias.accel.x;
        let ay = sample.accel.y - self.bias.accel.y;
        // z stays uncorrected: its calibration mean is dominated by gravity
        let az = sample.accel.z;
        let gyro = sample.gyro - self.bias.gyro;

        let phi_denom = (ax * ax + az * az).sqrt();
        if phi_denom == 0.0 {
            return Err(EstimatorError::DegenerateTilt("phi"));
        }
        let theta_denom = (ay * ay + az * az).sqrt();
        if theta_denom == 0.0 {
            return Err(EstimatorError::DegenerateTilt("theta"));
        }

        let phi_meas = (ay / phi_denom).atan();
        let phi_est = self.phi_prev + gyro.x * self.dt;
        let phi = (1.0 - self.rho_phi) * phi_est + self.rho_phi * phi_meas;
        self.phi_prev = phi_est;

        let theta_meas = (ax / theta_denom).atan();
        let theta_est = self.theta_prev + gyro.y * self.dt;
        let theta = (1.0 - self.rho_theta) * theta_est + self.rho_theta * theta_meas;
        self.theta_prev = theta_est;

        let psi_est = self.psi_prev + gyro.z * self.dt;
        let psi = psi_est;
        self.psi_prev = psi_est;

        Ok(AttitudeEstimate { phi, theta, psi })
    }

    /// The bias constants this filter corrects with
    pub fn bias(&self) -> BiasEstimate {
        self.bias
    }

    /// Zero the integrated state, keeping settings and bias
    pub fn reset(&mut self) {
        self.phi_prev = 0.0;
        self.theta_prev = 0.0;
        self.psi_prev = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    const EPSILON: f32 = 1e-6;

    fn level_settings() -> EstimatorSettings {
        EstimatorSettings::default()
    }

    fn resting_sample() -> ImuSample {
        ImuSample::new(Vector3::zeros(), Vector3::new(0.0, 0.0, 9.81))
    }

    fn resting_bias() -> BiasEstimate {
        BiasEstimate {
            accel: Vector3::new(0.0, 0.0, 9.81),
            gyro: Vector3::zeros(),
        }
    }

    #[test]
    fn test_static_equilibrium() {
        let mut filter = ComplementaryFilter::new(&level_settings(), resting_bias());
        for _ in 0..500 {
            let estimate = filter.update(&resting_sample()).expect("well-posed tilt");
            assert!(estimate.phi.abs() < EPSILON);
            assert!(estimate.theta.abs() < EPSILON);
            assert!(estimate.psi.abs() < EPSILON);
        }
    }

    #[test]
    fn test_yaw_pure_integration() {
        let settings = level_settings();
        let mut filter = ComplementaryFilter::new(&settings, BiasEstimate::zero());
        let omega = 0.3; // rad/s about z
        let sample = ImuSample::new(Vector3::new(0.0, 0.0, omega), Vector3::new(0.0, 0.0, 9.81));

        let ticks = 50;
        let mut last = 0.0;
        for _ in 0..ticks {
            last = filter.update(&sample).expect("well-posed tilt").psi;
        }
        let expected = omega * settings.dt() * ticks as f32;
        assert!((last - expected).abs() < 1e-4);
    }

    #[test]
    fn test_rho_zero_tracks_gyro_integration() {
        let settings = EstimatorSettings {
            rho_phi: 0.0,
            ..Default::default()
        };
        let mut filter = ComplementaryFilter::new(&settings, BiasEstimate::zero());
        // Tilted acceleration so phi_meas is far from the gyro path
        let sample = ImuSample::new(Vector3::new(0.2, 0.0, 0.0), Vector3::new(0.0, 3.0, 9.0));

        let mut phi_est = 0.0;
        for _ in 0..20 {
            phi_est += 0.2 * settings.dt();
            let estimate = filter.update(&sample).expect("well-posed tilt");
            assert!((estimate.phi - phi_est).abs() < EPSILON);
        }
    }

    #[test]
    fn test_rho_one_tracks_accelerometer_tilt() {
        let settings = EstimatorSettings {
            rho_phi: 1.0,
            ..Default::default()
        };
        let mut filter = ComplementaryFilter::new(&settings, BiasEstimate::zero());
        let sample = ImuSample::new(Vector3::new(0.5, 0.0, 0.0), Vector3::new(0.0, 3.0, 4.0));

        // ay / sqrt(ax² + az²) = 3 / 4 regardless of accumulated gyro state
        let phi_meas = (3.0f32 / 4.0).atan();
        for _ in 0..20 {
            let estimate = filter.update(&sample).expect("well-posed tilt");
            assert!((estimate.phi - phi_meas).abs() < EPSILON);
        }
    }

    #[test]
    fn test_gyro_baseline_is_not_the_fused_angle() {
        // With a constant non-zero accelerometer tilt and zero gyro, the
        // fused angle must stay pinned at rho * tilt: the baseline carried
        // forward is the (zero) gyro integral, not the fused output.
        let settings = level_settings();
        let mut filter = ComplementaryFilter::new(&settings, BiasEstimate::zero());
        let sample = ImuSample::new(Vector3::zeros(), Vector3::new(0.0, 3.0, 4.0));

        let pinned = settings.rho_phi * (3.0f32 / 4.0).atan();
        for _ in 0..100 {
            let estimate = filter.update(&sample).expect("well-posed tilt");
            assert!((estimate.phi - pinned).abs() < EPSILON);
        }
    }

    #[test]
    fn test_z_axis_not_bias_corrected() {
        // A bias whose z component would zero out the raw reading: if z were
        // corrected, both denominators would collapse and the tilt would
        // blow up. With the preserved asymmetry the tilt stays finite.
        let bias = BiasEstimate {
            accel: Vector3::new(0.0, 0.0, 9.81),
            gyro: Vector3::zeros(),
        };
        let mut filter = ComplementaryFilter::new(&level_settings(), bias);
        let sample = ImuSample::new(Vector3::zeros(), Vector3::new(0.0, 1.0, 9.81));
        let estimate = filter.update(&sample).expect("well-posed tilt");

        let expected_phi = 0.9 * (1.0f32 / 9.81).atan();
        assert!((estimate.phi - expected_phi).abs() < EPSILON);
    }

    #[test]
    fn test_degenerate_phi_denominator() {
        let mut filter = ComplementaryFilter::new(&level_settings(), BiasEstimate::zero());
        let freefall = ImuSample::new(Vector3::zeros(), Vector3::new(0.0, 2.0, 0.0));
        assert_eq!(
            filter.update(&freefall),
            Err(EstimatorError::DegenerateTilt("phi"))
        );
    }

    #[test]
    fn test_degenerate_theta_denominator() {
        let mut filter = ComplementaryFilter::new(&level_settings(), BiasEstimate::zero());
        let freefall = ImuSample::new(Vector3::zeros(), Vector3::new(2.0, 0.0, 0.0));
        assert_eq!(
            filter.update(&freefall),
            Err(EstimatorError::DegenerateTilt("theta"))
        );
    }

    #[test]
    fn test_degenerate_tick_leaves_state_untouched() {
        let settings = level_settings();
        let mut filter = ComplementaryFilter::new(&settings, BiasEstimate::zero());
        let spinning = ImuSample::new(Vector3::new(0.0, 0.0, 1.0), Vector3::new(0.0, 0.0, 9.81));

        filter.update(&spinning).expect("well-posed tilt");
        let psi_before = filter.psi_prev;

        let freefall = ImuSample::new(Vector3::new(0.0, 0.0, 1.0), Vector3::zeros());
        assert!(filter.update(&freefall).is_err());
        assert_eq!(filter.psi_prev, psi_before);

        // The next good tick integrates from the unchanged baseline
        let estimate = filter.update(&spinning).expect("well-posed tilt");
        assert!((estimate.psi - 2.0 * settings.dt()).abs() < EPSILON);
    }

    #[test]
    fn test_reset_zeroes_state_keeps_bias() {
        let mut filter = ComplementaryFilter::new(&level_settings(), resting_bias());
        let spinning = ImuSample::new(Vector3::new(0.1, 0.2, 0.3), Vector3::new(0.0, 0.0, 9.81));
        for _ in 0..10 {
            filter.update(&spinning).expect("well-posed tilt");
        }

        filter.reset();
        assert_eq!(filter.bias(), resting_bias());
        let estimate = filter.update(&resting_sample()).expect("well-posed tilt");
        assert!(estimate.psi.abs() < EPSILON);
    }
}
