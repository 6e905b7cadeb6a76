//! Phase machine and fixed-rate run loop driving calibration and fusion

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use log::{info, warn};

use crate::calibration::BiasCalibrator;
use crate::error::EstimatorError;
use crate::filter::ComplementaryFilter;
use crate::sink::AttitudeSink;
use crate::source::SampleSource;
use crate::types::{BiasEstimate, EstimatorSettings};

/// How often blocking waits re-check the shutdown flag
const SHUTDOWN_POLL: Duration = Duration::from_millis(5);

/// Cloneable cooperative shutdown handle
///
/// Any holder may request shutdown; the estimator observes the request at
/// every blocking point and exits the current phase promptly. The flag is
/// one-way: once requested it stays requested.
#[derive(Debug, Clone, Default)]
pub struct Shutdown {
    requested: Arc<AtomicBool>,
}

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the estimator to stop at its next blocking point
    pub fn request(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }
}

/// Lifecycle phase of the estimator
///
/// Phases advance strictly forward; `Cancelled` is reachable from any of
/// the other three and is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Blocked until the sample source reports its first reading.
    /// Unbounded by design: the system assumes a sensor appears eventually.
    AwaitingFirstSample,
    /// Accumulating the stationary bias window
    Calibrating,
    /// Steady-state fusion loop
    Running,
    /// Shutdown observed; no further ticks will run
    Cancelled,
}

/// Fixed-period tick pacing with prompt shutdown observation
///
/// The next deadline advances by the period rather than from `now`, so
/// loop jitter does not accumulate into drift. Sleeps are sliced so a
/// shutdown request interrupts a wait within one poll interval instead of
/// one full period.
struct Ticker {
    period: Duration,
    deadline: Instant,
}

impl Ticker {
    fn new(period: Duration) -> Self {
        Self {
            period,
            deadline: Instant::now() + period,
        }
    }

    /// Sleep until the current deadline. Returns true if shutdown was
    /// requested before the deadline passed.
    fn wait(&mut self, shutdown: &Shutdown) -> bool {
        loop {
            if shutdown.is_requested() {
                return true;
            }
            let now = Instant::now();
            if now >= self.deadline {
                break;
            }
            thread::sleep((self.deadline - now).min(SHUTDOWN_POLL));
        }
        self.deadline += self.period;
        false
    }
}

/// Orchestrates the wait → calibrate → run sequence over one sensor stream
///
/// The estimator owns the mutable filter state for the life of the process.
/// It reads whatever sample the source currently holds at each tick, so a
/// fast transport has intermediate samples skipped and a slow one has its
/// last sample reused.
///
/// # Example
/// ```no_run
/// use imu_attitude::{AttitudeEstimator, EstimatorSettings, NullSink, SharedSample, Shutdown};
///
/// let slot = SharedSample::new();
/// let shutdown = Shutdown::new();
/// // hand clones of `slot` to the sensor transport and `shutdown` to the
/// // process signal handler, then drive the estimator on its own thread
/// let mut estimator =
///     AttitudeEstimator::new(EstimatorSettings::default(), shutdown.clone()).unwrap();
/// estimator.run(&slot, &mut NullSink).unwrap();
/// ```
pub struct AttitudeEstimator {
    settings: EstimatorSettings,
    shutdown: Shutdown,
    phase: Phase,
}

impl AttitudeEstimator {
    /// Create an estimator, rejecting invalid settings up front
    pub fn new(settings: EstimatorSettings, shutdown: Shutdown) -> Result<Self, EstimatorError> {
        settings.validate()?;
        Ok(Self {
            settings,
            shutdown,
            phase: Phase::AwaitingFirstSample,
        })
    }

    /// The phase the estimator last reached
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn settings(&self) -> EstimatorSettings {
        self.settings
    }

    /// Execute the full lifecycle: wait for the first sample, calibrate,
    /// then fuse until shutdown.
    ///
    /// Returns `Ok(())` when a shutdown request stops the steady-state loop
    /// (a requested stop of an open-ended loop is a normal exit) and
    /// `Err(Cancelled)` when shutdown cuts short the wait or calibration
    /// phases, in which case no bias is committed and fusion never starts.
    pub fn run<S, K>(&mut self, source: &S, sink: &mut K) -> Result<(), EstimatorError>
    where
        S: SampleSource,
        K: AttitudeSink,
    {
        let period = Duration::from_secs_f32(self.settings.dt());
        let mut ticker = Ticker::new(period);

        self.await_first_sample(source, &mut ticker)?;
        let bias = self.calibrate(source, &mut ticker)?;
        self.run_filter(source, sink, bias, &mut ticker)
    }

    /// Poll at the tick period until the source holds a sample.
    /// No timeout: startup blocks until the transport delivers.
    fn await_first_sample<S: SampleSource>(
        &mut self,
        source: &S,
        ticker: &mut Ticker,
    ) -> Result<(), EstimatorError> {
        info!("waiting for first IMU sample");
        loop {
            if source.latest().is_some() {
                return Ok(());
            }
            if ticker.wait(&self.shutdown) {
                self.phase = Phase::Cancelled;
                return Err(EstimatorError::Cancelled);
            }
        }
    }

    fn calibrate<S: SampleSource>(
        &mut self,
        source: &S,
        ticker: &mut Ticker,
    ) -> Result<BiasEstimate, EstimatorError> {
        self.phase = Phase::Calibrating;
        info!(
            "calibrating sensor bias over {} stationary samples",
            self.settings.calibration_samples
        );

        let mut calibrator = BiasCalibrator::new(self.settings.calibration_samples);
        loop {
            // A sample is present by precondition once the wait phase ends;
            // a source that momentarily reports absent just skips the tick.
            if let Some(sample) = source.latest() {
                calibrator.add_sample(&sample);
            }
            if let Some(bias) = calibrator.finish() {
                info!("calibration complete");
                return Ok(bias);
            }
            if ticker.wait(&self.shutdown) {
                self.phase = Phase::Cancelled;
                return Err(EstimatorError::Cancelled);
            }
        }
    }

    fn run_filter<S, K>(
        &mut self,
        source: &S,
        sink: &mut K,
        bias: BiasEstimate,
        ticker: &mut Ticker,
    ) -> Result<(), EstimatorError>
    where
        S: SampleSource,
        K: AttitudeSink,
    {
        self.phase = Phase::Running;
        info!(
            "attitude estimator started at {} Hz",
            self.settings.update_rate_hz
        );

        let mut filter = ComplementaryFilter::new(&self.settings, bias);
        loop {
            if let Some(sample) = source.latest() {
                match filter.update(&sample) {
                    Ok(estimate) => {
                        sink.publish_angles(&estimate);
                        sink.publish_orientation(&estimate.orientation());
                    }
                    // Numeric fault on this tick only: suppress the output
                    // and keep the loop alive.
                    Err(err) => warn!("tick output suppressed: {err}"),
                }
            }
            if ticker.wait(&self.shutdown) {
                self.phase = Phase::Cancelled;
                info!("attitude estimator stopped");
                return Ok(());
            }
        }
    }
}
