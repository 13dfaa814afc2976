//! Pedometer DSP - real-time step detection from accelerometer samples
//!
//! This library turns a stream of timestamped tri-axial acceleration samples
//! into a running step count, a cadence estimate and an adaptive detection
//! threshold. Work per sample is constant and memory use is fixed, so the
//! pipeline can run directly inside a sensor callback.
//!
//! # Features
//!
//! - Gravity-biased magnitude extraction from linear acceleration
//! - Cascaded single-pole low-pass filter, retuned to a 4 Hz corner from the
//!   measured sample rate
//! - Upward zero-crossing detection reporting the crossing gradient as peak
//!   strength
//! - Dynamic threshold from a four-tap weighted average of recent peaks
//! - Run time, sample rate and steps-per-minute statistics
//! - Pluggable per-sample log sinks, with a tab-separated file sink behind the
//!   `csv` feature
//! - Persistable session snapshot, serde-enabled behind the `serde` feature
//!
//! # Quick Start
//!
//! ```rust
//! use pedometer_dsp::{Sample, StepDetectionManager};
//!
//! let mut manager = StepDetectionManager::new();
//!
//! // Sensor reading: linear acceleration in m/s², timestamp in ns
//! let sample = Sample::new(0.12, -0.05, 0.4, 1_000_000_000);
//!
//! if manager.process(sample) {
//!     println!(
//!         "Steps: {}  Cadence: {:.0} steps/min  Rate: {:.1} Hz",
//!         manager.steps(),
//!         manager.step_rate(),
//!         manager.sample_rate(),
//!     );
//! }
//! ```

pub mod calibration;
mod error;
mod filter;
mod low_pass;
mod manager;
mod sensor;
pub mod sink;
mod state;
mod threshold;
mod types;
mod zero_crossing;

// Re-export all public types and functions
pub use error::{PedometerError, Result};
pub use filter::SignalFilter;
pub use low_pass::LowPassFilter;
pub use manager::{BATCHES_PER_WINDOW, SAMPLES_PER_BATCH, StepDetectionManager};
pub use sensor::{AccelerationListener, replay};
#[cfg(feature = "csv")]
pub use sink::CsvLogSink;
pub use sink::{LogSink, NullSink, RecordBuffer};
pub use state::PedometerSnapshot;
pub use threshold::{THRESHOLD_TAPS, THRESHOLD_WEIGHTS, ThresholdEstimator};
pub use types::*;
pub use zero_crossing::{Sign, ZeroCrossingDetector};
