//! Upward zero-crossing detector producing the peak strength

use crate::filter::SignalFilter;

const NANOS_PER_SECOND: f32 = 1e9;

/// Sign class of a sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    Negative,
    Zero,
    Positive,
}

impl Sign {
    /// Classify a value; both `0.0` and `-0.0` are [`Sign::Zero`]
    pub fn of(value: f32) -> Self {
        if value == 0.0 {
            Sign::Zero
        } else if value > 0.0 {
            Sign::Positive
        } else {
            Sign::Negative
        }
    }
}

/// Detects negative-to-nonnegative transitions
///
/// At each crossing the output is the absolute gradient between the previous
/// and current sample in units per second, which the step detector treats as
/// the strength of the peak. Every other sample yields exactly `0.0`.
///
/// Two samples with the same timestamp cannot define a gradient; a crossing
/// between them is ignored.
///
/// # Example
/// ```
/// use pedometer_dsp::{SignalFilter, ZeroCrossingDetector};
///
/// let mut detector = ZeroCrossingDetector::new();
/// assert_eq!(detector.process(-1.0, 0), 0.0);
/// // rises by 2.0 in 0.5 s
/// assert_eq!(detector.process(1.0, 500_000_000), 4.0);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroCrossingDetector {
    previous_value: f32,
    previous_timestamp_ns: i64,
}

impl ZeroCrossingDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value seen on the last call
    pub fn previous_value(&self) -> f32 {
        self.previous_value
    }

    /// Timestamp seen on the last call
    pub fn previous_timestamp_ns(&self) -> i64 {
        self.previous_timestamp_ns
    }

    fn gradient(&self, sample: f32, timestamp_ns: i64) -> f32 {
        let elapsed_ns = timestamp_ns.saturating_sub(self.previous_timestamp_ns);
        if elapsed_ns <= 0 {
            log::debug!(
                "Ignoring zero crossing with non-positive interval at {} ns",
                timestamp_ns
            );
            return 0.0;
        }
        ((sample - self.previous_value) / (elapsed_ns as f32 / NANOS_PER_SECOND)).abs()
    }
}

impl SignalFilter for ZeroCrossingDetector {
    fn reset(&mut self) {
        self.previous_value = 0.0;
        self.previous_timestamp_ns = 0;
    }

    fn process(&mut self, sample: f32, timestamp_ns: i64) -> f32 {
        let crossed = Sign::of(self.previous_value) == Sign::Negative
            && Sign::of(sample) != Sign::Negative;

        let output = if crossed {
            self.gradient(sample, timestamp_ns)
        } else {
            0.0
        };

        self.previous_value = sample;
        self.previous_timestamp_ns = timestamp_ns;
        output
    }
}
