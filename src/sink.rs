//! Per-sample log sinks
//!
//! The manager hands every processed sample to an attached [`LogSink`] as
//! five ordered values (scalar, filtered, peak, threshold, timestamp)
//! followed by a record terminator. Sinks own their storage and report their
//! own failures; nothing a sink does can fail the pipeline.

use crate::types::SampleRecord;

/// Receiver for per-sample records
pub trait LogSink {
    /// Append one floating point field to the current record
    fn append_value(&mut self, value: f32);

    /// Append the sample timestamp to the current record
    fn append_timestamp(&mut self, timestamp_ns: i64);

    /// Terminate the current record
    fn end_record(&mut self);
}

impl<T: LogSink + ?Sized> LogSink for Box<T> {
    fn append_value(&mut self, value: f32) {
        (**self).append_value(value);
    }

    fn append_timestamp(&mut self, timestamp_ns: i64) {
        (**self).append_timestamp(timestamp_ns);
    }

    fn end_record(&mut self) {
        (**self).end_record();
    }
}

impl<T: LogSink + ?Sized> LogSink for &mut T {
    fn append_value(&mut self, value: f32) {
        (**self).append_value(value);
    }

    fn append_timestamp(&mut self, timestamp_ns: i64) {
        (**self).append_timestamp(timestamp_ns);
    }

    fn end_record(&mut self) {
        (**self).end_record();
    }
}

/// Sink type for managers that never log
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl LogSink for NullSink {
    fn append_value(&mut self, _value: f32) {}

    fn append_timestamp(&mut self, _timestamp_ns: i64) {}

    fn end_record(&mut self) {}
}

/// In-memory sink collecting [`SampleRecord`]s
///
/// Values are assigned to fields in emission order. Records are kept until
/// [`take`](Self::take) or [`clear`](Self::clear) is called.
///
/// # Example
/// ```
/// use pedometer_dsp::{LogSink, RecordBuffer};
///
/// let mut buffer = RecordBuffer::new();
/// for value in [0.1, 0.2, 0.0, 0.0] {
///     buffer.append_value(value);
/// }
/// buffer.append_timestamp(1_000);
/// buffer.end_record();
///
/// assert_eq!(buffer.records().len(), 1);
/// assert_eq!(buffer.records()[0].filtered, 0.2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RecordBuffer {
    records: Vec<SampleRecord>,
    pending: SampleRecord,
    field: usize,
}

impl RecordBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[SampleRecord] {
        &self.records
    }

    /// Remove and return all completed records
    pub fn take(&mut self) -> Vec<SampleRecord> {
        core::mem::take(&mut self.records)
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.pending = SampleRecord::default();
        self.field = 0;
    }
}

impl LogSink for RecordBuffer {
    fn append_value(&mut self, value: f32) {
        let slot = match self.field {
            0 => &mut self.pending.scalar,
            1 => &mut self.pending.filtered,
            2 => &mut self.pending.peak,
            3 => &mut self.pending.threshold,
            _ => {
                log::debug!("RecordBuffer dropping extra field {}", value);
                return;
            }
        };
        *slot = value;
        self.field += 1;
    }

    fn append_timestamp(&mut self, timestamp_ns: i64) {
        self.pending.timestamp_ns = timestamp_ns;
    }

    fn end_record(&mut self) {
        self.records.push(self.pending);
        self.pending = SampleRecord::default();
        self.field = 0;
    }
}

#[cfg(feature = "csv")]
pub use self::csv_sink::CsvLogSink;

#[cfg(feature = "csv")]
mod csv_sink {
    use std::fs::{File, OpenOptions};
    use std::io::{self, Write};
    use std::path::{Path, PathBuf};

    use super::LogSink;
    use crate::error::Result;

    /// Tab-separated log sink with CRLF line endings
    ///
    /// Write failures never reach the pipeline. The first one is kept, later
    /// writes are skipped, and the error is returned from
    /// [`finish`](Self::finish) or [`take_error`](Self::take_error).
    ///
    /// # Example
    /// ```
    /// use pedometer_dsp::{CsvLogSink, LogSink};
    ///
    /// let mut sink = CsvLogSink::new(Vec::new());
    /// sink.append_value(0.5);
    /// sink.append_value(0.25);
    /// sink.append_timestamp(42);
    /// sink.end_record();
    ///
    /// let bytes = sink.finish().unwrap();
    /// assert_eq!(String::from_utf8(bytes).unwrap(), "0.5\t0.25\t42\r\n");
    /// ```
    pub struct CsvLogSink<W: Write> {
        writer: csv::Writer<W>,
        error: Option<csv::Error>,
        records: u64,
    }

    impl<W: Write> CsvLogSink<W> {
        pub fn new(inner: W) -> Self {
            let writer = csv::WriterBuilder::new()
                .delimiter(b'\t')
                .terminator(csv::Terminator::CRLF)
                .has_headers(false)
                .flexible(true)
                .from_writer(inner);
            Self {
                writer,
                error: None,
                records: 0,
            }
        }

        /// Number of records terminated so far
        pub fn records_written(&self) -> u64 {
            self.records
        }

        /// The first write error, if any, clearing it
        pub fn take_error(&mut self) -> Option<csv::Error> {
            self.error.take()
        }

        pub fn flush(&mut self) -> Result<()> {
            self.writer.flush()?;
            Ok(())
        }

        /// Flush and return the underlying writer, or the first write error
        pub fn finish(mut self) -> Result<W> {
            if let Some(err) = self.error.take() {
                return Err(err.into());
            }
            let inner = self.writer.into_inner().map_err(|e| e.into_error())?;
            Ok(inner)
        }

        fn record(&mut self, result: csv::Result<()>) {
            if let Err(err) = result {
                log::warn!("Log sink write failed: {}", err);
                self.error = Some(err);
            }
        }
    }

    impl CsvLogSink<File> {
        /// Create a new log file in `dir` without overwriting existing files
        ///
        /// The file is named `stem`; while that name is taken an underscore
        /// is appended. Returns the sink and the path it writes to.
        pub fn create(dir: impl AsRef<Path>, stem: &str) -> Result<(Self, PathBuf)> {
            let mut name = String::from(stem);
            loop {
                let path = dir.as_ref().join(&name);
                match OpenOptions::new().write(true).create_new(true).open(&path) {
                    Ok(file) => {
                        log::info!("Opened sample log {}", path.display());
                        return Ok((Self::new(file), path));
                    }
                    Err(err) if err.kind() == io::ErrorKind::AlreadyExists => name.push('_'),
                    Err(err) => return Err(err.into()),
                }
            }
        }
    }

    impl<W: Write> LogSink for CsvLogSink<W> {
        fn append_value(&mut self, value: f32) {
            if self.error.is_none() {
                let result = self.writer.write_field(value.to_string());
                self.record(result);
            }
        }

        fn append_timestamp(&mut self, timestamp_ns: i64) {
            if self.error.is_none() {
                let result = self.writer.write_field(timestamp_ns.to_string());
                self.record(result);
            }
        }

        fn end_record(&mut self) {
            if self.error.is_none() {
                let result = self.writer.write_record(None::<&[u8]>);
                if result.is_ok() {
                    self.records += 1;
                }
                self.record(result);
            }
        }
    }
}
