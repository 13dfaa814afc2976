//! Advanced pedometer demonstration
//!
//! This example replays a recorded walk through the step detection pipeline
//! with the low-pass stage enabled, logs every processed sample to a
//! tab-separated file, persists the session and plots the detection signals.
//!
//! Features demonstrated:
//! - Custom pedometer settings
//! - Per-sample logging with a file sink
//! - Session snapshot to JSON and restore
//! - Visualization of the scalar, filtered, peak and threshold signals
//!
//! Run with: `cargo run --example advanced`

use pedometer_dsp::{
    CsvLogSink, PedometerSettings, PedometerSnapshot, Sample, SampleRecord, StepDetectionManager,
};
use plotters::prelude::*;
use serde::Deserialize;
use std::error::Error;

#[derive(Debug, Deserialize)]
struct SensorData {
    #[serde(rename = "Time (ns)")]
    time: i64,
    #[serde(rename = "Accelerometer X (m/s^2)")]
    accel_x: f32,
    #[serde(rename = "Accelerometer Y (m/s^2)")]
    accel_y: f32,
    #[serde(rename = "Accelerometer Z (m/s^2)")]
    accel_z: f32,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    println!("Advanced Pedometer Example - recorded walk with logging and plots");

    let mut reader = csv::Reader::from_path("testdata/walk.csv")?;
    let mut samples = Vec::new();
    for result in reader.deserialize() {
        let record: SensorData = result?;
        samples.push(Sample::new(
            record.accel_x,
            record.accel_y,
            record.accel_z,
            record.time,
        ));
    }
    if samples.is_empty() {
        return Err("no samples in testdata/walk.csv".into());
    }

    let settings = PedometerSettings {
        threshold_percent: 70, // step when peak exceeds 70% of the threshold
        low_pass_enabled: true,
        cutoff: 0.08, // 4 Hz corner at 50 Hz
        stage_count: 4,
    };
    settings.validate()?;

    let (sink, log_path) = CsvLogSink::create(std::env::temp_dir(), "pedometer_log")?;
    let mut manager = StepDetectionManager::with_sink(settings, sink);

    // In-memory copy of every frame for plotting
    let mut frames = Vec::with_capacity(samples.len());
    let mut rates = Vec::new();

    println!("Processing {} sensor samples...", samples.len());

    for (i, &sample) in samples.iter().enumerate() {
        let ready = manager.process(sample);
        frames.push(manager.frame().record());

        if ready {
            rates.push((sample.timestamp_ns, manager.step_rate()));
        }
        if ready && i % 400 == 399 {
            println!(
                "Sample {}: steps={} cadence={:.0} steps/min rate={:.1} Hz threshold={:.3}",
                i,
                manager.steps(),
                manager.step_rate(),
                manager.sample_rate(),
                manager.dynamic_threshold()
            );
        }
    }

    if let Some(sink) = manager.detach_sink() {
        let records = sink.records_written();
        sink.finish()?;
        println!("✓ {} records logged to {}", records, log_path.display());
    }

    // Persist and resume the session
    let saved = serde_json::to_string_pretty(&manager.snapshot())?;
    println!("Session snapshot:\n{}", saved);
    let snapshot: PedometerSnapshot = serde_json::from_str(&saved)?;
    let resumed = StepDetectionManager::restore(snapshot)?;
    println!(
        "✓ Restored session: {} steps over {:.1} s",
        resumed.steps(),
        resumed.run_time_ns() as f64 / 1e9
    );

    println!("Generating pedometer plots...");
    create_plots(&frames, &rates)?;

    println!("✓ Plots saved to pedometer_plots.png");
    println!("✓ Processing complete! Total steps: {}", manager.steps());
    Ok(())
}

/// Create plots of the detection signals
///
/// Generates a 3-panel plot showing:
/// 1. Scalar and low-pass filtered acceleration
/// 2. Peak strength and dynamic threshold
/// 3. Step rate per closed window
fn create_plots(
    records: &[SampleRecord],
    rates: &[(i64, f32)],
) -> Result<(), Box<dyn Error>> {
    let root = BitMapBackend::new("pedometer_plots.png", (1000, 900)).into_drawing_area();
    root.fill(&WHITE)?;
    let areas = root.split_evenly((3, 1));

    let (Some(first), Some(last)) = (records.first(), records.last()) else {
        return Ok(());
    };
    let start_ns = first.timestamp_ns;
    let seconds = |timestamp_ns: i64| (timestamp_ns - start_ns) as f32 / 1e9;
    let time_range = 0f32..seconds(last.timestamp_ns);

    let max_peak = records
        .iter()
        .map(|r| r.peak.max(r.threshold))
        .fold(1.0f32, f32::max);
    let max_scalar = records
        .iter()
        .map(|r| r.scalar.abs().max(r.filtered.abs()))
        .fold(0.5f32, f32::max);

    // 1. Scalar and filtered acceleration
    let mut signal_chart = ChartBuilder::on(&areas[0])
        .caption("Acceleration, Peaks and Step Rate", ("sans-serif", 20))
        .margin(5)
        .x_label_area_size(0)
        .y_label_area_size(50)
        .build_cartesian_2d(time_range.clone(), -max_scalar..max_scalar)?;

    signal_chart.configure_mesh().y_desc("m/s²").draw()?;

    signal_chart
        .draw_series(LineSeries::new(
            records.iter().map(|r| (seconds(r.timestamp_ns), r.scalar)),
            &RED,
        ))?
        .label("Scalar")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 10, y)], RED));

    signal_chart
        .draw_series(LineSeries::new(
            records.iter().map(|r| (seconds(r.timestamp_ns), r.filtered)),
            &BLUE,
        ))?
        .label("Filtered")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 10, y)], BLUE));

    signal_chart.configure_series_labels().draw()?;

    // 2. Peak strength and dynamic threshold
    let mut peak_chart = ChartBuilder::on(&areas[1])
        .margin(5)
        .x_label_area_size(0)
        .y_label_area_size(50)
        .build_cartesian_2d(time_range.clone(), 0f32..max_peak * 1.1)?;

    peak_chart.configure_mesh().y_desc("m/s³").draw()?;

    peak_chart
        .draw_series(
            records
                .iter()
                .filter(|r| r.peak > 0.0)
                .map(|r| Circle::new((seconds(r.timestamp_ns), r.peak), 3, GREEN.filled())),
        )?
        .label("Peak")
        .legend(|(x, y)| Circle::new((x + 5, y), 3, GREEN.filled()));

    peak_chart
        .draw_series(LineSeries::new(
            records
                .iter()
                .map(|r| (seconds(r.timestamp_ns), r.threshold)),
            &RGBColor(255, 165, 0), // orange
        ))?
        .label("Threshold")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 10, y)], RGBColor(255, 165, 0)));

    peak_chart.configure_series_labels().draw()?;

    // 3. Step rate
    let mut rate_chart = ChartBuilder::on(&areas[2])
        .margin(5)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(time_range, 0f32..200f32)?;

    rate_chart
        .configure_mesh()
        .x_desc("Time (s)")
        .y_desc("Steps/min")
        .draw()?;

    rate_chart
        .draw_series(LineSeries::new(
            rates.iter().map(|&(t, rate)| (seconds(t), rate)),
            &CYAN,
        ))?
        .label("Step rate")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 10, y)], CYAN));

    rate_chart.configure_series_labels().draw()?;

    root.present()?;
    Ok(())
}
