use pedometer_dsp::{Sample, StepDetectionManager};

const SAMPLE_PERIOD_NS: i64 = 20_000_000; // 20 ms sample period

fn main() {
    env_logger::init();

    let mut manager = StepDetectionManager::new();

    for i in 0..400 {
        // this loop should repeat each time new accelerometer data is available
        let time = i as f32 * 0.02;
        let z = 2.0 * (time * 1.8 * std::f32::consts::TAU).sin() - 0.2; // replace this with actual linear acceleration in m/s²
        let sample = Sample::new(0.0, 0.0, z, i * SAMPLE_PERIOD_NS);

        if manager.process(sample) {
            println!(
                "Steps: {}, Cadence: {:.0} steps/min, Rate: {:.1} Hz",
                manager.steps(),
                manager.step_rate(),
                manager.sample_rate()
            );
        }
    }
}
