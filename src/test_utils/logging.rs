use std::sync::Once;
use std::time::Instant;

static TRACING: Once = Once::new();

/// Route `tracing` output through the test harness so it shows up next to
/// the failing test. Safe to call from every test.
pub fn init_test_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("skilltree=debug")),
            )
            .with_test_writer()
            .try_init();
    });
}

/// Step logger for multi-stage scenario tests.
pub struct TestLogger {
    test_name: String,
    start_time: Instant,
    steps: usize,
}

impl TestLogger {
    pub fn new(test_name: &str) -> Self {
        init_test_tracing();
        println!("\n[TEST START] {test_name}");
        Self {
            test_name: test_name.to_string(),
            start_time: Instant::now(),
            steps: 0,
        }
    }

    /// Log one step of the scenario, e.g. `invest(a)`.
    pub fn step(&mut self, description: &str) {
        self.steps += 1;
        println!("[STEP {}] {description}", self.steps);
    }

    pub fn log_state<T: std::fmt::Debug>(&self, name: &str, value: &T) {
        println!("[STATE] {name}: {value:?}");
    }

    pub fn pass(&self) {
        println!(
            "[RESULT] {} PASSED after {} steps in {:?}",
            self.test_name,
            self.steps,
            self.start_time.elapsed()
        );
    }

    pub fn steps(&self) -> usize {
        self.steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logger_counts_steps() {
        let mut logger = TestLogger::new("logger_counts_steps");
        logger.step("first");
        logger.step("second");
        logger.log_state("budget", &3u32);
        assert_eq!(logger.steps(), 2);
        logger.pass();
    }
}
