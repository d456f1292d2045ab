use std::time::Instant;

/// Accumulates the time spent between `start` and `stop` calls.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct Timer {
    pub total_time: u128,
    pub laps: usize,
    curr: Option<Instant>,
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline(always)]
    pub fn start(&mut self) {
        self.curr = Some(Instant::now());
    }

    /// Ends the running lap and returns its length in nanoseconds, 0 if none was running.
    #[inline(always)]
    pub fn stop(&mut self) -> u128 {
        let Some(curr) = self.curr.take() else {
            return 0;
        };

        let diff = curr.elapsed().as_nanos();
        self.total_time += diff;
        self.laps += 1;
        diff
    }

    /// Mean lap length in nanoseconds.
    pub fn mean(&self) -> f64 {
        if self.laps == 0 {
            return 0.0;
        }
        self.total_time as f64 / self.laps as f64
    }

    /// MiB per second when every lap processed `bytes` bytes.
    pub fn throughput(&self, bytes: usize) -> f64 {
        if self.total_time == 0 {
            return 0.0;
        }
        (bytes * self.laps) as f64 / (1 << 20) as f64 / (self.total_time as f64 / 1e9)
    }
}

#[test]
fn test_timer() {
    use std::{thread, time};

    let mut timer = Timer::new();
    assert_eq!(timer.stop(), 0);

    timer.start();
    thread::sleep(time::Duration::from_millis(20));
    timer.stop();

    assert_eq!(timer.laps, 1);
    assert!(timer.total_time >= 20_000_000);
    assert!(timer.mean() >= 20_000_000.0);
    assert!(timer.throughput(1 << 20) > 0.0);
}
