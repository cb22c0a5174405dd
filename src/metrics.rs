//! Wall-clock timing and throughput for log lines
//!
//! Measurements are taken around one unit of work and turned into a
//! human-readable rate. Nothing here feeds back into control flow.

use std::fmt;
use std::time::{Duration, Instant};

/// Started timer for one unit of work
#[derive(Clone, Copy, Debug)]
pub struct Stopwatch {
    started: Instant,
}

impl Stopwatch {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Freeze the elapsed time alongside a count of processed items
    pub fn throughput(&self, count: usize) -> Throughput {
        Throughput::new(count, self.elapsed())
    }
}

/// Items processed over an elapsed duration
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Throughput {
    pub count: usize,
    pub elapsed: Duration,
}

impl Throughput {
    pub fn new(count: usize, elapsed: Duration) -> Self {
        Self { count, elapsed }
    }

    pub fn seconds(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    /// Average seconds spent per item, `None` when nothing was processed
    pub fn avg(&self) -> Option<f64> {
        (self.count > 0).then(|| self.seconds() / self.count as f64)
    }

    /// Items per second, `None` when no time was measured
    pub fn rate(&self) -> Option<f64> {
        let seconds = self.seconds();
        (seconds > 0.0).then(|| self.count as f64 / seconds)
    }
}

impl fmt::Display for Throughput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "seconds:{:.4} count:{}", self.seconds(), self.count)?;
        if let Some(avg) = self.avg() {
            write!(f, " avg:{:.4}/item", avg)?;
        }
        if let Some(rate) = self.rate() {
            write!(f, " rate:{:.1}/sec", rate)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rates() {
        let throughput = Throughput::new(4, Duration::from_secs(2));
        assert_eq!(throughput.avg(), Some(0.5));
        assert_eq!(throughput.rate(), Some(2.0));
        assert_eq!(
            throughput.to_string(),
            "seconds:2.0000 count:4 avg:0.5000/item rate:2.0/sec"
        );
    }

    #[test]
    fn test_zero_count() {
        let throughput = Throughput::new(0, Duration::from_millis(250));
        assert_eq!(throughput.avg(), None);
        assert_eq!(throughput.rate(), Some(0.0));
        assert_eq!(throughput.to_string(), "seconds:0.2500 count:0 rate:0.0/sec");
    }

    #[test]
    fn test_zero_elapsed() {
        let throughput = Throughput::new(3, Duration::ZERO);
        assert_eq!(throughput.rate(), None);
    }

    #[test]
    fn test_stopwatch_monotonic() {
        let watch = Stopwatch::start();
        let first = watch.elapsed();
        let second = watch.throughput(1).elapsed;
        assert!(second >= first);
    }
}
