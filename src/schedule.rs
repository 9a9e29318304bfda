use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Runs one job on a fixed cadence, never overlapping itself.
pub struct Scheduler<F> {
    every: Duration,
    tick: Duration,
    job: F,
}

impl<F: FnMut() -> ControlFlow<()>> Scheduler<F> {
    pub fn new(every: Duration, job: F) -> Self {
        Self { every, tick: Duration::from_secs(1), job }
    }

    /// How long to sleep between checks of the clock and the stop flag.
    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    /// Runs the job now and then every `every` until it breaks or `stop` is set.
    /// Returns how many times the job ran.
    pub fn run(&mut self, stop: &AtomicBool) -> usize {
        let mut runs = 0;
        let mut next = Instant::now();

        while !stop.load(Ordering::SeqCst) {
            if Instant::now() >= next {
                runs += 1;
                if (self.job)().is_break() { break; }
                // a slow cycle pushes the next one back instead of queueing a burst
                next = Instant::now() + self.every;
                continue;
            }
            std::thread::sleep(self.tick);
        }
        runs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_immediately_then_repeats() {
        let stop = AtomicBool::new(false);
        let mut n = 0;
        let mut s = Scheduler::new(Duration::ZERO, || {
            n += 1;
            if n == 3 { ControlFlow::Break(()) } else { ControlFlow::Continue(()) }
        })
        .with_tick(Duration::ZERO);
        assert_eq!(s.run(&stop), 3);
    }

    #[test]
    fn stop_flag_ends_the_loop() {
        let stop = AtomicBool::new(false);
        let mut s = Scheduler::new(Duration::from_secs(3600), || {
            stop.store(true, Ordering::SeqCst);
            ControlFlow::Continue(())
        })
        .with_tick(Duration::from_millis(1));
        assert_eq!(s.run(&stop), 1);
    }

    #[test]
    fn already_stopped_never_runs() {
        let stop = AtomicBool::new(true);
        let mut s = Scheduler::new(Duration::ZERO, || ControlFlow::Continue(()));
        assert_eq!(s.run(&stop), 0);
    }

    #[test]
    fn waits_for_the_interval() {
        let stop = AtomicBool::new(false);
        let started = Instant::now();
        let mut n = 0;
        let mut s = Scheduler::new(Duration::from_millis(20), || {
            n += 1;
            if n == 2 { ControlFlow::Break(()) } else { ControlFlow::Continue(()) }
        })
        .with_tick(Duration::from_millis(1));
        s.run(&stop);
        assert!(started.elapsed() >= Duration::from_millis(20));
    }
}
