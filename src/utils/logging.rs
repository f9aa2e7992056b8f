use log::{log_enabled, trace, warn, Level};
use std::time::{Duration, Instant};

/// Trace span around one phase of a tick, tagged with the tick number.
pub struct PhaseSpan {
    phase: &'static str,
    tick: u64,
    start: Instant,
}

impl PhaseSpan {
    pub fn new(phase: &'static str, tick: u64) -> Self {
        if log_enabled!(Level::Trace) {
            trace!("tick {tick}: {phase} begin");
        }
        Self {
            phase,
            tick,
            start: Instant::now(),
        }
    }
}

impl Drop for PhaseSpan {
    fn drop(&mut self) {
        if log_enabled!(Level::Trace) {
            trace!(
                "tick {}: {} done in {} µs",
                self.tick,
                self.phase,
                self.start.elapsed().as_micros()
            );
        }
    }
}

/// Warns when fixed step `tick` overran `budget_ms`. A non-positive budget
/// disables the check. Returns whether the step was over budget.
pub fn warn_if_over_budget(tick: u64, bodies: usize, elapsed: Duration, budget_ms: f32) -> bool {
    if budget_ms <= 0.0 {
        return false;
    }
    let elapsed_ms = elapsed.as_secs_f32() * 1000.0;
    if elapsed_ms <= budget_ms {
        return false;
    }
    warn!("tick {tick} took {elapsed_ms:.2} ms for {bodies} bodies (budget {budget_ms:.2} ms)");
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_check() {
        assert!(warn_if_over_budget(7, 3, Duration::from_millis(20), 16.0));
        assert!(!warn_if_over_budget(7, 3, Duration::from_millis(10), 16.0));
        assert!(!warn_if_over_budget(7, 3, Duration::from_secs(1), 0.0));
    }
}
