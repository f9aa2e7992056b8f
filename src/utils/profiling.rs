use std::time::{Duration, Instant};

/// Timing and counter data gathered over the most recent fixed step.
#[derive(Debug, Default, Clone, Copy)]
pub struct StepProfiler {
    pub simulate_time: Duration,
    pub index_time: Duration,
    pub dispatch_time: Duration,

    pub simulated_bodies: usize,
    pub contacts_pushed: usize,
    pub enter_events: usize,
    pub exit_events: usize,
}

impl StepProfiler {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn total_time(&self) -> Duration {
        self.simulate_time + self.dispatch_time
    }

    pub fn report(&self) {
        let total_us = self.total_time().as_micros() as f32;
        if total_us < 1.0 {
            return;
        }

        log::debug!(
            "physics step: {:.3} ms (simulate {:.3} ms, index {:.3} ms, dispatch {:.3} ms)",
            self.total_time().as_secs_f32() * 1000.0,
            self.simulate_time.as_secs_f32() * 1000.0,
            self.index_time.as_secs_f32() * 1000.0,
            self.dispatch_time.as_secs_f32() * 1000.0,
        );
        log::debug!(
            "bodies: {}, contacts: {}, enter: {}, exit: {}",
            self.simulated_bodies,
            self.contacts_pushed,
            self.enter_events,
            self.exit_events
        );
    }
}

/// Adds the elapsed time of its scope to a [`Duration`] slot.
pub struct SectionTimer<'a> {
    start: Instant,
    output: &'a mut Duration,
}

impl<'a> SectionTimer<'a> {
    pub fn new(output: &'a mut Duration) -> Self {
        Self {
            start: Instant::now(),
            output,
        }
    }
}

impl<'a> Drop for SectionTimer<'a> {
    fn drop(&mut self) {
        *self.output += self.start.elapsed();
    }
}
