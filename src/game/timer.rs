use std::time::Duration;

/// Pausable stopwatch over the game's logical clock.
///
/// Every call takes the current clock reading so the timer itself holds no
/// handle to a clock; readings must never go backwards.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Timer {
    accumulated: Duration,
    running_since: Option<Duration>,
    started: bool,
    stopped: bool,
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, now: Duration) {
        if self.started {
            return;
        }
        self.started = true;
        self.running_since = Some(now);
    }

    pub fn pause(&mut self, now: Duration) {
        if let Some(since) = self.running_since.take() {
            self.accumulated += now.saturating_sub(since);
        }
    }

    pub fn resume(&mut self, now: Duration) {
        if self.started && !self.stopped && self.running_since.is_none() {
            self.running_since = Some(now);
        }
    }

    pub fn stop(&mut self, now: Duration) {
        self.pause(now);
        self.stopped = true;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn elapsed(&self, now: Duration) -> Duration {
        match self.running_since {
            Some(since) => self.accumulated + now.saturating_sub(since),
            None => self.accumulated,
        }
    }

    pub fn elapsed_seconds(&self, now: Duration) -> u32 {
        u32::try_from(self.elapsed(now).as_secs()).unwrap_or(u32::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[test]
    fn reads_zero_before_start() {
        let timer = Timer::new();
        assert_eq!(timer.elapsed_seconds(secs(50)), 0);
    }

    #[test]
    fn counts_whole_seconds_while_running() {
        let mut timer = Timer::new();
        timer.start(secs(10));
        assert_eq!(timer.elapsed_seconds(secs(10) + Duration::from_millis(999)), 0);
        assert_eq!(timer.elapsed_seconds(secs(13)), 3);
    }

    #[test]
    fn paused_interval_is_not_counted() {
        let mut timer = Timer::new();
        timer.start(secs(0));
        timer.pause(secs(4));
        assert_eq!(timer.elapsed_seconds(secs(60)), 4);
        timer.resume(secs(60));
        assert_eq!(timer.elapsed_seconds(secs(62)), 6);
    }

    #[test]
    fn stopped_timer_ignores_resume_and_restart() {
        let mut timer = Timer::new();
        timer.start(secs(0));
        timer.stop(secs(9));
        timer.resume(secs(10));
        timer.start(secs(11));
        assert_eq!(timer.elapsed_seconds(secs(100)), 9);

        timer.reset();
        assert_eq!(timer.elapsed_seconds(secs(100)), 0);
    }
}
