//! Mission countdown with one-shot threshold alerts.
//!
//! Pure state: something else calls [`Countdown::tick`] once per second.
//! Alerts fire only on the tick that lands exactly on their threshold, so
//! pausing across a threshold never fires it late.

/// Remaining seconds at which the "5 minutes left" alert fires.
pub const FIVE_MINUTE_MARK: u32 = 300;
/// Remaining seconds at which the final alert fires.
pub const THIRTY_SECOND_MARK: u32 = 30;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TimerEvent {
    FiveMinuteAlert,
    ThirtySecondAlert,
    Expired,
}

#[derive(Clone, Debug)]
pub struct Countdown {
    duration: u32,
    remaining: u32,
    running: bool,
    five_minute_fired: bool,
    thirty_second_fired: bool,
}

impl Countdown {
    pub fn new(duration: u32) -> Self {
        Countdown {
            duration,
            remaining: duration,
            running: false,
            five_minute_fired: false,
            thirty_second_fired: false,
        }
    }

    /// Begin a fresh countdown, replacing whatever was running.
    pub fn start(&mut self, duration: u32) {
        self.duration = duration;
        self.reset();
        self.running = self.remaining > 0;
    }

    pub fn tick(&mut self) -> Vec<TimerEvent> {
        if !self.running || self.remaining == 0 {
            return vec![];
        }

        let mut events = Vec::new();
        self.remaining -= 1;

        if self.remaining == FIVE_MINUTE_MARK && !self.five_minute_fired {
            self.five_minute_fired = true;
            events.push(TimerEvent::FiveMinuteAlert);
        }
        if self.remaining == THIRTY_SECOND_MARK && !self.thirty_second_fired {
            self.thirty_second_fired = true;
            events.push(TimerEvent::ThirtySecondAlert);
        }
        if self.remaining == 0 {
            self.running = false;
            events.push(TimerEvent::Expired);
        }

        events
    }

    /// Idempotent.
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Continue from the current remaining time. Alert flags are kept.
    pub fn resume(&mut self) {
        self.running = self.remaining > 0;
    }

    /// Back to full duration with alerts re-armed; stays stopped.
    pub fn reset(&mut self) {
        self.remaining = self.duration;
        self.running = false;
        self.five_minute_fired = false;
        self.thirty_second_fired = false;
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn duration(&self) -> u32 {
        self.duration
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(c: &mut Countdown, ticks: u32) -> Vec<TimerEvent> {
        (0..ticks).flat_map(|_| c.tick()).collect()
    }

    #[test]
    fn full_run_fires_each_event_once_in_order() {
        let mut c = Countdown::new(600);
        c.start(600);
        let events = run(&mut c, 700);
        assert_eq!(
            events,
            vec![TimerEvent::FiveMinuteAlert, TimerEvent::ThirtySecondAlert, TimerEvent::Expired]
        );
        assert_eq!(c.remaining(), 0);
        assert!(!c.is_running());
    }

    #[test]
    fn alerts_land_on_exact_thresholds() {
        let mut c = Countdown::new(600);
        c.start(600);
        assert!(run(&mut c, 299).is_empty());
        assert_eq!(c.tick(), vec![TimerEvent::FiveMinuteAlert]);
        assert_eq!(c.remaining(), 300);
        assert!(run(&mut c, 269).is_empty());
        assert_eq!(c.tick(), vec![TimerEvent::ThirtySecondAlert]);
        assert_eq!(c.remaining(), 30);
    }

    #[test]
    fn stopped_countdown_does_not_tick() {
        let mut c = Countdown::new(600);
        c.start(600);
        c.stop();
        c.stop();
        assert!(c.tick().is_empty());
        assert_eq!(c.remaining(), 600);
    }

    #[test]
    fn pause_across_threshold_is_not_retroactive() {
        let mut c = Countdown::new(600);
        c.start(600);
        run(&mut c, 300);
        c.stop();
        c.resume();
        assert!(run(&mut c, 269).is_empty());
        assert_eq!(c.tick(), vec![TimerEvent::ThirtySecondAlert]);
    }

    #[test]
    fn restart_rearms_alerts() {
        let mut c = Countdown::new(600);
        c.start(600);
        run(&mut c, 300);
        c.start(600);
        assert_eq!(c.remaining(), 600);
        assert_eq!(run(&mut c, 300), vec![TimerEvent::FiveMinuteAlert]);
    }

    #[test]
    fn reset_restores_duration_and_stops() {
        let mut c = Countdown::new(600);
        c.start(600);
        run(&mut c, 10);
        c.reset();
        assert_eq!(c.remaining(), 600);
        assert!(!c.is_running());
    }

    #[test]
    fn resume_after_expiry_stays_stopped() {
        let mut c = Countdown::new(2);
        c.start(2);
        run(&mut c, 2);
        c.resume();
        assert!(!c.is_running());
        assert!(c.tick().is_empty());
    }
}
