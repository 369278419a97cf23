//! Mission state machine.
//!
//! ## States
//!
//!   NotStarted ──start──▶ InProgress(1) ──solve──▶ … ──▶ InProgress(5)
//!                              │                             │
//!                              └──── timer expiry ──▶ Failed │
//!                                                            └──solve──▶ Succeeded
//!
//! `Succeeded` and `Failed` are terminal for the run. `start_mission` begins
//! a new run from any state; only the [`Session`] carries over.
//!
//! ## Scheduled work
//!
//! Three kinds of task live on the injected [`Scheduler`]: the 1-second
//! countdown tick, the post-error lockout, and the auto-restart after a
//! failure. Each has at most one pending instance; scheduling a new one
//! always cancels the previous handle first.
//!
//! ## Outbound notifications
//!
//! Every transition queues a [`MissionEvent`] (drained by the front-end via
//! `take_events`). Alert and terminal observers registered with `on_alert`
//! / `on_terminal` are called synchronously as well.

use std::time::Duration;

use tracing::{debug, info, warn};

use super::clock::{Scheduler, TaskHandle, VirtualClock};
use super::countdown::{Countdown, TimerEvent};
use super::event::{AlertKind, MissionEvent};
use super::session::Session;
use crate::domain::attempts::{AttemptTracker, Outcome};
use crate::domain::puzzle::{Answer, PuzzleId};
use crate::domain::scoring::{self, Score, MISSION_SECONDS};
use crate::error::MissionError;
use crate::report::{MissionRecord, MissionReport};

const TICK: Duration = Duration::from_secs(1);

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MissionState {
    NotStarted,
    InProgress(PuzzleId),
    Succeeded,
    Failed,
}

impl MissionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, MissionState::Succeeded | MissionState::Failed)
    }

    pub fn current_puzzle(self) -> Option<PuzzleId> {
        match self {
            MissionState::InProgress(p) => Some(p),
            _ => None,
        }
    }
}

/// Work items placed on the scheduler.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MissionTask {
    Tick,
    LockoutEnd,
    AutoRestart,
}

/// Tunable delays. The mission length itself is fixed.
#[derive(Clone, Debug)]
pub struct MissionSettings {
    /// Per-puzzle lockout after a wrong answer, indexed by `PuzzleId::index`.
    pub lockouts: [Option<Duration>; 5],
    /// Delay before a failed run restarts by itself; `None` disables it.
    pub auto_restart: Option<Duration>,
}

impl MissionSettings {
    pub fn lockout_for(&self, puzzle: PuzzleId) -> Option<Duration> {
        self.lockouts[puzzle.index()].filter(|d| !d.is_zero())
    }
}

impl Default for MissionSettings {
    fn default() -> Self {
        let mut lockouts = [None; 5];
        lockouts[PuzzleId::Ping.index()] = Some(Duration::from_secs(10));
        MissionSettings {
            lockouts,
            auto_restart: Some(Duration::from_secs(60)),
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Lockout {
    puzzle: PuzzleId,
    timer: LockTimer,
}

/// A lockout keeps counting only while the countdown runs.
#[derive(Clone, Copy, Debug)]
enum LockTimer {
    Running(TaskHandle),
    Frozen(Duration),
}

impl Lockout {
    fn handle(&self) -> Option<TaskHandle> {
        match self.timer {
            LockTimer::Running(h) => Some(h),
            LockTimer::Frozen(_) => None,
        }
    }
}

type AlertHandler = Box<dyn FnMut(AlertKind)>;
type TerminalHandler = Box<dyn FnMut(&MissionRecord)>;

pub struct Mission<S: Scheduler<Task = MissionTask> = VirtualClock<MissionTask>> {
    session: Session,
    settings: MissionSettings,
    clock: S,

    state: MissionState,
    tracker: AttemptTracker,
    countdown: Countdown,
    paused: bool,
    /// Captured at start: no earlier run of the session had failed.
    first_attempt: bool,
    record: Option<MissionRecord>,

    tick_task: Option<TaskHandle>,
    lockout: Option<Lockout>,
    restart_task: Option<TaskHandle>,

    events: Vec<MissionEvent>,
    alert_handlers: Vec<AlertHandler>,
    terminal_handlers: Vec<TerminalHandler>,
}

impl Mission<VirtualClock<MissionTask>> {
    pub fn with_virtual_clock(session: Session, settings: MissionSettings) -> Self {
        Mission::new(session, settings, VirtualClock::new())
    }
}

impl<S: Scheduler<Task = MissionTask>> Mission<S> {
    pub fn new(session: Session, settings: MissionSettings, clock: S) -> Self {
        Mission {
            session,
            settings,
            clock,
            state: MissionState::NotStarted,
            tracker: AttemptTracker::new(),
            countdown: Countdown::new(MISSION_SECONDS),
            paused: false,
            first_attempt: true,
            record: None,
            tick_task: None,
            lockout: None,
            restart_task: None,
            events: Vec::new(),
            alert_handlers: Vec::new(),
            terminal_handlers: Vec::new(),
        }
    }

    // ══════════════════════════════════════════════════════════
    // Observers
    // ══════════════════════════════════════════════════════════

    pub fn on_alert(&mut self, handler: impl FnMut(AlertKind) + 'static) {
        self.alert_handlers.push(Box::new(handler));
    }

    pub fn on_terminal(&mut self, handler: impl FnMut(&MissionRecord) + 'static) {
        self.terminal_handlers.push(Box::new(handler));
    }

    pub fn take_events(&mut self) -> Vec<MissionEvent> {
        std::mem::take(&mut self.events)
    }

    // ══════════════════════════════════════════════════════════
    // Commands
    // ══════════════════════════════════════════════════════════

    /// Begin a new run. Run state is reset; the session is kept.
    pub fn start_mission(&mut self) {
        self.cancel_pending();

        self.tracker.reset();
        self.countdown.start(MISSION_SECONDS);
        self.tick_task = Some(self.clock.schedule_every(TICK, MissionTask::Tick));
        self.first_attempt = !self.session.has_failed_once();
        self.record = None;
        self.paused = false;
        self.state = MissionState::InProgress(PuzzleId::FIRST);

        let run = self.session.begin_run();
        info!(run, first_attempt = self.first_attempt, "mission started");
        self.events.push(MissionEvent::Started { run });
    }

    /// Validate an answer for `puzzle`.
    ///
    /// Returns `None` without recording anything when the submission does
    /// not apply: mission not in progress, not the current puzzle, payload
    /// for another puzzle, puzzle locked out, or mission paused.
    pub fn submit_answer(&mut self, puzzle: PuzzleId, answer: &Answer) -> Option<Outcome> {
        let MissionState::InProgress(current) = self.state else {
            debug!(%puzzle, state = ?self.state, "submission ignored: mission not in progress");
            return None;
        };
        if puzzle != current {
            debug!(%puzzle, %current, "submission ignored: stale puzzle");
            return None;
        }
        if answer.puzzle() != puzzle {
            warn!(%puzzle, payload = %answer.puzzle(), "submission ignored: payload for another puzzle");
            return None;
        }
        if self.paused {
            debug!(%puzzle, "submission ignored: paused");
            return None;
        }
        if self.is_locked(puzzle) {
            debug!(%puzzle, "submission ignored: locked out");
            return None;
        }

        let correct = answer.is_correct(&self.session.puzzle_context());
        let outcome = self.tracker.record_attempt(puzzle, correct);
        let attempts = self.tracker.get(puzzle).attempts;
        debug!(%puzzle, attempts, correct, "answer recorded");

        match outcome {
            Outcome::Advance => {
                self.events.push(MissionEvent::PuzzleSolved { puzzle, attempts });
                match puzzle.next() {
                    Some(next) => {
                        info!(solved = %puzzle, attempts, "advancing to {next}");
                        self.state = MissionState::InProgress(next);
                    }
                    None => self.succeed(),
                }
            }
            Outcome::Retry => {
                self.events.push(MissionEvent::PuzzleMissed { puzzle, attempts });
                if let Some(delay) = self.settings.lockout_for(puzzle) {
                    self.start_lockout(puzzle, delay);
                }
            }
        }

        Some(outcome)
    }

    /// Stop the countdown. Returns false if there was nothing to pause.
    pub fn pause(&mut self) -> bool {
        if self.paused || !matches!(self.state, MissionState::InProgress(_)) {
            return false;
        }
        if let Some(h) = self.tick_task.take() {
            self.clock.cancel(h);
        }
        if let Some(lockout) = self.lockout.as_mut() {
            if let LockTimer::Running(h) = lockout.timer {
                let left = self.clock.remaining(h).unwrap_or_default();
                self.clock.cancel(h);
                lockout.timer = LockTimer::Frozen(left);
            }
        }
        self.countdown.stop();
        self.paused = true;
        info!(remaining = self.countdown.remaining(), "mission paused");
        self.events.push(MissionEvent::Paused);
        true
    }

    pub fn resume(&mut self) -> bool {
        if !self.paused || !matches!(self.state, MissionState::InProgress(_)) {
            return false;
        }
        self.countdown.resume();
        if let Some(h) = self.tick_task.take() {
            self.clock.cancel(h);
        }
        self.tick_task = Some(self.clock.schedule_every(TICK, MissionTask::Tick));
        if let Some(lockout) = self.lockout.as_mut() {
            if let LockTimer::Frozen(left) = lockout.timer {
                let handle = self.clock.schedule_once(left, MissionTask::LockoutEnd);
                lockout.timer = LockTimer::Running(handle);
            }
        }
        self.paused = false;
        info!(remaining = self.countdown.remaining(), "mission resumed");
        self.events.push(MissionEvent::Resumed);
        true
    }

    /// Start over right away from a finished run, skipping any pending
    /// auto-restart.
    pub fn restart_now(&mut self) -> bool {
        if !self.state.is_terminal() {
            return false;
        }
        self.start_mission();
        true
    }

    /// Let `elapsed` pass on the clock and run whatever fell due.
    pub fn advance(&mut self, elapsed: Duration) {
        self.clock.advance(elapsed);
        while let Some(task) = self.clock.next_due() {
            self.dispatch(task);
        }
    }

    // ══════════════════════════════════════════════════════════
    // Queries
    // ══════════════════════════════════════════════════════════

    pub fn state(&self) -> MissionState {
        self.state
    }

    pub fn remaining_secs(&self) -> u32 {
        self.countdown.remaining()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn tracker(&self) -> &AttemptTracker {
        &self.tracker
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn settings(&self) -> &MissionSettings {
        &self.settings
    }

    pub fn record(&self) -> Option<&MissionRecord> {
        self.record.as_ref()
    }

    pub fn is_locked(&self, puzzle: PuzzleId) -> bool {
        self.lockout.is_some_and(|l| l.puzzle == puzzle)
    }

    /// Time left on the lockout of `puzzle`. Held still while paused.
    pub fn lockout_remaining(&self, puzzle: PuzzleId) -> Option<Duration> {
        let lockout = self.lockout.filter(|l| l.puzzle == puzzle)?;
        match lockout.timer {
            LockTimer::Running(h) => self.clock.remaining(h),
            LockTimer::Frozen(left) => Some(left),
        }
    }

    pub fn restart_remaining(&self) -> Option<Duration> {
        self.restart_task.and_then(|h| self.clock.remaining(h))
    }

    /// Build the report for the finished run.
    pub fn report(&self) -> Result<MissionReport, MissionError> {
        MissionReport::build(
            self.state,
            self.record.as_ref(),
            &self.tracker,
            self.session.participants(),
        )
    }

    // ══════════════════════════════════════════════════════════
    // Internals
    // ══════════════════════════════════════════════════════════

    fn dispatch(&mut self, task: MissionTask) {
        match task {
            MissionTask::Tick => self.on_tick(),
            MissionTask::LockoutEnd => {
                if let Some(lockout) = self.lockout.take() {
                    debug!(puzzle = %lockout.puzzle, "lockout ended");
                    self.events.push(MissionEvent::LockoutEnded { puzzle: lockout.puzzle });
                }
            }
            MissionTask::AutoRestart => {
                self.restart_task = None;
                info!("auto restart after failure");
                self.start_mission();
            }
        }
    }

    fn on_tick(&mut self) {
        if !matches!(self.state, MissionState::InProgress(_)) {
            return;
        }
        for event in self.countdown.tick() {
            match event {
                TimerEvent::FiveMinuteAlert => self.alert(AlertKind::FiveMinutesLeft),
                TimerEvent::ThirtySecondAlert => self.alert(AlertKind::ThirtySecondsLeft),
                TimerEvent::Expired => {
                    self.alert(AlertKind::TimeUp);
                    self.fail();
                }
            }
        }
    }

    fn alert(&mut self, kind: AlertKind) {
        info!(?kind, remaining = self.countdown.remaining(), "timer alert");
        self.events.push(MissionEvent::Alert(kind));
        for handler in &mut self.alert_handlers {
            handler(kind);
        }
    }

    fn start_lockout(&mut self, puzzle: PuzzleId, delay: Duration) {
        if let Some(h) = self.lockout.take().and_then(|l| l.handle()) {
            self.clock.cancel(h);
        }
        let handle = self.clock.schedule_once(delay, MissionTask::LockoutEnd);
        self.lockout = Some(Lockout { puzzle, timer: LockTimer::Running(handle) });
        debug!(%puzzle, secs = delay.as_secs(), "lockout started");
        self.events.push(MissionEvent::LockoutStarted { puzzle, seconds: delay.as_secs() });
    }

    /// Drop every pending task of the current run.
    fn cancel_pending(&mut self) {
        let handles = [
            self.tick_task.take(),
            self.restart_task.take(),
            self.lockout.take().and_then(|l| l.handle()),
        ];
        for handle in handles.into_iter().flatten() {
            self.clock.cancel(handle);
        }
    }

    fn stop_run_tasks(&mut self) {
        self.countdown.stop();
        if let Some(h) = self.tick_task.take() {
            self.clock.cancel(h);
        }
        if let Some(h) = self.lockout.take().and_then(|l| l.handle()) {
            self.clock.cancel(h);
        }
        self.paused = false;
    }

    fn succeed(&mut self) {
        self.stop_run_tasks();

        let remaining = self.countdown.remaining();
        let errors = self.tracker.error_count();
        let score = scoring::success_score(
            remaining,
            self.countdown.duration(),
            errors,
            self.session.has_failed_once(),
        );

        self.state = MissionState::Succeeded;
        info!(remaining, errors, score = score.value, max = score.max, "mission succeeded");
        self.events.push(MissionEvent::Succeeded { score: score.value, max_score: score.max });
        self.finish(true, remaining, score);
    }

    fn fail(&mut self) {
        self.stop_run_tasks();
        self.session.record_failure();

        self.state = MissionState::Failed;
        info!(errors = self.tracker.error_count(), "mission failed");
        self.events.push(MissionEvent::Failed);

        if let Some(delay) = self.settings.auto_restart.filter(|d| !d.is_zero()) {
            self.restart_task = Some(self.clock.schedule_once(delay, MissionTask::AutoRestart));
            self.events.push(MissionEvent::RestartScheduled { seconds: delay.as_secs() });
        }

        self.finish(false, 0, Score::failure());
    }

    fn finish(&mut self, won: bool, remaining: u32, score: Score) {
        let record = MissionRecord {
            won,
            time_remaining_secs: remaining,
            total_secs: self.countdown.duration(),
            first_attempt_of_session: self.first_attempt,
            error_count: self.tracker.error_count(),
            score: score.value,
            max_score: score.max,
        };
        self.record = Some(record);
        for handler in &mut self.terminal_handlers {
            handler(&record);
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
