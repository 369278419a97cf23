//! Front-end state: which screen is up, the forms on it, and how key
//! presses and mission events change them. Drawing lives in `renderer`.

use std::path::PathBuf;
use std::time::Duration;

use chrono::Local;
use crossterm::event::{KeyCode, KeyEvent};
use rand::seq::SliceRandom;
use tracing::{info, warn};

use netescape::domain::puzzle::{FlowStep, Network, PuzzleId};
use netescape::report::text;
use netescape::sim::session::MAX_AGENTS;
use netescape::{AlertKind, Answer, Mission, MissionEvent, Participants};

use super::form::{Field, Form, FormAction};

const MESSAGE_TTL: Duration = Duration::from_secs(3);
const NAME_CHARS: usize = 24;
const ANSWER_CHARS: usize = 32;
const COMMAND_CHARS: usize = 64;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Screen {
    Setup,
    Briefing,
    Mission,
    Debrief,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Tone {
    Info,
    Good,
    Bad,
}

pub struct App {
    mission: Mission,
    screen: Screen,
    setup: Form,
    puzzle: Form,
    form_for: Option<PuzzleId>,
    /// Order in which the flowchart labels are offered in every slot.
    flow_labels: Vec<FlowStep>,
    network_reset: Duration,
    network_lock: Option<Duration>,
    message: Option<(String, Tone, Duration)>,
    report_dir: PathBuf,
    last_report: Option<PathBuf>,
    quit: bool,
}

impl App {
    pub fn new(mission: Mission, network_reset: Duration, report_dir: PathBuf) -> Self {
        let mut fields = vec![Field::text("Teacher", NAME_CHARS)];
        for n in 1..=MAX_AGENTS {
            fields.push(Field::text(format!("Agent {n}"), NAME_CHARS));
        }
        let mut app = App {
            mission,
            screen: Screen::Setup,
            setup: Form::new(fields),
            puzzle: Form::default(),
            form_for: None,
            flow_labels: FlowStep::SOLUTION.to_vec(),
            network_reset,
            network_lock: None,
            message: None,
            report_dir,
            last_report: None,
            quit: false,
        };
        app.shuffle_flow_labels();
        app
    }

    // ── Accessors for the renderer ──

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn mission(&self) -> &Mission {
        &self.mission
    }

    pub fn setup_form(&self) -> &Form {
        &self.setup
    }

    pub fn puzzle_form(&self) -> &Form {
        &self.puzzle
    }

    pub fn message(&self) -> Option<(&str, Tone)> {
        self.message.as_ref().map(|(m, t, _)| (m.as_str(), *t))
    }

    pub fn last_report(&self) -> Option<&PathBuf> {
        self.last_report.as_ref()
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn network_locked(&self) -> bool {
        self.network_lock.is_some()
    }

    // ── Input ──

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Esc {
            self.quit = true;
            return;
        }
        match self.screen {
            Screen::Setup => {
                if self.setup.handle_key(key) == FormAction::Submit {
                    self.confirm_setup();
                }
            }
            Screen::Briefing => {
                if key.code == KeyCode::Enter {
                    self.mission.start_mission();
                }
            }
            Screen::Mission => self.handle_mission_key(key),
            Screen::Debrief => match key.code {
                KeyCode::Char('r') | KeyCode::Char('R') => {
                    self.mission.restart_now();
                }
                KeyCode::Char('p') | KeyCode::Char('P') => self.save_report(),
                _ => {}
            },
        }
    }

    fn handle_mission_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::F(1) {
            if !self.mission.pause() {
                self.mission.resume();
            }
            return;
        }
        if self.mission.is_paused() {
            return;
        }
        match self.puzzle.handle_key(key) {
            FormAction::Submit => self.submit(),
            FormAction::Picked(idx) => self.on_pick(idx),
            FormAction::Changed(_) | FormAction::None => {}
        }
    }

    fn confirm_setup(&mut self) {
        let teacher = self.setup.text(0).to_string();
        let agents: Vec<String> = (1..=MAX_AGENTS).map(|i| self.setup.text(i).to_string()).collect();
        let participants = Participants::new(&teacher, agents);
        info!(teacher = participants.teacher(), agents = participants.agents().len(), "participants set");
        self.mission.session_mut().set_participants(participants);
        self.screen = Screen::Briefing;
    }

    fn on_pick(&mut self, idx: usize) {
        if self.form_for != Some(PuzzleId::Wifi) || idx != 0 {
            return;
        }
        let Some(network) = self.puzzle.selected(0).and_then(|i| Network::ALL.get(i).copied()) else {
            return;
        };
        self.puzzle.set_disabled(0, true);
        if network.is_secure() {
            self.say("Wi-Fi connected, now enter the key", Tone::Good);
        } else {
            self.say("Network error: this is not the agents' network", Tone::Bad);
            self.network_lock = Some(self.network_reset);
        }
    }

    fn submit(&mut self) {
        let Some(puzzle) = self.mission.state().current_puzzle() else {
            return;
        };
        if puzzle == PuzzleId::IpAddressing
            && (self.puzzle.text(0).trim().is_empty() || self.puzzle.text(1).trim().is_empty())
        {
            self.say("Fill in both addresses first", Tone::Info);
            return;
        }
        let answer = self.answer_for(puzzle);
        if self.mission.submit_answer(puzzle, &answer).is_none() && self.mission.is_locked(puzzle) {
            self.say("Terminal locked, wait for the countdown", Tone::Info);
        }
    }

    fn answer_for(&self, puzzle: PuzzleId) -> Answer {
        let f = &self.puzzle;
        match puzzle {
            PuzzleId::Cabling => Answer::Cabling {
                cable_plugged: f.toggled(0),
                password: f.text(1).to_string(),
            },
            PuzzleId::Wifi => Answer::Wifi {
                network: f.selected(0).and_then(|i| Network::ALL.get(i).copied()),
                password: f.text(1).to_string(),
            },
            PuzzleId::IpAddressing => Answer::IpAddressing {
                pc3: f.text(0).to_string(),
                pc4: f.text(1).to_string(),
            },
            PuzzleId::Ping => Answer::Ping { command: f.text(0).to_string() },
            PuzzleId::Troubleshooting => {
                let mut slots = [None; 5];
                for (i, slot) in slots.iter_mut().enumerate() {
                    *slot = f.selected(i).and_then(|j| self.flow_labels.get(j).copied());
                }
                Answer::Troubleshooting { slots }
            }
        }
    }

    fn save_report(&mut self) {
        let report = match self.mission.report() {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "report unavailable");
                return;
            }
        };
        match text::save(&report, &self.report_dir, Local::now()) {
            Ok(path) => {
                self.say(format!("Report saved to {}", path.display()), Tone::Good);
                self.last_report = Some(path);
            }
            Err(e) => {
                warn!(error = %e, "report not saved");
                self.say(format!("Could not save report: {e}"), Tone::Bad);
            }
        }
    }

    // ── Time and events ──

    /// Let `elapsed` pass, react to whatever the mission reported since the
    /// last call, and hand the events back for sound.
    pub fn tick(&mut self, elapsed: Duration) -> Vec<MissionEvent> {
        let expired = match &mut self.message {
            Some((_, _, ttl)) => {
                *ttl = ttl.saturating_sub(elapsed);
                ttl.is_zero()
            }
            None => false,
        };
        if expired {
            self.message = None;
        }

        self.mission.advance(elapsed);
        let events = self.mission.take_events();
        self.on_events(&events);

        if self.mission.is_paused() {
            return events;
        }
        if let Some(left) = self.network_lock {
            let left = left.saturating_sub(elapsed);
            if left.is_zero() {
                self.network_lock = None;
                self.puzzle.clear_selection(0);
                self.puzzle.set_disabled(0, false);
            } else {
                self.network_lock = Some(left);
            }
        }
        events
    }

    fn on_events(&mut self, events: &[MissionEvent]) {
        for event in events {
            match *event {
                MissionEvent::Started { .. } => {
                    self.screen = Screen::Mission;
                    self.form_for = None;
                    self.last_report = None;
                    self.message = None;
                }
                MissionEvent::PuzzleSolved { puzzle, .. } if !puzzle.is_last() => {
                    self.say(format!("{} solved", puzzle.title()), Tone::Good);
                }
                MissionEvent::PuzzleMissed { puzzle, .. } => self.on_miss(puzzle),
                MissionEvent::LockoutStarted { puzzle, seconds } if self.form_for == Some(puzzle) => {
                    self.puzzle.set_disabled(0, true);
                    self.say(format!("Wrong command, terminal locked for {seconds} s"), Tone::Bad);
                }
                MissionEvent::LockoutEnded { puzzle } if self.form_for == Some(puzzle) => {
                    let prompt = self.mission.session().puzzle_context().ping_prompt();
                    self.puzzle.set_text(0, &prompt);
                    self.puzzle.set_disabled(0, false);
                }
                MissionEvent::Alert(AlertKind::FiveMinutesLeft) => {
                    self.say("Attention agents: only 5 minutes left.", Tone::Info);
                }
                MissionEvent::Alert(AlertKind::ThirtySecondsLeft) => {
                    self.say("FINAL ALERT: 30 seconds left...", Tone::Bad);
                }
                MissionEvent::Paused => self.say("Mission paused", Tone::Info),
                MissionEvent::Resumed => self.message = None,
                MissionEvent::Succeeded { .. } | MissionEvent::Failed => {
                    self.screen = Screen::Debrief;
                    self.network_lock = None;
                }
                _ => {}
            }
        }
        self.sync_form();
    }

    fn on_miss(&mut self, puzzle: PuzzleId) {
        match puzzle {
            PuzzleId::IpAddressing => {
                self.puzzle.set_text(0, "");
                self.puzzle.set_text(1, "");
                self.say("Wrong addresses, try again", Tone::Bad);
            }
            PuzzleId::Troubleshooting => {
                self.shuffle_flow_labels();
                self.form_for = None;
                self.say("The procedure is not in the right order", Tone::Bad);
            }
            // Ping has its own lockout message.
            PuzzleId::Ping => {}
            _ => self.say("Incorrect, try again", Tone::Bad),
        }
    }

    /// Rebuild the puzzle form when the mission moved to another puzzle.
    fn sync_form(&mut self) {
        let current = self.mission.state().current_puzzle();
        if current == self.form_for {
            return;
        }
        self.form_for = current;
        self.network_lock = None;
        self.puzzle = match current {
            Some(p) => self.build_form(p),
            None => Form::default(),
        };
    }

    fn build_form(&self, puzzle: PuzzleId) -> Form {
        match puzzle {
            PuzzleId::Cabling => Form::new(vec![
                Field::toggle("Cable", "plugged in", "unplugged"),
                Field::text("Password", ANSWER_CHARS),
            ]),
            PuzzleId::Wifi => Form::new(vec![
                Field::choice("Network", Network::ALL.iter().map(|n| n.label().to_string()).collect()),
                Field::text("Wi-Fi key", ANSWER_CHARS),
            ]),
            PuzzleId::IpAddressing => Form::new(vec![
                Field::text("PC3 address", ANSWER_CHARS),
                Field::text("PC4 address", ANSWER_CHARS),
            ]),
            PuzzleId::Ping => {
                let mut form = Form::new(vec![Field::text("Command", COMMAND_CHARS)]);
                form.set_text(0, &self.mission.session().puzzle_context().ping_prompt());
                form
            }
            PuzzleId::Troubleshooting => {
                let options: Vec<String> = self.flow_labels.iter().map(|s| s.label().to_string()).collect();
                Form::new((1..=5).map(|n| Field::choice(format!("Step {n}"), options.clone())).collect())
            }
        }
    }

    fn shuffle_flow_labels(&mut self) {
        self.flow_labels.shuffle(&mut rand::rng());
    }

    fn say(&mut self, text: impl Into<String>, tone: Tone) {
        self.message = Some((text.into(), tone, MESSAGE_TTL));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use netescape::domain::puzzle::{CABLE_PASSWORD, PC3_ADDRESS, PC4_ADDRESS, WIFI_PASSWORD};
    use netescape::{MissionSettings, MissionState, Session};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(app: &mut App, s: &str) {
        for c in s.chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
    }

    fn app() -> App {
        let mission = Mission::with_virtual_clock(Session::default(), MissionSettings::default());
        App::new(mission, Duration::from_secs(10), PathBuf::from("reports"))
    }

    fn started() -> App {
        let mut app = app();
        type_str(&mut app, "Mme Durand");
        app.handle_key(key(KeyCode::Tab));
        type_str(&mut app, "zoe");
        app.handle_key(key(KeyCode::Enter));
        app.handle_key(key(KeyCode::Enter));
        app.tick(Duration::ZERO);
        app
    }

    fn solve_cabling(app: &mut App) {
        app.handle_key(key(KeyCode::Char(' ')));
        app.handle_key(key(KeyCode::Tab));
        type_str(app, CABLE_PASSWORD);
        app.handle_key(key(KeyCode::Enter));
        app.tick(Duration::ZERO);
    }

    #[test]
    fn setup_names_feed_the_session() {
        let app = started();
        assert_eq!(app.screen(), Screen::Mission);
        let p = app.mission().session().participants();
        assert_eq!(p.teacher(), "Mme Durand");
        assert_eq!(p.agents(), ["zoe"]);
    }

    #[test]
    fn solving_rebuilds_the_form() {
        let mut app = started();
        solve_cabling(&mut app);
        assert_eq!(app.mission().state(), MissionState::InProgress(PuzzleId::Wifi));
        assert_eq!(app.puzzle_form().fields[0].label, "Network");
    }

    #[test]
    fn wrong_network_locks_selector_then_resets() {
        let mut app = started();
        solve_cabling(&mut app);
        // The first network listed is not the agents' one.
        app.handle_key(key(KeyCode::Right));
        assert!(!app.network_locked());
        app.handle_key(key(KeyCode::Char(' ')));
        assert!(app.network_locked());
        assert!(app.puzzle_form().fields[0].disabled);

        app.tick(Duration::from_secs(9));
        assert!(app.network_locked());
        app.tick(Duration::from_secs(1));
        assert!(!app.network_locked());
        assert_eq!(app.puzzle_form().selected(0), None);
        assert!(!app.puzzle_form().fields[0].disabled);
    }

    #[test]
    fn pause_holds_the_selector_lock() {
        let mut app = started();
        solve_cabling(&mut app);
        app.handle_key(key(KeyCode::Right));
        app.handle_key(key(KeyCode::Char(' ')));
        app.tick(Duration::from_secs(4));

        app.handle_key(key(KeyCode::F(1)));
        app.tick(Duration::from_secs(10));
        assert!(app.network_locked());

        app.handle_key(key(KeyCode::F(1)));
        app.tick(Duration::from_secs(5));
        assert!(app.network_locked());
        app.tick(Duration::from_secs(1));
        assert!(!app.network_locked());
    }

    #[test]
    fn secure_network_then_key_solves_wifi() {
        let mut app = started();
        solve_cabling(&mut app);
        app.handle_key(key(KeyCode::Right));
        app.handle_key(key(KeyCode::Right));
        app.handle_key(key(KeyCode::Char(' ')));
        assert!(!app.network_locked());
        assert!(app.puzzle_form().fields[0].disabled);
        app.handle_key(key(KeyCode::Tab));
        type_str(&mut app, WIFI_PASSWORD);
        app.handle_key(key(KeyCode::Enter));
        app.tick(Duration::ZERO);
        assert_eq!(app.mission().state(), MissionState::InProgress(PuzzleId::IpAddressing));
    }

    #[test]
    fn ip_puzzle_needs_both_fields_and_clears_on_miss() {
        let mut app = started();
        solve_cabling(&mut app);
        app.handle_key(key(KeyCode::Right));
        app.handle_key(key(KeyCode::Right));
        app.handle_key(key(KeyCode::Tab));
        type_str(&mut app, WIFI_PASSWORD);
        app.handle_key(key(KeyCode::Enter));
        app.tick(Duration::ZERO);

        type_str(&mut app, PC3_ADDRESS);
        app.handle_key(key(KeyCode::Enter));
        app.tick(Duration::ZERO);
        assert_eq!(app.mission().tracker().get(PuzzleId::IpAddressing).attempts, 0);

        app.handle_key(key(KeyCode::Tab));
        type_str(&mut app, "10.0.0.1");
        app.handle_key(key(KeyCode::Enter));
        app.tick(Duration::ZERO);
        assert_eq!(app.mission().tracker().get(PuzzleId::IpAddressing).attempts, 1);
        assert_eq!(app.puzzle_form().text(0), "");
        assert_eq!(app.puzzle_form().text(1), "");

        type_str(&mut app, PC4_ADDRESS);
        app.handle_key(key(KeyCode::Up));
        type_str(&mut app, PC3_ADDRESS);
        app.handle_key(key(KeyCode::Enter));
        app.tick(Duration::ZERO);
        assert_eq!(app.mission().state(), MissionState::InProgress(PuzzleId::Ping));
        assert!(app.puzzle_form().text(0).starts_with("C:\\agent\\zoe>"));
    }

    #[test]
    fn wrong_ping_locks_field_and_restores_prompt() {
        let mut app = started();
        solve_cabling(&mut app);
        app.handle_key(key(KeyCode::Right));
        app.handle_key(key(KeyCode::Right));
        app.handle_key(key(KeyCode::Tab));
        type_str(&mut app, WIFI_PASSWORD);
        app.handle_key(key(KeyCode::Enter));
        app.tick(Duration::ZERO);
        type_str(&mut app, PC3_ADDRESS);
        app.handle_key(key(KeyCode::Tab));
        type_str(&mut app, PC4_ADDRESS);
        app.handle_key(key(KeyCode::Enter));
        app.tick(Duration::ZERO);

        let prompt = app.puzzle_form().text(0).to_string();
        type_str(&mut app, "ping 10.0.0.1");
        app.handle_key(key(KeyCode::Enter));
        app.tick(Duration::ZERO);
        assert!(app.puzzle_form().fields[0].disabled);
        assert!(app.mission().is_locked(PuzzleId::Ping));

        app.tick(Duration::from_secs(10));
        assert!(!app.puzzle_form().fields[0].disabled);
        assert_eq!(app.puzzle_form().text(0), prompt);
    }

    #[test]
    fn f1_toggles_pause_and_blocks_typing() {
        let mut app = started();
        app.handle_key(key(KeyCode::F(1)));
        assert!(app.mission().is_paused());
        app.handle_key(key(KeyCode::Char(' ')));
        assert!(!app.puzzle_form().toggled(0));
        app.handle_key(key(KeyCode::F(1)));
        assert!(!app.mission().is_paused());
    }

    #[test]
    fn timer_alerts_show_on_screen() {
        let mut app = started();
        app.tick(Duration::from_secs(300));
        let (text, tone) = app.message().expect("five minute alert");
        assert!(text.contains("5 minutes"));
        assert_eq!(tone, Tone::Info);

        app.tick(Duration::from_secs(270));
        let (text, tone) = app.message().expect("thirty second alert");
        assert!(text.starts_with("FINAL ALERT"));
        assert_eq!(tone, Tone::Bad);
    }

    #[test]
    fn expiry_shows_debrief_and_r_restarts() {
        let mut app = started();
        app.tick(Duration::from_secs(600));
        assert_eq!(app.screen(), Screen::Debrief);
        assert_eq!(app.mission().state(), MissionState::Failed);

        app.handle_key(key(KeyCode::Char('r')));
        app.tick(Duration::ZERO);
        assert_eq!(app.screen(), Screen::Mission);
        assert_eq!(app.puzzle_form().fields[0].label, "Cable");
    }

    #[test]
    fn p_saves_report_after_failure() {
        let dir = tempfile::tempdir().unwrap();
        let mission = Mission::with_virtual_clock(Session::default(), MissionSettings::default());
        let mut app = App::new(mission, Duration::from_secs(10), dir.path().to_path_buf());
        app.handle_key(key(KeyCode::Enter));
        app.handle_key(key(KeyCode::Enter));
        app.tick(Duration::from_secs(600));
        app.handle_key(key(KeyCode::Char('p')));
        let path = app.last_report().expect("report saved");
        assert!(path.exists());
    }

    #[test]
    fn esc_quits_from_any_screen() {
        let mut app = app();
        app.handle_key(key(KeyCode::Esc));
        assert!(app.should_quit());
    }
}
