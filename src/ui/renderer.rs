/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// Each frame is composed into `front`, compared cell by cell with `back`
/// (the previous frame), and only changed cells are emitted. Commands are
/// batched with `queue!` and flushed once, then the buffers are swapped.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use netescape::domain::puzzle::{PuzzleId, CABLE_PASSWORD, WIFI_PASSWORD};
use netescape::domain::scoring::MISSION_SECONDS;
use netescape::report::format_clock;
use netescape::{CompetencyLevel, MissionState};

use super::app::{App, Screen, Tone};
use super::form::Form;

// ── Palette ──

const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };
const TITLE: Color = Color::Rgb { r: 80, g: 255, b: 80 };
const TEXT: Color = Color::Rgb { r: 200, g: 200, b: 200 };
const DIM: Color = Color::Rgb { r: 110, g: 110, b: 130 };
const KEY: Color = Color::Rgb { r: 100, g: 200, b: 255 };
const WARN: Color = Color::Rgb { r: 255, g: 220, b: 50 };
const DANGER: Color = Color::Rgb { r: 255, g: 60, b: 60 };
const FOCUS_BG: Color = Color::Rgb { r: 45, g: 45, b: 70 };

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: BASE_BG };

    /// Sentinel that differs from any real cell, forcing a full repaint.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Write a string at (x, y), one column per char, clipped at the edge.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width {
                break;
            }
            self.set(x + i, y, Cell { ch, fg, bg });
        }
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell { ch: ' ', fg: Color::White, bg });
        }
    }
}

// ── Layout ──

const HUD_ROW: usize = 0;
const BODY_ROW: usize = 3;
const LEFT: usize = 2;
const LABEL_W: usize = 14;

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_screen: Option<Screen>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_screen: None,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        self.back.cells.fill(Cell::INVALID);
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(self.writer, ResetColor, cursor::Show, terminal::LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, app: &App) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.invalidate()?;
        }

        if self.last_screen != Some(app.screen()) {
            self.invalidate()?;
            self.last_screen = Some(app.screen());
        }

        self.front.clear();
        match app.screen() {
            Screen::Setup => self.compose_setup(app),
            Screen::Briefing => self.compose_briefing(app),
            Screen::Mission => self.compose_mission(app),
            Screen::Debrief => self.compose_debrief(app),
        }
        self.compose_message(app);

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    fn invalidate(&mut self) -> io::Result<()> {
        self.back.cells.fill(Cell::INVALID);
        queue!(self.writer, SetBackgroundColor(BASE_BG), Clear(ClearType::All))
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = BASE_BG;
        let mut cursor_at: Option<(usize, usize)> = None;

        queue!(self.writer, SetForegroundColor(last_fg), SetBackgroundColor(last_bg))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    continue;
                }
                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                cursor_at = Some((x + 1, y));
            }
        }

        self.writer.flush()
    }

    // ── Compose ──

    fn compose_setup(&mut self, app: &App) {
        self.front.put_str(LEFT, 1, "NET ESCAPE :: mission setup", TITLE, BASE_BG);
        self.front.put_str(LEFT, 2, "Name the teacher and up to four agents.", DIM, BASE_BG);
        self.compose_form(app.setup_form(), BODY_ROW + 1);
        self.footer("Tab/Up/Down: move   Enter: continue   Esc: quit");
    }

    fn compose_briefing(&mut self, app: &App) {
        let p = app.mission().session().participants();
        let agents = if p.agents().is_empty() { "(none)".to_string() } else { p.agents().join(", ") };
        let lines = [
            "An intruder has cut the school network.".to_string(),
            format!("You have {} minutes to bring it back up, in five steps:", MISSION_SECONDS / 60),
            String::new(),
        ];
        self.front.put_str(LEFT, 1, "NET ESCAPE :: briefing", TITLE, BASE_BG);
        for (i, line) in lines.iter().enumerate() {
            self.front.put_str(LEFT, BODY_ROW + i, line, TEXT, BASE_BG);
        }
        let mut y = BODY_ROW + lines.len();
        for puzzle in PuzzleId::ALL {
            let row = format!("  {}. {}", puzzle.number(), puzzle.title());
            self.front.put_str(LEFT, y, &row, TEXT, BASE_BG);
            y += 1;
        }
        y += 1;
        self.front.put_str(LEFT, y, &format!("Teacher: {}", p.teacher()), DIM, BASE_BG);
        self.front.put_str(LEFT, y + 1, &format!("Agents:  {agents}"), DIM, BASE_BG);
        self.footer("Enter: start the countdown   Esc: quit");
    }

    fn compose_mission(&mut self, app: &App) {
        let mission = app.mission();
        self.compose_hud(app);

        let Some(puzzle) = mission.state().current_puzzle() else {
            return;
        };
        let title = format!("{} :: {}", puzzle.to_string().to_uppercase(), puzzle.title());
        self.front.put_str(LEFT, BODY_ROW, &title, TITLE, BASE_BG);
        self.front.put_str(LEFT, BODY_ROW + 1, prompt_for(puzzle), DIM, BASE_BG);
        self.compose_form(app.puzzle_form(), BODY_ROW + 3);

        let status_row = BODY_ROW + 4 + app.puzzle_form().fields.len();
        if let Some(clue) = clue_for(app, puzzle) {
            self.front.put_str(LEFT, status_row + 1, &clue, KEY, BASE_BG);
        }
        if let Some(left) = mission.lockout_remaining(puzzle) {
            let s = format!("LOCKED  retry in {} s", left.as_secs_f32().ceil() as u64);
            self.front.put_str(LEFT, status_row, &s, DANGER, BASE_BG);
        } else if app.network_locked() {
            self.front.put_str(LEFT, status_row, "Network selector reset pending...", WARN, BASE_BG);
        }

        if mission.is_paused() {
            self.compose_pause_overlay();
        }

        let help = match puzzle {
            PuzzleId::Cabling => "Space: plug/unplug   Tab: next field   Enter: validate   F1: pause",
            PuzzleId::Wifi => "Left/Right: browse   Space: connect   Enter: validate   F1: pause",
            PuzzleId::Troubleshooting => "Up/Down: slot   Left/Right: choose step   Enter: validate   F1: pause",
            _ => "Type the answer   Enter: validate   F1: pause   Esc: quit",
        };
        self.footer(help);
    }

    fn compose_hud(&mut self, app: &App) {
        let mission = app.mission();
        let remaining = mission.remaining_secs();
        let clock_fg = match remaining {
            0..=30 => DANGER,
            31..=300 => WARN,
            _ => TITLE,
        };
        self.front.fill_row(HUD_ROW, FOCUS_BG);
        self.front.put_str(LEFT, HUD_ROW, &format!("TIME {}", format_clock(remaining)), clock_fg, FOCUS_BG);

        if let MissionState::InProgress(p) = mission.state() {
            let step = format!("PUZZLE {}/{}", p.number(), PuzzleId::ALL.len());
            self.front.put_str(LEFT + 14, HUD_ROW, &step, TEXT, FOCUS_BG);
        }

        let agents = mission.session().participants().agents().join(" · ");
        self.front.put_str(LEFT + 30, HUD_ROW, &agents, KEY, FOCUS_BG);
    }

    fn compose_form(&mut self, form: &Form, top: usize) {
        for (i, field) in form.fields.iter().enumerate() {
            let y = top + i;
            let focused = i == form.focus;
            let marker = if focused { "▸" } else { " " };
            let (fg, bg) = match (focused, field.disabled) {
                (_, true) => (DIM, BASE_BG),
                (true, false) => (Color::White, FOCUS_BG),
                (false, false) => (TEXT, BASE_BG),
            };
            self.front.put_str(LEFT, y, marker, KEY, BASE_BG);
            self.front.put_str(LEFT + 2, y, &format!("{:<w$}", field.label, w = LABEL_W), DIM, BASE_BG);
            let value = field.display();
            let cursor = if focused && !field.disabled { "_" } else { "" };
            self.front.put_str(LEFT + 2 + LABEL_W, y, &format!("{value}{cursor}"), fg, bg);
        }
    }

    fn compose_debrief(&mut self, app: &App) {
        let mission = app.mission();
        let Some(record) = mission.record() else {
            return;
        };

        if record.won {
            self.front.put_str(LEFT, 1, "MISSION ACCOMPLISHED: the network is back up", TITLE, BASE_BG);
        } else {
            self.front.put_str(LEFT, 1, "MISSION FAILED: the network stays down", DANGER, BASE_BG);
        }

        let summary = format!(
            "Score {}/{}   Time left {}   Errors {}",
            record.score,
            record.max_score,
            format_clock(record.time_remaining_secs),
            record.error_count,
        );
        self.front.put_str(LEFT, BODY_ROW, &summary, TEXT, BASE_BG);

        let mut y = BODY_ROW + 2;
        if let Ok(report) = mission.report() {
            let header = format!("{:<4}{:<52}{:<10}{}", "#", "Skill", "Attempts", "Level");
            self.front.put_str(LEFT, y, &header, DIM, BASE_BG);
            y += 1;
            for row in &report.puzzles {
                let fg = match row.competency {
                    CompetencyLevel::VeryGoodMastery => TITLE,
                    CompetencyLevel::Satisfactory => TEXT,
                    CompetencyLevel::Fragile => WARN,
                    CompetencyLevel::NotAchieved => DANGER,
                };
                let line = format!(
                    "{:<4}{:<52}{:<10}{}",
                    row.puzzle.number(),
                    truncate(row.skill, 50),
                    row.attempts_label(),
                    row.competency.label(),
                );
                self.front.put_str(LEFT, y, &line, fg, BASE_BG);
                y += 1;
            }
        }

        y += 1;
        if let Some(left) = mission.restart_remaining() {
            let s = format!("New mission starts automatically in {} s", left.as_secs_f32().ceil() as u64);
            self.front.put_str(LEFT, y, &s, WARN, BASE_BG);
            y += 1;
        }
        if let Some(path) = app.last_report() {
            self.front.put_str(LEFT, y, &format!("Report: {}", path.display()), DIM, BASE_BG);
        }

        self.footer("R: restart now   P: save report   Esc: quit");
    }

    fn compose_pause_overlay(&mut self) {
        let box_w = 30;
        let box_x = (self.front.width.saturating_sub(box_w)) / 2;
        let box_y = BODY_ROW + 2;
        for y in box_y..box_y + 3 {
            for x in box_x..box_x + box_w {
                self.front.set(x, y, Cell { ch: ' ', fg: Color::White, bg: FOCUS_BG });
            }
        }
        self.front.put_str(box_x + 10, box_y + 1, "PAUSED", WARN, FOCUS_BG);
        self.front.put_str(box_x + 2, box_y + 2, "F1 to resume", KEY, FOCUS_BG);
    }

    fn compose_message(&mut self, app: &App) {
        let Some((text, tone)) = app.message() else {
            return;
        };
        let fg = match tone {
            Tone::Info => KEY,
            Tone::Good => TITLE,
            Tone::Bad => DANGER,
        };
        let row = self.front.height.saturating_sub(3);
        self.front.put_str(LEFT, row, text, fg, BASE_BG);
    }

    fn footer(&mut self, help: &str) {
        let row = self.front.height.saturating_sub(1);
        self.front.put_str(LEFT, row, help, DIM, BASE_BG);
    }
}

fn prompt_for(puzzle: PuzzleId) -> &'static str {
    match puzzle {
        PuzzleId::Cabling => "Plug the PC into the switch, then type the password shown on the screen.",
        PuzzleId::Wifi => "Join the agents' Wi-Fi network and enter its key.",
        PuzzleId::IpAddressing => "PC1 is 192.168.1.10 and PC2 192.168.1.11 (/24). Configure PC3 and PC4.",
        PuzzleId::Ping => "From your terminal, check that PC3 answers.",
        PuzzleId::Troubleshooting => "Put the troubleshooting steps in the right order.",
    }
}

/// What the players would read on the props once they did the right thing.
fn clue_for(app: &App, puzzle: PuzzleId) -> Option<String> {
    let form = app.puzzle_form();
    match puzzle {
        PuzzleId::Cabling if form.toggled(0) => {
            Some(format!("PC screen: link up. Password: {CABLE_PASSWORD}"))
        }
        PuzzleId::Wifi if form.fields.first().is_some_and(|f| f.disabled) && !app.network_locked() => {
            Some(format!("Router label: Wi-Fi key {WIFI_PASSWORD}"))
        }
        _ => None,
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}
