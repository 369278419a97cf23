//! Keyboard input: drains pending terminal events once per frame and keeps
//! the key presses for the app to consume. Release events are dropped;
//! Repeat counts as a press so held Backspace keeps deleting.

use std::time::Duration;

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

pub struct InputState {
    pressed: Vec<KeyEvent>,
}

impl InputState {
    pub fn new() -> Self {
        InputState { pressed: Vec::with_capacity(8) }
    }

    /// Read all available events without blocking.
    pub fn drain_events(&mut self) {
        self.pressed.clear();

        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                if key.kind != KeyEventKind::Release {
                    self.pressed.push(key);
                }
            }
        }
    }

    pub fn pressed(&self) -> &[KeyEvent] {
        &self.pressed
    }

    pub fn ctrl_c_pressed(&self) -> bool {
        self.pressed.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }
}

/// Single-line text buffer edited in place.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TextField {
    value: String,
    max_chars: usize,
}

impl TextField {
    pub fn new(max_chars: usize) -> Self {
        TextField { value: String::new(), max_chars }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn insert(&mut self, c: char) {
        if !c.is_control() && self.value.chars().count() < self.max_chars {
            self.value.push(c);
        }
    }

    pub fn backspace(&mut self) {
        self.value.pop();
    }

    pub fn set(&mut self, value: &str) {
        self.value = value.chars().take(self.max_chars).collect();
    }
}
