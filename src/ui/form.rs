//! Focusable form widgets used by the setup and puzzle screens.
//!
//! Keys: Tab / Down and Shift-Tab / Up move focus, printable characters
//! edit text, Space toggles, Left / Right cycle choices and Space picks the
//! shown choice, Enter submits.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::input::TextField;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Widget {
    Text(TextField),
    Toggle { on: bool, on_text: &'static str, off_text: &'static str },
    Choice { options: Vec<String>, selected: Option<usize> },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
    pub label: String,
    pub widget: Widget,
    pub disabled: bool,
}

impl Field {
    pub fn text(label: impl Into<String>, max_chars: usize) -> Self {
        Field::new(label, Widget::Text(TextField::new(max_chars)))
    }

    pub fn toggle(label: impl Into<String>, on_text: &'static str, off_text: &'static str) -> Self {
        Field::new(label, Widget::Toggle { on: false, on_text, off_text })
    }

    pub fn choice(label: impl Into<String>, options: Vec<String>) -> Self {
        Field::new(label, Widget::Choice { options, selected: None })
    }

    fn new(label: impl Into<String>, widget: Widget) -> Self {
        Field { label: label.into(), widget, disabled: false }
    }

    /// Text shown after the label.
    pub fn display(&self) -> String {
        match &self.widget {
            Widget::Text(t) => t.value().to_string(),
            Widget::Toggle { on, on_text, off_text } => {
                if *on { on_text.to_string() } else { off_text.to_string() }
            }
            Widget::Choice { options, selected } => selected
                .and_then(|i| options.get(i))
                .map_or_else(|| "-- choose --".to_string(), |o| format!("< {o} >")),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FormAction {
    None,
    /// The value of the field at this index changed.
    Changed(usize),
    /// Space on a choice field with an option shown.
    Picked(usize),
    Submit,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Form {
    pub fields: Vec<Field>,
    pub focus: usize,
}

impl Form {
    pub fn new(fields: Vec<Field>) -> Self {
        Form { fields, focus: 0 }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> FormAction {
        match key.code {
            KeyCode::Enter => return FormAction::Submit,
            KeyCode::Tab | KeyCode::Down => {
                self.focus_next();
                return FormAction::None;
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focus_prev();
                return FormAction::None;
            }
            _ => {}
        }

        let idx = self.focus;
        let Some(field) = self.fields.get_mut(idx) else {
            return FormAction::None;
        };
        if field.disabled {
            return FormAction::None;
        }

        let changed = match (&mut field.widget, key.code) {
            (Widget::Text(t), KeyCode::Char(c)) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                t.insert(c);
                true
            }
            (Widget::Text(t), KeyCode::Backspace) => {
                t.backspace();
                true
            }
            (Widget::Toggle { on, .. }, KeyCode::Char(' ') | KeyCode::Left | KeyCode::Right) => {
                *on = !*on;
                true
            }
            (Widget::Choice { selected: Some(_), .. }, KeyCode::Char(' ')) => {
                return FormAction::Picked(idx);
            }
            (Widget::Choice { options, selected }, KeyCode::Right) => cycle(selected, options.len(), true),
            (Widget::Choice { options, selected }, KeyCode::Left) => cycle(selected, options.len(), false),
            _ => false,
        };

        if changed { FormAction::Changed(idx) } else { FormAction::None }
    }

    pub fn focus_next(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + 1) % self.fields.len();
        }
    }

    pub fn focus_prev(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
        }
    }

    pub fn text(&self, idx: usize) -> &str {
        match self.fields.get(idx).map(|f| &f.widget) {
            Some(Widget::Text(t)) => t.value(),
            _ => "",
        }
    }

    pub fn set_text(&mut self, idx: usize, value: &str) {
        if let Some(Field { widget: Widget::Text(t), .. }) = self.fields.get_mut(idx) {
            t.set(value);
        }
    }

    pub fn toggled(&self, idx: usize) -> bool {
        matches!(self.fields.get(idx).map(|f| &f.widget), Some(Widget::Toggle { on: true, .. }))
    }

    pub fn selected(&self, idx: usize) -> Option<usize> {
        match self.fields.get(idx).map(|f| &f.widget) {
            Some(Widget::Choice { selected, .. }) => *selected,
            _ => None,
        }
    }

    pub fn clear_selection(&mut self, idx: usize) {
        if let Some(Field { widget: Widget::Choice { selected, .. }, .. }) = self.fields.get_mut(idx) {
            *selected = None;
        }
    }

    pub fn set_disabled(&mut self, idx: usize, disabled: bool) {
        if let Some(field) = self.fields.get_mut(idx) {
            field.disabled = disabled;
        }
    }
}

/// Step a choice forward or back, wrapping; an empty selection starts at
/// the first (or last) option.
fn cycle(selected: &mut Option<usize>, len: usize, forward: bool) -> bool {
    if len == 0 {
        return false;
    }
    *selected = Some(match (*selected, forward) {
        (None, true) => 0,
        (None, false) => len - 1,
        (Some(i), true) => (i + 1) % len,
        (Some(i), false) => (i + len - 1) % len,
    });
    true
}
