//! Terminal implementation of [`FormRenderer`].
//!
//! Keeps only focus and the edit buffer of the focused control. Key presses are
//! queued with [`TerminalForm::push_key`] and applied during the next render
//! pass; each applied edit is reported as a whole replacement data object.

use formgen_core::{ControlKind, ControlView, FormData, FormRenderer, FormView, ViewNode};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use serde_json::Value;
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKey {
    Up,
    Down,
    Left,
    Right,
    Enter,
    Backspace,
    Esc,
    Char(char),
}

#[derive(Debug, Default)]
pub struct TerminalForm {
    focus: usize,
    buffer: Option<String>,
    pending: VecDeque<FormKey>,
    input_error: Option<String>,
}

/// Output of one render pass.
#[derive(Debug, Default)]
pub struct FormFrame {
    pub lines: Vec<Line<'static>>,
    /// Line index of the focused control, for scrolling.
    pub focus_line: Option<usize>,
    /// An edit was emitted; the view the lines were built from is already stale.
    pub changed: bool,
}

impl TerminalForm {
    pub fn push_key(&mut self, key: FormKey) {
        self.pending.push_back(key);
    }

    pub fn is_editing(&self) -> bool {
        self.buffer.is_some()
    }

    /// Forgets focus and any half-typed input, e.g. when a new form arrives.
    pub fn reset(&mut self) {
        self.focus = 0;
        self.buffer = None;
        self.pending.clear();
        self.input_error = None;
    }

    fn commit(&mut self, control: &ControlView, data: &FormData) -> Option<FormData> {
        let input = self.buffer.take()?;
        match control.edit(data, &input) {
            Ok(next) => {
                self.input_error = None;
                (&next != data).then_some(next)
            }
            Err(message) => {
                self.input_error = Some(message);
                self.buffer = Some(input);
                None
            }
        }
    }

    /// Applies one key. Returns replacement data when the key changed the form.
    fn apply_key(&mut self, key: FormKey, controls: &[&ControlView], data: &FormData) -> Option<FormData> {
        let count = controls.len();
        let control = controls.get(self.focus)?;
        match key {
            FormKey::Up | FormKey::Down => {
                let committed = self.commit(control, data);
                // Rejected input stays on its control until fixed or abandoned with Esc.
                if self.buffer.is_some() {
                    return None;
                }
                self.focus = match key {
                    FormKey::Up => self.focus.saturating_sub(1),
                    _ => (self.focus + 1).min(count.saturating_sub(1)),
                };
                committed
            }
            FormKey::Esc => {
                self.buffer = None;
                self.input_error = None;
                None
            }
            FormKey::Enter => match &control.kind {
                kind if kind.is_textual() => {
                    if self.buffer.is_none() {
                        self.buffer = Some(control.display_value());
                        return None;
                    }
                    self.commit(control, data)
                }
                ControlKind::Checkbox => control.toggle(data),
                ControlKind::Select { .. } => control.cycle(data, 1),
                _ => control.activate(data),
            },
            FormKey::Left | FormKey::Right => {
                let step = if key == FormKey::Left { -1 } else { 1 };
                match control.kind {
                    ControlKind::Checkbox => control.toggle(data),
                    ControlKind::Select { .. } => control.cycle(data, step),
                    _ => None,
                }
            }
            FormKey::Backspace => {
                if control.kind.is_textual() {
                    let buffer = self.buffer.get_or_insert_with(|| control.display_value());
                    buffer.pop();
                }
                None
            }
            FormKey::Char(c) => match control.kind {
                ref kind if kind.is_textual() => {
                    self.buffer
                        .get_or_insert_with(|| control.display_value())
                        .push(c);
                    None
                }
                ControlKind::Checkbox if c == ' ' => control.toggle(data),
                ControlKind::Select { .. } if c == ' ' => control.cycle(data, 1),
                _ => None,
            },
        }
    }

    fn control_line(&self, control: &ControlView, focused: bool) -> Line<'static> {
        let indent = "  ".repeat(control.depth);
        let marker = if focused { "> " } else { "  " };
        let mut label = control.label.clone();
        if control.required {
            label.push('*');
        }
        let value = match &control.kind {
            ControlKind::Checkbox => {
                let on = control.value.as_ref().and_then(Value::as_bool).unwrap_or(false);
                if on { "[x]".to_string() } else { "[ ]".to_string() }
            }
            ControlKind::Select { .. } => format!("< {} >", control.display_value()),
            ControlKind::AppendItem { .. } | ControlKind::RemoveItem => String::new(),
            _ => match (&self.buffer, focused) {
                (Some(buffer), true) => format!("{}_", buffer),
                _ => control.display_value(),
            },
        };

        let label_style = if focused {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let text = match control.kind {
            ControlKind::AppendItem { .. } | ControlKind::RemoveItem => format!("[{}]", control.label),
            _ if label.is_empty() => value,
            _ => format!("{}: {}", label, value),
        };
        Line::from(vec![
            Span::raw(format!("{}{}", indent, marker)),
            Span::styled(text, label_style),
        ])
    }
}

impl FormRenderer for TerminalForm {
    type Ui = FormFrame;

    fn render(&mut self, view: &FormView<'_>, on_change: &mut dyn FnMut(FormData)) -> FormFrame {
        let controls: Vec<&ControlView> = view.controls().collect();
        if controls.is_empty() {
            self.focus = 0;
            self.buffer = None;
        } else if self.focus >= controls.len() {
            self.focus = controls.len() - 1;
            self.buffer = None;
        }

        let mut changed = false;
        // Stop at the first edit: later keys must see the updated view.
        while let Some(key) = self.pending.pop_front() {
            if let Some(next) = self.apply_key(key, &controls, view.data) {
                on_change(next);
                changed = true;
                break;
            }
        }

        let mut lines = Vec::new();
        let mut focus_line = None;
        let mut ordinal = 0;
        for node in &view.nodes {
            match node {
                ViewNode::Heading { label, depth } => lines.push(Line::from(Span::styled(
                    format!("{}{}", "  ".repeat(*depth), label),
                    Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
                ))),
                ViewNode::Text { text, depth } => {
                    lines.push(Line::from(format!("{}{}", "  ".repeat(*depth), text)))
                }
                ViewNode::Flag { message, depth } => lines.push(Line::from(Span::styled(
                    format!("{}! {}", "  ".repeat(*depth), message),
                    Style::default().fg(Color::Yellow),
                ))),
                ViewNode::Control(control) => {
                    let focused = ordinal == self.focus;
                    if focused {
                        focus_line = Some(lines.len());
                    }
                    lines.push(self.control_line(control, focused));
                    let indent = "  ".repeat(control.depth + 2);
                    let mut messages: Vec<String> = control.errors.clone();
                    if focused {
                        messages.extend(self.input_error.clone());
                    }
                    for message in messages {
                        lines.push(Line::from(Span::styled(
                            format!("{}{}", indent, message),
                            Style::default().fg(Color::Red),
                        )));
                    }
                    ordinal += 1;
                }
            }
        }

        FormFrame {
            lines,
            focus_line,
            changed,
        }
    }
}
