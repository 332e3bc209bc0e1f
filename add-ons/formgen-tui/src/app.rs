//! Terminal client state: the form controller plus what only the terminal needs
//! (pane focus, the category cursor, the activity tail).

use crate::form_widget::{FormKey, TerminalForm};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use formgen_core::{Category, Completion, FormController, NoticeKind, Phase};
use std::collections::VecDeque;
use tokio::sync::mpsc;

const ACTIVITY_LINES: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    Request,
    Form,
}

pub struct App {
    pub title: String,
    pub controller: FormController,
    pub form: TerminalForm,
    pub pane: Pane,
    pub cursor: usize,
    pub activity: VecDeque<String>,
    pub should_quit: bool,
    completions: mpsc::Sender<Completion>,
    last_phase: Phase,
}

impl App {
    pub fn new(title: impl Into<String>, controller: FormController, completions: mpsc::Sender<Completion>) -> Self {
        Self {
            title: title.into(),
            controller,
            form: TerminalForm::default(),
            pane: Pane::Request,
            cursor: 0,
            activity: VecDeque::with_capacity(ACTIVITY_LINES),
            should_quit: false,
            completions,
            last_phase: Phase::Idle,
        }
    }

    /// Fires the one-time connectivity probe.
    pub fn start(&mut self) {
        self.controller.spawn_probe(self.completions.clone());
    }

    /// The category whose label is the current description, if any.
    pub fn selected_category(&self) -> Option<Category> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == self.controller.description())
    }

    pub fn push_activity(&mut self, line: String) {
        if self.activity.len() == ACTIVITY_LINES {
            self.activity.pop_front();
        }
        self.activity.push_back(line);
    }

    /// Applies a settled network operation. A newly generated form moves focus to it.
    pub fn on_completion(&mut self, completion: Completion) {
        self.controller.apply(completion);
        let phase = self.controller.phase();
        if phase == Phase::Ready && self.last_phase == Phase::Submitting {
            self.form.reset();
            self.pane = Pane::Form;
        }
        self.last_phase = phase;
    }

    fn select(&mut self, index: usize) {
        self.cursor = index.min(Category::ALL.len() - 1);
        self.controller.select_description(Category::ALL[self.cursor]);
    }

    fn submit(&mut self) {
        if self.controller.spawn_submit(self.completions.clone()) {
            self.last_phase = Phase::Submitting;
        }
    }

    /// Applies one terminal event. `None` means the input reader is gone, so the client quits.
    pub fn handle_event(&mut self, event: Option<Event>) {
        match event {
            Some(Event::Key(key)) => self.handle_key(key),
            Some(_) => {}
            None => {
                tracing::warn!(target: "formgen::tui", "Terminal input closed; quitting");
                self.should_quit = true;
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') => self.should_quit = true,
                KeyCode::Char('e') => {
                    self.controller.dismiss(NoticeKind::Error);
                }
                KeyCode::Char('o') => {
                    self.controller.dismiss(NoticeKind::Success);
                }
                _ => {}
            }
            return;
        }
        if key.code == KeyCode::Tab || key.code == KeyCode::BackTab {
            self.pane = match self.pane {
                Pane::Request if self.controller.bundle().is_some() => Pane::Form,
                _ => Pane::Request,
            };
            return;
        }

        match self.pane {
            Pane::Request => self.handle_request_key(key.code),
            Pane::Form => {
                if key.code == KeyCode::Esc && !self.form.is_editing() {
                    self.pane = Pane::Request;
                    return;
                }
                if let Some(form_key) = form_key(key.code) {
                    self.form.push_key(form_key);
                }
            }
        }
    }

    fn handle_request_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Up | KeyCode::Char('k') => self.select(self.cursor.saturating_sub(1)),
            KeyCode::Down | KeyCode::Char('j') => self.select(self.cursor + 1),
            KeyCode::Char(c @ '1'..='9') => self.select(c as usize - '1' as usize),
            KeyCode::Char(' ') => self.select(self.cursor),
            KeyCode::Enter => self.submit(),
            KeyCode::Esc => {
                self.controller.dismiss(NoticeKind::Error);
                self.controller.dismiss(NoticeKind::Success);
            }
            _ => {}
        }
    }
}

fn form_key(code: KeyCode) -> Option<FormKey> {
    Some(match code {
        KeyCode::Up => FormKey::Up,
        KeyCode::Down => FormKey::Down,
        KeyCode::Left => FormKey::Left,
        KeyCode::Right => FormKey::Right,
        KeyCode::Enter => FormKey::Enter,
        KeyCode::Backspace => FormKey::Backspace,
        KeyCode::Esc => FormKey::Esc,
        KeyCode::Char(c) => FormKey::Char(c),
        _ => return None,
    })
}
