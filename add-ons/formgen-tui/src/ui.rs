use crate::app::{App, Pane};
use crate::form_widget::FormFrame;
use formgen_core::{Category, Phase};
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Wrap};
use ratatui::Frame;

fn pane_block(title: &str, focused: bool) -> Block<'_> {
    let style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Block::bordered().title(title).border_style(style)
}

pub fn draw(frame: &mut Frame, app: &App, form: &FormFrame) {
    let [title, request, body, notices, help] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(Category::ALL.len() as u16 + 4),
        Constraint::Min(6),
        Constraint::Length(2),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            app.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )))
        .centered(),
        title,
    );
    draw_request(frame, app, request);

    let [form_area, activity_area] =
        Layout::horizontal([Constraint::Percentage(65), Constraint::Percentage(35)]).areas(body);
    draw_form(frame, app, form, form_area);
    draw_activity(frame, app, activity_area);
    draw_notices(frame, app, notices);

    let hint = match app.pane {
        Pane::Request => "↑/↓ or 1-3 choose · Enter submit · Tab form · Esc dismiss · q quit",
        Pane::Form => "↑/↓ move · type + Enter commit · Space/←/→ toggle · Esc back · Ctrl-C quit",
    };
    frame.render_widget(
        Paragraph::new(hint).style(Style::default().fg(Color::DarkGray)),
        help,
    );
}

fn draw_request(frame: &mut Frame, app: &App, area: Rect) {
    let selected = app.selected_category();
    let mut lines: Vec<Line> = Category::ALL
        .iter()
        .enumerate()
        .map(|(i, category)| {
            let dot = if selected == Some(*category) { "(•)" } else { "( )" };
            let style = if app.pane == Pane::Request && i == app.cursor {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Line::from(Span::styled(format!(" {} {}", dot, category), style))
        })
        .collect();
    let status = match app.controller.phase() {
        Phase::Submitting => Span::styled(" Generating…", Style::default().fg(Color::Yellow)),
        _ => Span::styled(" [Enter] Submit Option", Style::default().fg(Color::Magenta)),
    };
    lines.push(Line::from(status));
    frame.render_widget(
        Paragraph::new(lines).block(pane_block(" Generate Your Form ", app.pane == Pane::Request)),
        area,
    );
}

fn draw_form(frame: &mut Frame, app: &App, form: &FormFrame, area: Rect) {
    let focused = app.pane == Pane::Form;
    let block = pane_block(" Generated Form ", focused);
    if app.controller.bundle().is_none() {
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                "Choose a category and submit to generate a form.",
                Style::default().fg(Color::DarkGray),
            )))
            .block(block),
            area,
        );
        return;
    }
    let visible = area.height.saturating_sub(2) as usize;
    let scroll = match form.focus_line {
        Some(line) if visible > 0 && line >= visible => line + 1 - visible,
        _ => 0,
    };
    frame.render_widget(
        Paragraph::new(form.lines.clone())
            .block(block)
            .scroll((scroll as u16, 0)),
        area,
    );
}

fn draw_activity(frame: &mut Frame, app: &App, area: Rect) {
    let visible = area.height.saturating_sub(2) as usize;
    let skip = app.activity.len().saturating_sub(visible);
    let lines: Vec<Line> = app
        .activity
        .iter()
        .skip(skip)
        .map(|l| Line::from(l.as_str()))
        .collect();
    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(pane_block(" Activity ", false)),
        area,
    );
}

fn draw_notices(frame: &mut Frame, app: &App, area: Rect) {
    let notices = app.controller.notices();
    let mut lines = Vec::new();
    if let Some(error) = notices.error() {
        lines.push(Line::from(Span::styled(
            format!(" ✖ {}  (Ctrl-E dismiss)", error.message),
            Style::default().fg(Color::White).bg(Color::Red),
        )));
    }
    if let Some(success) = notices.success() {
        lines.push(Line::from(Span::styled(
            format!(" ✔ {}  (Ctrl-O dismiss)", success.message),
            Style::default().fg(Color::Black).bg(Color::Green),
        )));
    }
    frame.render_widget(Paragraph::new(lines), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use formgen_core::{FormController, FormError, FormService, SchemaBundle};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::mpsc;

    struct Offline;

    #[async_trait::async_trait]
    impl FormService for Offline {
        async fn generate_form(&self, _description: &str) -> Result<SchemaBundle, FormError> {
            Err(FormError::Transport("Network Error".into()))
        }

        async fn ping(&self) -> Result<(), FormError> {
            Err(FormError::Transport("Network Error".into()))
        }
    }

    #[tokio::test]
    async fn draws_categories_and_notices() {
        let (tx, _rx) = mpsc::channel(1);
        let mut controller = FormController::new(Arc::new(Offline), Duration::from_secs(6));
        controller.probe_connectivity().await;
        let app = App::new("Form Generator", controller, tx);

        let mut terminal = Terminal::new(TestBackend::new(100, 24)).unwrap();
        terminal
            .draw(|f| draw(f, &app, &FormFrame::default()))
            .unwrap();
        let screen: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(screen.contains("School"));
        assert!(screen.contains("Freelance"));
        assert!(screen.contains("Error connecting to server: Network Error"));
        assert!(screen.contains("Choose a category"));
    }
}
