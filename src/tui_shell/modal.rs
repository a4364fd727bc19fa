use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::oneshot;

use crate::dispatch::ConfigEditor;

use super::editor::TextArea;
use super::input::Input;

#[derive(Debug)]
pub(super) struct Modal {
    pub(super) title: String,
    pub(super) lines: Vec<String>,
    pub(super) scroll: usize,
    pub(super) input: Input,
    pub(super) kind: ModalKind,
}

/// Dialog flavours. The reply channels are answered at most once; a modal
/// dropped with its sender still in place reads as cancel on the other end.
#[derive(Debug)]
pub(super) enum ModalKind {
    Viewer,
    Confirm {
        reply: Option<oneshot::Sender<bool>>,
    },
    Prompt {
        label: String,
        reply: Option<oneshot::Sender<Option<String>>>,
    },
    Configure {
        editor: ConfigEditor,
        area: TextArea,
        reply: Option<oneshot::Sender<Option<String>>>,
    },
}

impl Modal {
    pub(super) fn viewer(title: impl Into<String>, lines: Vec<String>) -> Self {
        Self {
            title: title.into(),
            lines,
            scroll: 0,
            input: Input::default(),
            kind: ModalKind::Viewer,
        }
    }

    pub(super) fn confirm(title: &str, question: &str, reply: oneshot::Sender<bool>) -> Self {
        Self {
            title: title.to_string(),
            lines: vec![question.to_string()],
            scroll: 0,
            input: Input::default(),
            kind: ModalKind::Confirm { reply: Some(reply) },
        }
    }

    pub(super) fn prompt(
        question: &str,
        label: &str,
        reply: oneshot::Sender<Option<String>>,
    ) -> Self {
        Self {
            title: label.to_string(),
            lines: vec![question.to_string()],
            scroll: 0,
            input: Input::default(),
            kind: ModalKind::Prompt {
                label: label.to_string(),
                reply: Some(reply),
            },
        }
    }

    pub(super) fn configure(
        gateway: &str,
        current: &str,
        reply: oneshot::Sender<Option<String>>,
    ) -> Self {
        Self {
            title: format!("Configure gateway {}", gateway),
            lines: Vec::new(),
            scroll: 0,
            input: Input::default(),
            kind: ModalKind::Configure {
                editor: ConfigEditor::new(current),
                area: TextArea::from_text(current),
                reply: Some(reply),
            },
        }
    }
}

pub(super) fn draw_modal(frame: &mut ratatui::Frame, modal: &Modal) {
    let area = frame.area();
    let (max_w, max_h) = match modal.kind {
        ModalKind::Configure { .. } => (110, 40),
        _ => (90, 22),
    };
    let w = area.width.saturating_sub(6).clamp(20, max_w);
    let h = area.height.saturating_sub(6).clamp(8, max_h);
    let x = area.x + (area.width.saturating_sub(w)) / 2;
    let y = area.y + (area.height.saturating_sub(h)) / 2;
    let box_area = Rect {
        x,
        y,
        width: w,
        height: h,
    };

    frame.render_widget(ratatui::widgets::Clear, box_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(modal_title(modal));
    frame.render_widget(block.clone(), box_area);
    let inner = block.inner(box_area);

    match &modal.kind {
        ModalKind::Viewer | ModalKind::Confirm { .. } => {
            draw_lines(frame, modal, inner);
        }

        ModalKind::Prompt { label, .. } => {
            let parts = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(3)])
                .split(inner);
            draw_lines(frame, modal, parts[0]);

            frame.render_widget(
                Paragraph::new(modal.input.buf.as_str())
                    .block(Block::default().borders(Borders::ALL).title(label.as_str())),
                parts[1],
            );
            let x = modal.input.cursor as u16;
            frame.set_cursor_position((parts[1].x + 1 + x, parts[1].y + 1));
        }

        ModalKind::Configure { editor, area, .. } => {
            let parts = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(1)])
                .split(inner);

            let (row, col) = area.cursor();
            let height = parts[0].height as usize;
            let top = if height == 0 {
                0
            } else {
                row.saturating_sub(height - 1)
            };
            let lines: Vec<Line> = area.lines().iter().map(|s| Line::from(s.as_str())).collect();
            frame.render_widget(Paragraph::new(lines).scroll((top as u16, 0)), parts[0]);

            let status = match editor.message() {
                Some(msg) => Line::from(Span::styled(
                    format!("invalid: {}", msg),
                    Style::default().fg(Color::Red),
                )),
                None => Line::from(Span::styled(
                    "Ctrl+S save",
                    Style::default().fg(Color::Gray),
                )),
            };
            frame.render_widget(Paragraph::new(status), parts[1]);

            let cy = (row - top) as u16;
            frame.set_cursor_position((parts[0].x + col as u16, parts[0].y + cy));
        }
    }
}

fn draw_lines(frame: &mut ratatui::Frame, modal: &Modal, area: Rect) {
    let lines: Vec<Line> = modal.lines.iter().map(|s| Line::from(s.as_str())).collect();
    let scroll = modal.scroll.min(modal.lines.len().saturating_sub(1)) as u16;
    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .scroll((scroll, 0)),
        area,
    );
}

pub(super) fn handle_modal_key(app: &mut super::App, key: KeyEvent) {
    enum ModalAction {
        None,
        Close,
    }

    let action = {
        let Some(m) = app.modal.as_mut() else {
            return;
        };
        let plain = !key.modifiers.contains(KeyModifiers::CONTROL)
            && !key.modifiers.contains(KeyModifiers::ALT);

        match &mut m.kind {
            ModalKind::Viewer => match key.code {
                KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => ModalAction::Close,
                KeyCode::Up => {
                    m.scroll = m.scroll.saturating_sub(1);
                    ModalAction::None
                }
                KeyCode::Down => {
                    if m.scroll < m.lines.len().saturating_sub(1) {
                        m.scroll += 1;
                    }
                    ModalAction::None
                }
                KeyCode::PageUp => {
                    m.scroll = m.scroll.saturating_sub(10);
                    ModalAction::None
                }
                KeyCode::PageDown => {
                    m.scroll = (m.scroll + 10).min(m.lines.len().saturating_sub(1));
                    ModalAction::None
                }
                _ => ModalAction::None,
            },

            ModalKind::Confirm { reply } => {
                let answer = match key.code {
                    KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => Some(true),
                    KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => Some(false),
                    _ => None,
                };
                match answer {
                    Some(answer) => {
                        if let Some(tx) = reply.take() {
                            let _ = tx.send(answer);
                        }
                        ModalAction::Close
                    }
                    None => ModalAction::None,
                }
            }

            ModalKind::Prompt { reply, .. } => match key.code {
                KeyCode::Esc => {
                    if let Some(tx) = reply.take() {
                        let _ = tx.send(None);
                    }
                    ModalAction::Close
                }
                KeyCode::Enter => {
                    if let Some(tx) = reply.take() {
                        let _ = tx.send(Some(m.input.buf.clone()));
                    }
                    ModalAction::Close
                }
                KeyCode::Backspace => {
                    m.input.backspace();
                    ModalAction::None
                }
                KeyCode::Delete => {
                    m.input.delete();
                    ModalAction::None
                }
                KeyCode::Left => {
                    m.input.move_left();
                    ModalAction::None
                }
                KeyCode::Right => {
                    m.input.move_right();
                    ModalAction::None
                }
                KeyCode::Char(c) => {
                    if plain {
                        m.input.insert_char(c);
                    }
                    ModalAction::None
                }
                _ => ModalAction::None,
            },

            ModalKind::Configure {
                editor,
                area,
                reply,
            } => match key.code {
                KeyCode::Esc => {
                    if let Some(tx) = reply.take() {
                        let _ = tx.send(None);
                    }
                    ModalAction::Close
                }
                KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    editor.set_text(area.text());
                    match editor.submit() {
                        Some(text) => {
                            if let Some(tx) = reply.take() {
                                let _ = tx.send(Some(text));
                            }
                            ModalAction::Close
                        }
                        None => ModalAction::None,
                    }
                }
                KeyCode::Enter => {
                    area.newline();
                    ModalAction::None
                }
                KeyCode::Tab => {
                    area.insert_char(' ');
                    area.insert_char(' ');
                    ModalAction::None
                }
                KeyCode::Backspace => {
                    area.backspace();
                    ModalAction::None
                }
                KeyCode::Delete => {
                    area.delete();
                    ModalAction::None
                }
                KeyCode::Left => {
                    area.move_left();
                    ModalAction::None
                }
                KeyCode::Right => {
                    area.move_right();
                    ModalAction::None
                }
                KeyCode::Up => {
                    area.move_up();
                    ModalAction::None
                }
                KeyCode::Down => {
                    area.move_down();
                    ModalAction::None
                }
                KeyCode::Home => {
                    area.home();
                    ModalAction::None
                }
                KeyCode::End => {
                    area.end();
                    ModalAction::None
                }
                KeyCode::Char(c) => {
                    if plain {
                        area.insert_char(c);
                    }
                    ModalAction::None
                }
                _ => ModalAction::None,
            },
        }
    };

    match action {
        ModalAction::None => {}
        ModalAction::Close => app.close_modal(),
    }
}

fn modal_title(modal: &Modal) -> Line<'static> {
    let hints = match modal.kind {
        ModalKind::Viewer => "Esc",
        ModalKind::Confirm { .. } => "y/Enter  n/Esc",
        ModalKind::Prompt { .. } => "Esc  Enter",
        ModalKind::Configure { .. } => "Esc  Ctrl+S",
    };
    Line::from(vec![
        Span::styled(modal.title.clone(), Style::default().fg(Color::Yellow)),
        Span::raw("  ".to_string()),
        Span::styled(hints.to_string(), Style::default().fg(Color::Gray)),
    ])
}
