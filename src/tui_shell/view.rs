use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders};

use time::UtcOffset;

#[derive(Clone, Copy, Debug)]
pub(super) struct RenderCtx {
    pub(super) offset: UtcOffset,
}

pub(super) trait View {
    fn title(&self) -> String;

    fn render(&self, frame: &mut ratatui::Frame, area: Rect, ctx: &RenderCtx);
}

pub(super) fn render_view_chrome(frame: &mut ratatui::Frame, title: &str, area: Rect) -> Rect {
    let header = Line::from(vec![Span::styled(
        title.to_string(),
        Style::default().fg(Color::Yellow),
    )]);
    let outer = Block::default().borders(Borders::ALL).title(header);
    let inner = outer.inner(area);
    frame.render_widget(outer, area);
    inner
}
