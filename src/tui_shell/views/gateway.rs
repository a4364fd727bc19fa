use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap};

use crate::format::{datestr, meter_row, text};
use crate::model::Gateway;

use super::super::{RenderCtx, View, render_view_chrome};

#[derive(Debug, Default)]
pub(in crate::tui_shell) struct GatewayView {
    pub(in crate::tui_shell) gateway: Option<Gateway>,
    pub(in crate::tui_shell) scroll: usize,
}

const METER_COLUMNS: [&str; 8] = [
    "Meter ID",
    "Manufacturer",
    "Version",
    "Type",
    "Bus",
    "Address",
    "Reading",
    "Time",
];

impl GatewayView {
    pub(super) fn update(&mut self, gateway: Option<&Gateway>) {
        let same = match (&self.gateway, gateway) {
            (Some(old), Some(new)) => old.id == new.id,
            _ => false,
        };
        if !same {
            self.scroll = 0;
        }
        self.gateway = gateway.cloned();
    }

    pub(in crate::tui_shell) fn scroll_by(&mut self, delta: isize) {
        let meters = self.gateway.as_ref().map(|g| g.meters.len()).unwrap_or(0);
        let max = meters.saturating_sub(1) as isize;
        self.scroll = (self.scroll as isize + delta).clamp(0, max.max(0)) as usize;
    }

    pub(in crate::tui_shell) fn controller_rows(
        gw: &Gateway,
        ctx: &RenderCtx,
    ) -> Vec<(&'static str, String)> {
        vec![
            ("App", text(gw.app.as_ref())),
            ("Version", text(gw.version.as_ref())),
            ("Build date", text(gw.build_date.as_ref())),
            ("Up since", datestr(gw.up_since, ctx.offset)),
            ("Last seen", datestr(gw.last_seen, ctx.offset)),
            ("Control topic", text(gw.control_topic.as_ref())),
            ("PID", text(gw.pid.as_ref())),
            ("OS", text(gw.os.as_ref())),
            ("Model", text(gw.model.as_ref())),
            ("Revision", text(gw.revision.as_ref())),
            ("Serial no.", text(gw.serial_number.as_ref())),
        ]
    }
}

impl View for GatewayView {
    fn title(&self) -> String {
        match &self.gateway {
            Some(gw) => format!("Gateway {}", gw.id),
            None => "Gateway".to_string(),
        }
    }

    fn render(&self, frame: &mut ratatui::Frame, area: Rect, ctx: &RenderCtx) {
        let inner = render_view_chrome(frame, &self.title(), area);
        let Some(gw) = &self.gateway else {
            frame.render_widget(
                Paragraph::new("(select a gateway with Up/Down)")
                    .style(Style::default().fg(Color::Gray)),
                inner,
            );
            return;
        };

        let console_h = if gw.has_console() { 8 } else { 0 };
        let parts = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(13),
                Constraint::Min(4),
                Constraint::Length(console_h),
            ])
            .split(inner);

        let info = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(40), Constraint::Min(0)])
            .split(parts[0]);

        let key_style = Style::default().fg(Color::Gray);
        let controller: Vec<Row> = Self::controller_rows(gw, ctx)
            .into_iter()
            .map(|(k, v)| Row::new(vec![Cell::from(k).style(key_style), Cell::from(v)]))
            .collect();
        frame.render_widget(
            Table::new(controller, [Constraint::Length(14), Constraint::Min(0)])
                .block(Block::default().borders(Borders::RIGHT).title("Controller")),
            info[0],
        );

        let config: Vec<Line> = gw.configuration_text().lines().map(Line::from).collect();
        frame.render_widget(
            Paragraph::new(config).block(Block::default().title("Configuration")),
            info[1],
        );

        let header = Row::new(METER_COLUMNS.to_vec())
            .style(Style::default().add_modifier(Modifier::BOLD));
        let meters: Vec<Row> = gw
            .meters
            .values()
            .skip(self.scroll)
            .map(|m| {
                let r = meter_row(m, ctx.offset);
                Row::new(vec![
                    Cell::from(r.id),
                    Cell::from(r.manufacturer),
                    Cell::from(r.version),
                    Cell::from(r.kind),
                    Cell::from(r.bus),
                    Cell::from(r.address),
                    Cell::from(Line::from(r.reading).right_aligned()),
                    Cell::from(r.time),
                ])
            })
            .collect();
        let widths = [
            Constraint::Length(12),
            Constraint::Length(12),
            Constraint::Length(8),
            Constraint::Length(14),
            Constraint::Length(10),
            Constraint::Length(8),
            Constraint::Length(16),
            Constraint::Length(19),
        ];
        frame.render_widget(
            Table::new(meters, widths).header(header).block(
                Block::default()
                    .borders(Borders::TOP)
                    .title(format!("Meters ({})", gw.meters.len())),
            ),
            parts[1],
        );

        if gw.has_console() {
            let console = gw.console_log.as_deref().unwrap_or("");
            let lines: Vec<Line> = console.lines().map(Line::from).collect();
            let skip = lines.len().saturating_sub(console_h.saturating_sub(1) as usize);
            frame.render_widget(
                Paragraph::new(lines)
                    .wrap(Wrap { trim: false })
                    .scroll((skip as u16, 0))
                    .block(Block::default().borders(Borders::TOP).title("Console")),
                parts[2],
            );
        }
    }
}
