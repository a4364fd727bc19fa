use super::*;

pub(super) fn draw(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(0),
            Constraint::Length(3),
            Constraint::Length(2),
        ])
        .split(area);

    // Header
    let snapshot = app.store.snapshot();
    let synced = app
        .last_sync
        .map(|ts| format!("synced {}", fmt_clock(ts, app.offset)))
        .unwrap_or_else(|| "waiting for state".to_string());
    let mut spans = vec![
        Span::styled(
            "Meter Manager",
            Style::default().fg(Color::Black).bg(Color::White),
        ),
        Span::raw("  "),
        Span::styled(app.base_url(), Style::default().fg(Color::Cyan)),
        Span::raw("  "),
        Span::raw(format!("seq={}", snapshot.sequence)),
        Span::raw("  "),
        Span::raw(format!("gateways={}", snapshot.gateways.len())),
        Span::raw("  "),
        Span::styled(synced, Style::default().fg(Color::Gray)),
    ];
    if app.in_flight > 0 {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!("{} pending", app.in_flight),
            Style::default().fg(Color::Yellow),
        ));
    }
    let header =
        Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    // Gateway list | gateway detail
    let ctx = RenderCtx { offset: app.offset };
    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(28), Constraint::Min(0)])
        .split(chunks[1]);
    let views = app.store.views();
    views.list.render(frame, panes[0], &ctx);
    views.detail.render(frame, panes[1], &ctx);

    // Status / last result
    {
        let mut lines = Vec::new();
        if let Some(r) = &app.last_result {
            let style = match r.kind {
                EntryKind::Output => Style::default().fg(Color::White),
                EntryKind::Error => Style::default().fg(Color::Red),
            };
            for (i, l) in r.lines.iter().enumerate() {
                if i == 0 {
                    lines.push(Line::from(vec![
                        Span::styled(
                            format!("{} ", fmt_clock(r.ts, app.offset)),
                            Style::default().fg(Color::Gray),
                        ),
                        Span::styled(l.as_str(), style),
                    ]));
                } else {
                    lines.push(Line::from(Span::styled(l.as_str(), style)));
                }
            }
        }
        if lines.is_empty() {
            lines.push(Line::from(""));
        }
        frame.render_widget(
            Paragraph::new(lines)
                .wrap(Wrap { trim: false })
                .block(Block::default().borders(Borders::TOP).title("Last")),
            chunks[2],
        );
    }

    // Key hints
    let mut hints = Vec::new();
    for (key, label) in super::event_loop::KEY_HINTS {
        if !hints.is_empty() {
            hints.push(Span::raw("  "));
        }
        hints.push(Span::styled(key, Style::default().fg(Color::Yellow)));
        hints.push(Span::styled(
            format!(" {}", label),
            Style::default().fg(Color::Gray).add_modifier(Modifier::DIM),
        ));
    }
    frame.render_widget(
        Paragraph::new(Line::from(hints)).block(Block::default().borders(Borders::TOP)),
        chunks[3],
    );

    if let Some(m) = &app.modal {
        dim_frame(frame);
        modal::draw_modal(frame, m);
    }
}

fn dim_frame(frame: &mut ratatui::Frame) {
    let area = frame.area();
    let buf = frame.buffer_mut();
    for y in area.y..area.y.saturating_add(area.height) {
        for x in area.x..area.x.saturating_add(area.width) {
            if let Some(cell) = buf.cell_mut((x, y)) {
                cell.modifier |= Modifier::DIM;
            }
        }
    }
}
