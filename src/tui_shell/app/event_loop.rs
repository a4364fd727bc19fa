use super::*;

pub(super) fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        app.drain_events();

        terminal
            .draw(|f| super::render::draw(f, app))
            .context("draw")?;
        if app.quit {
            return Ok(());
        }

        if event::poll(Duration::from_millis(50)).context("poll")? {
            match event::read().context("read event")? {
                Event::Key(k) if k.kind == KeyEventKind::Press => handle_key(app, k),
                _ => {}
            }
        }
    }
}

pub(super) fn handle_key(app: &mut App, key: KeyEvent) {
    if app.modal.is_some() {
        modal::handle_modal_key(app, key);
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        if key.code == KeyCode::Char('c') {
            app.quit = true;
        }
        return;
    }

    match key.code {
        KeyCode::Char('q') => {
            app.quit = true;
        }

        KeyCode::Esc => {
            if app.store.selection().is_some() {
                app.clear_selection();
            } else {
                app.quit = true;
            }
        }

        KeyCode::Up | KeyCode::Char('k') => app.select_neighbor(-1),
        KeyCode::Down | KeyCode::Char('j') => app.select_neighbor(1),
        KeyCode::PageUp => app.store.views_mut().detail.scroll_by(-10),
        KeyCode::PageDown => app.store.views_mut().detail.scroll_by(10),

        KeyCode::Char('d') => app.show_download(),
        KeyCode::Char('L') => app.show_log(),

        KeyCode::Char(c) => {
            if let Some(action) = action_for_key(c) {
                app.start_action(action);
            }
        }

        _ => {}
    }
}

pub(super) fn action_for_key(c: char) -> Option<Action> {
    match c {
        'r' => Some(Action::Reset),
        'n' => Some(Action::Rescan),
        't' => Some(Action::Sync),
        'e' => Some(Action::Configure),
        'u' => Some(Action::Upgrade),
        'f' => Some(Action::Forget),
        'c' => Some(Action::Command),
        'l' => Some(Action::Log),
        _ => None,
    }
}

pub(super) const KEY_HINTS: [(&str, &str); 12] = [
    ("Up/Down", "select"),
    ("r", "reset"),
    ("n", "rescan"),
    ("t", "sync"),
    ("e", "configure"),
    ("u", "upgrade"),
    ("f", "forget"),
    ("c", "command"),
    ("l", "log"),
    ("d", "download"),
    ("L", "history"),
    ("q", "quit"),
];
