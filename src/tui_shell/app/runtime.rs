use tokio::sync::watch;

use crate::format::local_offset;
use crate::sync::SyncEngine;

use super::*;

pub(in crate::tui_shell) fn run(opts: crate::tui::TuiRunOptions) -> Result<()> {
    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        anyhow::bail!("TUI requires an interactive terminal (TTY)");
    }

    let config = opts.config;
    config.validate()?;
    let client = MetermanClient::new(&config.base_url)?;

    // Resolve before the runtime spawns threads; the lookup refuses to run
    // in a multi-threaded process on some platforms.
    let offset = local_offset();
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("start async runtime")?;

    let mut app = App::new(client.clone(), rt.handle().clone(), offset);
    let (stop_tx, stop_rx) = watch::channel(false);
    let tx = app.events_tx();
    let engine = SyncEngine::new(client)
        .with_backoff(config.backoff())
        .with_min_interval(config.min_poll_interval());
    rt.spawn(engine.run(
        move |snapshot| {
            let _ = tx.send(UiEvent::Snapshot(snapshot));
        },
        stop_rx,
    ));
    tracing::info!(base_url = %config.base_url, "dashboard started");

    let mut stdout = io::stdout();
    enable_raw_mode().context("enable raw mode")?;
    execute!(stdout, EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    terminal.clear().ok();

    let res = event_loop::run_loop(&mut terminal, &mut app);

    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();

    let _ = stop_tx.send(true);
    drop(app);
    rt.shutdown_timeout(Duration::from_secs(1));
    tracing::info!("dashboard stopped");

    res
}
