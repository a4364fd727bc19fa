use std::net::SocketAddr;

use clap::Parser;

use super::*;

#[derive(Parser)]
#[command(name = "meterman-server")]
#[command(about = "Meter gateway backend (development)", long_about = None)]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:8080")]
    addr: SocketAddr,

    /// Write bound address to this file (dev/test convenience)
    #[arg(long)]
    addr_file: Option<PathBuf>,

    /// Application directory holding the gateway software (`metermon`)
    #[arg(long, default_value = "/var/data/metermon")]
    appdir: PathBuf,

    /// Keep history of meter readings
    #[arg(long)]
    history: bool,

    /// How long a state query waits for a change before answering 304
    #[arg(long, default_value_t = 30)]
    poll_timeout_secs: u64,
}

pub(super) async fn run() -> Result<()> {
    let args = Args::parse();
    meterman::logging::init_stderr()?;

    let (changes, _) = watch::channel(0);
    let state = Arc::new(AppState {
        world: Arc::new(RwLock::new(World::default())),
        changes,
        appdir: args.appdir.clone(),
        history: args.history,
        poll_timeout: Duration::from_secs(args.poll_timeout_secs),
    });
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(args.addr)
        .await
        .with_context(|| format!("bind {}", args.addr))?;

    let local_addr = listener.local_addr().context("read listener local addr")?;
    tracing::info!(
        addr = %local_addr,
        appdir = %args.appdir.display(),
        "meterman-server listening"
    );

    if let Some(addr_file) = &args.addr_file {
        std::fs::write(addr_file, local_addr.to_string())
            .with_context(|| format!("write addr file {}", addr_file.display()))?;
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
