use std::io::{Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use time::UtcOffset;
use tokio::sync::watch;

use meterman::config::DashboardConfig;
use meterman::dispatch::{Action, CommandDispatcher, DispatchOutcome};
use meterman::format::{datestr, local_offset, meter_row};
use meterman::model::Snapshot;
use meterman::reconcile::gateways_by_start;
use meterman::remote::MetermanClient;
use meterman::store::SnapshotStore;
use meterman::sync::SyncEngine;

use crate::Commands;

mod terminal;

use self::terminal::{PrintViews, TerminalPrompter};

pub(crate) fn handle_command(cfg: &DashboardConfig, command: Commands) -> Result<()> {
    let offset = local_offset();
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("start async runtime")?;
    let client = MetermanClient::new(&cfg.base_url)?;

    match command {
        Commands::State { json } => rt.block_on(handle_state_command(&client, json, offset)),
        Commands::Watch { json } => rt.block_on(handle_watch_command(cfg, client, json, offset)),
        Commands::Send {
            gw,
            action,
            body,
            yes,
        } => rt.block_on(handle_send_command(client, &gw, action, body, yes)),
        Commands::Download { out } => rt.block_on(handle_download_command(&client, out)),
    }
}

async fn handle_state_command(
    client: &MetermanClient,
    json: bool,
    offset: UtcOffset,
) -> Result<()> {
    let snapshot = client.fetch_current().await?;
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&snapshot).context("serialize state json")?
        );
    } else {
        print_snapshot(&snapshot, offset);
    }
    Ok(())
}

async fn handle_watch_command(
    cfg: &DashboardConfig,
    client: MetermanClient,
    json: bool,
    offset: UtcOffset,
) -> Result<()> {
    let (stop_tx, stop_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = stop_tx.send(true);
        }
    });

    let mut store = SnapshotStore::new(PrintViews::new(json, offset));
    let engine = SyncEngine::new(client)
        .with_backoff(cfg.backoff())
        .with_min_interval(cfg.min_poll_interval());
    engine
        .run(|snapshot| store.replace_snapshot(snapshot), stop_rx)
        .await;
    Ok(())
}

async fn handle_send_command(
    client: MetermanClient,
    gateway_id: &str,
    action: Action,
    body: Option<String>,
    yes: bool,
) -> Result<()> {
    let snapshot = client.fetch_current().await?;
    let gateway = snapshot
        .gateway(gateway_id)
        .cloned()
        .with_context(|| format!("unknown gateway `{}`", gateway_id))?;

    let dispatcher = CommandDispatcher::new(client);
    let mut prompter = TerminalPrompter::new(yes, body);
    match dispatcher.dispatch(&mut prompter, action, &gateway).await {
        DispatchOutcome::Sent => {
            println!("{} sent to {}", action.endpoint(), gateway_id);
            Ok(())
        }
        DispatchOutcome::Aborted => {
            println!("Cancelled");
            Ok(())
        }
        DispatchOutcome::Failed(msg) => anyhow::bail!("{} failed: {}", action.endpoint(), msg),
    }
}

async fn handle_download_command(client: &MetermanClient, out: Option<PathBuf>) -> Result<()> {
    let snapshot = client.fetch_current().await?;
    let dest = match out {
        Some(path) => path,
        None => {
            let name = snapshot
                .software_url
                .as_deref()
                .and_then(|url| url.rsplit('/').find(|s| !s.is_empty()))
                .unwrap_or("metermon");
            PathBuf::from(name)
        }
    };
    let bytes = client.download_software(&snapshot, &dest).await?;
    println!("Downloaded {} bytes to {}", bytes, dest.display());
    Ok(())
}

pub(crate) fn print_snapshot(snapshot: &Snapshot, offset: UtcOffset) {
    println!(
        "seq {}  {} gateway(s)",
        snapshot.sequence,
        snapshot.gateways.len()
    );
    for gw in gateways_by_start(snapshot) {
        println!(
            "{}  up since {}  last seen {}  {} meter(s)",
            gw.id,
            datestr(gw.up_since, offset),
            datestr(gw.last_seen, offset),
            gw.meters.len()
        );
        for meter in gw.meters.values() {
            let row = meter_row(meter, offset);
            println!(
                "  {:<12} {:<6} {:<12} {:<10} {:>16}  {}",
                row.id, row.manufacturer, row.kind, row.bus, row.reading, row.time
            );
        }
    }
}

/// Reads one line from stdin after printing `prompt`. `None` on EOF.
async fn read_line(prompt: String) -> Option<String> {
    tokio::task::spawn_blocking(move || {
        print!("{}", prompt);
        std::io::stdout().flush().ok();
        let mut line = String::new();
        match std::io::stdin().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
        }
    })
    .await
    .ok()
    .flatten()
}

/// Reads stdin to the end.
async fn read_all() -> Option<String> {
    tokio::task::spawn_blocking(|| {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text).ok()?;
        Some(text)
    })
    .await
    .ok()
    .flatten()
}
