use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Map, Value, json};
use tokio::sync::{RwLock, watch};

#[path = "meterman_server/http_error.rs"]
mod http_error;
use self::http_error::*;
#[path = "meterman_server/world.rs"]
mod world;
use self::world::*;
#[path = "meterman_server/messages.rs"]
mod messages;
use self::messages::*;
#[path = "meterman_server/handlers.rs"]
mod handlers;
use self::handlers::*;
#[path = "meterman_server/routes.rs"]
mod routes;
use self::routes::*;
#[path = "meterman_server/runtime.rs"]
mod runtime;

struct AppState {
    world: Arc<RwLock<World>>,

    // Carries the latest seq; long polls wait on it.
    changes: watch::Sender<u64>,

    appdir: PathBuf,
    history: bool,
    poll_timeout: Duration,
}

#[tokio::main]
async fn main() {
    if let Err(err) = runtime::run().await {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}
