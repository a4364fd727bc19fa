use super::*;

#[derive(Debug, serde::Deserialize)]
pub(super) struct StateQuery {
    #[serde(default)]
    seq: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
pub(super) struct GatewayQuery {
    gw: String,
}

pub(super) async fn healthz() -> &'static str {
    "ok"
}

/// Long poll: a client that already holds the current seq waits for the
/// next change (up to the poll timeout) and gets `304` if none came. Any
/// other integer token is answered at once.
pub(super) async fn get_state(
    State(state): State<Arc<AppState>>,
    Query(q): Query<StateQuery>,
) -> Response {
    let Some(raw) = q.seq.as_deref() else {
        return bad_request("missing seq");
    };
    let Ok(held) = raw.trim().parse::<i64>() else {
        return bad_request(format!("invalid seq `{}`", raw));
    };
    let is_current = |seq: u64| i64::try_from(seq).is_ok_and(|seq| seq == held);

    // Subscribe before looking at the seq so a change in between still wakes us.
    let mut changes = state.changes.subscribe();
    if is_current(state.world.read().await.seq()) {
        let _ = tokio::time::timeout(state.poll_timeout, changes.changed()).await;
        if is_current(state.world.read().await.seq()) {
            return StatusCode::NOT_MODIFIED.into_response();
        }
    }

    Json(state.world.read().await.snapshot()).into_response()
}

pub(super) async fn post_message(State(state): State<Arc<AppState>>, body: String) -> Response {
    let message: Value = match serde_json::from_str(&body) {
        Ok(v) => v,
        Err(err) => {
            tracing::warn!("invalid JSON message: {}", err);
            return bad_request(format!("invalid JSON message: {}", err));
        }
    };

    let mut world = state.world.write().await;
    match apply_message(&mut world, &message, state.history) {
        Ok(seq) => {
            state.changes.send_replace(seq);
            Json(json!({"seq": seq})).into_response()
        }
        Err(err) => {
            tracing::warn!("rejected message: {}", err);
            bad_request(err)
        }
    }
}

async fn publish_control(state: &AppState, gw: &str, msg: Value) -> Response {
    let op = msg.get("op").and_then(Value::as_str).unwrap_or("").to_string();
    let mut world = state.world.write().await;
    if !world.enqueue(gw, msg) {
        return not_found();
    }
    tracing::info!(gw = %gw, op = %op, "queued control message");
    StatusCode::OK.into_response()
}

pub(super) async fn post_reset(
    State(state): State<Arc<AppState>>,
    Query(q): Query<GatewayQuery>,
) -> Response {
    publish_control(&state, &q.gw, json!({"op": "reset"})).await
}

pub(super) async fn post_rescan(
    State(state): State<Arc<AppState>>,
    Query(q): Query<GatewayQuery>,
) -> Response {
    publish_control(&state, &q.gw, json!({"op": "rescan"})).await
}

pub(super) async fn post_log(
    State(state): State<Arc<AppState>>,
    Query(q): Query<GatewayQuery>,
) -> Response {
    publish_control(&state, &q.gw, json!({"op": "log"})).await
}

pub(super) async fn post_timesync(
    State(state): State<Arc<AppState>>,
    Query(q): Query<GatewayQuery>,
) -> Response {
    let ts = time::OffsetDateTime::now_utc().unix_timestamp();
    publish_control(&state, &q.gw, json!({"op": "timesync", "ts": ts})).await
}

pub(super) async fn post_command(
    State(state): State<Arc<AppState>>,
    Query(q): Query<GatewayQuery>,
    body: String,
) -> Response {
    publish_control(&state, &q.gw, json!({"op": "command", "command": body})).await
}

pub(super) async fn post_config(
    State(state): State<Arc<AppState>>,
    Query(q): Query<GatewayQuery>,
    body: String,
) -> Response {
    tracing::info!(gw = %q.gw, "config: {}", body);
    publish_control(&state, &q.gw, json!({"op": "config", "config": body})).await
}

pub(super) async fn post_upgrade(
    State(state): State<Arc<AppState>>,
    Query(q): Query<GatewayQuery>,
) -> Response {
    if !state.world.read().await.contains(&q.gw) {
        return not_found();
    }
    let data = match read_software(&state).await {
        Ok(data) => data,
        Err(err) => return internal_error(err),
    };
    tracing::info!(gw = %q.gw, bytes = data.len(), "upgrade");
    let msg = json!({"op": "upgrade", "binary": hex::encode(&data)});
    publish_control(&state, &q.gw, msg).await
}

pub(super) async fn post_forget(
    State(state): State<Arc<AppState>>,
    Query(q): Query<GatewayQuery>,
) -> Response {
    let mut world = state.world.write().await;
    if !world.forget(&q.gw) {
        return not_found();
    }
    let seq = world.touch();
    state.changes.send_replace(seq);
    tracing::info!(gw = %q.gw, seq, "forgot gateway");
    StatusCode::OK.into_response()
}

/// Hands a gateway the control messages queued for it, oldest first.
pub(super) async fn get_control(
    State(state): State<Arc<AppState>>,
    Query(q): Query<GatewayQuery>,
) -> Response {
    let mut world = state.world.write().await;
    if !world.contains(&q.gw) {
        return not_found();
    }
    Json(Value::Array(world.drain(&q.gw))).into_response()
}

pub(super) async fn get_download(State(state): State<Arc<AppState>>) -> Response {
    match read_software(&state).await {
        Ok(data) => ([(header::CONTENT_TYPE, "application/octet-stream")], data).into_response(),
        Err(err) => {
            tracing::warn!("download: {:#}", err);
            not_found()
        }
    }
}

async fn read_software(state: &AppState) -> Result<Vec<u8>> {
    let path = state.appdir.join("metermon");
    tokio::fs::read(&path)
        .await
        .with_context(|| format!("read {}", path.display()))
}
