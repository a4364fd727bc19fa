use super::*;

pub(super) fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/meterman/state", get(get_state))
        .route("/meterman/message", post(post_message))
        .route("/meterman/control", get(get_control))
        .route("/meterman/reset", post(post_reset))
        .route("/meterman/rescan", post(post_rescan))
        .route("/meterman/timesync", post(post_timesync))
        .route("/meterman/upgrade", post(post_upgrade))
        .route("/meterman/forget", post(post_forget))
        .route("/meterman/command", post(post_command))
        .route("/meterman/config", post(post_config))
        .route("/meterman/log", post(post_log))
        .route("/meterman/download", get(get_download))
        .route(SOFTWARE_PATH, get(get_download))
        .with_state(state)
}
