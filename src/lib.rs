pub mod config;
pub mod dispatch;
pub mod format;
pub mod logging;
pub mod model;
pub mod reconcile;
pub mod remote;
pub mod store;
pub mod sync;
pub mod tui;

mod tui_shell;
