use anyhow::Result;

use crate::config::DashboardConfig;

#[derive(Clone, Debug, Default)]
pub struct TuiRunOptions {
    pub config: DashboardConfig,
}

pub fn run() -> Result<()> {
    crate::tui_shell::run(TuiRunOptions::default())
}

pub fn run_with_options(opts: TuiRunOptions) -> Result<()> {
    crate::tui_shell::run(opts)
}
