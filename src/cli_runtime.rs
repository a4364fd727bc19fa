use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use meterman::config::DashboardConfig;

use crate::Commands;

#[derive(Parser)]
#[command(name = "meterman")]
#[command(about = "Meter gateway fleet dashboard", long_about = None)]
pub(crate) struct Cli {
    /// Backend base URL (overrides the config file)
    #[arg(long, global = true)]
    url: Option<String>,

    /// Dashboard config file (JSON)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Write logs here (the TUI is silent otherwise)
    #[arg(long = "log-file", global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl Cli {
    fn dashboard_config(&self) -> Result<DashboardConfig> {
        let mut cfg = DashboardConfig::load_or_default(self.config.as_deref())?;
        if let Some(url) = &self.url {
            cfg.base_url = url.clone();
        }
        if let Some(path) = &self.log_file {
            cfg.log_file = Some(path.clone());
        }
        cfg.validate()?;
        Ok(cfg)
    }
}

pub(crate) fn run() -> Result<()> {
    let cli = Cli::parse();
    let cfg = cli.dashboard_config()?;

    match cli.command {
        None => {
            if let Some(path) = &cfg.log_file {
                meterman::logging::init_file(path)?;
            }
            meterman::tui::run_with_options(meterman::tui::TuiRunOptions { config: cfg })?;
        }
        Some(command) => {
            match &cfg.log_file {
                Some(path) => meterman::logging::init_file(path)?,
                None => meterman::logging::init_stderr()?,
            }
            crate::cli_exec::handle_command(&cfg, command)?
        }
    }

    Ok(())
}
