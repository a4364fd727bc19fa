use std::path::PathBuf;

use clap::Subcommand;

use meterman::dispatch::Action;

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Query the backend once and print the fleet
    State {
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// Follow the backend and print every snapshot change
    Watch {
        /// Emit each snapshot as one JSON line
        #[arg(long)]
        json: bool,
    },

    /// Send one command to a gateway
    Send {
        /// Gateway id
        #[arg(long)]
        gw: String,
        /// reset|rescan|sync|upgrade|forget|log|command|configure
        action: Action,
        /// Command text (command) or configuration document (configure)
        #[arg(long)]
        body: Option<String>,
        /// Skip the confirmation question
        #[arg(long)]
        yes: bool,
    },

    /// Download the gateway software advertised by the backend
    Download {
        /// Destination file (defaults to the last path segment)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}
