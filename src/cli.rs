// src/cli.rs
use structopt::StructOpt;

use crate::config::application_settings::Settings;

#[derive(StructOpt, Debug, Default)]
#[structopt(name = "hbar-relay", about = "HBAR allowance, transfer and visitor relay with Telegram alerts")]
pub struct Cli {
    /// Config file (any format the `config` crate reads); `config.*` is used when present
    #[structopt(short, long)]
    pub config: Option<String>,

    /// Interface to bind, overrides SERVER__HOST
    #[structopt(long)]
    pub host: Option<String>,

    /// Port to listen on, overrides SERVER__PORT
    #[structopt(short, long)]
    pub port: Option<u16>,
}

impl Cli {
    /// Command-line flags win over file and environment values
    pub fn apply_overrides(&self, settings: &mut Settings) {
        if let Some(host) = &self.host {
            settings.server.host = host.clone();
        }
        if let Some(port) = self.port {
            settings.server.port = port;
        }
    }
}
