// src/main.rs
use env_logger::Env;
use hbar_relay::cli::Cli;
use hbar_relay::config::application_settings::Settings;
use hbar_relay::delivery::api_server::run_server;
use log::{error, info, warn};
use structopt::StructOpt;

#[actix_web::main]
async fn main() {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::from_args();
    let mut settings = match Settings::load(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    cli.apply_overrides(&mut settings);

    info!("Loaded configuration: {:?}", settings);
    if !settings.telegram_configured() {
        warn!("TELEGRAM_BOT_TOKEN or TELEGRAM_CHAT_ID not set, notifications will only be logged");
    }

    if let Err(e) = run_server(settings).await {
        error!("Server stopped: {}", e);
        std::process::exit(1);
    }
}
