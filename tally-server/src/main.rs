use std::{io, net::SocketAddr, path::PathBuf};

use anyhow::Error;

use clap::Parser as _;

use tally_server::{
    app::AppState,
    cli::{Args, run_command},
    config::Config,
};

use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Error> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt::fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    // load config
    let config_path = args.config.unwrap_or_else(|| PathBuf::from("./tally.toml"));
    let config = Config::load(config_path)?;

    if config.server.password_key.is_none() {
        tracing::warn!("Passwords are digested without a key; set `TALLY_SERVER__PASSWORD_KEY`");
    }

    let state = AppState::new(config.server).await?;

    // Execute command if it exists
    if let Some(command) = args.command {
        return run_command(&command, &state).await;
    }

    // check for development defaults
    if state.keys.is_random() {
        tracing::warn!("Using a random signing key; sessions end when the server restarts");
        tracing::warn!("Set `TALLY_SERVER__SIGNING_KEY` for production!");
    }

    let addr: SocketAddr = ([0, 0, 0, 0], state.port).into();

    let router = tally_server::router(state);

    // Serve HTTP
    tracing::info!("listening on {} (http)", addr);

    axum_server::bind(addr)
        .serve(router.into_make_service())
        .await
        .map_err(From::from)
}
