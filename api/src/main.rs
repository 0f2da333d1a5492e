#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

use ::axum::Server;
use anyhow::{Context, Result};
use dotenvy::dotenv;
use repochat::Config;
use std::{env, net::SocketAddr};
use tracing::info;

use crate::{axum::app, utils::logger};

mod axum;
mod routers;
mod utils;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let _guard = logger::setup();

    let config = Config::from_env()?;
    let app = app::create(&config);

    let port = env::var("PORT")
        .map_or(Ok(8000), |p| p.parse::<u16>())
        .context("$PORT is not a valid port")?;
    let address = SocketAddr::from(([0, 0, 0, 0], port));

    info!("⚡ repochat started on http://{address}");
    Server::bind(&address)
        .serve(app.into_make_service())
        .await
        .context("Failed to start server")
}
