use std::net::TcpListener;

use anyhow::Context;

use sqlx::PgPool;

use skillbridge::app;
use skillbridge::settings::Settings;
use skillbridge::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = telemetry::create_subscriber(telemetry::DEFAULT_FILTER, std::io::stdout);
    telemetry::set_subscriber(subscriber)?;

    let settings = Settings::load().expect("Failed to load settings");

    let pool = PgPool::connect_with(settings.database.with_db()).await?;

    let listener = TcpListener::bind(settings.app.addr())?;

    app::run(listener, pool)?.await.context("Failed to run app")
}
