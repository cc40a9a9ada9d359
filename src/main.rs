use httpwire::config::Config;
use httpwire::demo::DemoHandler;
use httpwire::proxy::Upstream;
use httpwire::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = match std::env::var("HTTPWIRE_CONFIG") {
        Ok(path) => Config::from_file(path)?,
        Err(_) => Config::load(),
    };

    let upstream = Upstream::new(
        &cfg.upstream_url,
        cfg.upstream_connect_timeout(),
        cfg.upstream_request_timeout(),
    )?;

    let mut server = server::serve(cfg.listen_addr.as_str(), DemoHandler::new(upstream)).await?;
    tracing::info!("Server started on {}", server.local_addr());

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");

    server.close().await?;
    tracing::info!("Server gracefully stopped");

    Ok(())
}
