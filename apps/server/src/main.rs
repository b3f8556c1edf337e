use anyhow::Context;
use rsvp_domain::config::ApiConfig;
use rsvp_kernel::config::load_config;
use rsvp_logger::Logger;
use rsvp_server::Server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg: ApiConfig = load_config(Some("server")).context("Critical: Configuration is malformed")?;

    let _log = Logger::from_config(env!("CARGO_PKG_NAME"), &cfg.logging)?.init()?;

    Server::builder().config(cfg).build().await?.run().await
}
