use cwbridge_ircd::{
    backend::ChatworkConnector,
    config::BridgeConfig,
    tracing_config,
    Listener,
};

use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(rename_all = "kebab")]
struct Opts {
    /// Address to accept client connections on; overrides the config file
    #[structopt(short, long)]
    addr: Option<SocketAddr>,

    /// Config file location
    #[structopt(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let opts = Opts::from_args();

    let mut config = match &opts.config {
        Some(path) => BridgeConfig::load_file(path)?,
        None => BridgeConfig::default(),
    };
    if let Some(addr) = opts.addr {
        config.listen = addr;
    }

    let subscriber = tracing_config::build_subscriber(config.log.clone())?;
    tracing::subscriber::set_global_default(subscriber)?;

    let connector = Arc::new(ChatworkConnector::new(config.backend.base_url.clone()));
    let settings = Arc::new(config.session_settings());

    let listener = Listener::bind(config.listen).await?;
    listener.run(connector, settings).await?;

    Ok(())
}
