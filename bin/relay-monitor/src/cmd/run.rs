use crate::{config::Config, service::Service};
use clap::Args;
use relay_monitor_types::config::from_toml_file;
use tracing::info;

#[derive(Debug, Args)]
#[clap(about = "run the relay monitor against a configured network and relay set")]
pub struct Command {
    #[clap(env, default_value = "config.toml")]
    config_file: String,
}

impl Command {
    pub async fn execute(self) -> eyre::Result<()> {
        let config: Config = from_toml_file(&self.config_file)?;
        info!(network = %config.network.name, relays = config.relays.len(), "loaded configuration");
        Service::from(config).run().await
    }
}
