use crate::config::Config;
use clap::Args;
use relay_monitor_types::config::from_toml_file;

#[derive(Debug, Args)]
#[clap(about = "(debug) load and pretty-print the parsed configuration")]
pub struct Command {
    #[clap(env)]
    config_file: String,
}

impl Command {
    pub async fn execute(self) -> eyre::Result<()> {
        let config: Config = from_toml_file(&self.config_file)?;
        println!("{config:#?}");
        Ok(())
    }
}
