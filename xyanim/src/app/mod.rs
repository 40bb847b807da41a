mod report;
mod runner;

use self::report::report_summary;
use self::runner::run_animation;
use crate::config::{Args, Config};
use crate::io::setup_output;
use clap::Parser;
use color_eyre::eyre::Result;
use tracing::info;

pub struct XyApplication {
    args: Args,
    config: Config,
}

impl XyApplication {
    pub fn from_cli() -> Result<Self> {
        let args = Args::parse();
        let config = load_config(&args)?;
        Ok(Self { args, config })
    }

    pub fn run(self) -> Result<()> {
        setup_output(self.args.output.as_ref());
        info!("Configuration loaded from {}", self.args.config_file);
        info!("{:?}", self.config);

        let summary = run_animation(&self.config)?;
        report_summary(&summary);
        Ok(())
    }
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = Config::from_file(&args.config_file)?;
    config.apply_args(args);
    Ok(config)
}
