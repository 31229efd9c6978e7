use autbench::Cli;
use clap::Parser;
use log::info;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    info!("autbench starting up");
    let cli = Cli::parse();
    cli.run()
}
