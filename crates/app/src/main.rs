use clap::Parser;

use crate::{
    commands::Command,
    config::ConfigArgs,
    error::Result,
    render::OutputFormat,
};

mod commands;
mod config;
mod error;
mod ledger_file;
mod render;
mod report;

#[derive(Parser, Debug)]
#[command(name = "roomies")]
#[command(about = "Shared expenses for flatmates: balances, settlements and group upkeep")]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    /// Output format.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = config::load(&cli.config)?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "roomies={level},engine={level}",
            level = settings.level
        ))
        .with_writer(std::io::stderr)
        .init();

    let ledger = ledger_file::open(&settings.ledger_path)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let changed = commands::execute(cli.command, &ledger, &settings, cli.format, &mut out)?;

    if changed {
        ledger_file::store(&settings.ledger_path, &ledger)?;
    } else {
        tracing::debug!("ledger unchanged");
    }

    Ok(())
}
