use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand};
use fxlive::core::CurrencyCode;
use fxlive::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct ConversionOpts {
    /// Amount to convert (defaults to the configured amount)
    amount: Option<String>,

    /// Source currency code
    #[arg(short, long)]
    from: Option<CurrencyCode>,

    /// Target currency code
    #[arg(short, long)]
    to: Option<CurrencyCode>,
}

impl From<ConversionOpts> for fxlive::ConversionArgs {
    fn from(opts: ConversionOpts) -> Self {
        fxlive::ConversionArgs {
            amount: opts.amount,
            from: opts.from,
            to: opts.to,
        }
    }
}

impl From<Commands> for fxlive::AppCommand {
    fn from(cmd: Commands) -> fxlive::AppCommand {
        match cmd {
            Commands::Convert(opts) => fxlive::AppCommand::Convert(opts.into()),
            Commands::Watch(opts) => fxlive::AppCommand::Watch(opts.into()),
            Commands::Rates { base } => fxlive::AppCommand::Rates { base },
            Commands::Currencies => fxlive::AppCommand::Currencies,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Convert an amount once using the latest rate
    Convert(ConversionOpts),
    /// Live converter that refreshes rates periodically
    Watch(ConversionOpts),
    /// Show rates from a base currency to every supported currency
    Rates {
        /// Base currency code (defaults to the configured source)
        #[arg(short, long)]
        base: Option<CurrencyCode>,
    },
    /// List supported currencies
    Currencies,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => fxlive::cli::setup::setup(),
        Some(cmd) => fxlive::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
