use std::error::Error;

use clap::{Parser, Subcommand};
use commands::{
    check::{self, CheckArgs},
    generate::{self, GenerateArgs},
    tree::{self, TreeArgs},
};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "gnav", version, about = "Graph-navigation trial set generator")]
struct Cli {
    /// Log per-subject progress.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate one JSON trial file per subject.
    Generate(GenerateArgs),
    /// Re-validate a directory of generated subject files.
    Check(CheckArgs),
    /// Print a tree built by the tree builders.
    Tree(TreeArgs),
    /// Print the default YAML configuration.
    ExampleConfig,
}

fn setup_logging(verbose: bool) -> Result<(), Box<dyn Error>> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;
    match cli.command {
        Command::Generate(args) => generate::run(&args),
        Command::Check(args) => check::run(&args),
        Command::Tree(args) => tree::run(&args),
        Command::ExampleConfig => {
            print!("{}", gnav_trials::TrialConfig::default().to_yaml_string()?);
            Ok(())
        }
    }
}
