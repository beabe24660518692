//! dibmirror CLI - Local mirror repo definitions for diskimage-builder gates

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod display;
mod error;
mod exit_codes;

use commands::{MirrorArgs, Settings};

#[derive(Parser)]
#[command(name = "dibmirror")]
#[command(author = "dibmirror Contributors")]
#[command(version)]
#[command(about = "Provision local package-mirror repo definitions for image builds", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the mirror directory tree and render repo files
    Generate {
        #[command(flatten)]
        mirror: MirrorArgs,

        /// Report what would change without writing anything
        #[arg(long)]
        check: bool,
    },

    /// Show the directories and files a run would produce
    Plan {
        #[command(flatten)]
        mirror: MirrorArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Render a single template to stdout
    Render {
        /// Template id, e.g. centos-minimal/base.repo.j2
        template: String,

        #[command(flatten)]
        mirror: MirrorArgs,
    },

    /// List available template ids
    Templates {
        #[command(flatten)]
        mirror: MirrorArgs,
    },
}

fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    // Setup miette for nice error display
    miette::set_panic_hook();

    let cli = Cli::parse();
    init_logging(cli.debug);

    let result = match cli.command {
        Commands::Generate { mirror, check } => {
            Settings::load(mirror).and_then(|settings| commands::generate::run(&settings, check))
        }
        Commands::Plan { mirror, json } => {
            Settings::load(mirror).and_then(|settings| commands::plan::run(&settings, json))
        }
        Commands::Render { template, mirror } => {
            Settings::load(mirror).and_then(|settings| commands::render::run(&settings, &template))
        }
        Commands::Templates { mirror } => {
            Settings::load(mirror).and_then(|settings| commands::templates::run(&settings))
        }
    };

    let code = match result {
        Ok(()) => exit_codes::SUCCESS,
        Err(err) => {
            let code = err.exit_code();
            eprintln!("{:?}", miette::Report::new(err));
            code
        }
    };
    std::process::exit(code);
}
