use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod utils;

/// NDN forwarding core tools
#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    /// Sets the level of verbosity
    #[clap(short, long, global = true)]
    verbose: bool,

    /// Subcommand to execute
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the components, offsets and prefix hashes of names
    ///
    /// Hashes are only comparable between runs of the same build.
    Name {
        /// Names in NDN URI format
        #[clap(required = true)]
        uris: Vec<String>,
    },

    /// Compare two names in canonical order
    Compare {
        lhs: String,
        rhs: String,
    },

    /// Print a CUBIC window trace
    Cubic {
        /// Number of round trips to simulate
        #[clap(short, long, default_value = "100")]
        steps: usize,

        /// Round-trip time in milliseconds
        #[clap(short, long, default_value = "50")]
        rtt_ms: u64,

        /// Signal congestion every this many round trips (0 = never)
        #[clap(short, long, default_value = "0")]
        loss_every: usize,
    },

    /// Print the effective forwarder configuration
    Config {
        /// Configuration file (TOML, JSON or YAML)
        #[clap(short, long)]
        file: Option<PathBuf>,
    },

    /// Run the forwarder against an in-process producer
    Benchmark {
        /// Number of Interests to send
        #[clap(short, long, default_value = "10000")]
        count: usize,

        /// Name prefix to use for benchmark
        #[clap(short, long, default_value = "/benchmark")]
        prefix: String,

        /// Strategy bound to the prefix
        #[clap(short, long, default_value = "best-route")]
        strategy: String,

        /// Answer every Nth Interest with a Nack instead of Data (0 = never)
        #[clap(short, long, default_value = "0")]
        nack_every: usize,

        /// Configuration file (TOML, JSON or YAML)
        #[clap(short, long)]
        file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(
        if cli.verbose { "debug" } else { "info" }
    ))
    .init();

    match cli.command {
        Commands::Name { uris } => commands::name::show_names(&uris)?,
        Commands::Compare { lhs, rhs } => commands::name::compare_names(&lhs, &rhs)?,
        Commands::Cubic {
            steps,
            rtt_ms,
            loss_every,
        } => commands::cubic::print_trace(steps, rtt_ms, loss_every),
        Commands::Config { file } => commands::config::show_config(file.as_deref())?,
        Commands::Benchmark {
            count,
            prefix,
            strategy,
            nack_every,
            file,
        } => {
            commands::benchmark::run_benchmark(count, &prefix, &strategy, nack_every, file.as_deref()).await?
        }
    }

    Ok(())
}
