use clap::{Parser, Subcommand};

mod commands;
mod output;

#[derive(Parser)]
#[command(
    name = "pgfit",
    about = "A tool to exercise PostgreSQL indexes and report the ones that earn nothing."
)]
#[command(author, version, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the demo schema and fill it with data
    Seed {
        /// DB connection URL
        #[arg(short, long, env = "DATABASE_URL")]
        database_url: String,

        /// Multiplier on the base row targets
        #[arg(short, long, default_value = "1")]
        scale: u32,
    },

    /// Run a read-only workload against the demo schema
    Simulate {
        /// DB connection URL
        #[arg(short, long, env = "DATABASE_URL")]
        database_url: String,

        /// How long to run, in seconds
        #[arg(short = 't', long, default_value = "60")]
        seconds: u64,

        /// Pause between operations, in milliseconds (0 = none)
        #[arg(long, default_value = "0")]
        sleep_ms: u64,
    },

    /// Run a write-heavy workload that churns orders and bloats indexes
    Churn {
        /// DB connection URL
        #[arg(short, long, env = "DATABASE_URL")]
        database_url: String,

        /// How long to run, in seconds
        #[arg(short = 't', long, default_value = "60")]
        seconds: u64,

        /// Line items per created order
        #[arg(long, default_value = "5")]
        items_per_order: u32,

        /// Fraction of created orders deleted right away
        #[arg(long, default_value = "0.9")]
        delete_ratio: f64,

        /// Fraction of iterations that toggle an existing order instead
        #[arg(long, default_value = "0.5")]
        toggle_ratio: f64,

        /// Pause between operations, in milliseconds (0 = none)
        #[arg(long, default_value = "0")]
        sleep_ms: u64,

        /// RNG seed for a reproducible run
        #[arg(long, default_value = "123")]
        seed: u64,
    },

    /// Report index usage and flag likely-redundant indexes
    Report {
        /// DB connection URL
        #[arg(short, long, env = "DATABASE_URL")]
        database_url: String,

        /// Only inspect tables whose name starts with this prefix
        #[arg(short, long, default_value = "shop_")]
        prefix: String,

        /// Output format
        #[arg(short = 'f', long, value_enum, default_value = "table")]
        format: output::OutputFormat,
    },

    /// Reset the statistics counters the report reads from
    ResetStats {
        /// DB connection URL
        #[arg(short, long, env = "DATABASE_URL")]
        database_url: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Seed {
            database_url,
            scale,
        } => {
            commands::seed::run(&database_url, scale).await?;
        }
        Commands::Simulate {
            database_url,
            seconds,
            sleep_ms,
        } => {
            commands::simulate::run(&database_url, seconds, sleep_ms).await?;
        }
        Commands::Churn {
            database_url,
            seconds,
            items_per_order,
            delete_ratio,
            toggle_ratio,
            sleep_ms,
            seed,
        } => {
            commands::churn::run(
                &database_url,
                seconds,
                items_per_order,
                delete_ratio,
                toggle_ratio,
                sleep_ms,
                seed,
            )
            .await?;
        }
        Commands::Report {
            database_url,
            prefix,
            format,
        } => {
            commands::report::run(&database_url, &prefix, format).await?;
        }
        Commands::ResetStats { database_url } => {
            commands::reset_stats::run(&database_url).await?;
        }
    }
    Ok(())
}
