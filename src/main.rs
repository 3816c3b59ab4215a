use anyhow::Result;
use clap::{Parser, Subcommand};
use cookbook::cli::{self, Role};

/// Cooking Book - recipe sharing API
#[derive(Parser)]
#[command(name = "cookbook")]
#[command(about = "Recipe sharing REST API", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Server host address (overrides config file)
        #[arg(long)]
        host: Option<String>,

        /// Server port (overrides config file)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Run database migrations
    Migrate,
    /// Drop database if exists and recreate with migrations
    Reset,
    /// Insert demo categories, users and recipes
    Seed,
    /// Grant or revoke the admin role
    User {
        email: String,

        #[arg(long, value_enum, default_value_t = Role::Admin)]
        role: Role,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = cookbook::Config::load(cli.config)?;
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    cookbook::observability::init_observability("cookbook", env!("CARGO_PKG_VERSION"), &config.log)?;

    match cli.command {
        Commands::Serve { host, port } => cli::serve(config, host, port).await,
        Commands::Migrate => cookbook::migrate::migrate(&config.database.url).await,
        Commands::Reset => cookbook::migrate::reset(&config.database.url).await,
        Commands::Seed => {
            let pool = cookbook::db::create_pool(&config.database.url, 1).await?;
            let result = cookbook::seed::seed(pool.clone()).await;
            pool.close().await;

            result.map(|_| ())
        }
        Commands::User { email, role } => cli::set_role(config, email, role).await,
    }
}
