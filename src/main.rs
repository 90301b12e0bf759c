use clap::Parser;
use dotenvy::dotenv;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use vaccination_portal::{
    cli::{self, Cli, PortalContext},
    config,
    core::vaccine,
    errors::Result,
};

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        error!("{}", err);
        eprintln!("error: {}", err.user_message());
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // 2. Load .env file; variables may also be set externally
    dotenv().ok();

    // 3. Parse arguments before touching the database so --help stays cheap
    let cli = Cli::parse();

    // 4. Load configuration and credentials
    let portal_config = config::catalog::load_default_config()?;
    let credentials = config::coordinator::load_credentials()?;

    // 5. Connect and make sure the tables exist
    let database = config::database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    config::database::create_tables(&database).await?;

    // 6. Seed the vaccine catalog from config.toml
    let seeded = vaccine::seed_vaccines(&database, &portal_config.vaccines).await?;
    if seeded > 0 {
        info!("Seeded {} vaccine(s) from configuration", seeded);
    }

    // 7. Run the command
    let ctx = PortalContext::new(database);
    cli::run(cli, &ctx, &credentials).await
}
