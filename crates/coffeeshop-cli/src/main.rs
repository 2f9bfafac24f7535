use clap::{Parser, Subcommand};
use coffeeshop_config::DatabaseConfig;
use coffeeshop_db::{PgPool, init_db_pool, reset_drinks, run_migrations};
use dialoguer::Confirm;
use dotenvy::dotenv;

#[derive(Parser)]
#[command(name = "coffeeshop-cli")]
#[command(about = "Coffee Shop CLI - Database administration for the Coffee Shop API", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending schema migrations
    Migrate,
    /// Delete every drink and seed the default one
    ResetDb {
        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    let cli = Cli::parse();

    let Some(config) = DatabaseConfig::from_env() else {
        eprintln!("❌ DATABASE_URL must be set");
        std::process::exit(1);
    };

    let pool = match init_db_pool(&config).await {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("❌ Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };

    match cli.command {
        Commands::Migrate => handle_migrate(&pool).await,
        Commands::ResetDb { yes } => handle_reset_db(&pool, yes).await,
    }
}

async fn handle_migrate(pool: &PgPool) {
    match run_migrations(pool).await {
        Ok(()) => println!("✅ Migrations applied"),
        Err(e) => {
            eprintln!("❌ Error applying migrations: {}", e);
            std::process::exit(1);
        }
    }
}

async fn handle_reset_db(pool: &PgPool, yes: bool) {
    if !yes {
        let confirmed = Confirm::new()
            .with_prompt("This deletes every drink. Continue?")
            .default(false)
            .interact()
            .unwrap_or(false);

        if !confirmed {
            println!("Aborted.");
            return;
        }
    }

    match reset_drinks(pool).await {
        Ok(id) => {
            println!("\n✅ Drinks table reset");
            println!("   Seeded drink id: {}", id);
        }
        Err(e) => {
            eprintln!("\n❌ Error resetting drinks: {}", e);
            std::process::exit(1);
        }
    }
}
