//! Quest Chronicles command-line game.
//!
//! Plays the game over a plain line protocol on stdin/stdout:
//!
//! ```bash
//! cargo run -p chronicles -- --name "Thorin" --class warrior
//! ```

mod headless;

use anyhow::Result;
use chronicles_core::SessionConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return Ok(());
    }

    let config = headless::parse_config_from_args(&args, SessionConfig::from_env())?;
    headless::run_headless(config).await
}

fn print_help() {
    println!("Quest Chronicles");
    println!();
    println!("USAGE:");
    println!("    chronicles [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    --name <NAME>        Name of a new character (default: Adventurer)");
    println!("    --class <CLASS>      warrior, mage, rogue or cleric (default: warrior)");
    println!("    --load <NAME>        Resume a saved character");
    println!("    --seed <SEED>        Seed the dice for a reproducible game");
    println!("    --catalog <PATH>     Item catalog file (created with defaults if missing)");
    println!("    --quests <PATH>      Quest data file (created with defaults if missing)");
    println!("    --save-dir <DIR>     Directory for character saves (default: saves)");
    println!("    -h, --help           Show this help");
    println!();
    println!("ENVIRONMENT:");
    println!("    CHRONICLES_SAVE_DIR, CHRONICLES_CATALOG, CHRONICLES_QUESTS,");
    println!("    CHRONICLES_SEED, CHRONICLES_REVIVE_COST   Defaults for the options above");
    println!("    RUST_LOG                 Log filter for stderr (default: info)");
    println!();
    println!("Once running, type #help for the list of commands.");
}
