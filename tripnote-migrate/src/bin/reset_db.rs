/// Drop every Tripnote table and recreate the empty schema.
///
/// Run with: cargo run --bin reset-db -- --db-path tripnote.db --yes
use anyhow::{bail, Context, Result};
use clap::Parser;

use tripnote_server::db::Database;

#[derive(Parser, Debug)]
#[command(name = "reset-db")]
#[command(about = "Drop all tables and recreate the schema")]
struct Args {
    /// Path to the SQLite database file
    #[arg(short, long, env = "DATABASE_PATH", default_value = "tripnote.db")]
    db_path: String,

    /// Required; every row in the database is deleted
    #[arg(long)]
    yes: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    if !args.yes {
        bail!("Refusing to reset {} without --yes", args.db_path);
    }

    let db = Database::new(&args.db_path)
        .with_context(|| format!("Failed to open database: {}", args.db_path))?;
    db.reset()?;

    println!("Database {} reset to an empty schema", args.db_path);
    Ok(())
}
