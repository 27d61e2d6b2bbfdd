/// Fill in missing display names and profiles for existing accounts.
///
/// Users without a display name get a generated `user_xxxxxx` name, users
/// without a profile get one, and profiles with an empty display name take
/// the user's.
///
/// Run with: cargo run --bin backfill-display-names [--db-path <path>] [--dry-run]
use anyhow::{Context, Result};
use clap::Parser;
use rusqlite::{Connection, Transaction};
use uuid::Uuid;

use tripnote_server::auth::generate_display_name;
use tripnote_server::db::repositories::{ensure_profile_on, now_timestamp};

#[derive(Parser, Debug)]
#[command(name = "backfill-display-names")]
#[command(about = "Generate missing display names and profiles")]
struct Args {
    /// Path to the SQLite database file
    #[arg(short, long, env = "DATABASE_PATH", default_value = "tripnote.db")]
    db_path: String,

    /// Report what would change without writing
    #[arg(long)]
    dry_run: bool,
}

#[derive(Default, Debug, PartialEq, Eq)]
struct BackfillStats {
    names_generated: usize,
    profiles_created: usize,
    profiles_renamed: usize,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut conn = Connection::open(&args.db_path)
        .with_context(|| format!("Failed to open database: {}", args.db_path))?;

    let tx = conn.transaction().context("Failed to start transaction")?;
    let stats = backfill(&tx)?;
    if args.dry_run {
        tx.rollback().context("Failed to roll back dry run")?;
        println!("Dry run, nothing written");
    } else {
        tx.commit().context("Failed to commit transaction")?;
    }

    println!("Display names generated: {}", stats.names_generated);
    println!("Profiles created:        {}", stats.profiles_created);
    println!("Profiles renamed:        {}", stats.profiles_renamed);
    Ok(())
}

fn backfill(tx: &Transaction) -> Result<BackfillStats> {
    let mut stats = BackfillStats::default();
    let now = now_timestamp();

    let unnamed: Vec<String> = {
        let mut stmt = tx.prepare(
            "SELECT id FROM users WHERE display_name IS NULL OR TRIM(display_name) = ''",
        )?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        ids
    };
    for id in &unnamed {
        tx.execute(
            "UPDATE users SET display_name = ?, updated_at = ? WHERE id = ?",
            (generate_display_name(), &now, id),
        )
        .context("Failed to set display name")?;
        stats.names_generated += 1;
    }

    let missing: Vec<(String, Option<String>)> = {
        let mut stmt = tx.prepare(
            "SELECT u.id, u.display_name FROM users u
             WHERE NOT EXISTS (SELECT 1 FROM profiles p WHERE p.user_id = u.id)",
        )?;
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows
    };
    for (id, display_name) in &missing {
        let user_id =
            Uuid::parse_str(id).with_context(|| format!("Malformed user id in database: {id}"))?;
        if ensure_profile_on(tx, &user_id, display_name.as_deref())
            .context("Failed to create missing profile")?
        {
            stats.profiles_created += 1;
        }
    }

    stats.profiles_renamed = tx
        .execute(
            "UPDATE profiles SET
                display_name = (SELECT u.display_name FROM users u WHERE u.id = profiles.user_id),
                updated_at = ?
             WHERE display_name IS NULL OR TRIM(display_name) = ''",
            [&now],
        )
        .context("Failed to copy display names into profiles")?;

    Ok(stats)
}
