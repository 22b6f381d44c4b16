//! Index maintenance commands: `reindex`, `sync`, `upsert`, `clear`.

use std::path::Path;

use colored::Colorize;
use serde::Serialize;

use super::{Workspace, block_on};
use crate::error::Result;
use crate::index::{ReindexOutcome, SyncReport, UpsertOutcome};

#[derive(Serialize)]
struct UpsertOutput<'a> {
    id: &'a str,
    outcome: UpsertOutcome,
}

#[derive(Serialize)]
struct ClearOutput {
    path: String,
    removed: bool,
}

/// Execute `reindex [--force]`.
///
/// # Errors
///
/// Returns an error if the corpus or embedding provider fails, or the
/// snapshot cannot be written.
pub fn execute_reindex(force: bool, data_dir: Option<&Path>, json: bool) -> Result<()> {
    let workspace = Workspace::open(data_dir)?;
    let service = workspace.service();

    let outcome = block_on(async {
        if force {
            service.rebuild().await
        } else {
            service.reindex_all().await
        }
    })?;

    if json {
        println!("{}", serde_json::to_string(&outcome)?);
        return Ok(());
    }

    match outcome {
        ReindexOutcome::LoadedCache { entries } => {
            println!("{} {entries} notes from snapshot", "Loaded".green().bold());
        }
        ReindexOutcome::Rebuilt { entries, pages } => {
            println!("{} {entries} notes ({pages} pages)", "Indexed".green().bold());
        }
    }
    println!("  {}", service.cache_path().display().to_string().dimmed());
    Ok(())
}

/// Execute `sync`.
///
/// # Errors
///
/// Returns an error if the scan, a note fetch, or embedding fails.
pub fn execute_sync(data_dir: Option<&Path>, json: bool) -> Result<()> {
    let workspace = Workspace::open(data_dir)?;
    let service = workspace.service();

    let report: SyncReport = block_on(service.sync_index())?;

    if json {
        println!("{}", serde_json::to_string(&report)?);
        return Ok(());
    }

    if report.rebuilt {
        println!(
            "{} embedding provider changed, rebuilt {} notes",
            "Rebuilt:".yellow().bold(),
            report.total
        );
    } else {
        println!(
            "{} {} updated, {} pruned, {} total",
            "Synced:".green().bold(),
            report.updated,
            report.pruned,
            report.total
        );
    }
    Ok(())
}

/// Execute `upsert <ID>`.
///
/// # Errors
///
/// Returns `Error::NoteNotFound` if Joplin has no such note.
pub fn execute_upsert(id: &str, data_dir: Option<&Path>, json: bool) -> Result<()> {
    let workspace = Workspace::open(data_dir)?;
    let service = workspace.service();

    let outcome = block_on(service.upsert_note(id))?;

    if json {
        println!("{}", serde_json::to_string(&UpsertOutput { id, outcome })?);
        return Ok(());
    }

    let verb = match outcome {
        UpsertOutcome::Inserted => "Inserted",
        UpsertOutcome::Replaced => "Updated",
        UpsertOutcome::Rebuilt => "Rebuilt index including",
    };
    println!("{} {}", verb.green().bold(), id.bold());
    Ok(())
}

/// Execute `clear`: remove the index snapshot.
///
/// # Errors
///
/// Returns an error if the snapshot exists but cannot be removed.
pub fn execute_clear(data_dir: Option<&Path>, json: bool) -> Result<()> {
    let workspace = Workspace::open(data_dir)?;
    let cache = workspace.cache();

    let removed = cache.exists();
    cache.delete()?;

    if json {
        let output = ClearOutput {
            path: cache.path().display().to_string(),
            removed,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else if removed {
        println!("{} {}", "Removed".green().bold(), cache.path().display());
    } else {
        println!("No snapshot at {}", cache.path().display());
    }
    Ok(())
}
