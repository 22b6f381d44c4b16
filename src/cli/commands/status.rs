//! Status command implementation.
//!
//! Reports what the next index operation would use: the selected embedding
//! provider and whether it is reachable, the Joplin endpoint, and the state
//! of the snapshot for that provider. Nothing is built or written.

use std::path::Path;

use colored::Colorize;
use serde::Serialize;

use super::{Workspace, block_on};
use crate::config::env_var;
use crate::embeddings::{EmbeddingConfig, EmbeddingProviderType, create_provider, detect_available_providers};
use crate::error::{Error, Result};
use crate::index::CacheLoad;

#[derive(Serialize)]
struct StatusOutput {
    data_dir: String,
    config_exists: bool,
    provider: ProviderStatus,
    available_providers: Vec<EmbeddingProviderType>,
    joplin: JoplinStatus,
    snapshot: SnapshotStatus,
}

#[derive(Serialize)]
struct ProviderStatus {
    name: EmbeddingProviderType,
    model: String,
    dimensions: usize,
    available: bool,
}

#[derive(Serialize)]
struct JoplinStatus {
    endpoint: String,
    token_configured: bool,
}

#[derive(Serialize)]
struct SnapshotStatus {
    path: String,
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    entries: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

/// Execute `status`.
///
/// # Errors
///
/// Returns an error if the config file cannot be parsed.
pub fn execute(data_dir: Option<&Path>, json: bool) -> Result<()> {
    let workspace = Workspace::open(data_dir)?;
    let embedding = EmbeddingConfig::resolve(&workspace.config.embeddings, env_var);
    let provider = create_provider(&embedding);
    let info = provider.info();

    let detection = block_on(async { Ok::<_, Error>(detect_available_providers(&embedding).await) })?;
    let joplin = workspace.joplin();
    let cache = workspace.cache();

    let snapshot = match cache.load(info.provider) {
        CacheLoad::Valid(entries) => SnapshotStatus {
            path: cache.path().display().to_string(),
            valid: true,
            entries: Some(entries.len()),
            reason: None,
        },
        CacheLoad::Invalid(miss) => SnapshotStatus {
            path: cache.path().display().to_string(),
            valid: false,
            entries: None,
            reason: Some(miss.to_string()),
        },
    };

    let output = StatusOutput {
        data_dir: workspace.data_dir.display().to_string(),
        config_exists: workspace.config_path().exists(),
        provider: ProviderStatus {
            name: info.provider,
            model: info.model,
            dimensions: info.dimensions,
            available: detection.available.contains(&info.provider),
        },
        available_providers: detection.available,
        joplin: JoplinStatus {
            endpoint: joplin.endpoint().to_string(),
            token_configured: joplin.has_token(),
        },
        snapshot,
    };

    if json {
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    print_human(&output);
    Ok(())
}

fn mark(ok: bool) -> colored::ColoredString {
    if ok { "✓".green() } else { "✗".red() }
}

fn print_human(output: &StatusOutput) {
    println!("{}", "NoteChat Status".bold());
    println!();
    println!("Data dir:   {}", output.data_dir);
    if !output.config_exists {
        println!("            {}", "(no config.json, using defaults)".dimmed());
    }
    println!();

    let p = &output.provider;
    println!("{}", "Embedding Provider".cyan().bold());
    println!("  {} {} ({}, {} dims)", mark(p.available), p.name, p.model, p.dimensions);
    if !p.available {
        match p.name {
            EmbeddingProviderType::Ollama => {
                println!("    Start Ollama and run `ollama pull {}`", p.model);
            }
            EmbeddingProviderType::Openai => println!("    Set OPENAI_API_KEY"),
        }
    }
    println!();

    println!("{}", "Joplin".cyan().bold());
    println!("  Endpoint: {}", output.joplin.endpoint);
    println!("  {} token", mark(output.joplin.token_configured));
    println!();

    let s = &output.snapshot;
    println!("{}", "Index Snapshot".cyan().bold());
    println!("  Path: {}", s.path);
    match (s.entries, &s.reason) {
        (Some(n), _) => println!("  {} {n} notes", mark(true)),
        (None, Some(reason)) => {
            println!("  {} {reason}", mark(false));
            println!("    The next operation rebuilds the index; run `notechat reindex` to do it now.");
        }
        (None, None) => {}
    }
}
