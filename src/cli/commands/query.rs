//! Query command implementation.

use std::path::Path;

use colored::Colorize;
use serde::Serialize;

use super::{Workspace, block_on};
use crate::error::{Error, Result};
use crate::index::ScoredEntry;

/// Characters of note text shown per result in human output.
const PREVIEW_CHARS: usize = 160;

#[derive(Serialize)]
struct QueryOutput<'a> {
    query: &'a str,
    k: usize,
    results: Vec<ScoredEntry>,
}

/// Execute `query <TEXT> [-k N]`.
///
/// # Errors
///
/// Returns an error for an empty query, or if the index cannot be built or
/// the query cannot be embedded.
pub fn execute(text: &str, k: usize, data_dir: Option<&Path>, json: bool) -> Result<()> {
    if text.trim().is_empty() {
        return Err(Error::InvalidArgument("query text cannot be empty".into()));
    }

    let workspace = Workspace::open(data_dir)?;
    let service = workspace.service();

    let results = block_on(service.query_with_scores(text, k))?;

    if json {
        let output = QueryOutput { query: text, k, results };
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    if results.is_empty() {
        println!("No matching notes.");
        return Ok(());
    }

    for (rank, result) in results.iter().enumerate() {
        let (heading, body) = result.text.split_once("\n\n").unwrap_or((result.text.as_str(), ""));
        println!(
            "{} {} {}",
            format!("{}.", rank + 1).dimmed(),
            heading.bold(),
            format!("[{:.3}]", result.score).cyan()
        );
        println!("   {}", result.id.dimmed());
        let preview = preview(body);
        if !preview.is_empty() {
            println!("   {preview}");
        }
        println!();
    }
    Ok(())
}

/// First `PREVIEW_CHARS` characters of the body on one line.
fn preview(body: &str) -> String {
    let flat = body.split_whitespace().collect::<Vec<_>>().join(" ");
    let short = crate::embeddings::provider::truncate_chars(&flat, PREVIEW_CHARS);
    if short.len() < flat.len() {
        format!("{short}…")
    } else {
        short.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_flattens_and_truncates() {
        assert_eq!(preview("one\n two\tthree"), "one two three");
        let long = "word ".repeat(100);
        let p = preview(&long);
        assert!(p.ends_with('…'));
        assert_eq!(p.chars().count(), PREVIEW_CHARS + 1);
    }

    #[test]
    fn test_empty_query_rejected() {
        let err = execute("   ", 5, None, true).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert_eq!(err.exit_code(), 4);
    }
}
