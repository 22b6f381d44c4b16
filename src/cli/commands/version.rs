//! Version command implementation.

use crate::embeddings::MAX_EMBED_CHARS;
use crate::error::Result;
use crate::index::DEFAULT_PAGE_SIZE;
use serde::Serialize;

#[derive(Serialize)]
struct VersionOutput<'a> {
    version: &'a str,
    build: &'a str,
    max_embed_chars: usize,
    default_page_size: usize,
}

/// Execute the version command.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn execute(json: bool) -> Result<()> {
    let version = env!("CARGO_PKG_VERSION");
    let build = if cfg!(debug_assertions) {
        "dev"
    } else {
        "release"
    };

    if json {
        let output = VersionOutput {
            version,
            build,
            max_embed_chars: MAX_EMBED_CHARS,
            default_page_size: DEFAULT_PAGE_SIZE,
        };
        let payload = serde_json::to_string(&output)?;
        println!("{payload}");
        return Ok(());
    }

    println!("notechat version {version} ({build})");
    Ok(())
}
