//! NoteChat - semantic retrieval index over a Joplin note corpus
//!
//! Keeps an embedding index of every note consistent with the corpus as
//! notes are created, edited and deleted, and answers top-k similarity
//! queries against it.
//!
//! # Architecture
//!
//! - [`index`] - vector store, snapshot cache, and the `IndexService` entry point
//! - [`embeddings`] - embedding providers (Ollama, OpenAI) and vector math
//! - [`corpus`] - note source trait and the Joplin Data API client
//! - [`config`] - data directory and config file
//! - [`cli`] - command-line interface using clap
//! - [`error`] - error types and handling

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod corpus;
pub mod embeddings;
pub mod error;
pub mod index;

pub use error::{Error, Result};
