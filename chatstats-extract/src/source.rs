//! Record sources.

use crate::document::Document;
use crate::error::{ExtractError, ExtractResult};
use crate::mapping::{map_conversation, map_message, map_transaction, map_user};
use chatstats_model::{Conversation, Message, Transaction, User};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Supplies every record of a kind created at or after a cutoff.
pub trait RecordSource {
    fn messages_since(&self, cutoff: DateTime<Utc>) -> ExtractResult<Vec<Message>>;
    fn transactions_since(&self, cutoff: DateTime<Utc>) -> ExtractResult<Vec<Transaction>>;
    fn conversations_since(&self, cutoff: DateTime<Utc>) -> ExtractResult<Vec<Conversation>>;
    fn users_since(&self, cutoff: DateTime<Utc>) -> ExtractResult<Vec<User>>;
}

/// Reads `mongoexport` output: one extended-JSON document per line, one
/// file per collection (`messages.json`, `transactions.json`, ...).
#[derive(Debug, Clone)]
pub struct ExportDirSource {
    dir: PathBuf,
}

impl ExportDirSource {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }

    pub fn collection_path(&self, collection: &str) -> PathBuf {
        self.dir.join(format!("{collection}.json"))
    }

    /// Map every document of `collection` whose `createdAt` is at or after
    /// `cutoff`. Documents without `createdAt` never match.
    fn collection_since<T>(
        &self,
        collection: &str,
        cutoff: DateTime<Utc>,
        map: fn(&Value) -> ExtractResult<T>,
    ) -> ExtractResult<Vec<T>> {
        let path = self.collection_path(collection);
        let file = File::open(&path).map_err(|source| ExtractError::Io {
            path: path.clone(),
            source,
        })?;

        let mut records = Vec::new();
        let mut scanned = 0usize;
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line_no = index + 1;
            let line = line.map_err(|source| ExtractError::Io {
                path: path.clone(),
                source,
            })?;
            if line.trim().is_empty() {
                continue;
            }
            scanned += 1;

            let value: Value =
                serde_json::from_str(&line).map_err(|source| ExtractError::Json {
                    path: path.clone(),
                    line: line_no,
                    source,
                })?;
            let in_window = Document::new(&value)
                .and_then(|doc| doc.optional_timestamp("createdAt"))
                .map(|created| created.is_some_and(|ts| ts >= cutoff));
            let wrap = |source: ExtractError| ExtractError::Document {
                path: path.clone(),
                line: line_no,
                source: Box::new(source),
            };

            if in_window.map_err(wrap)? {
                records.push(map(&value).map_err(wrap)?);
            }
        }

        debug!(collection, scanned, selected = records.len(), "collection read");
        Ok(records)
    }
}

impl RecordSource for ExportDirSource {
    fn messages_since(&self, cutoff: DateTime<Utc>) -> ExtractResult<Vec<Message>> {
        self.collection_since("messages", cutoff, map_message)
    }

    fn transactions_since(&self, cutoff: DateTime<Utc>) -> ExtractResult<Vec<Transaction>> {
        self.collection_since("transactions", cutoff, map_transaction)
    }

    fn conversations_since(&self, cutoff: DateTime<Utc>) -> ExtractResult<Vec<Conversation>> {
        self.collection_since("conversations", cutoff, map_conversation)
    }

    fn users_since(&self, cutoff: DateTime<Utc>) -> ExtractResult<Vec<User>> {
        self.collection_since("users", cutoff, map_user)
    }
}
