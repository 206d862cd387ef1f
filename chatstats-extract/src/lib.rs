//! Extraction of chatstats records from the chat store.
//!
//! Source documents are MongoDB extended JSON as written by `mongoexport`.
//! Mapping normalizes them into the flat records of `chatstats-model`:
//! ObjectIds become hex strings, debits become positive magnitudes, and
//! emails are reduced to their domain.

mod document;
mod error;
mod mapping;
mod source;

pub use document::Document;
pub use error::{ExtractError, ExtractResult};
pub use mapping::{guess_domain, map_conversation, map_message, map_transaction, map_user};
pub use source::{ExportDirSource, RecordSource};
