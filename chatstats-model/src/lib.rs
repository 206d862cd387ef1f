//! Record model for the chatstats warehouse.
//!
//! Every type here is an immutable, flat value copied from the chat store.
//! Records serialize to JSON objects whose keys are the warehouse column
//! names, which is the row format the upsert path consumes.

mod types;

pub use types::{
    Context, Conversation, Message, MigrationRecord, PricingType, Sender, Transaction, User,
    UNKNOWN_DOMAIN,
};

use serde::Serialize;

/// A value that lives in a warehouse table keyed by a unique `id` column.
pub trait Record: Serialize {
    /// Name of the table the record is merged into.
    const TABLE: &'static str;
}
