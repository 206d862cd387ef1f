//! Core record types.

use crate::Record;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Domain stored for users whose email is missing or malformed.
pub const UNKNOWN_DOMAIN: &str = "<unknown>";

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Llm,
}

/// What a transaction was spent on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Context {
    Message,
    Title,
}

impl Context {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "message" => Some(Self::Message),
            "title" => Some(Self::Title),
            _ => None,
        }
    }
}

/// Token direction a transaction was priced at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PricingType {
    Completion,
    Prompt,
}

impl PricingType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "completion" => Some(Self::Completion),
            "prompt" => Some(Self::Prompt),
            _ => None,
        }
    }
}

/// A single chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub user_id: String,
    pub conversation_id: String,
    pub date: DateTime<Utc>,
    pub sender: Sender,
    pub endpoint: String,
    pub model: String,
}

/// A billing transaction. `token_count` and `usd_total` are positive
/// magnitudes even though the chat store books them as debits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub user_id: String,
    pub conversation_id: String,
    pub context: Context,
    pub date: DateTime<Utc>,
    pub model: String,
    pub pricing_type: PricingType,
    pub token_count: i64,
    pub usd_per_million: f64,
    pub usd_total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub user_id: String,
    pub date: DateTime<Utc>,
    pub endpoint: String,
    pub model: String,
}

/// A user account, reduced to the email domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub domain: String,
}

/// One row of the migration ledger. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrationRecord {
    pub id: String,
    pub apply_date: DateTime<Utc>,
}

impl Record for Message {
    const TABLE: &'static str = "message";
}

impl Record for Transaction {
    const TABLE: &'static str = "transaction";
}

impl Record for Conversation {
    const TABLE: &'static str = "conversation";
}

impl Record for User {
    const TABLE: &'static str = "user";
}

impl Record for MigrationRecord {
    const TABLE: &'static str = "migration";
}
