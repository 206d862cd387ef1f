//! Document-to-record mappings for each collection.

use crate::document::Document;
use crate::error::{ExtractError, ExtractResult};
use chatstats_model::{
    Context, Conversation, Message, PricingType, Sender, Transaction, UNKNOWN_DOMAIN, User,
};
use serde_json::Value;

/// Transactions book token value in millionths of a dollar, as a debit.
const TOKEN_VALUE_PER_USD: f64 = -1_000_000.0;

/// Email domain: the text after the first `@`, or [`UNKNOWN_DOMAIN`].
pub fn guess_domain(email: Option<&str>) -> String {
    email
        .filter(|e| !e.is_empty())
        .and_then(|e| e.split('@').nth(1))
        .map(str::to_string)
        .unwrap_or_else(|| UNKNOWN_DOMAIN.to_string())
}

pub fn map_message(value: &Value) -> ExtractResult<Message> {
    let doc = Document::new(value)?;
    let sender = if doc.boolean("isCreatedByUser")? {
        Sender::User
    } else {
        Sender::Llm
    };
    Ok(Message {
        id: doc.string("_id")?,
        user_id: doc.string("user")?,
        conversation_id: doc.string("conversationId")?,
        date: doc.timestamp("createdAt")?,
        sender,
        endpoint: doc.string_or_empty("endpoint")?,
        model: doc.string_or_empty("model")?,
    })
}

pub fn map_transaction(value: &Value) -> ExtractResult<Transaction> {
    let doc = Document::new(value)?;

    let context = doc.string("context")?;
    let context = Context::parse(&context).ok_or_else(|| ExtractError::UnknownValue {
        field: "context".to_string(),
        value: context.clone(),
    })?;
    let token_count = doc
        .integer("rawAmount")?
        .checked_neg()
        .ok_or_else(|| ExtractError::InvalidField {
            field: "rawAmount".to_string(),
            expected: "negatable integer",
        })?;
    let token_type = doc.string("tokenType")?;
    let pricing_type =
        PricingType::parse(&token_type).ok_or_else(|| ExtractError::UnknownValue {
            field: "tokenType".to_string(),
            value: token_type.clone(),
        })?;

    Ok(Transaction {
        id: doc.string("_id")?,
        user_id: doc.string("user")?,
        conversation_id: doc.string_or_empty("conversationId")?,
        context,
        date: doc.timestamp("createdAt")?,
        model: doc.string("model")?,
        pricing_type,
        token_count,
        usd_per_million: doc.float("rate")?,
        usd_total: doc.float("tokenValue")? / TOKEN_VALUE_PER_USD,
    })
}

pub fn map_conversation(value: &Value) -> ExtractResult<Conversation> {
    let doc = Document::new(value)?;
    Ok(Conversation {
        id: doc.string("_id")?,
        user_id: doc.string("user")?,
        date: doc.timestamp("createdAt")?,
        endpoint: doc.string("endpoint")?,
        model: doc.string("model")?,
    })
}

pub fn map_user(value: &Value) -> ExtractResult<User> {
    let doc = Document::new(value)?;
    Ok(User {
        id: doc.string("_id")?,
        created_at: doc.timestamp("createdAt")?,
        domain: guess_domain(doc.optional_str("email")),
    })
}
