use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

/// A submitted chat message. Never mutated after construction.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Message {
	pub text: String,
	pub timestamp: String,
}
impl Message {
	pub fn new(text: impl Into<String>) -> Self {
		Self::at(text, OffsetDateTime::now_utc())
	}

	pub fn at(text: impl Into<String>, ts: OffsetDateTime) -> Self {
		let timestamp = ts.format(&Rfc3339).unwrap_or_else(|_| ts.unix_timestamp().to_string());

		Self { text: text.into(), timestamp }
	}
}
