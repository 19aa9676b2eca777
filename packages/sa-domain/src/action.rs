use std::fmt;

use serde::{Deserialize, Serialize};

/// A label suggested for a chat message.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SmartAction(String);
impl SmartAction {
	pub fn new(label: impl Into<String>) -> Self {
		Self(label.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	pub fn into_string(self) -> String {
		self.0
	}
}
impl fmt::Display for SmartAction {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}
impl AsRef<str> for SmartAction {
	fn as_ref(&self) -> &str {
		&self.0
	}
}

/// Ordered known labels plus the sentinel returned when none of them applies.
#[derive(Clone, Debug)]
pub struct ActionSet {
	known: Vec<SmartAction>,
	not_recognised: SmartAction,
}
impl ActionSet {
	pub fn new<I, S>(known: I, not_recognised: impl Into<String>) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			known: known.into_iter().map(SmartAction::new).collect(),
			not_recognised: SmartAction::new(not_recognised),
		}
	}

	pub fn from_config(cfg: &sa_config::Actions) -> Self {
		Self::new(cfg.known.iter().cloned(), cfg.not_recognised.clone())
	}

	pub fn known(&self) -> &[SmartAction] {
		&self.known
	}

	pub fn not_recognised(&self) -> &SmartAction {
		&self.not_recognised
	}

	pub fn is_known(&self, label: &str) -> bool {
		self.known.iter().any(|action| action.as_str() == label)
	}

	pub fn is_not_recognised(&self, label: &str) -> bool {
		self.not_recognised.as_str() == label
	}

	/// Maps a raw label onto the set, returning `None` for anything outside it.
	pub fn resolve(&self, label: &str) -> Option<SmartAction> {
		let label = label.trim();

		if self.is_known(label) || self.is_not_recognised(label) {
			return Some(SmartAction::new(label));
		}

		None
	}
}
