//! Annotation data: the identifier naming a subject and the note attached to it.

use std::{borrow::Borrow, fmt};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Display name used when no name can be recovered for an identifier.
pub const UNKNOWN_NAME: &str = "Unknown";

/// Opaque key naming the subject of an annotation (a plugin id).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identifier(String);

impl Identifier {
	#[must_use]
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for Identifier {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<String> for Identifier {
	fn from(id: String) -> Self {
		Self(id)
	}
}

impl From<&str> for Identifier {
	fn from(id: &str) -> Self {
		Self(id.to_owned())
	}
}

impl Borrow<str> for Identifier {
	fn borrow(&self) -> &str {
		&self.0
	}
}

/// A user-authored note about one subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
	/// Display label captured when the annotation was written; may go stale.
	pub name: String,
	/// Free-form Markdown-flavored text.
	pub desc: String,
}

impl Annotation {
	pub fn new(name: impl Into<String>, desc: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			desc: desc.into(),
		}
	}

	/// An annotation with nothing to say is not stored at all.
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.desc.trim().is_empty()
	}
}

/// Annotations keyed by identifier, in insertion order.
pub type AnnotationSet = IndexMap<Identifier, Annotation>;
