//! The first, markerless format: a bare list of annotation texts.

use indexmap::IndexMap;
use serde::Deserialize;
use tracing::warn;

use crate::{annotation::Identifier, settings::lenient};

use super::{v1_3_0, CommonFields};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Settings {
	#[serde(deserialize_with = "lenient::positional")]
	pub annotations: Vec<Option<String>>,
}

/// Identifier standing in for the subject of the list entry at `position`.
///
/// Only stable for as long as the legacy list keeps its order, which nothing guarantees.
#[must_use]
pub fn placeholder_identifier(position: usize) -> Identifier {
	Identifier::from(format!("unidentified-annotation-{}", position + 1))
}

impl Settings {
	/// Lossy: the subjects of these annotations were never recorded.
	#[must_use]
	pub fn upgrade(self) -> v1_3_0::Settings {
		let annotations = self
			.annotations
			.into_iter()
			.enumerate()
			.filter_map(|(position, text)| {
				text.filter(|text| !text.trim().is_empty())
					.map(|text| (placeholder_identifier(position), text))
			})
			.collect::<IndexMap<_, _>>();

		if !annotations.is_empty() {
			warn!(
				count = annotations.len(),
				"Legacy annotations have no identifiers, assigning positional placeholders"
			);
		}

		v1_3_0::Settings {
			annotations: Some(annotations),
			common: CommonFields::default(),
		}
	}
}
