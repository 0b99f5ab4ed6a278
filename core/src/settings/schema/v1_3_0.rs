//! First keyed schema: identifier to plain annotation text.

use indexmap::IndexMap;
use serde::Deserialize;

use crate::{
	annotation::{Identifier, UNKNOWN_NAME},
	settings::{lenient, migrate::NameSource},
};

use super::{v1_4_0, CommonFields};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Settings {
	#[serde(default, deserialize_with = "lenient::entries")]
	pub annotations: Option<IndexMap<Identifier, String>>,
	#[serde(flatten)]
	pub common: CommonFields,
}

impl Settings {
	/// Names were never stored, so they come from `names` or fall back to [`UNKNOWN_NAME`].
	#[must_use]
	pub fn upgrade(self, names: &dyn NameSource) -> v1_4_0::Settings {
		v1_4_0::Settings {
			annotations: self.annotations.map(|annotations| {
				annotations
					.into_iter()
					.map(|(id, anno)| {
						let name = names
							.display_name(&id)
							.unwrap_or_else(|| UNKNOWN_NAME.to_owned());

						(
							id,
							v1_4_0::Annotation {
								name: Some(name),
								anno: Some(anno),
							},
						)
					})
					.collect()
			}),
			common: self.common,
			editable: None,
		}
	}
}
