//! The type preamble becomes an explicit `type` field and the text moves to `desc`.

use indexmap::IndexMap;
use serde::Deserialize;

use crate::{annotation::Identifier, settings::lenient};

use super::{v1_6_0, CommonFields};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationType {
	Text,
	Html,
	#[default]
	Markdown,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Annotation {
	#[serde(default, deserialize_with = "lenient::or_none")]
	pub name: Option<String>,
	#[serde(rename = "type", default, deserialize_with = "lenient::or_none")]
	pub kind: Option<AnnotationType>,
	#[serde(default, deserialize_with = "lenient::or_none")]
	pub desc: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Settings {
	#[serde(default, deserialize_with = "lenient::entries")]
	pub annotations: Option<IndexMap<Identifier, Annotation>>,
	#[serde(flatten)]
	pub common: CommonFields,
	#[serde(default, deserialize_with = "lenient::or_none")]
	pub editable: Option<bool>,
}

impl Settings {
	/// Everything renders as Markdown from here on, so the type is dropped. The fields this
	/// hop introduces are left for the terminal merge to default.
	#[must_use]
	pub fn upgrade(self) -> v1_6_0::Settings {
		v1_6_0::Settings {
			annotations: self.annotations.map(|annotations| {
				annotations
					.into_iter()
					.map(|(id, Annotation { name, desc, .. })| {
						(id, v1_6_0::Annotation { name, desc })
					})
					.collect()
			}),
			common: self.common,
			editable: self.editable,
			automatic_remove: None,
			markdown_file_path: None,
			backups: None,
		}
	}
}
