//! Everything that leaves the store as something other than the settings file itself.

use serde_json::Value;

use crate::{annotation::AnnotationSet, error::Error, settings::Settings};

pub const MARKDOWN_TITLE: &str = "# Plugin annotations";

/// Pretty JSON of the settings, without backups.
pub fn export(settings: &Settings) -> Result<Vec<u8>, serde_json::Error> {
	serde_json::to_vec_pretty(&settings.snapshot())
}

/// Parses an export (or any old settings file) for [`crate::settings::import_onto`].
pub fn parse_import(bytes: &[u8]) -> Result<Value, Error> {
	serde_json::from_slice(bytes).map_err(Into::into)
}

/// Markdown mirror of the annotations, one section per identifier in insertion order.
#[must_use]
pub fn render_markdown(annotations: &AnnotationSet) -> String {
	let sections = annotations
		.iter()
		.map(|(id, annotation)| {
			format!(
				"## {}\n<!-- id: {id} -->\n\n{}\n",
				annotation.name,
				annotation.desc.trim_end()
			)
		})
		.collect::<Vec<_>>();

	if sections.is_empty() {
		format!("{MARKDOWN_TITLE}\n")
	} else {
		format!("{MARKDOWN_TITLE}\n\n{}", sections.join("\n"))
	}
}
