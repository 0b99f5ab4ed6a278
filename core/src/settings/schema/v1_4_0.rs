//! Annotations become records, with the text in `anno` and an optional type preamble inside it.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::{annotation::Identifier, settings::lenient};

use super::{
	v1_5_0::{self, AnnotationType},
	CommonFields,
};

/// `html:`, `markdown:` or `text:` at the very start of the text, in any case.
static PREAMBLE: Lazy<Regex> = Lazy::new(|| {
	Regex::new(r"(?i)^\s*(html|markdown|text):\s*").expect("preamble regex is valid")
});

/// Template token the v1.4.0 renderer removed from `markdown:` annotations.
const LEGACY_LABEL_TOKEN: &str = "${label}";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Annotation {
	#[serde(default, deserialize_with = "lenient::or_none")]
	pub name: Option<String>,
	#[serde(default, deserialize_with = "lenient::or_none")]
	pub anno: Option<String>,
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

/// Splits a v1.4.0 annotation into its type and its body.
///
/// With a preamble the body is whatever follows it, trimmed. Without one the text is Markdown and
/// is kept as is.
#[must_use]
pub fn split_preamble(anno: &str) -> (AnnotationType, String) {
	let Some(captures) = PREAMBLE.captures(anno) else {
		return (AnnotationType::Markdown, anno.to_owned());
	};

	let body = captures
		.get(0)
		.map_or(anno, |preamble| &anno[preamble.end()..]);

	match captures[1].to_ascii_lowercase().as_str() {
		"html" => (AnnotationType::Html, body.trim().to_owned()),
		"text" => (AnnotationType::Text, body.trim().to_owned()),
		_ => (
			AnnotationType::Markdown,
			body.replace(LEGACY_LABEL_TOKEN, "").trim().to_owned(),
		),
	}
}

impl Settings {
	#[must_use]
	pub fn upgrade(self) -> v1_5_0::Settings {
		v1_5_0::Settings {
			annotations: self.annotations.map(|annotations| {
				annotations
					.into_iter()
					.map(|(id, Annotation { name, anno })| {
						let (kind, desc) = anno
							.as_deref()
							.map(split_preamble)
							.map_or((None, None), |(kind, desc)| (Some(kind), Some(desc)));

						(id, v1_5_0::Annotation { name, kind, desc })
					})
					.collect()
			}),
			common: self.common,
			editable: self.editable,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	use serde_json::json;

	#[test]
	fn preambles() {
		assert_eq!(
			split_preamble("html: <b>bold</b> "),
			(AnnotationType::Html, "<b>bold</b>".to_owned())
		);
		assert_eq!(
			split_preamble("TEXT:plain"),
			(AnnotationType::Text, "plain".to_owned())
		);
		assert_eq!(
			split_preamble("Markdown:\n  # title\n"),
			(AnnotationType::Markdown, "# title".to_owned())
		);
		assert_eq!(
			split_preamble("no preamble here "),
			(AnnotationType::Markdown, "no preamble here ".to_owned())
		);
		assert_eq!(
			split_preamble("note: html: is not at the start"),
			(
				AnnotationType::Markdown,
				"note: html: is not at the start".to_owned()
			)
		);
	}

	#[test]
	fn label_token_is_only_stripped_from_markdown_preambles() {
		assert_eq!(
			split_preamble("markdown:${label} **keep**"),
			(AnnotationType::Markdown, "**keep**".to_owned())
		);
		assert_eq!(
			split_preamble("text: ${label} stays"),
			(AnnotationType::Text, "${label} stays".to_owned())
		);
		assert_eq!(
			split_preamble("${label} stays too"),
			(AnnotationType::Markdown, "${label} stays too".to_owned())
		);
	}

	#[test]
	fn upgrade_keeps_names_and_options() {
		let settings: Settings = serde_json::from_value(json!({
			"annotations": {
				"dataview": { "name": "Dataview", "anno": "html:<i>x</i>" },
				"nameless": { "anno": "plain" }
			},
			"editable": false
		}))
		.unwrap();

		let upgraded = settings.upgrade();
		let annotations = upgraded.annotations.unwrap();

		assert_eq!(
			annotations["dataview"],
			v1_5_0::Annotation {
				name: Some("Dataview".to_owned()),
				kind: Some(AnnotationType::Html),
				desc: Some("<i>x</i>".to_owned()),
			}
		);
		assert_eq!(annotations["nameless"].name, None);
		assert_eq!(upgraded.editable, Some(false));
	}
}
