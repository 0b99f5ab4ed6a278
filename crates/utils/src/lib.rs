#![warn(
	clippy::all,
	clippy::pedantic,
	clippy::correctness,
	clippy::perf,
	clippy::style,
	clippy::suspicious,
	clippy::complexity,
	clippy::nursery,
	clippy::unwrap_used,
	unused_qualifications,
	rust_2018_idioms,
	trivial_casts,
	trivial_numeric_casts,
	unused_allocation,
	clippy::dbg_macro,
	deprecated
)]
#![forbid(deprecated_in_future)]
#![allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]

pub mod error;

/// Replaces every occurrence of `${<token>}` in `template` with `value`.
#[must_use]
pub fn substitute(template: &str, token: &str, value: &str) -> String {
	template.replace(&format!("${{{token}}}"), value)
}

#[cfg(test)]
mod tests {
	use super::substitute;

	#[test]
	fn substitutes_every_occurrence() {
		assert_eq!(
			substitute("${plugin_name} / ${plugin_name}", "plugin_name", "Dataview"),
			"Dataview / Dataview"
		);
		assert_eq!(substitute("no token", "plugin_name", "x"), "no token");
	}
}
