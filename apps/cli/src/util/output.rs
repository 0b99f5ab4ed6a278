use std::io::{self, Write};

use anyhow::Result;
use serde::Serialize;

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
	let mut stdout = io::stdout().lock();
	serde_json::to_writer_pretty(&mut stdout, value)?;
	writeln!(stdout)?;
	Ok(())
}

/// First line of `text`, cut to `width` characters.
pub fn preview(text: &str, width: usize) -> String {
	let line = text.lines().next().unwrap_or_default();

	if line.chars().count() > width || text.lines().nth(1).is_some() {
		let cut = line.chars().take(width).collect::<String>();
		format!("{}…", cut.trim_end())
	} else {
		line.to_owned()
	}
}

#[cfg(test)]
mod tests {
	use super::preview;

	#[test]
	fn previews_are_single_short_lines() {
		assert_eq!(preview("short", 10), "short");
		assert_eq!(preview("a long line of text", 6), "a long…");
		assert_eq!(preview("first\nsecond", 20), "first…");
		assert_eq!(preview("", 5), "");
	}
}
