//! Editing state of a single annotation field.
//!
//! The UI layer feeds focus, input and blur events in; a blur hands back a [`Commit`] for the
//! store to apply. A field shows either the placeholder, the text being edited, or the saved text,
//! and an emptied field always goes back to the placeholder instead of storing an empty note.

use crate::{
	annotation::{Annotation, Identifier},
	settings::Settings,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditState {
	Placeholder,
	Editing,
	Saved,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditEvent {
	Focus,
	Input(String),
	Blur,
}

/// What a finished edit means for the stored annotations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Commit {
	Upsert(Annotation),
	Remove,
	Unchanged,
}

#[derive(Debug, Clone)]
pub struct AnnotationEditor {
	id: Identifier,
	name: String,
	state: EditState,
	text: String,
	placeholder: String,
	from_placeholder: bool,
}

impl AnnotationEditor {
	pub fn new(id: Identifier, name: impl Into<String>, settings: &Settings) -> Self {
		let name = name.into();
		let placeholder = settings.placeholder(&name);

		let (state, text) = match settings.annotations.get(&id) {
			Some(annotation) => (EditState::Saved, annotation.desc.clone()),
			None => (EditState::Placeholder, placeholder.clone()),
		};

		Self {
			id,
			name,
			state,
			text,
			placeholder,
			from_placeholder: false,
		}
	}

	#[must_use]
	pub const fn id(&self) -> &Identifier {
		&self.id
	}

	#[must_use]
	pub const fn state(&self) -> EditState {
		self.state
	}

	/// What the field shows right now.
	#[must_use]
	pub fn display_text(&self, settings: &Settings) -> &str {
		if self.state == EditState::Placeholder && settings.hide_placeholders {
			""
		} else {
			&self.text
		}
	}

	/// Feeds one UI event. Only a blur that ends an edit produces a [`Commit`]; every event is
	/// ignored while the settings aren't editable.
	pub fn handle(&mut self, event: EditEvent, settings: &Settings) -> Option<Commit> {
		if !settings.editable {
			return None;
		}

		match event {
			EditEvent::Focus => {
				self.focus(settings);
				None
			}
			EditEvent::Input(text) => {
				self.focus(settings);
				self.text = text;
				None
			}
			EditEvent::Blur if self.state == EditState::Editing => Some(self.blur()),
			EditEvent::Blur => None,
		}
	}

	fn focus(&mut self, settings: &Settings) {
		match self.state {
			EditState::Placeholder => {
				self.from_placeholder = true;
				if settings.delete_placeholder_string_on_insertion || settings.hide_placeholders {
					self.text.clear();
				}
			}
			EditState::Saved => self.from_placeholder = false,
			EditState::Editing => return,
		}

		self.state = EditState::Editing;
	}

	fn blur(&mut self) -> Commit {
		let untouched_placeholder = self.from_placeholder && self.text == self.placeholder;

		if self.text.trim().is_empty() || untouched_placeholder {
			self.state = EditState::Placeholder;
			self.text.clone_from(&self.placeholder);

			if self.from_placeholder {
				Commit::Unchanged
			} else {
				Commit::Remove
			}
		} else {
			self.state = EditState::Saved;
			Commit::Upsert(Annotation::new(self.name.clone(), self.text.clone()))
		}
	}
}
