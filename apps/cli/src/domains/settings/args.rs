use std::path::PathBuf;

use clap::Args;
use pa_core::Settings;

#[derive(Args, Debug)]
pub struct SettingsExportArgs {
	/// File to write to, standard output when omitted
	pub path: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct SettingsImportArgs {
	/// Exported settings, or a settings file from any earlier version
	pub path: PathBuf,

	/// Also replace the backups with the ones in the file
	#[arg(long, default_value_t = false)]
	pub restore_backups: bool,
}

#[derive(Args, Debug, Default)]
pub struct SettingsSetArgs {
	/// Hide the placeholder text of empty annotations
	#[arg(long)]
	pub hide_placeholders: Option<bool>,

	/// Clear the placeholder text when an empty annotation gets focus
	#[arg(long)]
	pub delete_placeholder_on_insertion: Option<bool>,

	/// Allow editing annotations
	#[arg(long)]
	pub editable: Option<bool>,

	/// Remove annotations of uninstalled plugins as soon as they are noticed
	#[arg(long)]
	pub automatic_remove: Option<bool>,

	/// Markdown mirror of the annotations, an empty value disables it
	#[arg(long)]
	pub markdown_file: Option<String>,

	/// Label shown on mobile, `${plugin_name}` is replaced by the plugin's name
	#[arg(long)]
	pub label_mobile: Option<String>,

	/// Label shown on desktop, `${plugin_name}` is replaced by the plugin's name
	#[arg(long)]
	pub label_desktop: Option<String>,

	/// Placeholder of empty annotations, `${plugin_name}` is replaced by the plugin's name
	#[arg(long)]
	pub label_placeholder: Option<String>,
}

impl SettingsSetArgs {
	pub fn is_empty(&self) -> bool {
		self.hide_placeholders.is_none()
			&& self.delete_placeholder_on_insertion.is_none()
			&& self.editable.is_none()
			&& self.automatic_remove.is_none()
			&& self.markdown_file.is_none()
			&& self.label_mobile.is_none()
			&& self.label_desktop.is_none()
			&& self.label_placeholder.is_none()
	}

	pub fn apply(self, settings: &mut Settings) {
		let Self {
			hide_placeholders,
			delete_placeholder_on_insertion,
			editable,
			automatic_remove,
			markdown_file,
			label_mobile,
			label_desktop,
			label_placeholder,
		} = self;

		if let Some(hide_placeholders) = hide_placeholders {
			settings.hide_placeholders = hide_placeholders;
		}
		if let Some(delete) = delete_placeholder_on_insertion {
			settings.delete_placeholder_string_on_insertion = delete;
		}
		if let Some(editable) = editable {
			settings.editable = editable;
		}
		if let Some(automatic_remove) = automatic_remove {
			settings.automatic_remove = automatic_remove;
		}
		if let Some(markdown_file) = markdown_file {
			settings.markdown_file_path = markdown_file;
		}
		if let Some(label) = label_mobile {
			settings.label_mobile = label;
		}
		if let Some(label) = label_desktop {
			settings.label_desktop = label;
		}
		if let Some(label) = label_placeholder {
			settings.label_placeholder = label;
		}
	}
}
