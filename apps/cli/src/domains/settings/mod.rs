mod args;

use std::io::{self, Write};

use anyhow::{bail, Context as _, Result};
use clap::Subcommand;
use pa_core::{LoadOutcome, ResetReason, SchemaVersion, Settings};
use serde::Serialize;
use tokio::fs;

use crate::{context::Context, util::prelude::*};

use self::args::*;

#[derive(Subcommand, Debug)]
pub enum SettingsCmd {
	/// Show the current settings
	Show,
	/// Write the settings file back in the latest format
	Migrate {
		/// Replace an unreadable settings file with the defaults
		#[arg(long, default_value_t = false)]
		overwrite_unreadable: bool,
	},
	/// Export the settings, without backups
	Export(SettingsExportArgs),
	/// Import exported settings on top of the current ones
	Import(SettingsImportArgs),
	/// Change one or more options
	Set(SettingsSetArgs),
}

#[derive(Serialize)]
struct MigrateOutput {
	from: Option<SchemaVersion>,
	to: SchemaVersion,
	written: bool,
}

pub async fn run(ctx: &Context, cmd: SettingsCmd) -> Result<()> {
	match cmd {
		SettingsCmd::Show => {
			let settings = ctx.store.get().await;

			print_output!(ctx, &settings.snapshot(), |_| {
				print_settings(ctx, &settings);
			});
		}

		SettingsCmd::Migrate {
			overwrite_unreadable,
		} => {
			let from = match &ctx.outcome {
				LoadOutcome::Upgraded { from } => Some(*from),
				LoadOutcome::Reset { .. } if !overwrite_unreadable => bail!(
					"Settings file is {}, pass --overwrite-unreadable to replace it",
					describe(&ctx.outcome)
				),
				_ => None,
			};

			let written = from.is_some() || overwrite_unreadable;
			if written {
				ctx.store.save().await?;
			}

			let out = MigrateOutput {
				from,
				to: SchemaVersion::LATEST,
				written,
			};

			print_output!(ctx, &out, |o: &MigrateOutput| {
				match o.from {
					Some(from) => println!("Migrated settings from {from} to {}", o.to),
					None if o.written => println!("Replaced settings with the defaults"),
					None => println!("Settings are {}", describe(&ctx.outcome)),
				}
			});
		}

		SettingsCmd::Export(args) => {
			let bytes = ctx.store.export().await?;

			match args.path {
				Some(path) => {
					fs::write(&path, &bytes)
						.await
						.with_context(|| format!("Failed to write '{}'", path.display()))?;
					println!("Exported settings to {}", path.display());
				}
				None => {
					let mut stdout = io::stdout().lock();
					stdout.write_all(&bytes)?;
					writeln!(stdout)?;
				}
			}
		}

		SettingsCmd::Import(args) => {
			let bytes = fs::read(&args.path)
				.await
				.with_context(|| format!("Failed to read '{}'", args.path.display()))?;

			let settings = ctx
				.store
				.import(&bytes, args.restore_backups, &ctx.plugins)
				.await
				.with_context(|| format!("Failed to import '{}'", args.path.display()))?;

			print_output!(ctx, &settings.snapshot(), |_| {
				println!(
					"Imported {} annotations ({} backups kept)",
					settings.annotations.len(),
					settings.backups.len()
				);
			});
		}

		SettingsCmd::Set(args) => {
			if args.is_empty() {
				bail!("Nothing to change, see --help for the available options");
			}

			let settings = ctx.store.write(|settings| args.apply(settings)).await?;

			print_output!(ctx, &settings.snapshot(), |_| {
				print_settings(ctx, &settings);
			});
		}
	}

	Ok(())
}

fn describe(outcome: &LoadOutcome) -> String {
	match outcome {
		LoadOutcome::FreshStart => "not created yet".to_owned(),
		LoadOutcome::Current => format!("at the latest format ({})", SchemaVersion::LATEST),
		LoadOutcome::Upgraded { from } => {
			format!("upgraded from {from} to {}", SchemaVersion::LATEST)
		}
		LoadOutcome::Reset {
			reason: ResetReason::InvalidJson(e),
		} => format!("unreadable ({e})"),
		LoadOutcome::Reset {
			reason: ResetReason::UnrecognizedFormat,
		} => "in an unrecognized format".to_owned(),
	}
}

fn print_settings(ctx: &Context, settings: &Settings) {
	let yes_no = |flag: bool| if flag { "yes" } else { "no" };

	println!("Settings file: {}", ctx.settings_path.display());
	println!("Loaded: {}", describe(&ctx.outcome));
	println!("Annotations: {}", settings.annotations.len());
	println!("Backups: {}", settings.backups.len());
	println!("Editable: {}", yes_no(settings.editable));
	println!("Hide placeholders: {}", yes_no(settings.hide_placeholders));
	println!(
		"Delete placeholder on insertion: {}",
		yes_no(settings.delete_placeholder_string_on_insertion)
	);
	println!("Automatic remove: {}", yes_no(settings.automatic_remove));
	if settings.markdown_file_path.trim().is_empty() {
		println!("Markdown mirror: disabled");
	} else {
		println!("Markdown mirror: {}", settings.markdown_file_path);
	}
	println!("Mobile label: {}", settings.label_mobile);
	println!("Desktop label: {}", settings.label_desktop);
	println!("Placeholder: {}", settings.label_placeholder);
}
