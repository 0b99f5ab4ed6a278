mod args;

use anyhow::{bail, Result};
use clap::Subcommand;
use pa_core::{
	editor::{AnnotationEditor, Commit, EditEvent},
	reconcile::Reconciliation,
	Annotation, AnnotationSet, Identifier,
};
use serde::Serialize;

use crate::{context::Context, util::prelude::*};

use self::args::*;

const PREVIEW_WIDTH: usize = 60;

#[derive(Subcommand, Debug)]
pub enum AnnotationCmd {
	/// List all annotations
	List,
	/// Show the annotation of one plugin the way it is displayed
	Show(AnnotationShowArgs),
	/// Write the annotation of a plugin
	Set(AnnotationSetArgs),
	/// Remove the annotation of a plugin
	Remove {
		/// Plugin id
		id: Identifier,
	},
	/// List annotations of plugins that aren't installed, pruning them when automatic removal is on
	Orphans,
	/// Remove the annotations of every plugin that isn't installed
	Prune,
}

#[derive(Serialize)]
struct AnnotationShowOutput {
	id: Identifier,
	label: String,
	annotation: Option<Annotation>,
	placeholder: Option<String>,
}

#[derive(Serialize)]
struct OrphansOutput {
	pruned: bool,
	orphans: AnnotationSet,
}

pub async fn run(ctx: &Context, cmd: AnnotationCmd) -> Result<()> {
	match cmd {
		AnnotationCmd::List => {
			let settings = ctx.store.get().await;

			print_output!(ctx, &settings.annotations, |annotations: &AnnotationSet| {
				if annotations.is_empty() {
					println!("No annotations yet.");
					return;
				}

				for (id, annotation) in annotations {
					let missing = if !ctx.plugins.is_empty() && !ctx.plugins.contains_key(id) {
						" (not installed)"
					} else {
						""
					};

					println!("{} [{id}]{missing}", annotation.name);
					println!("  {}", preview(&annotation.desc, PREVIEW_WIDTH));
				}
			});
		}

		AnnotationCmd::Show(args) => {
			let settings = ctx.store.get().await;
			let annotation = settings.annotations.get(&args.id).cloned();
			let name = ctx.plugin_name(&args.id, annotation.as_ref().map(|a| a.name.as_str()));

			let out = AnnotationShowOutput {
				label: settings.label(args.platform.into(), &name),
				placeholder: annotation
					.is_none()
					.then(|| settings.placeholder(&name))
					.filter(|_| !settings.hide_placeholders),
				annotation,
				id: args.id,
			};

			print_output!(ctx, &out, |o: &AnnotationShowOutput| {
				println!("{}", o.label);
				match (&o.annotation, &o.placeholder) {
					(Some(annotation), _) => println!("{}", annotation.desc),
					(None, Some(placeholder)) => println!("{placeholder}"),
					(None, None) => {}
				}
			});
		}

		AnnotationCmd::Set(args) => {
			let settings = ctx.store.get().await;
			let name = args.name.unwrap_or_else(|| {
				ctx.plugin_name(
					&args.id,
					settings.annotations.get(&args.id).map(|a| a.name.as_str()),
				)
			});

			let commit = edit(ctx, &args.id, name, args.text).await?;

			match commit {
				Commit::Upsert(annotation) => println!("Saved annotation for {}", annotation.name),
				Commit::Remove => println!("Removed annotation for {}", args.id),
				Commit::Unchanged => println!("Nothing to save for {}", args.id),
			}
		}

		AnnotationCmd::Remove { id } => {
			let settings = ctx.store.get().await;
			let Some(annotation) = settings.annotations.get(&id) else {
				bail!("No annotation for {id}");
			};

			edit(ctx, &id, annotation.name.clone(), String::new()).await?;
			println!("Removed annotation for {}", annotation.name);
		}

		AnnotationCmd::Orphans => {
			ctx.require_plugins()?;

			let reconciliation = ctx.store.refresh_live(&ctx.plugins).await?;
			let out = OrphansOutput {
				pruned: matches!(reconciliation, Reconciliation::Pruned(_)),
				orphans: reconciliation.orphans().clone(),
			};

			print_output!(ctx, &out, |o: &OrphansOutput| {
				if o.orphans.is_empty() {
					println!("Every annotation belongs to an installed plugin.");
					return;
				}

				let verb = if o.pruned { "Removed" } else { "Found" };
				println!("{verb} {} orphaned annotations:", o.orphans.len());
				for (id, annotation) in &o.orphans {
					println!("  {} [{id}]", annotation.name);
				}
			});
		}

		AnnotationCmd::Prune => {
			ctx.require_plugins()?;

			let removed = ctx.store.remove_orphans(&ctx.plugins).await?;

			print_output!(ctx, &removed, |removed: &AnnotationSet| {
				println!("Removed {} orphaned annotations", removed.len());
			});
		}
	}

	Ok(())
}

/// Runs `text` through the same edit flow a UI field goes through and stores the result.
async fn edit(ctx: &Context, id: &Identifier, name: String, text: String) -> Result<Commit> {
	let settings = ctx.store.get().await;
	let mut editor = AnnotationEditor::new(id.clone(), name, &settings);

	editor.handle(EditEvent::Input(text), &settings);
	let Some(commit) = editor.handle(EditEvent::Blur, &settings) else {
		bail!("Annotations are read-only, enable editing with `settings set --editable true`");
	};

	ctx.store.apply(editor.id(), commit.clone()).await?;

	Ok(commit)
}
