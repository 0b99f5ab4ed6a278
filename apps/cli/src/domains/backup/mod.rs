mod args;

use anyhow::{anyhow, Result};
use clap::Subcommand;
use pa_core::Backup;

use crate::{context::Context, util::prelude::*};

use self::args::*;

#[derive(Subcommand, Debug)]
pub enum BackupCmd {
	/// List backups, most recent first
	List,
	/// Back up the current settings
	Create(BackupCreateArgs),
	/// Replace the current settings with a backup, keeping every backup
	Restore(BackupTargetArgs),
	/// Delete a backup
	Delete(BackupTargetArgs),
	/// Rename a backup
	Rename(BackupRenameArgs),
}

pub async fn run(ctx: &Context, cmd: BackupCmd) -> Result<()> {
	match cmd {
		BackupCmd::List => {
			let backups = ctx.store.backups().await;

			print_output!(ctx, &backups, |backups: &Vec<Backup>| {
				if backups.is_empty() {
					println!("No backups yet.");
					return;
				}

				for (idx, backup) in backups.iter().enumerate() {
					println!(
						"{:>3}. {} ({}, {} annotations)",
						idx + 1,
						backup.name,
						backup.date.format("%Y-%m-%d %H:%M:%S UTC"),
						backup.settings.annotations.len()
					);
				}
			});
		}

		BackupCmd::Create(args) => {
			let backup = ctx.store.create_backup(args.name).await?;

			print_output!(ctx, &backup, |backup: &Backup| {
				println!("Created backup '{}'", backup.name);
			});
		}

		BackupCmd::Restore(args) => {
			let backup = backup_at(ctx, args.index).await?;
			ctx.store.restore_backup(&backup).await?;

			print_output!(ctx, &backup, |backup: &Backup| {
				println!("Restored backup '{}'", backup.name);
			});
		}

		BackupCmd::Delete(args) => {
			let backup = backup_at(ctx, args.index).await?;
			let deleted = ctx.store.delete_backup(&backup).await?;

			print_output!(ctx, &deleted, |backup: &Backup| {
				println!("Deleted backup '{}'", backup.name);
			});
		}

		BackupCmd::Rename(args) => {
			let backup = backup_at(ctx, args.index).await?;
			let renamed = ctx.store.rename_backup(&backup, args.name).await?;

			print_output!(ctx, &renamed, |renamed: &Backup| {
				println!("Renamed backup '{}' to '{}'", backup.name, renamed.name);
			});
		}
	}

	Ok(())
}

/// Backup at a 1-based position of the listing order.
async fn backup_at(ctx: &Context, index: usize) -> Result<Backup> {
	let mut backups = ctx.store.backups().await;

	if index == 0 || index > backups.len() {
		return Err(anyhow!(
			"No backup number {index}, there are {} backups",
			backups.len()
		));
	}

	Ok(backups.swap_remove(index - 1))
}
