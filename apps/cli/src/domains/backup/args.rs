use clap::Args;

#[derive(Args, Debug)]
pub struct BackupCreateArgs {
	/// Label for the backup
	pub name: String,
}

#[derive(Args, Debug)]
pub struct BackupTargetArgs {
	/// Position of the backup in `backup list`, starting at 1
	pub index: usize,
}

#[derive(Args, Debug)]
pub struct BackupRenameArgs {
	/// Position of the backup in `backup list`, starting at 1
	pub index: usize,

	/// New label
	pub name: String,
}
