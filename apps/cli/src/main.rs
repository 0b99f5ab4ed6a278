use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use pa_core::Identifier;
use tracing::debug;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod context;
mod domains;
mod util;

use context::{Context, OutputFormat};
use domains::{annotation::AnnotationCmd, backup::BackupCmd, settings::SettingsCmd};

const DEFAULT_LOG_FILTER: &str = "warn,pa_core=info,pa_cli=info";

#[derive(Parser, Debug)]
#[command(
	name = "plugin-annotations",
	version,
	about = "Personal notes about installed plugins"
)]
struct Cli {
	/// Path to the settings file
	#[arg(long, env = "PA_SETTINGS", global = true)]
	settings: Option<PathBuf>,

	/// Directory a relative Markdown mirror path is resolved against
	#[arg(long, global = true)]
	vault: Option<PathBuf>,

	/// An installed plugin as `id=Display Name`, repeat for each one
	#[arg(long = "plugin", value_name = "ID=NAME", value_parser = parse_plugin, global = true)]
	plugins: Vec<(Identifier, String)>,

	/// Output format
	#[arg(long, value_enum, default_value = "human", global = true)]
	format: OutputFormat,

	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
	/// Settings file operations
	#[command(subcommand)]
	Settings(SettingsCmd),
	/// Annotation operations
	#[command(subcommand)]
	Annotation(AnnotationCmd),
	/// Backup operations
	#[command(subcommand)]
	Backup(BackupCmd),
}

fn parse_plugin(raw: &str) -> Result<(Identifier, String), String> {
	let (id, name) = raw.split_once('=').unwrap_or((raw, raw));
	let (id, name) = (id.trim(), name.trim());

	if id.is_empty() {
		return Err(format!("missing plugin id in '{raw}'"));
	}

	Ok((Identifier::from(id), name.to_owned()))
}

fn default_settings_path() -> Result<PathBuf> {
	dirs::data_local_dir()
		.map(|dir| dir.join("plugin-annotations").join("settings.json"))
		.ok_or_else(|| anyhow!("No local data directory on this platform, pass --settings"))
}

fn init_tracing() {
	let filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

	tracing_subscriber::registry()
		.with(filter)
		.with(
			fmt::layer()
				.with_target(false)
				.with_writer(std::io::stderr),
		)
		.init();
}

#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();

	init_tracing();

	let settings_path = match cli.settings {
		Some(path) => path,
		None => default_settings_path()?,
	};
	debug!(path = %settings_path.display(), "Using settings file");

	let ctx = Context::load(settings_path, cli.vault, cli.plugins, cli.format).await?;

	let res = match cli.command {
		Commands::Settings(cmd) => domains::settings::run(&ctx, cmd).await,
		Commands::Annotation(cmd) => domains::annotation::run(&ctx, cmd).await,
		Commands::Backup(cmd) => domains::backup::run(&ctx, cmd).await,
	};

	// Pending debounced saves must land before exiting
	let shutdown = ctx.store.shutdown().await;

	res?;
	shutdown.map_err(Into::into)
}
