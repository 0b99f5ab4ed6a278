use std::{collections::HashMap, path::PathBuf, sync::Arc};

use anyhow::{bail, Context as _, Result};
use pa_core::{FsStorage, Identifier, LoadOutcome, SettingsStore, StoreConfig};

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
	Human,
	Json,
}

pub struct Context {
	pub store: Arc<SettingsStore>,
	/// Installed plugins given on the command line, id to display name.
	pub plugins: HashMap<Identifier, String>,
	pub format: OutputFormat,
	pub settings_path: PathBuf,
	pub outcome: LoadOutcome,
}

impl Context {
	pub async fn load(
		settings_path: PathBuf,
		vault: Option<PathBuf>,
		plugins: Vec<(Identifier, String)>,
		format: OutputFormat,
	) -> Result<Self> {
		let plugins = plugins.into_iter().collect::<HashMap<_, _>>();

		let mut config = StoreConfig::new(&settings_path);
		if let Some(vault) = vault {
			config = config.with_markdown_root(vault);
		}

		let (store, outcome) = SettingsStore::load(Arc::new(FsStorage), config, &plugins)
			.await
			.with_context(|| format!("Failed to load settings from '{}'", settings_path.display()))?;

		Ok(Self {
			store,
			plugins,
			format,
			settings_path,
			outcome,
		})
	}

	/// Orphans only make sense against the full list of installed plugins.
	pub fn require_plugins(&self) -> Result<()> {
		if self.plugins.is_empty() {
			bail!("Pass the installed plugins with --plugin id=name");
		}

		Ok(())
	}

	/// Display name for `id`: the installed plugin's name, then `stored`, then the id itself.
	pub fn plugin_name(&self, id: &Identifier, stored: Option<&str>) -> String {
		self.plugins
			.get(id)
			.map(String::as_str)
			.or(stored)
			.unwrap_or(id.as_str())
			.to_owned()
	}
}
