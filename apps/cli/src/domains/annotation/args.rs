use clap::Args;
use pa_core::{Identifier, Platform};

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
pub enum PlatformArg {
	Mobile,
	Desktop,
}

impl From<PlatformArg> for Platform {
	fn from(platform: PlatformArg) -> Self {
		match platform {
			PlatformArg::Mobile => Self::Mobile,
			PlatformArg::Desktop => Self::Desktop,
		}
	}
}

#[derive(Args, Debug)]
pub struct AnnotationShowArgs {
	/// Plugin id
	pub id: Identifier,

	/// Which label template to render
	#[arg(long, value_enum, default_value = "desktop")]
	pub platform: PlatformArg,
}

#[derive(Args, Debug)]
pub struct AnnotationSetArgs {
	/// Plugin id
	pub id: Identifier,

	/// Annotation text, an empty text removes the annotation
	pub text: String,

	/// Display name to store, defaults to the installed plugin's name
	#[arg(long)]
	pub name: Option<String>,
}
