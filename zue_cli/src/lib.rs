use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Render markup templates against reactive data.",
	long_about = "zue is a minimal reactive view engine. It mounts a markup template, fills its \
	              `{{ path }}` placeholders from a data file and re-renders whenever the data \
	              changes.\n\nQuick start:\n  zue render   Render the template configured in \
	              zue.toml\n  zue tokens   Show how a piece of text is split into tokens"
)]
pub struct ZueCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Path to the project root directory.
	#[arg(long, short, global = true)]
	pub path: Option<PathBuf>,

	/// Enable verbose output, including debug logs on stderr.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Render a template against its data and print the resulting markup.
	///
	/// Settings missing from the command line are read from `zue.toml` in
	/// the project root. Relative paths are resolved against the project
	/// root.
	Render {
		/// The markup file holding the template.
		#[arg(long)]
		template: Option<PathBuf>,

		/// The data file (json, toml, yaml or yml).
		#[arg(long)]
		data: Option<PathBuf>,

		/// Selector of the mount target, such as `#app`.
		#[arg(long)]
		el: Option<String>,

		/// Write a value into the observed data after the first render, then
		/// render again. The value is parsed as JSON and falls back to a plain
		/// string. Can be repeated: `--set user.name='"Bo"' --set count=2`.
		#[arg(long = "set", value_name = "PATH=JSON")]
		set: Vec<String>,

		/// Print every change notification recorded while applying `--set`.
		#[arg(long, default_value_t = false)]
		changes: bool,

		/// Render unresolved placeholders as `undefined` instead of nothing.
		#[arg(long, default_value_t = false)]
		show_undefined: bool,
	},
	/// Split text into literal and placeholder tokens.
	Tokens {
		/// The text to tokenize.
		text: String,

		/// Output format for the token list.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
	/// Human-readable text output with colors and formatting.
	Text,
	/// JSON output for programmatic consumption.
	Json,
}
