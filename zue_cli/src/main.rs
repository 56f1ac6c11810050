use std::path::Path;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;
use zue_cli::Commands;
use zue_cli::OutputFormat;
use zue_cli::ZueCli;
use zue_core::ChangeKind;
use zue_core::MissingValue;
use zue_core::ObservedObject;
use zue_core::Token;
use zue_core::Value;
use zue_core::View;
use zue_core::ViewOptions;
use zue_core::ZueConfig;
use zue_core::ZueError;
use zue_core::load_data_file;
use zue_core::parse;
use zue_core::parse_markup;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,cyan) => {
		if color_enabled() {
			format!("{}", $text.cyan())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,bold) => {
		if color_enabled() {
			format!("{}", $text.bold())
		} else {
			format!("{}", $text)
		}
	};
}

/// Flags of the `render` subcommand.
struct RenderArgs {
	template: Option<PathBuf>,
	data: Option<PathBuf>,
	el: Option<String>,
	set: Vec<String>,
	changes: bool,
	show_undefined: bool,
}

fn main() {
	let args = ZueCli::parse();

	// Respect NO_COLOR env var and --no-color flag.
	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	init_tracing(args.verbose, use_color);

	// Install miette's fancy handler for rich error diagnostics.
	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	let result = match &args.command {
		Some(Commands::Render {
			template,
			data,
			el,
			set,
			changes,
			show_undefined,
		}) => {
			run_render(
				&args,
				RenderArgs {
					template: template.clone(),
					data: data.clone(),
					el: el.clone(),
					set: set.clone(),
					changes: *changes,
					show_undefined: *show_undefined,
				},
			)
		}
		Some(Commands::Tokens { text, format }) => run_tokens(text, *format),
		None => {
			eprintln!("No subcommand specified. Run `zue --help` for usage.");
			process::exit(1);
		}
	};

	if let Err(e) = result {
		// Try to render through miette for rich diagnostics with help text
		// and error codes.
		match e.downcast::<ZueError>() {
			Ok(zue_err) => {
				let report: miette::Report = (*zue_err).into();
				eprintln!("{report:?}");
			}
			Err(e) => {
				eprintln!("{} {e}", colored!("error:", red));
			}
		}
		process::exit(2);
	}
}

/// Logs go to stderr so rendered output on stdout stays clean. `--verbose`
/// wins over `RUST_LOG`.
fn init_tracing(verbose: bool, use_color: bool) {
	let filter = if verbose {
		EnvFilter::new("debug")
	} else {
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
	};

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_ansi(use_color)
		.without_time()
		.try_init()
		.ok();
}

fn resolve_root(args: &ZueCli) -> PathBuf {
	args.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

fn run_render(args: &ZueCli, flags: RenderArgs) -> Result<(), Box<dyn std::error::Error>> {
	let root = resolve_root(args);
	let config = ZueConfig::load(&root)?.unwrap_or_default();
	tracing::debug!(root = %root.display(), "resolved project root");

	let el = flags
		.el
		.or(config.el)
		.ok_or_else(|| ZueError::MissingConfigField("el".to_string()))?;
	let template_path = flags
		.template
		.or(config.template)
		.map(|path| root.join(path))
		.ok_or_else(|| ZueError::MissingConfigField("template".to_string()))?;
	let data_path = flags.data.or(config.data).map(|path| root.join(path));

	let mut render = config.render;
	if flags.show_undefined {
		render.missing = MissingValue::Undefined;
	}

	let source = std::fs::read_to_string(&template_path)?;
	let document = parse_markup(&source)?;
	let data = match &data_path {
		Some(path) => Value::from(load_data_file(path)?),
		None => Value::Undefined,
	};

	if args.verbose {
		eprintln!(
			"Rendering {} into `{el}`",
			make_relative(&template_path, &root)
		);
	}

	let mut view = View::new(
		document,
		ViewOptions {
			el,
			data,
			render,
		},
	)?;

	for assignment in &flags.set {
		tracing::debug!(%assignment, "applying assignment");
		apply_assignment(view.data(), assignment)?;
	}

	let changes = view.observer().changes();
	let updated = view.update()?;
	tracing::info!(changes = changes.len(), updated, "render finished");

	println!("{}", view.html());

	if flags.changes {
		println!();
		println!("{}", colored!("Changes:", bold));
		if changes.is_empty() {
			println!("  (none)");
		}
		for change in &changes {
			let kind = match change.kind {
				ChangeKind::Set => colored!("set", green),
				ChangeKind::Array => colored!("array", cyan),
			};
			println!("  {kind} {} = {}", change.path, change.value);
		}
	}

	Ok(())
}

/// Apply a single `PATH=JSON` assignment to an existing property.
fn apply_assignment(data: &ObservedObject, assignment: &str) -> Result<(), ZueError> {
	let Some((path, raw)) = assignment.split_once('=') else {
		return Err(ZueError::InvalidPath(assignment.to_string()));
	};
	let path = path.trim();

	let (parent, key) = match path.rsplit_once('.') {
		Some((parent, key)) => (data.resolve(parent), key.trim()),
		None => (Value::Object(data.clone()), path),
	};

	let Value::Object(parent) = parent else {
		return Err(ZueError::InvalidPath(path.to_string()));
	};
	if !parent.has_own(key) {
		return Err(ZueError::InvalidPath(path.to_string()));
	}

	let value = serde_json::from_str::<serde_json::Value>(raw)
		.map_or_else(|_| Value::from(raw), Value::from);
	parent.set(key, value);

	Ok(())
}

fn run_tokens(text: &str, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
	let tokens = parse(text).unwrap_or_else(|| {
		if text.is_empty() {
			vec![]
		} else {
			vec![Token::Literal(text.to_string())]
		}
	});
	tracing::debug!(count = tokens.len(), ?format, "parsed tokens");

	match format {
		OutputFormat::Text => {
			if tokens.is_empty() {
				println!("No tokens.");
			}
			for token in &tokens {
				match token {
					Token::Literal(literal) => {
						println!("{} {literal:?}", colored!("literal    ", bold));
					}
					Token::Placeholder { path, raw } => {
						println!("{} {path} ({raw})", colored!("placeholder", green));
					}
				}
			}
		}
		OutputFormat::Json => {
			let entries: Vec<serde_json::Value> = tokens
				.iter()
				.map(|token| {
					match token {
						Token::Literal(literal) => {
							serde_json::json!({
								"kind": "literal",
								"text": literal,
							})
						}
						Token::Placeholder { path, raw } => {
							serde_json::json!({
								"kind": "placeholder",
								"path": path,
								"raw": raw,
							})
						}
					}
				})
				.collect();
			println!("{}", serde_json::to_string_pretty(&entries)?);
		}
	}

	Ok(())
}

fn make_relative(path: &Path, root: &Path) -> String {
	path.strip_prefix(root)
		.unwrap_or(path)
		.display()
		.to_string()
}
