use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum ZueError {
	#[error(transparent)]
	#[diagnostic(code(zue::io_error))]
	Io(#[from] std::io::Error),

	#[error("mount target `{0}` did not match any element")]
	#[diagnostic(
		code(zue::invalid_mount_target),
		help("check that the `el` selector matches an element in the template")
	)]
	InvalidMountTarget(String),

	#[error("invalid selector: `{0}`")]
	#[diagnostic(
		code(zue::invalid_selector),
		help("supported selectors: `#id`, `.class`, `tag`, `tag#id`, `tag.class`")
	)]
	InvalidSelector(String),

	#[error("missing closing tag for element: `{0}`")]
	#[diagnostic(
		code(zue::unclosed_element),
		help("add `</{0}>` to close this element")
	)]
	UnclosedElement(String),

	#[error("unexpected closing tag `</{tag}>` at offset {offset}")]
	#[diagnostic(code(zue::unexpected_closing_tag))]
	UnexpectedClosingTag { tag: String, offset: usize },

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(zue::config_parse),
		help("check that zue.toml is valid TOML with `el`, `template` and `data` keys")
	)]
	ConfigParse(String),

	#[error("missing `{0}` setting")]
	#[diagnostic(
		code(zue::missing_config_field),
		help("set `{0}` in zue.toml or pass it on the command line")
	)]
	MissingConfigField(String),

	#[error("failed to load data file `{path}`: {reason}")]
	#[diagnostic(code(zue::data_file))]
	DataFile { path: String, reason: String },

	#[error("unsupported data file format: `{0}`")]
	#[diagnostic(
		code(zue::unsupported_format),
		help("supported formats: json, toml, yaml, yml")
	)]
	UnsupportedDataFormat(String),

	#[error("view data must be an object, found {0}")]
	#[diagnostic(code(zue::invalid_data))]
	InvalidData(String),

	#[error("no observed property at path `{0}`")]
	#[diagnostic(
		code(zue::invalid_path),
		help("the parent of the path must be an object that already exists in the data")
	)]
	InvalidPath(String),
}

pub type ZueResult<T> = Result<T, ZueError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
