use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::ZueError;
use crate::ZueResult;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] = ["zue.toml", ".zue.toml", ".config/zue.toml"];

/// What a placeholder renders as when its path does not resolve.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MissingValue {
	/// Render nothing.
	#[default]
	Empty,
	/// Render the string `undefined`.
	Undefined,
}

/// Where a compiled fragment goes relative to the mount target.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MountStrategy {
	/// The fragment takes the target's place in its parent.
	#[default]
	Replace,
	/// The target is kept, its children are cleared and the fragment's
	/// children are appended in their place.
	Append,
}

/// Rendering behaviour.
///
/// ```toml
/// [render]
/// missing = "undefined"
/// mount = "append"
/// ```
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
pub struct RenderOptions {
	#[serde(default)]
	pub missing: MissingValue,
	#[serde(default)]
	pub mount: MountStrategy,
}

/// Configuration loaded from a `zue.toml` file.
///
/// ```toml
/// el = "#app"
/// template = "index.html"
/// data = "data.json"
///
/// [render]
/// missing = "empty"
/// mount = "replace"
/// ```
///
/// Relative paths are resolved against the directory holding the config.
#[derive(Debug, Default, Deserialize)]
pub struct ZueConfig {
	/// Selector of the mount target inside the template.
	#[serde(default)]
	pub el: Option<String>,
	/// Path to the markup template.
	#[serde(default)]
	pub template: Option<PathBuf>,
	/// Path to the data file (json, toml, yaml or yml).
	#[serde(default)]
	pub data: Option<PathBuf>,
	#[serde(default)]
	pub render: RenderOptions,
}

impl ZueConfig {
	/// Resolve the config path from known discovery candidates.
	#[must_use]
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if no config file exists.
	pub fn load(root: &Path) -> ZueResult<Option<ZueConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		tracing::debug!(path = %config_path.display(), "loading config");
		let content = std::fs::read_to_string(&config_path)?;
		let config: ZueConfig =
			toml::from_str(&content).map_err(|e| ZueError::ConfigParse(e.to_string()))?;

		Ok(Some(config))
	}
}

/// Read a data file and parse it according to its extension.
pub fn load_data_file(path: &Path) -> ZueResult<serde_json::Value> {
	let display = path.display().to_string();
	let content = std::fs::read_to_string(path).map_err(|e| {
		ZueError::DataFile {
			path: display.clone(),
			reason: e.to_string(),
		}
	})?;
	let format = path
		.extension()
		.and_then(|e| e.to_str())
		.unwrap_or("")
		.to_ascii_lowercase();

	parse_data(&content, &format, &display)
}

/// Parse data content into a `serde_json::Value` based on its format.
pub fn parse_data(content: &str, format: &str, path_display: &str) -> ZueResult<serde_json::Value> {
	match format {
		"json" => {
			serde_json::from_str(content).map_err(|e| {
				ZueError::DataFile {
					path: path_display.to_string(),
					reason: e.to_string(),
				}
			})
		}
		"toml" => {
			let toml_value: toml::Value = toml::from_str(content).map_err(|e| {
				ZueError::DataFile {
					path: path_display.to_string(),
					reason: e.to_string(),
				}
			})?;
			Ok(toml_to_json(toml_value))
		}
		"yaml" | "yml" => {
			serde_yaml_ng::from_str(content).map_err(|e| {
				ZueError::DataFile {
					path: path_display.to_string(),
					reason: e.to_string(),
				}
			})
		}
		other => Err(ZueError::UnsupportedDataFormat(other.to_string())),
	}
}

/// Convert a `toml::Value` to a `serde_json::Value`. Non-finite floats
/// become `null`.
fn toml_to_json(value: toml::Value) -> serde_json::Value {
	match value {
		toml::Value::String(s) => serde_json::Value::String(s),
		toml::Value::Integer(i) => serde_json::Value::from(i),
		toml::Value::Float(f) => {
			serde_json::Number::from_f64(f).map_or(serde_json::Value::Null, serde_json::Value::Number)
		}
		toml::Value::Boolean(b) => serde_json::Value::Bool(b),
		toml::Value::Datetime(dt) => serde_json::Value::String(dt.to_string()),
		toml::Value::Array(arr) => serde_json::Value::Array(arr.into_iter().map(toml_to_json).collect()),
		toml::Value::Table(table) => {
			serde_json::Value::Object(
				table
					.into_iter()
					.map(|(k, v)| (k, toml_to_json(v)))
					.collect(),
			)
		}
	}
}
