use std::path::Path;

use assert_cmd::Command;
use insta_cmd::get_cargo_bin;

pub fn zue_cmd() -> Command {
	let mut cmd = Command::new(get_cargo_bin("zue"));
	cmd.env("NO_COLOR", "1");
	cmd.env_remove("RUST_LOG");
	cmd
}

/// Write a small project with a config, a template and a json data file.
#[allow(dead_code)]
pub fn write_project(root: &Path) -> std::io::Result<()> {
	std::fs::write(
		root.join("zue.toml"),
		"el = \"#app\"\ntemplate = \"index.html\"\ndata = \"data.json\"\n",
	)?;
	std::fs::write(
		root.join("index.html"),
		"<main><div id=\"app\"><h1>Hi {{ user.name }}</h1><p>{{ count }} \
		 clicks</p></div></main>",
	)?;
	std::fs::write(
		root.join("data.json"),
		r#"{ "user": { "name": "Ann" }, "count": 0, "tags": ["a", "b"] }"#,
	)?;

	Ok(())
}
