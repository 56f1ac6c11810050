use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// `{{ path }}`, tolerating one stray brace on either side (`{{{ path }}}`).
static INTERPOLATION: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"\{?\{\{(.+?)\}\}\}?").expect("interpolation pattern is valid")
});

/// A segment of text produced by [`parse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
	/// Text copied to the output unchanged.
	Literal(String),
	/// An interpolation marker.
	Placeholder {
		/// The trimmed expression between the braces.
		path: String,
		/// The marker exactly as written, braces included.
		raw: String,
	},
}

impl Token {
	/// The slice of the parsed text this token was built from.
	pub fn source(&self) -> &str {
		match self {
			Token::Literal(text) => text,
			Token::Placeholder { raw, .. } => raw,
		}
	}

	pub fn is_placeholder(&self) -> bool {
		matches!(self, Token::Placeholder { .. })
	}
}

impl fmt::Display for Token {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.source())
	}
}

/// Whether `text` contains at least one interpolation marker.
pub fn has_interpolation(text: &str) -> bool {
	INTERPOLATION.is_match(text)
}

/// Split `text` into literal and placeholder tokens.
///
/// Returns `None` when the text has no interpolation marker, which callers
/// treat as plain text. Otherwise the tokens cover the whole input in order,
/// without gaps or empty literals.
pub fn parse(text: &str) -> Option<Vec<Token>> {
	if !has_interpolation(text) {
		return None;
	}

	let mut tokens = Vec::new();
	let mut last_index = 0;

	for captures in INTERPOLATION.captures_iter(text) {
		let Some(marker) = captures.get(0) else {
			continue;
		};

		if marker.start() > last_index {
			tokens.push(Token::Literal(text[last_index..marker.start()].to_string()));
		}

		let expression = captures.get(1).map_or("", |inner| inner.as_str());
		tokens.push(Token::Placeholder {
			path: expression.trim().to_string(),
			raw: marker.as_str().to_string(),
		});
		last_index = marker.end();
	}

	if last_index < text.len() {
		tokens.push(Token::Literal(text[last_index..].to_string()));
	}

	Some(tokens)
}
