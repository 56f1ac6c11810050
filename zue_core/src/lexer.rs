use std::ops::Range;

use logos::Lexer;
use logos::Logos;

/// Raw tokens produced by logos for flat tokenization of markup. Text is not
/// a token of its own: the walker slices it out of the source between tags.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RawToken {
	#[token("<!--", skip_comment)]
	Comment,
	#[regex(r"<![a-zA-Z][^>]*>")]
	Declaration,
	#[regex(r"</[a-zA-Z][a-zA-Z0-9\-]*")]
	EndTagOpen,
	#[regex(r"<[a-zA-Z][a-zA-Z0-9\-]*")]
	StartTagOpen,
	#[token(">")]
	TagClose,
	#[token("/>")]
	SelfClose,
	#[token("=")]
	Equals,
	/// Quoted strings stop at `<` so a stray quote in text cannot swallow a
	/// tag.
	#[regex(r#""[^"<]*""#)]
	DoubleQuotedString,
	#[regex(r"'[^'<]*'")]
	SingleQuotedString,
	#[regex(r"[ \t\r\n\f]+")]
	Whitespace,
	#[regex(r#"[^ \t\r\n\f"'<>=/]+"#)]
	Word,
}

/// Consume everything up to and including the next `-->`, or the rest of the
/// input when the comment is never closed.
fn skip_comment(lex: &mut Lexer<RawToken>) {
	let remainder = lex.remainder();
	let end = remainder
		.find("-->")
		.map_or(remainder.len(), |index| index + 3);
	lex.bump(end);
}

pub(crate) type SpannedToken = (Result<RawToken, ()>, Range<usize>);

pub(crate) fn tokenize(source: &str) -> Vec<SpannedToken> {
	RawToken::lexer(source).spanned().collect()
}

/// Decode the character references that commonly appear in templates.
/// Unknown references are kept verbatim.
pub(crate) fn decode_entities(text: &str) -> String {
	if !text.contains('&') {
		return text.to_string();
	}

	let mut decoded = String::with_capacity(text.len());
	let mut rest = text;

	while let Some(start) = rest.find('&') {
		decoded.push_str(&rest[..start]);
		rest = &rest[start..];

		let replacement = rest
			.find(';')
			.filter(|end| *end <= 10)
			.and_then(|end| decode_reference(&rest[1..end]).map(|ch| (ch, end)));

		match replacement {
			Some((ch, end)) => {
				decoded.push(ch);
				rest = &rest[end + 1..];
			}
			None => {
				decoded.push('&');
				rest = &rest[1..];
			}
		}
	}

	decoded.push_str(rest);
	decoded
}

fn decode_reference(name: &str) -> Option<char> {
	match name {
		"amp" => Some('&'),
		"lt" => Some('<'),
		"gt" => Some('>'),
		"quot" => Some('"'),
		"apos" => Some('\''),
		"nbsp" => Some('\u{a0}'),
		_ => {
			let number = name.strip_prefix('#')?;
			let code = match number.strip_prefix(['x', 'X']) {
				Some(hex) => u32::from_str_radix(hex, 16).ok()?,
				None => number.parse().ok()?,
			};
			char::from_u32(code)
		}
	}
}
