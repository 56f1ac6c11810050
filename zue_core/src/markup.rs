use crate::Attribute;
use crate::Document;
use crate::Element;
use crate::Node;
use crate::ZueError;
use crate::ZueResult;
use crate::dom::is_void_element;
use crate::lexer::RawToken;
use crate::lexer::SpannedToken;
use crate::lexer::decode_entities;
use crate::lexer::tokenize;

/// Parse a markup fragment into a [`Document`].
///
/// Comments and doctype declarations are dropped, void elements (`<br>`,
/// `<img>`, ...) and self-closing tags never take children, and every other
/// element must be explicitly closed.
pub fn parse_markup(source: impl AsRef<str>) -> ZueResult<Document> {
	let source = source.as_ref();
	let mut walker = MarkupWalker::new(source);
	walker.process()?;
	Ok(Document::new(walker.roots))
}

/// Walks the logos token stream, building the node tree.
struct MarkupWalker<'a> {
	/// The source text.
	source: &'a str,
	/// The collected raw tokens and their byte spans.
	raw_tokens: Vec<SpannedToken>,
	/// Current index into `raw_tokens`.
	cursor: usize,
	/// Byte offset where the pending run of text began.
	text_start: Option<usize>,
	/// Elements that have been opened but not yet closed.
	stack: Vec<Element>,
	/// Completed top-level nodes.
	roots: Vec<Node>,
}

impl<'a> MarkupWalker<'a> {
	fn new(source: &'a str) -> Self {
		Self {
			source,
			raw_tokens: tokenize(source),
			cursor: 0,
			text_start: None,
			stack: vec![],
			roots: vec![],
		}
	}

	fn current(&self) -> Option<&SpannedToken> {
		self.raw_tokens.get(self.cursor)
	}

	fn peek(&self) -> Option<Result<RawToken, ()>> {
		self.current().map(|(result, _)| *result)
	}

	fn current_slice(&self) -> &'a str {
		let (_, span) = &self.raw_tokens[self.cursor];
		&self.source[span.clone()]
	}

	fn current_offset(&self) -> usize {
		self.current()
			.map_or(self.source.len(), |(_, span)| span.start)
	}

	/// Append a finished node to the innermost open element.
	fn push_node(&mut self, node: Node) {
		match self.stack.last_mut() {
			Some(parent) => parent.children.push(node),
			None => self.roots.push(node),
		}
	}

	/// Turn the pending run of source text into a text node.
	fn flush_text(&mut self) {
		let Some(start) = self.text_start.take() else {
			return;
		};

		let end = self.current_offset();
		if end > start {
			let text = decode_entities(&self.source[start..end]);
			self.push_node(Node::Text(text));
		}
	}

	fn skip_whitespace(&mut self) {
		while self.peek() == Some(Ok(RawToken::Whitespace)) {
			self.cursor += 1;
		}
	}

	fn process(&mut self) -> ZueResult<()> {
		while let Some((result, span)) = self.current().cloned() {
			match result {
				Ok(RawToken::StartTagOpen) => {
					self.flush_text();
					self.process_start_tag()?;
				}
				Ok(RawToken::EndTagOpen) => {
					self.flush_text();
					self.process_end_tag()?;
				}
				Ok(RawToken::Comment | RawToken::Declaration) => {
					self.flush_text();
					self.cursor += 1;
				}
				_ => {
					if self.text_start.is_none() {
						self.text_start = Some(span.start);
					}
					self.cursor += 1;
				}
			}
		}

		self.flush_text();

		if let Some(open) = self.stack.pop() {
			return Err(ZueError::UnclosedElement(open.tag));
		}

		Ok(())
	}

	fn process_start_tag(&mut self) -> ZueResult<()> {
		let tag = self.current_slice()[1..].to_string();
		self.cursor += 1;
		let mut element = Element::new(tag);

		loop {
			let Some(result) = self.peek() else {
				return Err(ZueError::UnclosedElement(element.tag));
			};

			match result {
				Ok(RawToken::TagClose) => {
					self.cursor += 1;
					if is_void_element(&element.tag) {
						self.push_node(Node::Element(element));
					} else {
						self.stack.push(element);
					}
					return Ok(());
				}
				Ok(RawToken::SelfClose) => {
					self.cursor += 1;
					self.push_node(Node::Element(element));
					return Ok(());
				}
				Ok(RawToken::Word) => {
					let attribute = self.process_attribute();
					element.attributes.push(attribute);
				}
				// Whitespace and anything unrecognised between attributes.
				_ => {
					self.cursor += 1;
				}
			}
		}
	}

	/// `name`, `name=value`, `name="value"` or `name='value'`.
	fn process_attribute(&mut self) -> Attribute {
		let name = self.current_slice().to_string();
		self.cursor += 1;

		let checkpoint = self.cursor;
		self.skip_whitespace();
		if self.peek() != Some(Ok(RawToken::Equals)) {
			self.cursor = checkpoint;
			return Attribute {
				name,
				value: String::new(),
			};
		}

		self.cursor += 1;
		self.skip_whitespace();

		let value = match self.peek() {
			Some(Ok(RawToken::DoubleQuotedString | RawToken::SingleQuotedString)) => {
				let slice = self.current_slice();
				self.cursor += 1;
				decode_entities(&slice[1..slice.len() - 1])
			}
			Some(Ok(RawToken::Word)) => {
				let slice = self.current_slice();
				self.cursor += 1;
				decode_entities(slice)
			}
			_ => String::new(),
		};

		Attribute { name, value }
	}

	fn process_end_tag(&mut self) -> ZueResult<()> {
		let offset = self.current_offset();
		let tag = self.current_slice()[2..].to_string();
		self.cursor += 1;
		self.skip_whitespace();

		if self.peek() == Some(Ok(RawToken::TagClose)) {
			self.cursor += 1;
		}

		let Some(index) = self
			.stack
			.iter()
			.rposition(|open| open.tag.eq_ignore_ascii_case(&tag))
		else {
			return Err(ZueError::UnexpectedClosingTag { tag, offset });
		};

		if index + 1 != self.stack.len() {
			let innermost = self.stack.pop().map(|open| open.tag).unwrap_or_default();
			return Err(ZueError::UnclosedElement(innermost));
		}

		if let Some(element) = self.stack.pop() {
			self.push_node(Node::Element(element));
		}

		Ok(())
	}
}
