use std::fmt;
use std::str::FromStr;

use derive_more::Deref;
use derive_more::DerefMut;

use crate::ZueError;
use crate::ZueResult;

/// Elements that never have children or a closing tag.
pub const VOID_ELEMENTS: [&str; 14] = [
	"area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
	"track", "wbr",
];

pub fn is_void_element(tag: &str) -> bool {
	VOID_ELEMENTS
		.iter()
		.any(|void| void.eq_ignore_ascii_case(tag))
}

/// A node in a markup tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
	Element(Element),
	/// Raw text content, entities already decoded.
	Text(String),
}

impl Node {
	pub fn text(content: impl Into<String>) -> Self {
		Node::Text(content.into())
	}

	pub fn as_element(&self) -> Option<&Element> {
		match self {
			Node::Element(element) => Some(element),
			Node::Text(_) => None,
		}
	}

	pub fn as_text(&self) -> Option<&str> {
		match self {
			Node::Element(_) => None,
			Node::Text(text) => Some(text),
		}
	}

	/// Concatenated text of this node and all of its descendants.
	pub fn text_content(&self) -> String {
		match self {
			Node::Text(text) => text.clone(),
			Node::Element(element) => {
				element
					.children
					.iter()
					.map(Node::text_content)
					.collect()
			}
		}
	}
}

impl From<Element> for Node {
	fn from(element: Element) -> Self {
		Node::Element(element)
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
	pub name: String,
	pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
	pub tag: String,
	/// Attributes in source order.
	pub attributes: Vec<Attribute>,
	/// Children in document order.
	pub children: Vec<Node>,
}

impl Element {
	pub fn new(tag: impl Into<String>) -> Self {
		Self {
			tag: tag.into(),
			attributes: vec![],
			children: vec![],
		}
	}

	#[must_use]
	pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.attributes.push(Attribute {
			name: name.into(),
			value: value.into(),
		});
		self
	}

	#[must_use]
	pub fn with_child(mut self, child: impl Into<Node>) -> Self {
		self.children.push(child.into());
		self
	}

	#[must_use]
	pub fn with_text(self, text: impl Into<String>) -> Self {
		self.with_child(Node::Text(text.into()))
	}

	pub fn append(&mut self, child: impl Into<Node>) {
		self.children.push(child.into());
	}

	pub fn attribute(&self, name: &str) -> Option<&str> {
		self.attributes
			.iter()
			.find(|attribute| attribute.name.eq_ignore_ascii_case(name))
			.map(|attribute| attribute.value.as_str())
	}

	pub fn id(&self) -> Option<&str> {
		self.attribute("id")
	}

	pub fn has_class(&self, class: &str) -> bool {
		self.attribute("class")
			.is_some_and(|classes| classes.split_whitespace().any(|name| name == class))
	}
}

/// Child indices leading from the document root to a node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Deref, DerefMut)]
pub struct NodePath(Vec<usize>);

impl NodePath {
	pub fn new(indices: Vec<usize>) -> Self {
		Self(indices)
	}

	/// The parent's path and this node's index within it. `None` for the
	/// empty path.
	pub fn split_last(&self) -> Option<(NodePath, usize)> {
		let (last, parent) = self.0.split_last()?;
		Some((NodePath(parent.to_vec()), *last))
	}

	fn child(&self, index: usize) -> NodePath {
		let mut indices = self.0.clone();
		indices.push(index);
		NodePath(indices)
	}
}

/// A compound selector such as `div`, `#app`, `.card` or `section.card#main`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selector {
	pub tag: Option<String>,
	pub id: Option<String>,
	pub classes: Vec<String>,
}

impl Selector {
	pub fn matches(&self, element: &Element) -> bool {
		self.tag
			.as_ref()
			.is_none_or(|tag| tag.eq_ignore_ascii_case(&element.tag))
			&& self.id.as_ref().is_none_or(|id| element.id() == Some(id))
			&& self.classes.iter().all(|class| element.has_class(class))
	}
}

impl FromStr for Selector {
	type Err = ZueError;

	fn from_str(source: &str) -> ZueResult<Self> {
		let invalid = || ZueError::InvalidSelector(source.to_string());
		let trimmed = source.trim();
		if trimmed.is_empty() {
			return Err(invalid());
		}

		let mut selector = Selector::default();
		let mut rest = trimmed;

		let tag_len = rest.find(['#', '.']).unwrap_or(rest.len());
		if tag_len > 0 {
			let tag = &rest[..tag_len];
			if !is_identifier(tag) {
				return Err(invalid());
			}
			selector.tag = Some(tag.to_string());
			rest = &rest[tag_len..];
		}

		while let Some(marker) = rest.chars().next() {
			let body = &rest[1..];
			let len = body.find(['#', '.']).unwrap_or(body.len());
			let name = &body[..len];
			if !is_identifier(name) {
				return Err(invalid());
			}

			if marker == '#' {
				if selector.id.is_some() {
					return Err(invalid());
				}
				selector.id = Some(name.to_string());
			} else {
				selector.classes.push(name.to_string());
			}

			rest = &body[len..];
		}

		Ok(selector)
	}
}

fn is_identifier(name: &str) -> bool {
	!name.is_empty()
		&& name
			.chars()
			.all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
}

/// An owned markup tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
	pub children: Vec<Node>,
}

impl Document {
	pub fn new(children: Vec<Node>) -> Self {
		Self { children }
	}

	pub fn get(&self, path: &NodePath) -> Option<&Node> {
		let (first, rest) = path.split_first()?;
		rest.iter().try_fold(self.children.get(*first)?, |node, index| {
			node.as_element()?.children.get(*index)
		})
	}

	pub fn get_mut(&mut self, path: &NodePath) -> Option<&mut Node> {
		let (first, rest) = path.split_first()?;
		let mut node = self.children.get_mut(*first)?;
		for index in rest {
			node = match node {
				Node::Element(element) => element.children.get_mut(*index)?,
				Node::Text(_) => return None,
			};
		}
		Some(node)
	}

	/// The first element in document order matching `selector`.
	pub fn query_selector(&self, selector: &str) -> ZueResult<Option<NodePath>> {
		let selector: Selector = selector.parse()?;
		Ok(find_in(&self.children, &NodePath::default(), &selector))
	}

	/// Swap the node at `path` for `node` in a single step, returning the
	/// detached node. Returns `None` and leaves the tree untouched when the
	/// path does not exist.
	pub fn replace(&mut self, path: &NodePath, node: Node) -> Option<Node> {
		let (parent, index) = path.split_last()?;
		let siblings = if parent.is_empty() {
			&mut self.children
		} else {
			match self.get_mut(&parent)? {
				Node::Element(element) => &mut element.children,
				Node::Text(_) => return None,
			}
		};

		let slot = siblings.get_mut(index)?;
		Some(std::mem::replace(slot, node))
	}
}

fn find_in(nodes: &[Node], parent: &NodePath, selector: &Selector) -> Option<NodePath> {
	nodes.iter().enumerate().find_map(|(index, node)| {
		let Node::Element(element) = node else {
			return None;
		};

		let path = parent.child(index);
		if selector.matches(element) {
			return Some(path);
		}

		find_in(&element.children, &path, selector)
	})
}

impl fmt::Display for Node {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Node::Text(text) => write!(f, "{}", escape_text(text)),
			Node::Element(element) => write!(f, "{element}"),
		}
	}
}

impl fmt::Display for Element {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "<{}", self.tag)?;
		for attribute in &self.attributes {
			if attribute.value.is_empty() {
				write!(f, " {}", attribute.name)?;
			} else {
				write!(
					f,
					" {}=\"{}\"",
					attribute.name,
					escape_attribute(&attribute.value)
				)?;
			}
		}
		write!(f, ">")?;

		if is_void_element(&self.tag) {
			return Ok(());
		}

		for child in &self.children {
			write!(f, "{child}")?;
		}

		write!(f, "</{}>", self.tag)
	}
}

impl fmt::Display for Document {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for node in &self.children {
			write!(f, "{node}")?;
		}
		Ok(())
	}
}

fn escape_text(text: &str) -> String {
	text.replace('&', "&amp;")
		.replace('<', "&lt;")
		.replace('>', "&gt;")
}

fn escape_attribute(value: &str) -> String {
	value.replace('&', "&amp;").replace('"', "&quot;")
}
