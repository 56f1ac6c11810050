use crate::Element;
use crate::MissingValue;
use crate::Node;
use crate::ObservedObject;
use crate::RenderOptions;
use crate::interpolation::Token;
use crate::interpolation::parse;

/// Build a detached copy of `template` with every interpolation marker in
/// its text replaced by the current value from `data`.
///
/// The output mirrors the template exactly: same tags, same attributes in the
/// same order, same children in the same order, and one text node for every
/// template text node. Unresolvable paths never abort compilation; they
/// render according to [`RenderOptions::missing`].
pub fn compile(template: &Node, data: &ObservedObject, options: &RenderOptions) -> Node {
	match template {
		Node::Element(element) => Node::Element(compile_element(element, data, options)),
		Node::Text(text) => Node::Text(compile_text(text, data, options)),
	}
}

fn compile_element(source: &Element, data: &ObservedObject, options: &RenderOptions) -> Element {
	tracing::trace!(tag = %source.tag, children = source.children.len(), "compile element");
	let mut output = Element {
		tag: source.tag.clone(),
		attributes: source.attributes.clone(),
		children: Vec::with_capacity(source.children.len()),
	};

	for child in &source.children {
		compile_node(child, &mut output, data, options);
	}

	output
}

/// Compile `node` and append the result to `parent`.
fn compile_node(node: &Node, parent: &mut Element, data: &ObservedObject, options: &RenderOptions) {
	let compiled = compile(node, data, options);
	parent.append(compiled);
}

/// Substitute every placeholder in `text`, left to right. Text without
/// markers is returned unchanged.
pub fn compile_text(text: &str, data: &ObservedObject, options: &RenderOptions) -> String {
	let Some(tokens) = parse(text) else {
		return text.to_string();
	};

	let mut output = String::with_capacity(text.len());
	for token in &tokens {
		match token {
			Token::Literal(literal) => output.push_str(literal),
			Token::Placeholder { path, .. } => {
				let value = data.resolve(path);
				if value.is_undefined() {
					tracing::trace!(%path, "unresolved placeholder");
					if options.missing == MissingValue::Undefined {
						output.push_str("undefined");
					}
				} else {
					output.push_str(&value.to_string());
				}
			}
		}
	}

	output
}
