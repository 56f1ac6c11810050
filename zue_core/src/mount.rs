use crate::Document;
use crate::MountStrategy;
use crate::Node;
use crate::NodePath;
use crate::ZueError;
use crate::ZueResult;

/// Find the mount target for `selector`, failing when nothing matches.
pub fn resolve_target(document: &Document, selector: &str) -> ZueResult<NodePath> {
	document
		.query_selector(selector)?
		.ok_or_else(|| ZueError::InvalidMountTarget(selector.to_string()))
}

/// Put a compiled `fragment` into `document` at the element matched by
/// `selector`.
///
/// The selector is resolved again after the swap and the path of the
/// mounted element is returned, so callers always hold the live target
/// rather than the detached one.
pub fn mount(
	document: &mut Document,
	selector: &str,
	fragment: Node,
	strategy: MountStrategy,
) -> ZueResult<NodePath> {
	let target = resolve_target(document, selector)?;
	tracing::debug!(%selector, ?strategy, path = ?target, "mounting fragment");

	match strategy {
		MountStrategy::Replace => {
			document
				.replace(&target, fragment)
				.ok_or_else(|| ZueError::InvalidMountTarget(selector.to_string()))?;
		}
		MountStrategy::Append => {
			let Some(Node::Element(element)) = document.get_mut(&target) else {
				return Err(ZueError::InvalidMountTarget(selector.to_string()));
			};

			element.children.clear();
			match fragment {
				Node::Element(compiled) => element.children.extend(compiled.children),
				text @ Node::Text(_) => element.children.push(text),
			}
		}
	}

	resolve_target(document, selector)
}
