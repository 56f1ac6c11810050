use std::rc::Rc;

use crate::Document;
use crate::Node;
use crate::NodePath;
use crate::ObservedObject;
use crate::Observer;
use crate::RenderOptions;
use crate::Value;
use crate::ZueError;
use crate::ZueResult;
use crate::compile;
use crate::mount;
use crate::observe;
use crate::resolve_target;

/// Options for creating a [`View`].
#[derive(Debug, Clone, Default)]
pub struct ViewOptions {
	/// Selector of the element whose subtree becomes the template.
	pub el: String,
	/// Root data. Must be an object, or `Undefined` for an empty one.
	pub data: Value,
	pub render: RenderOptions,
}

/// A mounted view: a frozen template, its observed data and the document the
/// rendered output lives in.
#[derive(Debug)]
pub struct View {
	document: Document,
	selector: String,
	el: NodePath,
	template: Node,
	data: ObservedObject,
	/// Exposes every data key through proxy slots.
	scope: ObservedObject,
	observer: Rc<Observer>,
	options: RenderOptions,
}

impl View {
	/// Resolve the mount target, freeze a copy of it as the template, observe
	/// the data and perform the first render.
	pub fn new(document: Document, options: ViewOptions) -> ZueResult<Self> {
		let ViewOptions {
			el: selector,
			data,
			render,
		} = options;

		let el = resolve_target(&document, &selector)?;
		let template = document
			.get(&el)
			.cloned()
			.ok_or_else(|| ZueError::InvalidMountTarget(selector.clone()))?;

		let data = match data {
			Value::Object(object) => object,
			Value::Undefined => ObservedObject::new(),
			other => return Err(ZueError::InvalidData(other.type_name().to_string())),
		};

		let observer = Observer::new();
		observe(&Value::Object(data.clone()), &observer);

		let scope = ObservedObject::new();
		for key in data.keys() {
			scope.proxy(&data, &key);
		}

		tracing::debug!(%selector, keys = data.len(), "creating view");

		let mut view = Self {
			document,
			selector,
			el,
			template,
			data,
			scope,
			observer,
			options: render,
		};
		view.render()?;

		Ok(view)
	}

	/// Compile the frozen template against the current data and mount the
	/// result.
	pub fn render(&mut self) -> ZueResult<()> {
		let fragment = compile(&self.template, &self.data, &self.options);
		self.el = mount(
			&mut self.document,
			&self.selector,
			fragment,
			self.options.mount,
		)?;
		tracing::debug!(selector = %self.selector, "rendered view");

		Ok(())
	}

	/// Drain pending changes and render again if there were any. Returns
	/// whether a render happened.
	pub fn update(&mut self) -> ZueResult<bool> {
		let changes = self.observer.take_changes();
		if changes.is_empty() {
			return Ok(false);
		}

		tracing::debug!(changes = changes.len(), "updating view");
		self.render()?;

		Ok(true)
	}

	/// Read a top-level data property.
	pub fn get(&self, key: &str) -> Value {
		self.expose(key);
		self.scope.get(key)
	}

	/// Write a top-level data property. Keys the data does not have are kept
	/// on the view itself and never trigger a render.
	pub fn set(&self, key: &str, value: impl Into<Value>) {
		self.expose(key);
		self.scope.set(key, value);
	}

	/// Add a reactive top-level property. Returns `false` when the key
	/// already exists.
	pub fn add(&self, key: &str, value: impl Into<Value>) -> bool {
		let added = self.data.add_property(key, value, true);
		if added {
			self.scope.proxy(&self.data, key);
		}
		added
	}

	/// Proxy a data key onto the scope if it appeared after construction.
	fn expose(&self, key: &str) {
		if !self.scope.has_own(key) && self.data.has_own(key) {
			self.scope.proxy(&self.data, key);
		}
	}

	pub fn data(&self) -> &ObservedObject {
		&self.data
	}

	pub fn observer(&self) -> &Rc<Observer> {
		&self.observer
	}

	/// The frozen template subtree.
	pub fn template(&self) -> &Node {
		&self.template
	}

	pub fn document(&self) -> &Document {
		&self.document
	}

	pub fn selector(&self) -> &str {
		&self.selector
	}

	pub fn options(&self) -> RenderOptions {
		self.options
	}

	/// The currently mounted element.
	pub fn el(&self) -> Option<&Node> {
		self.document.get(&self.el)
	}

	pub fn el_path(&self) -> &NodePath {
		&self.el
	}

	/// Render the whole document as markup.
	pub fn html(&self) -> String {
		self.document.to_string()
	}
}
