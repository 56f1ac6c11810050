use std::cell::Cell;
use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use serde::Serialize;

use crate::ObservedArray;
use crate::Value;

/// What kind of mutation produced a [`Change`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
	/// A property was written, added or removed.
	Set,
	/// An array was changed by one of its mutating methods.
	Array,
}

/// A single mutation notification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Change {
	pub kind: ChangeKind,
	/// Dotted path of the changed property or array from the data root.
	pub path: String,
	/// The new value. For [`ChangeKind::Array`] this is the new length.
	pub value: Value,
}

impl Change {
	pub fn set(path: impl Into<String>, value: impl Into<Value>) -> Self {
		Self {
			kind: ChangeKind::Set,
			path: path.into(),
			value: value.into(),
		}
	}

	pub fn array(path: impl Into<String>, length: usize) -> Self {
		Self {
			kind: ChangeKind::Array,
			path: path.into(),
			value: Value::from(length),
		}
	}
}

impl fmt::Display for Change {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let kind = match self.kind {
			ChangeKind::Set => "set",
			ChangeKind::Array => "array",
		};

		write!(f, "{kind} {} = {}", self.path, self.value)
	}
}

/// Handle returned by [`Observer::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(usize);

type Subscriber = Rc<dyn Fn(&Change)>;

/// Receives every change made to the data it is bound to.
///
/// Changes are recorded in the order the mutations happened and forwarded
/// synchronously to subscribers in registration order. Nothing is batched or
/// deduplicated. A subscriber may mutate data itself; the resulting changes
/// are recorded after the one being delivered.
#[derive(Default)]
pub struct Observer {
	changes: RefCell<Vec<Change>>,
	subscribers: RefCell<Vec<(SubscriptionId, Subscriber)>>,
	next_id: Cell<usize>,
}

impl Observer {
	pub fn new() -> Rc<Self> {
		Rc::new(Self::default())
	}

	/// The single entry point for mutation hooks.
	pub fn notify(&self, change: Change) {
		tracing::debug!(kind = ?change.kind, path = %change.path, value = %change.value, "change");
		self.changes.borrow_mut().push(change.clone());

		let subscribers: Vec<Subscriber> = self
			.subscribers
			.borrow()
			.iter()
			.map(|(_, subscriber)| subscriber.clone())
			.collect();

		for subscriber in subscribers {
			subscriber(&change);
		}
	}

	pub fn subscribe(&self, subscriber: impl Fn(&Change) + 'static) -> SubscriptionId {
		let id = SubscriptionId(self.next_id.get());
		self.next_id.set(id.0 + 1);
		self.subscribers
			.borrow_mut()
			.push((id, Rc::new(subscriber)));

		id
	}

	/// Returns `false` if the subscription was already removed.
	pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
		let mut subscribers = self.subscribers.borrow_mut();
		let before = subscribers.len();
		subscribers.retain(|(existing, _)| *existing != id);
		subscribers.len() != before
	}

	/// Every change recorded since the last [`Observer::take_changes`].
	pub fn changes(&self) -> Vec<Change> {
		self.changes.borrow().clone()
	}

	/// Drain the recorded changes.
	pub fn take_changes(&self) -> Vec<Change> {
		std::mem::take(&mut *self.changes.borrow_mut())
	}

	pub fn len(&self) -> usize {
		self.changes.borrow().len()
	}

	pub fn is_empty(&self) -> bool {
		self.changes.borrow().is_empty()
	}
}

impl fmt::Debug for Observer {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Observer")
			.field("changes", &self.changes.borrow())
			.field("subscribers", &self.subscribers.borrow().len())
			.finish()
	}
}

/// Intercept every enumerable property of `value` (recursively) and bind it
/// to `observer` as the data root. Arrays are instrumented. Scalars are left
/// alone.
pub fn observe(value: &Value, observer: &Rc<Observer>) {
	observe_at(value, observer, "", &mut HashSet::new());
}

/// Bind the mutating methods of this array instance to `observer` and observe
/// its current elements. Other arrays are unaffected.
pub fn instrument_array(array: &ObservedArray, observer: &Rc<Observer>) {
	observe_at(&Value::Array(array.clone()), observer, "", &mut HashSet::new());
}

/// `seen` holds the addresses of containers visited during this pass so a
/// value that contains itself terminates.
pub(crate) fn observe_at(
	value: &Value,
	observer: &Rc<Observer>,
	path: &str,
	seen: &mut HashSet<usize>,
) {
	match value {
		Value::Object(object) => {
			if !seen.insert(object.addr()) {
				return;
			}

			let Some(fresh) = object.bind(observer, path) else {
				return;
			};

			for (key, child) in object.intercept_properties(fresh) {
				observe_at(&child, observer, &join_path(path, &key), seen);
			}
		}
		Value::Array(array) => {
			if !seen.insert(array.addr()) || !array.bind(observer, path) {
				return;
			}

			observe_elements(array, observer, path, seen);
		}
		_ => {}
	}
}

/// Observe each element at its current index. Called after every mutation so
/// inserted elements are intercepted and shifted ones get their new paths.
pub(crate) fn observe_elements(
	array: &ObservedArray,
	observer: &Rc<Observer>,
	path: &str,
	seen: &mut HashSet<usize>,
) {
	seen.insert(array.addr());
	for (index, item) in array.to_vec().iter().enumerate() {
		observe_at(item, observer, &join_path(path, &index.to_string()), seen);
	}
}

pub(crate) fn join_path(prefix: &str, key: &str) -> String {
	if prefix.is_empty() {
		key.to_string()
	} else {
		format!("{prefix}.{key}")
	}
}
