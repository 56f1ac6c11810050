use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::fmt::Display;
use std::rc::Rc;

use indexmap::IndexMap;
use serde::Serialize;
use serde::Serializer;

use crate::observer::Change;
use crate::observer::Observer;
use crate::observer::join_path;
use crate::observer::observe_at;

/// A value stored in view data.
///
/// Objects and arrays are shared handles: cloning a `Value` clones the handle,
/// so a clone observes and mutates the same underlying container.
#[derive(Debug, Clone, Default)]
pub enum Value {
	#[default]
	Undefined,
	Null,
	Bool(bool),
	Number(f64),
	String(String),
	Array(ObservedArray),
	Object(ObservedObject),
}

impl Value {
	/// Identity comparison used for change detection. Scalars compare by value
	/// (with `NaN` equal to itself), containers by handle.
	pub fn same_value(&self, other: &Value) -> bool {
		match (self, other) {
			(Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
			(Value::Bool(a), Value::Bool(b)) => a == b,
			(Value::Number(a), Value::Number(b)) => a == b || (a.is_nan() && b.is_nan()),
			(Value::String(a), Value::String(b)) => a == b,
			(Value::Array(a), Value::Array(b)) => a.ptr_eq(b),
			(Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
			_ => false,
		}
	}

	pub fn is_undefined(&self) -> bool {
		matches!(self, Value::Undefined)
	}

	pub fn as_object(&self) -> Option<&ObservedObject> {
		match self {
			Value::Object(object) => Some(object),
			_ => None,
		}
	}

	pub fn as_array(&self) -> Option<&ObservedArray> {
		match self {
			Value::Array(array) => Some(array),
			_ => None,
		}
	}

	pub fn as_f64(&self) -> Option<f64> {
		match self {
			Value::Number(number) => Some(*number),
			_ => None,
		}
	}

	/// Short name of the variant, used in error messages.
	pub fn type_name(&self) -> &'static str {
		match self {
			Value::Undefined => "undefined",
			Value::Null => "null",
			Value::Bool(_) => "boolean",
			Value::Number(_) => "number",
			Value::String(_) => "string",
			Value::Array(_) => "array",
			Value::Object(_) => "object",
		}
	}

	/// Read a single path segment from this value. Objects are indexed by
	/// key, arrays by position, and both arrays and strings expose `length`.
	pub fn get_segment(&self, segment: &str) -> Value {
		match self {
			Value::Object(object) => object.get(segment),
			Value::Array(array) => {
				if segment == "length" {
					return Value::Number(array.len() as f64);
				}

				segment
					.parse::<usize>()
					.map_or(Value::Undefined, |index| array.get(index))
			}
			Value::String(string) if segment == "length" => {
				Value::Number(string.chars().count() as f64)
			}
			_ => Value::Undefined,
		}
	}

	/// Walk a dotted path (`user.address.city`) one segment at a time.
	pub fn resolve(&self, path: &str) -> Value {
		path.split('.')
			.map(str::trim)
			.fold(self.clone(), |current, segment| {
				if current.is_undefined() {
					current
				} else {
					current.get_segment(segment)
				}
			})
	}

	/// Build a value tree from json. The result is not observed.
	pub fn from_json(json: &serde_json::Value) -> Value {
		match json {
			serde_json::Value::Null => Value::Null,
			serde_json::Value::Bool(bool) => Value::Bool(*bool),
			serde_json::Value::Number(number) => Value::Number(number.as_f64().unwrap_or(f64::NAN)),
			serde_json::Value::String(string) => Value::String(string.clone()),
			serde_json::Value::Array(items) => {
				Value::Array(ObservedArray::from_vec(
					items.iter().map(Value::from_json).collect(),
				))
			}
			serde_json::Value::Object(map) => {
				let object = ObservedObject::new();
				for (key, value) in map {
					object.define(key, Value::from_json(value), true);
				}
				Value::Object(object)
			}
		}
	}

	/// Snapshot the current contents as json. `undefined` becomes `null`, as
	/// does a container met again while it is still being converted.
	pub fn to_json(&self) -> serde_json::Value {
		self.to_json_at(&mut HashSet::new())
	}

	fn to_json_at(&self, seen: &mut HashSet<usize>) -> serde_json::Value {
		match self {
			Value::Undefined | Value::Null => serde_json::Value::Null,
			Value::Bool(bool) => serde_json::Value::Bool(*bool),
			Value::Number(number) if number.fract() == 0.0 && number.abs() < 9.0e15 => {
				serde_json::Value::from(*number as i64)
			}
			Value::Number(number) => {
				serde_json::Number::from_f64(*number)
					.map_or(serde_json::Value::Null, serde_json::Value::Number)
			}
			Value::String(string) => serde_json::Value::String(string.clone()),
			Value::Array(array) => {
				if !seen.insert(array.addr()) {
					return serde_json::Value::Null;
				}

				let items: Vec<_> = array.to_vec().iter().map(|item| item.to_json_at(seen)).collect();
				seen.remove(&array.addr());
				serde_json::Value::Array(items)
			}
			Value::Object(object) => {
				if !seen.insert(object.addr()) {
					return serde_json::Value::Null;
				}

				let entries: serde_json::Map<_, _> = object
					.entries()
					.into_iter()
					.map(|(key, value)| (key, value.to_json_at(seen)))
					.collect();
				seen.remove(&object.addr());
				serde_json::Value::Object(entries)
			}
		}
	}
}

impl PartialEq for Value {
	fn eq(&self, other: &Self) -> bool {
		self.same_value(other)
	}
}

/// The string form used when a value is substituted into text. An array that
/// contains itself prints the inner occurrence as empty.
impl Display for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write_value(f, self, &mut HashSet::new())
	}
}

fn write_value(
	f: &mut fmt::Formatter<'_>,
	value: &Value,
	joining: &mut HashSet<usize>,
) -> fmt::Result {
	match value {
		Value::Undefined => write!(f, "undefined"),
		Value::Null => write!(f, "null"),
		Value::Bool(bool) => write!(f, "{bool}"),
		Value::Number(number) => write_number(f, *number),
		Value::String(string) => write!(f, "{string}"),
		Value::Array(array) => {
			if !joining.insert(array.addr()) {
				return Ok(());
			}

			for (index, item) in array.to_vec().iter().enumerate() {
				if index > 0 {
					write!(f, ",")?;
				}

				if !matches!(item, Value::Undefined | Value::Null) {
					write_value(f, item, joining)?;
				}
			}

			joining.remove(&array.addr());
			Ok(())
		}
		Value::Object(_) => write!(f, "[object Object]"),
	}
}

fn write_number(f: &mut fmt::Formatter<'_>, number: f64) -> fmt::Result {
	if number.is_nan() {
		write!(f, "NaN")
	} else if number.is_infinite() {
		if number > 0.0 {
			write!(f, "Infinity")
		} else {
			write!(f, "-Infinity")
		}
	} else if number == 0.0 {
		write!(f, "0")
	} else if number.fract() == 0.0 && number.abs() < 1e21 {
		write!(f, "{number:.0}")
	} else {
		write!(f, "{number}")
	}
}

impl Serialize for Value {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		self.to_json().serialize(serializer)
	}
}

impl From<bool> for Value {
	fn from(value: bool) -> Self {
		Value::Bool(value)
	}
}

impl From<f64> for Value {
	fn from(value: f64) -> Self {
		Value::Number(value)
	}
}

impl From<i32> for Value {
	fn from(value: i32) -> Self {
		Value::Number(f64::from(value))
	}
}

impl From<i64> for Value {
	fn from(value: i64) -> Self {
		Value::Number(value as f64)
	}
}

impl From<usize> for Value {
	fn from(value: usize) -> Self {
		Value::Number(value as f64)
	}
}

impl From<&str> for Value {
	fn from(value: &str) -> Self {
		Value::String(value.to_string())
	}
}

impl From<String> for Value {
	fn from(value: String) -> Self {
		Value::String(value)
	}
}

impl From<ObservedObject> for Value {
	fn from(value: ObservedObject) -> Self {
		Value::Object(value)
	}
}

impl From<ObservedArray> for Value {
	fn from(value: ObservedArray) -> Self {
		Value::Array(value)
	}
}

impl From<Vec<Value>> for Value {
	fn from(value: Vec<Value>) -> Self {
		Value::Array(ObservedArray::from_vec(value))
	}
}

impl From<&serde_json::Value> for Value {
	fn from(value: &serde_json::Value) -> Self {
		Value::from_json(value)
	}
}

impl From<serde_json::Value> for Value {
	fn from(value: serde_json::Value) -> Self {
		Value::from_json(&value)
	}
}

/// The observer a container reports to, and the container's own path from
/// the data root.
#[derive(Clone)]
pub(crate) struct Binding {
	pub(crate) observer: Rc<Observer>,
	pub(crate) path: String,
}

impl Binding {
	/// Whether a bind to `observer` at `path` should leave this binding alone.
	/// That is the case for the same path and for any path below it, so a
	/// container stored inside itself keeps its shortest path.
	fn covers(&self, observer: &Rc<Observer>, path: &str) -> bool {
		Rc::ptr_eq(&self.observer, observer)
			&& (self.path == path
				|| self.path.is_empty()
				|| path
					.strip_prefix(self.path.as_str())
					.is_some_and(|rest| rest.starts_with('.')))
	}
}

/// Backing storage for one property.
#[derive(Clone)]
enum Slot {
	/// Raw storage. Writes are never reported.
	Plain(Value),
	/// Intercepted storage. Writes through [`ObservedObject::set`] are
	/// reported to the bound observer.
	Observed(Value),
	/// Reads and writes are forwarded to the same key on another object.
	Proxy(ObservedObject),
}

#[derive(Clone)]
struct Property {
	slot: Slot,
	enumerable: bool,
}

#[derive(Default)]
struct ObjectState {
	properties: IndexMap<String, Property>,
	binding: Option<Binding>,
}

/// A shared key-value object whose properties can be intercepted.
#[derive(Clone, Default)]
pub struct ObservedObject(Rc<RefCell<ObjectState>>);

impl ObservedObject {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn ptr_eq(&self, other: &ObservedObject) -> bool {
		Rc::ptr_eq(&self.0, &other.0)
	}

	pub(crate) fn addr(&self) -> usize {
		Rc::as_ptr(&self.0).cast::<()>() as usize
	}

	/// Number of own properties, enumerable or not.
	pub fn len(&self) -> usize {
		self.0.borrow().properties.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.borrow().properties.is_empty()
	}

	pub fn has_own(&self, key: &str) -> bool {
		self.0.borrow().properties.contains_key(key)
	}

	/// Enumerable keys in insertion order.
	pub fn keys(&self) -> Vec<String> {
		self.0
			.borrow()
			.properties
			.iter()
			.filter(|(_, property)| property.enumerable)
			.map(|(key, _)| key.clone())
			.collect()
	}

	/// Enumerable key/value pairs in insertion order.
	pub fn entries(&self) -> Vec<(String, Value)> {
		self.keys()
			.into_iter()
			.map(|key| {
				let value = self.get(&key);
				(key, value)
			})
			.collect()
	}

	/// Whether writes to `key` are reported.
	pub fn is_intercepted(&self, key: &str) -> bool {
		let state = self.0.borrow();
		match state.properties.get(key).map(|property| &property.slot) {
			Some(Slot::Observed(_)) => true,
			Some(Slot::Proxy(from)) => from.is_intercepted(key),
			_ => false,
		}
	}

	pub fn is_observed(&self) -> bool {
		self.0.borrow().binding.is_some()
	}

	/// Path of this object from the data root, once observed. The root
	/// object's path is the empty string.
	pub fn path(&self) -> Option<String> {
		self.0
			.borrow()
			.binding
			.as_ref()
			.map(|binding| binding.path.clone())
	}

	pub fn observer(&self) -> Option<Rc<Observer>> {
		self.0
			.borrow()
			.binding
			.as_ref()
			.map(|binding| binding.observer.clone())
	}

	/// Read a property. Absent keys read as [`Value::Undefined`].
	pub fn get(&self, key: &str) -> Value {
		let slot = {
			let state = self.0.borrow();
			match state.properties.get(key) {
				Some(property) => property.slot.clone(),
				None => return Value::Undefined,
			}
		};

		match slot {
			Slot::Plain(value) | Slot::Observed(value) => value,
			Slot::Proxy(from) => from.get(key),
		}
	}

	/// Resolve a dotted path against this object.
	pub fn resolve(&self, path: &str) -> Value {
		Value::Object(self.clone()).resolve(path)
	}

	/// Write a property.
	///
	/// Intercepted properties observe container values before storing them
	/// and report a [`Change`] when the value actually changed. Writing a key
	/// that does not exist creates a plain property, which is never reported;
	/// use [`ObservedObject::add_property`] for an observable addition.
	pub fn set(&self, key: &str, value: impl Into<Value>) {
		let value = value.into();
		let (slot, binding) = {
			let state = self.0.borrow();
			(
				state.properties.get(key).map(|property| property.slot.clone()),
				state.binding.clone(),
			)
		};

		match slot {
			Some(Slot::Proxy(from)) => from.set(key, value),
			Some(Slot::Observed(_)) => self.set_observed(key, value, binding),
			Some(Slot::Plain(_)) => {
				self.write_slot(key, Slot::Plain(value));
			}
			None => {
				self.0.borrow_mut().properties.insert(
					key.to_string(),
					Property {
						slot: Slot::Plain(value),
						enumerable: true,
					},
				);
			}
		}
	}

	fn set_observed(&self, key: &str, value: Value, binding: Option<Binding>) {
		let path = binding.as_ref().map(|binding| join_path(&binding.path, key));
		if let (Some(binding), Some(path)) = (&binding, &path) {
			observe_at(&value, &binding.observer, path, &mut HashSet::new());
		}

		let old = self.write_slot(key, Slot::Observed(value.clone()));
		if old.same_value(&value) {
			return;
		}

		if let (Some(binding), Some(path)) = (binding, path) {
			binding.observer.notify(Change::set(path, value));
		}
	}

	/// Replace the slot for an existing key, returning the previous value.
	fn write_slot(&self, key: &str, slot: Slot) -> Value {
		let mut state = self.0.borrow_mut();
		let Some(property) = state.properties.get_mut(key) else {
			return Value::Undefined;
		};

		match std::mem::replace(&mut property.slot, slot) {
			Slot::Plain(old) | Slot::Observed(old) => old,
			Slot::Proxy(_) => Value::Undefined,
		}
	}

	/// Define a raw property, overwriting any existing slot. Nothing is
	/// observed or reported.
	pub fn define(&self, key: &str, value: impl Into<Value>, enumerable: bool) {
		self.0.borrow_mut().properties.insert(
			key.to_string(),
			Property {
				slot: Slot::Plain(value.into()),
				enumerable,
			},
		);
	}

	/// Make `key` on this object read and write through to `key` on `from`.
	/// Returns `false` without changing anything when `key` already exists
	/// here.
	pub fn proxy(&self, from: &ObservedObject, key: &str) -> bool {
		if self.has_own(key) {
			return false;
		}

		self.0.borrow_mut().properties.insert(
			key.to_string(),
			Property {
				slot: Slot::Proxy(from.clone()),
				enumerable: true,
			},
		);

		true
	}

	/// Add a new observed property and report it. Returns `false` and does
	/// nothing when the key already exists.
	pub fn add_property(&self, key: &str, value: impl Into<Value>, enumerable: bool) -> bool {
		if self.has_own(key) {
			return false;
		}

		let value = value.into();
		let binding = self.0.borrow().binding.clone();
		let path = binding.as_ref().map(|binding| join_path(&binding.path, key));
		if let (Some(binding), Some(path)) = (&binding, &path) {
			observe_at(&value, &binding.observer, path, &mut HashSet::new());
		}

		self.0.borrow_mut().properties.insert(
			key.to_string(),
			Property {
				slot: Slot::Observed(value.clone()),
				enumerable,
			},
		);

		if let (Some(binding), Some(path)) = (binding, path) {
			binding.observer.notify(Change::set(path, value));
		}

		true
	}

	/// Delete a property and report it as set to `undefined`. Returns `false`
	/// and does nothing when the key is absent.
	pub fn remove_property(&self, key: &str) -> bool {
		let (removed, binding) = {
			let mut state = self.0.borrow_mut();
			(
				state.properties.shift_remove(key).is_some(),
				state.binding.clone(),
			)
		};

		if !removed {
			return false;
		}

		if let Some(binding) = binding {
			binding.observer.notify(Change::set(
				join_path(&binding.path, key),
				Value::Undefined,
			));
		}

		true
	}

	/// Bind to `observer` at `path`. Returns `None` when already bound there or
	/// at an ancestor of `path`, `Some(true)` when this is the first binding to `observer` and
	/// `Some(false)` when only the path moved.
	pub(crate) fn bind(&self, observer: &Rc<Observer>, path: &str) -> Option<bool> {
		let mut state = self.0.borrow_mut();
		let fresh = match &state.binding {
			Some(binding) if binding.covers(observer, path) => return None,
			Some(binding) => !Rc::ptr_eq(&binding.observer, observer),
			None => true,
		};

		state.binding = Some(Binding {
			observer: observer.clone(),
			path: path.to_string(),
		});

		Some(fresh)
	}

	/// Return the intercepted values so they can be observed in turn. When
	/// `fresh`, every enumerable raw property is converted into an
	/// intercepted one first; otherwise raw properties stay unobserved.
	pub(crate) fn intercept_properties(&self, fresh: bool) -> Vec<(String, Value)> {
		let mut state = self.0.borrow_mut();
		let mut values = Vec::new();

		for (key, property) in &mut state.properties {
			let value = match &property.slot {
				Slot::Plain(value) if fresh && property.enumerable => value.clone(),
				Slot::Observed(value) => value.clone(),
				Slot::Plain(_) | Slot::Proxy(_) => continue,
			};

			property.slot = Slot::Observed(value.clone());
			values.push((key.clone(), value));
		}

		values
	}
}

impl fmt::Debug for ObservedObject {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		debug_once(self.addr(), f, |f| f.debug_map().entries(self.entries()).finish())
	}
}

#[derive(Default)]
struct ArrayState {
	items: Vec<Value>,
	binding: Option<Binding>,
}

/// A shared array. Once instrumented, its mutating methods report changes.
#[derive(Clone, Default)]
pub struct ObservedArray(Rc<RefCell<ArrayState>>);

impl ObservedArray {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn from_vec(items: Vec<Value>) -> Self {
		Self(Rc::new(RefCell::new(ArrayState {
			items,
			binding: None,
		})))
	}

	pub fn ptr_eq(&self, other: &ObservedArray) -> bool {
		Rc::ptr_eq(&self.0, &other.0)
	}

	pub(crate) fn addr(&self) -> usize {
		Rc::as_ptr(&self.0).cast::<()>() as usize
	}

	pub fn len(&self) -> usize {
		self.0.borrow().items.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.borrow().items.is_empty()
	}

	/// Element at `index`, or [`Value::Undefined`] when out of range.
	pub fn get(&self, index: usize) -> Value {
		self.0
			.borrow()
			.items
			.get(index)
			.cloned()
			.unwrap_or_default()
	}

	/// Snapshot of the current elements.
	pub fn to_vec(&self) -> Vec<Value> {
		self.0.borrow().items.clone()
	}

	/// Whether the mutating methods of this instance report to an observer.
	pub fn is_instrumented(&self) -> bool {
		self.0.borrow().binding.is_some()
	}

	pub fn path(&self) -> Option<String> {
		self.0
			.borrow()
			.binding
			.as_ref()
			.map(|binding| binding.path.clone())
	}

	pub(crate) fn binding(&self) -> Option<Binding> {
		self.0.borrow().binding.clone()
	}

	pub(crate) fn bind(&self, observer: &Rc<Observer>, path: &str) -> bool {
		let mut state = self.0.borrow_mut();
		if state
			.binding
			.as_ref()
			.is_some_and(|binding| binding.covers(observer, path))
		{
			return false;
		}

		state.binding = Some(Binding {
			observer: observer.clone(),
			path: path.to_string(),
		});

		true
	}

	/// Run `operation` against the raw element storage. The borrow is released
	/// before the caller observes or notifies anything.
	pub(crate) fn with_items<R>(&self, operation: impl FnOnce(&mut Vec<Value>) -> R) -> R {
		let mut state = self.0.borrow_mut();
		operation(&mut state.items)
	}
}

impl fmt::Debug for ObservedArray {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		debug_once(self.addr(), f, |f| f.debug_list().entries(self.to_vec()).finish())
	}
}

thread_local! {
	/// Containers whose `Debug` output is in progress on this thread.
	static DEBUGGING: RefCell<HashSet<usize>> = RefCell::new(HashSet::new());
}

fn debug_once(
	addr: usize,
	f: &mut fmt::Formatter<'_>,
	body: impl FnOnce(&mut fmt::Formatter<'_>) -> fmt::Result,
) -> fmt::Result {
	if !DEBUGGING.with_borrow_mut(|containers| containers.insert(addr)) {
		return write!(f, "[Circular]");
	}

	let result = body(f);
	DEBUGGING.with_borrow_mut(|containers| containers.remove(&addr));
	result
}
