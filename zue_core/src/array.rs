use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::ObservedArray;
use crate::Value;
use crate::observer::Change;
use crate::observer::observe_elements;

/// The array methods that alter an array in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArrayMethod {
	Push,
	Pop,
	Shift,
	Unshift,
	Splice,
	Sort,
	Reverse,
}

impl ArrayMethod {
	pub const ALL: [ArrayMethod; 7] = [
		ArrayMethod::Push,
		ArrayMethod::Pop,
		ArrayMethod::Shift,
		ArrayMethod::Unshift,
		ArrayMethod::Splice,
		ArrayMethod::Sort,
		ArrayMethod::Reverse,
	];

	pub fn name(self) -> &'static str {
		match self {
			ArrayMethod::Push => "push",
			ArrayMethod::Pop => "pop",
			ArrayMethod::Shift => "shift",
			ArrayMethod::Unshift => "unshift",
			ArrayMethod::Splice => "splice",
			ArrayMethod::Sort => "sort",
			ArrayMethod::Reverse => "reverse",
		}
	}
}

impl fmt::Display for ArrayMethod {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

impl FromStr for ArrayMethod {
	type Err = String;

	fn from_str(name: &str) -> Result<Self, Self::Err> {
		ArrayMethod::ALL
			.into_iter()
			.find(|method| method.name() == name)
			.ok_or_else(|| name.to_string())
	}
}

impl ObservedArray {
	/// Append `value` and return the new length.
	pub fn push(&self, value: impl Into<Value>) -> usize {
		self.push_all(vec![value.into()])
	}

	/// Append every value with a single notification and return the new
	/// length.
	pub fn push_all(&self, values: Vec<Value>) -> usize {
		self.mutate(ArrayMethod::Push, |items| {
			items.extend(values);
			items.len()
		})
	}

	/// Remove and return the last element.
	pub fn pop(&self) -> Option<Value> {
		self.mutate(ArrayMethod::Pop, Vec::pop)
	}

	/// Remove and return the first element.
	pub fn shift(&self) -> Option<Value> {
		self.mutate(ArrayMethod::Shift, |items| {
			if items.is_empty() {
				None
			} else {
				Some(items.remove(0))
			}
		})
	}

	/// Prepend `value` and return the new length.
	pub fn unshift(&self, value: impl Into<Value>) -> usize {
		self.unshift_all(vec![value.into()])
	}

	/// Prepend every value, keeping their order, and return the new length.
	pub fn unshift_all(&self, values: Vec<Value>) -> usize {
		self.mutate(ArrayMethod::Unshift, |items| {
			items.splice(0..0, values);
			items.len()
		})
	}

	/// Remove `delete_count` elements starting at `start`, insert `values` in
	/// their place and return the removed elements. Both bounds are clamped
	/// to the array.
	pub fn splice(&self, start: usize, delete_count: usize, values: Vec<Value>) -> Vec<Value> {
		self.mutate(ArrayMethod::Splice, |items| {
			let start = start.min(items.len());
			let end = start.saturating_add(delete_count).min(items.len());
			items.splice(start..end, values).collect()
		})
	}

	/// Sort by string form, with `undefined` last.
	pub fn sort(&self) {
		self.sort_by(default_order);
	}

	pub fn sort_by(&self, compare: impl FnMut(&Value, &Value) -> Ordering) {
		self.mutate(ArrayMethod::Sort, |items| items.sort_by(compare));
	}

	pub fn reverse(&self) {
		self.mutate(ArrayMethod::Reverse, |items| items.reverse());
	}

	/// Invoke a mutating method by name with untyped arguments and return
	/// what the native method would.
	pub fn call(&self, method: ArrayMethod, args: Vec<Value>) -> Value {
		match method {
			ArrayMethod::Push => Value::from(self.push_all(args)),
			ArrayMethod::Pop => self.pop().unwrap_or_default(),
			ArrayMethod::Shift => self.shift().unwrap_or_default(),
			ArrayMethod::Unshift => Value::from(self.unshift_all(args)),
			ArrayMethod::Splice => {
				let mut args = args.into_iter();
				let len = self.len();
				let start = args
					.next()
					.map_or(0, |start| relative_index(&start, len));
				let delete_count = args.next().map_or(len.saturating_sub(start), |count| {
					count.as_f64().map_or(0, |count| count.max(0.0) as usize)
				});

				Value::from(self.splice(start, delete_count, args.collect()))
			}
			ArrayMethod::Sort => {
				self.sort();
				Value::Array(self.clone())
			}
			ArrayMethod::Reverse => {
				self.reverse();
				Value::Array(self.clone())
			}
		}
	}

	/// Run `operation` on the elements, then observe the elements at their
	/// new positions and report the new length once.
	fn mutate<R>(&self, method: ArrayMethod, operation: impl FnOnce(&mut Vec<Value>) -> R) -> R {
		let result = self.with_items(operation);
		let Some(binding) = self.binding() else {
			return result;
		};

		observe_elements(self, &binding.observer, &binding.path, &mut HashSet::new());
		tracing::trace!(%method, path = %binding.path, "array mutation");
		binding.observer.notify(Change::array(binding.path, self.len()));

		result
	}
}

fn default_order(a: &Value, b: &Value) -> Ordering {
	match (a, b) {
		(Value::Undefined, Value::Undefined) => Ordering::Equal,
		(Value::Undefined, _) => Ordering::Greater,
		(_, Value::Undefined) => Ordering::Less,
		_ => a.to_string().cmp(&b.to_string()),
	}
}

/// Negative positions count back from the end, as with a native `splice`.
fn relative_index(value: &Value, len: usize) -> usize {
	let Some(index) = value.as_f64() else {
		return 0;
	};

	if index < 0.0 {
		len.saturating_sub((-index) as usize)
	} else {
		(index as usize).min(len)
	}
}
