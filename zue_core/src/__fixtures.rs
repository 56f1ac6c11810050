use std::cell::RefCell;
use std::rc::Rc;

use crate::Change;
use crate::Document;
use crate::ObservedObject;
use crate::Observer;
use crate::Value;
use crate::observe;
use crate::parse_markup;

/// Build an unobserved object from json.
pub fn object(json: serde_json::Value) -> ObservedObject {
	match Value::from(json) {
		Value::Object(object) => object,
		other => panic!("expected an object, found {}", other.type_name()),
	}
}

/// Build an object from json and observe it with a fresh observer.
pub fn observed(json: serde_json::Value) -> (ObservedObject, Rc<Observer>) {
	let data = object(json);
	let observer = Observer::new();
	observe(&Value::Object(data.clone()), &observer);
	(data, observer)
}

pub fn document(source: &str) -> Document {
	parse_markup(source).unwrap_or_else(|e| panic!("markup should parse: {e}"))
}

pub fn person() -> serde_json::Value {
	serde_json::json!({
		"user": { "name": "Ann", "age": 4 },
		"items": [1, 2, 3],
	})
}

/// Subscribe a recorder that collects every delivered change as a string.
pub fn record(observer: &Observer) -> Rc<RefCell<Vec<String>>> {
	let log = Rc::new(RefCell::new(vec![]));
	let sink = log.clone();
	observer.subscribe(move |change: &Change| sink.borrow_mut().push(change.to_string()));
	log
}
