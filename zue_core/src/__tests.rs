use std::path::PathBuf;

use rstest::rstest;
use similar_asserts::assert_eq;
use tracing_test::traced_test;

use super::__fixtures::*;
use super::*;
use crate::lexer::decode_entities;

// --- Interpolation tests ---

#[test]
fn parse_splits_literals_and_placeholders_in_order() {
	let tokens = parse("a{{x}}b{{y}}c");
	let expected = vec![
		Token::Literal("a".into()),
		Token::Placeholder {
			path: "x".into(),
			raw: "{{x}}".into(),
		},
		Token::Literal("b".into()),
		Token::Placeholder {
			path: "y".into(),
			raw: "{{y}}".into(),
		},
		Token::Literal("c".into()),
	];

	assert_eq!(tokens, Some(expected));
}

#[rstest]
#[case::empty("")]
#[case::plain("just some text")]
#[case::single_braces("{x}")]
#[case::unterminated("{{ x }")]
#[case::whitespace("   \n\t")]
fn parse_returns_none_without_markers(#[case] text: &str) {
	assert_eq!(parse(text), None);
	assert!(!has_interpolation(text));
}

#[rstest]
#[case::only_marker("{{x}}")]
#[case::surrounded("Hi {{ user.name }}!")]
#[case::adjacent("{{a}}{{b}}")]
#[case::triple_braces("<{{{ html }}}>")]
#[case::multiline("line one\n{{ a }}\nline two")]
fn parse_tokens_cover_the_whole_input(#[case] text: &str) {
	let tokens = parse(text).unwrap_or_else(|| panic!("expected tokens for {text:?}"));
	let rebuilt: String = tokens.iter().map(Token::source).collect();
	assert_eq!(rebuilt, text);
	assert!(
		tokens
			.iter()
			.all(|token| !matches!(token, Token::Literal(literal) if literal.is_empty()))
	);
}

#[test]
fn parse_single_marker_yields_single_token() {
	let tokens = parse("{{ count }}").unwrap_or_default();
	assert_eq!(tokens.len(), 1);
	assert_eq!(
		tokens[0],
		Token::Placeholder {
			path: "count".into(),
			raw: "{{ count }}".into(),
		}
	);
}

#[test]
fn parse_triple_braces_is_one_placeholder() {
	let tokens = parse("{{{ raw }}}").unwrap_or_default();
	assert_eq!(tokens.len(), 1);
	assert!(tokens[0].is_placeholder());
	assert_eq!(tokens[0].to_string(), "{{{ raw }}}");
	assert!(matches!(&tokens[0], Token::Placeholder { path, .. } if path == "raw"));
}

// --- Value tests ---

#[rstest]
#[case::integer(Value::from(5), "5")]
#[case::float(Value::from(1.5), "1.5")]
#[case::negative_zero(Value::from(-0.0), "0")]
#[case::nan(Value::from(f64::NAN), "NaN")]
#[case::boolean(Value::from(true), "true")]
#[case::null(Value::Null, "null")]
#[case::undefined(Value::Undefined, "undefined")]
#[case::array(Value::from(vec![Value::from(1), Value::Null, Value::from("b")]), "1,,b")]
#[case::object(Value::from(ObservedObject::new()), "[object Object]")]
fn value_display(#[case] value: Value, #[case] expected: &str) {
	assert_eq!(value.to_string(), expected);
}

#[rstest]
#[case::nested_key("user.name", Value::from("Ann"))]
#[case::array_index("items.1", Value::from(2))]
#[case::array_length("items.length", Value::from(3))]
#[case::string_length("user.name.length", Value::from(3))]
#[case::padded_segments(" user . age ", Value::from(4))]
#[case::missing_leaf("user.email", Value::Undefined)]
#[case::missing_parent("account.email", Value::Undefined)]
#[case::out_of_range("items.9", Value::Undefined)]
fn resolve_dotted_paths(#[case] path: &str, #[case] expected: Value) {
	let data = object(person());
	assert_eq!(data.resolve(path), expected);
}

#[test]
fn json_round_trip_keeps_key_order_and_integers() {
	let json = serde_json::json!({ "b": 1, "a": [true, null, 2.5], "c": { "d": "e" } });
	let value = Value::from(&json);
	assert_eq!(value.to_json(), json);
	assert_eq!(
		serde_json::to_string(&value).unwrap_or_default(),
		r#"{"b":1,"a":[true,null,2.5],"c":{"d":"e"}}"#
	);
}

// --- Interceptor tests ---

#[test]
fn intercepted_set_reports_exactly_one_change() {
	let (data, observer) = observed(person());
	let user = data.resolve("user");
	let user = user.as_object().unwrap_or_else(|| panic!("user is an object"));

	user.set("age", 5);

	assert_eq!(observer.changes(), vec![Change::set("user.age", 5)]);
	assert_eq!(data.resolve("user.age"), Value::from(5));
}

#[test]
fn top_level_set_round_trips() {
	let (data, observer) = observed(serde_json::json!({ "age": 4 }));

	data.set("age", 5);

	assert_eq!(data.get("age"), Value::from(5));
	assert_eq!(observer.take_changes(), vec![Change::set("age", 5)]);
}

#[test]
fn writing_the_same_value_is_silent() {
	let (data, observer) = observed(serde_json::json!({ "count": 1, "label": "a" }));
	data.set("count", 1);
	data.set("label", "a");
	assert!(observer.is_empty());

	data.set("count", f64::NAN);
	data.set("count", f64::NAN);
	assert_eq!(observer.len(), 1);
}

#[test]
fn observe_intercepts_every_enumerable_property() {
	let data = object(person());
	data.define("hidden", 1, false);
	let observer = Observer::new();
	observe(&Value::from(data.clone()), &observer);

	assert!(data.is_observed());
	assert!(data.is_intercepted("user"));
	assert!(data.is_intercepted("items"));
	assert!(!data.is_intercepted("hidden"));
	assert_eq!(data.path().as_deref(), Some(""));
	let user_path = data
		.resolve("user")
		.as_object()
		.and_then(ObservedObject::path);
	assert_eq!(user_path.as_deref(), Some("user"));
	assert!(
		data.resolve("items")
			.as_array()
			.is_some_and(ObservedArray::is_instrumented)
	);
}

#[test]
fn assigned_objects_are_observed_at_their_new_path() {
	let (data, observer) = observed(person());
	let address = object(serde_json::json!({ "city": "Lagos" }));

	data.set("address", address.clone());
	assert!(observer.is_empty(), "plain assignment of a new key is not reported");
	assert!(!address.is_observed());

	data.add_property("home", address.clone(), true);
	address.set("city", "Accra");

	assert_eq!(
		observer.changes(),
		vec![
			Change::set("home", address.clone()),
			Change::set("home.city", "Accra"),
		]
	);
}

#[test]
fn replacing_an_intercepted_object_observes_the_replacement() {
	let (data, observer) = observed(person());
	let next = object(serde_json::json!({ "name": "Bo" }));

	data.set("user", next.clone());
	next.set("name", "Cy");

	let paths: Vec<String> = observer.take_changes().into_iter().map(|c| c.path).collect();
	assert_eq!(paths, vec!["user", "user.name"]);
	assert!(observer.is_empty());
}

#[test]
fn plain_set_of_new_key_is_not_intercepted() {
	let (data, observer) = observed(person());
	data.set("nickname", "annie");
	data.set("nickname", "ann");

	assert!(!data.is_intercepted("nickname"));
	assert_eq!(data.get("nickname"), Value::from("ann"));
	assert!(observer.is_empty());
}

#[test]
fn add_property_reports_once() {
	let (data, observer) = observed(person());

	assert!(data.add_property("score", 10, true));
	assert!(!data.add_property("score", 20, true));

	assert_eq!(observer.changes(), vec![Change::set("score", 10)]);
	assert_eq!(data.get("score"), Value::from(10));
	assert!(data.is_intercepted("score"));
}

#[test]
fn hidden_property_resolves_and_reports() {
	let (data, observer) = observed(person());

	assert!(data.add_property("secret", 1, false));

	assert!(!data.keys().contains(&"secret".to_string()));
	assert!(data.entries().iter().all(|(key, _)| key != "secret"));
	assert_eq!(data.get("secret"), Value::from(1));
	assert_eq!(data.resolve("secret"), Value::from(1));
	assert!(data.is_intercepted("secret"));

	data.set("secret", 2);
	assert_eq!(
		observer.changes(),
		vec![Change::set("secret", 1), Change::set("secret", 2)]
	);
	assert_eq!(Value::from(data).to_json(), person());
}

#[test]
fn remove_property_reports_only_existing_keys() {
	let (data, observer) = observed(person());

	assert!(!data.remove_property("absent"));
	assert!(observer.is_empty());

	assert!(data.remove_property("items"));
	assert_eq!(observer.changes(), vec![Change::set("items", Value::Undefined)]);
	assert!(!data.has_own("items"));
}

#[test]
fn proxy_reads_and_writes_through() {
	let (data, observer) = observed(serde_json::json!({ "count": 1 }));
	let scope = ObservedObject::new();

	assert!(scope.proxy(&data, "count"));
	assert!(!scope.proxy(&data, "count"));
	assert_eq!(scope.get("count"), Value::from(1));

	scope.set("count", 2);
	assert_eq!(data.get("count"), Value::from(2));
	assert_eq!(observer.changes(), vec![Change::set("count", 2)]);
}

#[test]
fn self_referencing_data_terminates() {
	let data = object(serde_json::json!({ "name": "loop" }));
	data.define("me", data.clone(), true);
	let observer = Observer::new();

	observe(&Value::from(data.clone()), &observer);

	assert!(data.is_intercepted("me"));
	assert_eq!(data.path().as_deref(), Some(""));
	data.remove_property("me");
}

#[test]
fn assigning_an_ancestor_keeps_its_path() {
	let (data, observer) = observed(serde_json::json!({ "name": "a", "me": null, "user": {} }));
	let Some(user) = data.get("user").as_object().cloned() else {
		panic!("user should be an object");
	};

	data.set("me", data.clone());
	data.set("name", "b");
	user.add_property("self", user.clone(), true);
	user.add_property("age", 4, true);

	let paths: Vec<String> = observer.changes().into_iter().map(|change| change.path).collect();
	assert_eq!(paths, vec!["me", "name", "user.self", "user.age"]);
	assert_eq!(data.path().as_deref(), Some(""));
	assert_eq!(user.path().as_deref(), Some("user"));

	user.remove_property("self");
	data.remove_property("me");
}

#[test]
fn cyclic_values_format_without_recursing() {
	let list = ObservedArray::from_vec(vec![Value::from(1), Value::from(2)]);
	let data = object(serde_json::json!({ "label": "x" }));
	data.define("list", list.clone(), true);
	data.define("me", data.clone(), true);
	let observer = Observer::new();
	observe(&Value::from(data.clone()), &observer);

	assert_eq!(list.push(list.clone()), 3);
	assert_eq!(observer.changes(), vec![Change::array("list", 3)]);

	assert_eq!(Value::from(list.clone()).to_string(), "1,2,");
	assert_eq!(Value::from(list.clone()).to_json(), serde_json::json!([1, 2, null]));
	assert_eq!(
		serde_json::to_value(Value::from(data.clone())).ok(),
		Some(serde_json::json!({ "label": "x", "list": [1, 2, null], "me": null }))
	);
	assert!(format!("{list:?}").contains("[Circular]"));
	assert!(format!("{data:?}").contains("[Circular]"));
	assert_eq!(
		compile_text("[{{ list }}]", &data, &RenderOptions::default()),
		"[1,2,]"
	);

	list.pop();
	data.remove_property("me");
}

#[test]
fn unobserved_objects_never_report() {
	let data = object(person());
	data.set("user", 1);
	data.add_property("extra", 1, true);
	data.remove_property("extra");
	assert!(!data.is_observed());
	assert!(data.observer().is_none());
}

// --- Array tests ---

#[test]
fn push_returns_new_length_and_reports_once() {
	let (data, observer) = observed(person());
	let items = data.get("items");
	let items = items.as_array().unwrap_or_else(|| panic!("items is an array"));

	assert_eq!(items.push(4), 4);
	assert_eq!(observer.changes(), vec![Change::array("items", 4)]);
}

#[test]
fn pushed_objects_become_interceptable() {
	let (data, observer) = observed(person());
	let items = data.get("items");
	let items = items.as_array().unwrap_or_else(|| panic!("items is an array"));
	let entry = object(serde_json::json!({ "x": 1 }));

	items.push(entry.clone());
	entry.set("x", 2);

	assert_eq!(
		observer.changes(),
		vec![Change::array("items", 4), Change::set("items.3.x", 2)]
	);
}

#[test]
fn shifted_elements_report_their_new_index() {
	let (data, observer) = observed(serde_json::json!({ "rows": [{ "n": 1 }, { "n": 2 }] }));
	let rows = data.get("rows");
	let rows = rows.as_array().unwrap_or_else(|| panic!("rows is an array"));
	let second = rows.get(1);

	let removed = rows.shift();
	assert_eq!(removed.map(|row| row.resolve("n")), Some(Value::from(1)));
	second
		.as_object()
		.unwrap_or_else(|| panic!("row is an object"))
		.set("n", 5);

	assert_eq!(
		observer.changes(),
		vec![Change::array("rows", 1), Change::set("rows.0.n", 5)]
	);
}

#[rstest]
#[case::pop(ArrayMethod::Pop, vec![], serde_json::json!(3), serde_json::json!([1, 2]))]
#[case::shift(ArrayMethod::Shift, vec![], serde_json::json!(1), serde_json::json!([2, 3]))]
#[case::unshift(ArrayMethod::Unshift, vec![Value::from(0)], serde_json::json!(4), serde_json::json!([0, 1, 2, 3]))]
#[case::splice_negative(ArrayMethod::Splice, vec![Value::from(-1), Value::from(1)], serde_json::json!([3]), serde_json::json!([1, 2]))]
#[case::splice_insert(ArrayMethod::Splice, vec![Value::from(1), Value::from(0), Value::from(9)], serde_json::json!([]), serde_json::json!([1, 9, 2, 3]))]
#[case::splice_to_end(ArrayMethod::Splice, vec![Value::from(1)], serde_json::json!([2, 3]), serde_json::json!([1]))]
#[case::reverse(ArrayMethod::Reverse, vec![], serde_json::json!([3, 2, 1]), serde_json::json!([3, 2, 1]))]
fn array_methods_behave_natively(
	#[case] method: ArrayMethod,
	#[case] args: Vec<Value>,
	#[case] returned: serde_json::Value,
	#[case] after: serde_json::Value,
) {
	let (data, observer) = observed(person());
	let items = data.get("items");
	let items = items.as_array().unwrap_or_else(|| panic!("items is an array"));

	let result = items.call(method, args);

	assert_eq!(result.to_json(), returned);
	assert_eq!(Value::from(items.clone()).to_json(), after);
	let changes = observer.changes();
	assert_eq!(changes.len(), 1, "{method} should report exactly once");
	assert_eq!(changes[0].kind, ChangeKind::Array);
}

#[test]
fn sort_orders_by_string_form() {
	let array = ObservedArray::from_vec(vec![
		Value::from(10),
		Value::Undefined,
		Value::from(9),
		Value::from("a"),
	]);
	let observer = Observer::new();
	instrument_array(&array, &observer);

	array.sort();

	assert_eq!(Value::from(array).to_string(), "10,9,a,");
	assert_eq!(observer.changes(), vec![Change::array("", 4)]);
}

#[test]
fn instrumenting_one_array_leaves_others_alone() {
	let first = ObservedArray::from_vec(vec![Value::from(1)]);
	let second = ObservedArray::from_vec(vec![Value::from(1)]);
	let observer = Observer::new();
	instrument_array(&first, &observer);

	second.push(2);
	assert!(observer.is_empty());
	assert!(!second.is_instrumented());

	first.push(2);
	assert_eq!(observer.len(), 1);
}

#[rstest]
#[case("push", Ok(ArrayMethod::Push))]
#[case("splice", Ok(ArrayMethod::Splice))]
#[case("map", Err("map".to_string()))]
fn array_method_from_name(#[case] name: &str, #[case] expected: Result<ArrayMethod, String>) {
	assert_eq!(name.parse::<ArrayMethod>(), expected);
}

// --- Observer tests ---

#[test]
fn subscribers_run_in_registration_order() {
	let observer = Observer::new();
	let order = std::rc::Rc::new(std::cell::RefCell::new(vec![]));
	let first = order.clone();
	let second = order.clone();
	observer.subscribe(move |_| first.borrow_mut().push("first"));
	let id = observer.subscribe(move |_| second.borrow_mut().push("second"));

	observer.notify(Change::set("a", 1));
	assert_eq!(*order.borrow(), vec!["first", "second"]);

	assert!(observer.unsubscribe(id));
	assert!(!observer.unsubscribe(id));
	observer.notify(Change::set("a", 2));
	assert_eq!(*order.borrow(), vec!["first", "second", "first"]);
}

#[test]
fn subscribers_see_changes_in_mutation_order() {
	let (data, observer) = observed(person());
	let log = record(&observer);

	data.set("user", "nobody");
	if let Some(items) = data.get("items").as_array() {
		items.pop();
	}
	data.remove_property("user");

	insta::assert_snapshot!(log.borrow().join("\n"), @r"
	set user = nobody
	array items = 2
	set user = undefined
	");
}

#[test]
fn take_changes_drains_the_log() {
	let observer = Observer::new();
	observer.notify(Change::set("a", 1));
	observer.notify(Change::array("b", 0));

	assert_eq!(observer.take_changes().len(), 2);
	assert!(observer.is_empty());
	assert!(observer.take_changes().is_empty());
}

#[traced_test]
#[test]
fn notifications_are_logged() {
	let (data, _observer) = observed(person());
	data.set("items", 0);
	assert!(logs_contain("change"));
	assert!(logs_contain("items"));
}

// --- Markup tests ---

#[rstest]
#[case::nested(r#"<div id="app" class="a b"><p>Hi &amp; bye</p><br><input disabled></div>"#)]
#[case::siblings("<ul><li>one</li><li>two</li></ul><p>after</p>")]
#[case::text_only("hello {{ name }}")]
#[case::placeholder_attribute(r#"<a href="/users/{{ id }}">{{ name }}</a>"#)]
fn markup_round_trips(#[case] source: &str) {
	assert_eq!(document(source).to_string(), source);
}

#[test]
fn markup_drops_comments_and_declarations() {
	let doc = document("<!doctype html><!-- note --><p>x<!-- inner -->y</p>");
	assert_eq!(doc.to_string(), "<p>xy</p>");
	assert_eq!(doc.children.len(), 1);
}

#[test]
fn markup_parses_attributes_in_order() {
	let doc = document(r"<input type=text value='a &lt; b' data-x = 1 checked/>");
	let input = doc.children[0]
		.as_element()
		.unwrap_or_else(|| panic!("input is an element"));

	let attributes: Vec<(&str, &str)> = input
		.attributes
		.iter()
		.map(|attribute| (attribute.name.as_str(), attribute.value.as_str()))
		.collect();
	assert_eq!(
		attributes,
		vec![("type", "text"), ("value", "a < b"), ("data-x", "1"), ("checked", "")]
	);
	assert!(input.children.is_empty());
}

#[test]
fn markup_keeps_stray_quotes_as_text() {
	let doc = document(r#"<p>it's "quoted</p>"#);
	assert_eq!(doc.children[0].text_content(), r#"it's "quoted"#);
}

#[rstest]
#[case::mismatched("<div><p></div>", "p")]
#[case::eof("<div><span>", "span")]
fn markup_reports_unclosed_elements(#[case] source: &str, #[case] tag: &str) {
	let result = parse_markup(source);
	assert!(matches!(result, Err(ZueError::UnclosedElement(open)) if open == tag));
}

#[test]
fn markup_reports_stray_closing_tags() {
	let result = parse_markup("<p>x</p></div>");
	assert!(matches!(
		result,
		Err(ZueError::UnexpectedClosingTag { tag, offset: 8 }) if tag == "div"
	));
}

#[rstest]
#[case("&lt;b&gt;", "<b>")]
#[case("&#65;&#x42;", "AB")]
#[case("fish &chips", "fish &chips")]
#[case("&unknown;", "&unknown;")]
fn entities_are_decoded(#[case] input: &str, #[case] expected: &str) {
	assert_eq!(decode_entities(input), expected);
}

// --- Selector and document tests ---

#[rstest]
#[case::id("#main", vec![1])]
#[case::class(".card", vec![0])]
#[case::tag("span", vec![1, 0])]
#[case::compound("section.card#main", vec![1])]
#[case::multiple_classes(".card.wide", vec![1])]
fn query_selector_finds_first_match(#[case] selector: &str, #[case] expected: Vec<usize>) -> ZueResult<()> {
	let doc = document(
		r#"<div class="card"></div><section id="main" class="card wide"><span></span></section>"#,
	);
	assert_eq!(doc.query_selector(selector)?, Some(NodePath::new(expected)));

	Ok(())
}

#[rstest]
#[case("")]
#[case("#")]
#[case("div > p")]
#[case("#a#b")]
fn invalid_selectors_are_rejected(#[case] selector: &str) {
	let result = Document::default().query_selector(selector);
	assert!(matches!(result, Err(ZueError::InvalidSelector(_))));
}

#[test]
fn replace_swaps_in_place() {
	let mut doc = document("<div><p>a</p><p>b</p></div>");
	let old = doc.replace(&NodePath::new(vec![0, 1]), Node::text("c"));

	assert_eq!(old.map(|node| node.to_string()).as_deref(), Some("<p>b</p>"));
	assert_eq!(doc.to_string(), "<div><p>a</p>c</div>");
	assert_eq!(doc.replace(&NodePath::new(vec![3]), Node::text("x")), None);
}

// --- Compiler tests ---

#[test]
fn compile_substitutes_placeholders() {
	let doc = document(r#"<div id="app"><p class="greeting">Hi {{ user.name }}</p></div>"#);
	let data = object(person());

	let compiled = compile(&doc.children[0], &data, &RenderOptions::default());

	insta::assert_snapshot!(compiled.to_string(), @r#"<div id="app"><p class="greeting">Hi Ann</p></div>"#);
}

#[test]
fn compile_preserves_structure_without_markers() {
	let doc = document(r#"<div id="app"><ul><li>a</li><li title="t">b</li></ul><br>text</div>"#);
	let compiled = compile(&doc.children[0], &ObservedObject::new(), &RenderOptions::default());
	assert_eq!(compiled, doc.children[0]);
}

#[test]
fn compile_does_not_touch_the_template() {
	let template: Node = Element::new("p").with_text("{{ user.age }} years").into();
	let data = object(person());

	let compiled = compile(&template, &data, &RenderOptions::default());

	assert_eq!(compiled.text_content(), "4 years");
	assert_eq!(template.text_content(), "{{ user.age }} years");
}

#[rstest]
#[case::empty(MissingValue::Empty, "[]")]
#[case::undefined(MissingValue::Undefined, "[undefined]")]
fn compile_renders_missing_values(#[case] missing: MissingValue, #[case] expected: &str) {
	let template = Node::text("[{{ nothing.here }}]");
	let options = RenderOptions {
		missing,
		..RenderOptions::default()
	};
	let compiled = compile(&template, &object(person()), &options);
	assert_eq!(compiled.as_text(), Some(expected));
}

#[rstest]
#[case("{{ items }}", "1,2,3")]
#[case("{{ items.length }} items", "3 items")]
#[case("{{ user }}", "[object Object]")]
#[case("{{user.name}}{{user.age}}", "Ann4")]
fn compile_text_stringifies_values(#[case] text: &str, #[case] expected: &str) {
	let data = object(person());
	assert_eq!(compile_text(text, &data, &RenderOptions::default()), expected);
}

// --- Mount tests ---

#[test]
fn mount_replace_swaps_the_target() -> ZueResult<()> {
	let mut doc = document(r#"<main><div id="app">old</div><footer></footer></main>"#);
	let fragment: Node = Element::new("div")
		.with_attribute("id", "app")
		.with_text("new")
		.into();

	let path = mount(&mut doc, "#app", fragment, MountStrategy::Replace)?;

	assert_eq!(path, NodePath::new(vec![0, 0]));
	assert_eq!(doc.to_string(), r#"<main><div id="app">new</div><footer></footer></main>"#);

	Ok(())
}

#[test]
fn mount_append_keeps_the_target() -> ZueResult<()> {
	let mut doc = document(r#"<div id="app" data-keep="yes"><p>old</p><p>older</p></div>"#);
	let fragment: Node = Element::new("section").with_text("new").into();

	let path = mount(&mut doc, "#app", fragment, MountStrategy::Append)?;

	assert_eq!(path, NodePath::new(vec![0]));
	assert_eq!(doc.to_string(), r#"<div id="app" data-keep="yes">new</div>"#);

	Ok(())
}

#[test]
fn mount_rejects_missing_targets() {
	let mut doc = document("<div></div>");
	let result = mount(&mut doc, "#nope", Node::text("x"), MountStrategy::Replace);
	assert!(matches!(result, Err(ZueError::InvalidMountTarget(selector)) if selector == "#nope"));
	assert_eq!(doc.to_string(), "<div></div>");
}

// --- View tests ---

fn counter_view(mount: MountStrategy) -> ZueResult<View> {
	View::new(
		document(r#"<body><div id="app" class="root"><p>{{ count }} clicks</p><p>{{ user.name }}</p></div></body>"#),
		ViewOptions {
			el: "#app".into(),
			data: serde_json::json!({ "count": 0, "user": { "name": "Ann" } }).into(),
			render: RenderOptions {
				mount,
				..RenderOptions::default()
			},
		},
	)
}

#[rstest]
#[case::replace(MountStrategy::Replace)]
#[case::append(MountStrategy::Append)]
fn view_renders_on_creation(#[case] strategy: MountStrategy) -> ZueResult<()> {
	let view = counter_view(strategy)?;
	assert_eq!(
		view.html(),
		r#"<body><div id="app" class="root"><p>0 clicks</p><p>Ann</p></div></body>"#
	);
	assert_eq!(view.el_path(), &NodePath::new(vec![0, 0]));

	Ok(())
}

#[rstest]
#[case::replace(MountStrategy::Replace)]
#[case::append(MountStrategy::Append)]
fn view_update_renders_only_after_changes(#[case] strategy: MountStrategy) -> ZueResult<()> {
	let mut view = counter_view(strategy)?;
	assert!(!view.update()?);

	view.set("count", 2);
	if let Some(user) = view.get("user").as_object() {
		user.set("name", "Bo");
	}
	assert_eq!(view.observer().len(), 2);
	assert!(view.update()?);
	assert_eq!(
		view.html(),
		r#"<body><div id="app" class="root"><p>2 clicks</p><p>Bo</p></div></body>"#
	);

	view.set("count", 3);
	assert!(view.update()?);
	assert!(
		view.el()
			.is_some_and(|el| el.text_content() == "3 clicksBo")
	);
	assert!(!view.update()?);

	Ok(())
}

#[test]
fn view_template_stays_frozen() -> ZueResult<()> {
	let mut view = counter_view(MountStrategy::Replace)?;
	view.set("count", 9);
	view.update()?;

	assert_eq!(view.template().text_content(), "{{ count }} clicks{{ user.name }}");
	assert_eq!(view.data().get("count"), Value::from(9));

	Ok(())
}

#[test]
fn view_add_exposes_a_new_reactive_key() -> ZueResult<()> {
	let mut view = View::new(
		document(r#"<p id="app">{{ greeting }}</p>"#),
		ViewOptions {
			el: "#app".into(),
			..ViewOptions::default()
		},
	)?;
	assert_eq!(view.html(), r#"<p id="app"></p>"#);

	assert!(view.add("greeting", "hello"));
	assert!(view.update()?);
	assert_eq!(view.html(), r#"<p id="app">hello</p>"#);

	view.set("greeting", "bye");
	assert!(view.update()?);
	assert_eq!(view.get("greeting"), Value::from("bye"));
	assert_eq!(view.html(), r#"<p id="app">bye</p>"#);

	Ok(())
}

#[test]
fn view_rejects_missing_mount_target() {
	let result = View::new(
		document("<div></div>"),
		ViewOptions {
			el: "#app".into(),
			..ViewOptions::default()
		},
	);
	assert!(matches!(result, Err(ZueError::InvalidMountTarget(_))));
}

#[test]
fn view_rejects_non_object_data() {
	let result = View::new(
		document(r#"<div id="app"></div>"#),
		ViewOptions {
			el: "#app".into(),
			data: Value::from(vec![Value::from(1)]),
			..ViewOptions::default()
		},
	);
	assert!(matches!(result, Err(ZueError::InvalidData(found)) if found == "array"));
}

#[traced_test]
#[test]
fn view_logs_its_lifecycle() {
	let view = counter_view(MountStrategy::Replace);
	assert!(view.is_ok());
	assert!(logs_contain("creating view"));
	assert!(logs_contain("mounting fragment"));
}

// --- Config tests ---

#[test]
fn config_is_none_without_a_file() -> ZueResult<()> {
	let tmp = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"));
	assert!(ZueConfig::load(tmp.path())?.is_none());

	Ok(())
}

#[test]
fn config_loads_all_fields() -> ZueResult<()> {
	let tmp = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"));
	std::fs::write(
		tmp.path().join("zue.toml"),
		"el = \"#app\"\ntemplate = \"index.html\"\ndata = \"data.yaml\"\n\n[render]\nmissing = \
		 \"undefined\"\nmount = \"append\"\n",
	)
	.unwrap_or_else(|e| panic!("write: {e}"));

	let config = ZueConfig::load(tmp.path())?.unwrap_or_else(|| panic!("config exists"));

	assert_eq!(config.el.as_deref(), Some("#app"));
	assert_eq!(config.template, Some(PathBuf::from("index.html")));
	assert_eq!(config.data, Some(PathBuf::from("data.yaml")));
	assert_eq!(
		config.render,
		RenderOptions {
			missing: MissingValue::Undefined,
			mount: MountStrategy::Append,
		}
	);

	Ok(())
}

#[test]
fn config_discovery_prefers_the_root_file() {
	let tmp = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"));
	std::fs::create_dir_all(tmp.path().join(".config")).unwrap_or_else(|e| panic!("mkdir: {e}"));
	std::fs::write(tmp.path().join(".config/zue.toml"), "").unwrap_or_else(|e| panic!("write: {e}"));
	assert_eq!(
		ZueConfig::resolve_path(tmp.path()),
		Some(tmp.path().join(".config/zue.toml"))
	);

	std::fs::write(tmp.path().join("zue.toml"), "").unwrap_or_else(|e| panic!("write: {e}"));
	assert_eq!(
		ZueConfig::resolve_path(tmp.path()),
		Some(tmp.path().join("zue.toml"))
	);
}

#[test]
fn config_rejects_invalid_toml() {
	let tmp = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"));
	std::fs::write(tmp.path().join("zue.toml"), "[render]\nmissing = \"sometimes\"\n")
		.unwrap_or_else(|e| panic!("write: {e}"));

	assert!(matches!(
		ZueConfig::load(tmp.path()),
		Err(ZueError::ConfigParse(_))
	));
}

#[rstest]
#[case::json("data.json", r#"{ "user": { "name": "Ann" }, "n": 1 }"#)]
#[case::toml("data.toml", "n = 1\n[user]\nname = \"Ann\"\n")]
#[case::yaml("data.yaml", "user:\n  name: Ann\nn: 1\n")]
#[case::yml("data.yml", "user:\n  name: Ann\nn: 1\n")]
fn data_files_load_by_extension(#[case] name: &str, #[case] content: &str) -> ZueResult<()> {
	let tmp = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"));
	let path = tmp.path().join(name);
	std::fs::write(&path, content).unwrap_or_else(|e| panic!("write: {e}"));

	let data = load_data_file(&path)?;

	assert_eq!(data["user"]["name"], serde_json::json!("Ann"));
	assert_eq!(data["n"], serde_json::json!(1));

	Ok(())
}

#[test]
fn data_files_report_failures() {
	let tmp = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"));
	let unsupported = tmp.path().join("data.txt");
	std::fs::write(&unsupported, "x").unwrap_or_else(|e| panic!("write: {e}"));
	let broken = tmp.path().join("data.json");
	std::fs::write(&broken, "{").unwrap_or_else(|e| panic!("write: {e}"));

	assert!(matches!(
		load_data_file(&unsupported),
		Err(ZueError::UnsupportedDataFormat(format)) if format == "txt"
	));
	assert!(matches!(load_data_file(&broken), Err(ZueError::DataFile { .. })));
	assert!(matches!(
		load_data_file(&tmp.path().join("missing.json")),
		Err(ZueError::DataFile { .. })
	));
}
