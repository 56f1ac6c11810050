//! `zue_core` is the core library for the zue reactive view engine. It turns a
//! markup subtree containing `{{ path }}` placeholders into a live view: data
//! is wrapped so every write is reported, and the view is re-rendered from a
//! frozen copy of the template whenever something changed.
//!
//! ## Rendering Pipeline
//!
//! ```text
//! Markup template
//!   -> Markup reader (logos lexer + walker into a Document)
//!   -> Mount controller (selector -> target element, frozen as the template)
//!   -> Interceptor (wraps data properties and array mutators, reports to an Observer)
//!   -> Compiler (clones the template, substitutes placeholders from data)
//!   -> Mount controller (swaps the compiled fragment into the document)
//! ```
//!
//! ## Modules
//!
//! - [`config`]: Configuration loading from `zue.toml` and data files in json, toml or yaml.
//!
//! ## Key Types
//!
//! - [`Value`]: A data value. Objects and arrays are shared handles.
//! - [`ObservedObject`]: An object whose properties can be intercepted.
//! - [`ObservedArray`]: An array whose mutators can be instrumented.
//! - [`Observer`]: Receives a [`Change`] for every intercepted write.
//! - [`Token`]: A literal run or placeholder produced by [`parse`].
//! - [`Document`] and [`Node`]: The owned markup tree views render into.
//! - [`View`]: A mounted template bound to observed data.
//!
//! ## Quick Start
//!
//! ```rust
//! use zue_core::View;
//! use zue_core::ViewOptions;
//! use zue_core::parse_markup;
//!
//! let document = parse_markup(r#"<div id="app">Hi {{ user.name }}</div>"#)?;
//! let data = serde_json::json!({ "user": { "name": "Ann" } });
//! let mut view = View::new(document, ViewOptions {
//! 	el: "#app".into(),
//! 	data: data.into(),
//! 	..Default::default()
//! })?;
//! assert_eq!(view.html(), r#"<div id="app">Hi Ann</div>"#);
//!
//! if let Some(user) = view.get("user").as_object() {
//! 	user.set("name", "Bo");
//! }
//! assert!(view.update()?);
//! assert_eq!(view.html(), r#"<div id="app">Hi Bo</div>"#);
//! # Ok::<(), zue_core::ZueError>(())
//! ```

pub use array::*;
pub use compiler::*;
pub use config::*;
pub use dom::*;
pub use error::*;
pub use interpolation::*;
pub use markup::*;
pub use mount::*;
pub use observer::*;
pub use value::*;
pub use view::*;

mod array;
mod compiler;
pub mod config;
mod dom;
#[allow(unused_assignments)]
mod error;
mod interpolation;
pub(crate) mod lexer;
mod markup;
mod mount;
mod observer;
mod value;
mod view;

#[cfg(test)]
mod __fixtures;
#[cfg(test)]
mod __tests;
