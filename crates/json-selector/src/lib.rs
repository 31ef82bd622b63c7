//! Compile-once JSONPath selectors.
//!
//! A query is compiled into a [`JsonSelector`] and can then be run against
//! any number of [`serde_json::Value`] documents. Beyond the usual steps
//! (names, indices, slices, wildcards, recursive descent, unions, filters)
//! queries support parent steps (`^`), arithmetic, regular expressions and a
//! small library of functions inside filters.
//!
//! # Example
//!
//! ```
//! use json_selector::{JsonSelector, JsonSelectorOptions};
//! use serde_json::json;
//!
//! let doc = json!({
//!     "store": {
//!         "book": [
//!             {"author": "Nigel Rees", "price": 8.95},
//!             {"author": "Evelyn Waugh", "price": 12.99}
//!         ]
//!     }
//! });
//!
//! let selector = JsonSelector::parse("$.store.book[?(@.price < 10)].author").unwrap();
//! let nodes = selector.select_nodes(&doc, &JsonSelectorOptions::default()).unwrap();
//! assert_eq!(nodes.len(), 1);
//! assert_eq!(nodes[0].path.to_string(), "$['store']['book'][0]['author']");
//! assert_eq!(nodes[0].value.to_value(), json!("Nigel Rees"));
//! ```

mod error;
pub use error::{JsonPathError, ParseErrorKind};

mod value;
pub use value::{Elements, JsonValue, JsonValueKind, Properties, DEFAULT_HASH_DEPTH};

mod location;
pub use location::{LocationNode, LocationNodeKind, NormalizedPath};

mod options;
pub use options::{ExecutionMode, JsonSelectorOptions, SortBy, DEFAULT_MAX_DEPTH};

mod json_selector;
pub use json_selector::{JsonSelector, PathValuePair};

mod eval_ctx;
mod expression;
mod functions;
mod operators;
mod parser;
mod receiver;
mod selector;
mod shunting_yard;
mod token;

use serde_json::Value;

/// Compile `path` and return the values it selects from `root`.
pub fn select<'a>(
    root: &'a Value,
    path: &str,
    options: &JsonSelectorOptions,
) -> Result<Vec<JsonValue<'a>>, JsonPathError> {
    JsonSelector::parse(path)?.select(root, options)
}

/// Compile `path` and return the locations it selects in `root`.
pub fn select_paths(
    root: &Value,
    path: &str,
    options: &JsonSelectorOptions,
) -> Result<Vec<NormalizedPath>, JsonPathError> {
    JsonSelector::parse(path)?.select_paths(root, options)
}

/// Compile `path` and return what it selects from `root` with locations.
pub fn select_nodes<'a>(
    root: &'a Value,
    path: &str,
    options: &JsonSelectorOptions,
) -> Result<Vec<PathValuePair<'a>>, JsonPathError> {
    JsonSelector::parse(path)?.select_nodes(root, options)
}
