//! Line-level scanners for the YAML skill dialect
//!
//! - [`key_stack`]: indentation-based key ancestry and bounded scan text
//! - [`line_grammar`]: tokenizing skill lines and locating enclosing objects

pub mod key_stack;
pub mod line_grammar;

pub use key_stack::{YamlKey, get_ancestor_keys, get_key_path, split_mechanic_line_attribute_context};
pub use line_grammar::{EnclosingToken, Sigil, find_enclosing_object_token, parse_mechanic_line};
