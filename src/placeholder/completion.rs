//! Placeholder completion
//!
//! Every child of the node reached by the typed path becomes a candidate. A
//! child with children of its own continues with `.` and re-opens completion; a
//! child that is also a complete placeholder additionally offers a variant that
//! closes the expression with `>`. Childless children only close.

use tracing::debug;

use super::trie::{PlaceholderNode, PlaceholderTrie, Segment};
use crate::candidate::{Candidate, CandidateKind, escape_snippet};
use crate::parsers::line_grammar::placeholder_expression;

/// Candidates for the children of `node`
pub fn node_completions(node: &PlaceholderNode) -> Vec<Candidate> {
    let mut candidates = Vec::new();
    for child in node.children() {
        let continues = !child.children().is_empty();
        let terminates = child.is_end() || !continues;

        for (label, insert, snippet) in child_texts(child) {
            let documentation = child.description().map(str::to_string);
            let kind = if snippet {
                CandidateKind::Scripted
            } else {
                CandidateKind::Placeholder
            };
            if continues {
                let mut candidate = Candidate::new(format!("{}.", label), kind)
                    .with_insert_text(format!("{}.", insert))
                    .with_documentation(documentation.clone())
                    .retriggering();
                if snippet {
                    candidate = candidate.as_snippet();
                }
                candidates.push(candidate);
            }
            if terminates {
                let mut candidate = Candidate::new(format!("{}>", label), kind)
                    .with_insert_text(format!("{}>", insert))
                    .with_documentation(documentation);
                if snippet {
                    candidate = candidate.as_snippet();
                }
                candidates.push(candidate);
            }
        }
    }
    candidates
}

/// `(label, insert text, is snippet)` for each value a child offers
fn child_texts(child: &PlaceholderNode) -> Vec<(String, String, bool)> {
    match child.segment() {
        Segment::Literal(text) => vec![(text.clone(), text.clone(), false)],
        Segment::Scripted(segment) => {
            let values = segment.candidates();
            if values.is_empty() {
                let label = child.segment().label();
                vec![(label, format!("${{1:{}}}", escape_snippet(segment.name())), true)]
            } else {
                values.into_iter().map(|value| (value.clone(), value, false)).collect()
            }
        }
    }
}

/// Complete the `<...>` expression at the end of `text_before_cursor`.
///
/// The elements before the last `.` must resolve in the trie; the element being
/// typed is left for the client to filter against.
pub fn complete_placeholder(trie: &PlaceholderTrie, text_before_cursor: &str) -> Vec<Candidate> {
    let Some(expression) = placeholder_expression(text_before_cursor) else {
        return Vec::new();
    };
    let elements: Vec<&str> = expression.split('.').collect();
    let completed = &elements[..elements.len().saturating_sub(1)];

    match trie.root().lookup_segments(completed) {
        Some(node) => node_completions(node),
        None => {
            debug!("No placeholder node for {:?}", expression);
            Vec::new()
        }
    }
}
