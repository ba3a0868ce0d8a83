//! Schema-driven completion
//!
//! Turns a located [`SchemaNode`] into value candidates, or a [`SchemaMap`] into
//! key candidates for a new line. [`complete_schema`] decides which of the two a
//! cursor position calls for.
//!
//! # Positional entries
//!
//! Some values are several space-separated slots on one line (`Drops` entries
//! such as `DIAMOND 1-3 0.5`). The slot being typed is the number of completed
//! tokens once brace groups are stripped, the same count the line grammar uses
//! when it re-reads the line. Candidates for a slot that has a successor get a
//! trailing separator and re-open completion.

use lsp_types::Position;
use tracing::debug;

use super::locate::locate_schema_node;
use super::node::{SchemaKind, SchemaMap, SchemaNode, SuffixValues, ValueSuffix};
use crate::candidate::{Candidate, CandidateKind, escape_snippet};
use crate::config::EngineConfig;
use crate::document::{DocumentSnapshot, indentation, line_prefix};
use crate::parsers::key_stack::{
    YamlKey, get_ancestor_keys, get_ancestor_keys_at_indent, key_value_offset, parse_key_line,
};
use crate::parsers::line_grammar::{positional_index, strip_brace_groups, typed_token};
use crate::registry::{DatasetProvider, EnumDataset};

const POSITIONAL_SEPARATOR: &str = " ";

/// Value candidates for `node`.
///
/// `cursor_text` is the value typed so far on the cursor line (after `Key: ` or
/// `- `); only positional entries look at it.
pub fn generate_value_completions<D: DatasetProvider + ?Sized>(
    node: &SchemaNode,
    cursor_text: &str,
    datasets: &D,
    config: &EngineConfig,
) -> Vec<Candidate> {
    if !node.entries.is_empty() {
        return positional_completions(node, cursor_text, datasets, config);
    }

    let candidates = match node.kind {
        SchemaKind::Enum => node
            .dataset
            .as_deref()
            .and_then(|name| datasets.dataset(name))
            .map(|dataset| dataset_candidates(dataset, None, config))
            .unwrap_or_default(),
        SchemaKind::Boolean => ["true", "false"]
            .into_iter()
            .map(|value| Candidate::new(value, CandidateKind::Value))
            .collect(),
        SchemaKind::List => node
            .dataset
            .as_deref()
            .and_then(|name| datasets.dataset(name))
            .map(|dataset| dataset_candidates(dataset, node.suffix.as_ref(), config))
            .unwrap_or_default(),
        _ => Vec::new(),
    };

    if candidates.is_empty() {
        node.values
            .iter()
            .map(|value| Candidate::new(value.as_str(), CandidateKind::Value))
            .collect()
    } else {
        candidates
    }
}

fn positional_completions<D: DatasetProvider + ?Sized>(
    node: &SchemaNode,
    cursor_text: &str,
    datasets: &D,
    config: &EngineConfig,
) -> Vec<Candidate> {
    let index = positional_index(cursor_text);
    let Some(entry) = node.entries.get(index) else {
        debug!("Positional slot {} is past the {} declared entries", index, node.entries.len());
        return Vec::new();
    };
    let has_next = index + 1 < node.entries.len();

    let current_token = typed_token(cursor_text).map(strip_brace_groups).unwrap_or_default();

    let candidates = generate_value_completions(entry, &current_token, datasets, config);
    if !has_next {
        return candidates;
    }
    candidates
        .into_iter()
        .map(|mut candidate| {
            candidate.insert_text.push_str(POSITIONAL_SEPARATOR);
            candidate.retriggering()
        })
        .collect()
}

fn dataset_candidates(dataset: &EnumDataset, suffix: Option<&ValueSuffix>, config: &EngineConfig) -> Vec<Candidate> {
    let suffix_snippet = suffix.map(|suffix| suffix_snippet(suffix, config));
    dataset
        .entries()
        .iter()
        .map(|(key, meta)| {
            let candidate = Candidate::new(key.as_str(), CandidateKind::EnumMember)
                .with_detail(dataset.name())
                .with_documentation(meta.description.clone());
            match &suffix_snippet {
                Some(snippet) => candidate
                    .with_insert_text(format!("{}{}", escape_snippet(key), snippet))
                    .as_snippet(),
                None => candidate,
            }
        })
        .collect()
}

/// `:${1|1,2,3|}` for a choice set, `:${1:0}` for a range too large to list
fn suffix_snippet(suffix: &ValueSuffix, config: &EngineConfig) -> String {
    let separator = escape_snippet(&suffix.separator);
    let choices: Vec<String> = match &suffix.values {
        SuffixValues::Choices(choices) => choices.clone(),
        SuffixValues::Range { min, max } => {
            let span = max.saturating_sub(*min).saturating_add(1);
            if *min <= *max && span <= config.max_suffix_choices as i64 {
                (*min..=*max).map(|value| value.to_string()).collect()
            } else {
                return format!("{}${{1:{}}}", separator, min);
            }
        }
    };

    if choices.is_empty() {
        return separator;
    }
    let escaped: Vec<String> = choices.iter().map(|choice| escape_choice(choice)).collect();
    format!("{}${{1|{}|}}", separator, escaped.join(","))
}

fn escape_choice(choice: &str) -> String {
    let mut escaped = String::with_capacity(choice.len());
    for ch in choice.chars() {
        if matches!(ch, ',' | '|' | '\\' | '$' | '}') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Candidates for the keys of `map` that are not already among `existing`.
///
/// Literal keys come first in declaration order, then the members of the array
/// key's dataset. Wildcard keys are user-chosen and never offered.
pub fn generate_key_completions<D: DatasetProvider + ?Sized>(
    map: &SchemaMap,
    datasets: &D,
    existing: &[String],
) -> Vec<Candidate> {
    let is_present = |key: &str| existing.iter().any(|present| present.eq_ignore_ascii_case(key));

    let mut candidates: Vec<Candidate> = map
        .literal
        .iter()
        .filter(|(key, _)| !is_present(key))
        .map(|(key, node)| key_candidate(key, node))
        .collect();

    if let Some(array_key) = &map.array_key {
        if let Some(dataset) = datasets.dataset(&array_key.dataset) {
            candidates.extend(
                dataset
                    .keys()
                    .filter(|key| !is_present(key))
                    .map(|key| key_candidate(key, &array_key.node)),
            );
        }
    }
    candidates
}

fn key_candidate(key: &str, node: &SchemaNode) -> Candidate {
    let offers_values = matches!(node.kind, SchemaKind::Enum | SchemaKind::Boolean) || !node.values.is_empty();
    let candidate = Candidate::new(key, CandidateKind::Key)
        .with_insert_text(format!("{}: ", key))
        .with_detail(node.kind.as_str())
        .with_documentation(node.description.clone());
    if offers_values {
        candidate.retriggering()
    } else {
        candidate
    }
}

/// Keys already written directly inside `parent`'s block.
///
/// The block's direct children are its least-indented key lines; the cursor line
/// is skipped since it may be a half-typed key.
fn sibling_keys<Doc: DocumentSnapshot + ?Sized>(document: &Doc, position: Position, parent: Option<&YamlKey>) -> Vec<String> {
    let cursor_line = position.line as usize;
    let start = parent.map(|key| key.line + 1).unwrap_or(0);

    let mut block = Vec::new();
    for index in start..document.line_count() {
        let Some(text) = document.line(index) else {
            break;
        };
        let Some(key) = parse_key_line(&text, index) else {
            continue;
        };
        if parent.is_some_and(|parent| key.indent <= parent.indent) {
            break;
        }
        if index != cursor_line {
            block.push(key);
        }
    }

    let Some(child_indent) = block.iter().map(|key| key.indent).min() else {
        return Vec::new();
    };
    block
        .into_iter()
        .filter(|key| key.indent == child_indent)
        .map(|key| key.key)
        .collect()
}

fn key_names(ancestors: &[YamlKey]) -> Vec<String> {
    ancestors.iter().rev().map(|key| key.key.clone()).collect()
}

/// File-level schema completion at `position`.
///
/// - `Key: |` → value candidates for `Key`
/// - `- |` → value candidates for the enclosing list
/// - anything else without a colon → keys valid at this level
pub fn complete_schema<Doc, D>(
    document: &Doc,
    position: Position,
    schema: &SchemaMap,
    datasets: &D,
    config: &EngineConfig,
) -> Vec<Candidate>
where
    Doc: DocumentSnapshot + ?Sized,
    D: DatasetProvider + ?Sized,
{
    let Some(prefix) = line_prefix(document, position) else {
        return Vec::new();
    };
    let ancestors = get_ancestor_keys(document, position);
    let mut path: Vec<String> = key_names(&ancestors);

    if let Some(offset) = key_value_offset(&prefix) {
        let Some(own_key) = parse_key_line(&prefix, position.line as usize) else {
            return Vec::new();
        };
        path.push(own_key.key);
        debug!("Schema value completion for path {:?}", path);
        return locate_schema_node(&path, schema, datasets)
            .map(|found| generate_value_completions(found.node, prefix[offset..].trim_start(), datasets, config))
            .unwrap_or_default();
    }

    let trimmed = prefix.trim_start();
    if let Some(item) = trimmed.strip_prefix('-') {
        debug!("Schema list item completion for path {:?}", path);
        return locate_schema_node(&path, schema, datasets)
            .map(|found| generate_value_completions(found.node, item.trim_start(), datasets, config))
            .unwrap_or_default();
    }

    if trimmed.contains(':') {
        return Vec::new();
    }

    // a new key joins the block its indentation places it in
    let ancestors = get_ancestor_keys_at_indent(document, position.line as usize, indentation(&prefix));
    let path = key_names(&ancestors);
    debug!("Schema key completion for path {:?}", path);
    let map = if path.is_empty() {
        Some(schema)
    } else {
        locate_schema_node(&path, schema, datasets).and_then(|found| found.node.children())
    };
    let existing = sibling_keys(document, position, ancestors.first());
    map.map(|map| generate_key_completions(map, datasets, &existing))
        .unwrap_or_default()
}
