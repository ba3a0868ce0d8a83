//! Structural key stack builder
//!
//! Rebuilds the chain of YAML keys enclosing a cursor from indentation alone.
//! The documents we see are half-typed, so a real YAML parser would reject most
//! of them; indentation survives almost any partial edit.
//!
//! # Indentation
//!
//! Indentation is the raw number of leading whitespace characters. Tabs and
//! spaces are NOT normalised: a document mixing both produces a stack that is
//! deterministic but may not match what the author intended.
//!
//! # List items
//!
//! Backward scans stay inside one key block and restart at the latest `- `
//! item written outside an open `[`. An unclosed `{` on an earlier item therefore
//! never owns the next one, while items of a multi-line inline list
//! (`s=[` followed by `- ...` lines) still see the list around them.

use lsp_types::Position;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::{debug, trace};

use crate::document::{DocumentSnapshot, indentation, text_between};
use crate::parsers::line_grammar::{EnclosingToken, find_enclosing_object_token};

/// A key line: leading whitespace, a bare or quoted token, then a colon followed
/// by whitespace or the end of the line.
static KEY_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^(?P<indent>\s*)(?:"(?P<dq>[^"]*)"|'(?P<sq>[^']*)'|(?P<bare>[^\s:#'"\-][^\s:#'"]*))(?P<colon>:)(?:\s|$)"#,
    )
    .expect("valid key line pattern")
});

/// One structural key occurrence
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YamlKey {
    pub key: String,
    pub line: usize,
    pub indent: usize,
}

/// Parse `text` (line number `line`) as a key line.
pub fn parse_key_line(text: &str, line: usize) -> Option<YamlKey> {
    let captures = KEY_LINE.captures(text)?;
    let key = captures
        .name("dq")
        .or_else(|| captures.name("sq"))
        .or_else(|| captures.name("bare"))?
        .as_str()
        .to_string();
    Some(YamlKey {
        key,
        line,
        indent: indentation(text),
    })
}

/// Byte offset just past the key's colon, if `text` is a key line
pub fn key_value_offset(text: &str) -> Option<usize> {
    KEY_LINE
        .captures(text)
        .and_then(|captures| captures.name("colon"))
        .map(|colon| colon.end())
}

/// The key defined on `line`, if any
pub fn key_at_line<D: DocumentSnapshot + ?Sized>(document: &D, line: usize) -> Option<YamlKey> {
    let text = document.line(line)?;
    parse_key_line(&text, line)
}

/// Ancestor keys of `position`, innermost first.
///
/// Each entry's indentation is strictly less than the previous one's. A cursor
/// line that is not a key line counts as one level deeper than its indentation,
/// so `- item` lines written flush with their parent key still nest under it.
pub fn get_ancestor_keys<D: DocumentSnapshot + ?Sized>(document: &D, position: Position) -> Vec<YamlKey> {
    let cursor_line = position.line as usize;
    let Some(current) = document.line(cursor_line) else {
        return Vec::new();
    };

    let indent = indentation(&current);
    let floor = if parse_key_line(&current, cursor_line).is_some() {
        indent
    } else {
        indent + 1
    };
    keys_above(document, cursor_line, floor)
}

/// Ancestor keys of a key about to be typed at `indent` on `line`, innermost first.
///
/// Unlike [`get_ancestor_keys`] the cursor line counts as a key line at exactly
/// `indent`, so a blank or half-typed line resolves to the block it will join.
pub fn get_ancestor_keys_at_indent<D: DocumentSnapshot + ?Sized>(
    document: &D,
    line: usize,
    indent: usize,
) -> Vec<YamlKey> {
    if line >= document.line_count() {
        return Vec::new();
    }
    keys_above(document, line, indent)
}

fn keys_above<D: DocumentSnapshot + ?Sized>(document: &D, cursor_line: usize, mut floor: usize) -> Vec<YamlKey> {
    let mut keys = Vec::new();
    for index in (0..=cursor_line).rev() {
        if floor == 0 {
            break;
        }
        let Some(text) = document.line(index) else {
            continue;
        };
        if let Some(key) = parse_key_line(&text, index) {
            if key.indent < floor {
                trace!("Ancestor key {:?} at line {} (indent {})", key.key, index, key.indent);
                floor = key.indent;
                keys.push(key);
            }
        }
    }
    keys
}

/// Ancestor key names outermost first, the order schema lookups consume.
pub fn get_key_path<D: DocumentSnapshot + ?Sized>(document: &D, position: Position) -> Vec<String> {
    get_ancestor_keys(document, position)
        .into_iter()
        .rev()
        .map(|key| key.key)
        .collect()
}

/// Where the cursor sits inside an object's argument block
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeContext {
    /// Identifier owning the innermost open delimiter
    pub owner: EnclosingToken,
    /// Text between the owner's opener and the cursor
    pub scope_text: String,
    /// Attribute whose value the cursor is typing, when past its `=`
    pub attribute: Option<String>,
    /// The bounded text that was scanned; offsets in `owner` index into it
    pub text: String,
    /// Document line the bounded text starts on
    pub base_line: usize,
}

/// Bounded text before the cursor for backward scans.
///
/// Starts just past the colon of the cursor line's own key, otherwise of the
/// nearest ancestor key, otherwise at the document start. Never reaches into a
/// sibling block, and starts over at the latest `- ` item written outside any
/// open `[` list, so an unclosed `{` on an earlier item does not capture it.
pub fn bounded_text_before_cursor<D: DocumentSnapshot + ?Sized>(
    document: &D,
    position: Position,
) -> (usize, String) {
    let cursor_line = position.line as usize;
    let boundary = key_at_line(document, cursor_line)
        .or_else(|| get_ancestor_keys(document, position).into_iter().next());

    let mut base_line = boundary.as_ref().map(|key| key.line).unwrap_or(0);
    let mut text = text_between(document, base_line, position);
    if boundary.is_some() {
        if let Some(offset) = key_value_offset(&text) {
            text.replace_range(..offset, "");
        }
    }

    let item_start = latest_item_start(&text);
    if item_start > 0 {
        base_line += text[..item_start].matches('\n').count();
        text.replace_range(..item_start, "");
    }
    (base_line, text)
}

/// Byte offset of the last line after the first that opens a `- ` item outside any `[`.
fn latest_item_start(text: &str) -> usize {
    let mut start = 0;
    let mut offset = 0;
    let mut brackets: usize = 0;
    for line in text.split_inclusive('\n') {
        if offset > 0 && brackets == 0 && line.trim_start().starts_with('-') {
            trace!("Scan restarts at list item {:?}", line.trim());
            start = offset;
        }
        for ch in line.chars() {
            match ch {
                '[' => brackets += 1,
                ']' => brackets = brackets.saturating_sub(1),
                _ => {}
            }
        }
        offset += line.len();
    }
    start
}

/// Link the cursor to the object whose argument block it is inside.
///
/// Runs [`find_enclosing_object_token`] over the text between the nearest
/// enclosing key and the cursor.
pub fn split_mechanic_line_attribute_context<D: DocumentSnapshot + ?Sized>(
    document: &D,
    position: Position,
) -> Option<AttributeContext> {
    let (base_line, text) = bounded_text_before_cursor(document, position);
    let owner = find_enclosing_object_token(&text)?;
    let scope_text = text[owner.open_offset + 1..].to_string();
    let attribute = current_attribute(&scope_text);
    debug!(
        "Attribute context: owner={:?} attribute={:?} base_line={}",
        owner.name, attribute, base_line
    );
    Some(AttributeContext {
        owner,
        scope_text,
        attribute,
        text,
        base_line,
    })
}

/// Name of the attribute whose value ends `scope_text`, e.g. `amount` in `a=1;amount=5`.
pub fn current_attribute(scope_text: &str) -> Option<String> {
    let mut depth: usize = 0;
    let mut segment_start = 0;
    for (offset, ch) in scope_text.char_indices() {
        match ch {
            '{' | '[' => depth += 1,
            '}' | ']' => depth = depth.saturating_sub(1),
            ';' | ',' if depth == 0 => segment_start = offset + 1,
            _ => {}
        }
    }

    let segment = &scope_text[segment_start..];
    let mut depth: usize = 0;
    let equals = segment.char_indices().find_map(|(offset, ch)| {
        match ch {
            '{' | '[' => depth += 1,
            '}' | ']' => depth = depth.saturating_sub(1),
            '=' if depth == 0 => return Some(offset),
            _ => {}
        }
        None
    })?;

    let name = segment[..equals].trim();
    if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-') {
        return None;
    }
    Some(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    const MOB: &str = indoc! {"
        SkeletonKing:
          Type: WITHER_SKELETON
          Display: '&6Skeleton King'
          Skills:
          - dmg{amount=5} @target ~onAttack
          - message{m=\"hi\"} @PIR{r=10} ~onSpawn
          Options:
            MovementSpeed: 0.2
            PreventOtherDrops: true
    "};

    fn names(keys: &[YamlKey]) -> Vec<&str> {
        keys.iter().map(|k| k.key.as_str()).collect()
    }

    #[test]
    fn test_parse_key_line_variants() {
        assert_eq!(parse_key_line("  Type: ZOMBIE", 3).map(|k| (k.key, k.indent)), Some(("Type".to_string(), 2)));
        assert_eq!(parse_key_line("Skills:", 0).map(|k| k.key), Some("Skills".to_string()));
        assert_eq!(parse_key_line("'quoted key': x", 0).map(|k| k.key), Some("quoted key".to_string()));
        assert!(parse_key_line("- dmg{a=b:c}", 0).is_none());
        assert!(parse_key_line("  # comment: here", 0).is_none());
        assert!(parse_key_line("url:http", 0).is_none());
        assert!(parse_key_line("", 0).is_none());
    }

    #[test]
    fn test_ancestors_of_list_item_flush_with_key() {
        let keys = get_ancestor_keys(MOB, Position::new(4, 6));
        assert_eq!(names(&keys), vec!["Skills", "SkeletonKing"]);
        assert_eq!(keys[0].line, 3);
        assert_eq!(keys[1].line, 0);
    }

    #[test]
    fn test_ancestors_of_key_line_exclude_itself() {
        let keys = get_ancestor_keys(MOB, Position::new(7, 6));
        assert_eq!(names(&keys), vec!["Options", "SkeletonKing"]);
    }

    #[test]
    fn test_ancestors_at_root() {
        assert!(get_ancestor_keys(MOB, Position::new(0, 3)).is_empty());
        assert!(get_ancestor_keys(MOB, Position::new(100, 0)).is_empty());
    }

    #[test]
    fn test_ancestor_indents_strictly_decrease() {
        let keys = get_ancestor_keys(MOB, Position::new(8, 10));
        for pair in keys.windows(2) {
            assert!(pair[1].indent < pair[0].indent);
        }
    }

    #[test]
    fn test_key_path_outermost_first() {
        assert_eq!(get_key_path(MOB, Position::new(8, 4)), vec!["SkeletonKing", "Options"]);
    }

    #[test]
    fn test_split_attribute_context_bounded_to_block() {
        let doc = indoc! {"
            Skills:
            - dmg{amount=5
        "};
        let context = split_mechanic_line_attribute_context(doc, Position::new(1, 14)).expect("inside dmg");
        assert_eq!(context.owner.name, "dmg");
        assert_eq!(context.attribute.as_deref(), Some("amount"));
        assert_eq!(context.base_line, 1);
        assert_eq!(context.scope_text, "amount=5");
    }

    #[test]
    fn test_unclosed_brace_stays_on_its_item() {
        let doc = indoc! {"
            Skills:
            - damage{a=1
            - sound{
        "};
        let context = split_mechanic_line_attribute_context(doc, Position::new(2, 8)).expect("inside sound");
        assert_eq!(context.owner.name, "sound");
        assert_eq!(context.base_line, 2);
        assert_eq!(context.text, "- sound{");
    }

    #[test]
    fn test_multi_line_inline_list_spans_items() {
        let doc = indoc! {"
            Skills:
            - skill{s=[
              - damage{a=1}
              - sound{
        "};
        let (base_line, text) = bounded_text_before_cursor(doc, Position::new(3, 10));
        assert_eq!(base_line, 1);
        assert!(text.starts_with("- skill{s=["));
        let context = split_mechanic_line_attribute_context(doc, Position::new(3, 10)).expect("inside sound");
        assert_eq!(context.owner.name, "sound");
    }

    #[test]
    fn test_tabs_and_spaces_are_counted_separately() {
        // one tab and one space are both one column of indentation
        let doc = "Root:\n\tChild:\n Other: 1";
        let keys = get_ancestor_keys(doc, Position::new(2, 3));
        assert_eq!(names(&keys), vec!["Root"]);
        let keys = get_ancestor_keys(doc, Position::new(1, 2));
        assert_eq!(names(&keys), vec!["Root"]);

        // a tab is not widened to match a deeper space indent
        let doc = "Root:\n    Child:\n\tLeaf: 1";
        let keys = get_ancestor_keys(doc, Position::new(2, 2));
        assert_eq!(names(&keys), vec!["Root"]);
    }

    #[test]
    fn test_split_attribute_context_does_not_cross_sibling_keys() {
        let doc = indoc! {"
            First:
              Skills:
              - dmg{amount=5
            Second:
              Skills:
              - heal
        "};
        assert!(split_mechanic_line_attribute_context(doc, Position::new(5, 8)).is_none());
    }

    #[test]
    fn test_split_attribute_context_on_inline_key_line() {
        let doc = "Skills: [ - dmg{a=1;amount=";
        let context = split_mechanic_line_attribute_context(doc, Position::new(0, 27)).expect("inline");
        assert_eq!(context.owner.name, "dmg");
        assert_eq!(context.attribute.as_deref(), Some("amount"));
    }

    #[test]
    fn test_current_attribute() {
        assert_eq!(current_attribute("a=1;b=2"), Some("b".to_string()));
        assert_eq!(current_attribute("a=1;"), None);
        assert_eq!(current_attribute("s=[ - x{k=1}; y=2 ]; t"), None);
        assert_eq!(current_attribute("s=[ - x{k=1}; y=2 ]; t=4"), Some("t".to_string()));
    }
}
