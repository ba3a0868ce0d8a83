//! Document snapshot abstraction
//!
//! Every resolver in this crate works on an immutable, line-indexed snapshot of
//! the document and an LSP cursor position. Editors usually hold a `Rope`; tests
//! and the CLI hand in plain strings. Both implement [`DocumentSnapshot`].

use std::borrow::Cow;

use lsp_types::Position;
use ropey::Rope;

/// Line-indexed read access to a document snapshot
pub trait DocumentSnapshot {
    /// Number of lines in the snapshot
    fn line_count(&self) -> usize;

    /// Text of line `index` without its line terminator
    fn line(&self, index: usize) -> Option<Cow<'_, str>>;
}

fn strip_line_ending(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

impl DocumentSnapshot for Rope {
    fn line_count(&self) -> usize {
        self.len_lines()
    }

    fn line(&self, index: usize) -> Option<Cow<'_, str>> {
        if index >= self.len_lines() {
            return None;
        }
        match Cow::from(self.line(index)) {
            Cow::Borrowed(text) => Some(Cow::Borrowed(strip_line_ending(text))),
            Cow::Owned(text) => Some(Cow::Owned(strip_line_ending(&text).to_string())),
        }
    }
}

impl DocumentSnapshot for str {
    fn line_count(&self) -> usize {
        self.split('\n').count()
    }

    fn line(&self, index: usize) -> Option<Cow<'_, str>> {
        self.split('\n')
            .nth(index)
            .map(|line| Cow::Borrowed(strip_line_ending(line)))
    }
}

impl DocumentSnapshot for String {
    fn line_count(&self) -> usize {
        self.as_str().line_count()
    }

    fn line(&self, index: usize) -> Option<Cow<'_, str>> {
        DocumentSnapshot::line(self.as_str(), index)
    }
}

/// Byte offset of `character` (a char count, as LSP positions carry) within `line`.
///
/// Characters past the end clamp to the line length.
pub fn char_to_byte(line: &str, character: usize) -> usize {
    line.char_indices()
        .nth(character)
        .map(|(offset, _)| offset)
        .unwrap_or(line.len())
}

/// Text of the cursor line up to the cursor
pub fn line_prefix<D: DocumentSnapshot + ?Sized>(document: &D, position: Position) -> Option<String> {
    let line = document.line(position.line as usize)?;
    let end = char_to_byte(&line, position.character as usize);
    Some(line[..end].to_string())
}

/// Concatenated text from the start of `from_line` up to the cursor, lines joined with `\n`
pub fn text_between<D: DocumentSnapshot + ?Sized>(
    document: &D,
    from_line: usize,
    position: Position,
) -> String {
    let cursor_line = position.line as usize;
    let mut text = String::new();
    for index in from_line..cursor_line {
        if let Some(line) = document.line(index) {
            text.push_str(&line);
        }
        text.push('\n');
    }
    if let Some(prefix) = line_prefix(document, position) {
        text.push_str(&prefix);
    }
    text
}

/// Number of leading whitespace characters (spaces and tabs counted alike)
pub fn indentation(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rope_lines_strip_terminators() {
        let rope = Rope::from_str("Skills:\r\n- dmg\n");
        assert_eq!(DocumentSnapshot::line(&rope, 0).as_deref(), Some("Skills:"));
        assert_eq!(DocumentSnapshot::line(&rope, 1).as_deref(), Some("- dmg"));
        assert_eq!(DocumentSnapshot::line(&rope, 2).as_deref(), Some(""));
        assert!(DocumentSnapshot::line(&rope, 3).is_none());
    }

    #[test]
    fn test_str_and_rope_agree() {
        let text = "a:\n  b: 1\n  c: 2";
        let rope = Rope::from_str(text);
        assert_eq!(text.line_count(), rope.line_count());
        for i in 0..text.line_count() {
            assert_eq!(DocumentSnapshot::line(text, i), DocumentSnapshot::line(&rope, i));
        }
    }

    #[test]
    fn test_char_to_byte_handles_multibyte() {
        let line = "§a name";
        assert_eq!(char_to_byte(line, 1), 2);
        assert_eq!(char_to_byte(line, 100), line.len());
    }

    #[test]
    fn test_text_between_joins_lines() {
        let text = "Skills:\n- dmg{\n  amount=5";
        let joined = text_between(text, 1, Position::new(2, 5));
        assert_eq!(joined, "- dmg{\n  amo");
    }

    #[test]
    fn test_indentation_counts_tabs_and_spaces_alike() {
        assert_eq!(indentation("\t  key:"), 3);
        assert_eq!(indentation("key:"), 0);
    }
}
