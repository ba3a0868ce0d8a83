//! Line grammar scanner for skill lines
//!
//! A skill line has the shape
//!
//! ```text
//! - mechanic{attr=value;...} @targeter{...} ~trigger ?condition{...} ?!other 0.5 <50%
//! ```
//!
//! Editors feed us these lines while the user is still typing them, so nothing
//! here fails: a line that does not look like a skill line yields an empty
//! [`MechanicLineParts`], and a cursor outside any delimited scope yields `None`
//! from [`find_enclosing_object_token`].
//!
//! Tokenisation is balance-aware: whitespace inside `{}`/`[]` never splits a
//! token, so `message{m="a b"}` stays one object token.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::trace;

/// `- ` list prefix of a skill line
static DASH_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*-\s*").expect("valid dash prefix pattern"));

/// Trailing identifier before an opening delimiter, with one optional sigil
static TRAILING_IDENTIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?P<sigil>\?~!|\?!|\?~|\?|@)?(?P<name>[A-Za-z0-9_][A-Za-z0-9_:\-]*)\s*=?$")
        .expect("valid trailing identifier pattern")
});

/// Health modifier token (`=50%`, `<30%`, `>10%`, `=10%-30%`)
static HEALTH_MODIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[=<>]\d+(\.\d+)?%?(-\d+(\.\d+)?%?)?$").expect("valid health modifier pattern"));

/// The grammatical parts of one skill line.
///
/// A missing field means the part is not written on this line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MechanicLineParts {
    pub mechanic: Option<String>,
    pub targeter: Option<String>,
    pub trigger: Option<String>,
    pub conditions: Option<String>,
    pub chance: Option<String>,
    pub health_modifier: Option<String>,
}

impl MechanicLineParts {
    /// True when the line is not a skill line at all
    pub fn is_empty(&self) -> bool {
        self.mechanic.is_none()
    }

    /// Name of the mechanic without its argument block
    pub fn mechanic_name(&self) -> Option<&str> {
        self.mechanic.as_deref().map(strip_arguments)
    }
}

/// Sigil written in front of an object name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Sigil {
    /// `@` targeter
    Targeter,
    /// `~` trigger
    Trigger,
    /// `?` inline target condition
    Condition,
    /// `?!` negated inline condition
    NegatedCondition,
    /// `?~` inline trigger condition
    TriggerCondition,
    /// `?~!` negated inline trigger condition
    NegatedTriggerCondition,
}

impl Sigil {
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "@" => Some(Sigil::Targeter),
            "~" => Some(Sigil::Trigger),
            "?" => Some(Sigil::Condition),
            "?!" => Some(Sigil::NegatedCondition),
            "?~" => Some(Sigil::TriggerCondition),
            "?~!" => Some(Sigil::NegatedTriggerCondition),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Sigil::Targeter => "@",
            Sigil::Trigger => "~",
            Sigil::Condition => "?",
            Sigil::NegatedCondition => "?!",
            Sigil::TriggerCondition => "?~",
            Sigil::NegatedTriggerCondition => "?~!",
        }
    }
}

/// Kind of opening delimiter a cursor is inside
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Delimiter {
    /// `{` attribute block of an object
    Brace,
    /// `[` inline list owned by an attribute
    Bracket,
}

/// The identifier owning an unbalanced opening delimiter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnclosingToken {
    pub sigil: Option<Sigil>,
    pub name: String,
    pub delimiter: Delimiter,
    /// Byte offset of the opening delimiter in the scanned text
    pub open_offset: usize,
    /// Byte offset where the identifier (including its sigil) starts
    pub name_offset: usize,
}

/// Split `text` on whitespace that sits outside any `{}`/`[]` group.
///
/// Returns each token with its byte offset. A stray closer never drives the depth
/// below zero, so malformed text still tokenises.
pub fn tokenize_line(text: &str) -> Vec<(usize, &str)> {
    let mut tokens = Vec::new();
    let mut depth: usize = 0;
    let mut start: Option<usize> = None;

    for (offset, ch) in text.char_indices() {
        match ch {
            '{' | '[' => depth += 1,
            '}' | ']' => depth = depth.saturating_sub(1),
            _ => {}
        }
        if ch.is_whitespace() && depth == 0 {
            if let Some(begin) = start.take() {
                tokens.push((begin, &text[begin..offset]));
            }
        } else if start.is_none() {
            start = Some(offset);
        }
    }
    if let Some(begin) = start {
        tokens.push((begin, &text[begin..]));
    }
    tokens
}

/// Decompose one line into mechanic, targeter, trigger and condition parts.
///
/// Returns an empty result when the line has no `- object` head.
pub fn parse_mechanic_line(line: &str) -> MechanicLineParts {
    let mut parts = MechanicLineParts::default();
    let Some(prefix) = DASH_PREFIX.find(line) else {
        return parts;
    };
    let body = &line[prefix.end()..];
    let tokens = tokenize_line(body);
    let mut tokens = tokens.into_iter().peekable();

    match tokens.next() {
        Some((_, head)) if !head.starts_with(['@', '~', '?']) => {
            parts.mechanic = Some(head.trim().to_string());
        }
        _ => return parts,
    }

    if let Some((_, token)) = tokens.next_if(|(_, token)| token.starts_with('@')) {
        parts.targeter = Some(token.trim().to_string());
    }
    if let Some((_, token)) = tokens.next_if(|(_, token)| token.starts_with('~')) {
        parts.trigger = Some(token.trim().to_string());
    }

    let mut condition_span: Option<(usize, usize)> = None;
    while let Some((offset, token)) = tokens.next_if(|(_, token)| token.starts_with('?')) {
        let end = offset + token.len();
        condition_span = Some(match condition_span {
            Some((begin, _)) => (begin, end),
            None => (offset, end),
        });
    }
    if let Some((begin, end)) = condition_span {
        parts.conditions = Some(body[begin..end].trim().to_string());
    }

    for (_, token) in tokens {
        if parts.chance.is_none() && token.parse::<f64>().is_ok() {
            parts.chance = Some(token.to_string());
        } else if parts.health_modifier.is_none() && HEALTH_MODIFIER.is_match(token) {
            parts.health_modifier = Some(token.to_string());
        } else {
            trace!("Unrecognised trailing token {:?} on skill line", token);
            break;
        }
    }

    parts
}

/// Find the identifier owning the innermost delimiter the cursor is still inside.
///
/// Scans backward from the end of `text_before_cursor` with a balance counter:
/// closers increment it, openers decrement it, and the first opener driving it
/// negative is the unbalanced one. Fully closed groups net to zero and are skipped.
pub fn find_enclosing_object_token(text_before_cursor: &str) -> Option<EnclosingToken> {
    let mut balance: i32 = 0;

    for (offset, ch) in text_before_cursor.char_indices().rev() {
        let delimiter = match ch {
            '}' | ']' => {
                balance += 1;
                continue;
            }
            '{' => Delimiter::Brace,
            '[' => Delimiter::Bracket,
            _ => continue,
        };
        balance -= 1;
        if balance >= 0 {
            continue;
        }

        let before = text_before_cursor[..offset].trim_end();
        let captures = TRAILING_IDENTIFIER.captures(before)?;
        let whole = captures.get(0)?;
        let name = captures.name("name")?.as_str().to_string();
        let sigil = captures.name("sigil").and_then(|m| Sigil::parse(m.as_str()));
        trace!("Enclosing {:?} owned by {:?}{}", delimiter, sigil, name);
        return Some(EnclosingToken {
            sigil,
            name,
            delimiter,
            open_offset: offset,
            name_offset: whole.start(),
        });
    }

    None
}

/// Remove every `{...}` and `[...]` argument group, nesting included.
///
/// A closer with nothing open is kept as plain text.
pub fn strip_brace_groups(text: &str) -> String {
    let mut stripped = String::with_capacity(text.len());
    let mut depth: usize = 0;
    for ch in text.chars() {
        match ch {
            '{' | '[' => depth += 1,
            '}' | ']' if depth > 0 => depth -= 1,
            _ if depth == 0 => stripped.push(ch),
            _ => {}
        }
    }
    stripped
}

/// The token still being typed at the end of `text`, if the cursor is not past a separator.
///
/// Tokens are split the way [`tokenize_line`] splits them.
pub fn typed_token(text: &str) -> Option<&str> {
    tokenize_line(text)
        .last()
        .filter(|(begin, token)| begin + token.len() == text.len())
        .map(|&(_, token)| token)
}

/// Index of the positional slot the cursor is typing into.
///
/// Counts the tokens [`tokenize_line`] produces for `text`; a token still being
/// typed is the current slot rather than a completed one.
pub fn positional_index(text: &str) -> usize {
    let count = tokenize_line(text).len();
    match typed_token(text) {
        Some(_) => count - 1,
        None => count,
    }
}

/// The `<...>` placeholder expression being typed at the end of `text_before_cursor`.
pub fn placeholder_expression(text_before_cursor: &str) -> Option<&str> {
    let open = text_before_cursor.rfind('<')?;
    let expression = &text_before_cursor[open + 1..];
    if expression.contains('>') || expression.contains(char::is_whitespace) {
        return None;
    }
    Some(expression)
}

/// Identifier under the cursor, with the sigil written directly before it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordAt {
    pub sigil: Option<Sigil>,
    pub word: String,
    /// Byte offset of the word (after its sigil)
    pub start: usize,
    /// Byte offset one past the word
    pub end: usize,
    /// Byte offset of the sigil, or `start` without one
    pub sigil_start: usize,
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || matches!(ch, '_' | ':' | '-')
}

/// Find the identifier spanning byte offset `cursor` in `line`.
pub fn word_at(line: &str, cursor: usize) -> Option<WordAt> {
    let cursor = cursor.min(line.len());
    let mut start = cursor;
    for (offset, ch) in line[..cursor].char_indices().rev() {
        if !is_word_char(ch) {
            break;
        }
        start = offset;
    }
    let end = line[cursor..]
        .char_indices()
        .find(|(_, ch)| !is_word_char(*ch))
        .map(|(offset, _)| cursor + offset)
        .unwrap_or(line.len());

    let raw = &line[start..end];
    let trimmed = raw.trim_start_matches('-');
    if trimmed.is_empty() {
        return None;
    }
    let start = end - trimmed.len();

    let before = &line[..start];
    let sigil = ["?~!", "?!", "?~", "?", "@", "~"]
        .into_iter()
        .find(|candidate| before.ends_with(candidate))
        .and_then(Sigil::parse);
    let sigil_start = start - sigil.map(|s| s.as_str().len()).unwrap_or(0);

    Some(WordAt {
        sigil,
        word: trimmed.to_string(),
        start,
        end,
        sigil_start,
    })
}

/// `dmg{amount=5}` → `dmg`
pub fn strip_arguments(token: &str) -> &str {
    token
        .find(['{', '['])
        .map(|index| &token[..index])
        .unwrap_or(token)
}
