//! Random inputs for property-based tests.
//!
//! - [`KeyDocument`]: well-nested YAML key documents with `- item` lines, two-space indents
//! - [`BalancedGroup`]: attribute text whose `{}`/`[]` groups are all closed
//! - [`PlaceholderPaths`]: dotted placeholder paths over a small shared vocabulary
//!
//! Generation uses a depth parameter to bound recursion.

use quickcheck::{Arbitrary, Gen};

const KEY_NAMES: &[&str] = &["Skills", "Options", "Type", "Equipment", "Drops", "Health", "BossBar", "Color"];

/// One line of a [`KeyDocument`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DocLine {
    /// `Name:` indented by `depth` levels
    Key { depth: usize, name: String },
    /// `- item` under the nearest key above, flush with it or one level deeper
    Item { parent_depth: usize, flush: bool },
}

impl DocLine {
    /// Leading spaces the line is rendered with
    pub fn indent(&self) -> usize {
        match self {
            DocLine::Key { depth, .. } => depth * 2,
            DocLine::Item { parent_depth, flush: true } => parent_depth * 2,
            DocLine::Item { parent_depth, flush: false } => (parent_depth + 1) * 2,
        }
    }

    pub fn is_key(&self) -> bool {
        matches!(self, DocLine::Key { .. })
    }
}

/// Key lines whose depth is at most one more than the previous key's depth,
/// interleaved with `- item` lines. The first line is always a root key.
#[derive(Clone, Debug)]
pub struct KeyDocument {
    pub lines: Vec<DocLine>,
}

impl KeyDocument {
    pub fn to_text(&self) -> String {
        self.lines
            .iter()
            .map(|line| match line {
                DocLine::Key { name, .. } => format!("{}{}:", " ".repeat(line.indent()), name),
                DocLine::Item { .. } => format!("{}- item", " ".repeat(line.indent())),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Arbitrary for KeyDocument {
    fn arbitrary(g: &mut Gen) -> Self {
        let count = 1 + usize::arbitrary(g) % 24;
        let mut lines = Vec::with_capacity(count);
        let mut depth = 0usize;
        for index in 0..count {
            if index > 0 && u8::arbitrary(g) % 4 == 0 {
                lines.push(DocLine::Item {
                    parent_depth: depth,
                    flush: bool::arbitrary(g),
                });
                continue;
            }
            if index > 0 {
                depth = match u8::arbitrary(g) % 3 {
                    0 => depth + 1,
                    1 => depth,
                    _ => usize::arbitrary(g) % (depth + 1),
                };
            }
            lines.push(DocLine::Key {
                depth,
                name: g.choose(KEY_NAMES).unwrap().to_string(),
            });
        }
        KeyDocument { lines }
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        // dropping trailing lines keeps the nesting valid
        let lines = self.lines.clone();
        Box::new((1..lines.len()).rev().map(move |len| KeyDocument {
            lines: lines[..len].to_vec(),
        }))
    }
}

/// Text with every opened group closed, e.g. `a=1;b=[ - x{y=2} ];`
#[derive(Clone, Debug)]
pub struct BalancedGroup(pub String);

fn gen_word(g: &mut Gen) -> String {
    const WORDS: &[&str] = &["a", "amount", "10", "d", "true", "ENTITY_CAT_PURR", "x", "5"];
    g.choose(WORDS).unwrap().to_string()
}

fn gen_balanced(g: &mut Gen, depth: usize) -> String {
    let parts = usize::arbitrary(g) % 4;
    let mut text = String::new();
    for _ in 0..parts {
        let choice = if depth == 0 { u8::arbitrary(g) % 3 } else { u8::arbitrary(g) % 5 };
        match choice {
            0 => text.push_str(&gen_word(g)),
            1 => text.push_str(g.choose(&[" ", ";", "=", " - "]).unwrap()),
            2 => {
                text.push_str(&gen_word(g));
                text.push('=');
                text.push_str(&gen_word(g));
                text.push(';');
            }
            3 => {
                text.push_str(&gen_word(g));
                text.push('{');
                text.push_str(&gen_balanced(g, depth - 1));
                text.push('}');
            }
            _ => {
                text.push('[');
                text.push_str(&gen_balanced(g, depth - 1));
                text.push(']');
            }
        }
    }
    text
}

impl Arbitrary for BalancedGroup {
    fn arbitrary(g: &mut Gen) -> Self {
        BalancedGroup(gen_balanced(g, 3))
    }
}

const PATH_SEGMENTS: &[&str] = &["caster", "target", "var", "name", "hp", "l", "x", "{integer}", "{name}"];

/// A handful of dotted placeholder paths
#[derive(Clone, Debug)]
pub struct PlaceholderPaths(pub Vec<String>);

impl Arbitrary for PlaceholderPaths {
    fn arbitrary(g: &mut Gen) -> Self {
        let count = 1 + usize::arbitrary(g) % 8;
        let paths = (0..count)
            .map(|_| {
                let len = 1 + usize::arbitrary(g) % 4;
                (0..len)
                    .map(|_| g.choose(PATH_SEGMENTS).unwrap().to_string())
                    .collect::<Vec<_>>()
                    .join(".")
            })
            .collect();
        PlaceholderPaths(paths)
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        Box::new(self.0.shrink().filter(|paths| !paths.is_empty()).map(PlaceholderPaths))
    }
}
