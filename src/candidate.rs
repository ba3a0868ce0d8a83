//! Completion candidates
//!
//! Schema and placeholder completion both produce [`Candidate`] values. They are
//! plain data so that callers other than an editor (the CLI, tests) can inspect
//! them; [`Candidate::to_completion_item`] converts to the LSP shape.

use lsp_types::{
    Command, CompletionItem, CompletionItemKind, Documentation, InsertTextFormat, MarkupContent, MarkupKind,
};
use serde::Serialize;

/// Editor command re-opening the completion menu after a candidate is accepted
pub const RETRIGGER_COMMAND: &str = "editor.action.triggerSuggest";

/// What a candidate stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateKind {
    /// A schema key offered on a new line
    Key,
    /// A fixed literal value (`values`, booleans)
    Value,
    /// A member of an enumerated dataset
    EnumMember,
    /// A placeholder path segment
    Placeholder,
    /// A dynamically matched placeholder segment (`{integer}`)
    Scripted,
}

impl CandidateKind {
    fn completion_item_kind(self) -> CompletionItemKind {
        match self {
            CandidateKind::Key => CompletionItemKind::PROPERTY,
            CandidateKind::Value => CompletionItemKind::VALUE,
            CandidateKind::EnumMember => CompletionItemKind::ENUM_MEMBER,
            CandidateKind::Placeholder => CompletionItemKind::FIELD,
            CandidateKind::Scripted => CompletionItemKind::SNIPPET,
        }
    }
}

/// One completion candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    pub label: String,
    /// Text inserted on acceptance; defaults to the label
    pub insert_text: String,
    pub kind: CandidateKind,
    pub detail: Option<String>,
    pub documentation: Option<String>,
    /// `insert_text` uses snippet syntax (`${1|a,b|}`)
    pub snippet: bool,
    /// Accepting the candidate should re-open completion
    pub retrigger: bool,
}

impl Candidate {
    pub fn new(label: impl Into<String>, kind: CandidateKind) -> Self {
        let label = label.into();
        Self {
            insert_text: label.clone(),
            label,
            kind,
            detail: None,
            documentation: None,
            snippet: false,
            retrigger: false,
        }
    }

    pub fn with_insert_text(mut self, insert_text: impl Into<String>) -> Self {
        self.insert_text = insert_text.into();
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_documentation(mut self, documentation: Option<String>) -> Self {
        self.documentation = documentation;
        self
    }

    pub fn as_snippet(mut self) -> Self {
        self.snippet = true;
        self
    }

    pub fn retriggering(mut self) -> Self {
        self.retrigger = true;
        self
    }

    /// Convert to an LSP completion item; `sort_order` keeps the generated order.
    pub fn to_completion_item(&self, sort_order: usize) -> CompletionItem {
        let mut item = CompletionItem {
            label: self.label.clone(),
            kind: Some(self.kind.completion_item_kind()),
            detail: self.detail.clone(),
            ..Default::default()
        };

        if let Some(ref doc) = self.documentation {
            item.documentation = Some(Documentation::MarkupContent(MarkupContent {
                kind: MarkupKind::Markdown,
                value: doc.clone(),
            }));
        }

        if self.insert_text != self.label || self.snippet {
            item.insert_text = Some(self.insert_text.clone());
        }
        if self.snippet {
            item.insert_text_format = Some(InsertTextFormat::SNIPPET);
        }
        if self.retrigger {
            item.command = Some(Command {
                title: "Re-trigger completion".to_string(),
                command: RETRIGGER_COMMAND.to_string(),
                arguments: None,
            });
        }

        item.sort_text = Some(format!("{:04}", sort_order));
        item
    }
}

/// Escape snippet metacharacters in literal text
pub fn escape_snippet(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '$' | '}' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_candidate_has_no_insert_text() {
        let item = Candidate::new("STONE", CandidateKind::EnumMember).to_completion_item(3);
        assert_eq!(item.label, "STONE");
        assert_eq!(item.insert_text, None);
        assert_eq!(item.kind, Some(CompletionItemKind::ENUM_MEMBER));
        assert_eq!(item.sort_text.as_deref(), Some("0003"));
    }

    #[test]
    fn test_snippet_with_retrigger() {
        let item = Candidate::new("caster", CandidateKind::Placeholder)
            .with_insert_text("caster.")
            .retriggering()
            .to_completion_item(0);
        assert_eq!(item.insert_text.as_deref(), Some("caster."));
        assert_eq!(item.command.map(|c| c.command), Some(RETRIGGER_COMMAND.to_string()));

        let item = Candidate::new("{integer}", CandidateKind::Scripted)
            .with_insert_text("${1:integer}")
            .as_snippet()
            .to_completion_item(0);
        assert_eq!(item.insert_text_format, Some(InsertTextFormat::SNIPPET));
    }

    #[test]
    fn test_escape_snippet() {
        assert_eq!(escape_snippet("a$b}"), "a\\$b\\}");
    }
}
