//! Object linkage resolver
//!
//! Answers "which object or attribute does the cursor belong to" for skill
//! lines. The key stack tells us which section the cursor is in (and so which
//! registry un-sigiled objects belong to); the backward delimiter scan tells us
//! which object's argument block, or which attribute's inline list, the cursor
//! is inside.
//!
//! Inline lists nest: in
//!
//! ```text
//! - skill{conditions=[ - distance{d=1} ]; s=[ - dmg{a=1} ]}
//! ```
//!
//! `distance` is a condition because the `conditions` attribute of `skill`
//! accepts an inline condition list, while `dmg` is a mechanic. Deciding that
//! for `d=` means resolving `distance`'s own position, then the owner of the
//! list around it, recursively outward.

use std::sync::Arc;

use lsp_types::Position;
use serde::Serialize;
use tracing::debug;

use crate::config::EngineConfig;
use crate::document::{DocumentSnapshot, char_to_byte};
use crate::parsers::key_stack::{
    bounded_text_before_cursor, current_attribute, get_ancestor_keys, key_at_line,
    split_mechanic_line_attribute_context,
};
use crate::parsers::line_grammar::{
    Delimiter, EnclosingToken, Sigil, find_enclosing_object_token, strip_arguments, word_at,
};
use crate::registry::{AttributeEntry, ObjectCategory, ObjectEntry, Registry, SKILL_MECHANIC};

/// An object found in one of the registries
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedObject {
    pub category: ObjectCategory,
    pub entry: Arc<ObjectEntry>,
    /// The name as written in the document
    pub written_name: String,
}

/// An attribute of a resolved object
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedAttribute {
    pub owner: ResolvedObject,
    pub attribute: AttributeEntry,
}

/// Outcome of resolving the cursor
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Found {
    /// The cursor is on an object name (mechanic, targeter, condition, ...)
    Mechanic(ResolvedObject),
    /// The cursor is on an attribute name or inside its value
    Attribute(ResolvedAttribute),
    NotFound,
}

/// What the word under the cursor denotes, before any registry lookup
enum CursorTarget {
    Object { sigil: Option<Sigil>, name: String },
    Attribute { owner: EnclosingToken, name: String },
}

/// Shared state of one resolution: the bounded text and the section's category
struct Scan<'a> {
    text: &'a str,
    section: ObjectCategory,
    registry: &'a Registry,
    config: &'a EngineConfig,
}

fn sigil_category(sigil: Sigil) -> ObjectCategory {
    match sigil {
        Sigil::Targeter => ObjectCategory::Targeter,
        Sigil::Trigger => ObjectCategory::Trigger,
        Sigil::Condition
        | Sigil::NegatedCondition
        | Sigil::TriggerCondition
        | Sigil::NegatedTriggerCondition => ObjectCategory::Condition,
    }
}

/// Look `name` up in the registry of `category`.
///
/// `skill:<name>` shorthand with no mechanic of that name falls back to the
/// `skill` mechanic; trigger arguments (`~onTimer:20`) are ignored.
pub fn lookup_object(registry: &Registry, category: ObjectCategory, name: &str) -> Option<ResolvedObject> {
    let bare = strip_arguments(name);
    let lookup_name = match category {
        ObjectCategory::Trigger => bare.split(':').next().unwrap_or(bare),
        _ => bare,
    };

    let entry = registry.category(category).get_by_name(lookup_name).or_else(|| {
        let is_skill_shorthand = category == ObjectCategory::Mechanic
            && lookup_name.len() > SKILL_MECHANIC.len() + 1
            && lookup_name
                .get(..SKILL_MECHANIC.len() + 1)
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case("skill:"));
        is_skill_shorthand.then(|| {
            registry
                .mechanics
                .get_by_name(SKILL_MECHANIC)
                .unwrap_or_else(|| Arc::new(ObjectEntry::synthetic_skill()))
        })
    })?;

    Some(ResolvedObject {
        category,
        entry,
        written_name: bare.to_string(),
    })
}

impl<'a> Scan<'a> {
    /// Category of the object named by `token`, from its sigil or its position
    fn token_category(&self, token: &EnclosingToken) -> Option<ObjectCategory> {
        match token.sigil {
            Some(sigil) => Some(sigil_category(sigil)),
            None => self.position_category(token.name_offset),
        }
    }

    /// Category of an un-sigiled object written at byte `offset` of the scan text
    fn position_category(&self, offset: usize) -> Option<ObjectCategory> {
        match find_enclosing_object_token(&self.text[..offset]) {
            None => Some(self.section),
            Some(list) if list.delimiter == Delimiter::Bracket => self.list_category(&list),
            Some(_) => Some(ObjectCategory::Mechanic),
        }
    }

    /// Category of objects inside the inline list owned by attribute `list.name`.
    ///
    /// `None` when the owning attribute is known and is not a list of objects.
    fn list_category(&self, list: &EnclosingToken) -> Option<ObjectCategory> {
        let owner = match find_enclosing_object_token(&self.text[..list.name_offset]) {
            Some(owner) if owner.delimiter == Delimiter::Brace => self.resolve_token(&owner),
            _ => None,
        };
        let attribute = owner
            .as_ref()
            .and_then(|owner| owner.entry.get_attribute_by_name(&list.name));

        match attribute {
            Some(attribute) if attribute.inline_conditions => Some(ObjectCategory::Condition),
            Some(attribute) => {
                let holds_skills = self.config.is_inline_list_attribute(&attribute.name)
                    || attribute
                        .value_type
                        .as_deref()
                        .is_some_and(|value_type| value_type.to_lowercase().contains("skill"));
                holds_skills.then_some(ObjectCategory::Mechanic)
            }
            None => Some(ObjectCategory::Mechanic),
        }
    }

    /// Resolve the object owning a `{` scope
    fn resolve_token(&self, token: &EnclosingToken) -> Option<ResolvedObject> {
        let category = self.token_category(token)?;
        lookup_object(self.registry, category, &token.name)
    }
}

/// Registry for un-sigiled objects in the cursor's section.
///
/// An inline list on a skill-bearing key line (`Skills: [ - dmg ]`) belongs to
/// that key; otherwise the innermost ancestor key decides.
fn section_category<D: DocumentSnapshot + ?Sized>(
    document: &D,
    position: Position,
    config: &EngineConfig,
) -> Option<ObjectCategory> {
    let section_key = key_at_line(document, position.line as usize)
        .filter(|key| config.is_skill_bearing(&key.key))
        .or_else(|| get_ancestor_keys(document, position).into_iter().next())?;
    config.key_category(&section_key.key)
}

/// Bounded scan text, the cursor line's key section and the word under the cursor.
fn cursor_target<D: DocumentSnapshot + ?Sized>(
    document: &D,
    position: Position,
    config: &EngineConfig,
) -> Option<(String, ObjectCategory, CursorTarget)> {
    let cursor_line = position.line as usize;
    let line = document.line(cursor_line)?;
    let cursor = char_to_byte(&line, position.character as usize);

    let section = section_category(document, position, config)?;

    let word = word_at(&line, cursor)?;
    let (_, text) = bounded_text_before_cursor(document, position);
    let cut = text.len().checked_sub(cursor.saturating_sub(word.sigil_start))?;
    let before = &text[..cut];

    let target = match find_enclosing_object_token(before) {
        Some(enclosing) if enclosing.delimiter == Delimiter::Brace => {
            let scope_text = &before[enclosing.open_offset + 1..];
            let name = current_attribute(scope_text).unwrap_or_else(|| word.word.clone());
            CursorTarget::Attribute {
                owner: enclosing,
                name,
            }
        }
        _ => CursorTarget::Object {
            sigil: word.sigil,
            name: word.word.clone(),
        },
    };

    Some((before.to_string(), section, target))
}

/// Resolve the object or attribute the cursor belongs to.
///
/// Never fails: any position outside a recognised skill section, or a name the
/// registries do not know, yields [`Found::NotFound`].
pub fn resolve_attribute_owner<D: DocumentSnapshot + ?Sized>(
    document: &D,
    position: Position,
    registry: &Registry,
    config: &EngineConfig,
) -> Found {
    let Some((before, section, target)) = cursor_target(document, position, config) else {
        return Found::NotFound;
    };
    let scan = Scan {
        text: &before,
        section,
        registry,
        config,
    };

    let found = match target {
        CursorTarget::Object { sigil, name } => {
            let category = match sigil {
                Some(sigil) => Some(sigil_category(sigil)),
                None => scan.position_category(before.len()),
            };
            category
                .and_then(|category| lookup_object(registry, category, &name))
                .map(Found::Mechanic)
        }
        CursorTarget::Attribute { owner, name } => scan.resolve_token(&owner).and_then(|owner| {
            let attribute = owner.entry.get_attribute_by_name(&name)?.clone();
            Some(Found::Attribute(ResolvedAttribute { owner, attribute }))
        }),
    };

    let found = found.unwrap_or(Found::NotFound);
    debug!("Resolved cursor {}:{} to {:?}", position.line, position.character, found_label(&found));
    found
}

/// Registry category of the object the cursor is on, or whose argument block
/// the cursor is inside; no registry hit is required.
pub fn resolve_object_category<D: DocumentSnapshot + ?Sized>(
    document: &D,
    position: Position,
    registry: &Registry,
    config: &EngineConfig,
) -> Option<ObjectCategory> {
    let (before, section, target) = cursor_target(document, position, config)?;
    let scan = Scan {
        text: &before,
        section,
        registry,
        config,
    };
    match target {
        CursorTarget::Object { sigil: Some(sigil), .. } => Some(sigil_category(sigil)),
        CursorTarget::Object { sigil: None, .. } => scan.position_category(before.len()),
        CursorTarget::Attribute { owner, .. } => scan.token_category(&owner),
    }
}

/// The object whose argument block the cursor is typing in, for attribute completion.
pub fn resolve_context_owner<D: DocumentSnapshot + ?Sized>(
    document: &D,
    position: Position,
    registry: &Registry,
    config: &EngineConfig,
) -> Option<(ResolvedObject, Option<String>)> {
    let context = split_mechanic_line_attribute_context(document, position)?;
    if context.owner.delimiter != Delimiter::Brace {
        return None;
    }
    let scan = Scan {
        text: &context.text,
        section: section_category(document, position, config)?,
        registry,
        config,
    };
    let owner = scan.resolve_token(&context.owner)?;
    Some((owner, context.attribute))
}

fn found_label(found: &Found) -> String {
    match found {
        Found::Mechanic(object) => format!("{} {}", object.category.as_str(), object.entry.name),
        Found::Attribute(attribute) => format!(
            "attribute {} of {}",
            attribute.attribute.name, attribute.owner.entry.name
        ),
        Found::NotFound => "nothing".to_string(),
    }
}
