//! Scripted placeholder segments
//!
//! A scripted segment stands for a set of values computed or matched at lookup
//! time rather than listed in the trie: `<caster.var.{name}>` accepts any variable
//! name, `<random.{integer}>` any integer. Paths name them in braces; the name is
//! matched case-insensitively.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::registry::{DatasetProvider, Datasets, EnumDataset};

pub trait ScriptedSegment: Send + Sync + fmt::Debug {
    /// Name without braces, e.g. `integer`
    fn name(&self) -> &str;

    /// Values this segment can offer during completion; empty when unbounded.
    fn candidates(&self) -> Vec<String> {
        Vec::new()
    }

    /// Whether `value` is a valid instance of this segment
    fn owns(&self, value: &str) -> bool;
}

#[derive(Debug)]
pub struct IntegerSegment;

impl ScriptedSegment for IntegerSegment {
    fn name(&self) -> &str {
        "integer"
    }

    fn owns(&self, value: &str) -> bool {
        value.parse::<i64>().is_ok()
    }
}

/// Any number. Paths split on `.`, so a decimal point never reaches this segment.
#[derive(Debug)]
pub struct FloatSegment;

impl ScriptedSegment for FloatSegment {
    fn name(&self) -> &str {
        "float"
    }

    fn owns(&self, value: &str) -> bool {
        !value.contains('.') && value.chars().any(|c| c.is_ascii_digit()) && value.parse::<f64>().is_ok()
    }
}

/// `key=value;key=value`
#[derive(Debug)]
pub struct MapSegment;

impl ScriptedSegment for MapSegment {
    fn name(&self) -> &str {
        "map"
    }

    fn owns(&self, value: &str) -> bool {
        !value.is_empty()
            && value.split(';').filter(|pair| !pair.is_empty()).all(|pair| {
                pair.split_once('=')
                    .is_some_and(|(key, _)| !key.trim().is_empty())
            })
            && value.contains('=')
    }
}

/// Any identifier (`{name}`, `{variable}`)
#[derive(Debug)]
pub struct IdentifierSegment {
    name: String,
}

impl IdentifierSegment {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl ScriptedSegment for IdentifierSegment {
    fn name(&self) -> &str {
        &self.name
    }

    fn owns(&self, value: &str) -> bool {
        !value.is_empty() && value.chars().all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | ':'))
    }
}

/// Members of an enumerated dataset, e.g. `{material}`
#[derive(Debug)]
pub struct DatasetSegment {
    name: String,
    dataset: EnumDataset,
}

impl DatasetSegment {
    pub fn new(dataset: EnumDataset) -> Self {
        Self {
            name: dataset.name().to_lowercase(),
            dataset,
        }
    }
}

impl ScriptedSegment for DatasetSegment {
    fn name(&self) -> &str {
        &self.name
    }

    fn candidates(&self) -> Vec<String> {
        self.dataset.keys().map(str::to_string).collect()
    }

    fn owns(&self, value: &str) -> bool {
        self.dataset.contains(value)
    }
}

/// Scripted segments available to path insertion, by lowercase name
#[derive(Debug, Clone, Default)]
pub struct ScriptedSegments {
    segments: FxHashMap<String, Arc<dyn ScriptedSegment>>,
}

impl ScriptedSegments {
    pub fn new() -> Self {
        Self::default()
    }

    /// `{integer}`, `{float}`, `{map}`, `{name}` and `{variable}`
    pub fn builtin() -> Self {
        let mut segments = Self::new();
        segments.register(Arc::new(IntegerSegment));
        segments.register(Arc::new(FloatSegment));
        segments.register(Arc::new(MapSegment));
        segments.register(Arc::new(IdentifierSegment::new("name")));
        segments.register(Arc::new(IdentifierSegment::new("variable")));
        segments
    }

    /// Built-ins plus one segment per dataset; a built-in name is never shadowed.
    pub fn with_datasets(datasets: &Datasets) -> Self {
        let mut segments = Self::builtin();
        for name in datasets.names() {
            if segments.segments.contains_key(&name.to_lowercase()) {
                continue;
            }
            if let Some(dataset) = datasets.dataset(name) {
                segments.register(Arc::new(DatasetSegment::new(dataset.clone())));
            }
        }
        segments
    }

    pub fn register(&mut self, segment: Arc<dyn ScriptedSegment>) {
        self.segments.insert(segment.name().to_lowercase(), segment);
    }

    /// Segment named by a raw path element such as `{Integer}`
    pub fn get(&self, raw: &str) -> Option<Arc<dyn ScriptedSegment>> {
        let name = raw.strip_prefix('{')?.strip_suffix('}')?;
        self.segments.get(&name.to_lowercase()).cloned()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_owns() {
        assert!(IntegerSegment.owns("42"));
        assert!(IntegerSegment.owns("-7"));
        assert!(!IntegerSegment.owns("four"));
        assert!(!IntegerSegment.owns(""));
    }

    #[test]
    fn test_float_owns() {
        assert!(FloatSegment.owns("3"));
        assert!(FloatSegment.owns("1e3"));
        assert!(!FloatSegment.owns("1.5"));
        assert!(!FloatSegment.owns("inf"));
    }

    #[test]
    fn test_map_owns() {
        assert!(MapSegment.owns("a=1;b=2"));
        assert!(MapSegment.owns("a=1;"));
        assert!(!MapSegment.owns("a;b"));
        assert!(!MapSegment.owns("=1"));
    }

    #[test]
    fn test_lookup_requires_braces() {
        let segments = ScriptedSegments::builtin();
        assert_eq!(segments.get("{Integer}").map(|s| s.name().to_string()), Some("integer".to_string()));
        assert!(segments.get("integer").is_none());
        assert!(segments.get("{unknown}").is_none());
    }

    #[test]
    fn test_dataset_segments() {
        let datasets = Datasets::new().with(EnumDataset::from_keys("SOUND", ["ENTITY_CAT_PURR"]));
        let segments = ScriptedSegments::with_datasets(&datasets);
        let sound = segments.get("{sound}").expect("dataset segment");
        assert!(sound.owns("entity_cat_purr"));
        assert_eq!(sound.candidates(), vec!["ENTITY_CAT_PURR".to_string()]);
    }
}
