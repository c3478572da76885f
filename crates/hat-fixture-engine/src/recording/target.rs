//! Targets and the marks they reference.
//!
//! A [`Target`] is a closed, finite tree: primitives wrap a single [`Mark`],
//! lists and ranges nest other targets. Both the walker
//! ([`Target::includes_mark_of_type`]) and the key extractor
//! ([`extract_target_keys`]) match exhaustively, so adding a variant is a
//! compile error here rather than a silent misclassification.
//!
//! Marks stay open: any `type` tag parses, and the recorder only interprets
//! the ones named by [`MarkType`].

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::recording::marks::hat_key;

/// A named reference to a location in the document.
///
/// Only the `type` tag means anything here; every other key is carried
/// verbatim so marks this crate has no name for still round-trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mark {
    #[serde(rename = "type")]
    pub mark_type: String,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Mark {
    pub fn new(mark_type: impl Into<String>) -> Self {
        Self {
            mark_type: mark_type.into(),
            attributes: Map::new(),
        }
    }

    /// A hat drawn over a token, addressed by hat style and character
    pub fn decorated_symbol(symbol_color: impl Into<String>, character: impl Into<String>) -> Self {
        Self::from(MarkType::DecoratedSymbol)
            .with_attribute("symbolColor", Value::String(symbol_color.into()))
            .with_attribute("character", Value::String(character.into()))
    }

    pub fn that() -> Self {
        Self::from(MarkType::That)
    }

    pub fn source() -> Self {
        Self::from(MarkType::Source)
    }

    pub fn cursor() -> Self {
        Self::from(MarkType::Cursor)
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn is(&self, mark_type: MarkType) -> bool {
        self.mark_type == mark_type.as_str()
    }

    /// Key of this mark in the hat token table; only hats have one
    pub fn hat_key(&self) -> Option<String> {
        if !self.is(MarkType::DecoratedSymbol) {
            return None;
        }
        let symbol_color = self.attributes.get("symbolColor")?.as_str()?;
        let character = self.attributes.get("character")?.as_str()?;
        Some(hat_key(symbol_color, character))
    }
}

impl From<MarkType> for Mark {
    fn from(mark_type: MarkType) -> Self {
        Mark::new(mark_type.as_str())
    }
}

/// Mark type tags the recorder gives meaning to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkType {
    DecoratedSymbol,
    That,
    Source,
    Cursor,
    Nothing,
}

impl MarkType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarkType::DecoratedSymbol => "decoratedSymbol",
            MarkType::That => "that",
            MarkType::Source => "source",
            MarkType::Cursor => "cursor",
            MarkType::Nothing => "nothing",
        }
    }
}

impl fmt::Display for MarkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Leaf target. Attributes other than the mark (modifiers, selection type,
/// position) are carried verbatim so the full target round-trips.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimitiveTarget {
    pub mark: Mark,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl PrimitiveTarget {
    pub fn new(mark: Mark) -> Self {
        Self {
            mark,
            attributes: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListTarget {
    pub elements: Vec<Target>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

/// Span between two targets; `rangeType` and similar keys ride along in
/// `attributes`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeTarget {
    pub anchor: Box<Target>,
    pub active: Box<Target>,
    #[serde(default)]
    pub exclude_anchor: bool,
    #[serde(default)]
    pub exclude_active: bool,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Target {
    Primitive(PrimitiveTarget),
    List(ListTarget),
    Range(RangeTarget),
}

impl Target {
    pub fn primitive(mark: Mark) -> Self {
        Target::Primitive(PrimitiveTarget::new(mark))
    }

    pub fn list(elements: Vec<Target>) -> Self {
        Target::List(ListTarget {
            elements,
            attributes: Map::new(),
        })
    }

    pub fn range(anchor: Target, active: Target) -> Self {
        Target::Range(RangeTarget {
            anchor: Box::new(anchor),
            active: Box::new(active),
            exclude_anchor: false,
            exclude_active: false,
            attributes: Map::new(),
        })
    }

    /// True iff some primitive leaf of this tree holds a mark of `mark_type`
    pub fn includes_mark_of_type(&self, mark_type: MarkType) -> bool {
        match self {
            Target::Primitive(primitive) => primitive.mark.is(mark_type),
            Target::List(list) => list
                .elements
                .iter()
                .any(|element| element.includes_mark_of_type(mark_type)),
            Target::Range(range) => {
                range.anchor.includes_mark_of_type(mark_type)
                    || range.active.includes_mark_of_type(mark_type)
            }
        }
    }
}

/// True iff any of `targets` references a mark of `mark_type`
pub fn any_includes_mark_of_type(targets: &[Target], mark_type: MarkType) -> bool {
    targets
        .iter()
        .any(|target| target.includes_mark_of_type(mark_type))
}

/// Hat keys referenced by `target`, in traversal order (duplicates kept)
pub fn extract_target_keys(target: &Target) -> Vec<String> {
    match target {
        Target::Primitive(primitive) => primitive.mark.hat_key().into_iter().collect(),
        Target::List(list) => list.elements.iter().flat_map(extract_target_keys).collect(),
        Target::Range(range) => {
            let mut keys = extract_target_keys(&range.anchor);
            keys.extend(extract_target_keys(&range.active));
            keys
        }
    }
}

/// Unique hat keys referenced by `targets`, first occurrence wins
pub fn extract_keys(targets: &[Target]) -> Vec<String> {
    let mut keys = Vec::new();
    for key in targets.iter().flat_map(extract_target_keys) {
        if !keys.contains(&key) {
            keys.push(key);
        }
    }
    keys
}
