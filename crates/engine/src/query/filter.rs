//! Relationship filter parsing.
//!
//! Callers hand the listing query a nested structure (a single segment,
//! or a list of segments plus an optional `relation` combinator). The
//! parser normalizes it into a typed [`RelationshipFilter`]; malformed
//! pieces are dropped silently so a stale filter degrades to "no
//! additional filtering" instead of breaking the base query.

use serde_json::Value;

use weft_core::EntryId;

/// Combinator across filter segments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Relation {
    #[default]
    And,
    Or,
}

impl Relation {
    /// Case-insensitive parse; anything that is not `OR` is `AND`.
    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("or") {
            Relation::Or
        } else {
            Relation::And
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            Relation::And => " AND ",
            Relation::Or => " OR ",
        }
    }
}

/// One relationship-membership predicate: entries related to
/// `related_to` under the named relationship.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub related_to: EntryId,
    pub name: String,
}

/// Typed relationship filter attached to an entry-listing query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationshipFilter {
    pub segments: Vec<Segment>,
    pub relation: Relation,
}

impl RelationshipFilter {
    pub fn new(segments: Vec<Segment>, relation: Relation) -> Self {
        Self { segments, relation }
    }

    /// Filter with a single segment.
    pub fn single(related_to: EntryId, name: impl Into<String>) -> Self {
        Self {
            segments: vec![Segment {
                related_to,
                name: name.into(),
            }],
            relation: Relation::And,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Normalize a caller-supplied nested structure.
    ///
    /// Accepted shapes: an object carrying `related_to`/`name` directly
    /// (hoisted into an implicit segment), an object or array holding
    /// segment objects, and a `relation` key anywhere at the top level.
    /// A segment missing either `related_to` or `name` is dropped.
    pub fn from_value(value: &Value) -> Self {
        let mut segments = Vec::new();
        let mut relation = Relation::And;

        match value {
            Value::Object(map) => {
                if let Some(r) = map.get("relation").and_then(Value::as_str) {
                    relation = Relation::parse(r);
                }
                // Top-level related_to/name hoist into an implicit segment.
                if let Some(seg) = segment_from(value) {
                    segments.push(seg);
                }
                for (key, nested) in map {
                    if key == "relation" {
                        continue;
                    }
                    if nested.is_object() {
                        if let Some(seg) = segment_from(nested) {
                            segments.push(seg);
                        }
                    }
                }
            }
            Value::Array(items) => {
                for item in items {
                    if let Some(r) = item
                        .as_object()
                        .and_then(|o| o.get("relation"))
                        .and_then(Value::as_str)
                    {
                        relation = Relation::parse(r);
                    }
                    if let Some(seg) = segment_from(item) {
                        segments.push(seg);
                    }
                }
            }
            _ => {}
        }

        Self { segments, relation }
    }
}

/// Extract a segment from a JSON object; None unless both keys are
/// present and well-formed.
fn segment_from(value: &Value) -> Option<Segment> {
    let obj = value.as_object()?;
    let related_to = parse_entry_id(obj.get("related_to")?)?;
    let name = obj.get("name")?.as_str()?;
    if name.is_empty() {
        return None;
    }
    Some(Segment {
        related_to,
        name: name.to_string(),
    })
}

/// Entry ids arrive as JSON numbers or numeric strings.
fn parse_entry_id(value: &Value) -> Option<EntryId> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}
