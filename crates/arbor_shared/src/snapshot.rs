//! # Snapshot Decoding
//!
//! An engine reports its state as a JSON value. This module turns that value
//! into a typed [`Snapshot`] without ever failing on a single bad record.
//!
//! ```text
//! Value ──► [record, record, ...] ──► DecodedRecord::Entity        ──► entities
//!   │                                  DecodedRecord::Unrecognized  ──► counted
//!   └─ {"k": record, ...}              DecodedRecord::Malformed     ──► counted
//! ```
//!
//! Both `[record, ...]` and `{"key": record, ...}` are accepted. Map keys are
//! ignored; each record's own `id` is authoritative.

use serde_json::{json, Map, Value};

use crate::constants::{BASE_FOOTPRINT, TRACKED_ENTITY_ID};
use crate::entity::{Entity, EntityId, ObjectInfo, TreeInfo};
use crate::error::{RecordError, SnapshotError};

/// Classification of one wire record.
#[derive(Clone, Debug, PartialEq)]
pub enum DecodedRecord {
    /// A recognized variant with a valid payload.
    Entity(Entity),
    /// A valid identity carrying a variant this view does not draw.
    Unrecognized {
        /// Identity of the record.
        id: EntityId,
        /// Wire tag of the variant.
        kind: String,
    },
    /// A record that could not be decoded at all.
    Malformed(RecordError),
}

impl DecodedRecord {
    /// Classifies a single record.
    #[must_use]
    pub fn decode(record: &Value) -> Self {
        match decode_record(record) {
            Ok(entity) => Self::Entity(entity),
            Err(Classified::Unrecognized { id, kind }) => Self::Unrecognized { id, kind },
            Err(Classified::Malformed(err)) => Self::Malformed(err),
        }
    }
}

/// Internal split between "skip quietly" and "skip and complain".
enum Classified {
    Unrecognized { id: EntityId, kind: String },
    Malformed(RecordError),
}

impl From<RecordError> for Classified {
    fn from(err: RecordError) -> Self {
        Self::Malformed(err)
    }
}

fn decode_record(record: &Value) -> Result<Entity, Classified> {
    let fields = record.as_object().ok_or(RecordError::NotAnObject)?;

    let raw_id = fields
        .get("id")
        .and_then(Value::as_u64)
        .and_then(|v| u32::try_from(v).ok())
        .ok_or(RecordError::InvalidId)?;
    let id = EntityId(raw_id);

    let (kind, payload) = match fields.get("object_info") {
        // Unit variants serialize as a bare string.
        Some(Value::String(tag)) => (tag.as_str(), None),
        Some(Value::Object(tagged)) if tagged.len() == 1 => match tagged.iter().next() {
            Some((tag, payload)) => (tag.as_str(), Some(payload)),
            None => return Err(RecordError::MissingObjectInfo { id: raw_id }.into()),
        },
        _ => return Err(RecordError::MissingObjectInfo { id: raw_id }.into()),
    };

    match kind {
        "Tree" => {
            let tree = decode_tree(raw_id, payload)?;
            Ok(Entity {
                id,
                object_info: ObjectInfo::Tree(tree),
            })
        }
        other => Err(Classified::Unrecognized {
            id,
            kind: other.to_owned(),
        }),
    }
}

fn decode_tree(id: u32, payload: Option<&Value>) -> Result<TreeInfo, RecordError> {
    let invalid = |reason: &str| RecordError::InvalidPayload {
        id,
        variant: "Tree",
        reason: reason.to_owned(),
    };

    let fields = payload
        .and_then(Value::as_object)
        .ok_or_else(|| invalid("payload is not an object"))?;

    let position = match fields.get("position") {
        Some(Value::Array(pair)) if pair.len() == 2 => {
            let x = pair[0].as_f64().ok_or_else(|| invalid("position.x is not a number"))?;
            let y = pair[1].as_f64().ok_or_else(|| invalid("position.y is not a number"))?;
            (x, y)
        }
        Some(_) => return Err(invalid("position is not a pair")),
        None => return Err(invalid("missing position")),
    };
    if !position.0.is_finite() || !position.1.is_finite() {
        return Err(invalid("position is not finite"));
    }

    let size = fields
        .get("size")
        .ok_or_else(|| invalid("missing size"))?
        .as_f64()
        .ok_or_else(|| invalid("size is not a number"))?;
    if !size.is_finite() || size <= 0.0 {
        return Err(invalid("size must be finite and positive"));
    }

    Ok(TreeInfo { position, size })
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// One point-in-time view of the engine's entities.
///
/// Order follows the report but carries no meaning; identity does.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Snapshot {
    entities: Vec<Entity>,
    unrecognized: usize,
    malformed: Vec<RecordError>,
}

impl Snapshot {
    /// Decodes a reported value.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::NotASequence`] if the value is neither an
    /// array nor an object of records. Individual bad records never fail.
    ///
    /// Object records are taken in document order (`preserve_order`), not
    /// sorted by key, so `"10"` reported after `"2"` stays after it.
    pub fn from_json(value: &Value) -> Result<Self, SnapshotError> {
        match value {
            Value::Array(records) => Ok(Self::collect(records.iter())),
            Value::Object(records) => Ok(Self::collect(records.values())),
            other => Err(SnapshotError::NotASequence(value_kind(other))),
        }
    }

    fn collect<'a>(records: impl Iterator<Item = &'a Value>) -> Self {
        let mut snapshot = Self::default();
        for record in records {
            match DecodedRecord::decode(record) {
                DecodedRecord::Entity(entity) => snapshot.entities.push(entity),
                DecodedRecord::Unrecognized { .. } => snapshot.unrecognized += 1,
                DecodedRecord::Malformed(err) => snapshot.malformed.push(err),
            }
        }
        snapshot
    }

    /// Builds a snapshot from already-typed entities.
    #[must_use]
    pub fn from_entities(entities: Vec<Entity>) -> Self {
        Self {
            entities,
            ..Self::default()
        }
    }

    /// The degenerate one-entity snapshot behind the `x()` / `y()` accessors.
    ///
    /// Sized at [`BASE_FOOTPRINT`] so it renders at scale 1.0.
    #[must_use]
    pub fn tracked(x: f64, y: f64) -> Self {
        Self::from_entities(vec![Entity {
            id: TRACKED_ENTITY_ID,
            object_info: ObjectInfo::Tree(TreeInfo::new(x, y, BASE_FOOTPRINT)),
        }])
    }

    /// Encodes the recognized entities back into the array wire form.
    #[must_use]
    pub fn to_json(&self) -> Value {
        Value::Array(self.entities.iter().map(entity_to_json).collect())
    }

    /// Recognized entities, in report order.
    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Iterates recognized entities.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    /// Number of recognized entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// True if no entity was recognized.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Records with a valid id but an unknown variant.
    #[must_use]
    pub fn unrecognized(&self) -> usize {
        self.unrecognized
    }

    /// Decode failures for records that were skipped.
    #[must_use]
    pub fn malformed(&self) -> &[RecordError] {
        &self.malformed
    }

    /// Consumes the snapshot, keeping only the recognized entities.
    #[must_use]
    pub fn into_entities(self) -> Vec<Entity> {
        self.entities
    }
}

fn entity_to_json(entity: &Entity) -> Value {
    let mut tagged = Map::new();
    match entity.object_info {
        ObjectInfo::Tree(tree) => {
            tagged.insert(
                "Tree".to_owned(),
                json!({ "position": [tree.position.0, tree.position.1], "size": tree.size }),
            );
        }
    }
    json!({ "id": entity.id.raw(), "object_info": Value::Object(tagged) })
}
