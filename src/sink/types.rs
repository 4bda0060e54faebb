use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

pub type Document = Map<String, JsonValue>;

/// How the destination store persists a transform's output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SinkOptions {
    pub collection_name: &'static str,
    /// Documents are keyed upserts rather than appended rows.
    pub entity_mode: bool,
}

/// Store operation returned by transforms.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SinkOperation {
    /// Entity-mode upsert: `entity` identifies the document, `update` is applied in place.
    Upsert {
        entity: Document,
        update: Vec<UpdateStep>,
    },
    /// Append-mode row.
    Insert(Document),
}

/// One `$set` step of an entity-mode update.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateStep {
    #[serde(rename = "$set")]
    pub set: Document,
}

impl SinkOperation {
    /// Build an append-mode insert from any serializable record.
    pub fn insert<T: Serialize>(record: &T) -> Result<Self, serde_json::Error> {
        Ok(Self::Insert(to_document(record)?))
    }

    /// Build an entity-mode upsert setting every field of `fields`.
    pub fn upsert<K: Serialize, T: Serialize>(
        entity: &K,
        fields: &T,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self::Upsert {
            entity: to_document(entity)?,
            update: vec![UpdateStep {
                set: to_document(fields)?,
            }],
        })
    }

    /// The document written by this operation (the `$set` fields for upserts).
    pub fn document(&self) -> Option<&Document> {
        match self {
            SinkOperation::Insert(doc) => Some(doc),
            SinkOperation::Upsert { update, .. } => update.first().map(|step| &step.set),
        }
    }
}

fn to_document<T: Serialize>(value: &T) -> Result<Document, serde_json::Error> {
    match serde_json::to_value(value)? {
        JsonValue::Object(map) => Ok(map),
        other => Err(serde::ser::Error::custom(format!(
            "expected a JSON object, got {}",
            other
        ))),
    }
}
