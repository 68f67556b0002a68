use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::sort::SortOrder;

/// A record stored in a collection, keyed by an opaque string id.
///
/// The id lives outside the stored body: implementations persist everything
/// else the type serializes and put the id back when reading.
pub trait Document: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Collection (table) name
    const COLLECTION: &'static str;

    /// Fields accepted by `find_all_sorted`
    const SORTABLE: &'static [&'static str];

    /// Fields holding `{ "id": ... }` references to other documents
    const REFERENCES: &'static [&'static str] = &[];

    fn id(&self) -> Option<&str>;

    fn set_id(&mut self, id: String);
}

/// Storage port shared by every collection.
#[async_trait]
pub trait Repository<T: Document>: Send + Sync {
    /// Insert when the id is unset (assigning a fresh one), otherwise replace.
    async fn save(&self, entity: T) -> Result<T, DatabaseError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<T>, DatabaseError>;

    /// Every document, in storage order.
    async fn find_all(&self) -> Result<Vec<T>, DatabaseError> {
        self.find_all_sorted(&[]).await
    }

    async fn find_all_sorted(&self, sort: &[SortOrder]) -> Result<Vec<T>, DatabaseError>;

    /// Documents whose reference `field` points at `id`.
    async fn find_all_by_reference(&self, field: &str, id: &str) -> Result<Vec<T>, DatabaseError>;

    async fn exists_by_id(&self, id: &str) -> Result<bool, DatabaseError>;

    /// Removing an unknown id is a no-op.
    async fn delete_by_id(&self, id: &str) -> Result<(), DatabaseError>;

    async fn count(&self) -> Result<u64, DatabaseError>;
}

pub(crate) fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Take the document's id, assigning a new one first if it has none.
pub(crate) fn assign_id<T: Document>(doc: &mut T) -> String {
    match doc.id() {
        Some(id) => id.to_string(),
        None => {
            let id = new_id();
            doc.set_id(id.clone());
            id
        }
    }
}

/// Serialized document without its id.
pub(crate) fn to_body<T: Document>(doc: &T) -> Result<Value, DatabaseError> {
    let mut body = serde_json::to_value(doc)?;
    if let Value::Object(map) = &mut body {
        map.remove("id");
    }
    Ok(body)
}

pub(crate) fn from_body<T: Document>(id: String, body: Value) -> Result<T, DatabaseError> {
    let mut map = match body {
        Value::Object(map) => map,
        other => {
            return Err(DatabaseError::CorruptDocument {
                collection: T::COLLECTION,
                id,
                message: format!("expected object, found {}", other),
            })
        }
    };
    map.insert("id".to_string(), Value::String(id));
    Ok(serde_json::from_value(Value::Object(map))?)
}

pub(crate) fn ensure_sortable<T: Document>(sort: &[SortOrder]) -> Result<(), DatabaseError> {
    match sort.iter().find(|order| !T::SORTABLE.contains(&order.field.as_str())) {
        Some(order) => Err(DatabaseError::UnsupportedField {
            collection: T::COLLECTION,
            field: order.field.clone(),
        }),
        None => Ok(()),
    }
}

pub(crate) fn ensure_reference<T: Document>(field: &str) -> Result<(), DatabaseError> {
    if T::REFERENCES.contains(&field) {
        Ok(())
    } else {
        Err(DatabaseError::UnsupportedField {
            collection: T::COLLECTION,
            field: field.to_string(),
        })
    }
}
