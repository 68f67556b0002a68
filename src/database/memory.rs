use async_trait::async_trait;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::database::manager::DatabaseError;
use crate::database::repository::{assign_id, ensure_reference, ensure_sortable, Document, Repository};
use crate::database::sort::{SortDirection, SortOrder};

/// Process-local collection. Documents are kept by id, so unsorted reads come back in id order.
pub struct MemoryRepository<T> {
    documents: RwLock<BTreeMap<String, T>>,
}

impl<T: Document> MemoryRepository<T> {
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(BTreeMap::new()),
        }
    }
}

impl<T: Document> Default for MemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Document> Repository<T> for MemoryRepository<T> {
    async fn save(&self, entity: T) -> Result<T, DatabaseError> {
        let mut doc = entity;
        let id = assign_id(&mut doc);
        self.documents.write().await.insert(id, doc.clone());
        Ok(doc)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<T>, DatabaseError> {
        Ok(self.documents.read().await.get(id).cloned())
    }

    async fn find_all_sorted(&self, sort: &[SortOrder]) -> Result<Vec<T>, DatabaseError> {
        ensure_sortable::<T>(sort)?;
        let docs: Vec<T> = self.documents.read().await.values().cloned().collect();
        if sort.is_empty() {
            return Ok(docs);
        }
        sort_documents(docs, sort)
    }

    async fn find_all_by_reference(&self, field: &str, id: &str) -> Result<Vec<T>, DatabaseError> {
        ensure_reference::<T>(field)?;
        let documents = self.documents.read().await;
        let mut out = Vec::new();
        for doc in documents.values() {
            let value = serde_json::to_value(doc)?;
            if value.get(field).and_then(|r| r.get("id")).and_then(Value::as_str) == Some(id) {
                out.push(doc.clone());
            }
        }
        Ok(out)
    }

    async fn exists_by_id(&self, id: &str) -> Result<bool, DatabaseError> {
        Ok(self.documents.read().await.contains_key(id))
    }

    async fn delete_by_id(&self, id: &str) -> Result<(), DatabaseError> {
        self.documents.write().await.remove(id);
        Ok(())
    }

    async fn count(&self) -> Result<u64, DatabaseError> {
        Ok(self.documents.read().await.len() as u64)
    }
}

fn sort_documents<T: Document>(docs: Vec<T>, sort: &[SortOrder]) -> Result<Vec<T>, DatabaseError> {
    let mut keyed = docs
        .into_iter()
        .map(|doc| -> Result<_, DatabaseError> {
            let value = serde_json::to_value(&doc)?;
            let keys: Vec<Option<String>> = sort.iter().map(|o| field_text(&value, &o.field)).collect();
            Ok((keys, doc))
        })
        .collect::<Result<Vec<_>, _>>()?;

    keyed.sort_by(|(a, _), (b, _)| compare_keys(a, b, sort));
    Ok(keyed.into_iter().map(|(_, doc)| doc).collect())
}

fn field_text(value: &Value, field: &str) -> Option<String> {
    match value.get(field)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Missing values sort after present ones when ascending, matching PostgreSQL's NULLS LAST default.
fn compare_keys(a: &[Option<String>], b: &[Option<String>], sort: &[SortOrder]) -> Ordering {
    for ((x, y), order) in a.iter().zip(b).zip(sort) {
        let ord = match (x, y) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(x), Some(y)) => x.cmp(y),
        };
        let ord = match order.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::repository::tests::Note;
    use serde_json::json;

    fn titles(notes: &[Note]) -> Vec<&str> {
        notes.iter().map(|n| n.title.as_str()).collect()
    }

    #[tokio::test]
    async fn save_assigns_id_and_counts() {
        let repo = MemoryRepository::<Note>::new();
        let saved = repo.save(Note::titled("first")).await.unwrap();
        let id = saved.id.clone().expect("id assigned");

        assert_eq!(repo.count().await.unwrap(), 1);
        assert!(repo.exists_by_id(&id).await.unwrap());
        assert_eq!(repo.find_by_id(&id).await.unwrap(), Some(saved));
    }

    #[tokio::test]
    async fn save_with_id_replaces() {
        let repo = MemoryRepository::<Note>::new();
        let mut saved = repo.save(Note::titled("before")).await.unwrap();
        saved.title = "after".into();
        repo.save(saved.clone()).await.unwrap();

        assert_eq!(repo.count().await.unwrap(), 1);
        let id = saved.id.as_deref().unwrap();
        assert_eq!(repo.find_by_id(id).await.unwrap().unwrap().title, "after");
    }

    #[tokio::test]
    async fn delete_unknown_id_is_noop() {
        let repo = MemoryRepository::<Note>::new();
        repo.save(Note::titled("kept")).await.unwrap();
        repo.delete_by_id("missing").await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn sorts_by_requested_fields() {
        let repo = MemoryRepository::<Note>::new();
        for title in ["b", "c", "a"] {
            repo.save(Note::titled(title)).await.unwrap();
        }

        let asc = repo.find_all_sorted(&[SortOrder::asc("title")]).await.unwrap();
        assert_eq!(titles(&asc), vec!["a", "b", "c"]);

        let desc = repo.find_all_sorted(&[SortOrder::desc("title")]).await.unwrap();
        assert_eq!(titles(&desc), vec!["c", "b", "a"]);

        let err = repo.find_all_sorted(&[SortOrder::asc("nope")]).await.unwrap_err();
        assert!(matches!(err, DatabaseError::UnsupportedField { .. }));
    }

    #[tokio::test]
    async fn finds_by_reference() {
        let repo = MemoryRepository::<Note>::new();
        let mut mine = Note::titled("mine");
        mine.author = Some(json!({ "id": "u1" }));
        let mut theirs = Note::titled("theirs");
        theirs.author = Some(json!({ "id": "u2" }));
        repo.save(mine).await.unwrap();
        repo.save(theirs).await.unwrap();
        repo.save(Note::titled("orphan")).await.unwrap();

        let found = repo.find_all_by_reference("author", "u1").await.unwrap();
        assert_eq!(titles(&found), vec!["mine"]);
        assert!(repo.find_all_by_reference("title", "u1").await.is_err());
    }

    #[test]
    fn missing_values_sort_last_ascending() {
        let sort = [SortOrder::asc("title")];
        assert_eq!(compare_keys(&[None], &[Some("a".into())], &sort), Ordering::Greater);
        let sort = [SortOrder::desc("title")];
        assert_eq!(compare_keys(&[None], &[Some("a".into())], &sort), Ordering::Less);
    }
}
