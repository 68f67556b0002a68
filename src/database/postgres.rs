use async_trait::async_trait;
use serde_json::Value;
use sqlx::{postgres::PgRow, PgPool, Row};
use std::marker::PhantomData;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::repository::{
    assign_id, ensure_reference, ensure_sortable, from_body, to_body, Document, Repository,
};
use crate::database::sort::SortOrder;

/// Collection stored as a PostgreSQL table of `(id TEXT, body JSONB)` rows.
pub struct PgDocumentRepository<T> {
    pool: PgPool,
    _phantom: PhantomData<T>,
}

impl<T: Document> PgDocumentRepository<T> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _phantom: PhantomData,
        }
    }

    fn table() -> String {
        DatabaseManager::quote_identifier(T::COLLECTION)
    }

    fn row_to_document(row: PgRow) -> Result<T, DatabaseError> {
        let id: String = row.try_get("id")?;
        let body: Value = row.try_get("body")?;
        from_body(id, body)
    }
}

/// `ORDER BY` clause for already-validated fields; `id` is a column, the rest live in the body.
fn order_clause(sort: &[SortOrder]) -> String {
    if sort.is_empty() {
        return String::new();
    }
    let parts: Vec<String> = sort
        .iter()
        .map(|o| {
            let column = if o.field == "id" {
                "id".to_string()
            } else {
                format!("body->>'{}'", o.field.replace('\'', "''"))
            };
            format!("{} {}", column, o.direction.to_sql())
        })
        .collect();
    format!(" ORDER BY {}", parts.join(", "))
}

#[async_trait]
impl<T: Document> Repository<T> for PgDocumentRepository<T> {
    async fn save(&self, entity: T) -> Result<T, DatabaseError> {
        let mut doc = entity;
        let id = assign_id(&mut doc);
        let body = to_body(&doc)?;

        let sql = format!(
            "INSERT INTO {} (id, body) VALUES ($1, $2) ON CONFLICT (id) DO UPDATE SET body = EXCLUDED.body",
            Self::table()
        );
        sqlx::query(&sql).bind(&id).bind(&body).execute(&self.pool).await?;
        Ok(doc)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<T>, DatabaseError> {
        let sql = format!("SELECT id, body FROM {} WHERE id = $1", Self::table());
        sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Self::row_to_document)
            .transpose()
    }

    async fn find_all_sorted(&self, sort: &[SortOrder]) -> Result<Vec<T>, DatabaseError> {
        ensure_sortable::<T>(sort)?;
        let sql = format!("SELECT id, body FROM {}{}", Self::table(), order_clause(sort));
        sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Self::row_to_document)
            .collect()
    }

    async fn find_all_by_reference(&self, field: &str, id: &str) -> Result<Vec<T>, DatabaseError> {
        ensure_reference::<T>(field)?;
        let sql = format!(
            "SELECT id, body FROM {} WHERE body->'{}'->>'id' = $1",
            Self::table(),
            field
        );
        sqlx::query(&sql)
            .bind(id)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Self::row_to_document)
            .collect()
    }

    async fn exists_by_id(&self, id: &str) -> Result<bool, DatabaseError> {
        let sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = $1)", Self::table());
        let row = sqlx::query(&sql).bind(id).fetch_one(&self.pool).await?;
        Ok(row.try_get::<bool, _>(0)?)
    }

    async fn delete_by_id(&self, id: &str) -> Result<(), DatabaseError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", Self::table());
        sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(())
    }

    async fn count(&self) -> Result<u64, DatabaseError> {
        let sql = format!("SELECT COUNT(*) FROM {}", Self::table());
        let row = sqlx::query(&sql).fetch_one(&self.pool).await?;
        let count: i64 = row.try_get(0)?;
        Ok(u64::try_from(count).unwrap_or(0))
    }
}
