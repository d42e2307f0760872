//! SQLite-backed document store

use rusqlite::types::Value as SqlValue;
use rusqlite::{params, OptionalExtension};
use serde_json::Value;

use super::{set_path, DocumentStore, FieldUpdate, Filter, StoreError, StoreResult};
use crate::db::Database;

/// Documents stored as JSON text in the `documents` table
#[derive(Clone)]
pub struct SqliteDocumentStore {
    database: Database,
}

impl SqliteDocumentStore {
    pub fn new(database: Database) -> Self {
        Self { database }
    }
}

/// JSON path for `json_extract`, with every key quoted
fn json_path(field: &str) -> String {
    let mut path = String::from("$");
    for segment in field.split('.') {
        path.push_str(".\"");
        path.push_str(&segment.replace('"', "\\\""));
        path.push('"');
    }
    path
}

/// Map a JSON scalar onto what `json_extract` yields for it
fn sql_value(value: &Value) -> Option<SqlValue> {
    match value {
        Value::Null => None,
        Value::Bool(b) => Some(SqlValue::Integer(i64::from(*b))),
        Value::Number(n) => Some(match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => SqlValue::Real(n.as_f64().unwrap_or_default()),
        }),
        Value::String(s) => Some(SqlValue::Text(s.clone())),
        other => Some(SqlValue::Text(other.to_string())),
    }
}

fn parse_document(data: String) -> StoreResult<Value> {
    Ok(serde_json::from_str(&data)?)
}

impl DocumentStore for SqliteDocumentStore {
    fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Value>> {
        self.database.with_conn(|conn| {
            let data: Option<String> = conn
                .query_row(
                    "SELECT data FROM documents WHERE collection = ?1 AND id = ?2",
                    params![collection, id],
                    |row| row.get(0),
                )
                .optional()?;

            data.map(parse_document).transpose()
        })
    }

    fn query(&self, collection: &str, filters: &[Filter], limit: Option<usize>) -> StoreResult<Vec<Value>> {
        let mut clauses = vec!["collection = ?1".to_string()];
        let mut params_vec: Vec<SqlValue> = vec![SqlValue::Text(collection.to_string())];

        for filter in filters {
            params_vec.push(SqlValue::Text(json_path(&filter.field)));
            let path_idx = params_vec.len();
            match sql_value(&filter.value) {
                Some(value) => {
                    params_vec.push(value);
                    clauses.push(format!(
                        "json_extract(data, ?{}) = ?{}",
                        path_idx,
                        params_vec.len()
                    ));
                }
                None => clauses.push(format!("json_extract(data, ?{}) IS NULL", path_idx)),
            }
        }

        let mut sql = format!(
            "SELECT data FROM documents WHERE {} ORDER BY seq ASC",
            clauses.join(" AND ")
        );
        if let Some(limit) = limit {
            params_vec.push(SqlValue::Integer(i64::try_from(limit).unwrap_or(i64::MAX)));
            sql.push_str(&format!(" LIMIT ?{}", params_vec.len()));
        }

        self.database.with_conn(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(rusqlite::params_from_iter(params_vec.iter()), |row| {
                    row.get::<_, String>(0)
                })?
                .collect::<Result<Vec<_>, _>>()?;

            rows.into_iter().map(parse_document).collect()
        })
    }

    fn set(&self, collection: &str, id: &str, document: &Value) -> StoreResult<()> {
        let data = serde_json::to_string(document)?;
        self.database.with_conn(|conn| {
            conn.execute(
                r#"
                INSERT INTO documents (collection, id, data)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(collection, id) DO UPDATE SET
                    data = excluded.data,
                    updated_at = datetime('now')
                "#,
                params![collection, id, data],
            )?;
            Ok(())
        })
    }

    fn update(&self, collection: &str, id: &str, fields: &[FieldUpdate]) -> StoreResult<()> {
        self.database.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let data: Option<String> = tx
                .query_row(
                    "SELECT data FROM documents WHERE collection = ?1 AND id = ?2",
                    params![collection, id],
                    |row| row.get(0),
                )
                .optional()?;

            let Some(data) = data else {
                return Err(StoreError::NotFound {
                    collection: collection.to_string(),
                    id: id.to_string(),
                });
            };

            let mut document = parse_document(data)?;
            for field in fields {
                set_path(&mut document, &field.path, field.value.clone());
            }

            tx.execute(
                "UPDATE documents SET data = ?1, updated_at = datetime('now')
                 WHERE collection = ?2 AND id = ?3",
                params![serde_json::to_string(&document)?, collection, id],
            )?;
            tx.commit()?;

            tracing::debug!(collection, id, fields = fields.len(), "document updated");
            Ok(())
        })
    }

    fn delete(&self, collection: &str, id: &str) -> StoreResult<bool> {
        self.database.with_conn(|conn| {
            let rows = conn.execute(
                "DELETE FROM documents WHERE collection = ?1 AND id = ?2",
                params![collection, id],
            )?;
            Ok(rows > 0)
        })
    }
}
