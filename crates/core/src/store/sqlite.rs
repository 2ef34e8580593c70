//! SQLite-backed document store.

use std::path::Path;

use chrono::{DateTime, Datelike, SecondsFormat, Utc};
use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, OptionalExtension, params, params_from_iter};
use serde_json::Value;

use super::migrations::init_schema;
use super::types::{Document, DocumentId, DocumentQuery, Order};
use super::{DocumentStore, StoreError};

/// Document store keeping every collection in a single `documents` table.
///
/// Bodies are stored as JSON text and filtered with `json_extract`.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open or create a store database at the given path.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )?;
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Create an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Get the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn where_clause(collection: &str, query: &DocumentQuery) -> (String, Vec<SqlValue>) {
        let mut sql = String::from(" WHERE collection = ?");
        let mut args = vec![SqlValue::Text(collection.to_string())];

        for (field, value) in &query.filters {
            let path = format!("$.{}", field);
            match scalar_to_sql(value) {
                None => {
                    sql.push_str(" AND json_extract(body, ?) IS NULL");
                    args.push(SqlValue::Text(path));
                }
                // JSON type must match too: SQLite treats `true` as 1 and 1 as 1.0.
                Some((json_type, compare)) => {
                    sql.push_str(" AND json_type(body, ?) = ?");
                    args.push(SqlValue::Text(path.clone()));
                    args.push(SqlValue::Text(json_type.to_string()));
                    if let Some(v) = compare {
                        sql.push_str(" AND json_extract(body, ?) = ?");
                        args.push(SqlValue::Text(path));
                        args.push(v);
                    }
                }
            }
        }

        // Stored timestamps are always within years 0000-9999.
        if let Some(cutoff) = query.created_before {
            match format_ts(cutoff) {
                Ok(ts) => {
                    sql.push_str(" AND created_at < ?");
                    args.push(SqlValue::Text(ts));
                }
                Err(_) if cutoff.year() < 0 => sql.push_str(" AND 0"),
                Err(_) => sql.push_str(" AND created_at IS NOT NULL"),
            }
        }

        (sql, args)
    }
}

impl DocumentStore for SqliteStore {
    fn save(&self, collection: &str, doc: &mut Document) -> Result<(), StoreError> {
        let body = serde_json::to_string(&doc.fields)?;
        let created = doc.created_at.map(format_ts).transpose()?;
        let updated = doc.updated_at.map(format_ts).transpose()?;

        match &doc.id {
            None => {
                let id = DocumentId::generate();
                self.conn.execute(
                    "INSERT INTO documents (collection, id, kind, body, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![collection, id.as_str(), doc.kind, body, created, updated],
                )?;
                doc.id = Some(id);
            }
            Some(id) => {
                let rows = self.conn.execute(
                    "UPDATE documents SET kind = ?1, body = ?2, created_at = ?3, updated_at = ?4
                     WHERE collection = ?5 AND id = ?6",
                    params![doc.kind, body, created, updated, collection, id.as_str()],
                )?;
                if rows == 0 {
                    return Err(StoreError::NotFound {
                        collection: collection.to_string(),
                        id: id.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    fn find_by_id(
        &self,
        collection: &str,
        id: &DocumentId,
    ) -> Result<Option<Document>, StoreError> {
        self.conn
            .query_row(
                "SELECT id, kind, body, created_at, updated_at
                 FROM documents WHERE collection = ?1 AND id = ?2",
                params![collection, id.as_str()],
                RawRow::from_row,
            )
            .optional()?
            .map(RawRow::into_document)
            .transpose()
    }

    fn find(
        &self,
        collection: &str,
        query: &DocumentQuery,
    ) -> Result<Vec<Document>, StoreError> {
        query.validate()?;
        let (where_sql, mut args) = Self::where_clause(collection, query);

        let direction = match query.order {
            Order::Oldest => "ASC",
            Order::Newest => "DESC",
        };
        let mut sql = format!(
            "SELECT id, kind, body, created_at, updated_at FROM documents{}
             ORDER BY created_at {dir}, seq {dir}",
            where_sql,
            dir = direction
        );
        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            args.push(SqlValue::Integer(i64::try_from(limit).unwrap_or(i64::MAX)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(args.iter()), RawRow::from_row)?;

        rows.map(|row| row.map_err(StoreError::from).and_then(RawRow::into_document))
            .collect()
    }

    fn delete(&self, collection: &str, query: &DocumentQuery) -> Result<usize, StoreError> {
        query.validate()?;
        let (where_sql, args) = Self::where_clause(collection, query);

        let rows = self.conn.execute(
            &format!("DELETE FROM documents{}", where_sql),
            params_from_iter(args.iter()),
        )?;
        Ok(rows)
    }

    fn count(&self, collection: &str, query: &DocumentQuery) -> Result<usize, StoreError> {
        query.validate()?;
        let (where_sql, args) = Self::where_clause(collection, query);

        let n: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM documents{}", where_sql),
            params_from_iter(args.iter()),
            |row| row.get(0),
        )?;
        Ok(n as usize)
    }
}

/// Columns of a `documents` row before JSON and timestamp decoding.
struct RawRow {
    id: String,
    kind: String,
    body: String,
    created_at: Option<String>,
    updated_at: Option<String>,
}

impl RawRow {
    fn from_row(row: &rusqlite::Row) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get(0)?,
            kind: row.get(1)?,
            body: row.get(2)?,
            created_at: row.get(3)?,
            updated_at: row.get(4)?,
        })
    }

    fn into_document(self) -> Result<Document, StoreError> {
        let fields = match serde_json::from_str::<Value>(&self.body)? {
            Value::Object(map) => map,
            other => {
                return Err(StoreError::InvalidData(format!(
                    "document {} body is not an object: {}",
                    self.id, other
                )));
            }
        };

        Ok(Document {
            id: Some(DocumentId::from(self.id)),
            kind: self.kind,
            fields,
            created_at: self.created_at.as_deref().map(parse_ts).transpose()?,
            updated_at: self.updated_at.as_deref().map(parse_ts).transpose()?,
        })
    }
}

/// Fixed-width RFC 3339 so that text ordering matches time ordering.
fn format_ts(ts: DateTime<Utc>) -> Result<String, StoreError> {
    if !(0..=9999).contains(&ts.year()) {
        return Err(StoreError::InvalidData(format!("timestamp {} is outside years 0000-9999", ts)));
    }
    Ok(ts.to_rfc3339_opts(SecondsFormat::Nanos, true))
}

fn parse_ts(s: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(s)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| StoreError::InvalidData(format!("bad timestamp '{}': {}", s, e)))
}

/// JSON type name as reported by `json_type()`, plus the value to compare
/// with `json_extract()` when the type alone does not decide equality.
/// `None` for `null`.
fn scalar_to_sql(value: &Value) -> Option<(&'static str, Option<SqlValue>)> {
    match value {
        Value::Null => None,
        Value::Bool(true) => Some(("true", None)),
        Value::Bool(false) => Some(("false", None)),
        Value::Number(n) if n.is_f64() => {
            Some(("real", Some(SqlValue::Real(n.as_f64().unwrap_or(f64::NAN)))))
        }
        Value::Number(n) => Some((
            "integer",
            Some(match n.as_i64() {
                Some(i) => SqlValue::Integer(i),
                None => SqlValue::Real(n.as_f64().unwrap_or(f64::NAN)),
            }),
        )),
        Value::String(s) => Some(("text", Some(SqlValue::Text(s.clone())))),
        Value::Array(_) => Some(("array", Some(SqlValue::Text(value.to_string())))),
        Value::Object(_) => Some(("object", Some(SqlValue::Text(value.to_string())))),
    }
}
