use crate::common::error::{Result, ScraperError};
use crate::domain::{NewPosting, Posting, PostingFilter, Site};
use crate::storage::PostingStore;
use async_trait::async_trait;
use chrono::NaiveDate;
use rusqlite::types::{Type, Value};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

const DATE_FORMAT: &str = "%Y-%m-%d";

const POSTING_COLUMNS: &str =
    "id, site_id, page_url, title, summary, creation_date, active, email";

/// SQLite-backed store. Dates are ISO-8601 text so range filters compare lexically.
pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

impl SqliteStorage {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        info!("Opened posting database at {}", path.display());
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            r#"
            PRAGMA foreign_keys=ON;
            CREATE TABLE IF NOT EXISTS sites (
                id      INTEGER PRIMARY KEY AUTOINCREMENT,
                domain  TEXT NOT NULL UNIQUE
            );
            CREATE TABLE IF NOT EXISTS postings (
                id             INTEGER PRIMARY KEY AUTOINCREMENT,
                site_id        INTEGER NOT NULL REFERENCES sites(id) ON DELETE CASCADE,
                page_url       TEXT NOT NULL UNIQUE,
                title          TEXT NOT NULL,
                summary        TEXT NOT NULL,
                creation_date  TEXT NOT NULL,
                active         INTEGER NOT NULL DEFAULT 0,
                email          TEXT
            );
            CREATE INDEX IF NOT EXISTS postings_creation_date ON postings(creation_date);
            "#,
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| ScraperError::storage("sqlite connection lock poisoned"))
    }
}

fn posting_from_row(row: &Row<'_>) -> rusqlite::Result<Posting> {
    let date: String = row.get(5)?;
    let creation_date = NaiveDate::parse_from_str(&date, DATE_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(e)))?;
    Ok(Posting {
        id: row.get(0)?,
        site_id: row.get(1)?,
        page_url: row.get(2)?,
        title: row.get(3)?,
        summary: row.get(4)?,
        creation_date,
        active: row.get(6)?,
        email: row.get(7)?,
    })
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

#[async_trait]
impl PostingStore for SqliteStorage {
    async fn add_site(&self, domain: &str) -> Result<Site> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT OR IGNORE INTO sites (domain) VALUES (?1)",
            params![domain],
        )?;
        let id: i64 = conn.query_row(
            "SELECT id FROM sites WHERE domain = ?1",
            params![domain],
            |row| row.get(0),
        )?;
        debug!("Site {} has id {}", domain, id);
        Ok(Site {
            id,
            domain: domain.to_string(),
        })
    }

    async fn list_sites(&self) -> Result<Vec<Site>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT id, domain FROM sites ORDER BY id")?;
        let sites = stmt
            .query_map([], |row| {
                Ok(Site {
                    id: row.get(0)?,
                    domain: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(sites)
    }

    async fn remove_site(&self, site_id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let removed = conn.execute("DELETE FROM sites WHERE id = ?1", params![site_id])?;
        Ok(removed > 0)
    }

    async fn find_posting_by_url(&self, page_url: &str) -> Result<Option<Posting>> {
        let conn = self.conn()?;
        let sql = format!("SELECT {POSTING_COLUMNS} FROM postings WHERE page_url = ?1");
        let posting = conn
            .query_row(&sql, params![page_url], posting_from_row)
            .optional()?;
        Ok(posting)
    }

    async fn get_postings(&self, ids: &[i64]) -> Result<Vec<Posting>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {POSTING_COLUMNS} FROM postings WHERE id IN ({}) ORDER BY id",
            placeholders(ids.len())
        );
        let mut stmt = conn.prepare(&sql)?;
        let postings = stmt
            .query_map(params_from_iter(ids.iter()), posting_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(postings)
    }

    async fn query_postings(&self, filter: &PostingFilter) -> Result<Vec<Posting>> {
        let mut clauses: Vec<&str> = Vec::new();
        let mut values: Vec<Value> = Vec::new();
        if let Some(active) = filter.active {
            clauses.push("active = ?");
            values.push(Value::Integer(active as i64));
        }
        if let Some(site_id) = filter.site_id {
            clauses.push("site_id = ?");
            values.push(Value::Integer(site_id));
        }
        if let Some(since) = filter.created_since {
            clauses.push("creation_date >= ?");
            values.push(Value::Text(format_date(since)));
        }
        let where_sql = if clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", clauses.join(" AND "))
        };

        let conn = self.conn()?;
        let sql = format!("SELECT {POSTING_COLUMNS} FROM postings{where_sql} ORDER BY id");
        let mut stmt = conn.prepare(&sql)?;
        let postings = stmt
            .query_map(params_from_iter(values), posting_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        // Title search runs here rather than as LIKE, which treats % and _ as
        // wildcards and only folds ASCII case
        Ok(postings
            .into_iter()
            .filter(|p| filter.matches_title(&p.title))
            .collect())
    }

    async fn get_or_create_posting(
        &self,
        new: NewPosting,
        created_on: NaiveDate,
    ) -> Result<(Posting, bool)> {
        let conn = self.conn()?;
        // The UNIQUE constraint turns a racing duplicate into a lookup
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO postings (site_id, page_url, title, summary, creation_date, active, email)
             VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6)",
            params![
                new.site_id,
                new.page_url,
                new.title,
                new.summary,
                format_date(created_on),
                new.email
            ],
        )?;
        let sql = format!("SELECT {POSTING_COLUMNS} FROM postings WHERE page_url = ?1");
        let posting = conn.query_row(&sql, params![new.page_url], posting_from_row)?;
        Ok((posting, inserted > 0))
    }

    async fn count_created_between(&self, start: NaiveDate, end: NaiveDate) -> Result<u64> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM postings WHERE creation_date BETWEEN ?1 AND ?2",
            params![format_date(start), format_date(end)],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    async fn delete_created_between(&self, start: NaiveDate, end: NaiveDate) -> Result<u64> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM postings WHERE creation_date BETWEEN ?1 AND ?2",
            params![format_date(start), format_date(end)],
        )?;
        Ok(deleted as u64)
    }

    async fn set_active(&self, ids: &[i64], active: bool) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let conn = self.conn()?;
        let sql = format!(
            "UPDATE postings SET active = ? WHERE id IN ({})",
            placeholders(ids.len())
        );
        let mut values: Vec<Value> = vec![Value::Integer(active as i64)];
        values.extend(ids.iter().map(|id| Value::Integer(*id)));
        let updated = conn.execute(&sql, params_from_iter(values))?;
        Ok(updated as u64)
    }
}
