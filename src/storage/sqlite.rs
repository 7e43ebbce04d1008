use crate::config::StoreConfig;
use crate::model::{PriceDocument, StoreError};
use crate::storage::DocumentStore;
use rusqlite::{Connection, OptionalExtension, params};
use serde_json::Value;
use tracing::debug;

const SEED_URLS_FIELD: &str = "product_urls";

/// Document store kept in SQLite: each document is a JSON blob keyed by its id.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens the database, creates the collections and checks the connection is alive.
    pub fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        let conn = Connection::open(&config.url)?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS price_details (
                product_name TEXT PRIMARY KEY,
                document TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS seed_documents (
                id TEXT PRIMARY KEY,
                document TEXT NOT NULL
            );
            ",
        )?;

        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        debug!("Connected to store {}", config.url);

        Ok(Self { conn })
    }

    /// Reads `product_urls` from the seed document `seed_id`.
    pub fn load_seed_urls(&self, seed_id: &str) -> Result<Vec<String>, StoreError> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT document FROM seed_documents WHERE id = ?1",
                params![seed_id],
                |row| row.get(0),
            )
            .optional()?;
        let raw = raw.ok_or_else(|| StoreError::SeedNotFound(seed_id.to_string()))?;

        let document: Value = serde_json::from_str(&raw)?;
        let missing = || StoreError::MissingField(SEED_URLS_FIELD.into());
        document
            .get(SEED_URLS_FIELD)
            .and_then(Value::as_array)
            .ok_or_else(missing)?
            .iter()
            .map(|url| url.as_str().map(str::to_string).ok_or_else(missing))
            .collect()
    }

    pub fn close(self) -> Result<(), StoreError> {
        self.conn.close().map_err(|(_, e)| e.into())
    }
}

impl DocumentStore for SqliteStore {
    fn exists(&self, product_name: &str) -> Result<bool, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT 1 FROM price_details WHERE product_name = ?1")?;
        let mut rows = stmt.query(params![product_name])?;
        Ok(rows.next()?.is_some())
    }

    fn fetch(&self, product_name: &str) -> Result<Option<PriceDocument>, StoreError> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT document FROM price_details WHERE product_name = ?1",
                params![product_name],
                |row| row.get(0),
            )
            .optional()?;

        match raw {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    fn insert(&self, doc: &PriceDocument) -> Result<bool, StoreError> {
        let written = self.conn.execute(
            "INSERT INTO price_details (product_name, document) VALUES (?1, ?2)",
            params![&doc.product_name, serde_json::to_string(doc)?],
        )?;
        Ok(written == 1)
    }

    fn replace(&self, product_name: &str, doc: &PriceDocument) -> Result<bool, StoreError> {
        let matched = self.conn.execute(
            "UPDATE price_details SET product_name = ?1, document = ?2 WHERE product_name = ?3",
            params![&doc.product_name, serde_json::to_string(doc)?, product_name],
        )?;
        Ok(matched == 1)
    }
}

#[cfg(test)]
impl SqliteStore {
    pub fn in_memory() -> Self {
        Self::connect(&StoreConfig {
            url: ":memory:".into(),
        })
        .unwrap()
    }

    pub fn put_seed_document(&self, seed_id: &str, document: &Value) {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO seed_documents (id, document) VALUES (?1, ?2)",
                params![seed_id, document.to_string()],
            )
            .unwrap();
    }

    pub fn all_documents(&self) -> Vec<PriceDocument> {
        let mut stmt = self
            .conn
            .prepare("SELECT document FROM price_details ORDER BY product_name")
            .unwrap();
        stmt.query_map([], |row| row.get::<_, String>(0))
            .unwrap()
            .map(|raw| serde_json::from_str(&raw.unwrap()).unwrap())
            .collect()
    }
}
