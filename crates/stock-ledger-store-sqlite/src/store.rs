// crates/stock-ledger-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Document Store
// Description: Durable DocumentStore backed by SQLite WAL.
// Purpose: Persist document bodies with restart-safe monotonic stamping.
// Dependencies: stock-ledger-core, rusqlite, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! This module implements a durable [`DocumentStore`] using `SQLite`. Each
//! document is one row holding a JSON body; queries scan the collection in
//! insertion order and apply the canonical [`QuerySpec`] semantics, so the
//! observable behavior matches the in-memory store exactly. The identifier
//! sequence and last issued stamp persist in a counters table, keeping
//! `created_at` monotonic across process restarts.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::mpsc;
use std::sync::mpsc::Sender;

use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::Transaction;
use rusqlite::params;
use serde::Deserialize;
use serde_json::Value;
use stock_ledger_core::ArrayAppend;
use stock_ledger_core::Clock;
use stock_ledger_core::Collection;
use stock_ledger_core::DocumentId;
use stock_ledger_core::DocumentStore;
use stock_ledger_core::FIELD_CREATED_AT;
use stock_ledger_core::FIELD_UPDATED_AT;
use stock_ledger_core::FieldMap;
use stock_ledger_core::QuerySpec;
use stock_ledger_core::StoreError;
use stock_ledger_core::StoredDocument;
use stock_ledger_core::Subscription;
use stock_ledger_core::SystemClock;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version for the store.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Counter row tracking the identifier sequence.
const COUNTER_NEXT_SEQ: &str = "next_seq";
/// Counter row tracking the last issued stamp.
const COUNTER_LAST_STAMP: &str = "last_stamp";
/// Maximum serialized document size accepted by the store.
pub const MAX_DOCUMENT_BYTES: usize = 1_048_576;

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteJournalMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteJournalMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` document store.
#[derive(Debug, Clone, Deserialize)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteJournalMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl SqliteStoreConfig {
    /// Creates a configuration with defaults for the given database path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteJournalMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` store errors.
#[derive(Debug, Error)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Store corruption or undecodable document body.
    #[error("sqlite store corruption: {0}")]
    Corrupt(String),
    /// Store schema version mismatch.
    #[error("sqlite store version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid store data or request.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
    /// Referenced document does not exist.
    #[error("sqlite store document not found: {0}")]
    NotFound(String),
    /// Store payload exceeded configured size limits.
    #[error("sqlite store document too large: {actual_bytes} bytes (max {max_bytes})")]
    TooLarge {
        /// Maximum allowed bytes.
        max_bytes: usize,
        /// Actual payload size in bytes.
        actual_bytes: usize,
    },
}

impl From<SqliteStoreError> for StoreError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Io(message) => Self::Io(message),
            SqliteStoreError::Db(message) => Self::Store(message),
            SqliteStoreError::Corrupt(message) | SqliteStoreError::VersionMismatch(message) => {
                Self::Corrupt(message)
            }
            SqliteStoreError::Invalid(message) => Self::Invalid(message),
            SqliteStoreError::NotFound(message) => Self::NotFound(message),
            SqliteStoreError::TooLarge {
                max_bytes,
                actual_bytes,
            } => Self::Invalid(format!(
                "document exceeds size limit: {actual_bytes} bytes (max {max_bytes})"
            )),
        }
    }
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// One live subscription registration.
struct Subscriber {
    /// Collection the subscription watches.
    collection: Collection,
    /// Query re-run after every mutation of the collection.
    query: QuerySpec,
    /// Channel delivering full result sets.
    sender: Sender<Vec<StoredDocument>>,
}

/// `SQLite`-backed document store with WAL support.
#[derive(Clone)]
pub struct SqliteDocumentStore {
    /// Shared `SQLite` connection guarded by a mutex.
    connection: Arc<Mutex<Connection>>,
    /// Time source used for document stamps.
    clock: Arc<dyn Clock>,
    /// Live subscriptions; disconnected receivers are pruned on notify.
    subscribers: Arc<Mutex<Vec<Subscriber>>>,
}

impl core::fmt::Debug for SqliteDocumentStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SqliteDocumentStore").finish_non_exhaustive()
    }
}

impl SqliteDocumentStore {
    /// Opens an `SQLite`-backed document store stamping from the system clock.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the database cannot be opened or
    /// initialized.
    pub fn new(config: SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        Self::with_clock(config, Arc::new(SystemClock::new()))
    }

    /// Opens an `SQLite`-backed document store with the given clock.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the database cannot be opened or
    /// initialized.
    pub fn with_clock(
        config: SqliteStoreConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, SqliteStoreError> {
        validate_store_path(&config.path)?;
        ensure_parent_dir(&config.path)?;
        let mut connection = open_connection(&config)?;
        initialize_schema(&mut connection)?;
        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
            clock,
            subscribers: Arc::new(Mutex::new(Vec::new())),
        })
    }

    /// Locks the connection.
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, SqliteStoreError> {
        self.connection
            .lock()
            .map_err(|_| SqliteStoreError::Db("connection mutex poisoned".to_string()))
    }

    /// Re-runs matching subscriptions for a collection and delivers fresh
    /// result sets. Disconnected receivers are dropped.
    fn notify(&self, collection: Collection) -> Result<(), SqliteStoreError> {
        let documents = {
            let guard = self.lock()?;
            scan_collection(&guard, collection)?
        };
        let mut subscribers = self
            .subscribers
            .lock()
            .map_err(|_| SqliteStoreError::Db("subscriber mutex poisoned".to_string()))?;
        subscribers.retain(|subscriber| {
            if subscriber.collection != collection {
                return true;
            }
            let results = subscriber.query.apply(documents.clone());
            subscriber.sender.send(results).is_ok()
        });
        drop(subscribers);
        Ok(())
    }

    /// Inserts a document within a transaction and returns its identifier.
    fn insert_document(
        &self,
        collection: Collection,
        fields: FieldMap,
    ) -> Result<DocumentId, SqliteStoreError> {
        let mut guard = self.lock()?;
        let tx = guard.transaction().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        let seq = bump_counter(&tx, COUNTER_NEXT_SEQ)?;
        let id = DocumentId::new(format!("doc-{seq:06}"));
        let stamp = next_stamp(&tx, self.clock.as_ref())?;
        let mut body = fields;
        body.insert(FIELD_CREATED_AT.to_string(), Value::from(stamp));
        body.insert(FIELD_UPDATED_AT.to_string(), Value::from(stamp));
        let encoded = encode_body(&body)?;
        tx.execute(
            "INSERT INTO documents (collection, doc_id, seq, body) VALUES (?1, ?2, ?3, ?4)",
            params![collection.as_str(), id.as_str(), seq, encoded],
        )
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        drop(guard);
        self.notify(collection)?;
        Ok(id)
    }

    /// Merges fields into a document and applies the optional array append.
    fn update_document(
        &self,
        collection: Collection,
        id: &DocumentId,
        fields: FieldMap,
        append: Option<ArrayAppend>,
    ) -> Result<(), SqliteStoreError> {
        let mut guard = self.lock()?;
        let tx = guard.transaction().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        let stamp = next_stamp(&tx, self.clock.as_ref())?;
        let existing: Option<Vec<u8>> = tx
            .query_row(
                "SELECT body FROM documents WHERE collection = ?1 AND doc_id = ?2",
                params![collection.as_str(), id.as_str()],
                |row| row.get(0),
            )
            .optional()
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        let Some(existing) = existing else {
            return Err(SqliteStoreError::NotFound(format!("{collection}/{id}")));
        };
        let mut body = decode_body(id, &existing)?;
        for (field, value) in fields {
            if value.is_null() {
                body.remove(&field);
            } else {
                body.insert(field, value);
            }
        }
        if let Some(instruction) = append {
            let slot = body
                .entry(instruction.field.clone())
                .or_insert_with(|| Value::Array(Vec::new()));
            let Value::Array(entries) = slot else {
                return Err(SqliteStoreError::Invalid(format!(
                    "field {} is not an array",
                    instruction.field
                )));
            };
            entries.extend(instruction.values);
        }
        body.insert(FIELD_UPDATED_AT.to_string(), Value::from(stamp));
        let encoded = encode_body(&body)?;
        tx.execute(
            "UPDATE documents SET body = ?3 WHERE collection = ?1 AND doc_id = ?2",
            params![collection.as_str(), id.as_str(), encoded],
        )
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        drop(guard);
        self.notify(collection)?;
        Ok(())
    }

    /// Deletes a document; absent documents are a no-op.
    fn delete_document(
        &self,
        collection: Collection,
        id: &DocumentId,
    ) -> Result<(), SqliteStoreError> {
        let removed = {
            let guard = self.lock()?;
            guard
                .execute(
                    "DELETE FROM documents WHERE collection = ?1 AND doc_id = ?2",
                    params![collection.as_str(), id.as_str()],
                )
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?
        };
        if removed > 0 {
            self.notify(collection)?;
        }
        Ok(())
    }

    /// Fetches a document by identifier.
    fn get_document(
        &self,
        collection: Collection,
        id: &DocumentId,
    ) -> Result<Option<StoredDocument>, SqliteStoreError> {
        let guard = self.lock()?;
        let body: Option<Vec<u8>> = guard
            .query_row(
                "SELECT body FROM documents WHERE collection = ?1 AND doc_id = ?2",
                params![collection.as_str(), id.as_str()],
                |row| row.get(0),
            )
            .optional()
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        drop(guard);
        match body {
            Some(bytes) => Ok(Some(StoredDocument {
                id: id.clone(),
                fields: decode_body(id, &bytes)?,
            })),
            None => Ok(None),
        }
    }

    /// Runs a query by scanning the collection in insertion order.
    fn query_documents(
        &self,
        collection: Collection,
        query: &QuerySpec,
    ) -> Result<Vec<StoredDocument>, SqliteStoreError> {
        let documents = {
            let guard = self.lock()?;
            scan_collection(&guard, collection)?
        };
        Ok(query.apply(documents))
    }

    /// Registers a subscription and delivers the current result set.
    fn subscribe_documents(
        &self,
        collection: Collection,
        query: QuerySpec,
    ) -> Result<Subscription, SqliteStoreError> {
        let documents = {
            let guard = self.lock()?;
            scan_collection(&guard, collection)?
        };
        let (sender, receiver) = mpsc::channel();
        sender
            .send(query.apply(documents))
            .map_err(|_| SqliteStoreError::Db("subscription receiver dropped".to_string()))?;
        self.subscribers
            .lock()
            .map_err(|_| SqliteStoreError::Db("subscriber mutex poisoned".to_string()))?
            .push(Subscriber {
                collection,
                query,
                sender,
            });
        Ok(receiver)
    }
}

impl DocumentStore for SqliteDocumentStore {
    fn insert(&self, collection: Collection, fields: FieldMap) -> Result<DocumentId, StoreError> {
        self.insert_document(collection, fields).map_err(StoreError::from)
    }

    fn update(
        &self,
        collection: Collection,
        id: &DocumentId,
        fields: FieldMap,
        append: Option<ArrayAppend>,
    ) -> Result<(), StoreError> {
        self.update_document(collection, id, fields, append).map_err(StoreError::from)
    }

    fn delete(&self, collection: Collection, id: &DocumentId) -> Result<(), StoreError> {
        self.delete_document(collection, id).map_err(StoreError::from)
    }

    fn get(
        &self,
        collection: Collection,
        id: &DocumentId,
    ) -> Result<Option<StoredDocument>, StoreError> {
        self.get_document(collection, id).map_err(StoreError::from)
    }

    fn query(
        &self,
        collection: Collection,
        query: &QuerySpec,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        self.query_documents(collection, query).map_err(StoreError::from)
    }

    fn subscribe(
        &self,
        collection: Collection,
        query: QuerySpec,
    ) -> Result<Subscription, StoreError> {
        self.subscribe_documents(collection, query).map_err(StoreError::from)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Ensures the parent directory for the store exists.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteStoreError::Io("store path missing parent directory".to_string()));
    };
    std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))
}

/// Validates store paths for safety limits.
fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
    let path_string = path.display().to_string();
    if path_string.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteStoreError::Invalid("store path exceeds length limit".to_string()));
    }
    for component in path.components() {
        let name = component.as_os_str().to_string_lossy();
        if name.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SqliteStoreError::Invalid(
                "store path contains an overlong component".to_string(),
            ));
        }
    }
    if path.exists() && path.is_dir() {
        return Err(SqliteStoreError::Invalid(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Opens an `SQLite` connection with secure defaults.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags)
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    apply_pragmas(&connection, config)?;
    Ok(connection)
}

/// Applies `SQLite` pragmas required for durability.
fn apply_pragmas(
    connection: &Connection,
    config: &SqliteStoreConfig,
) -> Result<(), SqliteStoreError> {
    connection
        .execute_batch("PRAGMA foreign_keys = ON;")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .busy_timeout(std::time::Duration::from_millis(config.busy_timeout_ms))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}

/// Initializes the `SQLite` schema or validates the existing version.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS counters (
                    name TEXT PRIMARY KEY,
                    value INTEGER NOT NULL
                );
                CREATE TABLE IF NOT EXISTS documents (
                    collection TEXT NOT NULL,
                    doc_id TEXT NOT NULL,
                    seq INTEGER NOT NULL,
                    body BLOB NOT NULL,
                    PRIMARY KEY (collection, doc_id)
                );
                CREATE INDEX IF NOT EXISTS idx_documents_collection_seq
                    ON documents (collection, seq);",
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            for counter in [COUNTER_NEXT_SEQ, COUNTER_LAST_STAMP] {
                tx.execute(
                    "INSERT INTO counters (name, value) VALUES (?1, 0)",
                    params![counter],
                )
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            }
        }
        Some(value) if value == SCHEMA_VERSION => {}
        Some(value) => {
            return Err(SqliteStoreError::VersionMismatch(format!(
                "unsupported schema version: {value}"
            )));
        }
    }
    tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}

/// Reads a counter value.
fn read_counter(tx: &Transaction<'_>, name: &str) -> Result<i64, SqliteStoreError> {
    tx.query_row("SELECT value FROM counters WHERE name = ?1", params![name], |row| row.get(0))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))
}

/// Writes a counter value.
fn write_counter(tx: &Transaction<'_>, name: &str, value: i64) -> Result<(), SqliteStoreError> {
    tx.execute("UPDATE counters SET value = ?2 WHERE name = ?1", params![name, value])
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}

/// Increments and returns the identifier sequence counter.
fn bump_counter(tx: &Transaction<'_>, name: &str) -> Result<i64, SqliteStoreError> {
    let next = read_counter(tx, name)?
        .checked_add(1)
        .ok_or_else(|| SqliteStoreError::Corrupt(format!("counter overflow: {name}")))?;
    write_counter(tx, name, next)?;
    Ok(next)
}

/// Issues the next stamp: wall-clock time, forced strictly forward so
/// `created_at` stays monotonic across restarts.
fn next_stamp(tx: &Transaction<'_>, clock: &dyn Clock) -> Result<i64, SqliteStoreError> {
    let now = clock.now().as_unix_millis();
    let last = read_counter(tx, COUNTER_LAST_STAMP)?;
    let stamp = if now > last { now } else { last + 1 };
    write_counter(tx, COUNTER_LAST_STAMP, stamp)?;
    Ok(stamp)
}

/// Serializes a document body, enforcing the size limit.
fn encode_body(body: &FieldMap) -> Result<Vec<u8>, SqliteStoreError> {
    let encoded = serde_json::to_vec(&Value::Object(body.clone()))
        .map_err(|err| SqliteStoreError::Invalid(err.to_string()))?;
    if encoded.len() > MAX_DOCUMENT_BYTES {
        return Err(SqliteStoreError::TooLarge {
            max_bytes: MAX_DOCUMENT_BYTES,
            actual_bytes: encoded.len(),
        });
    }
    Ok(encoded)
}

/// Deserializes a stored document body, failing closed on corruption.
fn decode_body(id: &DocumentId, bytes: &[u8]) -> Result<FieldMap, SqliteStoreError> {
    match serde_json::from_slice(bytes) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(_) => Err(SqliteStoreError::Corrupt(format!(
            "document {} body is not a JSON object",
            id.as_str()
        ))),
        Err(err) => Err(SqliteStoreError::Corrupt(format!("document {}: {err}", id.as_str()))),
    }
}

/// Scans a collection in insertion order.
fn scan_collection(
    connection: &Connection,
    collection: Collection,
) -> Result<Vec<StoredDocument>, SqliteStoreError> {
    let mut statement = connection
        .prepare("SELECT doc_id, body FROM documents WHERE collection = ?1 ORDER BY seq")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    let rows = statement
        .query_map(params![collection.as_str()], |row| {
            let id: String = row.get(0)?;
            let body: Vec<u8> = row.get(1)?;
            Ok((id, body))
        })
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    let mut documents = Vec::new();
    for row in rows {
        let (id, body) = row.map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        let id = DocumentId::new(id);
        let fields = decode_body(&id, &body)?;
        documents.push(StoredDocument { id, fields });
    }
    Ok(documents)
}
