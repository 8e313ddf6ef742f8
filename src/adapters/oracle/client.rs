//! Oracle session handling
//!
//! The `oracle` crate is synchronous, so every call runs on the blocking
//! thread pool against a single session guarded by a mutex.

use crate::config::DatabaseConfig;
use crate::core::retrieve::RenderingOptions;
use crate::domain::{Result, TrackerError};
use oracle::Connection;
use secrecy::ExposeSecret;
use std::sync::{Arc, Mutex};

const SQL_SCHEMA_EXISTS: &str = "SELECT COUNT(*) FROM all_users WHERE username = :1";

const SQL_LIST_OBJECTS: &str =
    "SELECT object_name, generated FROM all_objects WHERE owner = :1 AND object_type = :2";

const SQL_GET_DDL: &str =
    "SELECT dbms_metadata.get_ddl(object_type => :1, name => :2, schema => :3) FROM dual";

/// Error codes that mean the session is gone rather than a statement failed
const LOST_SESSION_CODES: [&str; 6] = [
    "ORA-03113",
    "ORA-03114",
    "ORA-03135",
    "ORA-01012",
    "ORA-02396",
    "DPI-1080",
];

/// A single Oracle session
pub struct OracleClient {
    conn: Arc<Mutex<Connection>>,
    connect_string: String,
}

impl OracleClient {
    /// Open a session using the configured credentials
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::Configuration` if a connection setting is
    /// missing and `TrackerError::Connection` if the login fails.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        config
            .validate_connection()
            .map_err(TrackerError::Configuration)?;

        let username = config.username.clone().unwrap_or_default();
        let password = config
            .password
            .as_ref()
            .map(|p| p.expose_secret().as_ref().to_string())
            .unwrap_or_default();
        let connect_string = config.connect_string();
        let client_lib_dir = config.client_lib_dir.clone();

        tracing::info!(connect_string = %connect_string, username = %username, "Connecting to database");

        let target = connect_string.clone();
        let conn = tokio::task::spawn_blocking(move || -> Result<Connection> {
            if let Some(dir) = client_lib_dir.filter(|d| !d.trim().is_empty()) {
                init_client_library(&dir)?;
            }
            Connection::connect(&username, &password, &target)
                .map_err(|e| TrackerError::Connection(e.to_string()))
        })
        .await
        .map_err(|e| TrackerError::Other(format!("Connect task failed: {e}")))??;

        tracing::info!(connect_string = %connect_string, "Database session established");

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            connect_string,
        })
    }

    /// EZConnect string this session was opened with
    pub fn connect_string(&self) -> &str {
        &self.connect_string
    }

    /// Run `f` against the session on the blocking pool
    async fn with_session<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| TrackerError::Connection("Session lock poisoned".to_string()))?;
            f(&guard)
        })
        .await
        .map_err(|e| TrackerError::Other(format!("Database task failed: {e}")))?
    }

    /// Round-trip to the server
    pub async fn ping(&self) -> Result<()> {
        self.with_session(|conn| conn.ping().map_err(|e| classify(e, TrackerError::QueryFailed)))
            .await
    }

    pub async fn schema_exists(&self, schema: &str) -> Result<bool> {
        let owner = schema.to_string();
        self.with_session(move |conn| {
            let count = conn
                .query_row_as::<i64>(SQL_SCHEMA_EXISTS, &[&owner])
                .map_err(|e| classify(e, TrackerError::QueryFailed))?;
            Ok(count > 0)
        })
        .await
    }

    /// `(object_name, generated)` rows for one owner and catalog keyword
    pub async fn list_objects(&self, schema: &str, keyword: &str) -> Result<Vec<(String, bool)>> {
        let owner = schema.to_string();
        let keyword = keyword.to_string();
        self.with_session(move |conn| {
            let rows = conn
                .query(SQL_LIST_OBJECTS, &[&owner, &keyword])
                .map_err(|e| classify(e, TrackerError::QueryFailed))?;

            let mut objects = Vec::new();
            for row_result in rows {
                let row = row_result.map_err(|e| classify(e, TrackerError::QueryFailed))?;
                let name: String = row
                    .get(0)
                    .map_err(|e| classify(e, TrackerError::QueryFailed))?;
                let generated: Option<String> = row
                    .get(1)
                    .map_err(|e| classify(e, TrackerError::QueryFailed))?;
                objects.push((name, generated.as_deref() == Some("Y")));
            }
            Ok(objects)
        })
        .await
    }

    /// Apply session transform parameters
    pub async fn set_transform_params(&self, options: &RenderingOptions) -> Result<()> {
        let block = transform_block(options);
        self.with_session(move |conn| {
            conn.execute(&block, &[])
                .map_err(|e| classify(e, TrackerError::QueryFailed))?;
            Ok(())
        })
        .await
    }

    /// Render one object with `DBMS_METADATA.GET_DDL`
    pub async fn get_ddl(&self, metadata_type: &str, name: &str, schema: &str) -> Result<String> {
        let metadata_type = metadata_type.to_string();
        let name = name.to_string();
        let schema = schema.to_string();
        self.with_session(move |conn| {
            conn.query_row_as::<String>(SQL_GET_DDL, &[&metadata_type, &name, &schema])
                .map_err(|e| classify(e, TrackerError::QueryFailed))
        })
        .await
    }
}

fn init_client_library(dir: &str) -> Result<()> {
    let initialized = oracle::InitParams::new()
        .oracle_client_lib_dir(dir)
        .and_then(|params| params.init())
        .map_err(|e| TrackerError::Configuration(format!("Cannot load client libraries from {dir}: {e}")))?;
    if initialized {
        tracing::debug!(client_lib_dir = %dir, "Client libraries initialized");
    }
    Ok(())
}

/// PL/SQL block setting every transform parameter on the session
pub(crate) fn transform_block(options: &RenderingOptions) -> String {
    let mut block = String::from("BEGIN\n");
    for (name, value) in options.transform_params() {
        block.push_str(&format!(
            "  dbms_metadata.set_transform_param(dbms_metadata.session_transform, '{}', {});\n",
            name,
            if value { "TRUE" } else { "FALSE" }
        ));
    }
    block.push_str("END;");
    block
}

/// Map a driver error, keeping lost sessions apart from statement failures
fn classify(err: oracle::Error, otherwise: fn(String) -> TrackerError) -> TrackerError {
    classify_message(err.to_string(), otherwise)
}

pub(crate) fn classify_message(message: String, otherwise: fn(String) -> TrackerError) -> TrackerError {
    if LOST_SESSION_CODES.iter().any(|code| message.contains(code)) {
        TrackerError::Connection(message)
    } else {
        otherwise(message)
    }
}
