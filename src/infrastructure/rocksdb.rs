use crate::domain::ports::SessionStore;
use crate::domain::session::{Session, SessionPolicy};
use crate::error::{Result, UssdError};
use async_trait::async_trait;
use chrono::Utc;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, Options};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Column Family for storing in-progress sessions.
pub const CF_SESSIONS: &str = "sessions";

/// A persistent session store implementation using RocksDB.
///
/// Sessions are stored as JSON under their session id in the `sessions`
/// column family, so a dialog survives a restart of the process.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDbSessionStore {
    db: Arc<DB>,
    policy: SessionPolicy,
}

impl RocksDbSessionStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// # Arguments
    ///
    /// * `path` - The filesystem path where the database will be stored.
    /// * `policy` - First screen and idle timeout for sessions.
    pub fn open<P: AsRef<Path>>(path: P, policy: SessionPolicy) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_sessions = ColumnFamilyDescriptor::new(CF_SESSIONS, Options::default());
        let db = DB::open_cf_descriptors(&opts, path, vec![cf_sessions])?;

        Ok(Self {
            db: Arc::new(db),
            policy,
        })
    }

    fn put(&self, session_id: &str, session: &Session) -> Result<()> {
        let cf = self.sessions_cf()?;
        let value = serde_json::to_vec(session).map_err(|e| {
            UssdError::InternalError(Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("Serialization error: {}", e),
            )))
        })?;
        self.db.put_cf(cf, session_id.as_bytes(), value)?;
        Ok(())
    }

    fn sessions_cf(&self) -> Result<&ColumnFamily> {
        self.db.cf_handle(CF_SESSIONS).ok_or_else(|| {
            UssdError::InternalError(Box::new(std::io::Error::other(
                "Sessions column family not found",
            )))
        })
    }
}

#[async_trait]
impl SessionStore for RocksDbSessionStore {
    async fn create(&self, session_id: &str, account_id: &str) -> Result<Session> {
        let session = Session::new(account_id, self.policy.first_screen());
        self.put(session_id, &session)?;
        debug!(session_id, "Session created");
        Ok(session)
    }

    async fn get(&self, session_id: &str) -> Result<Option<Session>> {
        let cf = self.sessions_cf()?;
        let Some(bytes) = self.db.get_cf(cf, session_id.as_bytes())? else {
            return Ok(None);
        };

        let session: Session = serde_json::from_slice(&bytes).map_err(|e| {
            UssdError::InternalError(Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("Deserialization error: {}", e),
            )))
        })?;

        if session.is_expired(Utc::now(), self.policy.idle_timeout) {
            self.db.delete_cf(cf, session_id.as_bytes())?;
            info!(session_id, "Session expired");
            return Ok(None);
        }
        Ok(Some(session))
    }

    async fn update(&self, session_id: &str, session: Session) -> Result<()> {
        self.put(session_id, &session)
    }

    async fn delete(&self, session_id: &str) -> Result<()> {
        let cf = self.sessions_cf()?;
        self.db.delete_cf(cf, session_id.as_bytes())?;
        Ok(())
    }
}
