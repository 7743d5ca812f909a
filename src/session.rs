use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::domain::{CartSnapshot, RecordId, User};
use crate::error::SessionError;

pub const IS_LOGGED_IN: &str = "isLoggedIn";
pub const USER_EMAIL: &str = "userEmail";
pub const AUTH_TOKEN: &str = "authToken";
pub const USER_DATA: &str = "userData";
pub const USER_ID: &str = "userId";
pub const CART: &str = "cart";
pub const ORDER_RATINGS: &str = "orderRatings";

/// Keys dropped on logout. Ratings outlive the session.
const SESSION_KEYS: [&str; 6] = [IS_LOGGED_IN, USER_EMAIL, AUTH_TOKEN, USER_DATA, USER_ID, CART];

/// What subscribers see after every change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub logged_in: bool,
    pub user: Option<User>,
}

struct Storage {
    values: BTreeMap<String, String>,
    path: Option<PathBuf>,
}

impl Storage {
    fn read(path: &Path) -> Result<BTreeMap<String, String>, SessionError> {
        if !path.exists() {
            return Ok(BTreeMap::new());
        }
        let raw = std::fs::read_to_string(path).map_err(|e| SessionError::Io(e.to_string()))?;
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&raw).map_err(|e| SessionError::Io(e.to_string()))
    }

    fn persist(&self) -> Result<(), SessionError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let raw = serde_json::to_string_pretty(&self.values)
            .map_err(|e| SessionError::Io(e.to_string()))?;
        std::fs::write(path, raw).map_err(|e| SessionError::Io(e.to_string()))
    }

    fn decode<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.values.get(key)?;
        match serde_json::from_str(raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "Ignoring malformed session value");
                None
            }
        }
    }

    fn state(&self) -> SessionState {
        SessionState {
            logged_in: self.decode::<bool>(IS_LOGGED_IN).unwrap_or(false),
            user: self.decode(USER_DATA),
        }
    }
}

/// Key-value session storage shared by every component of one client.
///
/// Values are stored JSON-encoded. When opened on a file, every write is
/// flushed to it and [`SessionContext::reload`] picks up changes made by
/// another process. Subscribers are notified through a watch channel.
#[derive(Clone)]
pub struct SessionContext {
    storage: Arc<Mutex<Storage>>,
    changes: Arc<watch::Sender<SessionState>>,
}

impl SessionContext {
    pub fn in_memory() -> Self {
        Self::with_storage(Storage {
            values: BTreeMap::new(),
            path: None,
        })
    }

    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SessionError> {
        let path = path.into();
        let values = Storage::read(&path)?;
        info!(path = %path.display(), keys = values.len(), "Session storage opened");
        Ok(Self::with_storage(Storage {
            values,
            path: Some(path),
        }))
    }

    fn with_storage(storage: Storage) -> Self {
        let (changes, _) = watch::channel(storage.state());
        Self {
            storage: Arc::new(Mutex::new(storage)),
            changes: Arc::new(changes),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Storage> {
        self.storage.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self, state: SessionState) {
        self.changes.send_replace(state);
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.lock().decode(key)
    }

    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), SessionError> {
        self.write(|values| {
            values.insert(key.to_string(), encode(key, value)?);
            Ok(())
        })
    }

    pub fn remove(&self, key: &str) -> Result<(), SessionError> {
        self.write(|values| {
            values.remove(key);
            Ok(())
        })
    }

    fn write(
        &self,
        change: impl FnOnce(&mut BTreeMap<String, String>) -> Result<(), SessionError>,
    ) -> Result<(), SessionError> {
        let state = {
            let mut storage = self.lock();
            change(&mut storage.values)?;
            storage.persist()?;
            storage.state()
        };
        self.notify(state);
        Ok(())
    }

    pub fn state(&self) -> SessionState {
        self.lock().state()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.changes.subscribe()
    }

    /// Re-reads the backing file and notifies subscribers if it changed.
    pub fn reload(&self) -> Result<(), SessionError> {
        let state = {
            let mut storage = self.lock();
            let Some(path) = storage.path.clone() else {
                return Ok(());
            };
            let values = Storage::read(&path)?;
            if values == storage.values {
                return Ok(());
            }
            storage.values = values;
            storage.state()
        };
        debug!("Session storage changed externally");
        self.notify(state);
        Ok(())
    }

    pub fn sign_in(&self, user: &User) -> Result<(), SessionError> {
        self.write(|values| {
            for (key, value) in [
                (USER_DATA, encode(USER_DATA, user)?),
                (USER_EMAIL, encode(USER_EMAIL, &user.email)?),
                (IS_LOGGED_IN, encode(IS_LOGGED_IN, &true)?),
                (USER_ID, encode(USER_ID, &user.id)?),
            ] {
                values.insert(key.to_string(), value);
            }
            Ok(())
        })?;
        info!(user_id = %user.id, "Signed in");
        Ok(())
    }

    pub fn sign_out(&self) -> Result<(), SessionError> {
        self.write(|values| {
            for key in SESSION_KEYS {
                values.remove(key);
            }
            Ok(())
        })?;
        info!("Signed out");
        Ok(())
    }

    pub fn is_logged_in(&self) -> bool {
        self.state().logged_in
    }

    pub fn current_user(&self) -> Option<User> {
        self.get(USER_DATA)
    }

    pub fn user_id(&self) -> Option<RecordId> {
        self.get(USER_ID)
    }

    pub fn update_user(&self, user: &User) -> Result<(), SessionError> {
        self.set(USER_DATA, user)
    }

    pub fn cart_snapshot(&self) -> CartSnapshot {
        self.get(CART).unwrap_or_default()
    }

    pub fn store_cart_snapshot(&self, snapshot: &CartSnapshot) -> Result<(), SessionError> {
        self.set(CART, snapshot)
    }

    pub fn ratings(&self) -> BTreeMap<RecordId, u8> {
        self.get(ORDER_RATINGS).unwrap_or_default()
    }

    pub fn rating(&self, order_id: &RecordId) -> Option<u8> {
        self.ratings().get(order_id).copied()
    }

    /// Stores a 1 to 5 star rating, clamping anything outside that range.
    pub fn set_rating(&self, order_id: RecordId, stars: i64) -> Result<u8, SessionError> {
        // clamped to 1..=5, so the cast cannot truncate
        let stars = stars.clamp(1, 5) as u8;
        let mut ratings = self.ratings();
        ratings.insert(order_id, stars);
        self.set(ORDER_RATINGS, &ratings)?;
        Ok(stars)
    }
}

fn encode<T: Serialize>(key: &str, value: &T) -> Result<String, SessionError> {
    serde_json::to_string(value).map_err(|e| SessionError::Encode {
        key: key.to_string(),
        reason: e.to_string(),
    })
}
