use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, NaiveDateTime};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::workflows::offers::{Profile, SessionStore, StoreError, Wishlist};

const WISHLIST_RECORD: &str = "wishlist";
const PROFILE_RECORD: &str = "userProfile";

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

impl AppState {
    pub(crate) fn new(metrics: PrometheusHandle) -> Self {
        Self {
            readiness: Arc::new(AtomicBool::new(false)),
            metrics: Arc::new(metrics),
        }
    }
}

/// Session records kept in process memory.
#[derive(Default, Clone)]
pub struct InMemorySessionStore {
    wishlist: Arc<Mutex<Wishlist>>,
    profile: Arc<Mutex<Option<Profile>>>,
}

impl SessionStore for InMemorySessionStore {
    fn load_wishlist(&self) -> Result<Wishlist, StoreError> {
        let guard = self.wishlist.lock().expect("wishlist mutex poisoned");
        Ok(guard.clone())
    }

    fn save_wishlist(&self, wishlist: &Wishlist) -> Result<(), StoreError> {
        let mut guard = self.wishlist.lock().expect("wishlist mutex poisoned");
        *guard = wishlist.clone();
        Ok(())
    }

    fn load_profile(&self) -> Result<Option<Profile>, StoreError> {
        let guard = self.profile.lock().expect("profile mutex poisoned");
        Ok(guard.clone())
    }

    fn save_profile(&self, profile: Option<&Profile>) -> Result<(), StoreError> {
        let mut guard = self.profile.lock().expect("profile mutex poisoned");
        *guard = profile.cloned();
        Ok(())
    }
}

/// Session records persisted as `wishlist.json` and `userProfile.json` in one directory.
/// Writes go through a temporary file and a rename so a record is always replaced whole.
pub struct JsonFileSessionStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileSessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, record: &str) -> PathBuf {
        self.dir.join(format!("{record}.json"))
    }

    fn read<T: DeserializeOwned>(&self, record: &'static str) -> Result<Option<T>, StoreError> {
        let raw = match fs::read_to_string(self.path_for(record)) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(StoreError::Unavailable(err.to_string())),
        };

        serde_json::from_str(&raw).map_err(|source| StoreError::Corrupt { record, source })
    }

    fn write<T: Serialize>(&self, record: &'static str, value: &T) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().expect("store mutex poisoned");
        let payload = serde_json::to_vec_pretty(value)
            .map_err(|source| StoreError::Corrupt { record, source })?;

        fs::create_dir_all(&self.dir).map_err(unavailable)?;
        let target = self.path_for(record);
        let staging = target.with_extension("json.tmp");
        fs::write(&staging, payload).map_err(unavailable)?;
        fs::rename(&staging, &target).map_err(unavailable)
    }

    fn remove(&self, record: &'static str) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().expect("store mutex poisoned");
        match fs::remove_file(self.path_for(record)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(unavailable(err)),
        }
    }
}

fn unavailable(err: std::io::Error) -> StoreError {
    StoreError::Unavailable(err.to_string())
}

impl SessionStore for JsonFileSessionStore {
    fn load_wishlist(&self) -> Result<Wishlist, StoreError> {
        Ok(self.read(WISHLIST_RECORD)?.unwrap_or_default())
    }

    fn save_wishlist(&self, wishlist: &Wishlist) -> Result<(), StoreError> {
        self.write(WISHLIST_RECORD, wishlist)
    }

    fn load_profile(&self) -> Result<Option<Profile>, StoreError> {
        self.read(PROFILE_RECORD)
    }

    fn save_profile(&self, profile: Option<&Profile>) -> Result<(), StoreError> {
        match profile {
            Some(profile) => self.write(PROFILE_RECORD, profile),
            None => self.remove(PROFILE_RECORD),
        }
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

/// Midnight of `today`, or the current UTC instant.
pub(crate) fn evaluation_instant(today: Option<NaiveDate>) -> NaiveDateTime {
    today
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .unwrap_or_else(|| chrono::Utc::now().naive_utc())
}

pub(crate) fn deserialize_optional_date<'de, D>(
    deserializer: D,
) -> Result<Option<NaiveDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    opt.map(|value| parse_date(&value).map_err(serde::de::Error::custom))
        .transpose()
}
