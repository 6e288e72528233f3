//! Per-user profile bootstrap and overrides.
//!
//! The identity provider supplies a display name and email with each
//! session, but practitioners can override them (and record a
//! specialisation) locally. The override store is the value of record: the
//! first visit for a user seeds it from the identity-provider values, and
//! every later visit reads the stored fields verbatim; upstream profile
//! changes are deliberately ignored after that point. An explicit update
//! always overwrites the store.
//!
//! Reconciliation is a pure function of (stored record, identity values) so
//! the first-run semantics can be tested without touching a filesystem.
//! Writes are last-writer-wins: they are only ever triggered by the owning
//! user's own actions.

use crate::constants::DEFAULT_SPECIALIZATION;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("invalid user id: {0:?}")]
    InvalidUserId(String),
    #[error("failed to create profile directory: {0}")]
    DirCreation(std::io::Error),
    #[error("failed to read profile record: {0}")]
    FileRead(std::io::Error),
    #[error("failed to write profile record: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to serialize profile record: {0}")]
    Serialization(serde_json::Error),
    #[error("failed to deserialize profile record: {0}")]
    Deserialization(serde_json::Error),
}

pub type ProfileResult<T> = std::result::Result<T, ProfileError>;

/// The three per-user profile strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ProfileFields {
    pub full_name: String,
    pub email: String,
    pub specialization: String,
}

/// Durable per-user record: the fields plus the first-run flag.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ProfileRecord {
    pub initialized: bool,
    #[serde(flatten)]
    pub fields: ProfileFields,
}

/// Profile data supplied by the identity provider for the current session.
#[derive(Debug, Clone, Default)]
pub struct IdentityProfile {
    pub full_name: Option<String>,
    pub email: Option<String>,
}

/// Reconciles a stored record with identity-provider values.
///
/// Returns the fields of record and whether they must be written back:
/// - no record yet (or the flag unset): seed name and email from the
///   identity values, falling back to empty strings, and seed the fixed
///   default specialisation; the result must be written.
/// - record present with the flag set: the stored fields win verbatim and
///   the identity values are ignored; nothing to write.
pub fn reconcile(
    stored: Option<&ProfileRecord>,
    identity: &IdentityProfile,
) -> (ProfileFields, bool) {
    match stored {
        Some(record) if record.initialized => (record.fields.clone(), false),
        _ => {
            let fields = ProfileFields {
                full_name: identity.full_name.clone().unwrap_or_default(),
                email: identity.email.clone().unwrap_or_default(),
                specialization: DEFAULT_SPECIALIZATION.to_string(),
            };
            (fields, true)
        }
    }
}

/// Durable storage for per-user profile records.
pub trait ProfileStore {
    /// Loads the record for `user_id`; `None` when nothing was stored yet.
    fn load(&self, user_id: &str) -> ProfileResult<Option<ProfileRecord>>;

    /// Writes the record for `user_id`, replacing any previous one.
    fn save(&self, user_id: &str, record: &ProfileRecord) -> ProfileResult<()>;
}

/// File-backed profile store: one JSON document per user id.
///
/// Records live at `<dir>/<user_id>.json`. User ids come from the identity
/// provider and are used as file names, so they are validated against path
/// traversal before any filesystem access.
#[derive(Clone, Debug)]
pub struct FileProfileStore {
    dir: PathBuf,
}

impl FileProfileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn record_path(&self, user_id: &str) -> ProfileResult<PathBuf> {
        validate_user_id(user_id)?;
        Ok(self.dir.join(format!("{user_id}.json")))
    }
}

/// Identity-provider user ids are opaque tokens of the shape `user_<hash>`.
/// Anything outside `[A-Za-z0-9_-]` is rejected rather than sanitised.
fn validate_user_id(user_id: &str) -> ProfileResult<()> {
    let valid = !user_id.is_empty()
        && user_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

    if valid {
        Ok(())
    } else {
        Err(ProfileError::InvalidUserId(user_id.to_string()))
    }
}

impl ProfileStore for FileProfileStore {
    fn load(&self, user_id: &str) -> ProfileResult<Option<ProfileRecord>> {
        let path = self.record_path(user_id)?;

        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(ProfileError::FileRead(e)),
        };

        let record =
            serde_json::from_str(&contents).map_err(ProfileError::Deserialization)?;
        Ok(Some(record))
    }

    fn save(&self, user_id: &str, record: &ProfileRecord) -> ProfileResult<()> {
        let path = self.record_path(user_id)?;

        std::fs::create_dir_all(&self.dir).map_err(ProfileError::DirCreation)?;
        let contents =
            serde_json::to_string_pretty(record).map_err(ProfileError::Serialization)?;
        std::fs::write(&path, contents).map_err(ProfileError::FileWrite)
    }
}

/// Bootstrap-then-read profile access over a [`ProfileStore`].
#[derive(Clone, Debug)]
pub struct ProfileService<S> {
    store: S,
}

impl<S: ProfileStore> ProfileService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns the fields of record for `user_id`, seeding the store from
    /// the identity values on the first visit.
    ///
    /// Idempotent: once a record exists, repeat calls return the stored
    /// fields unchanged even when different identity values are supplied.
    ///
    /// # Errors
    ///
    /// Propagates store read/write failures; an absent record is not an
    /// error.
    pub fn bootstrap(
        &self,
        user_id: &str,
        identity: &IdentityProfile,
    ) -> ProfileResult<ProfileFields> {
        let stored = self.store.load(user_id)?;
        let (fields, should_write) = reconcile(stored.as_ref(), identity);

        if should_write {
            self.store.save(
                user_id,
                &ProfileRecord {
                    initialized: true,
                    fields: fields.clone(),
                },
            )?;
        }

        Ok(fields)
    }

    /// Explicit user-initiated overwrite of all three fields.
    ///
    /// Always writes, regardless of whether the record was initialised.
    pub fn update(&self, user_id: &str, fields: ProfileFields) -> ProfileResult<ProfileFields> {
        self.store.save(
            user_id,
            &ProfileRecord {
                initialized: true,
                fields: fields.clone(),
            },
        )?;
        Ok(fields)
    }
}
