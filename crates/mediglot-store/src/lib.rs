//! SQLite-backed persistence for users, bearer tokens, and translation
//! history.
//!
//! The store owns a single [`Connection`]; async callers are expected to
//! wrap it in a mutex and go through `spawn_blocking`. WAL mode keeps
//! concurrent readers cheap.

use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

use argon2::password_hash::{rand_core::OsRng, PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("password hashing failed: {0}")]
    Hash(String),
    #[error("record not found")]
    NotFound,
    #[error("username already taken")]
    UsernameTaken,
    #[error("invalid credentials")]
    InvalidCredentials,
}

/// A registered user. The password hash never leaves the store.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub organization: String,
    pub is_healthcare_provider: bool,
    pub created_at: i64,
}

/// Input for user registration.
#[derive(Debug, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub organization: String,
    #[serde(default)]
    pub is_healthcare_provider: bool,
}

/// Partial profile update; absent fields are left untouched.
#[derive(Debug, Default, Deserialize)]
pub struct ProfileUpdate {
    pub email: Option<String>,
    pub organization: Option<String>,
    pub is_healthcare_provider: Option<bool>,
}

/// A stored translation with its attached medical suggestions.
#[derive(Debug, Clone, Serialize)]
pub struct TranslationRecord {
    pub id: i64,
    pub user_id: i64,
    pub original_text: String,
    pub translated_text: String,
    pub source_language: String,
    pub target_language: String,
    pub medical_suggestions: Vec<String>,
    pub is_favorite: bool,
    pub created_at: i64,
}

/// Input for recording a completed translation.
#[derive(Debug)]
pub struct NewTranslation {
    pub original_text: String,
    pub translated_text: String,
    pub source_language: String,
    pub target_language: String,
    pub medical_suggestions: Vec<String>,
}

pub struct Store {
    conn: Connection,
}

fn now_epoch() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

fn init_schema(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;
         PRAGMA busy_timeout = 5000;
         PRAGMA foreign_keys = ON;",
    )?;
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS users (
             id                     INTEGER PRIMARY KEY,
             username               TEXT UNIQUE NOT NULL,
             email                  TEXT NOT NULL,
             password_hash          TEXT NOT NULL,
             organization           TEXT NOT NULL DEFAULT '',
             is_healthcare_provider INTEGER NOT NULL DEFAULT 0,
             created_at             INTEGER NOT NULL
         );

         CREATE TABLE IF NOT EXISTS auth_tokens (
             token      TEXT PRIMARY KEY,
             user_id    INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
             created_at INTEGER NOT NULL
         );

         CREATE TABLE IF NOT EXISTS translations (
             id                  INTEGER PRIMARY KEY,
             user_id             INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
             original_text       TEXT NOT NULL,
             translated_text     TEXT NOT NULL,
             source_language     TEXT NOT NULL,
             target_language     TEXT NOT NULL,
             medical_suggestions TEXT NOT NULL DEFAULT '[]',
             is_favorite         INTEGER NOT NULL DEFAULT 0,
             created_at          INTEGER NOT NULL
         );

         CREATE INDEX IF NOT EXISTS idx_translations_user_created
             ON translations (user_id, created_at DESC);",
    )?;
    Ok(())
}

impl Store {
    /// Open (creating if needed) the store at `path`.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    /// In-memory store for tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    // ── Users and tokens ──────────────────────────────────────────────

    /// Register a new user. The password is hashed with Argon2id.
    pub fn create_user(&self, new: &NewUser) -> Result<User, StoreError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(new.password.as_bytes(), &salt)
            .map_err(|e| StoreError::Hash(e.to_string()))?
            .to_string();

        let created_at = now_epoch();
        let result = self.conn.execute(
            "INSERT INTO users
                 (username, email, password_hash, organization, is_healthcare_provider, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                new.username,
                new.email,
                hash,
                new.organization,
                new.is_healthcare_provider as i64,
                created_at
            ],
        );

        match result {
            Ok(_) => Ok(User {
                id: self.conn.last_insert_rowid(),
                username: new.username.clone(),
                email: new.email.clone(),
                organization: new.organization.clone(),
                is_healthcare_provider: new.is_healthcare_provider,
                created_at,
            }),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(StoreError::UsernameTaken)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Verify a username/password pair.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<User, StoreError> {
        let row = self
            .conn
            .query_row(
                "SELECT id, username, email, password_hash, organization,
                        is_healthcare_provider, created_at
                 FROM users WHERE username = ?1",
                params![username],
                |row| {
                    Ok((
                        User {
                            id: row.get(0)?,
                            username: row.get(1)?,
                            email: row.get(2)?,
                            organization: row.get(4)?,
                            is_healthcare_provider: row.get::<_, i64>(5)? != 0,
                            created_at: row.get(6)?,
                        },
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()?;

        let (user, stored_hash) = row.ok_or(StoreError::InvalidCredentials)?;
        let parsed = PasswordHash::new(&stored_hash).map_err(|e| StoreError::Hash(e.to_string()))?;
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .map_err(|_| StoreError::InvalidCredentials)?;
        Ok(user)
    }

    /// Issue a fresh bearer token for the given user.
    pub fn issue_token(&self, user_id: i64) -> Result<String, StoreError> {
        let token = uuid::Uuid::new_v4().to_string();
        self.conn.execute(
            "INSERT INTO auth_tokens (token, user_id, created_at) VALUES (?1, ?2, ?3)",
            params![token, user_id, now_epoch()],
        )?;
        Ok(token)
    }

    /// Invalidate a bearer token. `NotFound` when there is no such session.
    pub fn revoke_token(&self, token: &str) -> Result<(), StoreError> {
        let deleted = self
            .conn
            .execute("DELETE FROM auth_tokens WHERE token = ?1", params![token])?;
        if deleted == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    /// Resolve a bearer token to its user.
    pub fn user_for_token(&self, token: &str) -> Result<User, StoreError> {
        self.conn
            .query_row(
                "SELECT u.id, u.username, u.email, u.organization,
                        u.is_healthcare_provider, u.created_at
                 FROM users u
                 JOIN auth_tokens t ON t.user_id = u.id
                 WHERE t.token = ?1",
                params![token],
                |row| {
                    Ok(User {
                        id: row.get(0)?,
                        username: row.get(1)?,
                        email: row.get(2)?,
                        organization: row.get(3)?,
                        is_healthcare_provider: row.get::<_, i64>(4)? != 0,
                        created_at: row.get(5)?,
                    })
                },
            )
            .optional()?
            .ok_or(StoreError::NotFound)
    }

    /// Apply a partial profile update and return the fresh user row.
    pub fn update_profile(&self, user_id: i64, update: &ProfileUpdate) -> Result<User, StoreError> {
        if let Some(ref email) = update.email {
            self.conn.execute(
                "UPDATE users SET email = ?1 WHERE id = ?2",
                params![email, user_id],
            )?;
        }
        if let Some(ref organization) = update.organization {
            self.conn.execute(
                "UPDATE users SET organization = ?1 WHERE id = ?2",
                params![organization, user_id],
            )?;
        }
        if let Some(flag) = update.is_healthcare_provider {
            self.conn.execute(
                "UPDATE users SET is_healthcare_provider = ?1 WHERE id = ?2",
                params![flag as i64, user_id],
            )?;
        }
        self.get_user(user_id)
    }

    fn get_user(&self, user_id: i64) -> Result<User, StoreError> {
        self.conn
            .query_row(
                "SELECT id, username, email, organization, is_healthcare_provider, created_at
                 FROM users WHERE id = ?1",
                params![user_id],
                |row| {
                    Ok(User {
                        id: row.get(0)?,
                        username: row.get(1)?,
                        email: row.get(2)?,
                        organization: row.get(3)?,
                        is_healthcare_provider: row.get::<_, i64>(4)? != 0,
                        created_at: row.get(5)?,
                    })
                },
            )
            .optional()?
            .ok_or(StoreError::NotFound)
    }

    // ── Translation history ───────────────────────────────────────────

    /// Record a completed translation for a user.
    pub fn insert_translation(
        &self,
        user_id: i64,
        new: &NewTranslation,
    ) -> Result<TranslationRecord, StoreError> {
        let suggestions_json =
            serde_json::to_string(&new.medical_suggestions).unwrap_or_else(|_| "[]".to_string());
        let created_at = now_epoch();
        self.conn.execute(
            "INSERT INTO translations
                 (user_id, original_text, translated_text, source_language,
                  target_language, medical_suggestions, is_favorite, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7)",
            params![
                user_id,
                new.original_text,
                new.translated_text,
                new.source_language,
                new.target_language,
                suggestions_json,
                created_at
            ],
        )?;
        self.get_translation(self.conn.last_insert_rowid(), user_id)
    }

    /// All translations for a user, newest first.
    pub fn list_translations(&self, user_id: i64) -> Result<Vec<TranslationRecord>, StoreError> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT id, user_id, original_text, translated_text, source_language,
                    target_language, medical_suggestions, is_favorite, created_at
             FROM translations
             WHERE user_id = ?1
             ORDER BY created_at DESC, id DESC",
        )?;
        let records = stmt
            .query_map(params![user_id], row_to_translation)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// Fetch one translation, enforcing ownership.
    pub fn get_translation(&self, id: i64, user_id: i64) -> Result<TranslationRecord, StoreError> {
        self.conn
            .query_row(
                "SELECT id, user_id, original_text, translated_text, source_language,
                        target_language, medical_suggestions, is_favorite, created_at
                 FROM translations WHERE id = ?1 AND user_id = ?2",
                params![id, user_id],
                row_to_translation,
            )
            .optional()?
            .ok_or(StoreError::NotFound)
    }

    /// Delete a translation. `NotFound` when absent or owned by another user.
    pub fn delete_translation(&self, id: i64, user_id: i64) -> Result<(), StoreError> {
        let deleted = self.conn.execute(
            "DELETE FROM translations WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        if deleted == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    /// Flip the favorite flag and return the updated record.
    pub fn toggle_favorite(
        &self,
        id: i64,
        user_id: i64,
    ) -> Result<TranslationRecord, StoreError> {
        let updated = self.conn.execute(
            "UPDATE translations SET is_favorite = 1 - is_favorite
             WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        if updated == 0 {
            return Err(StoreError::NotFound);
        }
        self.get_translation(id, user_id)
    }
}

fn row_to_translation(row: &rusqlite::Row<'_>) -> Result<TranslationRecord, rusqlite::Error> {
    let suggestions_json: String = row.get(6)?;
    Ok(TranslationRecord {
        id: row.get(0)?,
        user_id: row.get(1)?,
        original_text: row.get(2)?,
        translated_text: row.get(3)?,
        source_language: row.get(4)?,
        target_language: row.get(5)?,
        medical_suggestions: serde_json::from_str(&suggestions_json).unwrap_or_default(),
        is_favorite: row.get::<_, i64>(7)? != 0,
        created_at: row.get(8)?,
    })
}
