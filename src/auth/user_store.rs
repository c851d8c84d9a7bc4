//! User Storage
//! Mission: Securely store and manage user accounts with SQLite

use crate::auth::models::{User, UserRole};
use chrono::Utc;
use rusqlite::{params, Connection};
use tracing::info;
use uuid::Uuid;

/// User store errors.
///
/// The UNIQUE constraints on email and username make the database the
/// authoritative duplicate check; any upfront lookup is an optimization only.
#[derive(Debug)]
pub enum StoreError {
    DuplicateUser,
    UserNotFound,
    Database(rusqlite::Error),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::DuplicateUser => write!(f, "User with this email already exists"),
            StoreError::UserNotFound => write!(f, "User not found"),
            StoreError::Database(e) => write!(f, "Database error: {}", e),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(err, _) = &e {
            if err.code == rusqlite::ErrorCode::ConstraintViolation {
                return StoreError::DuplicateUser;
            }
        }
        StoreError::Database(e)
    }
}

/// User storage with SQLite backend
pub struct UserStore {
    db_path: String,
}

impl UserStore {
    /// Create a new user store and initialize database
    pub fn new(db_path: &str) -> Result<Self, StoreError> {
        let store = Self {
            db_path: db_path.to_string(),
        };
        store.init_db()?;
        Ok(store)
    }

    /// Initialize database schema
    fn init_db(&self) -> Result<(), StoreError> {
        let conn = Connection::open(&self.db_path)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                username TEXT UNIQUE NOT NULL,
                email TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                role TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        Ok(())
    }

    /// Create a new user. The password hash is computed by the caller;
    /// this store persists what it is given.
    pub fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
        role: UserRole,
    ) -> Result<User, StoreError> {
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            role,
            created_at: Utc::now().to_rfc3339(),
        };

        let conn = Connection::open(&self.db_path)?;
        conn.execute(
            "INSERT INTO users (id, username, email, password_hash, role, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                user.id.to_string(),
                user.username,
                user.email,
                user.password_hash,
                user.role.as_str(),
                user.created_at,
            ],
        )?;

        info!(
            "✅ Created user: {} ({})",
            user.username,
            user.role.as_str()
        );

        Ok(user)
    }

    /// Get user by email (login key)
    pub fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.query_one("email = ?1", email)
    }

    /// Get user by username
    pub fn get_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        self.query_one("username = ?1", username)
    }

    /// Get user by ID
    pub fn get_user_by_id(&self, user_id: &Uuid) -> Result<Option<User>, StoreError> {
        self.query_one("id = ?1", &user_id.to_string())
    }

    fn query_one(&self, predicate: &str, value: &str) -> Result<Option<User>, StoreError> {
        let conn = Connection::open(&self.db_path)?;

        let sql = format!(
            "SELECT id, username, email, password_hash, role, created_at
             FROM users WHERE {}",
            predicate
        );
        let mut stmt = conn.prepare(&sql)?;

        let user_result = stmt.query_row(params![value], row_to_user);

        match user_result {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List all users (admin only)
    pub fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt = conn.prepare(
            "SELECT id, username, email, password_hash, role, created_at FROM users",
        )?;

        let users = stmt
            .query_map([], row_to_user)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(users)
    }

    /// Partial update of a user record (admin only). `None` fields are left
    /// unchanged.
    pub fn update_user(
        &self,
        user_id: &Uuid,
        username: Option<&str>,
        email: Option<&str>,
        password_hash: Option<&str>,
    ) -> Result<User, StoreError> {
        let existing = self
            .get_user_by_id(user_id)?
            .ok_or(StoreError::UserNotFound)?;

        let username = username.unwrap_or(&existing.username);
        let email = email.unwrap_or(&existing.email);
        let password_hash = password_hash.unwrap_or(&existing.password_hash);

        let conn = Connection::open(&self.db_path)?;
        conn.execute(
            "UPDATE users SET username = ?1, email = ?2, password_hash = ?3 WHERE id = ?4",
            params![username, email, password_hash, user_id.to_string()],
        )?;

        self.get_user_by_id(user_id)?.ok_or(StoreError::UserNotFound)
    }

    /// Delete a user by ID (admin only)
    pub fn delete_user(&self, user_id: &Uuid) -> Result<(), StoreError> {
        let conn = Connection::open(&self.db_path)?;

        let rows_affected = conn.execute(
            "DELETE FROM users WHERE id = ?1",
            params![user_id.to_string()],
        )?;

        if rows_affected == 0 {
            return Err(StoreError::UserNotFound);
        }

        info!("🗑️  Deleted user: {}", user_id);
        Ok(())
    }
}

fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    let id_str: String = row.get(0)?;
    let role_str: String = row.get(4)?;
    Ok(User {
        id: Uuid::parse_str(&id_str).unwrap_or_default(),
        username: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        role: UserRole::from_str(&role_str).unwrap_or(UserRole::User),
        created_at: row.get(5)?,
    })
}
