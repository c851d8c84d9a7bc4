//! Deck Storage
//! Mission: Persist flashcard sets and flashcards with SQLite

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

/// A deck of flashcards owned by a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlashcardSet {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// A term/definition pair belonging to a set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flashcard {
    pub id: Uuid,
    pub set_id: Uuid,
    pub term: String,
    pub definition: String,
    pub created_at: String,
}

/// Flashcard storage with SQLite backend
pub struct DeckStore {
    db_path: String,
}

impl DeckStore {
    /// Create a new deck store and initialize database
    pub fn new(db_path: &str) -> Result<Self> {
        let store = Self {
            db_path: db_path.to_string(),
        };
        store.init_db()?;
        Ok(store)
    }

    fn init_db(&self) -> Result<()> {
        let conn = Connection::open(&self.db_path)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS flashcard_sets (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                title TEXT NOT NULL,
                description TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS flashcards (
                id TEXT PRIMARY KEY,
                set_id TEXT NOT NULL,
                term TEXT NOT NULL,
                definition TEXT NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY (set_id) REFERENCES flashcard_sets(id)
            )",
            [],
        )?;

        Ok(())
    }

    // ---- Flashcard sets ----

    pub fn list_sets(&self) -> Result<Vec<FlashcardSet>> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt = conn.prepare(
            "SELECT id, user_id, title, description, created_at, updated_at
             FROM flashcard_sets",
        )?;

        let sets = stmt
            .query_map([], row_to_set)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(sets)
    }

    pub fn get_set(&self, set_id: &Uuid) -> Result<Option<FlashcardSet>> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt = conn.prepare(
            "SELECT id, user_id, title, description, created_at, updated_at
             FROM flashcard_sets WHERE id = ?1",
        )?;

        match stmt.query_row(params![set_id.to_string()], row_to_set) {
            Ok(set) => Ok(Some(set)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn create_set(
        &self,
        user_id: &Uuid,
        title: &str,
        description: Option<&str>,
    ) -> Result<FlashcardSet> {
        let now = Utc::now().to_rfc3339();
        let set = FlashcardSet {
            id: Uuid::new_v4(),
            user_id: *user_id,
            title: title.to_string(),
            description: description.map(|d| d.to_string()),
            created_at: now.clone(),
            updated_at: now,
        };

        let conn = Connection::open(&self.db_path)?;
        conn.execute(
            "INSERT INTO flashcard_sets (id, user_id, title, description, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                set.id.to_string(),
                set.user_id.to_string(),
                set.title,
                set.description,
                set.created_at,
                set.updated_at,
            ],
        )
        .context("Failed to insert flashcard set")?;

        info!("📚 Created flashcard set: {} ({})", set.title, set.id);

        Ok(set)
    }

    /// Partial update. `None` fields are left unchanged; `updated_at` always
    /// reflects the mutation.
    pub fn update_set(
        &self,
        set_id: &Uuid,
        title: Option<&str>,
        description: Option<&str>,
    ) -> Result<FlashcardSet> {
        let existing = self
            .get_set(set_id)?
            .context("Flashcard set missing during update")?;

        let title = title.unwrap_or(&existing.title);
        let description = description.or(existing.description.as_deref());
        let updated_at = Utc::now().to_rfc3339();

        let conn = Connection::open(&self.db_path)?;
        conn.execute(
            "UPDATE flashcard_sets SET title = ?1, description = ?2, updated_at = ?3 WHERE id = ?4",
            params![title, description, updated_at, set_id.to_string()],
        )?;

        self.get_set(set_id)?
            .context("Flashcard set missing after update")
    }

    pub fn delete_set(&self, set_id: &Uuid) -> Result<()> {
        let conn = Connection::open(&self.db_path)?;
        conn.execute(
            "DELETE FROM flashcard_sets WHERE id = ?1",
            params![set_id.to_string()],
        )?;

        info!("🗑️  Deleted flashcard set: {}", set_id);
        Ok(())
    }

    // ---- Flashcards ----

    pub fn list_cards(&self) -> Result<Vec<Flashcard>> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt = conn.prepare(
            "SELECT id, set_id, term, definition, created_at FROM flashcards",
        )?;

        let cards = stmt
            .query_map([], row_to_card)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(cards)
    }

    pub fn cards_by_set(&self, set_id: &Uuid) -> Result<Vec<Flashcard>> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt = conn.prepare(
            "SELECT id, set_id, term, definition, created_at
             FROM flashcards WHERE set_id = ?1",
        )?;

        let cards = stmt
            .query_map(params![set_id.to_string()], row_to_card)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(cards)
    }

    pub fn get_card(&self, card_id: &Uuid) -> Result<Option<Flashcard>> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt = conn.prepare(
            "SELECT id, set_id, term, definition, created_at
             FROM flashcards WHERE id = ?1",
        )?;

        match stmt.query_row(params![card_id.to_string()], row_to_card) {
            Ok(card) => Ok(Some(card)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn create_card(&self, set_id: &Uuid, term: &str, definition: &str) -> Result<Flashcard> {
        let card = Flashcard {
            id: Uuid::new_v4(),
            set_id: *set_id,
            term: term.to_string(),
            definition: definition.to_string(),
            created_at: Utc::now().to_rfc3339(),
        };

        let conn = Connection::open(&self.db_path)?;
        conn.execute(
            "INSERT INTO flashcards (id, set_id, term, definition, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                card.id.to_string(),
                card.set_id.to_string(),
                card.term,
                card.definition,
                card.created_at,
            ],
        )
        .context("Failed to insert flashcard")?;

        Ok(card)
    }

    pub fn update_card(
        &self,
        card_id: &Uuid,
        term: Option<&str>,
        definition: Option<&str>,
    ) -> Result<Flashcard> {
        let existing = self
            .get_card(card_id)?
            .context("Flashcard missing during update")?;

        let term = term.unwrap_or(&existing.term);
        let definition = definition.unwrap_or(&existing.definition);

        let conn = Connection::open(&self.db_path)?;
        conn.execute(
            "UPDATE flashcards SET term = ?1, definition = ?2 WHERE id = ?3",
            params![term, definition, card_id.to_string()],
        )?;

        self.get_card(card_id)?
            .context("Flashcard missing after update")
    }

    pub fn delete_card(&self, card_id: &Uuid) -> Result<()> {
        let conn = Connection::open(&self.db_path)?;
        conn.execute(
            "DELETE FROM flashcards WHERE id = ?1",
            params![card_id.to_string()],
        )?;

        Ok(())
    }
}

fn row_to_set(row: &rusqlite::Row<'_>) -> rusqlite::Result<FlashcardSet> {
    let id_str: String = row.get(0)?;
    let user_id_str: String = row.get(1)?;
    Ok(FlashcardSet {
        id: Uuid::parse_str(&id_str).unwrap_or_default(),
        user_id: Uuid::parse_str(&user_id_str).unwrap_or_default(),
        title: row.get(2)?,
        description: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

fn row_to_card(row: &rusqlite::Row<'_>) -> rusqlite::Result<Flashcard> {
    let id_str: String = row.get(0)?;
    let set_id_str: String = row.get(1)?;
    Ok(Flashcard {
        id: Uuid::parse_str(&id_str).unwrap_or_default(),
        set_id: Uuid::parse_str(&set_id_str).unwrap_or_default(),
        term: row.get(2)?,
        definition: row.get(3)?,
        created_at: row.get(4)?,
    })
}
