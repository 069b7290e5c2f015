use crate::error::AppError;
use crate::models::{Event, Rating, Slot, SlotRating, Vote};
use chrono::NaiveDateTime;
use nanoid::nanoid;
use sqlx::SqlitePool;

pub async fn init_schema(pool: &SqlitePool) -> Result<(), AppError> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS events (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            public_id TEXT NOT NULL UNIQUE,
            mod_key TEXT NOT NULL,
            name TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        );",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS event_slots (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            event_id INTEGER NOT NULL,
            slot TEXT NOT NULL,
            FOREIGN KEY (event_id) REFERENCES events (id) ON DELETE CASCADE,
            UNIQUE(event_id, slot)
        );",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS votes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            event_id INTEGER NOT NULL,
            voter_name TEXT NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            FOREIGN KEY (event_id) REFERENCES events (id) ON DELETE CASCADE
        );",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS vote_ratings (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            vote_id INTEGER NOT NULL,
            slot TEXT NOT NULL,
            rating TEXT NOT NULL,
            FOREIGN KEY (vote_id) REFERENCES votes (id) ON DELETE CASCADE,
            UNIQUE(vote_id, slot)
        );",
    )
    .execute(pool)
    .await?;

    Ok(())
}

#[derive(sqlx::FromRow)]
struct EventRow {
    id: i64,
    public_id: String,
    mod_key: String,
    name: String,
    description: String,
    created_at: NaiveDateTime,
}

fn parse_slot(text: &str) -> Result<Slot, AppError> {
    text.parse()
        .map_err(|e| AppError::DbError(sqlx::Error::Decode(Box::new(e))))
}

fn parse_rating(text: &str) -> Result<Rating, AppError> {
    text.parse()
        .map_err(|e| AppError::DbError(sqlx::Error::Decode(Box::new(e))))
}

/// Inserts the event and its candidate slots in one transaction. Slots
/// are deduped and stored in ascending order, the canonical form.
pub async fn create_event(
    pool: &SqlitePool,
    name: &str,
    description: &str,
    slots: &[Slot],
) -> Result<Event, AppError> {
    let mut slots: Vec<Slot> = slots.to_vec();
    slots.sort();
    slots.dedup();

    let public_id = nanoid!(10);
    let mod_key = nanoid!(16);

    let mut tx = pool.begin().await?;
    let row: EventRow = sqlx::query_as(
        "INSERT INTO events (public_id, mod_key, name, description) VALUES (?, ?, ?, ?) RETURNING *",
    )
    .bind(public_id)
    .bind(mod_key)
    .bind(name)
    .bind(description)
    .fetch_one(&mut *tx)
    .await?;

    for slot in &slots {
        sqlx::query("INSERT INTO event_slots (event_id, slot) VALUES (?, ?)")
            .bind(row.id)
            .bind(slot.key())
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;

    Ok(Event {
        id: row.id,
        public_id: row.public_id,
        mod_key: row.mod_key,
        name: row.name,
        description: row.description,
        slots,
        created_at: row.created_at,
    })
}

pub async fn find_event_by_public_id(
    pool: &SqlitePool,
    public_id: &str,
) -> Result<Option<Event>, AppError> {
    let row: Option<EventRow> = sqlx::query_as("SELECT * FROM events WHERE public_id = ?")
        .bind(public_id)
        .fetch_optional(pool)
        .await?;
    let Some(row) = row else {
        return Ok(None);
    };

    let slot_rows: Vec<(String,)> = sqlx::query_as("SELECT slot FROM event_slots WHERE event_id = ?")
        .bind(row.id)
        .fetch_all(pool)
        .await?;
    let mut slots = slot_rows
        .iter()
        .map(|(s,)| parse_slot(s))
        .collect::<Result<Vec<_>, _>>()?;
    // Sort here rather than in SQL: the key text orders ":10" before ":9".
    slots.sort();

    Ok(Some(Event {
        id: row.id,
        public_id: row.public_id,
        mod_key: row.mod_key,
        name: row.name,
        description: row.description,
        slots,
        created_at: row.created_at,
    }))
}

pub async fn add_vote(
    pool: &SqlitePool,
    event_id: i64,
    voter_name: &str,
    ratings: &[SlotRating],
) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;
    let vote_id = sqlx::query("INSERT INTO votes (event_id, voter_name) VALUES (?, ?)")
        .bind(event_id)
        .bind(voter_name)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

    for r in ratings {
        sqlx::query("INSERT INTO vote_ratings (vote_id, slot, rating) VALUES (?, ?, ?)")
            .bind(vote_id)
            .bind(r.slot.key())
            .bind(r.rating.as_str())
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;
    Ok(())
}

/// All votes for an event in submission order, each with its ratings.
pub async fn get_event_votes(pool: &SqlitePool, event_id: i64) -> Result<Vec<Vote>, AppError> {
    let vote_rows: Vec<(i64, String)> =
        sqlx::query_as("SELECT id, voter_name FROM votes WHERE event_id = ? ORDER BY id")
            .bind(event_id)
            .fetch_all(pool)
            .await?;

    let mut votes = Vec::with_capacity(vote_rows.len());
    for (vote_id, voter_name) in vote_rows {
        let rating_rows: Vec<(String, String)> =
            sqlx::query_as("SELECT slot, rating FROM vote_ratings WHERE vote_id = ? ORDER BY id")
                .bind(vote_id)
                .fetch_all(pool)
                .await?;
        let mut ratings = Vec::with_capacity(rating_rows.len());
        for (slot, rating) in &rating_rows {
            ratings.push(SlotRating {
                slot: parse_slot(slot)?,
                rating: parse_rating(rating)?,
            });
        }
        votes.push(Vote {
            voter_name,
            ratings,
        });
    }
    Ok(votes)
}
