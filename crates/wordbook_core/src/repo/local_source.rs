//! Row-level access to the `words` table.
//!
//! # Responsibility
//! - Own every SQL statement touching `words`.
//! - Speak only in [`WordEntity`] rows; domain mapping happens one layer up.
//!
//! # Invariants
//! - Connections must be migrated to the latest schema before use.
//! - Writes report "no such row" as `Ok(false)`, never as an error.

use crate::db::migrations::latest_version;
use crate::repo::word_mapper::WordEntity;
use crate::repo::word_repo::{RepoError, RepoResult, WordFilter, WordSort};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

const WORD_SELECT_SQL: &str = "SELECT
    id,
    text,
    translations,
    examples,
    part_of_speech,
    notes,
    created_at,
    updated_at
FROM words";

const REQUIRED_WORD_COLUMNS: [&str; 8] = [
    "id",
    "text",
    "translations",
    "examples",
    "part_of_speech",
    "notes",
    "created_at",
    "updated_at",
];

/// Local persistence contract over flattened word rows.
pub trait WordLocalDataSource {
    /// Inserts a row. Returns `false` when the id is already taken.
    fn insert(&self, entity: &WordEntity) -> RepoResult<bool>;
    /// Overwrites a row by id, keeping the stored `created_at` and never
    /// moving `updated_at` below it. Returns `false` when no row matched.
    fn update(&self, entity: &WordEntity) -> RepoResult<bool>;
    fn get(&self, id: &str) -> RepoResult<Option<WordEntity>>;
    fn list(&self, filter: &WordFilter) -> RepoResult<Vec<WordEntity>>;
    /// Counts rows matching the filter, ignoring sort and pagination.
    fn count(&self, filter: &WordFilter) -> RepoResult<u64>;
    /// Returns `(part_of_speech, count)` pairs ordered by token.
    fn part_of_speech_counts(&self) -> RepoResult<Vec<(String, u64)>>;
    /// Deletes a row by id. Returns `false` when no row matched.
    fn delete(&self, id: &str) -> RepoResult<bool>;
}

/// SQLite-backed word data source.
pub struct SqliteWordDataSource<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteWordDataSource<'conn> {
    /// Constructs a data source from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_word_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl WordLocalDataSource for SqliteWordDataSource<'_> {
    fn insert(&self, entity: &WordEntity) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "INSERT INTO words (
                id,
                text,
                translations,
                examples,
                part_of_speech,
                notes,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(id) DO NOTHING;",
            params![
                entity.id.as_str(),
                entity.text.as_str(),
                entity.translations.as_str(),
                entity.examples.as_deref(),
                entity.part_of_speech.as_str(),
                entity.notes.as_deref(),
                entity.created_at,
                entity.updated_at,
            ],
        )?;
        Ok(changed == 1)
    }

    fn update(&self, entity: &WordEntity) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "UPDATE words
             SET
                text = ?1,
                translations = ?2,
                examples = ?3,
                part_of_speech = ?4,
                notes = ?5,
                updated_at = MAX(?6, created_at)
             WHERE id = ?7;",
            params![
                entity.text.as_str(),
                entity.translations.as_str(),
                entity.examples.as_deref(),
                entity.part_of_speech.as_str(),
                entity.notes.as_deref(),
                entity.updated_at,
                entity.id.as_str(),
            ],
        )?;
        Ok(changed > 0)
    }

    fn get(&self, id: &str) -> RepoResult<Option<WordEntity>> {
        let entity = self
            .conn
            .query_row(
                &format!("{WORD_SELECT_SQL} WHERE id = ?1;"),
                [id],
                parse_word_row,
            )
            .optional()?;
        Ok(entity)
    }

    fn list(&self, filter: &WordFilter) -> RepoResult<Vec<WordEntity>> {
        let mut sql = String::from(WORD_SELECT_SQL);
        let mut bind_values = push_filter_clauses(&mut sql, filter);

        match filter.sort {
            WordSort::Alphabetical => sql.push_str(" ORDER BY text COLLATE NOCASE ASC, id ASC"),
            WordSort::Newest => sql.push_str(" ORDER BY created_at DESC, id ASC"),
        }

        if let Some(limit) = filter.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if filter.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(filter.offset)));
            }
        } else if filter.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(filter.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(bind_values), parse_word_row)?;
        let entities = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(entities)
    }

    fn count(&self, filter: &WordFilter) -> RepoResult<u64> {
        let mut sql = String::from("SELECT COUNT(*) FROM words");
        let bind_values = push_filter_clauses(&mut sql, filter);
        let count: i64 = self
            .conn
            .query_row(&sql, params_from_iter(bind_values), |row| row.get(0))?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    fn part_of_speech_counts(&self) -> RepoResult<Vec<(String, u64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT part_of_speech, COUNT(*)
             FROM words
             GROUP BY part_of_speech
             ORDER BY part_of_speech ASC;",
        )?;
        let rows = stmt.query_map([], |row| {
            let token: String = row.get(0)?;
            let count: i64 = row.get(1)?;
            Ok((token, u64::try_from(count).unwrap_or(0)))
        })?;
        let counts = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(counts)
    }

    fn delete(&self, id: &str) -> RepoResult<bool> {
        let changed = self.conn.execute("DELETE FROM words WHERE id = ?1;", [id])?;
        Ok(changed > 0)
    }
}

/// Appends `WHERE` clauses for `filter` and returns their bind values.
fn push_filter_clauses(sql: &mut String, filter: &WordFilter) -> Vec<Value> {
    let mut bind_values = Vec::new();
    sql.push_str(" WHERE 1 = 1");

    if let Some(query) = filter.query.as_deref() {
        let pattern = format!("%{}%", escape_like(query));
        sql.push_str(
            " AND (text LIKE ? ESCAPE '\\'
                OR translations LIKE ? ESCAPE '\\'
                OR notes LIKE ? ESCAPE '\\')",
        );
        for _ in 0..3 {
            bind_values.push(Value::Text(pattern.clone()));
        }
    }

    if let Some(part_of_speech) = filter.part_of_speech {
        sql.push_str(" AND part_of_speech = ?");
        bind_values.push(Value::Text(part_of_speech.as_str().to_string()));
    }

    bind_values
}

fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn parse_word_row(row: &Row<'_>) -> rusqlite::Result<WordEntity> {
    Ok(WordEntity {
        id: row.get("id")?,
        text: row.get("text")?,
        translations: row.get("translations")?,
        examples: row.get("examples")?,
        part_of_speech: row.get("part_of_speech")?,
        notes: row.get("notes")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn ensure_word_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "words")? {
        return Err(RepoError::MissingRequiredTable("words"));
    }

    for column in REQUIRED_WORD_COLUMNS {
        if !table_has_column(conn, "words", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "words",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::escape_like;

    #[test]
    fn escape_like_escapes_wildcards_and_backslash() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }
}
