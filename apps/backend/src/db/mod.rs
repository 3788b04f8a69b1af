//! PostgreSQL database operations

use chrono::Utc;
use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;
use vocab_core::{select_for_quiz, QuizRequest, MASTERY_THRESHOLD};

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::services::import::WordCatalog;
use crate::services::refresh::DefinitionStore;

/// Database wrapper with connection pool
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect to PostgreSQL and create connection pool
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Run database migrations
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| ApiError::Migration(e.to_string()))?;
        Ok(())
    }

    /// Get the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Round-trip a trivial query to check the store is reachable
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    // === Word Repository ===

    /// Distinct group names, sorted
    pub async fn list_groups(&self) -> Result<Vec<String>> {
        let groups = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT group_name
            FROM words
            ORDER BY group_name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(groups)
    }

    /// List words, optionally filtered by a text substring and an exact group
    pub async fn list_words(&self, search: Option<&str>, group: Option<&str>) -> Result<Vec<DbWord>> {
        let pattern = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(like_pattern);

        let words = sqlx::query_as::<_, DbWord>(
            r#"
            SELECT *
            FROM words
            WHERE ($1::TEXT IS NULL OR text ILIKE $1)
              AND ($2::TEXT IS NULL OR group_name = $2)
            ORDER BY text
            "#,
        )
        .bind(pattern)
        .bind(group)
        .fetch_all(&self.pool)
        .await?;

        Ok(words)
    }

    /// Every word, in text order
    pub async fn all_words(&self) -> Result<Vec<DbWord>> {
        self.list_words(None, None).await
    }

    pub async fn get_word(&self, word_id: i64) -> Result<Option<DbWord>> {
        let word = sqlx::query_as::<_, DbWord>("SELECT * FROM words WHERE id = $1")
            .bind(word_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(word)
    }

    /// Insert a single word. Fails with a conflict if the text is taken.
    pub async fn create_word(&self, word: &NewWord) -> Result<DbWord> {
        let created = sqlx::query_as::<_, DbWord>(
            r#"
            INSERT INTO words (text, group_name, definition, synonyms)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (text) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(&word.text)
        .bind(&word.group)
        .bind(&word.definition)
        .bind(&word.synonyms)
        .fetch_optional(&self.pool)
        .await?;

        created.ok_or_else(|| ApiError::Conflict(format!("word '{}' already exists", word.text)))
    }

    /// Apply a partial edit. Absent fields keep their stored value.
    pub async fn update_word(
        &self,
        word_id: i64,
        definition: Option<String>,
        synonyms: Option<Vec<String>>,
        group: Option<String>,
    ) -> Result<Option<DbWord>> {
        let word = sqlx::query_as::<_, DbWord>(
            r#"
            UPDATE words
            SET definition = COALESCE($2, definition),
                synonyms = COALESCE($3, synonyms),
                group_name = COALESCE($4, group_name),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(word_id)
        .bind(definition)
        .bind(synonyms)
        .bind(group)
        .fetch_optional(&self.pool)
        .await?;

        Ok(word)
    }

    /// Replace a word's definition and synonyms with a fresh lookup
    pub async fn set_lexical_entry(&self, word_id: i64, entry: &LexicalEntry) -> Result<Option<DbWord>> {
        let word = sqlx::query_as::<_, DbWord>(
            r#"
            UPDATE words
            SET definition = $2, synonyms = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(word_id)
        .bind(&entry.definition)
        .bind(&entry.synonyms)
        .fetch_optional(&self.pool)
        .await?;

        Ok(word)
    }

    /// Delete a word; its answer events go with it
    pub async fn delete_word(&self, word_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM words WHERE id = $1")
            .bind(word_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_all_words(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM words").execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    /// Words missed at least once, unordered
    pub async fn words_to_review(&self) -> Result<Vec<DbWord>> {
        let words = sqlx::query_as::<_, DbWord>(
            r#"
            SELECT *
            FROM words
            WHERE incorrect_count > 0
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(words)
    }

    // === Flag Repository ===

    /// Flag words for definition review. Unknown ids are ignored.
    pub async fn flag_words(&self, word_ids: &[i64]) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE words
            SET flagged = TRUE, updated_at = NOW()
            WHERE id = ANY($1)
            "#,
        )
        .bind(word_ids)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn flagged_words(&self) -> Result<Vec<DbWord>> {
        let words = sqlx::query_as::<_, DbWord>(
            r#"
            SELECT *
            FROM words
            WHERE flagged
            ORDER BY text
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(words)
    }

    pub async fn resolve_flag(&self, word_id: i64) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE words
            SET flagged = FALSE, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(word_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    // === Quiz Repository ===

    /// Select words for a quiz, stamp them as tested and open a session.
    ///
    /// Returns the new session id and the served words in review order.
    pub async fn start_quiz(&self, request: &QuizRequest) -> Result<(Uuid, Vec<Word>)> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let candidates = sqlx::query_as::<_, DbWord>(
            r#"
            SELECT *
            FROM words
            WHERE group_name = ANY($1)
            "#,
        )
        .bind(request.groups())
        .fetch_all(&mut *tx)
        .await?;

        let mut selected = select_for_quiz(candidates.iter().map(DbWord::to_core_word), request);
        let ids: Vec<i64> = selected.iter().map(|w| w.id).collect();

        sqlx::query(
            r#"
            UPDATE words
            SET last_tested = $2
            WHERE id = ANY($1)
            "#,
        )
        .bind(&ids)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let total_words = i32::try_from(selected.len())
            .map_err(|_| ApiError::Internal(format!("quiz of {} words", selected.len())))?;

        let session_id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO quiz_sessions (id, started_at, groups, requested_count, total_words)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(session_id)
        .bind(now)
        .bind(request.groups())
        .bind(request.requested_count())
        .bind(total_words)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        for word in &mut selected {
            word.last_tested = Some(now);
        }
        Ok((session_id, selected))
    }

    /// Append an answer event and apply the counter rule in one transaction
    pub async fn record_answer(
        &self,
        word_id: i64,
        correct: bool,
        session_id: Option<Uuid>,
    ) -> Result<ReviewCounters> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let word = sqlx::query_as::<_, DbWord>("SELECT * FROM words WHERE id = $1 FOR UPDATE")
            .bind(word_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("word {word_id}")))?;

        if let Some(session_id) = session_id {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM quiz_sessions WHERE id = $1)")
                    .bind(session_id)
                    .fetch_one(&mut *tx)
                    .await?;
            if !exists {
                return Err(ApiError::NotFound(format!("session {session_id}")));
            }
        }

        sqlx::query(
            r#"
            INSERT INTO progress_events (id, word_id, session_id, is_correct, answered_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(word_id)
        .bind(session_id)
        .bind(correct)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let mut counters = word.counters();
        counters.record(correct, now);

        sqlx::query(
            r#"
            UPDATE words
            SET correct_count = $2,
                incorrect_count = $3,
                last_incorrect = $4,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(word_id)
        .bind(counters.correct_count as i32)
        .bind(counters.incorrect_count as i32)
        .bind(counters.last_incorrect)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(counters)
    }

    /// Close a session and count its correct answers.
    ///
    /// Completing an already closed session returns it unchanged.
    pub async fn complete_session(&self, session_id: Uuid) -> Result<DbQuizSession> {
        let mut tx = self.pool.begin().await?;

        let session = sqlx::query_as::<_, DbQuizSession>(
            "SELECT * FROM quiz_sessions WHERE id = $1 FOR UPDATE",
        )
        .bind(session_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("session {session_id}")))?;

        if session.ended_at.is_some() {
            return Ok(session);
        }

        let correct_words: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM progress_events
            WHERE session_id = $1 AND is_correct
            "#,
        )
        .bind(session_id)
        .fetch_one(&mut *tx)
        .await?;

        let session = sqlx::query_as::<_, DbQuizSession>(
            r#"
            UPDATE quiz_sessions
            SET ended_at = NOW(), correct_words = $2
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(session_id)
        .bind(correct_words as i32)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            "Completed session {}: {}/{} correct",
            session_id,
            correct_words,
            session.total_words
        );
        Ok(session)
    }

    // === Stats Repository ===

    pub async fn word_counts(&self) -> Result<WordCounts> {
        let counts = sqlx::query_as::<_, WordCounts>(
            r#"
            SELECT
                COUNT(*) AS total_words,
                COUNT(*) FILTER (WHERE incorrect_count > 0) AS words_to_review,
                COUNT(DISTINCT group_name) AS groups,
                COUNT(*) FILTER (WHERE correct_count >= $1) AS words_mastered
            FROM words
            "#,
        )
        .bind(MASTERY_THRESHOLD as i32)
        .fetch_one(&self.pool)
        .await?;

        Ok(counts)
    }

    /// Completed sessions, oldest completion first
    pub async fn completed_sessions(&self) -> Result<Vec<DbQuizSession>> {
        let sessions = sqlx::query_as::<_, DbQuizSession>(
            r#"
            SELECT *
            FROM quiz_sessions
            WHERE ended_at IS NOT NULL
            ORDER BY ended_at
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(sessions)
    }

    /// Zero every word's counters and clear the answer log.
    /// Sessions and last_tested stamps are kept.
    pub async fn reset_stats(&self) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM progress_events")
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            UPDATE words
            SET correct_count = 0,
                incorrect_count = 0,
                last_incorrect = NULL,
                updated_at = NOW()
            "#,
        )
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }
}

// === Import Catalog ===

impl WordCatalog for Database {
    async fn find_group(&self, text: &str) -> Result<Option<String>> {
        let group = sqlx::query_scalar::<_, String>("SELECT group_name FROM words WHERE text = $1")
            .bind(text)
            .fetch_optional(&self.pool)
            .await?;

        Ok(group)
    }

    async fn reassign_group(&self, text: &str, group: &str) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE words
            SET group_name = $2, updated_at = NOW()
            WHERE text = $1
            "#,
        )
        .bind(text)
        .bind(group)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn insert_words(&self, words: &[NewWord]) -> Result<u64> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;

        for word in words {
            let result = sqlx::query(
                r#"
                INSERT INTO words (text, group_name, definition, synonyms)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (text) DO NOTHING
                "#,
            )
            .bind(&word.text)
            .bind(&word.group)
            .bind(&word.definition)
            .bind(&word.synonyms)
            .execute(&mut *tx)
            .await?;
            inserted += result.rows_affected();
        }

        tx.commit().await?;
        Ok(inserted)
    }
}

impl DefinitionStore for Database {
    async fn store_entry(&self, word_id: i64, entry: &LexicalEntry) -> Result<bool> {
        Ok(self.set_lexical_entry(word_id, entry).await?.is_some())
    }
}

/// Substring pattern for ILIKE with the LIKE wildcards escaped
fn like_pattern(search: &str) -> String {
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');
    for c in search.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
