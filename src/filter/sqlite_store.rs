use std::str::FromStr;

use async_trait::async_trait;
use log::info;
use sqlx::{
    Pool, Sqlite,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
};

use super::ignore_store::IgnoreStore;
use crate::{config::IgnoreStoreConfig, errors::ProofreadError};

/// An `IgnoreStore` persisted in SQLite so dismissed issues survive
/// restarts.
#[derive(Debug, Clone)]
pub struct SqliteIgnoreStore {
    pool: Pool<Sqlite>,
}

impl SqliteIgnoreStore {
    /// Open (or create) the database and bring its schema up to date.
    ///
    /// # Errors
    ///
    /// Fails if the database can't be opened or migrated.
    pub async fn try_new(config: &IgnoreStoreConfig) -> Result<Self, ProofreadError> {
        let connection_options = SqliteConnectOptions::from_str(&config.sqlite_url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);

        // In-memory databases live only as long as their connection
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(connection_options)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        info!("Opened ignore store at '{}'", config.sqlite_url);

        Ok(Self { pool })
    }
}

fn to_column(offset: usize) -> i64 { i64::try_from(offset).unwrap_or(i64::MAX) }

#[async_trait]
impl IgnoreStore for SqliteIgnoreStore {
    async fn get_spelling(&self, word: &str, document_id: &str) -> Result<bool, ProofreadError> {
        let count: i64 = sqlx::query_scalar(
            r"
            select count(*)
            from ignored_words
            where value = ? and document_id = ?
            ",
        )
        .bind(word)
        .bind(document_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
    }

    async fn put_spelling(&self, word: &str, document_id: &str) -> Result<(), ProofreadError> {
        sqlx::query(
            r"
            insert or ignore into ignored_words (value, document_id)
            values (?, ?)
            ",
        )
        .bind(word)
        .bind(document_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_grammar(
        &self,
        rule_id: &str,
        context_text: &str,
        context_offset: usize,
        document_id: &str,
    ) -> Result<bool, ProofreadError> {
        let count: i64 = sqlx::query_scalar(
            r"
            select count(*)
            from ignored_grammar_errors
            where rule_id = ?
                and context_text = ?
                and context_offset = ?
                and document_id = ?
            ",
        )
        .bind(rule_id)
        .bind(context_text)
        .bind(to_column(context_offset))
        .bind(document_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
    }

    async fn put_grammar(
        &self,
        rule_id: &str,
        context_text: &str,
        context_offset: usize,
        document_id: &str,
    ) -> Result<(), ProofreadError> {
        sqlx::query(
            r"
            insert or ignore into ignored_grammar_errors
                (rule_id, context_text, context_offset, document_id)
            values (?, ?, ?, ?)
            ",
        )
        .bind(rule_id)
        .bind(context_text)
        .bind(to_column(context_offset))
        .bind(document_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
