//! Local SQLite store for users, their processor link, campaigns and
//! stored payment line items.
//!
//! Link fields live in `user_meta` as one row per key, so
//! `save_linked_account` wraps the three writes in a single transaction.
//! Uses WAL mode for concurrent read safety.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use rusqlite::{params, Connection};

use fundlink_common::constants::{META_ACCESS_TOKEN, META_ACCOUNT_ID, META_ACCOUNT_URI};
use fundlink_common::error::{FundlinkError, FundlinkResult};
use fundlink_common::traits::{CampaignStore, PaymentStore, UserStore};
use fundlink_common::types::*;

/// Local SQLite database handle.
pub struct FundlinkDb {
    conn: Mutex<Connection>,
}

fn db_err(e: rusqlite::Error) -> FundlinkError {
    FundlinkError::Database(e.to_string())
}

/// SQLite integers are signed; ids above `i64::MAX` are rejected, not wrapped.
fn sql_id(id: u64) -> FundlinkResult<i64> {
    i64::try_from(id).map_err(|_| FundlinkError::Database(format!("id {id} exceeds SQLite INTEGER range")))
}

fn id_from_sql(raw: i64) -> FundlinkResult<u64> {
    u64::try_from(raw).map_err(|_| FundlinkError::Database(format!("negative id {raw} in database")))
}

impl FundlinkDb {
    /// Open (or create) the database at `~/.fundlink/data/fundlink.db`.
    pub fn open() -> Result<Self> {
        let db_path = crate::workspace::resolve("data/fundlink.db")?;
        Self::open_at(&db_path)
    }

    /// Open (or create) the database at `db_path`.
    /// Enables WAL mode and creates tables if they don't exist.
    pub fn open_at(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create DB directory: {}", parent.display()))?;
        }

        let conn = Connection::open(db_path)
            .with_context(|| format!("Failed to open database: {}", db_path.display()))?;

        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;

        let db = Self { conn: Mutex::new(conn) };
        db.init_tables()?;
        Ok(db)
    }

    /// Open an in-memory database (for testing).
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn: Mutex::new(conn) };
        db.init_tables()?;
        Ok(db)
    }

    fn lock(&self) -> FundlinkResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| FundlinkError::Database("connection mutex poisoned".into()))
    }

    /// Create all tables and indices if they don't exist.
    fn init_tables(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY,
                email TEXT NOT NULL,
                nicename TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS user_meta (
                user_id INTEGER NOT NULL,
                meta_key TEXT NOT NULL,
                meta_value TEXT NOT NULL,
                updated_ms INTEGER NOT NULL,
                PRIMARY KEY (user_id, meta_key)
            );

            CREATE TABLE IF NOT EXISTS campaigns (
                id INTEGER PRIMARY KEY,
                author INTEGER NOT NULL,
                status TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_campaigns_author ON campaigns(author);

            CREATE TABLE IF NOT EXISTS payment_items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                payment_id INTEGER NOT NULL,
                position INTEGER NOT NULL,
                campaign_id INTEGER NOT NULL,
                UNIQUE (payment_id, position)
            );
            CREATE INDEX IF NOT EXISTS idx_payment_items_payment ON payment_items(payment_id);
            "
        ).context("Failed to initialize database tables")?;

        Ok(())
    }

    // ─── Users ──────────────────────────────────────────────────────

    /// Insert or replace a user record.
    pub fn upsert_user(&self, user: &UserProfile) -> FundlinkResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO users (id, email, nicename) VALUES (?1, ?2, ?3)",
            params![sql_id(user.id)?, user.email, user.nicename],
        )
        .map_err(db_err)?;
        Ok(())
    }

    /// Set one metadata field outside of any link write.
    pub fn set_user_meta(&self, user: UserId, key: &str, value: &str) -> FundlinkResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO user_meta (user_id, meta_key, meta_value, updated_ms)
             VALUES (?1, ?2, ?3, ?4)",
            params![sql_id(user)?, key, value, now_ms()],
        )
        .map_err(db_err)?;
        Ok(())
    }

    /// Remove one metadata field.
    #[cfg(test)]
    pub fn delete_user_meta(&self, user: UserId, key: &str) -> FundlinkResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "DELETE FROM user_meta WHERE user_id = ?1 AND meta_key = ?2",
            params![sql_id(user)?, key],
        )
        .map_err(db_err)?;
        Ok(())
    }

    /// Read one metadata field.
    pub fn user_meta(&self, user: UserId, key: &str) -> FundlinkResult<Option<String>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT meta_value FROM user_meta WHERE user_id = ?1 AND meta_key = ?2")
            .map_err(db_err)?;
        let result = stmt.query_row(params![sql_id(user)?, key], |row| row.get::<_, String>(0));
        match result {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(db_err(e)),
        }
    }

    // ─── Campaigns ──────────────────────────────────────────────────

    pub fn upsert_campaign(&self, campaign: &Campaign) -> FundlinkResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO campaigns (id, author, status) VALUES (?1, ?2, ?3)",
            params![sql_id(campaign.id)?, sql_id(campaign.author)?, campaign.status.as_str()],
        )
        .map_err(db_err)?;
        Ok(())
    }

    // ─── Payments ───────────────────────────────────────────────────

    /// Store the line items of a payment, replacing any previous set.
    /// Returns the number of rows written.
    pub fn insert_payment_items(&self, payment: PaymentId, items: &[CartItem]) -> FundlinkResult<usize> {
        let payment_id = sql_id(payment)?;
        let mut conn = self.lock()?;
        let tx = conn.transaction().map_err(db_err)?;

        tx.execute(
            "DELETE FROM payment_items WHERE payment_id = ?1",
            params![payment_id],
        )
        .map_err(db_err)?;

        let mut inserted = 0usize;
        {
            let mut stmt = tx
                .prepare_cached(
                    "INSERT INTO payment_items (payment_id, position, campaign_id) VALUES (?1, ?2, ?3)",
                )
                .map_err(db_err)?;
            for (position, item) in items.iter().enumerate() {
                inserted += stmt
                    .execute(params![payment_id, position as i64, sql_id(item.id)?])
                    .map_err(db_err)?;
            }
        }

        tx.commit().map_err(db_err)?;
        Ok(inserted)
    }
}

impl UserStore for FundlinkDb {
    fn linked_account(&self, user: UserId) -> FundlinkResult<Option<LinkedAccount>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT meta_key, meta_value FROM user_meta
                 WHERE user_id = ?1 AND meta_key IN (?2, ?3, ?4)",
            )
            .map_err(db_err)?;
        let rows = stmt
            .query_map(
                params![sql_id(user)?, META_ACCOUNT_ID, META_ACCESS_TOKEN, META_ACCOUNT_URI],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
            )
            .map_err(db_err)?;

        let mut account = LinkedAccount::default();
        let mut found = false;
        for row in rows {
            let (key, value) = row.map_err(db_err)?;
            found = true;
            match key.as_str() {
                META_ACCOUNT_ID => account.account_id = value,
                META_ACCESS_TOKEN => account.access_token = value,
                META_ACCOUNT_URI => account.account_uri = value,
                _ => {}
            }
        }

        Ok(found.then_some(account))
    }

    fn save_linked_account(&self, user: UserId, account: &LinkedAccount) -> FundlinkResult<()> {
        let user_id = sql_id(user)?;
        let mut conn = self.lock()?;
        let tx = conn.transaction().map_err(db_err)?;
        let now = now_ms();

        {
            let mut stmt = tx
                .prepare_cached(
                    "INSERT OR REPLACE INTO user_meta (user_id, meta_key, meta_value, updated_ms)
                     VALUES (?1, ?2, ?3, ?4)",
                )
                .map_err(db_err)?;

            for (key, value) in [
                (META_ACCOUNT_ID, &account.account_id),
                (META_ACCESS_TOKEN, &account.access_token),
                (META_ACCOUNT_URI, &account.account_uri),
            ] {
                stmt.execute(params![user_id, key, value, now])
                    .map_err(db_err)?;
            }
        }

        // Dropping `tx` without commit rolls all three writes back.
        tx.commit().map_err(db_err)?;
        Ok(())
    }

    fn profile(&self, user: UserId) -> FundlinkResult<Option<UserProfile>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT id, email, nicename FROM users WHERE id = ?1")
            .map_err(db_err)?;
        let result = stmt.query_row(params![sql_id(user)?], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        });
        let (id, email, nicename) = match result {
            Ok(r) => r,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(db_err(e)),
        };
        Ok(Some(UserProfile {
            id: id_from_sql(id)?,
            email,
            nicename,
        }))
    }
}

impl CampaignStore for FundlinkDb {
    fn campaign(&self, id: CampaignId) -> FundlinkResult<Option<Campaign>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT id, author, status FROM campaigns WHERE id = ?1")
            .map_err(db_err)?;
        let result = stmt.query_row(params![sql_id(id)?], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, String>(2)?,
            ))
        });
        let (id, author, status) = match result {
            Ok(r) => r,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(db_err(e)),
        };
        let status = status
            .parse::<CampaignStatus>()
            .map_err(FundlinkError::Database)?;
        Ok(Some(Campaign {
            id: id_from_sql(id)?,
            author: id_from_sql(author)?,
            status,
        }))
    }
}

impl PaymentStore for FundlinkDb {
    fn payment_items(&self, payment: PaymentId) -> FundlinkResult<Vec<CartItem>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT campaign_id FROM payment_items WHERE payment_id = ?1 ORDER BY position ASC",
            )
            .map_err(db_err)?;
        let rows = stmt
            .query_map(params![sql_id(payment)?], |row| row.get::<_, i64>(0))
            .map_err(db_err)?;

        let mut items = Vec::new();
        for row in rows {
            items.push(CartItem {
                id: id_from_sql(row.map_err(db_err)?)?,
            });
        }
        Ok(items)
    }
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
