//! SQLite-backed world storage.
//!
//! Every record is stored as a JSON body keyed by `(world_id, id)`; queued
//! commands are keyed by owner and `turn_idx`. A commit writes the world row
//! and the batch inside one transaction, so a failed write leaves the
//! previous state intact.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::{Row, SqliteConnection, SqlitePool};
use warband_domain::{GeneralId, NationId, World, WorldId};

use crate::infrastructure::ports::{
    PersistBatch, RepoError, WorldRecords, WorldRepo, WorldStateRepo,
};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS worlds (
        id INTEGER PRIMARY KEY,
        body TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS generals (
        world_id INTEGER NOT NULL,
        id INTEGER NOT NULL,
        body TEXT NOT NULL,
        PRIMARY KEY (world_id, id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS cities (
        world_id INTEGER NOT NULL,
        id INTEGER NOT NULL,
        body TEXT NOT NULL,
        PRIMARY KEY (world_id, id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS nations (
        world_id INTEGER NOT NULL,
        id INTEGER NOT NULL,
        body TEXT NOT NULL,
        PRIMARY KEY (world_id, id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS troops (
        world_id INTEGER NOT NULL,
        id INTEGER NOT NULL,
        body TEXT NOT NULL,
        PRIMARY KEY (world_id, id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS diplomacies (
        world_id INTEGER NOT NULL,
        id INTEGER NOT NULL,
        body TEXT NOT NULL,
        PRIMARY KEY (world_id, id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS general_turns (
        world_id INTEGER NOT NULL,
        general_id INTEGER NOT NULL,
        turn_idx INTEGER NOT NULL,
        body TEXT NOT NULL,
        PRIMARY KEY (world_id, general_id, turn_idx)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS nation_turns (
        world_id INTEGER NOT NULL,
        nation_id INTEGER NOT NULL,
        officer_level INTEGER NOT NULL,
        turn_idx INTEGER NOT NULL,
        body TEXT NOT NULL,
        PRIMARY KEY (world_id, nation_id, officer_level, turn_idx)
    )
    "#,
];

/// SQLite implementation of the world ports.
pub struct SqliteWorldStore {
    pool: SqlitePool,
}

impl SqliteWorldStore {
    /// Open (creating if needed) the database at `url` and ensure the schema.
    pub async fn connect(url: &str) -> Result<Self, RepoError> {
        let pool = SqlitePool::connect(url)
            .await
            .map_err(|e| RepoError::database("connect", e))?;

        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&pool)
                .await
                .map_err(|e| RepoError::database("migrate", e))?;
        }

        tracing::info!(url = %url, "SQLite world store ready");
        Ok(Self { pool })
    }

    async fn load_bodies<T: DeserializeOwned>(
        &self,
        table: &'static str,
        order_by: &'static str,
        world_id: WorldId,
    ) -> Result<Vec<T>, RepoError> {
        let sql = format!("SELECT body FROM {table} WHERE world_id = ? ORDER BY {order_by}");
        let rows = sqlx::query(&sql)
            .bind(world_id.get())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepoError::database("load_world_state", e))?;
        rows.iter().map(decode_body).collect()
    }
}

fn decode_body<T: DeserializeOwned>(row: &sqlx::sqlite::SqliteRow) -> Result<T, RepoError> {
    let body: String = row
        .try_get("body")
        .map_err(|e| RepoError::database("decode_row", e))?;
    serde_json::from_str(&body).map_err(RepoError::serialization)
}

fn encode_body<T: Serialize>(value: &T) -> Result<String, RepoError> {
    serde_json::to_string(value).map_err(RepoError::serialization)
}

async fn upsert_rows<T, F>(
    conn: &mut SqliteConnection,
    table: &'static str,
    world_id: WorldId,
    rows: &[T],
    id_of: F,
) -> Result<(), RepoError>
where
    T: Serialize + Sync,
    F: Fn(&T) -> i64 + Send,
{
    if rows.is_empty() {
        return Ok(());
    }
    let sql = format!(
        "INSERT INTO {table} (world_id, id, body) VALUES (?, ?, ?) \
         ON CONFLICT(world_id, id) DO UPDATE SET body = excluded.body"
    );
    for row in rows {
        sqlx::query(&sql)
            .bind(world_id.get())
            .bind(id_of(row))
            .bind(encode_body(row)?)
            .execute(&mut *conn)
            .await
            .map_err(|e| RepoError::database("commit", e))?;
    }
    Ok(())
}

async fn delete_rows(
    conn: &mut SqliteConnection,
    table: &'static str,
    world_id: WorldId,
    ids: &[i64],
) -> Result<(), RepoError> {
    if ids.is_empty() {
        return Ok(());
    }
    let sql = format!("DELETE FROM {table} WHERE world_id = ? AND id = ?");
    for id in ids {
        sqlx::query(&sql)
            .bind(world_id.get())
            .bind(*id)
            .execute(&mut *conn)
            .await
            .map_err(|e| RepoError::database("commit", e))?;
    }
    Ok(())
}

const UPSERT_WORLD: &str = r#"
    INSERT INTO worlds (id, body) VALUES (?, ?)
    ON CONFLICT(id) DO UPDATE SET body = excluded.body
"#;

async fn upsert_world(
    conn: &mut SqliteConnection,
    world: &World,
    operation: &'static str,
) -> Result<(), RepoError> {
    sqlx::query(UPSERT_WORLD)
        .bind(world.id().get())
        .bind(encode_body(world)?)
        .execute(&mut *conn)
        .await
        .map_err(|e| RepoError::database(operation, e))?;
    Ok(())
}

fn raw_ids<K: Copy + Into<i64>>(ids: &[K]) -> Vec<i64> {
    ids.iter().map(|id| (*id).into()).collect()
}

#[async_trait]
impl WorldRepo for SqliteWorldStore {
    async fn get(&self, id: WorldId) -> Result<Option<World>, RepoError> {
        let row = sqlx::query("SELECT body FROM worlds WHERE id = ?")
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("get_world", e))?;
        row.as_ref().map(decode_body).transpose()
    }

    async fn save(&self, world: &World) -> Result<(), RepoError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| RepoError::database("save_world", e))?;
        upsert_world(&mut conn, world, "save_world").await
    }

    async fn list(&self) -> Result<Vec<World>, RepoError> {
        let rows = sqlx::query("SELECT body FROM worlds ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepoError::database("list_worlds", e))?;
        rows.iter().map(decode_body).collect()
    }
}

#[async_trait]
impl WorldStateRepo for SqliteWorldStore {
    async fn load(&self, world_id: WorldId) -> Result<WorldRecords, RepoError> {
        Ok(WorldRecords {
            generals: self.load_bodies("generals", "id", world_id).await?,
            cities: self.load_bodies("cities", "id", world_id).await?,
            nations: self.load_bodies("nations", "id", world_id).await?,
            troops: self.load_bodies("troops", "id", world_id).await?,
            diplomacies: self.load_bodies("diplomacies", "id", world_id).await?,
            general_turns: self
                .load_bodies("general_turns", "general_id, turn_idx", world_id)
                .await?,
            nation_turns: self
                .load_bodies("nation_turns", "nation_id, officer_level, turn_idx", world_id)
                .await?,
        })
    }

    async fn commit(&self, world: &World, batch: &PersistBatch) -> Result<(), RepoError> {
        let world_id = world.id();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepoError::database("commit", e))?;

        upsert_world(&mut tx, world, "commit").await?;

        upsert_rows(&mut tx, "generals", world_id, &batch.generals, |g| g.id.get()).await?;
        delete_rows(&mut tx, "generals", world_id, &raw_ids(&batch.deleted_generals)).await?;
        upsert_rows(&mut tx, "cities", world_id, &batch.cities, |c| c.id.get()).await?;
        delete_rows(&mut tx, "cities", world_id, &raw_ids(&batch.deleted_cities)).await?;
        upsert_rows(&mut tx, "nations", world_id, &batch.nations, |n| n.id.get()).await?;
        delete_rows(&mut tx, "nations", world_id, &raw_ids(&batch.deleted_nations)).await?;
        upsert_rows(&mut tx, "troops", world_id, &batch.troops, |t| t.id.get()).await?;
        delete_rows(&mut tx, "troops", world_id, &raw_ids(&batch.deleted_troops)).await?;
        upsert_rows(&mut tx, "diplomacies", world_id, &batch.diplomacies, |d| d.id.get()).await?;
        delete_rows(
            &mut tx,
            "diplomacies",
            world_id,
            &raw_ids(&batch.deleted_diplomacies),
        )
        .await?;

        for (general_id, queue) in &batch.general_queues {
            replace_general_queue(&mut tx, world_id, *general_id, queue).await?;
        }
        for (nation_id, queue) in &batch.nation_queues {
            replace_nation_queue(&mut tx, world_id, *nation_id, queue).await?;
        }

        tx.commit()
            .await
            .map_err(|e| RepoError::database("commit", e))?;
        Ok(())
    }
}

async fn replace_general_queue(
    conn: &mut SqliteConnection,
    world_id: WorldId,
    general_id: GeneralId,
    queue: &[warband_domain::GeneralTurn],
) -> Result<(), RepoError> {
    sqlx::query("DELETE FROM general_turns WHERE world_id = ? AND general_id = ?")
        .bind(world_id.get())
        .bind(general_id.get())
        .execute(&mut *conn)
        .await
        .map_err(|e| RepoError::database("commit", e))?;

    for turn in queue {
        sqlx::query(
            "INSERT INTO general_turns (world_id, general_id, turn_idx, body) VALUES (?, ?, ?, ?)",
        )
        .bind(world_id.get())
        .bind(general_id.get())
        .bind(turn.turn_idx)
        .bind(encode_body(turn)?)
        .execute(&mut *conn)
        .await
        .map_err(|e| RepoError::database("commit", e))?;
    }
    Ok(())
}

async fn replace_nation_queue(
    conn: &mut SqliteConnection,
    world_id: WorldId,
    nation_id: NationId,
    queue: &[warband_domain::NationTurn],
) -> Result<(), RepoError> {
    sqlx::query("DELETE FROM nation_turns WHERE world_id = ? AND nation_id = ?")
        .bind(world_id.get())
        .bind(nation_id.get())
        .execute(&mut *conn)
        .await
        .map_err(|e| RepoError::database("commit", e))?;

    for turn in queue {
        sqlx::query(
            "INSERT INTO nation_turns (world_id, nation_id, officer_level, turn_idx, body) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(world_id.get())
        .bind(nation_id.get())
        .bind(turn.officer_level)
        .bind(turn.turn_idx)
        .bind(encode_body(turn)?)
        .execute(&mut *conn)
        .await
        .map_err(|e| RepoError::database("commit", e))?;
    }
    Ok(())
}
