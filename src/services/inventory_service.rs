use anyhow::Result;
use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};

use crate::models::{CombatStats, CreateInventoryItem, InventoryItem};
use crate::services::player_service::fetch_player;
use crate::services::GameError;

const ITEM_COLUMNS: &str = "id, name, type, effect_json, equipped, acquired_at";

#[derive(Debug, Clone)]
pub struct InventoryService {
    db: SqlitePool,
}

impl InventoryService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn list_items(&self) -> Result<Vec<InventoryItem>> {
        let items = sqlx::query_as::<_, InventoryItem>(&format!(
            "SELECT {} FROM inventory_item ORDER BY id",
            ITEM_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(items)
    }

    pub async fn add_item(&self, item: CreateInventoryItem) -> Result<InventoryItem> {
        let name = item.name.trim();
        if name.is_empty() {
            return Err(GameError::Validation("Item name must not be empty".to_string()).into());
        }

        let effect_json = serde_json::to_string(&item.effects)?;
        let id = sqlx::query(
            "INSERT INTO inventory_item (name, type, effect_json, equipped, acquired_at)
             VALUES (?, ?, ?, 0, ?)",
        )
        .bind(name)
        .bind(item.item_type)
        .bind(effect_json)
        .bind(Utc::now())
        .execute(&self.db)
        .await?
        .last_insert_rowid();

        tracing::info!("Added {:?} {} to inventory", item.item_type, name);
        self.get_item(id).await?.ok_or_else(|| GameError::ItemNotFound(id).into())
    }

    pub async fn get_item(&self, item_id: i64) -> Result<Option<InventoryItem>> {
        let mut conn = self.db.acquire().await?;
        fetch_item(&mut conn, item_id).await
    }

    /// Equip an item, unequipping whatever else of the same type was worn.
    pub async fn equip_item(&self, item_id: i64) -> Result<InventoryItem> {
        let mut tx = self.db.begin().await?;

        let item = fetch_item(&mut tx, item_id)
            .await?
            .ok_or(GameError::ItemNotFound(item_id))?;

        sqlx::query("UPDATE inventory_item SET equipped = 0 WHERE type = ? AND id != ?")
            .bind(item.item_type)
            .bind(item_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("UPDATE inventory_item SET equipped = 1 WHERE id = ?")
            .bind(item_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!("Equipped {} ({:?})", item.name, item.item_type);
        Ok(InventoryItem { equipped: true, ..item })
    }

    pub async fn unequip_item(&self, item_id: i64) -> Result<InventoryItem> {
        let result = sqlx::query("UPDATE inventory_item SET equipped = 0 WHERE id = ?")
            .bind(item_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(GameError::ItemNotFound(item_id).into());
        }

        self.get_item(item_id)
            .await?
            .ok_or_else(|| GameError::ItemNotFound(item_id).into())
    }

    pub async fn combat_stats(&self) -> Result<CombatStats> {
        let mut conn = self.db.acquire().await?;
        combat_stats(&mut conn).await
    }
}

async fn fetch_item(conn: &mut SqliteConnection, item_id: i64) -> Result<Option<InventoryItem>> {
    let item = sqlx::query_as::<_, InventoryItem>(&format!(
        "SELECT {} FROM inventory_item WHERE id = ?",
        ITEM_COLUMNS
    ))
    .bind(item_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(item)
}

/// Player level plus equipped gear, read on the caller's connection.
pub(crate) async fn combat_stats(conn: &mut SqliteConnection) -> Result<CombatStats> {
    let player = fetch_player(conn).await?;

    let equipped = sqlx::query_as::<_, InventoryItem>(&format!(
        "SELECT {} FROM inventory_item WHERE equipped = 1",
        ITEM_COLUMNS
    ))
    .fetch_all(&mut *conn)
    .await?;

    let effects: Vec<_> = equipped.iter().map(InventoryItem::effects).collect();
    Ok(CombatStats::for_level(player.level, &effects))
}
