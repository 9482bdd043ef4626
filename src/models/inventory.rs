use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Weapon,
    Armour,
    Trinket,
}

/// Stat modifiers granted while an item is equipped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemEffects {
    pub attack: i64,
    pub guard: i64,
    pub grit_bonus: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InventoryItem {
    pub id: i64,
    pub name: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub item_type: ItemType,
    #[serde(skip_serializing)]
    pub effect_json: String,
    pub equipped: bool,
    pub acquired_at: DateTime<Utc>,
}

impl InventoryItem {
    pub fn effects(&self) -> ItemEffects {
        serde_json::from_str(&self.effect_json).unwrap_or_else(|e| {
            tracing::warn!("Item {} has unreadable effects, ignoring them: {}", self.id, e);
            ItemEffects::default()
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateInventoryItem {
    pub name: String,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    #[serde(default)]
    pub effects: ItemEffects,
}

#[derive(Debug, Clone, Serialize)]
pub struct InventoryItemView {
    #[serde(flatten)]
    pub item: InventoryItem,
    pub effects: ItemEffects,
}

impl From<InventoryItem> for InventoryItemView {
    fn from(item: InventoryItem) -> Self {
        let effects = item.effects();
        Self { item, effects }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatStats {
    pub attack: i64,
    pub guard: i64,
    pub grit_bonus: i64,
}

impl CombatStats {
    pub const BASE_ATTACK: i64 = 2;
    pub const BASE_GUARD: i64 = 1;

    /// Base stats for `level`, with equipped effects layered on top
    pub fn for_level<'a>(level: i64, equipped: impl IntoIterator<Item = &'a ItemEffects>) -> Self {
        let mut stats = Self {
            attack: Self::BASE_ATTACK + level / 2,
            guard: Self::BASE_GUARD,
            grit_bonus: 0,
        };
        for effects in equipped {
            stats.attack += effects.attack;
            stats.guard += effects.guard;
            stats.grit_bonus += effects.grit_bonus;
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combat_stats_layer_equipment() {
        let sword = ItemEffects { attack: 2, ..Default::default() };
        let ring = ItemEffects { grit_bonus: 2, ..Default::default() };
        let stats = CombatStats::for_level(1, [&sword, &ring]);
        assert_eq!(stats, CombatStats { attack: 4, guard: 1, grit_bonus: 2 });
    }

    #[test]
    fn test_attack_grows_every_other_level() {
        assert_eq!(CombatStats::for_level(1, &[] as &[ItemEffects]).attack, 2);
        assert_eq!(CombatStats::for_level(2, &[] as &[ItemEffects]).attack, 3);
        assert_eq!(CombatStats::for_level(5, &[] as &[ItemEffects]).attack, 4);
    }
}
