mod common;

use gain_rpg::models::{CreateInventoryItem, ItemEffects, ItemType, Reps};
use gain_rpg::services::{GameError, InventoryService, SummaryService};
use pretty_assertions::assert_eq;

use common::{date, TestDatabase};

fn item(name: &str, item_type: ItemType, effects: ItemEffects) -> CreateInventoryItem {
    CreateInventoryItem {
        name: name.to_string(),
        item_type,
        effects,
    }
}

#[tokio::test]
async fn test_equipped_effects_change_combat_stats() {
    let db = TestDatabase::new().await;
    let inventory = InventoryService::new(db.pool.clone());

    let sword = inventory
        .add_item(item("Sword", ItemType::Weapon, ItemEffects { attack: 2, ..Default::default() }))
        .await
        .unwrap();
    let shield = inventory
        .add_item(item("Shield", ItemType::Armour, ItemEffects { guard: 1, ..Default::default() }))
        .await
        .unwrap();
    let ring = inventory
        .add_item(item("Ring", ItemType::Trinket, ItemEffects { grit_bonus: 2, ..Default::default() }))
        .await
        .unwrap();

    for id in [sword.id, shield.id, ring.id] {
        inventory.equip_item(id).await.unwrap();
    }

    let snapshot = SummaryService::new(db.pool.clone())
        .progress_snapshot(date(2026, 2, 21))
        .await
        .unwrap();
    assert_eq!(snapshot.combat_stats.attack, 4);
    assert_eq!(snapshot.combat_stats.guard, 2);
    assert_eq!(snapshot.combat_stats.grit_bonus, 2);
}

#[tokio::test]
async fn test_equip_toggle_single_per_type() {
    let db = TestDatabase::new().await;
    let inventory = InventoryService::new(db.pool.clone());

    let first = inventory
        .add_item(item("Sword A", ItemType::Weapon, ItemEffects { attack: 1, ..Default::default() }))
        .await
        .unwrap();
    let second = inventory
        .add_item(item("Sword B", ItemType::Weapon, ItemEffects { attack: 2, ..Default::default() }))
        .await
        .unwrap();
    let charm = inventory
        .add_item(item("Charm", ItemType::Trinket, ItemEffects::default()))
        .await
        .unwrap();

    inventory.equip_item(first.id).await.unwrap();
    inventory.equip_item(charm.id).await.unwrap();
    inventory.equip_item(second.id).await.unwrap();

    let items = inventory.list_items().await.unwrap();
    let equipped_weapons: Vec<_> = items
        .iter()
        .filter(|i| i.item_type == ItemType::Weapon && i.equipped)
        .map(|i| i.name.as_str())
        .collect();
    assert_eq!(equipped_weapons, vec!["Sword B"]);
    assert!(items.iter().any(|i| i.name == "Charm" && i.equipped));
    assert_eq!(inventory.combat_stats().await.unwrap().attack, 4);
}

#[tokio::test]
async fn test_unknown_item_is_not_found() {
    let db = TestDatabase::new().await;
    let inventory = InventoryService::new(db.pool.clone());

    let err = inventory.equip_item(42).await.unwrap_err();
    assert_eq!(err.downcast_ref::<GameError>(), Some(&GameError::ItemNotFound(42)));

    let err = inventory
        .add_item(item("   ", ItemType::Weapon, ItemEffects::default()))
        .await
        .unwrap_err();
    assert!(matches!(err.downcast_ref::<GameError>(), Some(GameError::Validation(_))));
}

#[tokio::test]
async fn test_grit_bonus_raises_lock_in_cap() {
    let db = TestDatabase::new().await;
    let ctx = db.job_context();
    let inventory = InventoryService::new(db.pool.clone());

    let ring = inventory
        .add_item(item("Ring", ItemType::Trinket, ItemEffects { grit_bonus: 2, ..Default::default() }))
        .await
        .unwrap();
    inventory.equip_item(ring.id).await.unwrap();

    let today = date(2026, 2, 21);
    ctx.workouts
        .save_reps(today, Reps::new(30, 0, 0, 0))
        .await
        .unwrap();
    let outcome = ctx.workouts.lock_in(today).await.unwrap();

    // 3 grit restored on top of 5/5, cap is 5 + 2
    assert_eq!(outcome.grit_restored, 3);
    assert_eq!(outcome.coins_from_overflow, 1);
    assert_eq!(ctx.players.get_player().await.unwrap().grit_current, 7);
}
