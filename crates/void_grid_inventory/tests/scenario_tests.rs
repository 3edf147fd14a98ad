//! End-to-end inventory scenarios

use void_grid_inventory::*;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn test_first_fit_on_four_by_four_grid() {
    init_logging();
    let mut inv = GridInventory::with_config(InventoryConfig::grid(4, 4));

    let big = inv.store(Item::new(ItemId(1), 2, 2), 0, 0, true).unwrap();
    assert_eq!(big.location(), Some(Location::Grid { x: 0, y: 0 }));

    let blocked = inv.store(Item::new(ItemId(2), 1, 1), 1, 1, true).unwrap();
    assert!(matches!(blocked, InsertOutcome::Refused(ref item) if item.id == ItemId(2)));

    let small = inv.store(Item::new(ItemId(3), 1, 1), 2, 2, true).unwrap();
    assert!(small.is_success());

    // Row-major scan: row 0 still has room to the right of the 2x2
    let candidate = Item::new(ItemId(4), 1, 1);
    assert_eq!(inv.find_first_free_space(&candidate), Some((2, 0)));
    assert!(inv.slot_is_empty(0, 2));
    inv.verify_integrity().unwrap();
}

#[test]
fn test_swap_between_equipment_slots() {
    init_logging();
    let config = InventoryConfig::grid(4, 4)
        .with_slot(SlotConfig::new("main_hand"))
        .with_slot(SlotConfig::new("off_hand"));
    let mut inv = GridInventory::with_config(config);
    let events = EventCollector::new();
    inv.add_listener(events.clone());

    inv.equip(Item::new(ItemId(1), 1, 2), 0, true).unwrap();
    let equipped = inv.equip(Item::new(ItemId(2), 1, 2), 1, true).unwrap();
    assert_eq!(equipped.location(), Some(Location::Equipment(1)));

    let outcome = inv.swap_equip(ItemId(2), 0).unwrap();
    assert_eq!(
        outcome,
        SwapOutcome::Swapped {
            displaced: ItemId(1),
            to: Location::Equipment(1),
        }
    );
    assert_eq!(inv.location_of(ItemId(1)).unwrap(), Location::Equipment(1));
    assert_eq!(inv.location_of(ItemId(2)).unwrap(), Location::Equipment(0));

    assert_eq!(
        events.drain(),
        vec![
            InventoryEvent::Unequipped { item: ItemId(2), slot: 1 },
            InventoryEvent::Unequipped { item: ItemId(1), slot: 0 },
            InventoryEvent::Equipped { item: ItemId(2), slot: 0 },
            InventoryEvent::Equipped { item: ItemId(1), slot: 1 },
        ]
    );
    inv.verify_integrity().unwrap();
}

#[test]
fn test_potion_stack_overflow_returns_remainder() {
    init_logging();
    let mut inv = GridInventory::with_config(InventoryConfig::grid(4, 4));
    let events = EventCollector::new();
    inv.add_listener(events.clone());

    let a = Item::new(ItemId(1), 1, 1).with_stack("potion", 6, 10);
    inv.store(a, 0, 0, true).unwrap();

    let b = Item::new(ItemId(2), 1, 1).with_stack("potion", 7, 10);
    let outcome = inv.store(b, 0, 0, true).unwrap();

    let InsertOutcome::Stacked { into, moved, remainder } = outcome else {
        panic!("expected a merge");
    };
    assert_eq!(into, ItemId(1));
    assert_eq!(moved, 4);
    let remainder = remainder.unwrap();
    assert_eq!(remainder.stack_count, 3);
    assert_eq!(remainder.placement(), Placement::Unplaced);
    assert_eq!(inv.item(ItemId(1)).unwrap().stack_count, 10);
    assert!(!inv.contains(ItemId(2)));

    assert_eq!(
        events.events(),
        vec![InventoryEvent::StackMerged {
            item: ItemId(2),
            into: ItemId(1),
            moved: 4,
            consumed: false,
        }]
    );
}

#[test]
fn test_pickup_flow_with_equipment_and_stacks() {
    init_logging();
    let config = InventoryConfig::grid(3, 2)
        .with_slot(SlotConfig::new("weapon").with_kinds(["sword"]))
        .with_auto_equip_first(true);
    let mut inv = GridInventory::with_config(config);
    let events = EventCollector::new();
    inv.add_listener(events.clone());

    let sword = Item::new(ItemId(1), 1, 2).with_kind("sword");
    let outcome = inv.pickup(sword).unwrap();
    assert_eq!(outcome.location(), Some(Location::Equipment(0)));

    let arrows = Item::new(ItemId(2), 1, 1).with_stack("arrow", 15, 20);
    assert_eq!(inv.pickup(arrows).unwrap().location(), Some(Location::Grid { x: 0, y: 0 }));

    let more = Item::new(ItemId(3), 1, 1).with_stack("arrow", 5, 20);
    let merged = inv.pickup(more).unwrap();
    assert!(merged.is_success());
    assert_eq!(inv.item(ItemId(2)).unwrap().stack_count, 20);

    assert_eq!(
        events.drain(),
        vec![
            InventoryEvent::Stored {
                item: ItemId(1),
                location: Location::Equipment(0),
            },
            InventoryEvent::Equipped { item: ItemId(1), slot: 0 },
            InventoryEvent::Stored {
                item: ItemId(2),
                location: Location::Grid { x: 0, y: 0 },
            },
            InventoryEvent::StackMerged {
                item: ItemId(3),
                into: ItemId(2),
                moved: 5,
                consumed: true,
            },
        ]
    );

    let dropped = inv.drop_item(ItemId(1)).unwrap().unwrap();
    assert_eq!(dropped.id, ItemId(1));
    assert_eq!(
        events.drain(),
        vec![
            InventoryEvent::Unequipped { item: ItemId(1), slot: 0 },
            InventoryEvent::Removed { item: ItemId(1) },
        ]
    );
}

#[test]
fn test_socketing_through_store() {
    init_logging();
    let mut inv = GridInventory::with_config(InventoryConfig::grid(4, 4));
    inv.store(Item::new(ItemId(1), 1, 3).with_sockets(7, 2), 0, 0, true)
        .unwrap();

    let gem = Item::new(ItemId(2), 1, 1).with_socketable(7);
    let outcome = inv.store(gem, 0, 1, true).unwrap();
    assert!(matches!(outcome, InsertOutcome::Socketed { host, socket: 0 } if host == ItemId(1)));

    let host = inv.item(ItemId(1)).unwrap();
    assert_eq!(host.sockets.as_ref().unwrap().empty_count(), 1);
    assert!(!inv.contains(ItemId(2)));

    inv.set_allow_socketing(false);
    let other = Item::new(ItemId(3), 1, 1).with_socketable(7);
    assert!(matches!(inv.store(other, 0, 1, true).unwrap(), InsertOutcome::Refused(_)));
}

#[test]
fn test_config_from_toml_drives_inventory() {
    init_logging();
    let config = InventoryConfig::from_toml_str(
        r#"
        grid_width = 2
        grid_height = 2
        auto_equip_first = false

        [[equipment]]
        name = "ring"
        allowed_kinds = ["ring"]
        "#,
    )
    .unwrap();
    let mut inv = GridInventory::with_config(config);
    assert_eq!((inv.width(), inv.height()), (2, 2));
    assert_eq!(inv.equipment().len(), 1);

    let ring = Item::new(ItemId(1), 1, 1).with_kind("ring");
    assert_eq!(inv.pickup(ring).unwrap().location(), Some(Location::Grid { x: 0, y: 0 }));

    let filler = Item::new(ItemId(2), 2, 1);
    assert_eq!(inv.pickup(filler).unwrap().location(), Some(Location::Grid { x: 0, y: 1 }));

    let ring = Item::new(ItemId(3), 1, 1).with_kind("ring");
    assert_eq!(inv.pickup(ring).unwrap().location(), Some(Location::Grid { x: 1, y: 0 }));

    let ring = Item::new(ItemId(4), 1, 1).with_kind("ring");
    assert_eq!(inv.pickup(ring).unwrap().location(), Some(Location::Equipment(0)));
}
