use super::*;

#[test]
fn plant_spends_energy_and_seeds_tile() {
    let content = test_content();
    let mut state = test_state(&content);
    state.ledger.energy = 10.0;
    let tile = open_tile(&state, 0);

    let events = use_tool(&mut state, &content, Tool::Plant, tile);

    let planted = &state.tiles[tile];
    assert!(planted.planted);
    assert!((planted.growth - 0.1).abs() < 1e-6);
    assert!((planted.health - 100.0).abs() < 1e-6);
    assert!((state.ledger.energy - 5.0).abs() < 1e-6);
    // Day 1 picks the second crop of the rotation.
    assert_eq!(planted.crop, Some(CropId("wheat".to_string())));
    assert!(has_event(&events, |e| matches!(e, Event::Planted { .. })));
}

#[test]
fn plant_without_energy_is_silent() {
    let content = test_content();
    let mut state = test_state(&content);
    state.ledger.energy = 4.0;
    let tile = open_tile(&state, 0);

    let events = use_tool(&mut state, &content, Tool::Plant, tile);

    assert!(!state.tiles[tile].planted);
    assert!((state.ledger.energy - 4.0).abs() < 1e-6);
    assert!(!has_event(&events, |e| matches!(e, Event::ActionRejected { .. })));
}

#[test]
fn smart_watering_pays_bonus_and_unlocks_data_driven() {
    let content = test_content();
    let mut state = test_state(&content);
    state.environment.soil_moisture = 30.0;
    state.ledger.water = 50.0;
    let tile = planted_tile(&mut state, 0);
    let money_before = state.ledger.money;

    let events = use_tool(&mut state, &content, Tool::Water, tile);

    assert!(state.tiles[tile].watered);
    assert!((state.ledger.water - 40.0).abs() < 1e-6);
    assert!(state.ledger.has_achievement(achievement::DATA_DRIVEN));
    let reward = content.achievement(achievement::DATA_DRIVEN).unwrap().reward;
    assert_eq!(state.ledger.money, money_before + 10 + reward);

    let watered = events
        .iter()
        .find(|e| matches!(e.event, Event::Watered { .. }))
        .unwrap();
    let note = notification(&watered.event).unwrap();
    assert_eq!(note.level, NoticeLevel::Success);
}

#[test]
fn plain_watering_pays_nothing() {
    let content = test_content();
    let mut state = test_state(&content);
    let tile = planted_tile(&mut state, 0);
    let money_before = state.ledger.money;

    use_tool(&mut state, &content, Tool::Water, tile);

    assert!(state.tiles[tile].watered);
    assert_eq!(state.ledger.money, money_before);
    assert!(!state.ledger.has_achievement(achievement::DATA_DRIVEN));
}

#[test]
fn watering_twice_only_charges_once() {
    let content = test_content();
    let mut state = test_state(&content);
    let tile = planted_tile(&mut state, 0);

    use_tool(&mut state, &content, Tool::Water, tile);
    use_tool(&mut state, &content, Tool::Water, tile);

    assert!((state.ledger.water - 90.0).abs() < 1e-6);
}

#[test]
fn fertilize_costs_base_plus_surcharge() {
    let content = test_content();
    let mut state = test_state(&content);
    state.environment.ndvi = 0.4;
    let tile = planted_tile(&mut state, 0);
    let money_before = state.ledger.money;

    let events = use_tool(&mut state, &content, Tool::Fertilize, tile);

    assert!(state.tiles[tile].fertilized);
    assert!((state.ledger.energy - 90.0).abs() < 1e-6);
    let reward = content.achievement(achievement::DATA_DRIVEN).unwrap().reward;
    assert_eq!(state.ledger.money, money_before + 15 + reward);
    assert!(has_event(&events, |e| matches!(e, Event::Fertilized { bonus: 15, .. })));
}

#[test]
fn harvest_resets_tile_and_pays_out() {
    let content = test_content();
    let mut state = test_state(&content);
    let tile = planted_tile(&mut state, 0);
    state.tiles[tile].growth = MAX_GROWTH;
    state.tiles[tile].watered = true;
    let money_before = state.ledger.money;

    let events = use_tool(&mut state, &content, Tool::Harvest, tile);

    let soil = state.tiles[tile].soil;
    assert_eq!(state.tiles[tile], Tile::new(soil, false));
    assert!((state.ledger.energy - 95.0).abs() < 1e-6, "base cost, no surcharge");
    assert_eq!(state.ledger.xp, 25);
    let reward = content.achievement(achievement::FIRST_HARVEST).unwrap().reward;
    assert_eq!(state.ledger.money, money_before + 50 + reward);
    assert!(has_event(&events, |e| matches!(
        e,
        Event::Harvested { money: 50, xp: 25, .. }
    )));
}

#[test]
fn harvest_bonuses_for_fertilizer_ndvi_and_clay() {
    let content = test_content();
    let mut state = test_state(&content);
    state.environment.ndvi = 0.8;
    let tile = planted_tile(&mut state, 0);
    state.tiles[tile].soil = SoilType::Clay;
    state.tiles[tile].fertilized = true;
    state.tiles[tile].growth = MAX_GROWTH;

    let events = use_tool(&mut state, &content, Tool::Harvest, tile);

    // round(50 * 1.2 + 20 + 30) = 110
    assert!(has_event(&events, |e| matches!(e, Event::Harvested { money: 110, .. })));
}

#[test]
fn harvest_before_maturity_is_silent() {
    let content = test_content();
    let mut state = test_state(&content);
    let tile = planted_tile(&mut state, 0);
    state.tiles[tile].growth = 3.99;

    let events = use_tool(&mut state, &content, Tool::Harvest, tile);

    assert!(state.tiles[tile].planted);
    assert_eq!(state.ledger.xp, 0);
    assert!(!has_event(&events, |e| matches!(e, Event::Harvested { .. })));
}

#[test]
fn fourth_harvest_levels_up() {
    let content = test_content();
    let mut state = test_state(&content);
    let mut events = Vec::new();
    for n in 0..4 {
        let tile = planted_tile(&mut state, n);
        state.tiles[tile].growth = MAX_GROWTH;
        events.extend(use_tool(&mut state, &content, Tool::Harvest, tile));
    }
    assert_eq!(state.ledger.xp, 100);
    assert_eq!(state.ledger.level, 2);
    assert_eq!(count_events(&events, |e| matches!(e, Event::LevelUp { level: 2 })), 1);
}

#[test]
fn locked_tile_warns_unless_expanding() {
    let content = test_content();
    let mut state = test_state(&content);
    let locked = state.tiles.iter().position(|t| t.locked).unwrap();

    let events = use_tool(&mut state, &content, Tool::Plant, locked);

    assert!(!state.tiles[locked].planted);
    assert!(has_event(&events, |e| matches!(
        e,
        Event::ActionRejected {
            reason: RejectReason::TileLocked
        }
    )));
}

#[test]
fn locked_check_precedes_missing_tool() {
    let content = test_content();
    let mut state = test_state(&content);
    let locked = state.tiles.iter().position(|t| t.locked).unwrap();

    let events = run(&mut state, &content, Command::Interact { tile: locked });

    assert!(has_event(&events, |e| matches!(
        e,
        Event::ActionRejected {
            reason: RejectReason::TileLocked
        }
    )));
}

#[test]
fn missing_tool_warns() {
    let content = test_content();
    let mut state = test_state(&content);
    let tile = open_tile(&state, 0);

    let events = run(&mut state, &content, Command::Interact { tile });

    let rejected = events
        .iter()
        .find(|e| matches!(e.event, Event::ActionRejected { .. }))
        .unwrap();
    assert_eq!(
        notification(&rejected.event).unwrap().message,
        "Please select a tool from the side panel first."
    );
}

#[test]
fn out_of_range_tile_is_ignored() {
    let content = test_content();
    let mut state = test_state(&content);
    let before = state.clone();

    let events = use_tool(&mut state, &content, Tool::Plant, 10_000);

    assert_eq!(events.len(), 1, "only the tool selection");
    assert_eq!(state.tiles, before.tiles);
}

#[test]
fn expand_unlocks_and_charges() {
    let content = test_content();
    let mut state = test_state(&content);
    state.ledger.money = 200;
    let locked = state.tiles.iter().position(|t| t.locked).unwrap();

    use_tool(&mut state, &content, Tool::Expand, locked);

    assert!(!state.tiles[locked].locked);
    let reward = content.achievement(achievement::FARM_EXPANSION).unwrap().reward;
    assert_eq!(state.ledger.money, 200 - 150 + reward);
}

#[test]
fn expand_without_money_warns() {
    let content = test_content();
    let mut state = test_state(&content);
    state.ledger.money = 149;
    let locked = state.tiles.iter().position(|t| t.locked).unwrap();

    let events = use_tool(&mut state, &content, Tool::Expand, locked);

    assert!(state.tiles[locked].locked);
    assert_eq!(state.ledger.money, 149);
    assert!(has_event(&events, |e| matches!(
        e,
        Event::ActionRejected {
            reason: RejectReason::ExpansionUnaffordable { cost: 150 }
        }
    )));
}

#[test]
fn expand_on_open_tile_is_silent() {
    let content = test_content();
    let mut state = test_state(&content);
    let tile = open_tile(&state, 0);

    let events = use_tool(&mut state, &content, Tool::Expand, tile);

    assert_eq!(state.ledger.money, 100);
    assert_eq!(events.len(), 1);
}

#[test]
fn inspect_reports_without_mutating() {
    let content = test_content();
    let mut state = test_state(&content);
    let tile = planted_tile(&mut state, 0);
    let before = state.tiles.clone();
    let ledger_money = state.ledger.money;

    let events = use_tool(&mut state, &content, Tool::Inspect, tile);

    assert_eq!(state.tiles, before);
    assert_eq!(state.ledger.money, ledger_money);
    let report = events
        .iter()
        .find_map(|e| match &e.event {
            Event::TileInspected { report } => Some(report.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(report.crop_name.as_deref(), Some("Wheat"));
    assert_eq!(report.optimal_temp, Some((20.0, 25.0)));
    assert!(report.temperature_optimal);
    assert!(report.moisture_optimal);
}

#[test]
fn achievements_never_duplicate() {
    let content = test_content();
    let mut state = test_state(&content);
    state.environment.soil_moisture = 20.0;
    let mut events = Vec::new();
    for n in 0..5 {
        let tile = open_tile(&state, n);
        events.extend(use_tool(&mut state, &content, Tool::Plant, tile));
        events.extend(use_tool(&mut state, &content, Tool::Water, tile));
    }

    let ids: Vec<_> = state.ledger.achievements.iter().map(|a| a.0.as_str()).collect();
    assert_eq!(ids, [achievement::FIRST_PLANT, achievement::DATA_DRIVEN]);
    assert_eq!(
        count_events(&events, |e| matches!(e, Event::AchievementUnlocked { .. })),
        2
    );
}
