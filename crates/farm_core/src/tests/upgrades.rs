use super::*;

fn buy(state: &mut GameState, content: &GameContent, id: &str) -> Vec<EventEnvelope> {
    run(
        state,
        content,
        Command::PurchaseUpgrade {
            upgrade: UpgradeId(id.to_string()),
        },
    )
}

fn rejection(events: &[EventEnvelope]) -> Option<RejectReason> {
    events.iter().find_map(|e| match &e.event {
        Event::ActionRejected { reason } => Some(reason.clone()),
        _ => None,
    })
}

#[test]
fn level_requirement_blocks_purchase() {
    let content = test_content();
    let mut state = test_state(&content);
    state.ledger.money = 1_000;

    let events = buy(&mut state, &content, "water_pump_1");

    assert_eq!(rejection(&events), Some(RejectReason::LevelTooLow { required: 2 }));
    assert_eq!(state.ledger.money, 1_000);
    assert!(state.ledger.upgrades.is_empty());
}

#[test]
fn unaffordable_upgrade_is_rejected() {
    let content = test_content();
    let mut state = test_state(&content);
    state.ledger.level = 2;
    state.ledger.money = 499;

    let events = buy(&mut state, &content, "water_pump_1");

    assert_eq!(rejection(&events), Some(RejectReason::UpgradeUnaffordable { cost: 500 }));
}

#[test]
fn unknown_upgrade_is_rejected() {
    let content = test_content();
    let mut state = test_state(&content);

    let events = buy(&mut state, &content, "golden_hoe");

    assert!(matches!(
        rejection(&events),
        Some(RejectReason::UnknownUpgrade { .. })
    ));
}

#[test]
fn water_pump_reduces_watering_cost() {
    let content = test_content();
    let mut state = test_state(&content);
    state.ledger.level = 2;
    state.ledger.money = 600;

    let events = buy(&mut state, &content, "water_pump_1");
    assert!(has_event(&events, |e| matches!(e, Event::UpgradePurchased { cost: 500, .. })));
    assert_eq!(state.ledger.money, 100);

    let tile = planted_tile(&mut state, 0);
    use_tool(&mut state, &content, Tool::Water, tile);
    assert!((state.ledger.water - 92.0).abs() < 1e-4);
}

#[test]
fn owned_upgrade_cannot_be_bought_twice() {
    let content = test_content();
    let mut state = test_state(&content);
    state.ledger.level = 2;
    state.ledger.money = 2_000;

    buy(&mut state, &content, "water_pump_1");
    let events = buy(&mut state, &content, "water_pump_1");

    assert!(matches!(rejection(&events), Some(RejectReason::UpgradeOwned { .. })));
    assert_eq!(state.ledger.money, 1_500);
    assert!((state.ledger.modifiers.water_cost - 0.8).abs() < 1e-6);
}

#[test]
fn tank_upgrade_replaces_capacity() {
    let content = test_content();
    let mut state = test_state(&content);
    state.ledger.money = 300;

    buy(&mut state, &content, "water_tank_1");

    assert!((state.ledger.max_water - 150.0).abs() < 1e-6);
    state.ledger.credit(Resource::Water, 500.0);
    assert!((state.ledger.water - 150.0).abs() < 1e-6);
}

#[test]
fn multipliers_feed_harvest_rewards() {
    let content = test_content();
    let mut state = test_state(&content);
    state.ledger.level = 3;
    state.ledger.money = 1_050;

    buy(&mut state, &content, "fertilizer_mix");
    buy(&mut state, &content, "almanac");
    assert_eq!(state.ledger.money, 0);

    let tile = planted_tile(&mut state, 0);
    state.tiles[tile].growth = MAX_GROWTH;
    let events = use_tool(&mut state, &content, Tool::Harvest, tile);

    // round(50 * 1.25) = 63 (62.5 rounds away from zero); round(25 * 1.5) = 38.
    assert!(has_event(&events, |e| matches!(
        e,
        Event::Harvested { money: 63, xp: 38, .. }
    )));
}
