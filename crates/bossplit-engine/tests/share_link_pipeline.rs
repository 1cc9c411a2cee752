//! End-to-end pipeline: build a session, round-trip it through the
//! share-link codec, and verify the settlement is unchanged.

use bossplit_engine::{compute_settlement, SettlementOutcome};
use bossplit_types::{
    BossGroup, DistributionMethod, ItemValue, LootItem, Participant, SessionState, EPSILON,
};

fn owned(name: &str, price: f64, owner: &str) -> LootItem {
    LootItem {
        name: name.into(),
        owner: Some(owner.into()),
        value: ItemValue::Sellable { price: Some(price) },
    }
}

fn session() -> SessionState {
    let mut zakum = BossGroup::new("Zakum");
    zakum.participants = vec!["Alice".into(), "Bob".into(), "Cara".into()];
    zakum.fee_rate = 0.05;
    zakum.items.push(owned("Condensed Power Crystal", 300.0, "Alice"));
    let mut slot = LootItem::neso("NESO 1", 12.0);
    slot.owner = Some("Cara".into());
    zakum.items[0] = slot;

    let mut horntail = BossGroup::new("Horntail");
    horntail.participants = vec!["Alice".into(), "Bob".into()];
    horntail.method = DistributionMethod::Custom;
    horntail.custom_shares.insert("Alice".into(), 70.0);
    horntail.custom_shares.insert("Bob".into(), 30.0);
    horntail.fee_rate = 0.1;
    horntail.items.push(owned("Horntail Necklace", 500.0, "Bob"));

    SessionState {
        members: vec![
            Participant::new("Alice", "0xa"),
            Participant::new("Bob", "0xb"),
            Participant::new("Cara", "0xc"),
            Participant::new("Dan", "0xd"), // idle member, settles at zero
        ],
        groups: vec![zakum, horntail],
    }
}

#[test]
fn settlement_survives_share_link_round_trip() {
    let original = session();
    let token = bossplit_codec::encode_session(&original).unwrap();
    let restored = bossplit_codec::decode_session(&token).unwrap();
    assert_eq!(restored, original);

    let direct = compute_settlement(&original);
    let via_link = compute_settlement(&restored);
    assert_eq!(direct, via_link);

    let SettlementOutcome::Settled(report) = direct else {
        panic!("expected settled outcome");
    };
    // Full roster present, conservation holds.
    assert_eq!(report.balances.len(), 4);
    assert_eq!(report.balances["Dan"], 0.0);
    let total: f64 = report.balances.values().sum();
    assert!(total.abs() < EPSILON);

    // Applying the transfers zeroes everyone.
    let mut balances = report.balances.clone();
    for t in &report.transfers {
        *balances.get_mut(&t.from).unwrap() -= t.amount;
        *balances.get_mut(&t.to).unwrap() += t.amount;
    }
    assert!(balances.values().all(|b| b.abs() < 1e-6));
}

#[test]
fn corrupt_token_resets_to_starter_and_reports_no_data() {
    let state = bossplit_codec::decode_or_starter(Some("definitely--not--a--session"));
    assert_eq!(state, SessionState::starter());
    assert!(matches!(
        compute_settlement(&state),
        SettlementOutcome::NoData { .. }
    ));
}
