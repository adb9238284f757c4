//! Full save/load cycles through the persistence layer.

#![allow(clippy::unwrap_used)]

use kinship_db::{CheckpointOutcome, JsonFileSlot, MemorySlot, Persistence, SaveGateway, SaveSlot};
use kinship_store::{CanonicalStore, transitions};
use kinship_types::{
    ChildRecord, DateImmersionSaveState, GiftCategory, GiftProgressRecord, LifeStage, PairKey,
    PlayerId, PlayerProfileRecord, RelationshipState, SAVE_DATA_KEY, Season,
};

const A: PlayerId = PlayerId(101);
const B: PlayerId = PlayerId(202);

fn populated_store() -> CanonicalStore {
    let mut store = CanonicalStore::new();
    let key = PairKey::new(A, B);

    store
        .update_relationship(A, B, "seed", |r| {
            r.state = RelationshipState::Married;
            r.heart_points = 3600;
            r.married_day = Some(30);
            r.set_name(A, "Robin");
            r.set_name(B, "Leah");
            Ok::<_, ()>(())
        })
        .unwrap();
    store
        .update_pregnancy(A, B, "seed", |p| {
            transitions::request_try(p, B)?;
            transitions::accept_try(p, A)?;
            transitions::begin(p, B, 14, 31)
        })
        .unwrap();
    store.add_child(
        ChildRecord {
            name: String::from("Wren"),
            parent_a_id: A,
            parent_b_id: B,
            born_day: 20,
            age_days: 11,
            stage: LifeStage::Child,
            ..ChildRecord::default()
        },
        "seed",
    );
    store.upsert(
        key.clone(),
        DateImmersionSaveState {
            location_name: String::from("Beach"),
            start_time_of_day: 1800,
            start_day: 31,
            is_active: true,
            bonus_talk_count: 2,
            bonus_talk_points: 40,
            ..DateImmersionSaveState::for_key(&key)
        },
        "seed",
    );
    store
        .update::<GiftProgressRecord, _, (), _>(&key, "seed", |g| {
            let gift = transitions::GiftEvent {
                from: A,
                item_id: "Amethyst",
                category: GiftCategory::Favorite,
                day: 29,
            };
            transitions::record_gift(g, &gift, 10);
            Ok(())
        })
        .unwrap();
    store.upsert(
        B,
        PlayerProfileRecord {
            display_name: String::from("Leah"),
            birthday_season: Season::Winter,
            birthday_day: 23,
            favorite_gift_ids: vec![String::from("Salad")],
            ..PlayerProfileRecord::for_player(B)
        },
        "seed",
    );
    store.set_last_processed_day(31);
    store
}

#[test]
fn populated_store_round_trips_through_memory_slot() {
    let slot = MemorySlot::new();
    let mut persistence = Persistence::new(SaveGateway::new(slot.clone()));
    let mut store = populated_store();

    assert_eq!(persistence.checkpoint(&mut store), CheckpointOutcome::Written);
    let reloaded = persistence.load().unwrap();

    assert_eq!(reloaded.view(), store.view());
    assert_eq!(slot.write_count(), 1);
}

#[test]
fn populated_store_round_trips_through_file_slot() {
    let dir = tempfile::tempdir().unwrap();
    let slot = JsonFileSlot::open(dir.path()).unwrap();
    let mut persistence = Persistence::new(SaveGateway::new(slot));
    let mut store = populated_store();

    assert!(persistence.mark(&mut store, "save:manual", true).is_written());

    let reopened = JsonFileSlot::open(dir.path()).unwrap();
    let reloaded = SaveGateway::new(reopened).load().unwrap();
    assert_eq!(&reloaded, store.view());
}

#[test]
fn legacy_v1_entry_loads_as_current() {
    let legacy = r#"{
        "LastProcessedDay": 12,
        "Relationships": {
            "101_202": {
                "PairKey": "101_202",
                "PlayerAId": 101,
                "PlayerBId": 202,
                "State": "Dating",
                "PendingDatingFrom": -1,
                "PendingMarriageFrom": 202,
                "DatingStartDay": 4,
                "EngagedDay": -1,
                "MarriedDay": -1,
                "LastImmersiveDateDay": 12,
                "LastImmersiveDateConfirmedDay": -1,
                "HeartPoints": 1900
            }
        },
        "ActivePregnancies": {
            "101_202": {
                "CoupleKey": "101_202",
                "PlayerAOptIn": true,
                "PendingTryForBabyFrom": -1
            }
        }
    }"#;
    let slot = MemorySlot::with_entry(SAVE_DATA_KEY, legacy);
    let data = SaveGateway::new(slot).load().unwrap();

    assert_eq!(data.version, 3);
    assert_eq!(data.last_processed_day, 12);

    let key = PairKey::new(A, B);
    let relationship = data.relationships.get(&key).unwrap();
    assert_eq!(relationship.pending_dating_from, None);
    assert_eq!(relationship.pending_marriage_from, Some(B));
    assert_eq!(relationship.married_day, None);
    assert!(!relationship.can_start_immersive_date_today(12));

    let pregnancy = data.pregnancies.get(&key).unwrap();
    assert!(pregnancy.player_a_opt_in);
    assert_eq!(pregnancy.pending_try_for_baby_from, None);
}

#[test]
fn legacy_v2_entry_keeps_negative_player_ids() {
    let legacy = r#"{
        "Version": 2,
        "Relationships": {
            "-7000000000_202": {
                "PairKey": "-7000000000_202",
                "PlayerAId": -7000000000,
                "PlayerBId": 202,
                "State": "None",
                "PendingDatingFrom": -7000000000,
                "PendingMarriageFrom": -1
            }
        },
        "Pregnancies": {
            "-7000000000_202": {
                "CoupleKey": "-7000000000_202",
                "IsPregnant": true,
                "PregnantPlayerId": -7000000000,
                "PendingTryForBabyFrom": -1
            }
        }
    }"#;
    let slot = MemorySlot::with_entry(SAVE_DATA_KEY, legacy);
    let data = SaveGateway::new(slot).load().unwrap();

    let far = PlayerId(-7_000_000_000);
    let key = PairKey::new(far, B);
    let relationship = data.relationships.get(&key).unwrap();
    assert_eq!(relationship.pending_dating_from, Some(far));
    assert_eq!(relationship.pending_marriage_from, None);

    let pregnancy = data.pregnancies.get(&key).unwrap();
    assert_eq!(pregnancy.pregnant_player_id, Some(far));
    assert_eq!(pregnancy.pending_try_for_baby_from, None);
}

#[test]
fn future_entry_is_rejected_and_left_in_place() {
    let slot = MemorySlot::with_entry(SAVE_DATA_KEY, r#"{"Version": 99}"#);
    let gateway = SaveGateway::new(slot.clone());
    assert!(gateway.load().is_err());
    assert_eq!(
        slot.read(SAVE_DATA_KEY).unwrap().as_deref(),
        Some(r#"{"Version": 99}"#)
    );
}
