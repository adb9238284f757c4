//! Projection of canonical state into the peer-visible [`NetSnapshot`].
//!
//! Building a snapshot is pure: the same canonical view, live sessions, day,
//! and heart scale always produce the same snapshot, and nothing is mutated.
//!
//! | Canonical | Snapshot |
//! |-----------|----------|
//! | `RelationshipRecord` | `RelationshipPublic` (no pair key; adds `HeartLevel`, `DateAvailableToday`) |
//! | `PregnancyRecord` | `PregnancyPublic` (opt-ins folded into `BothOptedIn`) |
//! | `ChildRecord` | verbatim |
//! | `DateImmersionSaveState` | first active one as `DateImmersionPublicState` |
//! | live carry / holding hands | verbatim, active only |
//! | gift progress, synergy, profiles, holding-hands history | withheld |

use kinship_types::{
    DateImmersionPublicState, DateImmersionSaveState, HeartScale, NetSnapshot, PregnancyPublic,
    PregnancyRecord, RelationshipPublic, RelationshipRecord, RomanceSaveData,
};

use crate::live::LiveSessions;

/// Inputs to one snapshot build.
#[derive(Debug, Clone, Copy)]
pub struct SnapshotInputs<'a> {
    /// Canonical records.
    pub view: &'a RomanceSaveData,
    /// Running live sessions.
    pub live: &'a LiveSessions,
    /// Day the snapshot describes.
    pub day: u32,
    /// Heart level tunables.
    pub heart_scale: HeartScale,
    /// Free-text summary of the last day's work.
    pub last_work_report: &'a str,
}

/// Build the snapshot peers receive.
pub fn build(inputs: &SnapshotInputs<'_>) -> NetSnapshot {
    let SnapshotInputs {
        view,
        live,
        day,
        heart_scale,
        last_work_report,
    } = *inputs;

    NetSnapshot {
        day,
        relationships: view
            .relationships
            .values()
            .map(|r| relationship_public(r, heart_scale, day))
            .collect(),
        pregnancies: view.pregnancies.values().map(pregnancy_public).collect(),
        children: view.children.values().cloned().collect(),
        carries: live.carries().copied().collect(),
        holding_hands: live.holding_hands().copied().collect(),
        active_date: view
            .dates
            .values()
            .find(|d| d.is_active)
            .map(date_public),
        last_work_report: last_work_report.to_owned(),
    }
}

/// Public projection of a relationship as of `day`.
pub fn relationship_public(
    record: &RelationshipRecord,
    heart_scale: HeartScale,
    day: u32,
) -> RelationshipPublic {
    RelationshipPublic {
        player_a_id: record.player_a_id,
        player_a_name: record.player_a_name.clone(),
        player_b_id: record.player_b_id,
        player_b_name: record.player_b_name.clone(),
        state: record.state,
        pending_dating_from: record.pending_dating_from,
        pending_marriage_from: record.pending_marriage_from,
        heart_points: record.heart_points,
        heart_level: record.heart_level(heart_scale),
        dating_start_day: record.dating_start_day,
        engaged_day: record.engaged_day,
        married_day: record.married_day,
        immersive_date_count: record.immersive_date_count,
        date_available_today: record.can_start_immersive_date_today(day),
    }
}

/// Public projection of a couple's pregnancy state.
pub fn pregnancy_public(record: &PregnancyRecord) -> PregnancyPublic {
    let (player_a_id, player_b_id) = record.couple_key.players().unwrap_or_default();
    PregnancyPublic {
        player_a_id,
        player_b_id,
        both_opted_in: record.both_opted_in(),
        pending_try_for_baby_from: record.pending_try_for_baby_from,
        is_pregnant: record.is_pregnant,
        days_remaining: record.days_remaining,
        pregnant_player_id: record.pregnant_player_id,
    }
}

/// Public projection of an immersive date.
pub fn date_public(state: &DateImmersionSaveState) -> DateImmersionPublicState {
    DateImmersionPublicState {
        player_a_id: state.player_a_id,
        player_b_id: state.player_b_id,
        location_name: state.location_name.clone(),
        start_time_of_day: state.start_time_of_day,
        start_day: state.start_day,
        is_active: state.is_active,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use kinship_types::{
        ChildRecord, GiftProgressRecord, PairKey, PlayerId, RelationshipState, SynergyRecord,
    };

    const A: PlayerId = PlayerId(1);
    const B: PlayerId = PlayerId(2);
    const C: PlayerId = PlayerId(3);

    fn scale() -> HeartScale {
        HeartScale::new(250, 14)
    }

    fn build_for(view: &RomanceSaveData, live: &LiveSessions, day: u32) -> NetSnapshot {
        build(&SnapshotInputs {
            view,
            live,
            day,
            heart_scale: scale(),
            last_work_report: "",
        })
    }

    fn date(a: PlayerId, b: PlayerId, active: bool, location: &str) -> DateImmersionSaveState {
        DateImmersionSaveState {
            location_name: location.to_owned(),
            is_active: active,
            bonus_talk_count: 3,
            bonus_talk_points: 75,
            ..DateImmersionSaveState::for_key(&PairKey::new(a, b))
        }
    }

    #[test]
    fn relationship_projection_derives_level_and_date_gate() {
        let mut record = RelationshipRecord::for_pair(A, B);
        record.state = RelationshipState::Married;
        record.heart_points = 3600;
        record.last_immersive_date_confirmed_day = Some(9);

        let public = relationship_public(&record, scale(), 9);
        assert_eq!(public.heart_level, 14);
        assert!(!public.date_available_today);
        assert!(relationship_public(&record, scale(), 10).date_available_today);
    }

    #[test]
    fn pregnancy_projection_hides_individual_opt_ins() {
        let key = PairKey::new(A, B);
        let mut record = PregnancyRecord::for_key(&key);
        record.player_a_opt_in = true;
        let public = pregnancy_public(&record);
        assert!(!public.both_opted_in);
        assert_eq!((public.player_a_id, public.player_b_id), (A, B));

        record.player_b_opt_in = true;
        assert!(pregnancy_public(&record).both_opted_in);
    }

    #[test]
    fn only_first_active_date_is_surfaced() {
        let mut view = RomanceSaveData::default();
        for d in [
            date(A, B, false, "Saloon"),
            date(A, C, true, "Beach"),
            date(B, C, true, "Forest"),
        ] {
            view.dates.insert(d.pair_key.clone(), d);
        }
        let snapshot = build_for(&view, &LiveSessions::new(), 1);
        assert_eq!(
            snapshot.active_date.map(|d| d.location_name),
            Some(String::from("Beach"))
        );
    }

    #[test]
    fn host_only_tables_are_withheld() {
        let mut view = RomanceSaveData::default();
        let key = PairKey::new(A, B);
        view.gift_progress
            .insert(key.clone(), GiftProgressRecord::for_key(&key));
        view.synergy.insert(key.clone(), SynergyRecord::for_key(&key));
        let child = ChildRecord::default();
        view.children.insert(child.id, child.clone());

        let snapshot = build_for(&view, &LiveSessions::new(), 1);
        let json = serde_json::to_string(&snapshot).unwrap_or_default();
        assert!(!json.contains("GiftProgress"));
        assert!(!json.contains("Synergy"));
        assert!(!json.contains("BonusTalk"));
        assert_eq!(snapshot.children, vec![child]);
    }

    #[test]
    fn live_sessions_are_included() {
        let mut live = LiveSessions::new();
        assert!(live.start_carry(A, B).is_ok());
        assert!(live.start_holding_hands(C, A).is_ok());
        let snapshot = build_for(&RomanceSaveData::default(), &live, 4);
        assert_eq!(snapshot.carries.len(), 1);
        assert_eq!(snapshot.holding_hands.first().map(|h| h.follower_id), Some(A));
        assert_eq!(snapshot.day, 4);
    }

    #[test]
    fn build_is_deterministic() {
        let mut view = RomanceSaveData::default();
        for (a, b) in [(C, A), (B, A), (C, B)] {
            let record = RelationshipRecord::for_pair(a, b);
            view.relationships.insert(record.pair_key.clone(), record);
        }
        let live = LiveSessions::new();
        let first = build_for(&view, &live, 2);
        let second = build_for(&view, &live, 2);
        assert_eq!(first, second);
        let order: Vec<_> = first
            .relationships
            .iter()
            .map(|r| (r.player_a_id, r.player_b_id))
            .collect();
        assert_eq!(order, vec![(A, B), (A, C), (B, C)]);
    }
}
