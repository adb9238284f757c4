//! Record-level state machines.
//!
//! These functions are the only sanctioned way for rule engines to move a
//! record between lifecycle states. Each one validates first and mutates
//! second, so a returned [`TransitionError`] always means the record was left
//! untouched. Run them inside [`CanonicalStore::update`] to get the same
//! guarantee at the store level.
//!
//! # Relationships
//!
//! ```text
//! None --propose/accept--> Dating --propose/accept--> Engaged --propose/accept--> Married
//! ```
//!
//! A dating proposal sits in `pending_dating_from`; engagement and marriage
//! proposals sit in `pending_marriage_from`. Rejection and withdrawal clear
//! the slot; rejection is reported back as a [`RelationshipEvent`] so the
//! rule engine can decide on any penalty.
//!
//! # Pregnancies
//!
//! ```text
//! idle --request_try--> pending (one opt-in) --accept_try--> pending (both)
//!      --begin--> pregnant --advance_day...--> Due (idle again)
//! ```
//!
//! # Children
//!
//! `Infant -> Child -> Teen -> Adult`, forward only.
//!
//! [`CanonicalStore::update`]: crate::store::CanonicalStore::update

use kinship_types::{
    ChildRecord, GiftCategory, GiftProgressRecord, HoldingHandsPairRecord, LifeStage, PlayerId,
    PregnancyRecord, RelationshipRecord, RelationshipState, SynergyRecord,
};

/// Why a transition was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    /// The acting participant does not belong to the record.
    #[error("participant {0} is not part of this pair")]
    NotInPair(PlayerId),

    /// A proposal or request is already open.
    #[error("a proposal from {0} is already pending")]
    AlreadyPending(PlayerId),

    /// There is nothing to accept, reject, or withdraw.
    #[error("no proposal is pending")]
    NothingPending,

    /// Participants cannot answer their own proposal.
    #[error("participant {0} cannot answer their own proposal")]
    OwnProposal(PlayerId),

    /// Only the initiator may withdraw a proposal.
    #[error("only the initiator {initiator} can withdraw")]
    NotInitiator {
        /// Who opened the proposal.
        initiator: PlayerId,
    },

    /// The relationship cannot advance any further.
    #[error("relationship is already {0:?}")]
    FinalState(RelationshipState),

    /// Both partners must opt in before a pregnancy can begin.
    #[error("both partners must opt in first")]
    NotBothOptedIn,

    /// A pregnancy is already under way.
    #[error("a pregnancy is already under way")]
    AlreadyPregnant,

    /// No pregnancy is under way.
    #[error("no pregnancy is under way")]
    NotPregnant,

    /// A pregnancy must last at least one day.
    #[error("pregnancy duration must be at least one day")]
    ZeroDuration,

    /// Child stages only move forward.
    #[error("cannot move child from {from:?} to {to:?}")]
    StageRegression {
        /// Current stage.
        from: LifeStage,
        /// Requested stage.
        to: LifeStage,
    },
}

// ---------------------------------------------------------------------------
// Relationships
// ---------------------------------------------------------------------------

/// Outcome of a relationship transition, for the rule engine to react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationshipEvent {
    /// A proposal was opened.
    Proposed {
        /// Initiator.
        from: PlayerId,
        /// State the proposal would move the pair into.
        toward: RelationshipState,
    },
    /// A proposal was accepted.
    Accepted {
        /// Participant who accepted.
        by: PlayerId,
        /// The pair's new state.
        state: RelationshipState,
    },
    /// A proposal was rejected.
    Rejected {
        /// Participant who rejected.
        by: PlayerId,
        /// Participant who proposed.
        initiator: PlayerId,
        /// State the proposal would have moved the pair into.
        toward: RelationshipState,
    },
    /// The initiator took the proposal back.
    Withdrawn {
        /// Initiator.
        by: PlayerId,
    },
}

/// Open a proposal to move the pair to its next state.
pub fn propose(
    record: &mut RelationshipRecord,
    from: PlayerId,
) -> Result<RelationshipEvent, TransitionError> {
    if !record.involves(from) {
        return Err(TransitionError::NotInPair(from));
    }
    if let Some(pending) = record.pending_from() {
        return Err(TransitionError::AlreadyPending(pending));
    }
    let toward = record
        .state
        .next()
        .ok_or(TransitionError::FinalState(record.state))?;

    if record.state.proposes_dating() {
        record.pending_dating_from = Some(from);
    } else {
        record.pending_marriage_from = Some(from);
    }
    Ok(RelationshipEvent::Proposed { from, toward })
}

/// Accept the open proposal. Only the non-initiating participant may accept.
pub fn accept(
    record: &mut RelationshipRecord,
    by: PlayerId,
    day: u32,
) -> Result<RelationshipEvent, TransitionError> {
    answerable_proposal(record, by)?;
    let next = record
        .state
        .next()
        .ok_or(TransitionError::FinalState(record.state))?;

    record.pending_dating_from = None;
    record.pending_marriage_from = None;
    record.state = next;
    record.last_state_change_day = Some(day);
    match next {
        RelationshipState::Dating => record.dating_start_day = Some(day),
        RelationshipState::Engaged => record.engaged_day = Some(day),
        RelationshipState::Married => record.married_day = Some(day),
        RelationshipState::None => {}
    }
    Ok(RelationshipEvent::Accepted { by, state: next })
}

/// Reject the open proposal. Only the non-initiating participant may reject.
pub fn reject(
    record: &mut RelationshipRecord,
    by: PlayerId,
) -> Result<RelationshipEvent, TransitionError> {
    let initiator = answerable_proposal(record, by)?;
    let toward = record.state.next().unwrap_or(record.state);

    record.pending_dating_from = None;
    record.pending_marriage_from = None;
    record.rejections = record.rejections.saturating_add(1);
    Ok(RelationshipEvent::Rejected {
        by,
        initiator,
        toward,
    })
}

/// Withdraw the open proposal. Only the initiator may withdraw.
pub fn withdraw(
    record: &mut RelationshipRecord,
    by: PlayerId,
) -> Result<RelationshipEvent, TransitionError> {
    let initiator = record.pending_from().ok_or(TransitionError::NothingPending)?;
    if initiator != by {
        return Err(TransitionError::NotInitiator { initiator });
    }
    record.pending_dating_from = None;
    record.pending_marriage_from = None;
    Ok(RelationshipEvent::Withdrawn { by })
}

/// The initiator of a proposal `by` is allowed to answer.
fn answerable_proposal(
    record: &RelationshipRecord,
    by: PlayerId,
) -> Result<PlayerId, TransitionError> {
    if !record.involves(by) {
        return Err(TransitionError::NotInPair(by));
    }
    let initiator = record.pending_from().ok_or(TransitionError::NothingPending)?;
    if initiator == by {
        return Err(TransitionError::OwnProposal(by));
    }
    Ok(initiator)
}

/// Record a confirmed immersive date on `day`.
pub const fn confirm_immersive_date(record: &mut RelationshipRecord, day: u32) {
    record.last_immersive_date_confirmed_day = Some(day);
    record.last_immersive_date_day = Some(day);
    record.immersive_date_count = record.immersive_date_count.saturating_add(1);
}

/// Adjust heart points by `delta`, saturating at the `i32` bounds.
pub const fn add_heart_points(record: &mut RelationshipRecord, delta: i32) {
    record.heart_points = record.heart_points.saturating_add(delta);
}

// ---------------------------------------------------------------------------
// Pregnancies
// ---------------------------------------------------------------------------

/// Progress of an active pregnancy after one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PregnancyProgress {
    /// Still counting down.
    Continuing {
        /// Days left.
        days_remaining: u32,
    },
    /// The countdown reached zero. The record is idle again; the rule engine
    /// creates the child.
    Due {
        /// Who was pregnant.
        pregnant_player_id: Option<PlayerId>,
    },
}

/// One partner asks to try for a baby, opting in themselves.
pub fn request_try(record: &mut PregnancyRecord, from: PlayerId) -> Result<(), TransitionError> {
    if record.is_pregnant {
        return Err(TransitionError::AlreadyPregnant);
    }
    if let Some(pending) = record.pending_try_for_baby_from {
        return Err(TransitionError::AlreadyPending(pending));
    }
    let flag = record
        .opt_in_mut(from)
        .ok_or(TransitionError::NotInPair(from))?;
    *flag = true;
    record.pending_try_for_baby_from = Some(from);
    Ok(())
}

/// The other partner agrees, completing the mutual opt-in.
///
/// The request stays pending until [`begin`] or [`cancel`].
pub fn accept_try(record: &mut PregnancyRecord, by: PlayerId) -> Result<(), TransitionError> {
    let initiator = record
        .pending_try_for_baby_from
        .ok_or(TransitionError::NothingPending)?;
    if initiator == by {
        return Err(TransitionError::OwnProposal(by));
    }
    let flag = record.opt_in_mut(by).ok_or(TransitionError::NotInPair(by))?;
    *flag = true;
    Ok(())
}

/// Start the countdown. Requires both partners to have opted in.
pub fn begin(
    record: &mut PregnancyRecord,
    pregnant: PlayerId,
    duration_days: u32,
    day: u32,
) -> Result<(), TransitionError> {
    if record.is_pregnant {
        return Err(TransitionError::AlreadyPregnant);
    }
    if !record.couple_key.contains(pregnant) {
        return Err(TransitionError::NotInPair(pregnant));
    }
    if !record.both_opted_in() {
        return Err(TransitionError::NotBothOptedIn);
    }
    if duration_days == 0 {
        return Err(TransitionError::ZeroDuration);
    }
    record.is_pregnant = true;
    record.days_remaining = duration_days;
    record.days_elapsed = 0;
    record.pregnant_player_id = Some(pregnant);
    record.started_day = Some(day);
    record.pending_try_for_baby_from = None;
    Ok(())
}

/// Drop any open request and opt-ins; end an active pregnancy.
pub const fn cancel(record: &mut PregnancyRecord) {
    record.pending_try_for_baby_from = None;
    record.player_a_opt_in = false;
    record.player_b_opt_in = false;
    record.is_pregnant = false;
    record.days_remaining = 0;
    record.pregnant_player_id = None;
}

/// Count one day down.
pub fn advance_day(record: &mut PregnancyRecord) -> Result<PregnancyProgress, TransitionError> {
    if !record.is_pregnant {
        return Err(TransitionError::NotPregnant);
    }
    record.days_remaining = record.days_remaining.saturating_sub(1);
    record.days_elapsed = record.days_elapsed.saturating_add(1);
    if record.days_remaining > 0 {
        return Ok(PregnancyProgress::Continuing {
            days_remaining: record.days_remaining,
        });
    }
    let pregnant_player_id = record.pregnant_player_id.take();
    record.is_pregnant = false;
    record.player_a_opt_in = false;
    record.player_b_opt_in = false;
    record.pending_try_for_baby_from = None;
    Ok(PregnancyProgress::Due { pregnant_player_id })
}

// ---------------------------------------------------------------------------
// Children
// ---------------------------------------------------------------------------

/// Move a child to a later stage.
pub fn advance_to(child: &mut ChildRecord, stage: LifeStage) -> Result<(), TransitionError> {
    if stage <= child.stage {
        return Err(TransitionError::StageRegression {
            from: child.stage,
            to: stage,
        });
    }
    child.stage = stage;
    Ok(())
}

/// Age a child by one day unless already aged on `day`. Returns whether it
/// aged.
pub fn grow(child: &mut ChildRecord, day: u32) -> bool {
    if child.last_growth_day == Some(day) {
        return false;
    }
    child.age_days = child.age_days.saturating_add(1);
    child.last_growth_day = Some(day);
    true
}

// ---------------------------------------------------------------------------
// Gifts, synergy, holding hands
// ---------------------------------------------------------------------------

/// Details of one gift handed over.
#[derive(Debug, Clone, Copy)]
pub struct GiftEvent<'a> {
    /// Giver.
    pub from: PlayerId,
    /// Item id.
    pub item_id: &'a str,
    /// Category it counts under.
    pub category: GiftCategory,
    /// Day it was given.
    pub day: u32,
}

/// Count a gift. Returns `true` when this gift crossed a milestone.
///
/// A milestone is crossed every `milestone_every` gifts in a category;
/// zero disables milestones.
pub fn record_gift(
    record: &mut GiftProgressRecord,
    gift: &GiftEvent<'_>,
    milestone_every: u32,
) -> bool {
    let counter = record.counter_mut(gift.category);
    counter.count = counter.count.saturating_add(1);
    let crossed = counter
        .count
        .checked_rem(milestone_every)
        .is_some_and(|rem| rem == 0);
    if crossed {
        counter.milestones_crossed = counter.milestones_crossed.saturating_add(1);
    }
    record.last_gift_day = Some(gift.day);
    record.last_gift_item_id = Some(gift.item_id.to_owned());
    record.last_gift_from = Some(gift.from);
    record.last_gift_category = Some(gift.category);
    crossed
}

/// Move the synergy meter by `delta`, clamped to `[0, max]`.
pub fn adjust_synergy(record: &mut SynergyRecord, delta: i64, max: u32, day: u32) {
    let next = i64::from(record.value).saturating_add(delta);
    let clamped = next.clamp(0, i64::from(max));
    record.value = u32::try_from(clamped).unwrap_or(max);
    record.last_updated_day = Some(day);
}

/// Count the start of a holding-hands session.
pub const fn record_holding_hands_start(record: &mut HoldingHandsPairRecord, day: u32) {
    record.last_session_start_day = Some(day);
    record.total_sessions = record.total_sessions.saturating_add(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    use kinship_types::PairKey;

    const A: PlayerId = PlayerId(1);
    const B: PlayerId = PlayerId(2);
    const STRANGER: PlayerId = PlayerId(3);

    fn relationship() -> RelationshipRecord {
        RelationshipRecord::for_pair(A, B)
    }

    fn pregnancy() -> PregnancyRecord {
        PregnancyRecord::for_key(&PairKey::new(A, B))
    }

    // -----------------------------------------------------------------------
    // Relationship tests
    // -----------------------------------------------------------------------

    #[test]
    fn full_relationship_progression() {
        let mut record = relationship();
        for (day, expected) in [
            (1, RelationshipState::Dating),
            (2, RelationshipState::Engaged),
            (3, RelationshipState::Married),
        ] {
            assert!(propose(&mut record, A).is_ok());
            let event = accept(&mut record, B, day);
            assert_eq!(
                event,
                Ok(RelationshipEvent::Accepted {
                    by: B,
                    state: expected
                })
            );
            assert_eq!(record.pending_from(), None);
        }
        assert_eq!(record.dating_start_day, Some(1));
        assert_eq!(record.engaged_day, Some(2));
        assert_eq!(record.married_day, Some(3));
        assert_eq!(propose(&mut record, A), Err(TransitionError::FinalState(RelationshipState::Married)));
    }

    #[test]
    fn dating_uses_dating_slot_and_later_uses_marriage_slot() {
        let mut record = relationship();
        propose(&mut record, B).ok();
        assert_eq!(record.pending_dating_from, Some(B));
        assert_eq!(record.pending_marriage_from, None);
        accept(&mut record, A, 1).ok();

        propose(&mut record, A).ok();
        assert_eq!(record.pending_dating_from, None);
        assert_eq!(record.pending_marriage_from, Some(A));
    }

    #[test]
    fn reject_clears_pending_and_counts() {
        let mut record = relationship();
        propose(&mut record, A).ok();
        let event = reject(&mut record, B);
        assert_eq!(
            event,
            Ok(RelationshipEvent::Rejected {
                by: B,
                initiator: A,
                toward: RelationshipState::Dating
            })
        );
        assert_eq!(record.pending_from(), None);
        assert_eq!(record.rejections, 1);
        assert_eq!(record.state, RelationshipState::None);
    }

    #[test]
    fn cannot_accept_own_proposal() {
        let mut record = relationship();
        propose(&mut record, A).ok();
        let before = record.clone();
        assert_eq!(accept(&mut record, A, 1), Err(TransitionError::OwnProposal(A)));
        assert_eq!(record, before);
    }

    #[test]
    fn second_proposal_is_refused() {
        let mut record = relationship();
        propose(&mut record, A).ok();
        assert_eq!(propose(&mut record, B), Err(TransitionError::AlreadyPending(A)));
    }

    #[test]
    fn stranger_cannot_act() {
        let mut record = relationship();
        assert_eq!(propose(&mut record, STRANGER), Err(TransitionError::NotInPair(STRANGER)));
        propose(&mut record, A).ok();
        assert_eq!(accept(&mut record, STRANGER, 1), Err(TransitionError::NotInPair(STRANGER)));
    }

    #[test]
    fn only_initiator_withdraws() {
        let mut record = relationship();
        propose(&mut record, A).ok();
        assert_eq!(withdraw(&mut record, B), Err(TransitionError::NotInitiator { initiator: A }));
        assert_eq!(withdraw(&mut record, A), Ok(RelationshipEvent::Withdrawn { by: A }));
        assert_eq!(record.rejections, 0);
        assert_eq!(withdraw(&mut record, A), Err(TransitionError::NothingPending));
    }

    #[test]
    fn confirmed_date_blocks_same_day() {
        let mut record = relationship();
        confirm_immersive_date(&mut record, 12);
        assert!(!record.can_start_immersive_date_today(12));
        assert!(record.can_start_immersive_date_today(13));
        assert_eq!(record.immersive_date_count, 1);
    }

    #[test]
    fn heart_points_saturate() {
        let mut record = relationship();
        record.heart_points = i32::MAX - 1;
        add_heart_points(&mut record, 10);
        assert_eq!(record.heart_points, i32::MAX);
        add_heart_points(&mut record, i32::MIN);
        assert_eq!(record.heart_points, -1);
    }

    // -----------------------------------------------------------------------
    // Pregnancy tests
    // -----------------------------------------------------------------------

    #[test]
    fn pregnancy_flow_to_due() {
        let mut record = pregnancy();
        assert!(request_try(&mut record, A).is_ok());
        assert_eq!(record.pending_try_for_baby_from, Some(A));
        assert!(!record.both_opted_in());

        assert!(accept_try(&mut record, B).is_ok());
        assert!(record.both_opted_in());
        assert_eq!(record.pending_try_for_baby_from, Some(A));

        assert!(begin(&mut record, B, 2, 40).is_ok());
        assert!(record.is_pregnant);
        assert_eq!(record.pending_try_for_baby_from, None);

        assert_eq!(
            advance_day(&mut record),
            Ok(PregnancyProgress::Continuing { days_remaining: 1 })
        );
        assert_eq!(
            advance_day(&mut record),
            Ok(PregnancyProgress::Due {
                pregnant_player_id: Some(B)
            })
        );
        assert!(!record.is_pregnant);
        assert!(!record.both_opted_in());
        assert_eq!(record.days_elapsed, 2);
        assert_eq!(advance_day(&mut record), Err(TransitionError::NotPregnant));
    }

    #[test]
    fn begin_requires_mutual_opt_in() {
        let mut record = pregnancy();
        request_try(&mut record, A).ok();
        let before = record.clone();
        assert_eq!(begin(&mut record, A, 14, 1), Err(TransitionError::NotBothOptedIn));
        assert_eq!(record, before);
    }

    #[test]
    fn begin_rejects_outsider_and_zero_duration() {
        let mut record = pregnancy();
        request_try(&mut record, A).ok();
        accept_try(&mut record, B).ok();
        assert_eq!(begin(&mut record, STRANGER, 14, 1), Err(TransitionError::NotInPair(STRANGER)));
        assert_eq!(begin(&mut record, A, 0, 1), Err(TransitionError::ZeroDuration));
    }

    #[test]
    fn cancel_clears_pending() {
        let mut record = pregnancy();
        request_try(&mut record, A).ok();
        cancel(&mut record);
        assert_eq!(record.pending_try_for_baby_from, None);
        assert!(!record.player_a_opt_in);
    }

    #[test]
    fn initiator_cannot_accept_own_request() {
        let mut record = pregnancy();
        request_try(&mut record, A).ok();
        assert_eq!(accept_try(&mut record, A), Err(TransitionError::OwnProposal(A)));
    }

    // -----------------------------------------------------------------------
    // Child tests
    // -----------------------------------------------------------------------

    #[test]
    fn stage_moves_forward_only() {
        let mut child = ChildRecord::default();
        assert!(advance_to(&mut child, LifeStage::Teen).is_ok());
        assert_eq!(
            advance_to(&mut child, LifeStage::Child),
            Err(TransitionError::StageRegression {
                from: LifeStage::Teen,
                to: LifeStage::Child
            })
        );
        assert!(advance_to(&mut child, LifeStage::Teen).is_err());
        assert_eq!(child.stage, LifeStage::Teen);
    }

    #[test]
    fn growth_applies_once_per_day() {
        let mut child = ChildRecord::default();
        assert!(grow(&mut child, 5));
        assert!(!grow(&mut child, 5));
        assert!(grow(&mut child, 6));
        assert_eq!(child.age_days, 2);
    }

    // -----------------------------------------------------------------------
    // Gift / synergy / holding hands tests
    // -----------------------------------------------------------------------

    #[test]
    fn gift_milestones_cross_every_n() {
        let mut record = GiftProgressRecord::default();
        let gift = GiftEvent {
            from: A,
            item_id: "rose",
            category: GiftCategory::Favorite,
            day: 9,
        };
        let crossings = (0..10)
            .filter(|_| record_gift(&mut record, &gift, 5))
            .count();
        assert_eq!(crossings, 2);
        assert_eq!(record.favorite.count, 10);
        assert_eq!(record.favorite.milestones_crossed, 2);
        assert_eq!(record.baseline.count, 0);
        assert_eq!(record.last_gift_item_id.as_deref(), Some("rose"));
    }

    #[test]
    fn zero_milestone_interval_never_crosses() {
        let mut record = GiftProgressRecord::default();
        let gift = GiftEvent {
            from: A,
            item_id: "stone",
            category: GiftCategory::Baseline,
            day: 1,
        };
        assert!(!record_gift(&mut record, &gift, 0));
    }

    #[test]
    fn synergy_clamps() {
        let mut record = SynergyRecord::default();
        adjust_synergy(&mut record, 150, 100, 1);
        assert_eq!(record.value, 100);
        adjust_synergy(&mut record, -300, 100, 2);
        assert_eq!(record.value, 0);
        assert_eq!(record.last_updated_day, Some(2));
    }

    #[test]
    fn holding_hands_history_counts() {
        let mut record = HoldingHandsPairRecord::default();
        record_holding_hands_start(&mut record, 3);
        record_holding_hands_start(&mut record, 4);
        assert_eq!(record.total_sessions, 2);
        assert_eq!(record.last_session_start_day, Some(4));
    }
}
