//! Day callback that publishes a short work summary to peers.

use kinship_core::{DayCallback, HostSession};
use kinship_types::{ChildRecord, PregnancyRecord, RelationshipRecord};

/// Sets the snapshot's `last_work_report` to a one-line tally of the store.
#[derive(Debug, Default)]
pub struct WorkReport {
    days: u32,
}

impl WorkReport {
    /// Days reported so far.
    pub const fn days(&self) -> u32 {
        self.days
    }
}

impl DayCallback for WorkReport {
    fn on_day(&mut self, session: &mut HostSession, day: u32) {
        let store = session.store();
        let pregnant = store
            .iter::<PregnancyRecord>()
            .filter(|(_, p)| p.is_pregnant)
            .count();
        let report = format!(
            "Day {day}: {} relationships, {pregnant} pregnancies, {} children",
            store.count::<RelationshipRecord>(),
            store.count::<ChildRecord>(),
        );
        tracing::debug!(day, report = %report, "Work report");
        session.set_last_work_report(report);
        self.days = self.days.saturating_add(1);
    }
}
