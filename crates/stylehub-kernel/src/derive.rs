//! Invalidation contract for derived appointment values.
//!
//! Every write to an appointment is described as a set of [`Change`]s. The
//! contract maps each change to the derivations it makes stale and to the
//! checks that must pass again before the write is committed. The engine
//! runs exactly that work, in the fixed order of [`Derivation::ORDER`] and
//! [`Check::ORDER`].
//!
//! | change           | derivations                              | checks                    |
//! |------------------|------------------------------------------|---------------------------|
//! | lines edited     | totals, end, discount                    | lines, overlap, hours     |
//! | start moved      | end, reference, discount                 | overlap, hours            |
//! | client changed   | reference, discount, client loyalty      |                           |
//! | stylist changed  |                                          | active stylist, overlap   |
//! | state changed    | client loyalty                           | overlap                   |
//! | created          | all                                      | all                       |
//! | deleted          | client loyalty                           |                           |

use std::collections::BTreeSet;

/// What happened to an appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Change {
    LinesEdited,
    StartMoved,
    ClientChanged,
    StylistChanged,
    StateChanged,
    Created,
    Deleted,
}

/// A derived value that may need recomputation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Derivation {
    /// `total_duration`, `total_amount`.
    Totals,
    /// `date_end`.
    EndTime,
    Reference,
    /// `discount_amount`, `final_amount` of this appointment.
    Discount,
    /// Stored counters of the affected client(s), and the discounts of the
    /// client's other appointments.
    ClientLoyalty,
}

impl Derivation {
    /// Dependency order: totals feed the end time and the discount.
    pub const ORDER: [Derivation; 5] = [
        Derivation::Totals,
        Derivation::EndTime,
        Derivation::Reference,
        Derivation::Discount,
        Derivation::ClientLoyalty,
    ];
}

/// A validation that must pass before commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Check {
    Lines,
    ActiveStylist,
    BusinessHours,
    Overlap,
}

impl Check {
    pub const ORDER: [Check; 4] = [
        Check::Lines,
        Check::ActiveStylist,
        Check::BusinessHours,
        Check::Overlap,
    ];
}

impl Change {
    pub fn invalidates(self) -> &'static [Derivation] {
        match self {
            Change::LinesEdited => &[
                Derivation::Totals,
                Derivation::EndTime,
                Derivation::Discount,
            ],
            Change::StartMoved => &[
                Derivation::EndTime,
                Derivation::Reference,
                Derivation::Discount,
            ],
            Change::ClientChanged => &[
                Derivation::Reference,
                Derivation::Discount,
                Derivation::ClientLoyalty,
            ],
            Change::StylistChanged => &[],
            Change::StateChanged | Change::Deleted => &[Derivation::ClientLoyalty],
            Change::Created => &Derivation::ORDER,
        }
    }

    pub fn requires(self) -> &'static [Check] {
        match self {
            Change::LinesEdited => &[Check::Lines, Check::BusinessHours, Check::Overlap],
            Change::StartMoved => &[Check::BusinessHours, Check::Overlap],
            Change::ClientChanged | Change::Deleted => &[],
            Change::StylistChanged => &[Check::ActiveStylist, Check::Overlap],
            // A reset may land in a slot that was taken meanwhile. Opening
            // hours are not re-checked: they may have been edited after the
            // appointment was booked.
            Change::StateChanged => &[Check::Overlap],
            Change::Created => &Check::ORDER,
        }
    }
}

/// Accumulated changes of one write and the work they imply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invalidation {
    changes: BTreeSet<Change>,
}

impl Invalidation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn of(changes: &[Change]) -> Self {
        let mut invalidation = Self::new();
        for change in changes {
            invalidation.record(*change);
        }
        invalidation
    }

    pub fn record(&mut self, change: Change) {
        self.changes.insert(change);
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn contains(&self, change: Change) -> bool {
        self.changes.contains(&change)
    }

    pub fn changes(&self) -> impl Iterator<Item = Change> + '_ {
        self.changes.iter().copied()
    }

    /// Stale derivations, in dependency order.
    pub fn derivations(&self) -> Vec<Derivation> {
        let stale: BTreeSet<Derivation> = self
            .changes
            .iter()
            .flat_map(|change| change.invalidates().iter().copied())
            .collect();
        Derivation::ORDER
            .into_iter()
            .filter(|derivation| stale.contains(derivation))
            .collect()
    }

    /// Checks to run, in evaluation order.
    pub fn checks(&self) -> Vec<Check> {
        let required: BTreeSet<Check> = self
            .changes
            .iter()
            .flat_map(|change| change.requires().iter().copied())
            .collect();
        Check::ORDER
            .into_iter()
            .filter(|check| required.contains(check))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creation_runs_everything() {
        let invalidation = Invalidation::of(&[Change::Created]);
        assert_eq!(invalidation.derivations(), Derivation::ORDER.to_vec());
        assert_eq!(invalidation.checks(), Check::ORDER.to_vec());
    }

    #[test]
    fn moving_the_start_keeps_totals() {
        let invalidation = Invalidation::of(&[Change::StartMoved]);
        assert_eq!(
            invalidation.derivations(),
            vec![
                Derivation::EndTime,
                Derivation::Reference,
                Derivation::Discount
            ]
        );
        assert_eq!(
            invalidation.checks(),
            vec![Check::BusinessHours, Check::Overlap]
        );
    }

    #[test]
    fn state_changes_only_recheck_overlap() {
        let invalidation = Invalidation::of(&[Change::StateChanged]);
        assert_eq!(invalidation.checks(), vec![Check::Overlap]);
        assert_eq!(invalidation.derivations(), vec![Derivation::ClientLoyalty]);
    }

    #[test]
    fn combined_changes_are_deduplicated_and_ordered() {
        let invalidation = Invalidation::of(&[
            Change::StylistChanged,
            Change::LinesEdited,
            Change::StartMoved,
        ]);
        assert_eq!(
            invalidation.checks(),
            vec![
                Check::Lines,
                Check::ActiveStylist,
                Check::BusinessHours,
                Check::Overlap
            ]
        );
        assert_eq!(
            invalidation.derivations(),
            vec![
                Derivation::Totals,
                Derivation::EndTime,
                Derivation::Reference,
                Derivation::Discount
            ]
        );
    }

    #[test]
    fn notes_only_edit_invalidates_nothing() {
        let invalidation = Invalidation::new();
        assert!(invalidation.is_empty());
        assert!(invalidation.derivations().is_empty());
        assert!(invalidation.checks().is_empty());
    }
}
