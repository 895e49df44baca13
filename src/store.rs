// 🗂️ Record Store - ordered list of prestations for one session
//
// Append-only except for removal by position. Names are not unique, so a
// position is the only handle on an item.

use crate::error::{PrestationError, Result};
use crate::prestation::Prestation;
use crate::scoring::EFFORT_THRESHOLD;
use serde::Serialize;

/// Profitability floor of the "Quick Wins" metric card
pub const QUICK_WIN_PROFITABILITY: u8 = 5;

// ============================================================================
// AGGREGATE
// ============================================================================

/// Headline metrics of the analysis tab
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Aggregate {
    pub count: usize,

    /// Mean of `chronophage` (0.0 when the store is empty)
    pub mean_time_consumption: f64,

    /// Mean of `rentabilite` (0.0 when the store is empty)
    pub mean_profitability: f64,

    /// Items with chronophage <= 5 and rentabilite >= 5.
    ///
    /// Not the same rule as `Quadrant::QuickWin`, which looks at the mean of
    /// rentabilite and satisfaction. Both rules are kept as they are.
    pub quick_win_count: usize,
}

/// Quick-win rule of the metric card (two variables, no satisfaction)
pub fn is_metric_quick_win(prestation: &Prestation) -> bool {
    prestation.time_consumption <= EFFORT_THRESHOLD
        && prestation.profitability >= QUICK_WIN_PROFITABILITY
}

// ============================================================================
// RECORD STORE
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    items: Vec<Prestation>,
}

impl RecordStore {
    pub fn new() -> Self {
        RecordStore { items: Vec::new() }
    }

    /// Seed a store from previously exported items, keeping their order
    pub fn from_vec(items: Vec<Prestation>) -> Self {
        RecordStore { items }
    }

    /// Append to the end. Duplicates are allowed.
    pub fn add(&mut self, prestation: Prestation) {
        tracing::info!(
            name = %prestation.name,
            score = prestation.score,
            position = self.items.len(),
            "prestation added"
        );
        self.items.push(prestation);
    }

    /// Remove the item at `index`, shifting later items down.
    ///
    /// An invalid index leaves the store untouched.
    pub fn remove_at(&mut self, index: usize) -> Result<Prestation> {
        if index >= self.items.len() {
            return Err(PrestationError::IndexOutOfRange {
                index,
                len: self.items.len(),
            });
        }

        let removed = self.items.remove(index);
        tracing::info!(name = %removed.name, position = index, "prestation removed");
        Ok(removed)
    }

    /// Read-only view in insertion order
    pub fn all(&self) -> &[Prestation] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<&Prestation> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn aggregate(&self) -> Aggregate {
        let count = self.items.len();
        if count == 0 {
            return Aggregate::default();
        }

        let mean = |f: fn(&Prestation) -> u8| -> f64 {
            self.items.iter().map(|p| f(p) as f64).sum::<f64>() / count as f64
        };

        Aggregate {
            count,
            mean_time_consumption: mean(|p: &Prestation| p.time_consumption),
            mean_profitability: mean(|p: &Prestation| p.profitability),
            quick_win_count: self.items.iter().filter(|p| is_metric_quick_win(p)).count(),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prestation::{Quadrant, Recurrence};

    fn item(name: &str, chrono: u8, rent: u8, sat: u8) -> Prestation {
        Prestation::new(name, Recurrence::Weekly, chrono, rent, sat).unwrap()
    }

    #[test]
    fn test_add_keeps_order_and_duplicates() {
        let mut store = RecordStore::new();
        store.add(item("Audit", 5, 5, 5));
        store.add(item("Audit", 5, 5, 5));
        store.add(item("Coaching", 2, 8, 9));

        let names: Vec<&str> = store.all().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Audit", "Audit", "Coaching"]);
    }

    #[test]
    fn test_remove_at_shifts_items() {
        let mut store = RecordStore::new();
        store.add(item("A", 1, 1, 1));
        store.add(item("B", 2, 2, 2));
        store.add(item("C", 3, 3, 3));

        let removed = store.remove_at(1).unwrap();

        assert_eq!(removed.name, "B");
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(1).unwrap().name, "C");
    }

    #[test]
    fn test_remove_at_out_of_range_leaves_store_unchanged() {
        let mut store = RecordStore::new();
        store.add(item("A", 1, 1, 1));
        let before = store.all().to_vec();

        let err = store.remove_at(1).unwrap_err();

        assert!(matches!(err, PrestationError::IndexOutOfRange { index: 1, len: 1 }));
        assert_eq!(store.all(), before.as_slice());
    }

    #[test]
    fn test_aggregate_empty() {
        let store = RecordStore::new();
        assert_eq!(store.aggregate(), Aggregate::default());
    }

    #[test]
    fn test_aggregate_means() {
        let mut store = RecordStore::new();
        store.add(item("A", 2, 8, 5));
        store.add(item("B", 7, 3, 5));

        let agg = store.aggregate();

        assert_eq!(agg.count, 2);
        assert_eq!(agg.mean_time_consumption, 4.5);
        assert_eq!(agg.mean_profitability, 5.5);
        assert_eq!(agg.quick_win_count, 1);
    }

    #[test]
    fn test_quick_win_rules_are_independent() {
        let mut store = RecordStore::new();
        // metric rule: yes (rentabilite 6); matrix rule: no (impact (6+2)/2 = 4)
        store.add(item("Rentable mais ingrat", 3, 6, 2));
        // metric rule: no (rentabilite 4); matrix rule: yes (impact (4+8)/2 = 6)
        store.add(item("Apprécié", 3, 4, 8));
        // both rules agree
        store.add(item("Idéal", 3, 7, 7));

        let matrix_count = store
            .all()
            .iter()
            .filter(|p| p.quadrant() == Quadrant::QuickWin)
            .count();

        assert_eq!(store.aggregate().quick_win_count, 2);
        assert_eq!(matrix_count, 2);

        let metric: Vec<bool> = store.all().iter().map(is_metric_quick_win).collect();
        let quadrant: Vec<bool> = store
            .all()
            .iter()
            .map(|p| p.quadrant() == Quadrant::QuickWin)
            .collect();
        assert_eq!(metric, vec![true, false, true]);
        assert_eq!(quadrant, vec![false, true, true]);
    }

    #[test]
    fn test_quick_win_counts_can_differ() {
        let mut store = RecordStore::new();
        store.add(item("Rentable mais ingrat", 4, 9, 0));

        let matrix_count = store
            .all()
            .iter()
            .filter(|p| p.quadrant() == Quadrant::QuickWin)
            .count();

        assert_eq!(store.aggregate().quick_win_count, 1);
        assert_eq!(matrix_count, 0);
    }
}
