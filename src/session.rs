// 🧭 Session - explicit application state for one interactive user
//
// Mutations (submit, delete) and queries (analysis) are separate calls:
// nothing is recomputed implicitly when the store changes.

use crate::error::Result;
use crate::prestation::{Prestation, Recurrence};
use crate::scoring::{self, AnalysisRow, EffortImpactMatrix};
use crate::store::{Aggregate, RecordStore};
use serde::Serialize;

// ============================================================================
// ENTRY FORM
// ============================================================================

/// Raw values collected by the entry form
#[derive(Debug, Clone, PartialEq)]
pub struct EntryForm {
    pub name: String,

    /// Recurrence key as selected by the user (label or variant name)
    pub recurrence: String,

    pub time_consumption: u8,
    pub profitability: u8,
    pub satisfaction: u8,
}

impl Default for EntryForm {
    fn default() -> Self {
        EntryForm {
            name: String::new(),
            recurrence: Recurrence::Daily.label().to_string(),
            time_consumption: 5,
            profitability: 5,
            satisfaction: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Added { index: usize, message: String },

    /// Nothing was stored; `message` is meant for the user
    Rejected { message: String },
}

impl SubmitOutcome {
    pub fn message(&self) -> &str {
        match self {
            SubmitOutcome::Added { message, .. } | SubmitOutcome::Rejected { message } => {
                message.as_str()
            }
        }
    }

    pub fn is_added(&self) -> bool {
        matches!(self, SubmitOutcome::Added { .. })
    }
}

// ============================================================================
// ANALYSIS SNAPSHOT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RecommendationKind {
    /// First mapping: a light but representative item
    FirstSteps,

    /// Best score overall
    TopPriority,
}

#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub prestation: Prestation,
}

/// Everything the analysis tab shows, computed in one pass
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub matrix: EffortImpactMatrix,
    pub table: Vec<AnalysisRow>,
    pub recommendation: Option<Recommendation>,
    pub aggregate: Aggregate,
}

// ============================================================================
// SESSION
// ============================================================================

#[derive(Debug, Clone)]
pub struct Session {
    store: RecordStore,
    first_time: bool,
    current_step: u8,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Empty list, first-time user
    pub fn new() -> Self {
        Session {
            store: RecordStore::new(),
            first_time: true,
            current_step: 1,
        }
    }

    /// Resume from previously exported items
    pub fn with_items(items: Vec<Prestation>) -> Self {
        Session {
            store: RecordStore::from_vec(items),
            ..Self::new()
        }
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn items(&self) -> &[Prestation] {
        self.store.all()
    }

    pub fn is_first_time(&self) -> bool {
        self.first_time
    }

    pub fn set_first_time(&mut self, first_time: bool) {
        tracing::debug!(first_time, "first-time flag changed");
        self.first_time = first_time;
    }

    /// Position of this module in the three-step journey shown in the
    /// header. Always 1; no operation advances it.
    pub fn current_step(&self) -> u8 {
        self.current_step
    }

    /// Validate the form, score it and append it.
    ///
    /// A blank name is rejected without touching the store. An unknown
    /// recurrence key is an `InvalidInput` error.
    pub fn submit(&mut self, form: &EntryForm) -> Result<SubmitOutcome> {
        if form.name.trim().is_empty() {
            tracing::warn!("submission rejected: empty name");
            return Ok(SubmitOutcome::Rejected {
                message: "Veuillez entrer un nom de prestation".to_string(),
            });
        }

        let recurrence: Recurrence = form.recurrence.parse()?;
        let prestation = Prestation::new(
            &form.name,
            recurrence,
            form.time_consumption,
            form.profitability,
            form.satisfaction,
        )?;

        let message = format!("Prestation '{}' ajoutée avec succès!", prestation.name);
        self.store.add(prestation);

        Ok(SubmitOutcome::Added {
            index: self.store.len() - 1,
            message,
        })
    }

    pub fn delete(&mut self, index: usize) -> Result<Prestation> {
        self.store.remove_at(index)
    }

    pub fn recommendation(&self) -> Option<Recommendation> {
        let kind = if self.first_time {
            RecommendationKind::FirstSteps
        } else {
            RecommendationKind::TopPriority
        };

        scoring::recommend(self.items(), self.first_time).map(|p| Recommendation {
            kind,
            prestation: p.clone(),
        })
    }

    /// Compute the analysis tab. `None` while the list is empty.
    pub fn analysis(&self) -> Option<Analysis> {
        if self.store.is_empty() {
            return None;
        }

        Some(Analysis {
            matrix: scoring::matrix(self.items()),
            table: scoring::ranked(self.items()),
            recommendation: self.recommendation(),
            aggregate: self.store.aggregate(),
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PrestationError;

    fn form(name: &str, recurrence: &str, chrono: u8, rent: u8, sat: u8) -> EntryForm {
        EntryForm {
            name: name.to_string(),
            recurrence: recurrence.to_string(),
            time_consumption: chrono,
            profitability: rent,
            satisfaction: sat,
        }
    }

    #[test]
    fn test_new_session_defaults() {
        let session = Session::new();

        assert!(session.items().is_empty());
        assert!(session.is_first_time());
        assert_eq!(session.current_step(), 1);
        assert!(session.analysis().is_none());
    }

    #[test]
    fn test_current_step_stays_fixed() {
        let mut session = Session::new();
        session.submit(&form("Audit", "Quotidien", 5, 5, 5)).unwrap();
        session.set_first_time(false);
        session.delete(0).unwrap();

        assert_eq!(session.current_step(), 1);
        assert_eq!(Session::with_items(Vec::new()).current_step(), 1);
    }

    #[test]
    fn test_default_form_values() {
        let form = EntryForm::default();

        assert_eq!(form.recurrence, "Quotidien");
        assert_eq!(form.time_consumption, 5);
        assert_eq!(form.profitability, 5);
        assert_eq!(form.satisfaction, 5);
    }

    #[test]
    fn test_submit_adds_scored_item() {
        let mut session = Session::new();

        let outcome = session
            .submit(&form("Formation IA collective", "Mensuel", 4, 8, 9))
            .unwrap();

        assert!(outcome.is_added());
        assert_eq!(outcome.message(), "Prestation 'Formation IA collective' ajoutée avec succès!");
        assert_eq!(session.items().len(), 1);
        assert_eq!(session.items()[0].score, 5.62);
    }

    #[test]
    fn test_submit_empty_name_is_rejected_without_mutation() {
        let mut session = Session::new();

        let outcome = session.submit(&form("", "Quotidien", 5, 5, 5)).unwrap();

        assert!(!outcome.is_added());
        assert_eq!(outcome.message(), "Veuillez entrer un nom de prestation");
        assert!(session.items().is_empty());
    }

    #[test]
    fn test_submit_unknown_recurrence_fails() {
        let mut session = Session::new();

        let err = session.submit(&form("Audit", "Semestriel", 5, 5, 5)).unwrap_err();

        assert!(matches!(err, PrestationError::InvalidInput { .. }));
        assert!(session.items().is_empty());
    }

    #[test]
    fn test_delete_invalid_index() {
        let mut session = Session::new();
        session.submit(&form("Audit", "Quotidien", 5, 5, 5)).unwrap();

        assert!(session.delete(3).is_err());
        assert_eq!(session.items().len(), 1);
        assert_eq!(session.delete(0).unwrap().name, "Audit");
        assert!(session.analysis().is_none());
    }

    #[test]
    fn test_analysis_recommendation_follows_first_time_flag() {
        let mut session = Session::new();
        session.submit(&form("Lourd", "Quotidien", 9, 9, 9)).unwrap();
        session.submit(&form("Léger", "Mensuel", 2, 6, 6)).unwrap();

        let first = session.analysis().unwrap().recommendation.unwrap();
        assert_eq!(first.kind, RecommendationKind::FirstSteps);
        assert_eq!(first.prestation.name, "Léger");

        session.set_first_time(false);
        let top = session.analysis().unwrap().recommendation.unwrap();
        assert_eq!(top.kind, RecommendationKind::TopPriority);
        assert_eq!(top.prestation.name, "Lourd");
    }

    #[test]
    fn test_analysis_without_light_items_has_no_first_time_recommendation() {
        let mut session = Session::new();
        session.submit(&form("Lourd", "Quotidien", 9, 9, 9)).unwrap();

        let analysis = session.analysis().unwrap();

        assert!(analysis.recommendation.is_none());
        assert_eq!(analysis.aggregate.count, 1);
        assert_eq!(analysis.matrix.major_projects.len(), 1);
        assert_eq!(analysis.table.len(), 1);
    }
}
