// 🎯 Score Engine - weighted priority score + effort/impact matrix
//
// score  = (weight(recurrence)*3 + chronophage*2 + rentabilite*2 + satisfaction) / 8
// impact = (rentabilite + satisfaction) / 2
//
// Pure functions only. Ratings above 10 are a caller contract violation and
// are not checked here (see `Prestation::validate`).

use crate::error::Result;
use crate::prestation::{Prestation, Quadrant, Recurrence, ScoreBand};
use serde::Serialize;

/// Effort midpoint: effort <= 5 is "low effort"
pub const EFFORT_THRESHOLD: u8 = 5;

/// Impact midpoint: impact >= 5 is "high impact"
pub const IMPACT_THRESHOLD: f64 = 5.0;

const RECURRENCE_FACTOR: u32 = 3;
const TIME_FACTOR: u32 = 2;
const PROFITABILITY_FACTOR: u32 = 2;
const SATISFACTION_FACTOR: u32 = 1;
const TOTAL_FACTOR: f64 = 8.0;

// ============================================================================
// SCORE
// ============================================================================

/// Score from a recurrence key as entered by the user.
///
/// Fails with `InvalidInput` when the key is not one of the five recurrences.
pub fn compute_score(
    recurrence: &str,
    time_consumption: u8,
    profitability: u8,
    satisfaction: u8,
) -> Result<f64> {
    let recurrence: Recurrence = recurrence.parse()?;
    Ok(score_for(recurrence, time_consumption, profitability, satisfaction))
}

/// Score for an already-parsed recurrence
pub fn score_for(
    recurrence: Recurrence,
    time_consumption: u8,
    profitability: u8,
    satisfaction: u8,
) -> f64 {
    let weighted = recurrence.weight() as u32 * RECURRENCE_FACTOR
        + time_consumption as u32 * TIME_FACTOR
        + profitability as u32 * PROFITABILITY_FACTOR
        + satisfaction as u32 * SATISFACTION_FACTOR;

    let score = round2(weighted as f64 / TOTAL_FACTOR);
    tracing::debug!(?recurrence, time_consumption, profitability, satisfaction, score, "computed score");
    score
}

/// Round to 2 decimals, ties to even (1.125 -> 1.12, 0.875 -> 0.88)
fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

// ============================================================================
// CLASSIFICATION
// ============================================================================

pub fn impact(profitability: u8, satisfaction: u8) -> f64 {
    (profitability as f64 + satisfaction as f64) / 2.0
}

/// Bucket an item into the effort/impact matrix.
///
/// Boundaries are inclusive on the low-effort and high-impact sides.
pub fn classify(time_consumption: u8, profitability: u8, satisfaction: u8) -> Quadrant {
    let low_effort = time_consumption <= EFFORT_THRESHOLD;
    let high_impact = impact(profitability, satisfaction) >= IMPACT_THRESHOLD;

    match (low_effort, high_impact) {
        (true, true) => Quadrant::QuickWin,
        (false, true) => Quadrant::MajorProject,
        (true, false) => Quadrant::Reconsider,
        (false, false) => Quadrant::Optimize,
    }
}

// ============================================================================
// RECOMMENDATION
// ============================================================================

/// Items sorted by score, highest first. The sort is stable, so on equal
/// scores the first-inserted item stays ahead.
pub fn rank_by_score<'a, I>(items: I) -> Vec<&'a Prestation>
where
    I: IntoIterator<Item = &'a Prestation>,
{
    let mut ranked: Vec<&Prestation> = items.into_iter().collect();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked
}

/// Pick the item to work on next.
///
/// First-time users only get low-effort items (chronophage <= 5); returns
/// `None` when nothing qualifies.
pub fn recommend(items: &[Prestation], is_first_time: bool) -> Option<&Prestation> {
    let candidates = items
        .iter()
        .filter(|p| !is_first_time || p.time_consumption <= EFFORT_THRESHOLD);

    rank_by_score(candidates).into_iter().next()
}

// ============================================================================
// ANALYSIS VIEWS
// ============================================================================

/// The four boxes of the effort/impact matrix, each in insertion order
#[derive(Debug, Clone, Default, Serialize)]
pub struct EffortImpactMatrix {
    pub quick_wins: Vec<Prestation>,
    pub major_projects: Vec<Prestation>,
    pub reconsider: Vec<Prestation>,
    pub optimize: Vec<Prestation>,
}

impl EffortImpactMatrix {
    pub fn cell(&self, quadrant: Quadrant) -> &[Prestation] {
        match quadrant {
            Quadrant::QuickWin => &self.quick_wins,
            Quadrant::MajorProject => &self.major_projects,
            Quadrant::Reconsider => &self.reconsider,
            Quadrant::Optimize => &self.optimize,
        }
    }

    pub fn total(&self) -> usize {
        Quadrant::ALL.iter().map(|q| self.cell(*q).len()).sum()
    }
}

pub fn matrix(items: &[Prestation]) -> EffortImpactMatrix {
    let mut matrix = EffortImpactMatrix::default();

    for item in items {
        let cell = match item.quadrant() {
            Quadrant::QuickWin => &mut matrix.quick_wins,
            Quadrant::MajorProject => &mut matrix.major_projects,
            Quadrant::Reconsider => &mut matrix.reconsider,
            Quadrant::Optimize => &mut matrix.optimize,
        };
        cell.push(item.clone());
    }

    matrix
}

/// One line of the detailed analysis table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisRow {
    pub name: String,
    pub recurrence: Recurrence,
    pub time_consumption: u8,
    pub profitability: u8,
    pub satisfaction: u8,
    pub impact: f64,
    pub score: f64,
    pub band: ScoreBand,
}

impl From<&Prestation> for AnalysisRow {
    fn from(p: &Prestation) -> Self {
        Self {
            name: p.name.clone(),
            recurrence: p.recurrence,
            time_consumption: p.time_consumption,
            profitability: p.profitability,
            satisfaction: p.satisfaction,
            impact: p.impact(),
            score: p.score,
            band: p.band(),
        }
    }
}

/// Detailed analysis table, highest score first
pub fn ranked(items: &[Prestation]) -> Vec<AnalysisRow> {
    rank_by_score(items).into_iter().map(AnalysisRow::from).collect()
}

// ============================================================================
// TESTS
// ============================================================================
