// 📋 Prestation - a named, scored service offering
//
// Items are immutable once created: the score is computed at creation time
// and never re-derived. Editing means deleting and adding again.

use crate::error::{PrestationError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Placeholder stored in `priorite` when an item is created.
pub const DEFAULT_PRIORITY: &str = "À définir";

/// Upper bound of every 0-10 rating.
pub const MAX_RATING: u8 = 10;

// ============================================================================
// RECURRENCE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Recurrence {
    #[serde(rename = "Quotidien")]
    Daily,

    #[serde(rename = "Hebdomadaire")]
    Weekly,

    #[serde(rename = "Mensuel")]
    Monthly,

    #[serde(rename = "Annuel")]
    Annual,

    #[serde(rename = "Variable")]
    Variable,
}

impl Recurrence {
    /// All values, in the order the entry form offers them.
    pub const ALL: [Recurrence; 5] = [
        Recurrence::Daily,
        Recurrence::Weekly,
        Recurrence::Monthly,
        Recurrence::Annual,
        Recurrence::Variable,
    ];

    /// Label used on screen and in exported files
    pub fn label(&self) -> &'static str {
        match self {
            Recurrence::Daily => "Quotidien",
            Recurrence::Weekly => "Hebdomadaire",
            Recurrence::Monthly => "Mensuel",
            Recurrence::Annual => "Annuel",
            Recurrence::Variable => "Variable",
        }
    }

    /// Weight used by the score formula
    pub fn weight(&self) -> u8 {
        match self {
            Recurrence::Daily => 10,
            Recurrence::Weekly => 7,
            Recurrence::Monthly => 4,
            Recurrence::Annual => 2,
            Recurrence::Variable => 3,
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Recurrence::Daily => Recurrence::Weekly,
            Recurrence::Weekly => Recurrence::Monthly,
            Recurrence::Monthly => Recurrence::Annual,
            Recurrence::Annual => Recurrence::Variable,
            Recurrence::Variable => Recurrence::Daily,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Recurrence::Daily => Recurrence::Variable,
            Recurrence::Weekly => Recurrence::Daily,
            Recurrence::Monthly => Recurrence::Weekly,
            Recurrence::Annual => Recurrence::Monthly,
            Recurrence::Variable => Recurrence::Annual,
        }
    }
}

impl fmt::Display for Recurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Recurrence {
    type Err = PrestationError;

    /// Accepts the wire label ("Hebdomadaire") or the variant name ("weekly").
    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Recurrence::ALL
            .iter()
            .copied()
            .find(|r| {
                r.label().eq_ignore_ascii_case(wanted)
                    || format!("{:?}", r).eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| PrestationError::invalid_input(format!("unknown recurrence '{}'", s)))
    }
}

// ============================================================================
// QUADRANT
// ============================================================================

/// Cell of the 2x2 effort/impact matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quadrant {
    /// Low effort, high impact
    QuickWin,

    /// High effort, high impact
    MajorProject,

    /// Low effort, low impact
    Reconsider,

    /// High effort, low impact
    Optimize,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [
        Quadrant::QuickWin,
        Quadrant::MajorProject,
        Quadrant::Reconsider,
        Quadrant::Optimize,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Quadrant::QuickWin => "Quick Wins (Effort faible, Impact élevé)",
            Quadrant::MajorProject => "Projets Majeurs (Effort élevé, Impact élevé)",
            Quadrant::Reconsider => "À reconsidérer (Effort faible, Impact faible)",
            Quadrant::Optimize => "À optimiser (Effort élevé, Impact faible)",
        }
    }
}

// ============================================================================
// SCORE BAND
// ============================================================================

/// Colour band of a score in the analysis table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreBand {
    High,
    Medium,
    Low,
}

impl ScoreBand {
    pub fn of(score: f64) -> Self {
        if score >= 7.0 {
            ScoreBand::High
        } else if score >= 5.0 {
            ScoreBand::Medium
        } else {
            ScoreBand::Low
        }
    }
}

// ============================================================================
// PRESTATION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prestation {
    #[serde(rename = "nom")]
    pub name: String,

    pub recurrence: Recurrence,

    /// Effort axis (0-10)
    #[serde(rename = "chronophage")]
    pub time_consumption: u8,

    #[serde(rename = "rentabilite")]
    pub profitability: u8,

    pub satisfaction: u8,

    /// Derived at creation time, rounded to 2 decimals
    pub score: f64,

    #[serde(rename = "priorite")]
    pub priority: String,
}

impl Prestation {
    /// Build a new item and compute its score.
    ///
    /// Fails with `InvalidInput` when the name is blank or a rating is above 10.
    pub fn new(
        name: &str,
        recurrence: Recurrence,
        time_consumption: u8,
        profitability: u8,
        satisfaction: u8,
    ) -> Result<Self> {
        let prestation = Prestation {
            name: name.to_string(),
            recurrence,
            time_consumption,
            profitability,
            satisfaction,
            score: crate::scoring::score_for(
                recurrence,
                time_consumption,
                profitability,
                satisfaction,
            ),
            priority: DEFAULT_PRIORITY.to_string(),
        };
        prestation.validate()?;
        Ok(prestation)
    }

    /// Check the invariants an imported item must hold
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(PrestationError::invalid_input("prestation name is empty"));
        }

        for (field, value) in [
            ("chronophage", self.time_consumption),
            ("rentabilite", self.profitability),
            ("satisfaction", self.satisfaction),
        ] {
            if value > MAX_RATING {
                return Err(PrestationError::invalid_input(format!(
                    "{} = {} is outside 0..={}",
                    field, value, MAX_RATING
                )));
            }
        }

        let expected = crate::scoring::score_for(
            self.recurrence,
            self.time_consumption,
            self.profitability,
            self.satisfaction,
        );
        if !self.score.is_finite() || self.score != expected {
            return Err(PrestationError::invalid_input(format!(
                "score {} of '{}' does not match its ratings (expected {})",
                self.score, self.name, expected
            )));
        }

        Ok(())
    }

    pub fn impact(&self) -> f64 {
        crate::scoring::impact(self.profitability, self.satisfaction)
    }

    pub fn quadrant(&self) -> Quadrant {
        crate::scoring::classify(self.time_consumption, self.profitability, self.satisfaction)
    }

    pub fn band(&self) -> ScoreBand {
        ScoreBand::of(self.score)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recurrence_weights() {
        assert_eq!(Recurrence::Daily.weight(), 10);
        assert_eq!(Recurrence::Weekly.weight(), 7);
        assert_eq!(Recurrence::Monthly.weight(), 4);
        assert_eq!(Recurrence::Annual.weight(), 2);
        assert_eq!(Recurrence::Variable.weight(), 3);
    }

    #[test]
    fn test_recurrence_parse_label_and_name() {
        assert_eq!("Quotidien".parse::<Recurrence>().unwrap(), Recurrence::Daily);
        assert_eq!("hebdomadaire".parse::<Recurrence>().unwrap(), Recurrence::Weekly);
        assert_eq!("Monthly".parse::<Recurrence>().unwrap(), Recurrence::Monthly);
        assert_eq!(" annual ".parse::<Recurrence>().unwrap(), Recurrence::Annual);
    }

    #[test]
    fn test_recurrence_unknown_is_invalid_input() {
        let err = "Trimestriel".parse::<Recurrence>().unwrap_err();
        assert!(matches!(err, PrestationError::InvalidInput { .. }));
    }

    #[test]
    fn test_recurrence_cycle() {
        let mut r = Recurrence::Daily;
        for _ in 0..Recurrence::ALL.len() {
            r = r.next();
        }
        assert_eq!(r, Recurrence::Daily);
        assert_eq!(Recurrence::Daily.previous(), Recurrence::Variable);
    }

    #[test]
    fn test_prestation_creation() {
        let p = Prestation::new("Formation IA collective", Recurrence::Monthly, 4, 8, 9).unwrap();

        assert_eq!(p.name, "Formation IA collective");
        assert_eq!(p.priority, DEFAULT_PRIORITY);
        // (4*3 + 4*2 + 8*2 + 9) / 8 = 45 / 8 = 5.625 -> 5.62
        assert_eq!(p.score, 5.62);
        assert_eq!(p.quadrant(), Quadrant::QuickWin);
        assert_eq!(p.band(), ScoreBand::Medium);
    }

    #[test]
    fn test_prestation_rejects_blank_name() {
        assert!(Prestation::new("", Recurrence::Daily, 5, 5, 5).is_err());
        assert!(Prestation::new("   ", Recurrence::Daily, 5, 5, 5).is_err());
    }

    #[test]
    fn test_prestation_rejects_rating_above_ten() {
        let err = Prestation::new("Audit", Recurrence::Daily, 11, 5, 5).unwrap_err();
        assert!(err.to_string().contains("chronophage"));
    }

    #[test]
    fn test_validate_rejects_tampered_score() {
        let mut p = Prestation::new("Audit", Recurrence::Weekly, 3, 7, 6).unwrap();
        assert!(p.validate().is_ok());

        p.score = 42.0;
        assert!(matches!(p.validate(), Err(PrestationError::InvalidInput { .. })));

        p.score = f64::NAN;
        assert!(matches!(p.validate(), Err(PrestationError::InvalidInput { .. })));

        p.score = 9.0;
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_serialized_field_names() {
        let p = Prestation::new("Audit", Recurrence::Weekly, 3, 7, 6).unwrap();
        let value = serde_json::to_value(&p).unwrap();

        assert_eq!(value["nom"], "Audit");
        assert_eq!(value["recurrence"], "Hebdomadaire");
        assert_eq!(value["chronophage"], 3);
        assert_eq!(value["rentabilite"], 7);
        assert_eq!(value["satisfaction"], 6);
        assert_eq!(value["priorite"], "À définir");
    }

    #[test]
    fn test_score_band_thresholds() {
        assert_eq!(ScoreBand::of(7.0), ScoreBand::High);
        assert_eq!(ScoreBand::of(6.99), ScoreBand::Medium);
        assert_eq!(ScoreBand::of(5.0), ScoreBand::Medium);
        assert_eq!(ScoreBand::of(4.99), ScoreBand::Low);
    }
}
