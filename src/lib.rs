// FIAE Module 1 - Prestation prioritisation core
// Scoring, effort/impact classification and exports, usable without any UI

pub mod config;
pub mod error;
pub mod export;
pub mod logger;
pub mod prestation;
pub mod scoring;
pub mod session;
pub mod store;

#[cfg(feature = "tui")]
pub mod ui;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{PrestationError, Result};
pub use export::{
    export_file_name, from_csv, from_json, load_file, to_csv, to_json, write_exports,
    ExportFormat, ExportPaths,
};
pub use prestation::{Prestation, Quadrant, Recurrence, ScoreBand, DEFAULT_PRIORITY};
pub use scoring::{
    classify, compute_score, impact, matrix, rank_by_score, ranked, recommend, score_for,
    AnalysisRow, EffortImpactMatrix,
};
pub use session::{
    Analysis, EntryForm, Recommendation, RecommendationKind, Session, SubmitOutcome,
};
pub use store::{is_metric_quick_win, Aggregate, RecordStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
