// 📥 Export - CSV / JSON files of the prestation list
//
// The JSON array is the hand-off format for the next module: field names
// (nom, recurrence, chronophage, rentabilite, satisfaction, score, priorite)
// must not change.

use crate::error::{PrestationError, Result};
use crate::prestation::Prestation;
use chrono::NaiveDateTime;
use std::fs;
use std::path::{Path, PathBuf};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Prefix shared by every exported file name
pub const FILE_PREFIX: &str = "FIAE_prestations";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(ExportFormat::Csv),
            "json" => Some(ExportFormat::Json),
            _ => None,
        }
    }
}

/// `FIAE_prestations_<YYYYMMDD_HHMM>.<ext>`
pub fn export_file_name(format: ExportFormat, at: &NaiveDateTime) -> String {
    format!(
        "{}_{}.{}",
        FILE_PREFIX,
        at.format("%Y%m%d_%H%M"),
        format.extension()
    )
}

// ============================================================================
// SERIALIZATION
// ============================================================================

/// UTF-8 CSV with a byte-order mark, header row first
pub fn to_csv(items: &[Prestation]) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(64 * (items.len() + 1));
    buf.extend_from_slice(UTF8_BOM);

    let mut wtr = csv::Writer::from_writer(buf);
    if items.is_empty() {
        wtr.write_record(CSV_HEADER)?;
    }
    for item in items {
        wtr.serialize(item)?;
    }

    wtr.into_inner().map_err(|e| PrestationError::Io(e.into_error()))
}

const CSV_HEADER: [&str; 7] = [
    "nom",
    "recurrence",
    "chronophage",
    "rentabilite",
    "satisfaction",
    "score",
    "priorite",
];

/// Pretty-printed JSON array, non-ASCII characters kept as-is
pub fn to_json(items: &[Prestation]) -> Result<String> {
    Ok(serde_json::to_string_pretty(items)?)
}

/// Parse a JSON export back into items, in file order
pub fn from_json(content: &str) -> Result<Vec<Prestation>> {
    let items: Vec<Prestation> = serde_json::from_str(content)?;
    for item in &items {
        item.validate()?;
    }
    Ok(items)
}

/// Parse a CSV export (with or without BOM) back into items
pub fn from_csv(content: &[u8]) -> Result<Vec<Prestation>> {
    let content = content.strip_prefix(UTF8_BOM).unwrap_or(content);
    let mut rdr = csv::Reader::from_reader(content);

    let mut items = Vec::new();
    for result in rdr.deserialize() {
        let item: Prestation = result?;
        item.validate()?;
        items.push(item);
    }

    Ok(items)
}

/// Load a previous export, picking the parser from the file extension
pub fn load_file(path: &Path) -> Result<Vec<Prestation>> {
    let format = ExportFormat::from_path(path).ok_or_else(|| {
        PrestationError::invalid_input(format!(
            "unsupported export file {:?}: expected .csv or .json",
            path
        ))
    })?;

    let items = match format {
        ExportFormat::Json => from_json(&fs::read_to_string(path)?)?,
        ExportFormat::Csv => from_csv(&fs::read(path)?)?,
    };

    tracing::info!(path = %path.display(), count = items.len(), "loaded prestations");
    Ok(items)
}

// ============================================================================
// FILES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPaths {
    pub csv: PathBuf,
    pub json: PathBuf,
}

/// Write both exports into `dir`, creating it if needed
pub fn write_exports(dir: &Path, items: &[Prestation], at: &NaiveDateTime) -> Result<ExportPaths> {
    fs::create_dir_all(dir)?;

    let paths = ExportPaths {
        csv: dir.join(export_file_name(ExportFormat::Csv, at)),
        json: dir.join(export_file_name(ExportFormat::Json, at)),
    };

    fs::write(&paths.csv, to_csv(items)?)?;
    fs::write(&paths.json, to_json(items)?)?;

    tracing::info!(
        count = items.len(),
        csv = %paths.csv.display(),
        json = %paths.json.display(),
        "exported prestations"
    );

    Ok(paths)
}

// ============================================================================
// TESTS
// ============================================================================
