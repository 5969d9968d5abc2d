//! Breadboard hole lists.
//!
//! Hole lists come from two places:
//! 1. [`standard_layout`], a generated full-height breadboard
//! 2. A JSON file of `{ "id", "bus", "type" }` records produced by the
//!    rendering side (extra fields such as pixel coordinates are ignored)

use std::path::Path;

use super::{ConnectionPoint, HoleKind};
use crate::core::BreadGuardError;

pub const DEFAULT_COLUMNS: u32 = 30;
pub const MAX_COLUMNS: u32 = 200;

const TOP_ROWS: [char; 5] = ['A', 'B', 'C', 'D', 'E'];
const BOTTOM_ROWS: [char; 5] = ['F', 'G', 'H', 'I', 'J'];

/// Generate a breadboard with `columns` numbered columns.
///
/// Terminal strips: rows A-E of column `n` share bus `bus{n}-top`, rows
/// F-J share `bus{n}-bottom`. Rails run the full length, one hole per
/// column: `TP{n}`/`TN{n}` on the top power/ground rails and
/// `BP{n}`/`BN{n}` on the bottom ones.
///
/// `columns` is capped at [`MAX_COLUMNS`].
pub fn standard_layout(columns: u32) -> Vec<ConnectionPoint> {
    if columns > MAX_COLUMNS {
        tracing::warn!("Breadboard of {} columns capped at {}", columns, MAX_COLUMNS);
    }
    let columns = columns.min(MAX_COLUMNS);
    let mut points = Vec::with_capacity(columns as usize * 14);

    for column in 1..=columns {
        for row in TOP_ROWS {
            points.push(ConnectionPoint::new(
                format!("{}{}", column, row),
                format!("bus{}-top", column),
                HoleKind::Main,
            ));
        }
        for row in BOTTOM_ROWS {
            points.push(ConnectionPoint::new(
                format!("{}{}", column, row),
                format!("bus{}-bottom", column),
                HoleKind::Main,
            ));
        }
    }

    let rails = [
        ("TP", "rail-top-power", HoleKind::Power),
        ("TN", "rail-top-ground", HoleKind::Ground),
        ("BP", "rail-bottom-power", HoleKind::Power),
        ("BN", "rail-bottom-ground", HoleKind::Ground),
    ];
    for (prefix, bus, kind) in rails {
        for column in 1..=columns {
            points.push(ConnectionPoint::new(format!("{}{}", prefix, column), bus, kind));
        }
    }

    points
}

/// Parse a JSON array of hole records. Records that do not match the
/// expected shape are skipped with a warning.
pub fn parse_holes(content: &str) -> Result<Vec<ConnectionPoint>, BreadGuardError> {
    let records: Vec<serde_json::Value> = serde_json::from_str(content)?;
    let mut points = Vec::with_capacity(records.len());

    for (position, record) in records.into_iter().enumerate() {
        match serde_json::from_value::<ConnectionPoint>(record) {
            Ok(point) => points.push(point),
            Err(e) => tracing::warn!("Skipping hole record #{}: {}", position, e),
        }
    }

    if points.is_empty() {
        return Err(BreadGuardError::Layout(
            "hole list contains no usable records".to_string(),
        ));
    }

    Ok(points)
}

/// Load a hole list from a JSON file.
pub fn load_holes(path: &Path) -> Result<Vec<ConnectionPoint>, BreadGuardError> {
    let content = std::fs::read_to_string(path)?;
    let points = parse_holes(&content)?;
    tracing::info!("Loaded {} breadboard holes from {}", points.len(), path.display());
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breadboard::BusIndex;

    #[test]
    fn test_standard_layout_counts() {
        let points = standard_layout(30);
        // 10 terminal holes per column plus 4 rails of 30 holes
        assert_eq!(points.len(), 30 * 10 + 4 * 30);

        let index = BusIndex::new(points);
        // two terminal strips per column plus 4 rails
        assert_eq!(index.bus_count(), 30 * 2 + 4);
    }

    #[test]
    fn test_column_count_is_capped() {
        let index = BusIndex::new(standard_layout(u32::MAX));
        assert_eq!(index.bus_count(), MAX_COLUMNS as usize * 2 + 4);
        assert!(index.contains("200J"));
        assert!(!index.contains("201A"));
    }

    #[test]
    fn test_terminal_strips_split_at_center() {
        let index = BusIndex::new(standard_layout(10));
        assert_eq!(index.bus_of("5A"), Some("bus5-top"));
        assert_eq!(index.bus_of("5E"), Some("bus5-top"));
        assert_eq!(index.bus_of("5F"), Some("bus5-bottom"));
        assert_eq!(index.bus_of("5J"), Some("bus5-bottom"));
        assert_ne!(index.bus_of("5E"), index.bus_of("5F"));
    }

    #[test]
    fn test_rails_have_kinds() {
        let index = BusIndex::new(standard_layout(10));
        assert_eq!(index.point("TP3").map(|p| p.kind), Some(HoleKind::Power));
        assert_eq!(index.point("BN7").map(|p| p.kind), Some(HoleKind::Ground));
        assert_eq!(index.bus_of("TN1"), index.bus_of("TN10"));
        assert_ne!(index.bus_of("TN1"), index.bus_of("BN1"));
        assert!(!index.contains("TP11"));
    }

    #[test]
    fn test_parse_holes_skips_bad_records() {
        let json = r#"[
            {"id": "1A", "bus": "b1", "type": "main"},
            {"id": "1B", "type": "main"},
            {"id": "P1", "bus": "p", "type": "power", "x": 10, "y": 4}
        ]"#;
        let points = parse_holes(json).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[1].kind, HoleKind::Power);
    }

    #[test]
    fn test_parse_holes_rejects_empty() {
        assert!(matches!(parse_holes("[]"), Err(BreadGuardError::Layout(_))));
        assert!(matches!(parse_holes("{"), Err(BreadGuardError::Json(_))));
    }

    #[test]
    fn test_load_holes_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("holes.json");
        let json = serde_json::to_string(&standard_layout(3)).unwrap();
        std::fs::write(&path, json).unwrap();

        let points = load_holes(&path).unwrap();
        assert_eq!(points, standard_layout(3));
    }
}
