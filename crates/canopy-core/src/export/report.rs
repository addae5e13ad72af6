//! CSV report of tree-to-speaker distances

use std::path::Path;

use crate::error::{CanopyError, Result};
use crate::export::ensure_parent_dirs;
use crate::models::Station;

/// Write one row per tree with its identity fields and a
/// `distance_to_speakerN` column per speaker, in speaker input order.
/// Distances are meters with centimeter precision.
pub fn write_distance_report(
    path: &Path,
    trees: &[&Station],
    speaker_count: usize,
    matrix: &[Vec<f64>],
) -> Result<()> {
    if matrix.len() != trees.len() {
        return Err(CanopyError::Serialization(format!(
            "distance matrix has {} rows for {} trees",
            matrix.len(),
            trees.len()
        )));
    }

    ensure_parent_dirs(path)?;
    let mut writer = csv::Writer::from_path(path)?;

    let mut header = vec![
        "label".to_string(),
        "row".to_string(),
        "designation".to_string(),
        "sound_dB".to_string(),
        "latitude".to_string(),
        "longitude".to_string(),
    ];
    for i in 1..=speaker_count {
        header.push(format!("distance_to_speaker{i}"));
    }
    writer.write_record(&header)?;

    for (tree, distances) in trees.iter().zip(matrix) {
        let mut record = vec![
            tree.kind.label().to_string(),
            tree.row.to_string(),
            tree.designation.clone(),
            tree.sound_db.map(|db| db.to_string()).unwrap_or_default(),
            format!("{:.6}", tree.lat),
            format!("{:.6}", tree.lon),
        ];
        for distance in distances {
            record.push(format!("{distance:.2}"));
        }
        writer.write_record(&record)?;
    }

    writer.flush()?;
    tracing::debug!(path = %path.display(), trees = trees.len(), "wrote distance report");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StationKind;

    fn tree(row: u32, designation: &str) -> Station {
        Station {
            kind: StationKind::Tree,
            row,
            designation: designation.to_string(),
            sound_db: Some(60.0),
            lon: 164.24,
            lat: -20.75,
        }
    }

    #[test]
    fn test_report_columns_follow_speaker_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("distances.csv");

        let t1 = tree(1, "A");
        let t2 = tree(2, "B");
        let trees = vec![&t1, &t2];
        let matrix = vec![vec![10.0, 20.455], vec![30.0, 40.0]];

        write_distance_report(&path, &trees, 2, &matrix).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        let header = lines.next().unwrap();
        assert!(header.ends_with("distance_to_speaker1,distance_to_speaker2"));

        let first = lines.next().unwrap();
        assert!(first.starts_with("tree,1,A,60,"));
        assert!(first.ends_with("10.00,20.46"));
    }

    #[test]
    fn test_mismatched_matrix_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("distances.csv");

        let t1 = tree(1, "A");
        let trees = vec![&t1];
        let err = write_distance_report(&path, &trees, 1, &[]).unwrap_err();
        assert!(matches!(err, CanopyError::Serialization(_)));
    }

    #[test]
    fn test_empty_trees_writes_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("distances.csv");

        write_distance_report(&path, &[], 3, &[]).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 1);
    }
}
