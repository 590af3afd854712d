use anyhow::Context;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Each artifact is a directory holding a single part file, mirroring how
/// the downstream plotting tooling expects to pick the data up.
const PART_FILE: &str = "part-00000.csv";

/// Basic CSV exporter: serializes rows with a header line derived from the
/// row type's field names.
pub(crate) fn write_rows<W: std::io::Write, S: Serialize>(
    writer: W,
    rows: &[S],
) -> Result<(), anyhow::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes one named output artifact under the output base directory and
/// returns the path of the file it produced. Rerunning overwrites the
/// previous part file in place.
pub(crate) fn write_artifact<S: Serialize>(
    output_base: &Path,
    name: &str,
    rows: &[S],
) -> Result<PathBuf, anyhow::Error> {
    let dir = output_base.join(name);
    std::fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
    let path = dir.join(PART_FILE);
    let file =
        std::fs::File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    write_rows(file, rows).with_context(|| format!("writing {}", path.display()))?;
    debug!(path = %path.display(), rows = rows.len(), "artifact written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::write_artifact;
    use crate::data::CountRow;
    use std::fs;

    fn temp_base(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(name)
    }

    fn rows() -> Vec<CountRow> {
        vec![
            CountRow {
                committee_id: "A".to_string(),
                count: 2,
            },
            CountRow {
                committee_id: "B".to_string(),
                count: 1,
            },
        ]
    }

    #[test]
    fn writes_part_file_with_header_row() {
        let base = temp_base("election_donations_test_write");
        let _ = fs::remove_dir_all(&base);

        let path = write_artifact(&base, "number_of_donations_per_campaign", &rows()).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines, ["committee_id,count", "A,2", "B,1"]);

        fs::remove_dir_all(&base).unwrap();
    }

    #[test]
    fn rerun_overwrites_instead_of_appending() {
        let base = temp_base("election_donations_test_overwrite");
        let _ = fs::remove_dir_all(&base);

        write_artifact(&base, "counts", &rows()).unwrap();
        let path = write_artifact(&base, "counts", &rows()).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 3);

        fs::remove_dir_all(&base).unwrap();
    }
}
