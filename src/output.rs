//! CSV output for the raw event log and the per-key summary

use std::collections::BTreeMap;
use std::fmt::Display;
use std::path::Path;

use crate::capture::EventLog;

/// Write a two-column table: header row, then one row per entry in iteration
/// order. Callers pass ordered maps, so rows come out ascending by key.
///
/// The output directory must already exist; a missing directory or a failure
/// mid-write propagates and is fatal for the run.
pub fn write_table<K, V>(
    path: &Path,
    header: [&str; 2],
    rows: impl IntoIterator<Item = (K, V)>,
) -> csv::Result<()>
where
    K: Display,
    V: Display,
{
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(header)?;
    for (key, value) in rows {
        writer.write_record([key.to_string(), value.to_string()])?;
    }
    writer.flush()?;
    Ok(())
}

/// Event file: `Time in ms,key pressed`, ascending by timestamp.
pub fn write_event_log(path: &Path, log: &EventLog) -> csv::Result<()> {
    write_table(path, ["Time in ms", "key pressed"], log.iter())
}

/// Summary file: `key pressed,summed up time`, ascending by key.
pub fn write_summary(path: &Path, summary: &BTreeMap<char, i64>) -> csv::Result<()> {
    write_table(path, ["key pressed", "summed up time"], summary.iter())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::LogEntry;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn event_log_rows_ascend_by_timestamp() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("obs_0000_ethoc.csv");

        let mut log = EventLog::new();
        log.insert(4000, LogEntry::ManualExit);
        log.insert(1500, LogEntry::Key('b'));

        write_event_log(&path, &log).unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(
            contents,
            "Time in ms,key pressed\n1500,b\n4000,End of recording - manual exit\n"
        );
    }

    #[test]
    fn timeout_marker_is_written_verbatim() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("obs_0000_ethoc.csv");

        let mut log = EventLog::new();
        log.insert(4000, LogEntry::Timeout { elapsed_secs: 4 });

        write_event_log(&path, &log).unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("4000,End of recording - time out after 4 seconds\n"));
    }

    #[test]
    fn summary_rows_ascend_by_key() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("obs_0000_summary.csv");

        let mut summary = BTreeMap::new();
        summary.insert('b', 2500i64);
        summary.insert('a', 1500i64);

        write_summary(&path, &summary).unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "key pressed,summed up time\na,1500\nb,2500\n");
    }

    #[test]
    fn negative_totals_are_preserved() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("obs_0000_summary.csv");

        let mut summary = BTreeMap::new();
        summary.insert('a', -250i64);

        write_summary(&path, &summary).unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("a,-250\n"));
    }

    #[test]
    fn missing_directory_is_an_error() {
        let mut summary = BTreeMap::new();
        summary.insert('a', 1i64);
        let result = write_summary(Path::new("/nonexistent/ethocount/x.csv"), &summary);
        assert!(result.is_err());
    }
}
