use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::models::sales_report::{DailyActivityCount, SalesReport};
use crate::sales_log::SalesLogError;

/// On-disk row layout. Column headers are fixed and shared with the
/// spreadsheet tooling that reads the same file.
#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    #[serde(rename = "日付")]
    date: NaiveDate,
    #[serde(rename = "営業担当者")]
    salesperson: String,
    #[serde(rename = "訪問先")]
    client: String,
    #[serde(rename = "活動内容")]
    activity: String,
    #[serde(rename = "成果")]
    result: String,
}

impl From<CsvRow> for SalesReport {
    fn from(row: CsvRow) -> Self {
        SalesReport {
            date: row.date,
            salesperson: row.salesperson,
            client: row.client,
            activity: row.activity,
            result: row.result,
        }
    }
}

impl From<SalesReport> for CsvRow {
    fn from(report: SalesReport) -> Self {
        CsvRow {
            date: report.date,
            salesperson: report.salesperson,
            client: report.client,
            activity: report.activity,
            result: report.result,
        }
    }
}

/// Handle on the sales log file. Cheap to clone; holds no open file.
#[derive(Debug, Clone)]
pub struct SalesLog {
    path: PathBuf,
}

impl SalesLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads every report. A missing file is an empty log.
    pub async fn load(&self) -> Result<Vec<SalesReport>, SalesLogError> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || read_all(&path))
            .await
            .map_err(|e| SalesLogError::Task(e.to_string()))?
    }

    /// Appends one report by reading the whole file, pushing the new row and
    /// rewriting the file. Returns the number of reports now stored.
    pub async fn append(&self, report: SalesReport) -> Result<usize, SalesLogError> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || {
            let mut reports = read_all(&path)?;
            reports.push(report);
            write_all(&path, &reports)?;
            Ok(reports.len())
        })
        .await
        .map_err(|e| SalesLogError::Task(e.to_string()))?
    }
}

fn read_all(path: &Path) -> Result<Vec<SalesReport>, SalesLogError> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let mut reader = csv::Reader::from_path(path)?;
    reader
        .deserialize::<CsvRow>()
        .map(|row| row.map(SalesReport::from).map_err(SalesLogError::from))
        .collect()
}

fn write_all(path: &Path, reports: &[SalesReport]) -> Result<(), SalesLogError> {
    replace_file(path, |file| {
        let mut writer = csv::Writer::from_writer(file);
        for report in reports {
            writer.serialize(CsvRow::from(report.clone()))?;
        }
        writer.flush()?;
        Ok(())
    })?;
    info!("Sales log {} now holds {} reports", path.display(), reports.len());
    Ok(())
}

/// Writes into a temporary file next to `path` and renames it over `path`
/// only once `write` succeeds. On error the previous file is untouched.
fn replace_file<F>(path: &Path, write: F) -> Result<(), SalesLogError>
where
    F: FnOnce(&mut NamedTempFile) -> Result<(), SalesLogError>,
{
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir)?;
    write(&mut file)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| SalesLogError::Io(e.error))?;
    Ok(())
}

/// Reports per date, sorted by date ascending.
pub fn daily_activity_counts(reports: &[SalesReport]) -> Vec<DailyActivityCount> {
    let mut counts: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for report in reports {
        *counts.entry(report.date).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(date, count)| DailyActivityCount { date, count })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(date: &str, salesperson: &str) -> SalesReport {
        SalesReport {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            salesperson: salesperson.to_string(),
            client: "株式会社テスト".to_string(),
            activity: "訪問, 提案".to_string(),
            result: "次回見積もり\n提出予定".to_string(),
        }
    }

    #[tokio::test]
    async fn test_missing_file_is_empty_log() {
        let dir = tempfile::tempdir().unwrap();
        let log = SalesLog::new(dir.path().join("sales_reports.csv"));
        assert!(log.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_append_preserves_existing_rows_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let log = SalesLog::new(dir.path().join("sales_reports.csv"));

        assert_eq!(log.append(report("2024-10-01", "佐藤")).await.unwrap(), 1);
        assert_eq!(log.append(report("2024-09-30", "鈴木")).await.unwrap(), 2);

        let reports = log.load().await.unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0], report("2024-10-01", "佐藤"));
        assert_eq!(reports[1], report("2024-09-30", "鈴木"));
    }

    #[tokio::test]
    async fn test_file_uses_japanese_headers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales_reports.csv");
        let log = SalesLog::new(&path);
        log.append(report("2024-10-01", "佐藤")).await.unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            contents.lines().next().unwrap(),
            "日付,営業担当者,訪問先,活動内容,成果"
        );
        assert!(contents.contains("2024-10-01,佐藤"));
    }

    #[tokio::test]
    async fn test_reads_file_written_by_other_tools() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales_reports.csv");
        std::fs::write(
            &path,
            "日付,営業担当者,訪問先,活動内容,成果\n2024-08-01,田中,A社,電話,アポ獲得\n",
        )
        .unwrap();

        let reports = SalesLog::new(&path).load().await.unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].salesperson, "田中");
        assert_eq!(reports[0].result, "アポ獲得");
    }

    #[tokio::test]
    async fn test_corrupt_date_is_csv_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales_reports.csv");
        std::fs::write(
            &path,
            "日付,営業担当者,訪問先,活動内容,成果\nyesterday,田中,A社,電話,アポ獲得\n",
        )
        .unwrap();

        let err = SalesLog::new(&path).load().await.unwrap_err();
        assert!(matches!(err, SalesLogError::Csv(_)));
    }

    #[tokio::test]
    async fn test_failed_rewrite_keeps_previous_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales_reports.csv");
        let log = SalesLog::new(&path);
        log.append(report("2024-10-01", "佐藤")).await.unwrap();
        let before = std::fs::read_to_string(&path).unwrap();

        let err = replace_file(&path, |file| {
            use std::io::Write;
            file.write_all("日付,営業".as_bytes())?;
            Err(SalesLogError::Io(std::io::Error::other("disk full")))
        })
        .unwrap_err();

        assert!(matches!(err, SalesLogError::Io(_)));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
        assert_eq!(log.load().await.unwrap(), vec![report("2024-10-01", "佐藤")]);
    }

    #[tokio::test]
    async fn test_rewrite_leaves_no_stray_files() {
        let dir = tempfile::tempdir().unwrap();
        let log = SalesLog::new(dir.path().join("sales_reports.csv"));
        log.append(report("2024-10-01", "佐藤")).await.unwrap();
        log.append(report("2024-10-02", "鈴木")).await.unwrap();

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("sales_reports.csv")]);
    }

    #[test]
    fn test_daily_counts_sorted_by_date() {
        let reports = vec![
            report("2024-10-02", "a"),
            report("2024-10-01", "b"),
            report("2024-10-02", "c"),
            report("2024-09-15", "d"),
        ];
        let counts = daily_activity_counts(&reports);
        let pairs: Vec<(String, usize)> = counts
            .iter()
            .map(|c| (c.date.to_string(), c.count))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("2024-09-15".to_string(), 1),
                ("2024-10-01".to_string(), 1),
                ("2024-10-02".to_string(), 2),
            ]
        );
    }

    #[test]
    fn test_daily_counts_empty() {
        assert!(daily_activity_counts(&[]).is_empty());
    }
}
