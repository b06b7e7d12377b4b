//! Read-back verification of generated dataset files.

use crate::errors::BenchError;
use crate::record::{DATASET_HEADER, Record};
use crate::sampler::{SECONDS_PER_YEAR, user_id_end, window_start};
use chrono::{NaiveDateTime, TimeDelta};
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub rows: u64,
    pub min_ts: Option<NaiveDateTime>,
    pub max_ts: Option<NaiveDateTime>,
    pub max_user_id: u64,
    pub price_sum: f64,
}

/// Verify the dataset file at `path`.
///
/// # Errors
/// `BenchError::Io` if the file cannot be opened, `BenchError::Dataset` on the
/// first row that breaks the file contract.
pub fn verify_dataset(path: impl AsRef<Path>) -> Result<DatasetSummary, BenchError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| BenchError::io(path.display(), e))?;
    verify_reader(BufReader::new(file))
}

/// Verify a dataset from any reader: exact header, a single header row,
/// contiguous order ids from 1, and per-field bounds.
///
/// # Errors
/// `BenchError::Dataset` naming the offending line.
pub fn verify_reader<R: Read>(reader: R) -> Result<DatasetSummary, BenchError> {
    let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
    let headers = rdr
        .headers()
        .map_err(|e| BenchError::Dataset { line: 1, reason: e.to_string() })?
        .clone();
    if !headers.iter().eq(DATASET_HEADER.iter().copied()) {
        return Err(BenchError::Dataset {
            line: 1,
            reason: format!("unexpected header: {}", headers.iter().collect::<Vec<_>>().join(",")),
        });
    }
    let start = window_start()?;
    let end = start + TimeDelta::seconds(SECONDS_PER_YEAR);
    let mut summary = DatasetSummary {
        rows: 0,
        min_ts: None,
        max_ts: None,
        max_user_id: 0,
        price_sum: 0.0,
    };
    for row in rdr.records() {
        let row = row.map_err(|e| BenchError::Dataset {
            line: e.position().map_or(0, csv::Position::line),
            reason: e.to_string(),
        })?;
        let line = row.position().map_or(0, csv::Position::line);
        let bad = |reason: String| BenchError::Dataset { line, reason };
        if row.get(0) == Some(DATASET_HEADER[0]) {
            return Err(bad("repeated header row".into()));
        }
        let rec: Record = row.deserialize(Some(&headers)).map_err(|e| bad(e.to_string()))?;
        let expected = summary.rows + 1;
        if rec.order_id != expected {
            return Err(bad(format!("order_id {} where {} was expected", rec.order_id, expected)));
        }
        rec.validate().map_err(|e| bad(e.to_string()))?;
        if rec.timestamp < start || rec.timestamp >= end {
            return Err(bad(format!("timestamp {} outside window", rec.timestamp)));
        }
        summary.rows = expected;
        summary.min_ts = Some(summary.min_ts.map_or(rec.timestamp, |t| t.min(rec.timestamp)));
        summary.max_ts = Some(summary.max_ts.map_or(rec.timestamp, |t| t.max(rec.timestamp)));
        summary.max_user_id = summary.max_user_id.max(rec.user_id);
        summary.price_sum += rec.price;
    }
    let bound = user_id_end(usize::try_from(summary.rows).unwrap_or(usize::MAX));
    if summary.rows > 0 && summary.max_user_id >= bound {
        return Err(BenchError::Dataset {
            line: 0,
            reason: format!("user_id {} not below {}", summary.max_user_id, bound),
        });
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const HEADER: &str =
        "order_id,ts,user_id,product_id,price,quantity,category,country,device,rating\n";

    #[test]
    fn accepts_well_formed_rows() {
        let data = format!(
            "{HEADER}1,2023-01-01T00:00:05,3,10,5.5,1,toys,US,tablet,4.0\n\
             2,2023-06-01T12:00:00,4,11,1.01,4,home,IN,mobile,1.0\n"
        );
        let s = verify_reader(Cursor::new(data)).unwrap();
        assert_eq!(s.rows, 2);
        assert_eq!(s.max_user_id, 4);
        assert!((s.price_sum - 6.51).abs() < 1e-9);
    }

    #[test]
    fn rejects_gap_in_order_ids() {
        let data = format!(
            "{HEADER}1,2023-01-01T00:00:05,3,10,5.5,1,toys,US,tablet,4.0\n\
             3,2023-01-01T00:00:05,3,10,5.5,1,toys,US,tablet,4.0\n"
        );
        let err = verify_reader(Cursor::new(data)).unwrap_err();
        assert!(matches!(err, BenchError::Dataset { line: 3, .. }), "{err}");
    }

    #[test]
    fn rejects_second_header() {
        let data = format!("{HEADER}1,2023-01-01T00:00:05,3,10,5.5,1,toys,US,tablet,4.0\n{HEADER}");
        let err = verify_reader(Cursor::new(data)).unwrap_err();
        assert!(err.to_string().contains("repeated header"));
    }

    #[test]
    fn rejects_unknown_category() {
        let data = format!("{HEADER}1,2023-01-01T00:00:05,3,10,5.5,1,garden,US,tablet,4.0\n");
        assert!(verify_reader(Cursor::new(data)).is_err());
    }
}
