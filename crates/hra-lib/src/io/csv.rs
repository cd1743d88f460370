use csv::{ReaderBuilder, StringRecord};
use log::{debug, warn};
use std::path::Path;

use crate::error::ParseError;
use crate::signal::{Sample, SeriesDataset};

const HEART_RATE_HINTS: [&str; 4] = ["heart", "hr", "bpm", "rate"];
const LABEL_HINTS: [&str; 3] = ["time", "timestamp", "date"];

/// Parse comma-separated heart-rate text into a series.
///
/// The first line is the header. The heart-rate column is the first header
/// containing one of `heart`, `hr`, `bpm` or `rate` (case-insensitive); an
/// optional label column is the first containing `time`, `timestamp` or
/// `date`. Cells are split on raw commas, quoting is not interpreted. A
/// heart-rate cell is read up to the end of its leading number, so `72 bpm`
/// is 72; rows without a finite leading number are skipped.
pub fn parse_series(text: &str) -> Result<SeriesDataset, ParseError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ParseError::EmptyInput);
    }
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(text.as_bytes());
    let mut records = reader.records();

    let headers: Vec<String> = match records.next() {
        Some(Ok(record)) => record.iter().map(|h| h.trim().to_lowercase()).collect(),
        _ => return Err(ParseError::EmptyInput),
    };
    let hr_idx =
        find_column(&headers, &HEART_RATE_HINTS).ok_or(ParseError::MissingHeartRateColumn)?;
    let label_idx = find_column(&headers, &LABEL_HINTS);
    debug!(
        "heart rate column {:?} (#{}), label column {:?}",
        headers[hr_idx],
        hr_idx,
        label_idx.map(|i| headers[i].as_str())
    );

    let mut samples: Vec<Sample> = Vec::new();
    for result in records {
        let record = match result {
            Ok(record) => record,
            Err(err) => {
                warn!("skipping unreadable row: {}", err);
                continue;
            }
        };
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let Some(value) = heart_rate_cell(&record, hr_idx) else {
            debug!("line {}: no numeric heart rate, row skipped", line);
            continue;
        };
        let index = samples.len();
        let label = label_idx
            .and_then(|idx| record.get(idx))
            .map(str::trim)
            .filter(|cell| !cell.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| index.to_string());
        samples.push(Sample {
            index,
            label,
            value,
        });
    }

    debug!("accepted {} heart rate samples", samples.len());
    SeriesDataset::new(samples).ok_or(ParseError::NoValidRows)
}

/// Read a heart-rate CSV from disk and parse it.
pub fn read_series(path: &Path) -> Result<SeriesDataset, ParseError> {
    let text = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_series(&text)
}

fn find_column(headers: &[String], hints: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| hints.iter().any(|hint| h.contains(hint)))
}

fn heart_rate_cell(record: &StringRecord, idx: usize) -> Option<f64> {
    leading_number(record.get(idx)?.trim()).filter(|v| v.is_finite())
}

/// Longest decimal number at the start of `cell`: optional sign, digits with
/// an optional fraction, then an exponent only when digits follow the `e`.
fn leading_number(cell: &str) -> Option<f64> {
    let bytes = cell.as_bytes();
    let digits_from = |start: usize| {
        start
            + bytes[start.min(bytes.len())..]
                .iter()
                .take_while(|b| b.is_ascii_digit())
                .count()
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_end = digits_from(end);
    let mut mantissa_digits = int_end - end;
    end = int_end;
    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        mantissa_digits += frac_end - (end + 1);
        if mantissa_digits > 0 {
            end = frac_end;
        }
    }
    if mantissa_digits == 0 {
        return None;
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let sign = usize::from(matches!(bytes.get(end + 1), Some(b'+' | b'-')));
        let exp_start = end + 1 + sign;
        let exp_end = digits_from(exp_start);
        if exp_end > exp_start {
            end = exp_end;
        }
    }
    cell[..end].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn parses_time_and_heart_rate() {
        let ds = parse_series("time,heart_rate\n0,72\n1,75\n2,73\n").unwrap();
        assert_eq!(ds.len(), 3);
        let indices: Vec<usize> = ds.samples().iter().map(|s| s.index).collect();
        let labels: Vec<&str> = ds.samples().iter().map(|s| s.label.as_str()).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(labels, vec!["0", "1", "2"]);
        assert_eq!(ds.values(), vec![72.0, 75.0, 73.0]);
    }

    #[test]
    fn rejects_unknown_columns() {
        let err = parse_series("foo,bar\n1,2\n").unwrap_err();
        assert!(matches!(err, ParseError::MissingHeartRateColumn));
    }

    #[test]
    fn rejects_blank_input() {
        assert!(matches!(parse_series(""), Err(ParseError::EmptyInput)));
        assert!(matches!(parse_series("  \n\n "), Err(ParseError::EmptyInput)));
    }

    #[test]
    fn rejects_rows_without_numbers() {
        let err = parse_series("time,bpm\n0,abc\n1,\n2\n").unwrap_err();
        assert!(matches!(err, ParseError::NoValidRows));
        assert!(matches!(parse_series("bpm"), Err(ParseError::NoValidRows)));
    }

    #[test]
    fn skipped_rows_do_not_leave_index_gaps() {
        let text = "Timestamp,HR\n10:00,70\n10:01,oops\n10:02\n10:03, 74 \n";
        let ds = parse_series(text).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.samples()[1].index, 1);
        assert_eq!(ds.samples()[1].label, "10:03");
        assert_eq!(ds.samples()[1].value, 74.0);
    }

    #[test]
    fn first_matching_header_wins() {
        // "rate" matches before "bpm" further right
        let ds = parse_series("date,rate,bpm\nmon,60,90\n").unwrap();
        assert_eq!(ds.samples()[0].value, 60.0);
        assert_eq!(ds.samples()[0].label, "mon");
    }

    #[test]
    fn falls_back_to_index_labels() {
        let ds = parse_series("heart\n61\n62\n").unwrap();
        assert_eq!(ds.samples()[0].label, "0");
        let ds = parse_series("time,hr\n,61\n5,62\n").unwrap();
        assert_eq!(ds.samples()[0].label, "0");
        assert_eq!(ds.samples()[1].label, "5");
    }

    #[test]
    fn handles_crlf_and_rejects_non_finite() {
        let ds = parse_series("time,hr\r\n0,70\r\n1,NaN\r\n2,inf\r\n3,71\r\n").unwrap();
        assert_eq!(ds.values(), vec![70.0, 71.0]);
        assert_eq!(ds.samples()[1].label, "3");
    }

    #[test]
    fn unit_suffixes_after_the_number_are_ignored() {
        let ds = parse_series("time,hr\n0,72 bpm\n1,75bpm\n2,bpm72\n3,-\n4,80.5/min\n").unwrap();
        assert_eq!(ds.values(), vec![72.0, 75.0, 80.5]);
        assert_eq!(ds.samples()[2].label, "4");
    }

    #[test]
    fn leading_number_reads_the_longest_prefix() {
        assert_eq!(leading_number("72"), Some(72.0));
        assert_eq!(leading_number("+71.5x"), Some(71.5));
        assert_eq!(leading_number(".5"), Some(0.5));
        assert_eq!(leading_number("72."), Some(72.0));
        assert_eq!(leading_number("7e1 bpm"), Some(70.0));
        assert_eq!(leading_number("7e"), Some(7.0));
        assert_eq!(leading_number("7e+"), Some(7.0));
        assert_eq!(leading_number("0x10"), Some(0.0));
        assert_eq!(leading_number("bpm72"), None);
        assert_eq!(leading_number("."), None);
        assert_eq!(leading_number("-"), None);
        assert_eq!(leading_number("NaN"), None);
        assert_eq!(leading_number("inf"), None);
        assert_eq!(leading_number(""), None);
    }

    #[test]
    fn commas_are_never_quoted() {
        // the quoted label splits in two and pushes the heart rate out of its column
        let ds = parse_series("time,hr\n\"a,b\",70\n\"c\",71\n").unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.samples()[0].value, 71.0);
        assert_eq!(ds.samples()[0].label, "\"c\"");
    }

    #[test]
    fn reads_fixture_from_disk() {
        let ds = read_series(&sample_path("test_data/resting.csv")).expect("read fixture");
        assert_eq!(ds.len(), 30);
        assert_eq!(ds.samples()[0].label, "2024-01-01T08:00:00");
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = read_series(&sample_path("test_data/does_not_exist.csv")).unwrap_err();
        assert!(matches!(err, ParseError::Io { .. }));
        assert!(err.to_string().starts_with("Failed to read "));
        assert!(err.to_string().ends_with("does_not_exist.csv"));
    }

    fn sample_path(relative: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .parent()
            .and_then(|p| p.parent())
            .expect("workspace root")
            .join(relative)
    }
}
