//! Record Normalizer: heterogeneous tabular rows to [`ShopRecord`]s.
//!
//! Rows that fail validation are dropped and reported as [`RowSkipped`];
//! only an input that is not a table at all is an error.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;

use crate::dataset::Dataset;
use crate::record::{Position, PositionError, ShopRecord};
use crate::schema::{Field, SchemaMapping};
use crate::MalformedInputError;

/// One source row keyed by header name.
pub type RawRow = HashMap<String, String>;

const CANDIDATE_DELIMITERS: [u8; 4] = [b',', b';', b'\t', b'|'];

/// A parsed table: header names plus one map per data row.
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

/// Why a row was left out of the working set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    MissingId,
    DuplicateId,
    MissingName,
    MissingCoordinate,
    UnparsableCoordinate,
    CoordinateOutOfRange,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            SkipReason::MissingId => "missing id",
            SkipReason::DuplicateId => "duplicate id",
            SkipReason::MissingName => "missing name",
            SkipReason::MissingCoordinate => "missing coordinate",
            SkipReason::UnparsableCoordinate => "unparsable coordinate",
            SkipReason::CoordinateOutOfRange => "coordinate out of range",
        };
        f.write_str(label)
    }
}

impl From<PositionError> for SkipReason {
    fn from(err: PositionError) -> Self {
        match err {
            PositionError::NonFinite => SkipReason::UnparsableCoordinate,
            PositionError::LatitudeOutOfRange | PositionError::LongitudeOutOfRange => {
                SkipReason::CoordinateOutOfRange
            }
        }
    }
}

/// A filtered row. `row` is the 1-based data row number (header excluded).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RowSkipped {
    pub row: usize,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizeReport {
    pub records: Vec<ShopRecord>,
    pub skipped: Vec<RowSkipped>,
}

impl NormalizeReport {
    #[must_use]
    pub fn skipped_by_reason(&self) -> BTreeMap<SkipReason, usize> {
        count_by_reason(&self.skipped)
    }

    #[must_use]
    pub fn into_dataset(self) -> Dataset {
        Dataset::new(self.records)
    }
}

/// Tally skipped rows per reason.
#[must_use]
pub fn count_by_reason(skipped: &[RowSkipped]) -> BTreeMap<SkipReason, usize> {
    let mut counts = BTreeMap::new();
    for skip in skipped {
        *counts.entry(skip.reason).or_insert(0) += 1;
    }
    counts
}

/// Parse delimiter-separated text with a header row.
///
/// The delimiter is picked from `,` `;` tab `|` by frequency in the header
/// line. Short rows leave trailing columns absent; invalid UTF-8 is replaced
/// rather than rejected so one bad row cannot fail the load.
///
/// # Errors
///
/// Returns [`MalformedInputError::Empty`] for blank input or a blank header
/// and [`MalformedInputError::Csv`] if the reader fails outright.
pub fn parse_table(input: &[u8]) -> Result<Table, MalformedInputError> {
    let input = input.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(input);
    if input.iter().all(u8::is_ascii_whitespace) {
        return Err(MalformedInputError::Empty);
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(sniff_delimiter(input))
        .has_headers(true)
        .flexible(true)
        .from_reader(input);

    let headers: Vec<String> = reader
        .byte_headers()?
        .iter()
        .map(|h| String::from_utf8_lossy(h).trim().to_string())
        .collect();
    if headers.iter().all(String::is_empty) {
        return Err(MalformedInputError::Empty);
    }

    let mut rows = Vec::new();
    for record in reader.byte_records() {
        let record = record?;
        let row: RawRow = headers
            .iter()
            .zip(record.iter())
            .filter(|(header, _)| !header.is_empty())
            .map(|(header, value)| (header.clone(), String::from_utf8_lossy(value).into_owned()))
            .collect();
        rows.push(row);
    }

    Ok(Table { headers, rows })
}

fn sniff_delimiter(input: &[u8]) -> u8 {
    let header_line = input.split(|&b| b == b'\n').next().unwrap_or_default();
    CANDIDATE_DELIMITERS
        .into_iter()
        .map(|d| (d, header_line.iter().filter(|&&b| b == d).count()))
        .filter(|&(_, count)| count > 0)
        .max_by_key(|&(_, count)| count)
        .map_or(b',', |(d, _)| d)
}

/// Parse and normalize a whole tabular document.
///
/// # Errors
///
/// Returns [`MalformedInputError`] if the text is not a table or its header
/// names none of the columns in `schema`.
pub fn normalize_text(
    input: &[u8],
    schema: &SchemaMapping,
) -> Result<NormalizeReport, MalformedInputError> {
    let table = parse_table(input)?;

    if !table.headers.iter().any(|h| schema.recognizes(h)) {
        return Err(MalformedInputError::UnrecognizedHeader {
            found: table.headers,
        });
    }

    Ok(normalize(&table.rows, schema))
}

/// Convert raw rows to canonical records, preserving input order.
///
/// Never fails: rows missing an id, a name, or a usable position are
/// dropped and listed in [`NormalizeReport::skipped`]. Ids are unique in the
/// output; the first row with a given id wins.
#[must_use]
pub fn normalize(rows: &[RawRow], schema: &SchemaMapping) -> NormalizeReport {
    let mut report = NormalizeReport {
        records: Vec::with_capacity(rows.len()),
        skipped: Vec::new(),
    };

    let mut seen: HashSet<String> = HashSet::with_capacity(rows.len());

    for (index, row) in rows.iter().enumerate() {
        let outcome = normalize_row(row, schema).and_then(|record| {
            if seen.insert(record.id.clone()) {
                Ok(record)
            } else {
                Err(SkipReason::DuplicateId)
            }
        });
        match outcome {
            Ok(record) => report.records.push(record),
            Err(reason) => report.skipped.push(RowSkipped {
                row: index + 1,
                reason,
            }),
        }
    }

    report
}

fn normalize_row(row: &RawRow, schema: &SchemaMapping) -> Result<ShopRecord, SkipReason> {
    let id = schema.resolve(row, Field::Id).ok_or(SkipReason::MissingId)?;
    let name = schema
        .resolve(row, Field::Name)
        .ok_or(SkipReason::MissingName)?;

    let lat = parse_coordinate(schema.resolve(row, Field::Latitude))?;
    let lng = parse_coordinate(schema.resolve(row, Field::Longitude))?;
    let position = Position::try_new(lat, lng)?;

    let descriptive = |field| {
        schema
            .resolve(row, field)
            .map_or_else(|| schema.missing_value.clone(), str::to_string)
    };
    let province = descriptive(Field::Province);
    let sales_representative = descriptive(Field::SalesRepresentative);

    // Exact, case-sensitive match against the untrimmed cell.
    let checked_in = schema.resolve_raw(row, Field::Status) == Some(schema.checked_in_token.as_str());

    let distance_meters = schema
        .resolve(row, Field::Distance)
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|d| d.is_finite());

    let address = format!("{province}, {}", schema.address_suffix);

    Ok(ShopRecord {
        id: id.to_string(),
        name: name.to_string(),
        province,
        sales_representative,
        position,
        checked_in,
        checkin_timestamp: schema.resolve(row, Field::CheckinTimestamp).map(str::to_string),
        distance_meters,
        remark: schema.resolve(row, Field::Remark).map(str::to_string),
        address,
    })
}

fn parse_coordinate(value: Option<&str>) -> Result<f64, SkipReason> {
    let value = value.ok_or(SkipReason::MissingCoordinate)?;
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or(SkipReason::UnparsableCoordinate)
}
