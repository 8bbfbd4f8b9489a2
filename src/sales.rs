use std::collections::{BTreeSet, HashMap};
use std::collections::hash_map::Entry;
use std::fmt;
use std::io;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};

use crate::{coerce, validate_headers, RelationError, Sku, Table};

/// A single line of the sales log
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SalesEvent {
    pub date: NaiveDate,
    pub sku: Sku,
    pub units_sold: u64,
}

#[derive(Debug, serde::Deserialize)]
struct RawSalesRow {
    #[serde(rename = "Fecha")]
    date: String,
    #[serde(rename = "SKU")]
    sku: String,
    #[serde(rename = "Unidades_Vendidas")]
    units_sold: String,
}

/// How to merge sales log lines that share a date and SKU
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DuplicateSales {
    /// The units of all lines are added up
    #[default]
    Sum,
    /// The last line replaces earlier ones
    LastWins,
}

impl FromStr for DuplicateSales {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sum" => Ok(Self::Sum),
            "last-wins" => Ok(Self::LastWins),
            other => Err(format!("unknown duplicate sales policy '{other}', expected 'sum' or 'last-wins'")),
        }
    }
}

impl fmt::Display for DuplicateSales {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Sum => "sum",
            Self::LastWins => "last-wins",
        })
    }
}

/// Parses a calendar date
///
/// Timestamps are accepted as well, their time of day is dropped.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|dt| dt.date()))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S").map(|dt| dt.date()))
        .ok()
}

/// The sales log, as read from the input table
#[derive(Debug, Default)]
pub struct SalesLog {
    events: Vec<SalesEvent>,
}

impl SalesLog {
    /// Reads and validates a sales table in CSV format
    ///
    /// Dates are required to parse, a single malformed date fails the read.
    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self, RelationError> {
        let table = Table::Sales;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader.headers().map_err(RelationError::csv(table))?.clone();
        validate_headers(table, &headers)?;

        let mut events = Vec::new();
        for record in reader.records() {
            let record = record.map_err(RelationError::csv(table))?;
            let line = record.position().map_or(0, |position| position.line());
            let row: RawSalesRow = record
                .deserialize(Some(&headers))
                .map_err(RelationError::csv(table))?;

            let date = parse_date(&row.date).ok_or_else(|| RelationError::InvalidDate {
                table,
                line,
                value: row.date.clone(),
            })?;
            events.push(SalesEvent {
                date,
                sku: Sku::new(&row.sku),
                units_sold: coerce::or_default(table, line, "Unidades_Vendidas", &row.units_sold, coerce::count, 0),
            });
        }

        Ok(Self { events })
    }

    pub fn from_events(events: Vec<SalesEvent>) -> Self {
        Self { events }
    }

    pub fn events(&self) -> &[SalesEvent] {
        &self.events
    }

    /// The distinct dates of the log in ascending order
    ///
    /// Lines of any SKU count, known to the snapshot or not.
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.events
            .iter()
            .map(|event| event.date)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Units sold per SKU and date, merging duplicate lines with `policy`
    pub fn units_by_cell(&self, policy: DuplicateSales) -> HashMap<Sku, HashMap<NaiveDate, u64>> {
        let mut cells: HashMap<Sku, HashMap<NaiveDate, u64>> = HashMap::new();
        for event in &self.events {
            match cells.entry(event.sku.clone()).or_default().entry(event.date) {
                Entry::Vacant(v) => {
                    v.insert(event.units_sold);
                }
                Entry::Occupied(mut o) => {
                    log::debug!("duplicate sales line for {} on {}", event.sku, event.date);
                    let units = o.get_mut();
                    *units = match policy {
                        DuplicateSales::Sum => units.saturating_add(event.units_sold),
                        DuplicateSales::LastWins => event.units_sold,
                    };
                }
            }
        }

        cells
    }
}
