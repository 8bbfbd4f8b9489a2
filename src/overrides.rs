use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::{RelationError, Sku};

/// A manual correction of a single ledger cell
///
/// The cell is selected by date (`YYYY-MM-DD`, compared as text) and SKU.
/// Fields left out keep the simulated value of the cell.
#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize)]
pub struct Override {
    #[serde(rename = "Fecha", alias = "date")]
    pub date: String,
    #[serde(rename = "SKU", alias = "sku")]
    pub sku: Sku,
    #[serde(rename = "Unidades_Vendidas", alias = "units_sold", default)]
    pub units_sold: Option<u64>,
    #[serde(rename = "Reposicion", alias = "replenishment", default)]
    pub replenishment: Option<i64>,
}

/// Reads a list of overrides from JSON
///
/// Both `{"overrides": [...]}` and a bare `[...]` are accepted. An object
/// without an `overrides` list carries no overrides.
pub fn parse_overrides(json: &str) -> Result<Vec<Override>, RelationError> {
    use serde_json::Value;

    let list = match serde_json::from_str::<Value>(json)? {
        Value::Object(mut object) => object.remove("overrides").unwrap_or(Value::Null),
        other => other,
    };

    match list {
        Value::Null => Ok(Vec::new()),
        list => Ok(serde_json::from_value(list)?),
    }
}

/// Which override takes effect when several select the same cell
///
/// The policy is applied per field, so two partial overrides of one cell
/// touching different fields both take effect.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OverridePolicy {
    /// Later overrides replace earlier ones
    #[default]
    LastWins,
    /// The first override of a field is kept
    FirstWins,
}

impl FromStr for OverridePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "last-wins" => Ok(Self::LastWins),
            "first-wins" => Ok(Self::FirstWins),
            other => Err(format!("unknown override policy '{other}', expected 'last-wins' or 'first-wins'")),
        }
    }
}

impl fmt::Display for OverridePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::LastWins => "last-wins",
            Self::FirstWins => "first-wins",
        })
    }
}

/// The effective correction of a single cell
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Adjustment {
    pub units_sold: Option<u64>,
    pub replenishment: Option<i64>,
}

impl Adjustment {
    fn merge(&mut self, o: &Override, policy: OverridePolicy) {
        match policy {
            OverridePolicy::LastWins => {
                self.units_sold = o.units_sold.or(self.units_sold);
                self.replenishment = o.replenishment.or(self.replenishment);
            }
            OverridePolicy::FirstWins => {
                self.units_sold = self.units_sold.or(o.units_sold);
                self.replenishment = self.replenishment.or(o.replenishment);
            }
        }
    }
}

/// Overrides indexed by SKU and date, built once per ledger build
#[derive(Debug, Default)]
pub struct OverrideSet {
    cells: HashMap<Sku, HashMap<String, Adjustment>>,
    len: usize,
}

impl OverrideSet {
    pub fn new(overrides: &[Override], policy: OverridePolicy) -> Self {
        let mut cells: HashMap<Sku, HashMap<String, Adjustment>> = HashMap::new();
        for o in overrides {
            cells
                .entry(o.sku.clone())
                .or_default()
                .entry(o.date.trim().to_owned())
                .or_default()
                .merge(o, policy);
        }

        let len = cells.values().map(HashMap::len).sum();
        Self { cells, len }
    }

    /// The adjustment of the cell at `date` (`YYYY-MM-DD`) for `sku`, if any
    pub fn get(&self, date: &str, sku: &Sku) -> Option<&Adjustment> {
        self.cells.get(sku)?.get(date)
    }

    /// The number of distinct cells selected
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn o(date: &str, sku: &str, units_sold: Option<u64>, replenishment: Option<i64>) -> Override {
        Override { date: date.into(), sku: Sku::new(sku), units_sold, replenishment }
    }

    #[test]
    fn parses_wrapped_and_bare_lists() {
        let wrapped = parse_overrides(
            r#"{"overrides": [{"Fecha": "2025-06-24", "SKU": "1001", "Reposicion": 8, "Unidades_Vendidas": 3}]}"#,
        ).unwrap();
        let bare = parse_overrides(r#"[{"date": "2025-06-24", "sku": 1001, "units_sold": 3, "replenishment": 8}]"#).unwrap();

        assert_eq!(wrapped, vec![o("2025-06-24", "1001", Some(3), Some(8))]);
        assert_eq!(wrapped, bare);
    }

    #[test]
    fn missing_fields_stay_unset() {
        let list = parse_overrides(r#"[{"Fecha": "2025-06-25", "SKU": 1001, "Reposicion": -2}]"#).unwrap();
        assert_eq!(list, vec![o("2025-06-25", "1001", None, Some(-2))]);
    }

    #[test]
    fn object_without_list_is_empty() {
        assert!(parse_overrides(r#"{}"#).unwrap().is_empty());
        assert!(parse_overrides(r#"{"overrides": null}"#).unwrap().is_empty());
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(parse_overrides("{"), Err(RelationError::Overrides(_))));
        assert!(matches!(
            parse_overrides(r#"[{"Fecha": "2025-06-25", "SKU": "1", "Unidades_Vendidas": -1}]"#),
            Err(RelationError::Overrides(_))
        ));
    }

    #[test]
    fn last_wins_per_field() {
        let set = OverrideSet::new(&[
            o("2025-06-24", "1001", Some(3), None),
            o("2025-06-24", "1001", None, Some(8)),
            o("2025-06-24", "1001", Some(4), None),
        ], OverridePolicy::LastWins);

        assert_eq!(set.len(), 1);
        assert_eq!(
            set.get("2025-06-24", &Sku::new("1001")),
            Some(&Adjustment { units_sold: Some(4), replenishment: Some(8) })
        );
    }

    #[test]
    fn first_wins_per_field() {
        let set = OverrideSet::new(&[
            o("2025-06-24", "1001", Some(3), None),
            o("2025-06-24", "1001", Some(4), Some(8)),
        ], OverridePolicy::FirstWins);

        assert_eq!(
            set.get("2025-06-24", &Sku::new("1001")),
            Some(&Adjustment { units_sold: Some(3), replenishment: Some(8) })
        );
    }

    #[test]
    fn lookup_is_exact() {
        let set = OverrideSet::new(&[o(" 2025-06-24 ", "1001.0", Some(1), None)], OverridePolicy::default());

        assert!(set.get("2025-06-24", &Sku::new("1001")).is_some());
        assert!(set.get("2025-6-24", &Sku::new("1001")).is_none());
        assert!(set.get("2025-06-24", &Sku::new("1002")).is_none());
    }
}
