use std::collections::HashMap;
use std::io;

use crate::{coerce, validate_headers, Money, RelationError, Sku, Table};

/// The snapshot state of a single SKU
///
/// Only `sku`, `initial_stock` and `unit_price` take part in the ledger, the
/// descriptive fields are carried along for callers.
#[derive(Clone, Debug, PartialEq)]
pub struct StockRecord {
    pub sku: Sku,
    pub initial_stock: u64,
    pub unit_price: Money,
    pub name: String,
    pub category: String,
    pub size: String,
    pub color: String,
    pub reorder_threshold: String,
}

#[derive(Debug, serde::Deserialize)]
struct RawStockRow {
    #[serde(rename = "SKU")]
    sku: String,
    #[serde(rename = "Producto")]
    name: String,
    #[serde(rename = "Categoría")]
    category: String,
    #[serde(rename = "Talla")]
    size: String,
    #[serde(rename = "Color")]
    color: String,
    #[serde(rename = "Stock")]
    stock: String,
    #[serde(rename = "Precio_Unitario")]
    unit_price: String,
    #[serde(rename = "Umbral")]
    reorder_threshold: String,
}

impl RawStockRow {
    fn into_record(self, line: u64) -> StockRecord {
        let table = Table::Stock;
        StockRecord {
            sku: Sku::new(&self.sku),
            initial_stock: coerce::or_default(table, line, "Stock", &self.stock, coerce::count, 0),
            unit_price: coerce::or_default(
                table,
                line,
                "Precio_Unitario",
                &self.unit_price,
                coerce::money,
                Money::ZERO,
            ),
            name: self.name,
            category: self.category,
            size: self.size,
            color: self.color,
            reorder_threshold: self.reorder_threshold,
        }
    }
}

/// The stock on hand of every known SKU at the start of the observed period
///
/// Every SKU appears once. The snapshot keeps the order in which SKUs first
/// appeared in the input table.
#[derive(Debug, Default)]
pub struct StockSnapshot {
    records: Vec<StockRecord>,
    index: HashMap<Sku, usize>,
}

impl StockSnapshot {
    /// Reads and validates a stock table in CSV format
    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self, RelationError> {
        let table = Table::Stock;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader.headers().map_err(RelationError::csv(table))?.clone();
        validate_headers(table, &headers)?;

        let mut records = Vec::new();
        for record in reader.records() {
            let record = record.map_err(RelationError::csv(table))?;
            let line = record.position().map_or(0, |position| position.line());
            let row: RawStockRow = record
                .deserialize(Some(&headers))
                .map_err(RelationError::csv(table))?;
            records.push(row.into_record(line));
        }

        Ok(Self::from_records(records))
    }

    /// Builds a snapshot from already parsed records
    ///
    /// A SKU listed more than once keeps the position of its first listing and
    /// the values of its last one.
    pub fn from_records(records: impl IntoIterator<Item = StockRecord>) -> Self {
        let mut snapshot = Self::default();
        for record in records {
            match snapshot.index.get(&record.sku) {
                Some(&i) => {
                    log::warn!("{} - SKU {} listed more than once, keeping the last listing", Table::Stock, record.sku);
                    snapshot.records[i] = record;
                }
                None => {
                    snapshot.index.insert(record.sku.clone(), snapshot.records.len());
                    snapshot.records.push(record);
                }
            }
        }

        snapshot
    }

    /// All records in snapshot order
    pub fn records(&self) -> &[StockRecord] {
        &self.records
    }

    pub fn get(&self, sku: &Sku) -> Option<&StockRecord> {
        self.index.get(sku).map(|&i| &self.records[i])
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(csv: &str) -> Result<StockSnapshot, RelationError> {
        StockSnapshot::from_reader(csv.as_bytes())
    }

    #[test]
    fn reads_records() {
        let snapshot = snapshot(
            r#"SKU, Producto,      Categoría, Talla, Color, Stock, Precio_Unitario, Umbral
               1001, Camiseta, Ropa,      M,     Rojo,  50,    20,              5
               1002, Gorra,    Accesorio, U,     Negro, 12,    7.25,            2"#,
        ).unwrap();

        assert_eq!(snapshot.len(), 2);
        let first = &snapshot.records()[0];
        assert_eq!(first.sku, Sku::new("1001"));
        assert_eq!(first.initial_stock, 50);
        assert_eq!(first.unit_price, Money::from(20));
        assert_eq!(first.name, "Camiseta");
        assert_eq!(first.reorder_threshold, "5");

        let second = snapshot.get(&Sku::new("1002")).unwrap();
        assert_eq!(second.unit_price, Money::new(725, 2));
        assert_eq!(second.color, "Negro");
    }

    #[test]
    fn unreadable_numbers_become_zero() {
        let snapshot = snapshot(
            r#"SKU, Producto, Categoría, Talla, Color, Stock, Precio_Unitario, Umbral
               1001, A,       B,         M,     Rojo,  many,  ,                5
               1002, A,       B,         M,     Rojo,  -4,    free,            5"#,
        ).unwrap();

        for record in snapshot.records() {
            assert_eq!(record.initial_stock, 0);
            assert_eq!(record.unit_price, Money::ZERO);
        }
    }

    #[test]
    fn duplicate_skus_keep_first_position_and_last_values() {
        let snapshot = snapshot(
            r#"SKU, Producto, Categoría, Talla, Color, Stock, Precio_Unitario, Umbral
               1001, A,       B,         M,     Rojo,  50,    20,              5
               1002, A,       B,         M,     Rojo,  10,    5,               5
               1001.0, A,     B,         M,     Rojo,  30,    25,              5"#,
        ).unwrap();

        let skus = snapshot.records().iter().map(|r| r.sku.as_str()).collect::<Vec<_>>();
        assert_eq!(skus, vec!["1001", "1002"]);
        assert_eq!(snapshot.records()[0].initial_stock, 30);
        assert_eq!(snapshot.records()[0].unit_price, Money::from(25));
    }

    #[test]
    fn rejects_missing_columns_before_rows() {
        let err = snapshot(
            r#"SKU, Producto, Categoría, Talla, Color, Stock, Umbral
               1001, A,       B,         M,     Rojo,  50,    5"#,
        ).unwrap_err();

        assert!(matches!(
            err,
            RelationError::MissingColumns { table: Table::Stock, ref columns } if columns == &vec!["Precio_Unitario"]
        ));
    }

    #[test]
    fn ragged_rows_are_format_errors() {
        let err = snapshot(
            r#"SKU, Producto, Categoría, Talla, Color, Stock, Precio_Unitario, Umbral
               1001, A"#,
        ).unwrap_err();

        assert!(matches!(err, RelationError::Csv { table: Table::Stock, .. }));
    }
}
