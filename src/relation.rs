use std::fmt;
use std::io;
use std::str::FromStr;

use crate::{
    DuplicateSales, LedgerRow, Override, OverridePolicy, OverrideSet, RelationError, SalesLog, StockRecord,
    StockSnapshot,
};

/// The order in which SKU groups are emitted
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SkuOrder {
    /// The order of the stock snapshot
    #[default]
    Snapshot,
    /// Sorted by SKU text
    Lexical,
}

impl FromStr for SkuOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "snapshot" => Ok(Self::Snapshot),
            "lexical" => Ok(Self::Lexical),
            other => Err(format!("unknown SKU order '{other}', expected 'snapshot' or 'lexical'")),
        }
    }
}

impl fmt::Display for SkuOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Snapshot => "snapshot",
            Self::Lexical => "lexical",
        })
    }
}

/// Policies of a relation build
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BuildOptions {
    pub duplicate_sales: DuplicateSales,
    pub duplicate_overrides: OverridePolicy,
    pub sku_order: SkuOrder,
}

/// Reconstructs the daily stock ledger from a stock snapshot and a sales log
///
/// The ledger covers every SKU of the snapshot on every date of the sales log.
/// Within a SKU, the first date starts with the snapshot stock and every
/// following date starts with the closing stock of the day before:
///
/// `stock[t] = max(stock[t-1] - units_sold[t-1] + replenishment[t-1], 0)`
///
/// Overrides replace the sales and replenishment of single cells before the
/// stock is carried on and before revenue is derived.
#[derive(Debug, Default)]
pub struct RelationBuilder {
    options: BuildOptions,
}

impl RelationBuilder {
    /// Creates a builder with the default policies
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: BuildOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> BuildOptions {
        self.options
    }

    /// Reads, validates and relates a stock table and a sales table in CSV format
    ///
    /// Both tables are validated before a single row is related.
    pub fn build_from_readers<S, V>(
        &self,
        stock: S,
        sales: V,
        overrides: &[Override],
    ) -> Result<Vec<LedgerRow>, RelationError>
        where S: io::Read,
              V: io::Read,
    {
        let stock = StockSnapshot::from_reader(stock)?;
        let sales = SalesLog::from_reader(sales)?;

        Ok(self.build(&stock, &sales, overrides))
    }

    /// Relates an already validated snapshot and sales log
    pub fn build(&self, stock: &StockSnapshot, sales: &SalesLog, overrides: &[Override]) -> Vec<LedgerRow> {
        let dates = sales.dates();
        let date_keys = dates
            .iter()
            .map(|date| date.format("%Y-%m-%d").to_string())
            .collect::<Vec<_>>();
        let units = sales.units_by_cell(self.options.duplicate_sales);
        let overrides = OverrideSet::new(overrides, self.options.duplicate_overrides);

        let mut records = stock.records().iter().collect::<Vec<&StockRecord>>();
        if self.options.sku_order == SkuOrder::Lexical {
            records.sort_by(|a, b| a.sku.cmp(&b.sku));
        }

        let unknown = units.keys().filter(|sku| stock.get(sku).is_none()).count();
        if unknown > 0 {
            log::debug!("{unknown} SKUs of the sales log are not part of the stock snapshot");
        }
        log::debug!("relating {} SKUs over {} dates", records.len(), dates.len());

        let mut rows = Vec::with_capacity(records.len() * dates.len());
        let mut applied = 0;
        for record in records {
            let sold = units.get(&record.sku);
            let mut on_hand = record.initial_stock;

            for (&date, key) in dates.iter().zip(&date_keys) {
                let mut units_sold = sold.and_then(|sold| sold.get(&date)).copied().unwrap_or(0);
                let mut replenishment = 0;

                if let Some(adjustment) = overrides.get(key, &record.sku) {
                    applied += 1;
                    units_sold = adjustment.units_sold.unwrap_or(units_sold);
                    replenishment = adjustment.replenishment.unwrap_or(replenishment);
                }

                let row = LedgerRow::new(date, record.sku.clone(), on_hand, units_sold, replenishment, record.unit_price);
                on_hand = row.closing_stock();
                rows.push(row);
            }
        }

        if applied < overrides.len() {
            log::debug!("{} overrides matched no ledger row", overrides.len() - applied);
        }
        log::info!("related {} ledger rows", rows.len());

        rows
    }
}

/// Relates a stock table and a sales table in CSV format with the default policies
pub fn build_relation<S, V>(stock: S, sales: V, overrides: &[Override]) -> Result<Vec<LedgerRow>, RelationError>
    where S: io::Read,
          V: io::Read,
{
    RelationBuilder::new().build_from_readers(stock, sales, overrides)
}
