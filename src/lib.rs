pub use self::{
    ledger::{write_ledger, LedgerRow},
    overrides::{parse_overrides, Adjustment, Override, OverridePolicy, OverrideSet},
    relation::{build_relation, BuildOptions, RelationBuilder, SkuOrder},
    sales::{parse_date, DuplicateSales, SalesEvent, SalesLog},
    schema::{validate_headers, RelationError, Table},
    sku::Sku,
    stock::{StockRecord, StockSnapshot},
};

/// Monetary amounts, like unit prices and revenue
pub type Money = rust_decimal::Decimal;

mod coerce;
mod ledger;
mod overrides;
mod relation;
mod sales;
mod schema;
mod sku;
mod stock;
