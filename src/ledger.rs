use std::io;

use chrono::NaiveDate;

use crate::{Money, Sku};

/// One day of one SKU in the reconstructed ledger
///
/// Rows are produced by the [`RelationBuilder`](crate::RelationBuilder) and
/// are immutable afterwards.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct LedgerRow {
    #[serde(rename = "Fecha")]
    date: NaiveDate,
    #[serde(rename = "SKU")]
    sku: Sku,
    #[serde(rename = "Stock")]
    stock: u64,
    #[serde(rename = "Unidades_Vendidas")]
    units_sold: u64,
    #[serde(rename = "Reposicion")]
    replenishment: i64,
    #[serde(rename = "Precio_Unitario")]
    unit_price: Money,
    #[serde(rename = "Ingresos_Brutos")]
    gross_revenue: Money,
}

impl LedgerRow {
    /// The column names of the CSV representation, in order
    pub const COLUMNS: [&'static str; 7] = [
        "Fecha",
        "SKU",
        "Stock",
        "Unidades_Vendidas",
        "Reposicion",
        "Precio_Unitario",
        "Ingresos_Brutos",
    ];

    /// Creates a row and derives its gross revenue
    ///
    /// A revenue too large to be represented is logged and recorded as zero.
    pub(crate) fn new(
        date: NaiveDate,
        sku: Sku,
        stock: u64,
        units_sold: u64,
        replenishment: i64,
        unit_price: Money,
    ) -> Self {
        let gross_revenue = match unit_price.checked_mul(Money::from(units_sold)) {
            Some(revenue) => revenue.normalize(),
            None => {
                log::warn!("revenue of {sku} on {date} overflows ({unit_price} x {units_sold}), using 0");
                Money::ZERO
            }
        };

        Self {
            date,
            sku,
            stock,
            units_sold,
            replenishment,
            unit_price: unit_price.normalize(),
            gross_revenue,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn sku(&self) -> &Sku {
        &self.sku
    }

    /// The stock on hand at the start of the day
    pub fn stock(&self) -> u64 {
        self.stock
    }

    pub fn units_sold(&self) -> u64 {
        self.units_sold
    }

    /// Manual stock adjustment of the day, applied to the next day's stock
    pub fn replenishment(&self) -> i64 {
        self.replenishment
    }

    pub fn unit_price(&self) -> Money {
        self.unit_price
    }

    /// `unit_price * units_sold`
    pub fn gross_revenue(&self) -> Money {
        self.gross_revenue
    }

    /// The stock on hand at the start of the following day
    ///
    /// The stock never drops below zero.
    pub fn closing_stock(&self) -> u64 {
        let closing = i128::from(self.stock) - i128::from(self.units_sold) + i128::from(self.replenishment);
        closing.clamp(0, i128::from(u64::MAX)) as u64
    }
}

/// Writes `rows` as CSV with a header line
///
/// The header is written even if there are no rows.
pub fn write_ledger<W: io::Write>(rows: &[LedgerRow], writer: W) -> Result<(), csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    writer.write_record(LedgerRow::COLUMNS)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}
