use std::fmt;

/// The input tables consumed by the relation builder
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Table {
    /// The point-in-time stock snapshot
    Stock,
    /// The per day sales log
    Sales,
}

impl Table {
    /// The columns a table has to carry to be accepted
    ///
    /// Only `SKU`, `Stock` and `Precio_Unitario` of the stock table take part in
    /// the computation, the remaining stock columns are required nevertheless.
    pub fn required_columns(self) -> &'static [&'static str] {
        match self {
            Table::Stock => &[
                "SKU",
                "Producto",
                "Categoría",
                "Talla",
                "Color",
                "Stock",
                "Precio_Unitario",
                "Umbral",
            ],
            Table::Sales => &["Fecha", "SKU", "Unidades_Vendidas"],
        }
    }

    /// The file name used to attribute errors
    pub fn file_name(self) -> &'static str {
        match self {
            Table::Stock => "stock.csv",
            Table::Sales => "ventas.csv",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

/// Possible errors to occur while reading the inputs of a relation build
///
/// All variants are format errors of the caller's input and permanent for
/// that input.
#[derive(Debug, thiserror::Error)]
pub enum RelationError {
    #[error("{} - missing columns: {}", .table, .columns.join(", "))]
    MissingColumns {
        table: Table,
        columns: Vec<&'static str>,
    },
    #[error("{table} - could not be read: {source}")]
    Csv {
        table: Table,
        #[source]
        source: csv::Error,
    },
    #[error("{table} - line {line}: invalid date '{value}'")]
    InvalidDate {
        table: Table,
        line: u64,
        value: String,
    },
    #[error("overrides could not be read: {0}")]
    Overrides(#[from] serde_json::Error),
}

impl RelationError {
    pub(crate) fn csv(table: Table) -> impl FnOnce(csv::Error) -> Self {
        move |source| RelationError::Csv { table, source }
    }
}

/// Checks that all required columns of `table` are present in `headers`
///
/// Columns are matched after trimming, in any order. Extra columns are fine.
pub fn validate_headers(table: Table, headers: &csv::StringRecord) -> Result<(), RelationError> {
    let columns = table
        .required_columns()
        .iter()
        .copied()
        .filter(|required| !headers.iter().any(|header| header.trim() == *required))
        .collect::<Vec<_>>();

    match columns.is_empty() {
        true => Ok(()),
        false => Err(RelationError::MissingColumns { table, columns }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(line: &str) -> csv::StringRecord {
        csv::StringRecord::from(line.split(',').collect::<Vec<_>>())
    }

    #[test]
    fn accepts_complete_stock_headers() {
        let headers = headers("SKU,Producto,Categoría,Talla,Color,Stock,Precio_Unitario,Umbral");
        assert!(validate_headers(Table::Stock, &headers).is_ok());
    }

    #[test]
    fn accepts_reordered_and_extra_columns() {
        let headers = headers("Unidades_Vendidas, Tienda ,SKU, Fecha");
        assert!(validate_headers(Table::Sales, &headers).is_ok());
    }

    #[test]
    fn names_missing_price_column() {
        let headers = headers("SKU,Producto,Categoría,Talla,Color,Stock,Umbral");
        let err = validate_headers(Table::Stock, &headers).unwrap_err();

        match &err {
            RelationError::MissingColumns { table, columns } => {
                assert_eq!(*table, Table::Stock);
                assert_eq!(columns, &vec!["Precio_Unitario"]);
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(err.to_string(), "stock.csv - missing columns: Precio_Unitario");
    }

    #[test]
    fn names_every_missing_sales_column() {
        let headers = headers("SKU");
        let err = validate_headers(Table::Sales, &headers).unwrap_err();
        assert_eq!(err.to_string(), "ventas.csv - missing columns: Fecha, Unidades_Vendidas");
    }
}
