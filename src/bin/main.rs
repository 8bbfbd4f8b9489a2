use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use stock_ledger::{parse_overrides, write_ledger, BuildOptions, DuplicateSales, OverridePolicy, RelationBuilder, SkuOrder};

/// Rebuilds the daily stock and sales ledger from a stock snapshot and a sales log
#[derive(Debug, Parser)]
#[clap(version)]
struct Args {
    /// The path to the stock snapshot CSV file
    #[clap(long)]
    stock: PathBuf,
    /// The path to the sales log CSV file
    #[clap(long, alias = "ventas")]
    sales: PathBuf,
    /// Where to write the ledger CSV file, stdout if left out
    #[clap(long)]
    output: Option<PathBuf>,
    /// A JSON file with manual overrides of sales and replenishment
    #[clap(long)]
    overrides: Option<PathBuf>,
    /// How to merge sales lines of the same date and SKU [sum, last-wins]
    #[clap(long, default_value_t = DuplicateSales::default())]
    duplicate_sales: DuplicateSales,
    /// Which override wins when several select the same cell [last-wins, first-wins]
    #[clap(long, default_value_t = OverridePolicy::default())]
    duplicate_overrides: OverridePolicy,
    /// The order of SKU groups in the ledger [snapshot, lexical]
    #[clap(long, default_value_t = SkuOrder::default())]
    sku_order: SkuOrder,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let stock = File::open(&args.stock)
        .with_context(|| format!("could not open {}", args.stock.display()))?;
    let sales = File::open(&args.sales)
        .with_context(|| format!("could not open {}", args.sales.display()))?;
    let overrides = match &args.overrides {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("could not read {}", path.display()))?;
            parse_overrides(&json)?
        }
        None => Vec::new(),
    };

    let builder = RelationBuilder::with_options(BuildOptions {
        duplicate_sales: args.duplicate_sales,
        duplicate_overrides: args.duplicate_overrides,
        sku_order: args.sku_order,
    });
    let rows = builder.build_from_readers(stock, sales, &overrides)?;

    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("could not create {}", path.display()))?;
            write_ledger(&rows, BufWriter::new(file))?;
            log::info!("wrote {} rows to {}", rows.len(), path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut stdout = stdout.lock();
            write_ledger(&rows, &mut stdout)?;
            stdout.flush()?;
        }
    }

    Ok(())
}
