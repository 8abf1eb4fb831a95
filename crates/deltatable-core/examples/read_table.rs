//! Print the live files and row count of a table, optionally at a version.
//!
//! Usage: `cargo run --example read_table -- <table-root> [version]`

use deltatable_core::{
    storage::TableLocation,
    table::{DeltaTable, ResolveMode},
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let root = args.next().ok_or("usage: read_table <table-root> [version]")?;
    let version = args.next().map(|v| v.parse::<u64>()).transpose()?;

    let mut table = DeltaTable::open(TableLocation::parse(&root)?).await?;
    if let Some(version) = version {
        table.as_version(version, ResolveMode::InPlace).await?;
    }

    println!("{root} @ version {}", table.version());
    for path in table.file_paths() {
        println!("  {}", path.display());
    }

    let batch = table.to_table(&table.scan_options()).await?;
    println!("{} rows, {} columns", batch.num_rows(), batch.num_columns());
    Ok(())
}
