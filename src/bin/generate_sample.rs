use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Datasets written by this generator: file name and row count.
const DATASETS: [(&str, usize); 2] = [("dataset_small.csv", 10_000), ("dataset_large.csv", 50_000)];

fn write_dataset(path: &Path, rows: usize) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;

    writer.write_record(["number", "mod3", "mod4", "mod5", "parity"])?;

    for n in 1..=rows {
        let parity = if n % 2 == 0 { "even" } else { "odd" };
        writer.write_record([
            n.to_string(),
            (n % 3).to_string(),
            (n % 4).to_string(),
            (n % 5).to_string(),
            parity.to_string(),
        ])?;
    }

    writer.flush().with_context(|| format!("flushing {}", path.display()))?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data"));
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    for (name, rows) in DATASETS {
        let path = out_dir.join(name);
        write_dataset(&path, rows)?;
        log::info!("Wrote {rows} rows to {}", path.display());
        println!("Wrote {rows} rows to {}", path.display());
    }

    Ok(())
}
