//! Example of using trainlog-core directly from Rust.

use std::path::PathBuf;

use trainlog_core::{compute_summary, storage, Session, WeekLabel};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let store = PathBuf::from("./data/example_store.csv");
    let week = WeekLabel::current().to_string();

    // 1. Log a short session
    let mut session = Session::new();
    session.add("Sentadilla", &week, 100.0, 5)?;
    session.add("Sentadilla", &week, 105.0, 5)?;
    session.add("Sentadilla", &week, 110.0, 3)?;
    let saved = session.save(&store)?;
    println!("Saved {} sets for {}", saved.len(), week);

    // 2. Recompute the summary from the whole store
    let records = storage::load_records(&store)?;
    for row in compute_summary(&records) {
        println!(
            "{:<12} {:<18} {:>7.1} kg  1RM {:>7.2}  intensity {:>6.2}%",
            row.exercise, row.week, row.mean_weight, row.estimated_one_rep_max, row.intensity_pct
        );
    }

    Ok(())
}
