//! Example of scoring a generated result against the expected one

use sqleval_core::sql::{extract_sql_statement, sql_similarity};
use sqleval_core::{canonicalize, compare, evaluate, Config, Table, Value};

fn events(rows: &[(i64, &str, &str)]) -> Result<Table, Box<dyn std::error::Error>> {
    let columns = vec!["activity_id".into(), "case_id".into(), "activity".into()];
    let data = rows
        .iter()
        .map(|&(id, case, activity)| vec![Value::from(id), Value::from(case), Value::from(activity)])
        .collect();
    Ok(Table::new(columns, data)?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Example 1: One-call scoring with default configuration
    println!("=== Example 1: Default Scoring ===");
    let expected = events(&[(1, "c1", "create"), (2, "c1", "approve"), (3, "c2", "create")])?;
    let produced = events(&[(7, "c1", "create"), (8, "c1", "approve"), (9, "c2", "pay")])?;

    let scores = compare(expected.clone(), produced.clone(), &Config::default())?;
    for (name, score) in scores.iter() {
        println!("  {name:<18} {score:.3}");
    }

    // Example 2: Canonical forms and the raw evaluation
    println!("\n=== Example 2: Step by Step ===");
    let config = Config::builder()
        .relaxed_exclude(["activity_id"])
        .textual_threshold(0.9)
        .build()?;
    let expected = canonicalize(expected, &config.preprocess)?;
    let produced = canonicalize(produced, &config.preprocess)?;
    println!("Canonical columns: {:?}", expected.columns());

    let evaluation = evaluate(&expected, &produced, &config.metrics)?;
    println!("Row F1:     {:.3}", evaluation.rows.f1);
    println!("Relaxed F1: {:.3}", evaluation.relaxed.f1);
    println!("Cell F1:    {:.3}", evaluation.cells.f1);

    // Example 3: SQL text helpers
    println!("\n=== Example 3: SQL Text ===");
    let response = "Here you go:\n```sql\nSELECT case_id, activity\n  FROM events;\n```";
    let generated = extract_sql_statement(response);
    println!("Extracted: {generated}");
    println!(
        "Similarity to reference: {:.3}",
        sql_similarity(generated, "SELECT case_id, activity FROM events;")
    );

    Ok(())
}
