//! Merge command implementation
//!
//! Collects metric files written by earlier runs into a single CSV. A
//! metric file may hold a JSON object, a Python dict literal, or
//! `name: value` lines; files that yield no number are kept with their
//! raw text.

use anyhow::{Context, Result};
use clap::Args;
use regex::Regex;
use serde_json::Value as JsonValue;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::error::CliError;

/// Columns placed first, in this order, when present
const PREFERRED_ORDER: &[&str] = &[
    "precision",
    "recall",
    "f1",
    "relaxed_precision",
    "relaxed_recall",
    "relaxed_f1",
    "textual_precision",
    "textual_recall",
    "textual_f1",
];

const RAW_CONTENT: &str = "raw_content";

/// Arguments for the merge command
#[derive(Debug, Args)]
pub struct MergeArgs {
    /// Directory searched for metric files
    #[arg(short, long, value_name = "DIR")]
    pub base_dir: PathBuf,

    /// Glob pattern relative to the base directory
    #[arg(short, long, value_name = "PATTERN", default_value = "**/*_METRICS.txt")]
    pub pattern: String,

    /// Output CSV file
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,
}

/// One metric file after parsing
#[derive(Debug, Clone, PartialEq)]
pub struct MetricRow {
    /// Path relative to the base directory
    pub file: String,
    /// Parsed metric values
    pub metrics: BTreeMap<String, f64>,
    /// File content, kept when nothing could be parsed
    pub raw: Option<String>,
}

impl MergeArgs {
    /// Execute the merge command
    pub fn execute(&self) -> Result<()> {
        if !self.base_dir.is_dir() {
            return Err(CliError::FileNotFound(self.base_dir.display().to_string()).into());
        }

        let rows = collect_metrics(&self.base_dir, &self.pattern)?;
        write_csv(&rows, &self.output)?;

        if rows.is_empty() {
            eprintln!(
                "No metric files matched {} under {}",
                self.pattern,
                self.base_dir.display()
            );
            println!("Wrote empty CSV to {}", self.output.display());
        } else {
            println!(
                "Merged {} metric files into {}",
                rows.len(),
                self.output.display()
            );
        }
        Ok(())
    }
}

/// Find and parse every metric file under `base_dir` matching `pattern`
pub fn collect_metrics(base_dir: &Path, pattern: &str) -> Result<Vec<MetricRow>> {
    let full_pattern = base_dir.join(pattern).display().to_string();
    let paths = glob::glob(&full_pattern)
        .map_err(|e| CliError::InvalidPattern(format!("{full_pattern} ({e})")))?;

    let mut files = Vec::new();
    for path in paths {
        let path = path.with_context(|| format!("Error resolving pattern: {full_pattern}"))?;
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();

    let mut rows = Vec::with_capacity(files.len());
    for path in files {
        let text = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;
        let metrics = parse_metrics(&text);
        let file = path
            .strip_prefix(base_dir)
            .unwrap_or(&path)
            .display()
            .to_string();

        if metrics.is_empty() {
            log::warn!("no metrics parsed from {file}");
        }
        let raw = metrics.is_empty().then(|| text.trim().to_string());
        rows.push(MetricRow { file, metrics, raw });
    }
    Ok(rows)
}

/// Write rows as CSV: `file`, preferred metrics, other metrics sorted by name
pub fn write_csv(rows: &[MetricRow], output: &Path) -> Result<()> {
    let mut keys: BTreeSet<&str> = rows
        .iter()
        .flat_map(|row| row.metrics.keys().map(String::as_str))
        .collect();
    let has_raw = rows.iter().any(|row| row.raw.is_some());

    let mut header = vec!["file"];
    for &name in PREFERRED_ORDER {
        if keys.remove(name) {
            header.push(name);
        }
    }
    header.extend(keys);
    if has_raw {
        header.push(RAW_CONTENT);
    }

    let mut writer = csv::Writer::from_path(output)
        .with_context(|| format!("Failed to create output file: {}", output.display()))?;
    writer.write_record(&header)?;
    for row in rows {
        let record: Vec<String> = header
            .iter()
            .map(|&column| match column {
                "file" => row.file.clone(),
                RAW_CONTENT => row.raw.clone().unwrap_or_default(),
                name => row
                    .metrics
                    .get(name)
                    .map(|value| value.to_string())
                    .unwrap_or_default(),
            })
            .collect();
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Parse a metric file: JSON first, then a Python dict literal, then lines
pub fn parse_metrics(text: &str) -> BTreeMap<String, f64> {
    let text = text.trim();
    parse_json_metrics(text)
        .or_else(|| parse_json_metrics(&python_literal_to_json(text)))
        .unwrap_or_else(|| parse_metric_lines(text))
}

fn json_number(value: &JsonValue) -> Option<f64> {
    match value {
        JsonValue::Number(number) => number.as_f64(),
        JsonValue::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
        _ => None,
    }
}

/// A flat object, a `{"scores": {...}}` report, or a one-report array
fn parse_json_metrics(text: &str) -> Option<BTreeMap<String, f64>> {
    let value: JsonValue = serde_json::from_str(text).ok()?;
    let object = match &value {
        JsonValue::Object(map) => map
            .get("scores")
            .and_then(JsonValue::as_object)
            .unwrap_or(map),
        JsonValue::Array(items) if items.len() == 1 => items[0].get("scores")?.as_object()?,
        _ => return None,
    };

    Some(
        object
            .iter()
            .filter_map(|(name, value)| json_number(value).map(|n| (name.clone(), n)))
            .collect(),
    )
}

/// Rewrite a Python literal (quotes, `None`, `True`, `False`) as JSON
pub fn python_literal_to_json(input: &str) -> String {
    const KEYWORDS: [(&str, &str); 3] = [("None", "null"), ("True", "true"), ("False", "false")];

    let mut out = String::with_capacity(input.len());
    let mut chars = input.char_indices();

    while let Some((i, c)) = chars.next() {
        match c {
            '\'' => {
                out.push('"');
                while let Some((_, sc)) = chars.next() {
                    match sc {
                        '\\' => match chars.next() {
                            Some((_, '\'')) => out.push('\''),
                            Some((_, next)) => {
                                out.push('\\');
                                out.push(next);
                            }
                            None => out.push('\\'),
                        },
                        '\'' => break,
                        '"' => out.push_str("\\\""),
                        _ => out.push(sc),
                    }
                }
                out.push('"');
            }
            '"' => {
                out.push('"');
                while let Some((_, sc)) = chars.next() {
                    out.push(sc);
                    match sc {
                        '\\' => {
                            if let Some((_, next)) = chars.next() {
                                out.push(next);
                            }
                        }
                        '"' => break,
                        _ => {}
                    }
                }
            }
            _ => {
                let rest = &input[i..];
                match KEYWORDS.iter().find(|(keyword, _)| rest.starts_with(keyword)) {
                    Some((keyword, json)) => {
                        out.push_str(json);
                        // keywords are ASCII, one char per byte
                        for _ in 1..keyword.len() {
                            chars.next();
                        }
                    }
                    None => out.push(c),
                }
            }
        }
    }

    out
}

fn metric_line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*([^:=]+?)\s*[:=]\s*([-+0-9.eE]+)\s*$").expect("valid regex")
    })
}

/// `name: value` or `name = value` lines; other lines are skipped
fn parse_metric_lines(text: &str) -> BTreeMap<String, f64> {
    text.lines()
        .filter_map(|line| {
            let captures = metric_line_regex().captures(line)?;
            let value = captures[2].parse::<f64>().ok()?;
            Some((captures[1].trim().to_string(), value))
        })
        .collect()
}
