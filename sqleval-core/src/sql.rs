//! Helpers for the SQL text around a result
//!
//! LLM responses wrap the generated query in prose or code fences; these
//! functions pull the statement out and compare two scripts textually.

use regex::Regex;
use std::sync::OnceLock;

/// Leading keywords that start a statement
pub const STATEMENT_KEYWORDS: &[&str] = &[
    "SELECT", "WITH", "INSERT", "UPDATE", "DELETE", "CREATE", "ALTER", "DROP", "GRANT", "REVOKE",
    "TRUNCATE", "MERGE", "CALL", "EXPLAIN", "SHOW", "USE",
];

fn statement_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let pattern = format!(r"(?is)\b({})\b.*?;", STATEMENT_KEYWORDS.join("|"));
        Regex::new(&pattern).expect("statement pattern is valid")
    })
}

/// First statement in `text`, from its leading keyword up to the closing `;`
///
/// Matching ignores case and spans lines. When no terminated statement is
/// found the whole text is returned unchanged.
///
/// ```
/// use sqleval_core::sql::extract_sql_statement;
///
/// let response = "Here is the query:\n```sql\nselect id\nfrom orders;\n```";
/// assert_eq!(extract_sql_statement(response), "select id\nfrom orders;");
/// ```
pub fn extract_sql_statement(text: &str) -> &str {
    match statement_regex().find(text) {
        Some(found) => found.as_str(),
        None => {
            log::debug!("no terminated SQL statement found, keeping full text");
            text
        }
    }
}

/// Collapse runs of whitespace on each line and drop blank lines
pub fn normalize_sql(text: &str) -> String {
    text.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Normalized Levenshtein similarity of two scripts after [`normalize_sql`]
pub fn sql_similarity(left: &str, right: &str) -> f64 {
    strsim::normalized_levenshtein(&normalize_sql(left), &normalize_sql(right))
}

/// Whether two scripts are equal after [`normalize_sql`]
pub fn sql_identical(left: &str, right: &str) -> bool {
    normalize_sql(left) == normalize_sql(right)
}
