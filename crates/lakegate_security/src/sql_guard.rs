//! Read-only SQL gate.
//!
//! Classifies a SQL string as safe or rejected before a write-capable
//! execution path runs it. The analysis is textual: comments are stripped,
//! whitespace collapsed, then each destructive keyword is checked at
//! word boundaries. Keywords that legitimately appear inside subqueries or
//! common-table-expression bodies (`CREATE`, `INSERT`, `REPLACE`) are only
//! flagged at main-statement positions.

use regex::RegexBuilder;
use thiserror::Error;

/// Destructive keywords, checked in this order. The first hit wins.
const DESTRUCTIVE_KEYWORDS: &[&str] = &[
    "DROP", "DELETE", "TRUNCATE", "ALTER", "UPDATE", "INSERT", "MERGE", "CREATE", "REPLACE",
];

/// Subset allowed in subqueries and CTE bodies but not as main operations.
/// Non-strict mode drops these from the scan entirely (temp-table patterns).
const CONDITIONAL_KEYWORDS: &[&str] = &["CREATE", "INSERT", "REPLACE"];

/// Statement-separator patterns rejected regardless of position.
const DANGEROUS_PATTERNS: &[(&str, &str)] = &[
    (r";\s*DROP\s+", "Contains statement separator followed by DROP"),
    (r";\s*DELETE\s+", "Contains statement separator followed by DELETE"),
    (r";\s*TRUNCATE\s+", "Contains statement separator followed by TRUNCATE"),
];

/// Outcome of validating one SQL string. Pure function of the input;
/// identical input always produces an identical verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlVerdict {
    pub is_safe: bool,
    pub violated_keyword: Option<String>,
    pub reason: Option<String>,
}

impl SqlVerdict {
    fn safe() -> Self {
        Self {
            is_safe: true,
            violated_keyword: None,
            reason: None,
        }
    }

    fn rejected(keyword: Option<&str>, reason: String) -> Self {
        Self {
            is_safe: false,
            violated_keyword: keyword.map(str::to_string),
            reason: Some(reason),
        }
    }
}

/// A statement the gate refused to pass through.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct SqlRejected {
    pub keyword: Option<String>,
    pub message: String,
}

/// Validate that a SQL string is read-only.
///
/// `strict_mode` checks every destructive keyword; non-strict exempts
/// `CREATE`, `INSERT`, and `REPLACE` so temp-table workflows can pass.
pub fn validate_read_only(sql: &str, strict_mode: bool) -> SqlVerdict {
    let normalized = normalize_sql(sql);

    for keyword in DESTRUCTIVE_KEYWORDS {
        if !strict_mode && CONDITIONAL_KEYWORDS.contains(keyword) {
            continue;
        }
        if contains_destructive_keyword(&normalized, keyword) {
            let reason = format!(
                "SQL contains potentially destructive operation '{}'. \
                 This tool is designed for read-only queries (SELECT statements).",
                keyword
            );
            return SqlVerdict::rejected(Some(keyword), reason);
        }
    }

    for (pattern, description) in DANGEROUS_PATTERNS {
        let re = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .expect("dangerous pattern regex is valid");
        if re.is_match(&normalized) {
            return SqlVerdict::rejected(
                None,
                format!("SQL contains dangerous pattern: {}", description),
            );
        }
    }

    SqlVerdict::safe()
}

/// Validate and raise: the convenience wrapper used by execution paths.
/// The rejection message carries remediation suggestions for the caller.
pub fn check_sql_safety(sql: &str, strict_mode: bool) -> Result<(), SqlRejected> {
    let verdict = validate_read_only(sql, strict_mode);
    if verdict.is_safe {
        return Ok(());
    }
    let reason = verdict.reason.unwrap_or_default();
    Err(SqlRejected {
        keyword: verdict.violated_keyword,
        message: format!("{}{}", reason, suggest_safe_alternative(sql)),
    })
}

/// Strip comments and collapse whitespace so positional checks see one
/// canonical token stream.
fn normalize_sql(sql: &str) -> String {
    let no_line_comments = RegexBuilder::new(r"--[^\n]*")
        .build()
        .expect("line comment regex is valid")
        .replace_all(sql, "");

    let no_block_comments = RegexBuilder::new(r"/\*.*?\*/")
        .dot_matches_new_line(true)
        .build()
        .expect("block comment regex is valid")
        .replace_all(&no_line_comments, "");

    let collapsed = RegexBuilder::new(r"\s+")
        .build()
        .expect("whitespace regex is valid")
        .replace_all(&no_block_comments, " ");

    collapsed.trim().to_string()
}

/// Is `keyword` present as a destructive operation?
///
/// Word-boundary matching keeps `created_at` from tripping `CREATE`. A match
/// counts when it opens the statement or follows a `;`. Conditional keywords
/// additionally escape when nested inside unbalanced open parentheses (a
/// subquery) or anywhere after a `WITH` token; unconditional keywords are
/// flagged on any occurrence.
fn contains_destructive_keyword(sql: &str, keyword: &str) -> bool {
    let re = RegexBuilder::new(&format!(r"\b{}\b", keyword))
        .case_insensitive(true)
        .build()
        .expect("keyword regex is valid");

    let conditional = CONDITIONAL_KEYWORDS.contains(&keyword);

    for m in re.find_iter(sql) {
        let before = sql[..m.start()].trim_end();

        if before.is_empty() {
            return true;
        }

        if before.ends_with(';') {
            return true;
        }

        if conditional {
            let open_parens = before.matches('(').count();
            let close_parens = before.matches(')').count();
            if open_parens > close_parens {
                continue;
            }

            let with_re = RegexBuilder::new(r"\bWITH\b")
                .case_insensitive(true)
                .build()
                .expect("WITH regex is valid");
            if with_re.is_match(before) {
                continue;
            }

            return true;
        }

        return true;
    }

    false
}

/// Build remediation text for a rejected statement, keyed on which
/// destructive keywords appear in the original text.
pub fn suggest_safe_alternative(sql: &str) -> String {
    let sql_upper = sql.to_uppercase();
    let mut suggestions: Vec<&str> = Vec::new();

    if sql_upper.contains("DROP") {
        suggestions.push(
            "Instead of DROP, use SELECT to query the table structure: \
             DESCRIBE TABLE or SHOW COLUMNS FROM",
        );
    }

    if sql_upper.contains("DELETE") || sql_upper.contains("TRUNCATE") {
        suggestions.push(
            "Instead of deleting data, use SELECT with WHERE clause to view the data you want to remove",
        );
    }

    if sql_upper.contains("UPDATE") {
        suggestions.push("Instead of UPDATE, use SELECT to view the data you want to modify");
    }

    if sql_upper.contains("INSERT") {
        suggestions.push(
            "Instead of INSERT, use SELECT to query existing data. \
             If you need to insert data, use a separate write-enabled tool.",
        );
    }

    if suggestions.is_empty() {
        return "\n\nUse SELECT statements to query data without modifying it.".to_string();
    }

    format!("\n\nSuggestions:\n- {}", suggestions.join("\n- "))
}

/// Mask quoted literals and truncate so statements can be logged without
/// leaking data values.
pub fn sanitize_sql_for_logging(sql: &str, max_length: usize) -> String {
    let masked = RegexBuilder::new(r"'[^']*'")
        .build()
        .expect("literal regex is valid")
        .replace_all(sql, "'***'");

    let masked = RegexBuilder::new(r#""[^"]*""#)
        .build()
        .expect("identifier regex is valid")
        .replace_all(&masked, "\"***\"");

    if masked.chars().count() > max_length {
        let truncated: String = masked.chars().take(max_length).collect();
        format!("{}... [truncated]", truncated)
    } else {
        masked.into_owned()
    }
}
