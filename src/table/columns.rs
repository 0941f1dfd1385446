use regex::Regex;
use std::collections::HashSet;

/// Words with special meaning in SQL that cannot be used as bare
/// identifiers.
const RESERVED_KEYWORDS: [&str; 9] = [
    "group", "order", "select", "user", "where", "table", "from", "join", "by",
];

/// Rewrite a raw column name into a safe identifier: non-word characters
/// become underscores, runs collapse to one, leading/trailing underscores
/// are trimmed, and a reserved keyword gets a trailing underscore.
pub fn clean_column(col: &str) -> String {
    let re = Regex::new(r"[^\w]").unwrap();
    let cleaned = re.replace_all(col, "_");
    let re = Regex::new(r"_+").unwrap();
    let cleaned = re.replace_all(&cleaned, "_");
    let cleaned = cleaned.trim_matches('_').to_string();
    if RESERVED_KEYWORDS.contains(&cleaned.to_lowercase().as_str()) {
        cleaned + "_"
    } else {
        cleaned
    }
}

/// Clean every column name, preserving positions.  A name already
/// produced for an earlier column gets the first unused numeric suffix.
pub fn sanitize_columns(raw: &[String]) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out: Vec<String> = Vec::with_capacity(raw.len());
    for col in raw {
        let mut name = clean_column(col);
        if seen.contains(&name) {
            let mut suffix = 1;
            while seen.contains(&format!("{}_{}", name, suffix)) {
                suffix += 1;
            }
            name = format!("{}_{}", name, suffix);
        }
        seen.insert(name.clone());
        out.push(name);
    }
    out
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn clean_column_examples() {
        assert_eq!(clean_column("Bill Date"), "Bill_Date");
        assert_eq!(clean_column("  GST%  Amount "), "GST_Amount");
        assert_eq!(clean_column("qty (units)"), "qty_units");
        assert_eq!(clean_column("a__b--c"), "a_b_c");
        assert_eq!(clean_column("BillDate"), "BillDate");
    }

    #[test]
    fn reserved_keywords_get_suffixed() {
        assert_eq!(clean_column("order"), "order_");
        assert_eq!(clean_column("Group"), "Group_");
        assert_eq!(clean_column("USER"), "USER_");
        assert_eq!(clean_column("ordering"), "ordering");
    }

    #[test]
    fn cleaned_names_are_safe_identifiers() {
        for raw in ["Unit Price ($)", "__x__", "total.amount", r"a/b\c", "Qty#1"] {
            let cleaned = clean_column(raw);
            assert!(cleaned.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
            assert!(!cleaned.starts_with('_'));
            assert!(!cleaned.ends_with('_'));
            assert!(!cleaned.contains("__"));
        }
    }

    #[test]
    fn duplicates_get_minimal_suffixes() {
        let raw: Vec<String> = ["a b", "a_b", "a.b"].iter().map(|s| s.to_string()).collect();
        assert_eq!(sanitize_columns(&raw), vec!["a_b", "a_b_1", "a_b_2"]);

        // a later column may already occupy a suffixed name
        let raw: Vec<String> = ["Qty", "Qty ", "Qty_1"].iter().map(|s| s.to_string()).collect();
        assert_eq!(sanitize_columns(&raw), vec!["Qty", "Qty_1", "Qty_1_1"]);
    }

    #[test]
    fn positions_are_preserved() {
        let raw: Vec<String> = ["z", "a", "m"].iter().map(|s| s.to_string()).collect();
        assert_eq!(sanitize_columns(&raw), vec!["z", "a", "m"]);
    }
}
