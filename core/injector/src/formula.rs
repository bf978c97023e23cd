//! FILENAME: core/injector/src/formula.rs
//! PURPOSE: Textual helpers for formula strings.
//! CONTEXT: Formulas are never parsed. Rewrites only touch the quoted
//! `'Sheet Name'` form of a reference; bare `Sheet!A1` references are left alone.

/// Returns the formula with exactly one leading `=`.
pub fn ensure_formula_marker(formula: &str) -> String {
    if formula.starts_with('=') {
        formula.to_string()
    } else {
        format!("={}", formula)
    }
}

/// Quotes a sheet name the way formulas spell it: `'Name'`, with any
/// apostrophe inside the name doubled.
pub fn quote_sheet_name(name: &str) -> String {
    format!("'{}'", name.replace('\'', "''"))
}

/// Replaces every quoted reference to sheet `from` with one to sheet `to`.
pub fn rewrite_sheet_reference(formula: &str, from: &str, to: &str) -> String {
    let pattern = quote_sheet_name(from);
    if !formula.contains(&pattern) {
        return formula.to_string();
    }
    formula.replace(&pattern, &quote_sheet_name(to))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_added_once() {
        assert_eq!(ensure_formula_marker("SUM(A1:A2)"), "=SUM(A1:A2)");
        assert_eq!(ensure_formula_marker("=SUM(A1:A2)"), "=SUM(A1:A2)");
    }

    #[test]
    fn test_quote_sheet_name() {
        assert_eq!(quote_sheet_name("v1"), "'v1'");
        assert_eq!(quote_sheet_name("Γενικό Αποτέλεσμα"), "'Γενικό Αποτέλεσμα'");
        assert_eq!(quote_sheet_name("Bob's"), "'Bob''s'");
    }

    #[test]
    fn test_rewrite_every_occurrence() {
        assert_eq!(
            rewrite_sheet_reference("='v1'!C3*2+'v1'!D4", "v1", "Primary"),
            "='Primary'!C3*2+'Primary'!D4"
        );
    }

    #[test]
    fn test_rewrite_leaves_unquoted_and_other_sheets() {
        assert_eq!(rewrite_sheet_reference("=v1!C3", "v1", "Primary"), "=v1!C3");
        assert_eq!(rewrite_sheet_reference("='v10'!A1", "v1", "Primary"), "='v10'!A1");
    }

    #[test]
    fn test_rewrite_target_with_apostrophe() {
        assert_eq!(
            rewrite_sheet_reference("='v1'!A1", "v1", "Q1's"),
            "='Q1''s'!A1"
        );
    }
}
