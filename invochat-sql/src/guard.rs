use thiserror::Error;

#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum SqlGuardError {
    #[error("Only single SELECT queries are allowed.")]
    NotASelect,
    #[error("Multiple statements are not permitted.")]
    MultipleStatements,
}

impl SqlGuardError {
    /// Machine-readable rejection reason.
    pub fn reason(&self) -> &'static str {
        match self {
            SqlGuardError::NotASelect => "not_a_select",
            SqlGuardError::MultipleStatements => "multiple_statements",
        }
    }
}

/// Rejects anything that is not a single read-only statement.
///
/// Both rules are independent and purely syntactic: the trimmed statement
/// must begin with the token `SELECT` (any case), and after stripping one
/// optional trailing semicolon no semicolon may remain, which blocks
/// statement stacking. No grammar parse happens here; table allow-listing
/// and resource limits are out of scope.
pub fn check_read_only(sql: &str) -> Result<(), SqlGuardError> {
    let trimmed = sql.trim();
    if !starts_with_select(trimmed) {
        return Err(SqlGuardError::NotASelect);
    }

    let body = trimmed.strip_suffix(';').unwrap_or(trimmed);
    if body.contains(';') {
        return Err(SqlGuardError::MultipleStatements);
    }

    Ok(())
}

fn starts_with_select(sql: &str) -> bool {
    let Some(head) = sql.get(..6) else {
        return false;
    };
    if !head.eq_ignore_ascii_case("select") {
        return false;
    }
    // Word boundary: "selection" must not pass.
    match sql[6..].chars().next() {
        None => true,
        Some(next) => !next.is_alphanumeric() && next != '_',
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stacked_statements_are_rejected() {
        assert_eq!(
            check_read_only("SELECT 1; DROP TABLE X"),
            Err(SqlGuardError::MultipleStatements)
        );
    }

    #[test]
    fn writes_are_rejected() {
        assert_eq!(
            check_read_only("UPDATE X SET a=1"),
            Err(SqlGuardError::NotASelect)
        );
    }

    #[test]
    fn leading_whitespace_and_lowercase_are_accepted() {
        assert_eq!(check_read_only("  select * from T"), Ok(()));
    }

    #[test]
    fn one_trailing_semicolon_is_tolerated() {
        assert_eq!(check_read_only("SELECT * FROM Invoices;"), Ok(()));
        assert_eq!(check_read_only("SELECT * FROM Invoices;  "), Ok(()));
    }

    #[test]
    fn select_prefix_needs_a_word_boundary() {
        assert_eq!(
            check_read_only("selection FROM T"),
            Err(SqlGuardError::NotASelect)
        );
    }

    #[test]
    fn rejection_reasons_are_machine_readable() {
        assert_eq!(SqlGuardError::NotASelect.reason(), "not_a_select");
        assert_eq!(
            SqlGuardError::MultipleStatements.reason(),
            "multiple_statements"
        );
    }
}
