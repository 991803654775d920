//! Rewrites the abstract `SIMILARITY(column, term)` predicate into a concrete
//! scoring expression the database understands.
//!
//! The model is told it can call `SIMILARITY(ColumnName, 'term')` anywhere a
//! scalar expression is valid (WHERE, SELECT list, ORDER BY). The database has
//! no such function, so before execution every occurrence is replaced with a
//! `CASE` expression producing a 0-100 score. The scan is an explicit
//! depth-counting pass over the characters, never a regex, so a term that is
//! itself a parenthesized subquery (with its own commas) splits correctly.

const TOKEN: &str = "SIMILARITY(";

/// Pure text transform; no SQL is executed here. Input without a
/// `SIMILARITY(` token is returned unchanged, and text outside the matched
/// call spans is never altered. A call whose parentheses cannot be balanced
/// is left as-is with a warning so the rest of the statement still reaches
/// the database.
pub fn rewrite_similarity(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut rest = sql;

    while let Some(start) = find_token(rest) {
        out.push_str(&rest[..start]);
        let args_start = start + TOKEN.len();

        let Some(close) = matching_close(&rest[args_start..]) else {
            tracing::warn!(
                call = &rest[start..],
                "unbalanced parentheses in SIMILARITY call; leaving it unmodified"
            );
            out.push_str(&rest[start..]);
            return out;
        };

        let span_end = args_start + close;
        let inner = &rest[args_start..span_end];
        match split_arguments(inner) {
            Some((column, term)) => out.push_str(&scoring_expression(column, term)),
            None => {
                tracing::warn!(
                    call = &rest[start..=span_end],
                    "could not split SIMILARITY arguments; leaving call unmodified"
                );
                out.push_str(&rest[start..=span_end]);
            }
        }
        rest = &rest[span_end + 1..];
    }

    out.push_str(rest);
    out
}

fn find_token(sql: &str) -> Option<usize> {
    // ASCII uppercasing preserves byte offsets.
    sql.to_ascii_uppercase().find(TOKEN)
}

/// Offset of the `)` closing the call, relative to the first character after
/// `SIMILARITY(`. Standard depth counter, not a greedy scan to end-of-string.
fn matching_close(args: &str) -> Option<usize> {
    let mut depth = 1u32;
    for (index, character) in args.char_indices() {
        match character {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(index);
                }
            }
            _ => {}
        }
    }
    None
}

/// Splits at the first comma at parenthesis depth zero, so commas inside a
/// subquery term are never mistaken for the argument separator.
fn split_arguments(inner: &str) -> Option<(&str, &str)> {
    let mut depth = 0i32;
    for (index, character) in inner.char_indices() {
        match character {
            '(' => depth += 1,
            ')' => depth -= 1,
            ',' if depth == 0 => {
                return Some((inner[..index].trim(), inner[index + 1..].trim()));
            }
            _ => {}
        }
    }
    None
}

fn normalize_expr(expr: &str) -> String {
    format!("REPLACE(REPLACE(REPLACE(UPPER(BTRIM({expr})), ' ', ''), ',', ''), '.', '')")
}

fn scoring_expression(column: &str, term: &str) -> String {
    // A quoted literal becomes a plain LIKE pattern; anything else (e.g. a
    // subquery) is concatenated at execution time so it stays valid SQL.
    let like_term = if is_quoted_literal(term) {
        let content = term[1..term.len() - 1].replace('\'', "''");
        format!("'%{content}%'")
    } else {
        format!("'%' || {term} || '%'")
    };
    let normalized_like_term = format!("'%' || {} || '%'", normalize_expr(term));
    let position = format!("STRPOS(UPPER({column}), UPPER({term}))");
    let normalized_column = normalize_expr(column);
    let normalized_term = normalize_expr(term);

    format!(
        "(CASE \
WHEN UPPER({column}) = UPPER({term}) THEN 100 \
WHEN UPPER({column}) LIKE UPPER({like_term}) THEN \
CASE \
WHEN {position} = 1 THEN 90 \
WHEN {position} > 0 THEN 85 - ({position} - 1) * 2 \
ELSE 80 \
END \
WHEN SOUNDEX({column}) = SOUNDEX({term}) THEN 70 \
WHEN {normalized_column} = {normalized_term} THEN 75 \
WHEN {normalized_column} LIKE {normalized_like_term} THEN 65 \
ELSE 0 \
END)"
    )
}

fn is_quoted_literal(term: &str) -> bool {
    term.len() >= 2 && term.starts_with('\'') && term.ends_with('\'')
}
