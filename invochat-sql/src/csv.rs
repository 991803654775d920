use invochat_core::Value;

use crate::executor::QueryOutput;

/// Serializes a normalized result set to CSV: header row of column names in
/// result order, one line per row, RFC 4180 quoting, CRLF line endings. The
/// cell values are the same normalized strings the JSON path produces, so
/// both transports agree on decimals and dates.
pub fn to_csv(output: &QueryOutput) -> Vec<u8> {
    let mut buffer = String::new();
    write_record(&mut buffer, output.columns.iter().map(String::as_str));
    for row in &output.rows {
        let cells: Vec<String> = output
            .columns
            .iter()
            .map(|column| render_cell(row.get(column).unwrap_or(&Value::Null)))
            .collect();
        write_record(&mut buffer, cells.iter().map(String::as_str));
    }
    buffer.into_bytes()
}

fn render_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        other => other.to_string(),
    }
}

fn write_record<'a>(buffer: &mut String, fields: impl Iterator<Item = &'a str>) {
    let mut first = true;
    for field in fields {
        if !first {
            buffer.push(',');
        }
        first = false;
        push_escaped(buffer, field);
    }
    buffer.push_str("\r\n");
}

fn push_escaped(buffer: &mut String, field: &str) {
    if field.contains([',', '"', '\n', '\r']) {
        buffer.push('"');
        for character in field.chars() {
            if character == '"' {
                buffer.push('"');
            }
            buffer.push(character);
        }
        buffer.push('"');
    } else {
        buffer.push_str(field);
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Map};

    use super::*;

    fn row(pairs: &[(&str, Value)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect()
    }

    #[test]
    fn header_preserves_column_order() {
        let output = QueryOutput {
            columns: vec!["b".into(), "a".into()],
            rows: vec![row(&[("a", json!("1")), ("b", json!("2"))])],
        };
        let csv = String::from_utf8(to_csv(&output)).unwrap();
        assert_eq!(csv, "b,a\r\n2,1\r\n");
    }

    #[test]
    fn fields_with_separators_are_quoted() {
        let output = QueryOutput {
            columns: vec!["VendorName".into()],
            rows: vec![row(&[("VendorName", json!("Acme, \"Intl\"\nCorp"))])],
        };
        let csv = String::from_utf8(to_csv(&output)).unwrap();
        assert_eq!(csv, "VendorName\r\n\"Acme, \"\"Intl\"\"\nCorp\"\r\n");
    }

    // Minimal RFC 4180 reader, enough to verify our own output.
    fn parse_records(csv: &str) -> Vec<Vec<String>> {
        let mut records = Vec::new();
        let mut fields = Vec::new();
        let mut field = String::new();
        let mut in_quotes = false;
        let mut chars = csv.chars().peekable();
        while let Some(character) = chars.next() {
            if in_quotes {
                if character == '"' {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        field.push('"');
                    } else {
                        in_quotes = false;
                    }
                } else {
                    field.push(character);
                }
            } else {
                match character {
                    '"' => in_quotes = true,
                    ',' => fields.push(std::mem::take(&mut field)),
                    '\r' => {
                        if chars.peek() == Some(&'\n') {
                            chars.next();
                        }
                        fields.push(std::mem::take(&mut field));
                        records.push(std::mem::take(&mut fields));
                    }
                    '\n' => {
                        fields.push(std::mem::take(&mut field));
                        records.push(std::mem::take(&mut fields));
                    }
                    other => field.push(other),
                }
            }
        }
        records
    }

    #[test]
    fn parsing_the_export_reproduces_the_json_values() {
        // The normalized strings the executor produces for NUMERIC and
        // temporal columns must survive the CSV transport unchanged.
        let output = QueryOutput {
            columns: vec![
                "VendorName".into(),
                "InvoiceTotal".into(),
                "InvoiceDate".into(),
                "ProcessedAt".into(),
                "Notes".into(),
            ],
            rows: vec![
                row(&[
                    ("VendorName", json!("Acme, Intl")),
                    ("InvoiceTotal", json!("1234.50")),
                    ("InvoiceDate", json!("2024-03-31")),
                    ("ProcessedAt", json!("2024-03-31T08:15:00.000000")),
                    ("Notes", Value::Null),
                ]),
                row(&[
                    ("VendorName", json!("Globex \"EU\"")),
                    ("InvoiceTotal", json!("0.10")),
                    ("InvoiceDate", json!("2023-12-01")),
                    ("ProcessedAt", json!("2023-12-01T23:59:59.500000")),
                    ("Notes", json!("follow up")),
                ]),
            ],
        };

        let csv = String::from_utf8(to_csv(&output)).unwrap();
        let records = parse_records(&csv);

        assert_eq!(records.len(), output.rows.len() + 1);
        assert_eq!(records[0], output.columns);
        for (record, row) in records[1..].iter().zip(&output.rows) {
            for (cell, column) in record.iter().zip(&output.columns) {
                let expected = match row.get(column).unwrap_or(&Value::Null) {
                    Value::Null => String::new(),
                    Value::String(text) => text.clone(),
                    other => other.to_string(),
                };
                assert_eq!(cell, &expected, "column {column}");
            }
        }
    }

    #[test]
    fn nulls_become_empty_cells() {
        let output = QueryOutput {
            columns: vec!["a".into(), "b".into()],
            rows: vec![row(&[("a", Value::Null), ("b", json!(3))])],
        };
        let csv = String::from_utf8(to_csv(&output)).unwrap();
        assert_eq!(csv, "a,b\r\n,3\r\n");
    }
}
