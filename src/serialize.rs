//! Row to ordered-field-list serialization consumed by export writers.

use crate::column::Column;
use crate::metadata::MetaData;
use crate::row::Row;
use crate::value::Value;

/// Format one cell for delimited output. Null cells become an empty
/// quoted field; purely numeric text stays unquoted; everything else is
/// quoted with embedded quote characters doubled.
pub fn format_field(column: &Column, cell: Option<&Value>) -> String {
    let text = match cell {
        Some(value) => column.format(value),
        None => String::new(),
    };
    if is_numeric_text(&text) {
        text
    } else {
        quote_field(&text)
    }
}

/// Format every visible cell of one row, in column order.
pub fn record_fields(metadata: &MetaData, row: &Row) -> Vec<String> {
    metadata
        .columns()
        .iter()
        .enumerate()
        .filter(|(_, column)| column.visible)
        .map(|(index, column)| format_field(column, row.get(index)))
        .collect()
}

/// Wrap a field in quotes, doubling any quote character inside it.
pub fn quote_field(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for c in text.chars() {
        if c == '"' {
            quoted.push('"');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

/// A field can skip quoting only when it reads as a plain decimal
/// number: an optional leading minus, digits, at most one point.
fn is_numeric_text(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    let mut seen_point = false;
    let mut seen_digit = false;
    for c in digits.chars() {
        match c {
            '0'..='9' => seen_digit = true,
            '.' if !seen_point => seen_point = true,
            _ => return false,
        }
    }
    seen_digit
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::DataKind;

    #[test]
    fn test_numeric_fields_stay_unquoted() {
        let column = Column::new("n", DataKind::Integer);
        assert_eq!(format_field(&column, Some(&Value::Integer(42))), "42");
        assert_eq!(format_field(&column, Some(&Value::Integer(-7))), "-7");

        let column = Column::new("d", DataKind::Double);
        assert_eq!(format_field(&column, Some(&Value::Double(3.25))), "3.25");
    }

    #[test]
    fn test_text_fields_are_quoted() {
        let column = Column::new("name", DataKind::Text);
        assert_eq!(
            format_field(&column, Some(&Value::Text("Bill".into()))),
            "\"Bill\""
        );
    }

    #[test]
    fn test_embedded_quotes_are_doubled() {
        let column = Column::new("name", DataKind::Text);
        assert_eq!(
            format_field(&column, Some(&Value::Text("say \"hi\"".into()))),
            "\"say \"\"hi\"\"\""
        );
    }

    #[test]
    fn test_null_becomes_empty_quoted_field() {
        let column = Column::new("name", DataKind::Text);
        assert_eq!(format_field(&column, None), "\"\"");
    }

    #[test]
    fn test_numeric_looking_text_passes_unquoted() {
        // The rule inspects the formatted text, not the column kind.
        let column = Column::new("code", DataKind::Text);
        assert_eq!(format_field(&column, Some(&Value::Text("007".into()))), "007");
        assert_eq!(
            format_field(&column, Some(&Value::Text("1.2.3".into()))),
            "\"1.2.3\""
        );
        assert_eq!(format_field(&column, Some(&Value::Text(".".into()))), "\".\"");
    }

    #[test]
    fn test_record_fields_follow_column_order_and_visibility() {
        let mut metadata = MetaData::new();
        metadata
            .add_column(Column::new("id", DataKind::Integer))
            .unwrap();
        metadata
            .add_column(Column::new("name", DataKind::Text))
            .unwrap();
        let mut hidden = Column::new("secret", DataKind::Text);
        hidden.visible = false;
        metadata.add_column(hidden).unwrap();

        let row = Row::new(vec![
            Some(Value::Integer(1)),
            Some(Value::Text("Ann".into())),
            Some(Value::Text("x".into())),
        ]);
        assert_eq!(record_fields(&metadata, &row), vec!["1", "\"Ann\""]);
    }
}
