//! Character-level tokenizer turning decoded text into raw field records.

/// Delimiter characters recognized by auto-detection, in priority order.
pub const DELIMITERS: [char; 4] = ['\t', ';', '|', ','];

/// Pick a separator by scanning one physical record.
///
/// Candidates are tried in [`DELIMITERS`] priority order; the first one
/// present anywhere in the record wins, regardless of position. Returns
/// `None` when no candidate occurs.
pub fn detect_separator(record: &str) -> Option<char> {
    DELIMITERS.into_iter().find(|&candidate| record.contains(candidate))
}

/// One physical record: its raw fields plus the unparsed line text kept
/// for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub fields: Vec<String>,
    pub raw: String,
}

impl RawRecord {
    /// Returns true if the physical line held nothing but whitespace.
    pub fn is_blank(&self) -> bool {
        self.raw.trim().is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// No quote seen for the current field.
    Bare,
    /// Inside a quoted field; separators and line ends are data.
    Quoted,
    /// After a closing quote; swallow until the next separator or line end.
    PostQuote,
}

/// Splits decoded text into records of raw string fields.
///
/// Only LF ends a record; CR is ignored outside quotes and kept verbatim
/// inside them, so both LF and CRLF conventions parse cleanly. Quoted
/// fields may span lines and escape the quote character by doubling it.
/// Characters between a closing quote and the next separator or line end
/// are dropped.
///
/// Blank records are not emitted, with one exception: when a header is
/// expected, a blank first line still counts as the (empty) header row.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    separator: char,
    quote: char,
    header_expected: bool,
}

impl Tokenizer {
    pub fn new(separator: char, quote: char) -> Self {
        Self {
            separator,
            quote,
            header_expected: false,
        }
    }

    /// Whether a blank first line should still be emitted as a header row.
    pub fn header_expected(&mut self, expected: bool) -> &mut Self {
        self.header_expected = expected;
        self
    }

    /// Tokenize the whole input into records.
    ///
    /// End of input flushes any pending field or record, so a missing
    /// trailing newline never loses the final row, and an unterminated
    /// quote resolves as if the stream end closed it.
    pub fn records(&self, text: &str) -> Vec<RawRecord> {
        let mut records = Vec::with_capacity(bytecount::count(text.as_bytes(), b'\n') + 1);
        let mut fields: Vec<String> = Vec::new();
        let mut field = String::new();
        let mut raw = String::new();
        let mut state = State::Bare;
        let mut first_record = true;
        let mut chars = text.chars().peekable();

        while let Some(c) = chars.next() {
            match state {
                State::Bare => {
                    if c == '\n' {
                        fields.push(std::mem::take(&mut field));
                        self.finish_record(&mut records, &mut fields, &mut raw, &mut first_record);
                    } else {
                        raw.push(c);
                        if c == self.quote {
                            state = State::Quoted;
                        } else if c == self.separator {
                            fields.push(std::mem::take(&mut field));
                        } else if c != '\r' {
                            field.push(c);
                        }
                    }
                }
                State::Quoted => {
                    raw.push(c);
                    if c == self.quote {
                        if chars.peek() == Some(&self.quote) {
                            field.push(self.quote);
                            raw.push(self.quote);
                            chars.next();
                        } else {
                            state = State::PostQuote;
                        }
                    } else {
                        field.push(c);
                    }
                }
                State::PostQuote => {
                    if c == '\n' {
                        fields.push(std::mem::take(&mut field));
                        state = State::Bare;
                        self.finish_record(&mut records, &mut fields, &mut raw, &mut first_record);
                    } else {
                        raw.push(c);
                        if c == self.separator {
                            fields.push(std::mem::take(&mut field));
                            state = State::Bare;
                        }
                    }
                }
            }
        }

        match state {
            State::Quoted | State::PostQuote => {
                fields.push(std::mem::take(&mut field));
                self.finish_record(&mut records, &mut fields, &mut raw, &mut first_record);
            }
            State::Bare => {
                if !fields.is_empty() || !field.is_empty() || !raw.is_empty() {
                    fields.push(std::mem::take(&mut field));
                    self.finish_record(&mut records, &mut fields, &mut raw, &mut first_record);
                }
            }
        }

        records
    }

    fn finish_record(
        &self,
        records: &mut Vec<RawRecord>,
        fields: &mut Vec<String>,
        raw: &mut String,
        first_record: &mut bool,
    ) {
        let mut raw = std::mem::take(raw);
        if raw.ends_with('\r') {
            raw.pop();
        }
        let record = RawRecord {
            fields: std::mem::take(fields),
            raw,
        };
        if !record.is_blank() || (*first_record && self.header_expected) {
            records.push(record);
        }
        *first_record = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comma() -> Tokenizer {
        Tokenizer::new(',', '"')
    }

    #[test]
    fn test_embedded_separator_and_escaped_quote() {
        let records = comma().records("a,\"b,c\"\"d\",e\n");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].fields, vec!["a", "b,c\"d", "e"]);
    }

    #[test]
    fn test_final_row_without_trailing_newline() {
        let records = comma().records("a,b\nc,d");
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].fields, vec!["c", "d"]);
    }

    #[test]
    fn test_trailing_blank_line_yields_no_phantom_row() {
        let records = comma().records("a,b\n\n");
        assert_eq!(records.len(), 1);

        let records = comma().records("a,b\n\nc,d\n");
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_blank_first_line_kept_when_header_expected() {
        let mut tokenizer = comma();
        tokenizer.header_expected(true);
        let records = tokenizer.records("\nx\n");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].fields, vec![""]);
        assert_eq!(records[1].fields, vec!["x"]);

        // Without a header the same input has no first-line carve-out.
        let records = comma().records("\nx\n");
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_quoted_field_spans_lines() {
        let records = comma().records("a,\"line1\nline2\",b\n");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].fields, vec!["a", "line1\nline2", "b"]);
    }

    #[test]
    fn test_characters_after_closing_quote_are_swallowed() {
        let records = comma().records("\"ab\"cd,e\n");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].fields, vec!["ab", "e"]);
    }

    #[test]
    fn test_crlf_records_and_raw_echo() {
        let records = comma().records("a,b\r\nc,d\r\n");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].fields, vec!["a", "b"]);
        assert_eq!(records[0].raw, "a,b");
        assert_eq!(records[1].raw, "c,d");
    }

    #[test]
    fn test_carriage_return_inside_quotes_is_data() {
        let records = comma().records("a,\"x\ry\"\n");
        assert_eq!(records[0].fields, vec!["a", "x\ry"]);
    }

    #[test]
    fn test_unterminated_quote_closes_at_end_of_input() {
        let records = comma().records("a,\"bc");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].fields, vec!["a", "bc"]);
    }

    #[test]
    fn test_trailing_empty_fields_survive() {
        let records = comma().records("a,");
        assert_eq!(records[0].fields, vec!["a", ""]);

        let records = comma().records("a,\"\"");
        assert_eq!(records[0].fields, vec!["a", ""]);
    }

    #[test]
    fn test_detect_separator_priority() {
        assert_eq!(detect_separator("a\tb;c"), Some('\t'));
        assert_eq!(detect_separator("x,y;z"), Some(';'));
        assert_eq!(detect_separator("x|y"), Some('|'));
        assert_eq!(detect_separator("x,y"), Some(','));
        assert_eq!(detect_separator("plain"), None);
    }
}
