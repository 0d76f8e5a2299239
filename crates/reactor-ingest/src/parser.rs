//! Pipe-delimited feed parser
//!
//! The feed looks like:
//!
//! ```text
//! ReportDt|Unit|Power
//! 01/02/2024 08:00:00 AM|Arkansas Nuclear 1|100
//! ```
//!
//! The header must match exactly or the whole feed is rejected. Data rows
//! that cannot be converted are dropped one at a time with a warning. Empty
//! lines count as rows with no fields.

use crate::error::{IngestError, Result};
use reactor_common::{RecordError, StatusRecord};
use tracing::{debug, info, warn};

/// Column names the first feed line must carry, in order.
pub const EXPECTED_HEADER: [&str; 3] = ["ReportDt", "Unit", "Power"];

/// Field separator used by the feed.
pub const FIELD_DELIMITER: u8 = b'|';

/// Quote character used by the feed.
pub const QUOTE_CHAR: u8 = b'"';

/// A source row that did not become a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    /// 1-based line number in the feed
    pub line: u64,
    pub fields: Vec<String>,
    pub error: RecordError,
}

/// Result of parsing one feed body
#[derive(Debug, Clone, Default)]
pub struct ParsedFeed {
    pub header: Vec<String>,
    /// Valid records in source order
    pub records: Vec<StatusRecord>,
    pub skipped: Vec<SkippedRow>,
}

/// Parser for the reactor status feed
#[derive(Debug, Clone)]
pub struct FeedParser {
    delimiter: u8,
    quote: u8,
}

impl Default for FeedParser {
    fn default() -> Self {
        Self {
            delimiter: FIELD_DELIMITER,
            quote: QUOTE_CHAR,
        }
    }
}

impl FeedParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Parse a whole feed body.
    ///
    /// Fails only when the header is missing or wrong. Individual rows are
    /// either converted or recorded in [`ParsedFeed::skipped`].
    pub fn parse(&self, content: &str) -> Result<ParsedFeed> {
        let bytes = content.as_bytes();
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .quote(self.quote)
            .has_headers(false)
            .flexible(true)
            .from_reader(bytes);

        let mut row = csv::StringRecord::new();

        let header = match reader.read_record(&mut row) {
            Ok(true) => row.iter().map(str::to_string).collect::<Vec<_>>(),
            Ok(false) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "Unreadable feed header");
                Vec::new()
            },
        };

        if header != EXPECTED_HEADER {
            return Err(IngestError::header_mismatch(header));
        }

        let mut feed = ParsedFeed {
            header,
            ..Default::default()
        };

        loop {
            // csv drops empty lines, so find them between records
            let gap = EmptyLines::after(bytes, reader.position().byte() as usize);
            gap.record(&mut feed.skipped);
            let line = gap.next_line();

            let fields: Vec<&str> = match reader.read_record(&mut row) {
                Ok(true) => row.iter().collect(),
                Ok(false) => break,
                Err(e) => {
                    warn!(line, error = %e, "Skipping unreadable row");
                    feed.skipped.push(SkippedRow {
                        line,
                        fields: Vec::new(),
                        error: RecordError::Unreadable(e.to_string()),
                    });
                    continue;
                },
            };

            // Blank separator lines come through as a single space
            if is_blank_row(&fields) {
                debug!(line, "Skipping blank row");
                continue;
            }

            match convert_row(&fields) {
                Ok(record) => feed.records.push(record),
                Err(error) => {
                    warn!(line, row = ?fields, error = %error, "Skipping row");
                    feed.skipped.push(SkippedRow {
                        line,
                        fields: fields.iter().map(|f| f.to_string()).collect(),
                        error,
                    });
                },
            }
        }

        info!(
            records = feed.records.len(),
            skipped = feed.skipped.len(),
            "Parsed source feed"
        );

        Ok(feed)
    }
}

/// Run of empty lines between the end of one record and the next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct EmptyLines {
    /// 1-based line number of the first empty line
    first: u64,
    count: u64,
}

impl EmptyLines {
    /// Scan from `end`, the offset just past the previous record's terminator.
    fn after(bytes: &[u8], end: usize) -> Self {
        let mut rest = bytes.get(end..).unwrap_or_default();
        let mut consumed = end;

        // A CRLF terminator may be split across the record boundary
        let ends_in_cr = end.checked_sub(1).and_then(|i| bytes.get(i)) == Some(&b'\r');
        if ends_in_cr && rest.first() == Some(&b'\n') {
            rest = &rest[1..];
            consumed += 1;
        }

        let preceding = bytes.get(..consumed).unwrap_or_default();
        let first = preceding.iter().filter(|&&b| b == b'\n').count() as u64 + 1;

        let mut count = 0;
        loop {
            match rest {
                [b'\r', b'\n', tail @ ..] | [b'\r' | b'\n', tail @ ..] => {
                    rest = tail;
                    count += 1;
                },
                _ => break,
            }
        }

        Self { first, count }
    }

    /// Line on which the next record starts
    fn next_line(&self) -> u64 {
        self.first + self.count
    }

    fn record(&self, skipped: &mut Vec<SkippedRow>) {
        for line in self.first..self.next_line() {
            warn!(line, "Skipping empty row");
            skipped.push(SkippedRow {
                line,
                fields: Vec::new(),
                error: RecordError::TooFewFields {
                    expected: EXPECTED_HEADER.len(),
                    found: 0,
                },
            });
        }
    }
}

fn is_blank_row(fields: &[&str]) -> bool {
    matches!(fields, [only] if only.trim().is_empty())
}

/// Convert one data row. Fields beyond the third are ignored.
pub fn convert_row(fields: &[&str]) -> std::result::Result<StatusRecord, RecordError> {
    match fields {
        [timestamp, unit, power, ..] => StatusRecord::from_source_fields(timestamp, unit, power),
        _ => Err(RecordError::TooFewFields {
            expected: EXPECTED_HEADER.len(),
            found: fields.len(),
        }),
    }
}
