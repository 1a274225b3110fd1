//! CSV Source (C4): a streaming tokenizer over a DNS zone-export file.
//!
//! Built directly on the `csv` crate's `Reader` rather than hand-rolled,
//! so RFC-4180 quoting/escaping correctness comes from the crate instead
//! of a bespoke parser. Headers are read with `has_headers(false)` so the
//! header row is captured explicitly and handed to the provider registry
//! for detection before any data row is decoded.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};

use crate::core::errors::{Result, ZoneRiskError};

/// One parsed row plus its 1-based line number within the source file.
pub struct SourceRow {
    /// Line number, 1-based, counting the header as line 1.
    pub line: usize,
    /// Raw field values, in header-column order.
    pub fields: Vec<String>,
}

/// A streaming CSV reader over a zone-export file.
///
/// Holds a single file handle and internal buffer; never buffers more than
/// one row plus the reader's own internal chunk of unparsed bytes.
pub struct CsvSource {
    reader: csv::Reader<BufReader<File>>,
    header: Vec<String>,
    line: usize,
    pending_warnings: VecDeque<String>,
}

impl CsvSource {
    /// Open `path`, strip a leading UTF-8 BOM if present, and read the
    /// header row.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| ZoneRiskError::input_missing(path, &e))?;
        let mut buf_reader = BufReader::new(file);
        strip_bom(&mut buf_reader)?;

        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::Fields)
            .from_reader(buf_reader);

        let mut record = StringRecord::new();
        let has_header = reader
            .read_record(&mut record)
            .map_err(|e| ZoneRiskError::input_missing(path, &std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())))?;
        if !has_header {
            return Err(ZoneRiskError::InputMissing {
                path: path.to_path_buf(),
                message: "file is empty".to_string(),
            });
        }
        let header: Vec<String> = record.iter().map(|s| s.to_string()).collect();

        Ok(Self {
            reader,
            header,
            line: 1,
            pending_warnings: VecDeque::new(),
        })
    }

    /// The detected header row, in file order.
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Read the next data row, or `None` at end of file.
    ///
    /// A per-row parse error (malformed UTF-8, unterminated quote) is
    /// queued as a warning and that single row is skipped; reading resumes
    /// at the next row rather than treating the error as end of file, so a
    /// single bad row near the start of a multi-gigabyte file cannot
    /// silently truncate the rest of the run. A final partial row (fewer
    /// fields than the header, blank, with no trailing newline) is queued
    /// as a warning the same way. Queued warnings are drained with
    /// [`CsvSource::take_warnings`].
    pub fn next_row(&mut self) -> Option<SourceRow> {
        loop {
            let mut record = StringRecord::new();
            match self.reader.read_record(&mut record) {
                Ok(true) => {
                    self.line += 1;
                    let fields: Vec<String> = record.iter().map(|s| s.to_string()).collect();
                    if fields.len() < self.header.len() && fields.iter().all(|f| f.is_empty()) {
                        self.pending_warnings.push_back(format!(
                            "row at line {} has fewer fields than the header and is blank",
                            self.line
                        ));
                        continue;
                    }
                    return Some(SourceRow {
                        line: self.line,
                        fields,
                    });
                }
                Ok(false) => return None,
                Err(e) => {
                    self.line += 1;
                    self.pending_warnings
                        .push_back(format!("line {}: {}", self.line, e));
                    continue;
                }
            }
        }
    }

    /// Drain every parse-error/partial-row warning queued since the last
    /// call, for the caller to aggregate into the run summary.
    pub fn take_warnings(&mut self) -> Vec<String> {
        self.pending_warnings.drain(..).collect()
    }
}

/// Strip a leading UTF-8 BOM (`EF BB BF`) from the underlying reader, if
/// present, by peeking and rewinding via a small lookahead buffer.
fn strip_bom(reader: &mut BufReader<File>) -> Result<()> {
    use std::io::{Seek, SeekFrom};
    let mut probe = [0u8; 3];
    let read = reader
        .read(&mut probe)
        .map_err(|e| ZoneRiskError::output_failed("failed to probe file for BOM", e))?;
    if read == 3 && probe == [0xEF, 0xBB, 0xBF] {
        Ok(())
    } else {
        reader
            .seek(SeekFrom::Start(0))
            .map_err(|e| ZoneRiskError::output_failed("failed to rewind after BOM probe", e))?;
        Ok(())
    }
}
