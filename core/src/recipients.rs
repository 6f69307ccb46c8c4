//! Recipient list extraction.
//!
//! Plain text files hold one address per line. CSV exports (selected by the
//! `.csv` extension) hold bare handles in an `emailHandle` column, which get
//! the accepted domain appended. Either way, entries that do not end in
//! `@{domain}` are skipped with a warning rather than failing the run, and
//! repeated addresses are kept once, in first-seen order.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use tracing::{debug, warn};

use crate::error::InputError;

pub const DEFAULT_DOMAIN: &str = "ohio.edu";
pub const HANDLE_COLUMN: &str = "emailHandle";

const BOM: char = '\u{feff}';

/// Validated, de-duplicated destination addresses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Recipients {
    addresses: Vec<String>,
    skipped: usize,
}

impl Recipients {
    /// Read `path`, choosing the CSV reader for a `.csv` extension.
    pub fn load(path: &Path, domain: &str) -> Result<Self, InputError> {
        let file = File::open(path).map_err(|source| InputError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let reader = BufReader::new(file);
        let is_csv = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        let recipients = if is_csv {
            Self::from_csv(reader, domain)?
        } else {
            Self::from_text(reader, domain)?
        };
        debug!(
            path = %path.display(),
            accepted = recipients.len(),
            skipped = recipients.skipped(),
            "loaded recipients"
        );
        Ok(recipients)
    }

    /// One address per line. Blank lines are ignored without a warning.
    pub fn from_text<R: BufRead>(reader: R, domain: &str) -> Result<Self, InputError> {
        let mut collector = Collector::new(domain);
        for line in reader.lines() {
            let line = line?;
            let entry = line.trim();
            if entry.is_empty() {
                continue;
            }
            collector.offer(entry);
        }
        Ok(collector.finish())
    }

    /// A header row naming an `emailHandle` column, then one handle per row.
    /// Quoted fields may contain commas; a leading byte-order mark is ignored.
    pub fn from_csv<R: Read>(reader: R, domain: &str) -> Result<Self, InputError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        let column = reader
            .headers()?
            .iter()
            .position(|field| field.trim_start_matches(BOM) == HANDLE_COLUMN)
            .ok_or_else(|| InputError::MissingColumn(HANDLE_COLUMN.to_string()))?;

        let mut collector = Collector::new(domain);
        for record in reader.records() {
            let record = match record {
                Ok(record) => record,
                Err(e) if e.is_io_error() => return Err(e.into()),
                Err(e) => {
                    let row = e.position().map(csv::Position::line);
                    warn!(row, error = %e, "malformed row, it will be skipped");
                    collector.skipped += 1;
                    continue;
                }
            };
            match record.get(column) {
                Some(handle) if !handle.is_empty() => {
                    collector.offer(&format!("{handle}@{domain}"));
                }
                _ => {
                    let row = record.position().map(csv::Position::line);
                    warn!(row, "row has no {HANDLE_COLUMN} value, it will be skipped");
                    collector.skipped += 1;
                }
            }
        }
        Ok(collector.finish())
    }

    pub fn addresses(&self) -> &[String] {
        &self.addresses
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.addresses.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    /// Entries dropped as invalid. Duplicates are not counted.
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

impl FromIterator<String> for Recipients {
    /// Collects already-validated addresses, dropping repeats.
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut seen = HashSet::new();
        let addresses = iter
            .into_iter()
            .filter(|addr| seen.insert(addr.to_ascii_lowercase()))
            .collect();
        Self { addresses, skipped: 0 }
    }
}

/// Whether `address` has a non-empty local part and ends in `@{domain}`.
pub fn is_valid_address(address: &str, domain: &str) -> bool {
    let suffix_len = domain.len() + 1;
    if address.len() <= suffix_len {
        return false;
    }
    let split = address.len() - suffix_len;
    let (Some(local), Some(suffix)) = (address.get(..split), address.get(split..)) else {
        return false;
    };
    suffix.starts_with('@')
        && suffix[1..].eq_ignore_ascii_case(domain)
        && !local.contains('@')
        && !local.chars().any(char::is_whitespace)
}

struct Collector<'a> {
    domain: &'a str,
    seen: HashSet<String>,
    addresses: Vec<String>,
    skipped: usize,
}

impl<'a> Collector<'a> {
    fn new(domain: &'a str) -> Self {
        Self {
            domain,
            seen: HashSet::new(),
            addresses: Vec::new(),
            skipped: 0,
        }
    }

    fn offer(&mut self, address: &str) {
        if !is_valid_address(address, self.domain) {
            warn!(
                entry = address,
                "'{address}' is not a valid @{} address, it will be skipped", self.domain
            );
            self.skipped += 1;
            return;
        }
        if !self.seen.insert(address.to_ascii_lowercase()) {
            debug!(entry = address, "duplicate address ignored");
            return;
        }
        self.addresses.push(address.to_string());
    }

    fn finish(self) -> Recipients {
        Recipients {
            addresses: self.addresses,
            skipped: self.skipped,
        }
    }
}
