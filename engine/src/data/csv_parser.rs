use std::fs;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use painel_shared::models::RawCell;
use tracing::{debug, info, warn};

use crate::config::DashboardSchema;
use crate::data::encoding::{first_success, TextEncoding};
use crate::data::raw_table::RawTable;
use crate::error::LoadError;

const BOM: char = '\u{FEFF}';
// UTF-8 BOM bytes read as Latin-1/cp1252
const MISDECODED_BOM: &str = "\u{EF}\u{BB}\u{BF}";

/// Reads the `;`-delimited debtor spreadsheet into a `RawTable`.
pub struct BrazilianCsvParser<'a> {
    schema: &'a DashboardSchema,
}

impl<'a> BrazilianCsvParser<'a> {
    pub fn new(schema: &'a DashboardSchema) -> Self {
        Self { schema }
    }

    pub fn load_path(&self, path: &Path) -> Result<RawTable, LoadError> {
        let bytes = fs::read(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.load_bytes(path, &bytes)
    }

    /// `path` is only used to label errors.
    pub fn load_bytes(&self, path: &Path, bytes: &[u8]) -> Result<RawTable, LoadError> {
        let delimiter = self.schema.delimiter_byte();
        let (encoding, (headers, records)) =
            first_success(&self.schema.encodings, |encoding| {
                let text = encoding.decode(bytes)?;
                parse_records(&text, delimiter)
            })
            .map_err(|attempts| LoadError::UndecodableFile {
                path: path.to_path_buf(),
                attempts,
            })?;

        let columns: Vec<String> = headers
            .iter()
            .map(|h| repair_header(h, encoding, self.schema))
            .collect();
        if columns.iter().all(|c| c.is_empty()) {
            return Err(LoadError::EmptyHeader);
        }
        self.check_critical(&columns)?;

        let (mut rows, totals_row) = self.split_totals(&columns, &records);
        if self.schema.infer_native_numbers {
            self.infer_native_numbers(&columns, &mut rows);
        }

        info!(
            path = %path.display(),
            %encoding,
            rows = rows.len(),
            columns = columns.len(),
            totals_row = totals_row.is_some(),
            "Loaded debtor table"
        );
        Ok(RawTable::new(columns, rows)?
            .with_totals_row(totals_row)
            .with_encoding(encoding))
    }

    fn check_critical(&self, columns: &[String]) -> Result<(), LoadError> {
        let missing: Vec<String> = self
            .schema
            .critical_columns
            .iter()
            .filter(|critical| !columns.contains(critical))
            .cloned()
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(LoadError::MissingColumns {
                missing,
                found: columns.to_vec(),
            })
        }
    }

    // Rows without an entity are dropped first. Among what remains, a last row
    // labelled as a total is the totals row; otherwise a blank-entity row that
    // carries values after the last entity is; failing both, the last row is
    // taken by position when the policy allows it. Rows with no values at all
    // (";;;;" trailers) never count as totals.
    fn split_totals(
        &self,
        columns: &[String],
        records: &[StringRecord],
    ) -> (Vec<Vec<RawCell>>, Option<Vec<RawCell>>) {
        let entity_idx = columns
            .iter()
            .position(|c| *c == self.schema.entity_column)
            .unwrap_or(0);

        let mut rows: Vec<Vec<RawCell>> = Vec::with_capacity(records.len());
        let mut trailing_blank: Option<(usize, Vec<RawCell>)> = None;
        for (idx, record) in records.iter().enumerate() {
            let line = idx + 2;
            let cells: Vec<RawCell> = record.iter().map(RawCell::from_field).collect();
            if !is_blank_entity(&cells[entity_idx].text()) {
                if let Some((blank_line, _)) = trailing_blank.take() {
                    debug!(line = blank_line, "Dropping row without entity");
                }
                rows.push(cells);
                continue;
            }

            let has_values = cells
                .iter()
                .enumerate()
                .any(|(i, cell)| i != entity_idx && !cell.is_blank());
            if has_values {
                if let Some((blank_line, _)) = trailing_blank.replace((line, cells)) {
                    debug!(line = blank_line, "Dropping row without entity");
                }
            } else {
                debug!(line, "Dropping empty row");
            }
        }

        let labelled_last = rows
            .last()
            .map_or(false, |row| self.schema.is_totals_label(&row[entity_idx].text()));
        if labelled_last {
            if let Some((blank_line, _)) = trailing_blank {
                debug!(line = blank_line, "Dropping row without entity");
            }
            debug!("Recognised labelled totals row");
            let totals_row = rows.pop();
            return (rows, totals_row);
        }
        if let Some((line, cells)) = trailing_blank {
            debug!(line, "Recognised totals row without entity");
            return (rows, Some(cells));
        }

        let mut totals_row = None;
        if self.schema.totals.drop_last_row_fallback {
            if let Some(row) = rows.pop() {
                warn!(
                    entity = %row[entity_idx].text(),
                    "No totals row recognised; dropping the last row by position"
                );
                totals_row = Some(row);
            }
        }
        (rows, totals_row)
    }

    // A numeric column whose every filled cell is a plain dot-decimal literal
    // is read as native numbers, like a dataframe reader inferring floats.
    fn infer_native_numbers(&self, columns: &[String], rows: &mut [Vec<RawCell>]) {
        for (col, name) in columns.iter().enumerate() {
            if !self.schema.kind_of(name).is_numeric() {
                continue;
            }
            let mut seen_literal = false;
            let all_plain = rows.iter().all(|row| match &row[col] {
                RawCell::Empty | RawCell::Number(_) => true,
                RawCell::Text(s) if self.schema.is_missing_sentinel(s) => true,
                RawCell::Text(s) => {
                    let plain = is_plain_literal(s);
                    seen_literal |= plain;
                    plain
                }
            });
            if !all_plain || !seen_literal {
                continue;
            }
            debug!(column = %name, "Column read as native numbers");
            for row in rows.iter_mut() {
                let parsed = match &row[col] {
                    RawCell::Text(s) if is_plain_literal(s) => s.trim().parse::<f64>().ok(),
                    _ => None,
                };
                if let Some(value) = parsed {
                    row[col] = RawCell::Number(value);
                }
            }
        }
    }
}

fn parse_records(text: &str, delimiter: u8) -> Result<(StringRecord, Vec<StringRecord>), String> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(false)
        .from_reader(text.as_bytes());

    let headers = rdr
        .headers()
        .map_err(|e| format!("unreadable header: {}", e))?
        .clone();
    let mut records = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        let record = result.map_err(|e| format!("record at line {}: {}", idx + 2, e))?;
        records.push(record);
    }
    Ok((headers, records))
}

fn is_blank_entity(entity: &str) -> bool {
    let entity = entity.trim();
    entity.is_empty() || entity.eq_ignore_ascii_case("nan")
}

/// "0.066", "-12.5", "1500": plain literals. "1.500" reads as Brazilian
/// thousands and "1,5" as a decimal comma, so neither is plain.
fn is_plain_literal(s: &str) -> bool {
    let s = s.trim();
    let digits = s.strip_prefix('-').unwrap_or(s);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return false;
    }
    let mut parts = digits.split('.');
    let int_part = parts.next().unwrap_or("");
    let frac_part = parts.next();
    if parts.next().is_some() || int_part.is_empty() {
        return false;
    }
    match frac_part {
        None => true,
        Some(frac) if frac.is_empty() => false,
        Some(frac) => {
            let looks_like_thousands =
                frac.len() == 3 && int_part.len() <= 3 && !int_part.starts_with('0');
            !looks_like_thousands
        }
    }
}

/// Trims, strips a BOM (raw or mis-decoded), undoes UTF-8-read-as-single-byte
/// mojibake and applies the schema's fixed repair table.
pub fn repair_header(raw: &str, encoding: TextEncoding, schema: &DashboardSchema) -> String {
    let mut header = strip_bom(raw.trim()).trim().to_string();

    if let Some(fixed) = undo_mojibake(&header, encoding) {
        header = fixed;
    }
    for repair in &schema.header_repairs {
        if !repair.from.is_empty() && header.contains(&repair.from) {
            header = header.replace(&repair.from, &repair.to);
        }
    }
    let header = strip_bom(header.trim()).trim().to_string();

    if header != raw {
        warn!(original = ?raw, repaired = %header, "Repaired column header");
    }
    header
}

fn strip_bom(s: &str) -> &str {
    s.trim_start_matches(BOM).trim_start_matches(MISDECODED_BOM)
}

fn undo_mojibake(text: &str, encoding: TextEncoding) -> Option<String> {
    if text.is_ascii() {
        return None;
    }
    let mut candidates = vec![encoding, TextEncoding::Latin1, TextEncoding::Cp1252];
    candidates.dedup();
    candidates.into_iter().find_map(|enc| {
        let bytes = enc.encode_single_byte(text)?;
        String::from_utf8(bytes).ok().filter(|fixed| fixed != text)
    })
}
