//! CSV ingest.
//!
//! This module turns a raw aerodrome export into `RawRecord`s with resolved
//! column roles. It knows about files, encodings and delimiters; it knows
//! nothing about coordinates or categories.
//!
//! Design goals:
//! - **Strict schema** for the columns the pipeline cannot work without
//!   (latitude/longitude; clear errors + exit code 2)
//! - **Row-level validation** (malformed CSV rows are skipped and reported,
//!   never fatal)
//! - **Tolerant of real exports**: BOMs, Latin-1 files, preamble lines
//!   ("Atualizado em: ..."), `;` or `,` or tab separated
//! - **Separation of concerns**: no normalization logic here

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use csv::StringRecord;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{DatasetProfile, FieldCandidates, Settings, match_profile};
use crate::domain::RawRecord;
use crate::error::AppError;
use crate::normalize::pipeline::FieldRoles;
use crate::normalize::text::{levenshtein, normalize_name};

/// Delimiters tried when none is given, in tie-break order.
const SNIFF_DELIMITERS: [u8; 4] = [b';', b',', b'\t', b'|'];
const FALLBACK_DELIMITER: u8 = b';';
/// Non-empty lines inspected when sniffing.
const SNIFF_LINES: usize = 20;
/// Candidates shorter than this (normalized) are only matched exactly.
const FUZZY_MIN_LEN: usize = 8;

/// Text encoding of an input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextEncoding {
    /// UTF-8, falling back to Latin-1 when the bytes are not valid UTF-8.
    #[default]
    Auto,
    Utf8,
    /// Latin-1 as Windows-1252 (0x80-0x9F are punctuation, not C1 controls);
    /// ignored when the bytes decode cleanly as UTF-8.
    #[value(alias = "cp1252")]
    Latin1,
}

/// Caller-supplied ingest overrides (mostly straight from the CLI).
#[derive(Debug, Clone, Default)]
pub struct IngestOptions {
    pub encoding: TextEncoding,
    pub delimiter: Option<u8>,
    pub lat_col: Option<String>,
    pub lon_col: Option<String>,
    pub id_col: Option<String>,
    /// Ownership text for records without one, regardless of profile.
    pub ownership: Option<String>,
}

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, Serialize)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// One data row as it appeared in the file, aligned with `Dataset::headers`.
#[derive(Debug, Clone)]
pub struct SourceRow {
    pub line: usize,
    pub values: Vec<String>,
}

/// A loaded input file.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub path: PathBuf,
    pub stem: String,
    pub profile: Option<DatasetProfile>,
    /// Encoding actually used to decode the file (`Utf8` or `Latin1`).
    pub encoding: TextEncoding,
    pub delimiter: u8,
    /// Preamble lines skipped before the header.
    pub skipped_lines: usize,
    pub headers: Vec<String>,
    pub id_column: Option<String>,
    pub roles: FieldRoles,
    /// Parallel to `records`.
    pub rows: Vec<SourceRow>,
    pub records: Vec<RawRecord>,
    pub row_errors: Vec<RowError>,
}

impl Dataset {
    pub fn rows_read(&self) -> usize {
        self.rows.len() + self.row_errors.len()
    }

    pub fn label(&self) -> &str {
        self.profile.as_ref().map(|p| p.label.as_str()).unwrap_or(self.stem.as_str())
    }
}

/// Parse a `--sep` value: a single ASCII char, or `tab` / `\t`.
pub fn parse_delimiter(s: &str) -> Result<u8, String> {
    match s {
        "tab" | "\\t" | "\t" => return Ok(b'\t'),
        _ => {}
    }
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii() && c != '"' && c != '\n' && c != '\r' => Ok(c as u8),
        _ => Err(format!("separator must be a single ASCII character or 'tab', got '{s}'")),
    }
}

/// Load one CSV file into a `Dataset`.
pub fn load_dataset(path: &Path, settings: &Settings, options: &IngestOptions) -> Result<Dataset, AppError> {
    let bytes = fs::read(path)
        .map_err(|e| AppError::input(format!("Failed to read CSV '{}': {e}", path.display())))?;

    let (text, encoding) = decode_text(&bytes, options.encoding)
        .map_err(|e| AppError::input(format!("{}: {e}", path.display())))?;
    if encoding == TextEncoding::Latin1 {
        warn!(file = %path.display(), "input is not valid UTF-8; decoded as Latin-1");
    }

    let delimiter = options.delimiter.unwrap_or_else(|| sniff_delimiter(&text));
    let profile = match_profile(&settings.datasets, path).cloned();
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "dataset".to_string());

    let mut dataset = parse_text(&text, delimiter, &settings.fields, options, profile.as_ref())
        .map_err(|e| AppError::input(format!("{}: {e}", path.display())))?;
    dataset.path = path.to_path_buf();
    dataset.stem = stem;
    dataset.profile = profile;
    dataset.encoding = encoding;

    for err in &dataset.row_errors {
        warn!(file = %path.display(), line = err.line, "{}", err.message);
    }
    info!(
        file = %path.display(),
        delimiter = %char::from(delimiter).escape_default(),
        encoding = ?encoding,
        rows = dataset.records.len(),
        lat = %dataset.roles.latitude,
        lon = %dataset.roles.longitude,
        "CSV loaded"
    );

    Ok(dataset)
}

/// Decode file bytes. Returns the text (BOM stripped) and the encoding used.
///
/// The non-UTF-8 fallback is Windows-1252: Excel exports put curly quotes and
/// dashes in 0x80-0x9F. The five bytes cp1252 leaves unassigned pass through
/// as their Latin-1 code points.
pub fn decode_text(bytes: &[u8], requested: TextEncoding) -> Result<(String, TextEncoding), String> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);

    match std::str::from_utf8(bytes) {
        Ok(text) => {
            if requested == TextEncoding::Latin1 {
                debug!("requested latin1 ignored: bytes are valid UTF-8");
            }
            Ok((text.to_string(), TextEncoding::Utf8))
        }
        Err(e) if requested == TextEncoding::Utf8 => Err(format!("not valid UTF-8: {e}")),
        Err(_) => Ok((bytes.iter().map(|&b| cp1252_char(b)).collect(), TextEncoding::Latin1)),
    }
}

/// Windows-1252 code points for 0x80-0x9F; `\0` marks an unassigned byte.
const CP1252_HIGH: [char; 32] = [
    '€', '\0', '‚', 'ƒ', '„', '…', '†', '‡', 'ˆ', '‰', 'Š', '‹', 'Œ', '\0', 'Ž', '\0',
    '\0', '‘', '’', '“', '”', '•', '–', '\u{2014}', '˜', '™', 'š', '›', 'œ', '\0', 'ž', 'Ÿ',
];

fn cp1252_char(b: u8) -> char {
    match b {
        0x80..=0x9F => match CP1252_HIGH[usize::from(b - 0x80)] {
            '\0' => char::from(b),
            c => c,
        },
        _ => char::from(b),
    }
}

/// Pick the delimiter that splits the leading lines most consistently.
///
/// Score per candidate: how many sample lines share its most common non-zero
/// count. Ties go to the larger count, then to `SNIFF_DELIMITERS` order.
pub fn sniff_delimiter(text: &str) -> u8 {
    let sample: Vec<&str> = text
        .lines()
        .filter(|l| !l.trim().is_empty())
        .take(SNIFF_LINES)
        .collect();

    let mut best: Option<(usize, usize, u8)> = None;
    for delim in SNIFF_DELIMITERS {
        let mut freq: HashMap<usize, usize> = HashMap::new();
        for line in &sample {
            let n = count_outside_quotes(line, delim);
            if n > 0 {
                *freq.entry(n).or_default() += 1;
            }
        }
        let Some((count, lines)) = freq.into_iter().max_by_key(|&(count, lines)| (lines, count)) else {
            continue;
        };
        let better = match best {
            None => true,
            Some((best_lines, best_count, _)) => (lines, count) > (best_lines, best_count),
        };
        if better {
            best = Some((lines, count, delim));
        }
    }
    best.map(|(_, _, d)| d).unwrap_or(FALLBACK_DELIMITER)
}

fn count_outside_quotes(line: &str, delim: u8) -> usize {
    let mut in_quotes = false;
    let mut n = 0;
    for b in line.bytes() {
        if b == b'"' {
            in_quotes = !in_quotes;
        } else if b == delim && !in_quotes {
            n += 1;
        }
    }
    n
}

/// Index of the header line: the first non-blank line containing the delimiter.
///
/// Export preambles ("Atualizado em: 01/02/2024") sit above the header and
/// have no delimiter.
pub fn detect_header_line(text: &str, delimiter: u8) -> Option<usize> {
    let delim = char::from(delimiter);
    text.lines()
        .position(|line| !line.trim().is_empty() && line.contains(delim))
}

/// Parse decoded CSV text. `path`, `stem`, `profile` and `encoding` are left
/// for the caller to fill in.
pub fn parse_text(
    text: &str,
    delimiter: u8,
    candidates: &FieldCandidates,
    options: &IngestOptions,
    profile: Option<&DatasetProfile>,
) -> Result<Dataset, String> {
    let skipped_lines = detect_header_line(text, delimiter).ok_or_else(|| {
        format!(
            "no header row containing the separator '{}'",
            char::from(delimiter).escape_default()
        )
    })?;
    let body = text.split_inclusive('\n').skip(skipped_lines).collect::<String>();

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(body.as_bytes());

    let raw_headers = reader
        .headers()
        .map_err(|e| format!("failed to read CSV header: {e}"))?
        .clone();
    let headers = clean_headers(&raw_headers);

    let roles = resolve_roles(&headers, candidates, options, profile)?;
    let id_column = match options.id_col.as_deref() {
        Some(name) => Some(
            find_exact(&headers, name).ok_or_else(|| format!("column '{name}' given by --id-col not found"))?,
        ),
        None => resolve_column(&headers, &candidates.id, false),
    };

    let id_index = id_column
        .as_deref()
        .and_then(|col| headers.iter().position(|h| h == col));

    let mut rows = Vec::new();
    let mut records = Vec::new();
    let mut row_errors = Vec::new();

    for (idx, result) in reader.records().enumerate() {
        // Fallback when the reader has no position: header is line 1 of `body`.
        let fallback_line = idx + 2;
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                let line = e
                    .position()
                    .map(|p| p.line() as usize)
                    .unwrap_or(fallback_line);
                row_errors.push(RowError {
                    line: skipped_lines + line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };
        let line = skipped_lines
            + record
                .position()
                .map(|p| p.line() as usize)
                .unwrap_or(fallback_line);

        if record.len() > headers.len() {
            row_errors.push(RowError {
                line,
                message: format!("expected {} fields, found {}", headers.len(), record.len()),
            });
            continue;
        }

        let mut values: Vec<String> = record.iter().map(str::to_string).collect();
        values.resize(headers.len(), String::new());

        let id = id_index
            .and_then(|i| values.get(i))
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("line-{line}"));

        let mut raw = RawRecord::new(id);
        for (name, value) in headers.iter().zip(&values) {
            raw.fields.entry(name.clone()).or_insert_with(|| value.clone());
        }

        records.push(raw);
        rows.push(SourceRow { line, values });
    }

    Ok(Dataset {
        path: PathBuf::new(),
        stem: String::new(),
        profile: None,
        encoding: TextEncoding::Utf8,
        delimiter,
        skipped_lines,
        headers,
        id_column,
        roles,
        rows,
        records,
        row_errors,
    })
}

fn clean_headers(raw: &StringRecord) -> Vec<String> {
    raw.iter()
        .enumerate()
        .map(|(idx, name)| {
            let name = name.trim().trim_start_matches('\u{feff}').trim();
            if name.is_empty() {
                format!("column_{}", idx + 1)
            } else {
                name.to_string()
            }
        })
        .collect()
}

fn resolve_roles(
    headers: &[String],
    candidates: &FieldCandidates,
    options: &IngestOptions,
    profile: Option<&DatasetProfile>,
) -> Result<FieldRoles, String> {
    let latitude = required_column(headers, &candidates.latitude, options.lat_col.as_deref(), "latitude", "--lat-col")?;
    let longitude = required_column(headers, &candidates.longitude, options.lon_col.as_deref(), "longitude", "--lon-col")?;
    if latitude == longitude {
        return Err(format!("latitude and longitude resolve to the same column '{latitude}'"));
    }

    let ownership_default = options
        .ownership
        .clone()
        .or_else(|| profile.and_then(|p| p.ownership.clone()));

    // Instrument text drives the IFR split; a near-miss header ("Operação
    // Diurna") would misclassify silently, so it is matched exactly.
    let instrument = resolve_column(headers, &candidates.instrument, false);

    let mut taken: Vec<String> = vec![latitude.clone(), longitude.clone()];
    match options.id_col.as_deref() {
        Some(name) => taken.extend(find_exact(headers, name)),
        None => taken.extend(resolve_column(headers, &candidates.id, false)),
    }
    taken.extend(instrument.clone());
    let mut reserved: Vec<String> = Vec::new();
    for list in [&candidates.latitude, &candidates.longitude, &candidates.id, &candidates.instrument] {
        reserved.extend(list.iter().map(|c| normalize_name(c)));
    }

    let ownership = resolve_optional(headers, &candidates.ownership, &taken, &reserved);
    taken.extend(ownership.clone());
    reserved.extend(candidates.ownership.iter().map(|c| normalize_name(c)));
    let status = resolve_optional(headers, &candidates.status, &taken, &reserved);

    Ok(FieldRoles {
        latitude,
        longitude,
        ownership,
        ownership_default,
        instrument,
        status,
    })
}

/// Exact match first; the fuzzy fallback skips headers already bound to a
/// role and headers that are exactly another role's candidate.
fn resolve_optional(headers: &[String], candidates: &[String], taken: &[String], reserved: &[String]) -> Option<String> {
    if let Some(found) = resolve_column(headers, candidates, false) {
        return Some(found);
    }
    let free: Vec<String> = headers
        .iter()
        .filter(|h| !taken.contains(h) && !reserved.contains(&normalize_name(h)))
        .cloned()
        .collect();
    resolve_column(&free, candidates, true)
}

fn required_column(
    headers: &[String],
    candidates: &[String],
    explicit: Option<&str>,
    role: &str,
    flag: &str,
) -> Result<String, String> {
    if let Some(name) = explicit {
        return find_exact(headers, name).ok_or_else(|| format!("column '{name}' given by {flag} not found"));
    }
    resolve_column(headers, candidates, false).ok_or_else(|| {
        format!(
            "no {role} column found (looked for {}; available: {})",
            candidates.join(", "),
            headers.join(", ")
        )
    })
}

fn find_exact(headers: &[String], name: &str) -> Option<String> {
    if let Some(h) = headers.iter().find(|h| h.as_str() == name.trim()) {
        return Some(h.clone());
    }
    let wanted = normalize_name(name);
    headers.iter().find(|h| normalize_name(h) == wanted).cloned()
}

/// Resolve a role from candidate names.
///
/// Exact normalized-name matches are tried first, in candidate order. With
/// `fuzzy`, long candidates may also match the closest header at an edit
/// distance strictly below `max(2, len / 5)`.
pub fn resolve_column(headers: &[String], candidates: &[String], fuzzy: bool) -> Option<String> {
    let normalized: Vec<String> = headers.iter().map(|h| normalize_name(h)).collect();

    for candidate in candidates {
        let wanted = normalize_name(candidate);
        if wanted.is_empty() {
            continue;
        }
        if let Some(idx) = normalized.iter().position(|h| *h == wanted) {
            return Some(headers[idx].clone());
        }
    }
    if !fuzzy {
        return None;
    }

    let mut best: Option<(usize, usize)> = None;
    for candidate in candidates {
        let wanted = normalize_name(candidate);
        let len = wanted.chars().count();
        if len < FUZZY_MIN_LEN {
            continue;
        }
        let threshold = (len / 5).max(2);
        for (idx, h) in normalized.iter().enumerate() {
            if h.is_empty() {
                continue;
            }
            let d = levenshtein(&wanted, h);
            if d < threshold && best.is_none_or(|(best_d, _)| d < best_d) {
                best = Some((d, idx));
            }
        }
    }
    best.map(|(_, idx)| headers[idx].clone())
}
