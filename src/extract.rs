/// Field extraction: pull the six benchmark measurements out of a report's text.
///
/// Each report produced by the sort benchmark driver contains lines like:
/// - `Bencharking with input size 1024, and threshold 16 (10 loops)`
/// - `Key comparisons: 9123, Average time: 0.000123 s, Standard deviation: 1.2e-05 s`
///
/// Extraction is a fixed, ordered rule table. Every rule takes the first
/// match only, and every field is mandatory.
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// One of the six columns of an extracted record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Size,
    Threshold,
    Loops,
    Keycomps,
    Time,
    Stddev,
}

impl Field {
    /// All fields in output column order.
    pub const ALL: [Field; 6] = [
        Field::Size,
        Field::Threshold,
        Field::Loops,
        Field::Keycomps,
        Field::Time,
        Field::Stddev,
    ];

    /// Column name used in the CSV header and JSON output.
    pub fn name(self) -> &'static str {
        match self {
            Field::Size => "size",
            Field::Threshold => "threshold",
            Field::Loops => "loops",
            Field::Keycomps => "keycomps",
            Field::Time => "time",
            Field::Stddev => "stddev",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The six-field summary of one report file.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExtractedRecord {
    pub size: u64,
    pub threshold: u64,
    pub loops: u64,
    pub keycomps: u64,
    pub time: f64,
    pub stddev: f64,
}

impl ExtractedRecord {
    /// Parse `raw` as the value of `field` and store it.
    fn set(&mut self, field: Field, raw: &str) -> Result<(), ExtractError> {
        match field {
            Field::Size => self.size = parse_int(field, raw)?,
            Field::Threshold => self.threshold = parse_int(field, raw)?,
            Field::Loops => self.loops = parse_int(field, raw)?,
            Field::Keycomps => self.keycomps = parse_int(field, raw)?,
            Field::Time => self.time = parse_float(field, raw)?,
            Field::Stddev => self.stddev = parse_float(field, raw)?,
        }
        Ok(())
    }

    /// Render the record's values in column order.
    pub fn values(&self) -> [String; 6] {
        [
            self.size.to_string(),
            self.threshold.to_string(),
            self.loops.to_string(),
            self.keycomps.to_string(),
            format_float(self.time),
            format_float(self.stddev),
        ]
    }
}

/// A pattern and the fields its capture groups fill, in group order.
struct Rule {
    pattern: Regex,
    fields: &'static [Field],
}

impl Rule {
    fn new(pattern: &str, fields: &'static [Field]) -> Self {
        Self {
            pattern: Regex::new(pattern).unwrap(),
            fields,
        }
    }
}

/// Compiled extraction rules, applied in this order.
static RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        Rule::new(r"input size ([0-9]+)", &[Field::Size]),
        Rule::new(
            r"threshold ([0-9]+) \(([0-9]+) loops",
            &[Field::Threshold, Field::Loops],
        ),
        Rule::new(r"comparisons: ([0-9]+)", &[Field::Keycomps]),
        Rule::new(r"Average time: (\S+)", &[Field::Time]),
        Rule::new(r"Standard deviation: (\S+)", &[Field::Stddev]),
    ]
});

/// Extract a record from a report's full text.
///
/// Fails on the first rule without a match, or the first capture that does
/// not parse as its field's numeric type.
pub fn extract_record(text: &str) -> Result<ExtractedRecord, ExtractError> {
    let mut record = ExtractedRecord::default();

    for rule in RULES.iter() {
        let caps = rule.pattern.captures(text).ok_or(ExtractError::Missing {
            field: rule.fields[0],
        })?;

        for (i, &field) in rule.fields.iter().enumerate() {
            let raw = caps
                .get(i + 1)
                .map(|m| m.as_str())
                .ok_or(ExtractError::Missing { field })?;
            tracing::trace!(field = %field, raw, "matched");
            record.set(field, raw)?;
        }
    }

    Ok(record)
}

fn parse_int(field: Field, raw: &str) -> Result<u64, ExtractError> {
    raw.parse().map_err(|_| ExtractError::Parse {
        field,
        value: raw.to_string(),
    })
}

fn parse_float(field: Field, raw: &str) -> Result<f64, ExtractError> {
    raw.parse().map_err(|_| ExtractError::Parse {
        field,
        value: raw.to_string(),
    })
}

/// Shortest round-trip form, always with a decimal point or exponent.
///
/// Exponents carry an explicit sign and at least two digits (`1.2e-05`,
/// `1e+16`), matching the report driver's `%g` spelling.
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }

    let debug = format!("{value:?}");
    match debug.split_once('e') {
        Some((mantissa, exp)) => {
            let (sign, digits) = match exp.strip_prefix('-') {
                Some(d) => ('-', d),
                None => ('+', exp),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => debug,
    }
}

/// Errors from extracting a record out of report text.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractError {
    /// No match for the pattern that provides `field`.
    Missing { field: Field },
    /// The captured text is not a valid number for `field`.
    Parse { field: Field, value: String },
}

impl std::fmt::Display for ExtractError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractError::Missing { field } => {
                write!(f, "extraction error: no match for {field}")
            }
            ExtractError::Parse { field, value } => {
                write!(f, "extraction error: invalid {field} value {value:?}")
            }
        }
    }
}

impl std::error::Error for ExtractError {}
