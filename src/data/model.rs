use std::collections::{BTreeSet, HashMap};
use std::fmt;

use super::error::FormatError;
use super::schema::{self, FeatureSet};

/// Column holding the grouping entity (team name).
pub const TEAM: &str = "Team";
/// Column holding the season, used for range filtering.
pub const YEAR: &str = "Year";
pub const WINS: &str = "W";
pub const LOSSES: &str = "L";
pub const RUNS_SCORED: &str = "RS";
pub const RUNS_ALLOWED: &str = "RA";
pub const PLAYOFFS: &str = "Playoffs";
pub const PLAYER: &str = "Player";

// ---------------------------------------------------------------------------
// CellValue – a single cell of the table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

/// Text cells read as missing values, compared after trimming.
pub const NA_TOKENS: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, ""),
        }
    }
}

impl CellValue {
    /// Guess the type of a raw text cell.
    ///
    /// The trimmed cell is null when it is one of [`NA_TOKENS`] (`NA`,
    /// `N/A`, `null`, the empty string, ...). Numbers and booleans are read
    /// from the trimmed text; other text keeps its whitespace.
    pub fn parse(s: &str) -> CellValue {
        let t = s.trim();
        if NA_TOKENS.contains(&t) {
            return CellValue::Null;
        }
        if let Ok(i) = t.parse::<i64>() {
            return CellValue::Integer(i);
        }
        if let Ok(f) = t.parse::<f64>() {
            if f.is_nan() {
                return CellValue::Null;
            }
            return CellValue::Float(f);
        }
        if t.eq_ignore_ascii_case("true") || t.eq_ignore_ascii_case("false") {
            return CellValue::Bool(t.eq_ignore_ascii_case("true"));
        }
        CellValue::String(s.to_string())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Numeric view of the value; booleans are not numbers here.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Integer view, accepting floats without a fractional part.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CellValue::Integer(i) => Some(*i),
            CellValue::Float(v) if v.fract() == 0.0 && v.is_finite() => Some(*v as i64),
            _ => None,
        }
    }

    /// Text key used for team membership; `None` for nulls.
    pub fn as_key(&self) -> Option<String> {
        match self {
            CellValue::Null => None,
            other => Some(other.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// ColumnKind – the inferred type of a whole column
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Every cell is null.
    Empty,
    Integer,
    /// Mix of integers and floats, or floats only.
    Float,
    Bool,
    /// Anything else, including mixed text and numbers.
    Text,
}

impl ColumnKind {
    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnKind::Integer | ColumnKind::Float)
    }

    fn infer<'a>(cells: impl Iterator<Item = &'a CellValue>) -> ColumnKind {
        let mut kind = ColumnKind::Empty;
        for cell in cells {
            let cell_kind = match cell {
                CellValue::Null => continue,
                CellValue::Integer(_) => ColumnKind::Integer,
                CellValue::Float(_) => ColumnKind::Float,
                CellValue::Bool(_) => ColumnKind::Bool,
                CellValue::String(_) => return ColumnKind::Text,
            };
            kind = match (kind, cell_kind) {
                (ColumnKind::Empty, k) => k,
                (a, b) if a == b => a,
                (ColumnKind::Integer, ColumnKind::Float) | (ColumnKind::Float, ColumnKind::Integer) => {
                    ColumnKind::Float
                }
                _ => return ColumnKind::Text,
            };
        }
        kind
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed table with pre-computed column indices.
///
/// Immutable once built; everything derived from it borrows it.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// Ordered column names, already trimmed and unique.
    pub column_names: Vec<String>,
    /// Row-major cells; every row has `column_names.len()` entries.
    pub rows: Vec<Vec<CellValue>>,
    /// Inferred type of each column, parallel to `column_names`.
    pub column_kinds: Vec<ColumnKind>,
    /// Sorted distinct non-null `Team` values (empty without a team column).
    pub teams: Vec<String>,
    /// Observed `[min, max]` of `Year`, if any year is present.
    pub year_bounds: Option<(i64, i64)>,
    /// Which dashboard features this table supports.
    pub features: FeatureSet,
    column_index: HashMap<String, usize>,
}

impl Dataset {
    /// Build the dataset and its indices, validating the typed columns.
    ///
    /// Column names must already be normalised; rows shorter than the
    /// header are padded with nulls.
    pub fn from_rows(
        column_names: Vec<String>,
        mut rows: Vec<Vec<CellValue>>,
    ) -> Result<Self, FormatError> {
        let width = column_names.len();
        for row in &mut rows {
            row.resize(width, CellValue::Null);
        }

        let column_index: HashMap<String, usize> = column_names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();

        let column_kinds = (0..width)
            .map(|c| ColumnKind::infer(rows.iter().map(|r| &r[c])))
            .collect();

        let mut dataset = Dataset {
            column_names,
            rows,
            column_kinds,
            teams: Vec::new(),
            year_bounds: None,
            features: FeatureSet::default(),
            column_index,
        };

        schema::validate(&dataset)?;

        if let Some(team_col) = dataset.column(TEAM) {
            let distinct: BTreeSet<String> = dataset
                .rows
                .iter()
                .filter_map(|r| r[team_col].as_key())
                .collect();
            dataset.teams = distinct.into_iter().collect();
        }

        if let Some(year_col) = dataset.column(YEAR) {
            dataset.year_bounds = dataset
                .rows
                .iter()
                .filter_map(|r| r[year_col].as_i64())
                .fold(None, |acc, y| match acc {
                    None => Some((y, y)),
                    Some((lo, hi)) => Some((lo.min(y), hi.max(y))),
                });
        }

        dataset.features = FeatureSet::detect(&dataset);
        Ok(dataset)
    }

    /// Position of a column by exact name.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.column_index.get(name).copied()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index.contains_key(name)
    }

    /// Cell at `(row, column name)`; `None` when the column is absent.
    pub fn value(&self, row: usize, column: &str) -> Option<&CellValue> {
        let c = self.column(column)?;
        self.rows.get(row).map(|r| &r[c])
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> CellValue {
        CellValue::String(v.to_string())
    }

    #[test]
    fn parse_guesses_cell_types() {
        assert_eq!(CellValue::parse(""), CellValue::Null);
        assert_eq!(CellValue::parse(" 7"), CellValue::Integer(7));
        assert_eq!(CellValue::parse("NA"), CellValue::Null);
        assert_eq!(CellValue::parse(" N/A "), CellValue::Null);
        assert_eq!(CellValue::parse("#N/A"), CellValue::Null);
        assert_eq!(CellValue::parse("<NA>"), CellValue::Null);
        assert_eq!(CellValue::parse("None"), CellValue::Null);
        assert_eq!(CellValue::parse("   "), CellValue::Null);
        assert_eq!(CellValue::parse("NAT"), s("NAT"));
        assert_eq!(CellValue::parse("2012"), CellValue::Integer(2012));
        assert_eq!(CellValue::parse("0.327"), CellValue::Float(0.327));
        assert_eq!(CellValue::parse("TRUE"), CellValue::Bool(true));
        assert_eq!(CellValue::parse("false"), CellValue::Bool(false));
        assert_eq!(CellValue::parse("NYY"), s("NYY"));
        assert_eq!(CellValue::parse("nan"), CellValue::Null);
    }

    #[test]
    fn integral_floats_read_as_integers() {
        assert_eq!(CellValue::Float(2001.0).as_i64(), Some(2001));
        assert_eq!(CellValue::Float(2001.5).as_i64(), None);
        assert_eq!(CellValue::Bool(true).as_f64(), None);
    }

    #[test]
    fn column_kinds_follow_cell_mix() {
        let ds = Dataset::from_rows(
            vec!["a".into(), "b".into(), "c".into(), "d".into()],
            vec![
                vec![CellValue::Integer(1), CellValue::Integer(1), s("x"), CellValue::Null],
                vec![CellValue::Integer(2), CellValue::Float(0.5), CellValue::Integer(3), CellValue::Null],
            ],
        )
        .unwrap();
        assert_eq!(
            ds.column_kinds,
            vec![ColumnKind::Integer, ColumnKind::Float, ColumnKind::Text, ColumnKind::Empty]
        );
    }

    #[test]
    fn builds_team_and_year_indices() {
        let ds = Dataset::from_rows(
            vec![TEAM.into(), YEAR.into()],
            vec![
                vec![s("SFG"), CellValue::Integer(2010)],
                vec![s("ARI"), CellValue::Integer(2004)],
                vec![CellValue::Null, CellValue::Null],
                vec![s("SFG"), CellValue::Integer(2012)],
            ],
        )
        .unwrap();
        assert_eq!(ds.teams, vec!["ARI".to_string(), "SFG".to_string()]);
        assert_eq!(ds.year_bounds, Some((2004, 2012)));
        assert_eq!(ds.value(3, TEAM), Some(&s("SFG")));
        assert_eq!(ds.value(0, PLAYER), None);
    }

    #[test]
    fn short_rows_are_padded() {
        let ds = Dataset::from_rows(
            vec!["a".into(), "b".into()],
            vec![vec![CellValue::Integer(1)]],
        )
        .unwrap();
        assert_eq!(ds.rows[0], vec![CellValue::Integer(1), CellValue::Null]);
    }
}
