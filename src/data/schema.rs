use std::fmt;

use super::error::FormatError;
use super::model::{
    CellValue, Dataset, LOSSES, PLAYER, PLAYOFFS, RUNS_ALLOWED, RUNS_SCORED, TEAM, WINS, YEAR,
};

// ---------------------------------------------------------------------------
// Feature gating: which dashboard elements the loaded columns support
// ---------------------------------------------------------------------------

/// A metric or chart that needs particular columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    TeamFilter,
    YearFilter,
    Playoffs,
    TeamHistogram,
    WinsLosses,
    RunsByYear,
    PlayerCounts,
}

impl Feature {
    pub const ALL: [Feature; 7] = [
        Feature::TeamFilter,
        Feature::YearFilter,
        Feature::Playoffs,
        Feature::TeamHistogram,
        Feature::WinsLosses,
        Feature::RunsByYear,
        Feature::PlayerCounts,
    ];

    /// Columns that must be present for this feature.
    pub fn required_columns(self) -> &'static [&'static str] {
        match self {
            Feature::TeamFilter | Feature::TeamHistogram => &[TEAM],
            Feature::YearFilter => &[YEAR],
            Feature::Playoffs => &[PLAYOFFS],
            Feature::WinsLosses => &[WINS, LOSSES, TEAM],
            Feature::RunsByYear => &[YEAR, RUNS_SCORED, RUNS_ALLOWED],
            Feature::PlayerCounts => &[PLAYER, TEAM],
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Feature::TeamFilter => "team filter",
            Feature::YearFilter => "year filter",
            Feature::Playoffs => "playoff count",
            Feature::TeamHistogram => "rows per team",
            Feature::WinsLosses => "wins and losses",
            Feature::RunsByYear => "runs scored and allowed",
            Feature::PlayerCounts => "players per team",
        };
        write!(f, "{name}")
    }
}

/// Capability flags, computed once right after load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeatureSet {
    pub team_filter: bool,
    pub year_filter: bool,
    pub playoffs: bool,
    pub team_histogram: bool,
    pub wins_losses: bool,
    pub runs_by_year: bool,
    pub player_counts: bool,
}

impl FeatureSet {
    pub fn detect(dataset: &Dataset) -> Self {
        let mut set = FeatureSet::default();
        for feature in Feature::ALL {
            let available = feature
                .required_columns()
                .iter()
                .all(|c| dataset.has_column(c));
            set.set(feature, available);
        }
        // A year column with no usable value cannot bound a range.
        if dataset.year_bounds.is_none() {
            set.year_filter = false;
            set.runs_by_year = false;
        }
        set
    }

    pub fn has(&self, feature: Feature) -> bool {
        match feature {
            Feature::TeamFilter => self.team_filter,
            Feature::YearFilter => self.year_filter,
            Feature::Playoffs => self.playoffs,
            Feature::TeamHistogram => self.team_histogram,
            Feature::WinsLosses => self.wins_losses,
            Feature::RunsByYear => self.runs_by_year,
            Feature::PlayerCounts => self.player_counts,
        }
    }

    fn set(&mut self, feature: Feature, on: bool) {
        let flag = match feature {
            Feature::TeamFilter => &mut self.team_filter,
            Feature::YearFilter => &mut self.year_filter,
            Feature::Playoffs => &mut self.playoffs,
            Feature::TeamHistogram => &mut self.team_histogram,
            Feature::WinsLosses => &mut self.wins_losses,
            Feature::RunsByYear => &mut self.runs_by_year,
            Feature::PlayerCounts => &mut self.player_counts,
        };
        *flag = on;
    }

    /// Features switched off for this dataset.
    pub fn missing(&self) -> Vec<Feature> {
        Feature::ALL.into_iter().filter(|f| !self.has(*f)).collect()
    }
}

// ---------------------------------------------------------------------------
// Typed column validation
// ---------------------------------------------------------------------------

/// Reject values the typed columns cannot hold.
///
/// `Year` takes integers, `Playoffs` takes booleans or 0/1. Nulls are
/// allowed in both.
pub fn validate(dataset: &Dataset) -> Result<(), FormatError> {
    if let Some(c) = dataset.column(YEAR) {
        for (row, cells) in dataset.rows.iter().enumerate() {
            let cell = &cells[c];
            if !cell.is_null() && cell.as_i64().is_none() {
                return Err(invalid(YEAR, row, cell, "expected an integer year"));
            }
        }
    }
    if let Some(c) = dataset.column(PLAYOFFS) {
        for (row, cells) in dataset.rows.iter().enumerate() {
            let cell = &cells[c];
            if !cell.is_null() && playoff_flag(cell).is_none() {
                return Err(invalid(PLAYOFFS, row, cell, "expected true/false or 0/1"));
            }
        }
    }
    Ok(())
}

/// Coerce a `Playoffs` cell to 0/1; `None` for anything else (nulls included).
pub fn playoff_flag(cell: &CellValue) -> Option<u8> {
    match cell {
        CellValue::Bool(b) => Some(u8::from(*b)),
        CellValue::Integer(0) => Some(0),
        CellValue::Integer(1) => Some(1),
        CellValue::Float(v) if *v == 0.0 => Some(0),
        CellValue::Float(v) if *v == 1.0 => Some(1),
        _ => None,
    }
}

fn invalid(column: &str, row: usize, cell: &CellValue, expected: &str) -> FormatError {
    FormatError::InvalidValue {
        column: column.to_string(),
        row,
        message: format!("{expected}, found '{cell}'"),
    }
}
