use std::collections::BTreeSet;

use super::model::{CellValue, Dataset, TEAM, YEAR};

// ---------------------------------------------------------------------------
// Filter criteria: selected teams and year interval
// ---------------------------------------------------------------------------

/// The user's current sidebar selection.
///
/// `selected_teams` is always a subset of the dataset's distinct teams and
/// `year_interval` always lies within the observed year bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCriteria {
    pub selected_teams: BTreeSet<String>,
    /// Inclusive `[min, max]`; `None` when the dataset has no usable year.
    pub year_interval: Option<(i64, i64)>,
}

impl FilterCriteria {
    /// Everything selected: all teams, full observed year range.
    pub fn all(dataset: &Dataset) -> Self {
        Self {
            selected_teams: dataset.teams.iter().cloned().collect(),
            year_interval: dataset.year_bounds,
        }
    }

    /// Build criteria from raw user input, clamped to what the dataset holds.
    ///
    /// Unknown teams are dropped; the interval is clamped to the observed
    /// bounds and reordered if given backwards.
    pub fn new<I, S>(dataset: &Dataset, teams: I, years: Option<(i64, i64)>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let known: BTreeSet<&str> = dataset.teams.iter().map(String::as_str).collect();
        let selected_teams = teams
            .into_iter()
            .map(Into::into)
            .filter(|t: &String| known.contains(t.as_str()))
            .collect();

        let year_interval = match (dataset.year_bounds, years) {
            (Some(bounds), Some(requested)) => Some(clamp_interval(requested, bounds)),
            (bounds, _) => bounds,
        };

        Self {
            selected_teams,
            year_interval,
        }
    }

    /// Toggle a single team; unknown names are ignored.
    pub fn toggle_team(&mut self, dataset: &Dataset, team: &str) {
        if !self.selected_teams.remove(team) && dataset.teams.iter().any(|t| t == team) {
            self.selected_teams.insert(team.to_string());
        }
    }

    pub fn select_all_teams(&mut self, dataset: &Dataset) {
        self.selected_teams = dataset.teams.iter().cloned().collect();
    }

    pub fn select_no_teams(&mut self) {
        self.selected_teams.clear();
    }

    /// Replace the year interval, clamped to the dataset's bounds.
    pub fn set_years(&mut self, dataset: &Dataset, min: i64, max: i64) {
        if let Some(bounds) = dataset.year_bounds {
            self.year_interval = Some(clamp_interval((min, max), bounds));
        }
    }
}

fn clamp_interval((a, b): (i64, i64), (lo, hi): (i64, i64)) -> (i64, i64) {
    let (a, b) = if a <= b { (a, b) } else { (b, a) };
    (a.clamp(lo, hi), b.clamp(lo, hi))
}

// ---------------------------------------------------------------------------
// Filtered view
// ---------------------------------------------------------------------------

/// Whether the team predicate could run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeamFilterStatus {
    Applied,
    /// No `Team` column: every row passed, and the UI should say so.
    ColumnMissing,
}

/// The rows of a [`Dataset`] passing the current criteria, by index.
///
/// Indices are ascending and unique, so the view never reorders or
/// duplicates rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilteredView {
    pub indices: Vec<usize>,
    pub team_status: TeamFilterStatus,
}

impl FilteredView {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Iterate over `(row index, row cells)` of the visible rows.
    pub fn rows<'a>(
        &'a self,
        dataset: &'a Dataset,
    ) -> impl Iterator<Item = (usize, &'a [CellValue])> + 'a {
        self.indices.iter().map(move |&i| (i, dataset.rows[i].as_slice()))
    }
}

/// Return the rows of `dataset` that pass both predicates.
///
/// A row passes when:
/// * there is no `Team` column, or its team is in `selected_teams`
///   (a null team never passes)
/// * there is no `Year` column, or its year lies in `year_interval`
///   inclusive (a null year never passes)
pub fn apply(dataset: &Dataset, criteria: &FilterCriteria) -> FilteredView {
    let team_col = dataset.column(TEAM);
    let year_col = dataset.column(YEAR);
    let team_status = if team_col.is_some() {
        TeamFilterStatus::Applied
    } else {
        TeamFilterStatus::ColumnMissing
    };

    let indices = dataset
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| {
            let team_ok = team_col.map_or(true, |c| {
                row[c]
                    .as_key()
                    .is_some_and(|team| criteria.selected_teams.contains(&team))
            });
            let year_ok = match (year_col, criteria.year_interval) {
                (None, _) => true,
                (Some(c), Some((lo, hi))) => row[c].as_i64().is_some_and(|y| lo <= y && y <= hi),
                // Year column present but holding no values at all.
                (Some(_), None) => true,
            };
            team_ok && year_ok
        })
        .map(|(i, _)| i)
        .collect();

    FilteredView {
        indices,
        team_status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> Dataset {
        let mut rows = Vec::new();
        for year in 2000..=2005 {
            for team in ["A", "B"] {
                rows.push(vec![
                    CellValue::String(team.to_string()),
                    CellValue::Integer(year),
                ]);
            }
        }
        rows.push(vec![CellValue::Null, CellValue::Integer(2003)]);
        rows.push(vec![CellValue::String("A".into()), CellValue::Null]);
        Dataset::from_rows(vec![TEAM.into(), YEAR.into()], rows).unwrap()
    }

    fn team_of(ds: &Dataset, i: usize) -> Option<String> {
        ds.value(i, TEAM).and_then(CellValue::as_key)
    }

    fn year_of(ds: &Dataset, i: usize) -> Option<i64> {
        ds.value(i, YEAR).and_then(CellValue::as_i64)
    }

    #[test]
    fn matches_brute_force_for_every_criteria() {
        let ds = fixture();
        let team_sets: Vec<Vec<&str>> = vec![vec![], vec!["A"], vec!["B"], vec!["A", "B"]];
        for teams in &team_sets {
            for lo in 2000..=2005 {
                for hi in lo..=2005 {
                    let criteria = FilterCriteria::new(&ds, teams.iter().copied(), Some((lo, hi)));
                    let view = apply(&ds, &criteria);
                    let expected: Vec<usize> = (0..ds.len())
                        .filter(|&i| {
                            team_of(&ds, i).is_some_and(|t| teams.contains(&t.as_str()))
                                && year_of(&ds, i).is_some_and(|y| lo <= y && y <= hi)
                        })
                        .collect();
                    assert_eq!(view.indices, expected, "teams {teams:?}, years {lo}-{hi}");
                }
            }
        }
    }

    #[test]
    fn applying_twice_is_identical() {
        let ds = fixture();
        let criteria = FilterCriteria::new(&ds, ["B"], Some((2001, 2003)));
        assert_eq!(apply(&ds, &criteria), apply(&ds, &criteria));
    }

    #[test]
    fn full_criteria_keeps_every_non_null_row() {
        let rows = vec![
            vec![CellValue::String("A".into()), CellValue::Integer(2000)],
            vec![CellValue::String("B".into()), CellValue::Integer(2004)],
        ];
        let ds = Dataset::from_rows(vec![TEAM.into(), YEAR.into()], rows).unwrap();
        let view = apply(&ds, &FilterCriteria::all(&ds));
        assert_eq!(view.indices, vec![0, 1]);
        assert_eq!(view.team_status, TeamFilterStatus::Applied);
    }

    #[test]
    fn missing_team_column_passes_all_teams() {
        let rows = (2000..=2004).map(|y| vec![CellValue::Integer(y)]).collect();
        let ds = Dataset::from_rows(vec![YEAR.into()], rows).unwrap();
        let criteria = FilterCriteria::new(&ds, ["A"], Some((2001, 2002)));
        let view = apply(&ds, &criteria);
        assert_eq!(view.team_status, TeamFilterStatus::ColumnMissing);
        assert_eq!(view.indices, vec![1, 2]);
    }

    #[test]
    fn missing_year_column_passes_all_years() {
        let rows = vec![
            vec![CellValue::String("A".into())],
            vec![CellValue::String("B".into())],
        ];
        let ds = Dataset::from_rows(vec![TEAM.into()], rows).unwrap();
        let criteria = FilterCriteria::new(&ds, ["B"], Some((1990, 1991)));
        assert_eq!(criteria.year_interval, None);
        assert_eq!(apply(&ds, &criteria).indices, vec![1]);
    }

    #[test]
    fn criteria_are_clamped_to_dataset() {
        let ds = fixture();
        let criteria = FilterCriteria::new(&ds, ["A", "Z"], Some((2010, 1990)));
        assert_eq!(criteria.selected_teams, BTreeSet::from(["A".to_string()]));
        assert_eq!(criteria.year_interval, Some((2000, 2005)));
    }

    #[test]
    fn toggling_teams() {
        let ds = fixture();
        let mut criteria = FilterCriteria::all(&ds);
        criteria.toggle_team(&ds, "A");
        assert_eq!(criteria.selected_teams.len(), 1);
        criteria.toggle_team(&ds, "A");
        criteria.toggle_team(&ds, "nope");
        assert_eq!(criteria.selected_teams.len(), 2);
        criteria.select_no_teams();
        assert!(apply(&ds, &criteria).is_empty());
    }
}
