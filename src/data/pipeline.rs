use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use super::filter::{self, FilterCriteria, FilteredView, TeamFilterStatus};
use super::model::{
    CellValue, Dataset, LOSSES, PLAYOFFS, RUNS_ALLOWED, RUNS_SCORED, TEAM, WINS, YEAR,
};
use super::schema::{playoff_flag, Feature};
use super::stats::{self, ColumnSummary};

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

/// A metric value, or the marker that its column is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric<T> {
    Value(T),
    Unavailable,
}

impl<T: fmt::Display> fmt::Display for Metric<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Value(v) => write!(f, "{v}"),
            Metric::Unavailable => write!(f, "unavailable"),
        }
    }
}

/// Inclusive year interval shown as `2002-2004`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange(pub i64, pub i64);

impl fmt::Display for YearRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.0, self.1)
    }
}

/// The four headline numbers over the filtered rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metrics {
    pub total_rows: usize,
    pub distinct_teams: Metric<usize>,
    pub year_range: Metric<YearRange>,
    pub playoff_count: Metric<u64>,
}

impl Metrics {
    pub fn year_range_label(&self) -> String {
        self.year_range.to_string()
    }
}

// ---------------------------------------------------------------------------
// Chart inputs
// ---------------------------------------------------------------------------

/// Summed wins and losses of one team.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamRecord {
    pub team: String,
    pub wins: f64,
    pub losses: f64,
}

/// Mean runs scored and allowed in one season.
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonRuns {
    pub year: i64,
    pub runs_scored: f64,
    pub runs_allowed: f64,
}

/// Everything the presentation layer renders for one interaction.
///
/// Each `Option` is `None` when the dataset lacks the columns it needs.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardReport {
    pub view: FilteredView,
    pub metrics: Metrics,
    /// Rows per team, first-seen order.
    pub team_counts: Option<Vec<(String, usize)>>,
    pub wins_losses: Option<Vec<TeamRecord>>,
    /// Ascending by year.
    pub runs_by_year: Option<Vec<SeasonRuns>>,
    /// Rows per team where a `Player` column exists, first-seen order.
    pub player_counts: Option<Vec<(String, usize)>>,
    pub summary: Vec<ColumnSummary>,
}

impl DashboardReport {
    pub fn team_column_missing(&self) -> bool {
        self.view.team_status == TeamFilterStatus::ColumnMissing
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Filter `dataset` by `criteria` and derive every dashboard output.
///
/// Pure: the same inputs always give the same report.
pub fn run(dataset: &Dataset, criteria: &FilterCriteria) -> DashboardReport {
    let view = filter::apply(dataset, criteria);
    if view.team_status == TeamFilterStatus::ColumnMissing {
        log::warn!("Column '{TEAM}' not found; team filter skipped");
    }
    log::debug!(
        "Filtered {} of {} rows (teams: {}, years: {:?})",
        view.len(),
        dataset.len(),
        criteria.selected_teams.len(),
        criteria.year_interval
    );

    let features = dataset.features;
    let metrics = metrics(dataset, &view, criteria);

    let team_counts = features
        .has(Feature::TeamHistogram)
        .then(|| count_by_team(dataset, &view));
    let wins_losses = features
        .has(Feature::WinsLosses)
        .then(|| wins_losses(dataset, &view));
    let runs_by_year = features
        .has(Feature::RunsByYear)
        .then(|| runs_by_year(dataset, &view));
    let player_counts = features
        .has(Feature::PlayerCounts)
        .then(|| count_by_team(dataset, &view));

    DashboardReport {
        summary: stats::describe(dataset, &view),
        view,
        metrics,
        team_counts,
        wins_losses,
        runs_by_year,
        player_counts,
    }
}

/// Headline metrics, computed over the filtered rows only.
pub fn metrics(dataset: &Dataset, view: &FilteredView, criteria: &FilterCriteria) -> Metrics {
    let distinct_teams = match dataset.column(TEAM) {
        Some(c) => {
            let mut seen = HashSet::new();
            for (_, row) in view.rows(dataset) {
                if let Some(team) = row[c].as_key() {
                    seen.insert(team);
                }
            }
            Metric::Value(seen.len())
        }
        None => Metric::Unavailable,
    };

    let year_range = match (dataset.features.has(Feature::YearFilter), criteria.year_interval) {
        (true, Some((lo, hi))) => Metric::Value(YearRange(lo, hi)),
        _ => Metric::Unavailable,
    };

    let playoff_count = match dataset.column(PLAYOFFS) {
        Some(c) => Metric::Value(
            view.rows(dataset)
                .filter_map(|(_, row)| playoff_flag(&row[c]))
                .map(u64::from)
                .sum(),
        ),
        None => Metric::Unavailable,
    };

    Metrics {
        total_rows: view.len(),
        distinct_teams,
        year_range,
        playoff_count,
    }
}

/// Group visible rows by `Team` and count them, in first-seen order.
///
/// Rows with a null team are left out. Empty when there is no team column.
pub fn count_by_team(dataset: &Dataset, view: &FilteredView) -> Vec<(String, usize)> {
    let Some(c) = dataset.column(TEAM) else {
        return Vec::new();
    };
    let mut position: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<(String, usize)> = Vec::new();
    for (_, row) in view.rows(dataset) {
        let Some(team) = row[c].as_key() else {
            continue;
        };
        match position.get(&team) {
            Some(&i) => counts[i].1 += 1,
            None => {
                position.insert(team.clone(), counts.len());
                counts.push((team, 1));
            }
        }
    }
    counts
}

/// Sum `W` and `L` per team, in first-seen order. Nulls add nothing.
pub fn wins_losses(dataset: &Dataset, view: &FilteredView) -> Vec<TeamRecord> {
    let (Some(t), Some(w), Some(l)) = (
        dataset.column(TEAM),
        dataset.column(WINS),
        dataset.column(LOSSES),
    ) else {
        return Vec::new();
    };
    let mut position: HashMap<String, usize> = HashMap::new();
    let mut records: Vec<TeamRecord> = Vec::new();
    for (_, row) in view.rows(dataset) {
        let Some(team) = row[t].as_key() else {
            continue;
        };
        let i = *position.entry(team.clone()).or_insert_with(|| {
            records.push(TeamRecord {
                team,
                wins: 0.0,
                losses: 0.0,
            });
            records.len() - 1
        });
        records[i].wins += number(&row[w]);
        records[i].losses += number(&row[l]);
    }
    records
}

/// Mean `RS` and `RA` for every visible season, ascending by year.
pub fn runs_by_year(dataset: &Dataset, view: &FilteredView) -> Vec<SeasonRuns> {
    let (Some(y), Some(rs), Some(ra)) = (
        dataset.column(YEAR),
        dataset.column(RUNS_SCORED),
        dataset.column(RUNS_ALLOWED),
    ) else {
        return Vec::new();
    };

    #[derive(Default)]
    struct Acc {
        scored: f64,
        scored_n: usize,
        allowed: f64,
        allowed_n: usize,
    }

    let mut seasons: BTreeMap<i64, Acc> = BTreeMap::new();
    for (_, row) in view.rows(dataset) {
        let Some(year) = row[y].as_i64() else {
            continue;
        };
        let acc = seasons.entry(year).or_default();
        if let Some(v) = row[rs].as_f64() {
            acc.scored += v;
            acc.scored_n += 1;
        }
        if let Some(v) = row[ra].as_f64() {
            acc.allowed += v;
            acc.allowed_n += 1;
        }
    }

    let mean = |sum: f64, n: usize| if n == 0 { f64::NAN } else { sum / n as f64 };
    seasons
        .into_iter()
        .map(|(year, acc)| SeasonRuns {
            year,
            runs_scored: mean(acc.scored, acc.scored_n),
            runs_allowed: mean(acc.allowed, acc.allowed_n),
        })
        .collect()
}

fn number(cell: &CellValue) -> f64 {
    cell.as_f64().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::PLAYER;

    fn s(v: &str) -> CellValue {
        CellValue::String(v.to_string())
    }

    fn i(v: i64) -> CellValue {
        CellValue::Integer(v)
    }

    fn table(columns: &[&str], rows: Vec<Vec<CellValue>>) -> Dataset {
        Dataset::from_rows(columns.iter().map(|c| c.to_string()).collect(), rows).unwrap()
    }

    /// Teams A and B for 2000-2005, with every optional column.
    fn league() -> Dataset {
        let mut rows = Vec::new();
        for year in 2000..=2005 {
            for (k, team) in ["A", "B"].into_iter().enumerate() {
                let wins = 80 + year - 2000 + k as i64 * 5;
                rows.push(vec![
                    s(team),
                    i(year),
                    i(wins),
                    i(162 - wins),
                    i(700 + year - 2000),
                    i(650 + k as i64 * 10),
                    i(i64::from(wins >= 85)),
                    s(&format!("{team}-{year}")),
                ]);
            }
        }
        table(
            &[TEAM, YEAR, WINS, LOSSES, RUNS_SCORED, RUNS_ALLOWED, PLAYOFFS, PLAYER],
            rows,
        )
    }

    #[test]
    fn end_to_end_team_and_year_selection() {
        let ds = league();
        let criteria = FilterCriteria::new(&ds, ["A"], Some((2002, 2004)));
        let report = run(&ds, &criteria);

        let expected: Vec<usize> = (0..ds.len())
            .filter(|&r| {
                ds.value(r, TEAM) == Some(&s("A"))
                    && ds
                        .value(r, YEAR)
                        .and_then(CellValue::as_i64)
                        .is_some_and(|y| (2002..=2004).contains(&y))
            })
            .collect();
        assert_eq!(report.view.indices, expected);
        assert_eq!(report.metrics.total_rows, 3);
        assert_eq!(report.metrics.year_range_label(), "2002-2004");
        assert_eq!(report.metrics.distinct_teams, Metric::Value(1));
        // A wins 82, 83, 84 in those seasons: none reach 85.
        assert_eq!(report.metrics.playoff_count, Metric::Value(0));
    }

    #[test]
    fn playoff_count_sums_flags() {
        let ds = league();
        let report = run(&ds, &FilterCriteria::all(&ds));
        // A: 2005 (85). B: every season from 2000 (85..90).
        assert_eq!(report.metrics.playoff_count, Metric::Value(7));
        assert_eq!(report.metrics.distinct_teams, Metric::Value(2));
        assert_eq!(report.metrics.year_range_label(), "2000-2005");
    }

    #[test]
    fn player_counts_follow_first_appearance() {
        let ds = table(
            &[TEAM, PLAYER],
            vec![
                vec![s("A"), s("p1")],
                vec![s("A"), s("p2")],
                vec![s("B"), s("p3")],
            ],
        );
        let report = run(&ds, &FilterCriteria::all(&ds));
        assert_eq!(
            report.player_counts,
            Some(vec![("A".to_string(), 2), ("B".to_string(), 1)])
        );
    }

    #[test]
    fn first_seen_order_is_not_alphabetical() {
        let ds = table(
            &[TEAM, PLAYER],
            vec![vec![s("Z"), s("p1")], vec![s("A"), s("p2")], vec![s("Z"), s("p3")]],
        );
        let report = run(&ds, &FilterCriteria::all(&ds));
        assert_eq!(
            report.team_counts,
            Some(vec![("Z".to_string(), 2), ("A".to_string(), 1)])
        );
    }

    #[test]
    fn missing_team_column_degrades_only_team_features() {
        let rows = (2000..=2005)
            .map(|y| vec![i(y), i(700), i(650), i(1)])
            .collect();
        let ds = table(&[YEAR, RUNS_SCORED, RUNS_ALLOWED, PLAYOFFS], rows);
        let criteria = FilterCriteria::new(&ds, Vec::<String>::new(), Some((2001, 2003)));
        let report = run(&ds, &criteria);

        assert!(report.team_column_missing());
        assert_eq!(report.metrics.distinct_teams, Metric::Unavailable);
        assert_eq!(report.metrics.distinct_teams.to_string(), "unavailable");
        assert_eq!(report.metrics.total_rows, 3);
        assert_eq!(report.metrics.year_range_label(), "2001-2003");
        assert_eq!(report.metrics.playoff_count, Metric::Value(3));
        assert_eq!(report.team_counts, None);
        assert_eq!(report.wins_losses, None);
        assert_eq!(report.player_counts, None);
        assert_eq!(report.runs_by_year.map(|r| r.len()), Some(3));
    }

    #[test]
    fn missing_optional_columns_are_unavailable() {
        let ds = table(&[TEAM], vec![vec![s("A")]]);
        let report = run(&ds, &FilterCriteria::all(&ds));
        assert_eq!(report.metrics.year_range, Metric::Unavailable);
        assert_eq!(report.metrics.playoff_count, Metric::Unavailable);
        assert_eq!(report.metrics.year_range_label(), "unavailable");
        assert_eq!(report.runs_by_year, None);
        assert!(report.team_counts.is_some());
    }

    #[test]
    fn wins_losses_are_summed_per_team() {
        let ds = league();
        let criteria = FilterCriteria::new(&ds, ["B", "A"], Some((2000, 2001)));
        let records = run(&ds, &criteria).wins_losses.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].team, "A");
        assert_eq!(records[0].wins, 161.0);
        assert_eq!(records[0].losses, 163.0);
        assert_eq!(records[1].wins, 171.0);
    }

    #[test]
    fn runs_are_averaged_per_season() {
        let ds = league();
        let seasons = run(&ds, &FilterCriteria::all(&ds)).runs_by_year.unwrap();
        assert_eq!(seasons.len(), 6);
        assert_eq!(seasons[0].year, 2000);
        assert_eq!(seasons[0].runs_scored, 700.0);
        assert_eq!(seasons[0].runs_allowed, 655.0);
        assert_eq!(seasons[5].runs_scored, 705.0);
    }

    #[test]
    fn pipeline_is_pure() {
        let ds = league();
        let criteria = FilterCriteria::new(&ds, ["B"], Some((2003, 2005)));
        assert_eq!(run(&ds, &criteria), run(&ds, &criteria));
    }
}
