use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::color::TeamPalette;
use crate::data::cache::{DataSource, DatasetCache, FsSource};
use crate::data::error::LoadResult;
use crate::data::filter::FilterCriteria;
use crate::data::model::Dataset;
use crate::data::pipeline::{self, DashboardReport};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState<S: DataSource = FsSource> {
    /// Memoized datasets, one per path opened during this process.
    pub cache: DatasetCache<S>,

    /// Path of the dataset currently shown.
    pub path: PathBuf,

    /// Dataset currently shown.
    pub dataset: Arc<Dataset>,

    /// Current sidebar selection.
    pub criteria: FilterCriteria,

    /// Pipeline output for `criteria` (recomputed on every change).
    pub report: DashboardReport,

    /// Per-team colours for the current dataset.
    pub palette: TeamPalette,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl<S: DataSource> AppState<S> {
    /// Load the initial dataset; failure here is fatal to startup.
    pub fn open(mut cache: DatasetCache<S>, path: &Path) -> LoadResult<Self> {
        let dataset = cache.load(path)?;
        let criteria = FilterCriteria::all(&dataset);
        let report = pipeline::run(&dataset, &criteria);
        let palette = TeamPalette::new(&dataset.teams);
        for feature in dataset.features.missing() {
            log::warn!("Feature '{feature}' disabled: missing columns");
        }
        Ok(Self {
            cache,
            path: path.to_path_buf(),
            dataset,
            criteria,
            report,
            palette,
            status_message: None,
        })
    }

    /// Switch to another file. On failure the current dataset stays.
    pub fn switch_dataset(&mut self, path: &Path) {
        match self.cache.load(path) {
            Ok(dataset) => {
                log::info!(
                    "Showing {} ({} rows, columns {:?})",
                    path.display(),
                    dataset.len(),
                    dataset.column_names
                );
                self.criteria = FilterCriteria::all(&dataset);
                self.palette = TeamPalette::new(&dataset.teams);
                self.dataset = dataset;
                self.path = path.to_path_buf();
                self.status_message = None;
                self.refresh();
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Recompute the report after a filter change.
    pub fn refresh(&mut self) {
        self.report = pipeline::run(&self.dataset, &self.criteria);
    }

    /// Toggle a single team in the selection.
    pub fn toggle_team(&mut self, team: &str) {
        self.criteria.toggle_team(&self.dataset, team);
        self.refresh();
    }

    /// Select every team.
    pub fn select_all(&mut self) {
        self.criteria.select_all_teams(&self.dataset);
        self.refresh();
    }

    /// Deselect every team.
    pub fn select_none(&mut self) {
        self.criteria.select_no_teams();
        self.refresh();
    }

    /// Set the year interval (clamped and ordered).
    pub fn set_years(&mut self, min: i64, max: i64) {
        self.criteria.set_years(&self.dataset, min, max);
        self.refresh();
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;
    use crate::data::loader::LoadOptions;
    use crate::data::pipeline::Metric;

    struct MemorySource;

    impl DataSource for MemorySource {
        fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
            match path.to_str() {
                Some("league.csv") => Ok(b"Team,Year,Playoffs\nA,2000,1\nB,2000,0\nA,2001,1\n".to_vec()),
                Some("no_team.csv") => Ok(b"Year\n1999\n".to_vec()),
                Some("broken.csv") => Ok(b"Team,Team\nA,B\n".to_vec()),
                _ => Err(io::Error::new(io::ErrorKind::NotFound, "no such file")),
            }
        }
    }

    fn state() -> AppState<MemorySource> {
        let cache = DatasetCache::with_source(MemorySource, LoadOptions::default());
        AppState::open(cache, Path::new("league.csv")).unwrap()
    }

    #[test]
    fn open_selects_everything() {
        let st = state();
        assert_eq!(st.report.metrics.total_rows, 3);
        assert_eq!(st.report.metrics.playoff_count, Metric::Value(2));
    }

    #[test]
    fn interactions_rerun_the_pipeline() {
        let mut st = state();
        st.toggle_team("A");
        assert_eq!(st.report.metrics.total_rows, 1);
        st.select_all();
        st.set_years(2001, 2001);
        assert_eq!(st.report.metrics.total_rows, 1);
        assert_eq!(st.report.metrics.year_range_label(), "2001-2001");
        st.select_none();
        assert_eq!(st.report.metrics.total_rows, 0);
    }

    #[test]
    fn failed_switch_keeps_current_dataset() {
        let mut st = state();
        st.switch_dataset(Path::new("broken.csv"));
        assert!(st.status_message.is_some());
        assert_eq!(st.path, Path::new("league.csv"));

        st.switch_dataset(Path::new("no_team.csv"));
        assert!(st.status_message.is_none());
        assert!(st.report.team_column_missing());
    }

    #[test]
    fn missing_startup_file_is_an_error() {
        let cache = DatasetCache::with_source(MemorySource, LoadOptions::default());
        assert!(AppState::open(cache, Path::new("absent.csv")).is_err());
    }
}
