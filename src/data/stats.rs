use super::filter::FilteredView;
use super::model::Dataset;

/// count / mean / std / min / quartiles / max of one numeric column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; NaN below two values.
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

impl ColumnSummary {
    /// Row labels in display order, matching [`ColumnSummary::values`].
    pub const LABELS: [&'static str; 8] = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

    pub fn values(&self) -> [f64; 8] {
        [
            self.count as f64,
            self.mean,
            self.std,
            self.min,
            self.q25,
            self.median,
            self.q75,
            self.max,
        ]
    }

    fn from_values(column: &str, mut values: Vec<f64>) -> Self {
        values.sort_by(|a, b| a.total_cmp(b));
        let count = values.len();
        if count == 0 {
            return Self {
                column: column.to_string(),
                count,
                mean: f64::NAN,
                std: f64::NAN,
                min: f64::NAN,
                q25: f64::NAN,
                median: f64::NAN,
                q75: f64::NAN,
                max: f64::NAN,
            };
        }

        let n = count as f64;
        let mean = values.iter().sum::<f64>() / n;
        let std = if count > 1 {
            let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
            (ss / (n - 1.0)).sqrt()
        } else {
            f64::NAN
        };

        Self {
            column: column.to_string(),
            count,
            mean,
            std,
            min: values[0],
            q25: percentile_linear(&values, 0.25),
            median: percentile_linear(&values, 0.50),
            q75: percentile_linear(&values, 0.75),
            max: values[count - 1],
        }
    }
}

/// Linear interpolation between closest ranks over a sorted, non-empty slice.
fn percentile_linear(sorted: &[f64], q: f64) -> f64 {
    if sorted.len() == 1 {
        return sorted[0];
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    if lower == upper {
        sorted[lower]
    } else {
        let frac = pos - lower as f64;
        sorted[lower] * (1.0 - frac) + sorted[upper] * frac
    }
}

/// Summaries of every numeric column over the visible rows, in column order.
///
/// Numeric means integer or float as inferred over the whole dataset;
/// boolean and text columns are skipped, nulls are not counted.
pub fn describe(dataset: &Dataset, view: &FilteredView) -> Vec<ColumnSummary> {
    dataset
        .column_names
        .iter()
        .zip(&dataset.column_kinds)
        .enumerate()
        .filter(|(_, (_, kind))| kind.is_numeric())
        .map(|(c, (name, _))| {
            let values = view.rows(dataset).filter_map(|(_, row)| row[c].as_f64()).collect();
            ColumnSummary::from_values(name, values)
        })
        .collect()
}
