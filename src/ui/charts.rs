use eframe::egui::{Color32, RichText, Ui};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoint, PlotPoints, Points, Text};

use crate::color::{
    TeamPalette, LOSSES_COLOR, RUNS_ALLOWED_COLOR, RUNS_SCORED_COLOR, WINS_COLOR,
};
use crate::data::pipeline::{Metric, Metrics, SeasonRuns, TeamRecord};
use crate::data::schema::Feature;
use crate::state::AppState;

const CHART_HEIGHT: f32 = 280.0;

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render the whole dashboard body: metrics, charts, then tables.
pub fn dashboard(ui: &mut Ui, state: &AppState) {
    ui.heading("Baseball team dashboard");
    ui.label("Explore team results season by season. Use the sidebar to narrow the view.");
    ui.add_space(8.0);

    ui.strong("Overview");
    metric_row(ui, &state.report.metrics);
    selection_notices(ui, state);
    ui.add_space(8.0);

    let report = &state.report;
    let palette = &state.palette;

    section(
        ui,
        "Rows per team",
        Feature::TeamHistogram,
        report.team_counts.as_deref(),
        |ui, counts| team_bars(ui, "team_histogram", counts, palette, "Rows"),
    );
    section(
        ui,
        "Wins and losses per team",
        Feature::WinsLosses,
        report.wins_losses.as_deref(),
        wins_losses_chart,
    );
    section(
        ui,
        "Runs scored (RS) and allowed (RA) by season",
        Feature::RunsByYear,
        report.runs_by_year.as_deref(),
        runs_chart,
    );
    section(
        ui,
        "Players per team",
        Feature::PlayerCounts,
        report.player_counts.as_deref(),
        |ui, counts| team_bars(ui, "player_counts", counts, palette, "Players"),
    );

    ui.add_space(8.0);
    ui.strong("Data and statistics");
    super::tables::raw_rows(ui, &state.dataset, &report.view);
    super::tables::summary(ui, &report.summary);
}

/// Title plus chart when the data exists, an informational notice otherwise.
fn section<T: ?Sized>(
    ui: &mut Ui,
    title: &str,
    feature: Feature,
    data: Option<&T>,
    draw: impl FnOnce(&mut Ui, &T),
) {
    ui.add_space(4.0);
    ui.label(RichText::new(title).strong().size(16.0));
    match data {
        Some(data) => draw(ui, data),
        None => {
            ui.label(
                RichText::new(missing_columns_notice(feature))
                    .italics()
                    .color(Color32::GRAY),
            );
        }
    }
}

fn missing_columns_notice(feature: Feature) -> String {
    format!("Not shown: needs columns {}.", feature.required_columns().join(", "))
}

// ---------------------------------------------------------------------------
// Metric tiles
// ---------------------------------------------------------------------------

fn metric_row(ui: &mut Ui, metrics: &Metrics) {
    let tiles = [
        ("Total rows", metrics.total_rows.to_string()),
        ("Teams represented", tile_text(&metrics.distinct_teams)),
        ("Period", tile_text(&metrics.year_range)),
        ("Playoff appearances", tile_text(&metrics.playoff_count)),
    ];
    ui.columns(tiles.len(), |cols: &mut [Ui]| {
        for (col, (label, value)) in cols.iter_mut().zip(tiles) {
            col.vertical(|ui: &mut Ui| {
                ui.label(RichText::new(label).color(Color32::GRAY));
                ui.label(RichText::new(value).size(24.0).strong());
            });
        }
    });
}

fn tile_text<T: std::fmt::Display>(metric: &Metric<T>) -> String {
    match metric {
        Metric::Value(v) => v.to_string(),
        Metric::Unavailable => "N/A".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Charts
// ---------------------------------------------------------------------------

/// One coloured bar per team, labelled with its count.
fn team_bars(ui: &mut Ui, id: &str, counts: &[(String, usize)], palette: &TeamPalette, y_label: &str) {
    Plot::new(id)
        .legend(Legend::default())
        .height(CHART_HEIGHT)
        .x_axis_label("Team")
        .y_axis_label(y_label)
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for (i, (team, count)) in counts.iter().enumerate() {
                let x = i as f64;
                let bar = Bar::new(x, *count as f64).name(team).width(0.8);
                plot_ui.bar_chart(
                    BarChart::new(vec![bar])
                        .name(team)
                        .color(palette.color_for(team)),
                );
                plot_ui.text(Text::new(
                    PlotPoint::new(x, *count as f64),
                    RichText::new(count.to_string()).strong(),
                ));
            }
        });
}

/// Wins and losses side by side for every team.
fn wins_losses_chart(ui: &mut Ui, records: &[TeamRecord]) {
    let wins: Vec<Bar> = records
        .iter()
        .enumerate()
        .map(|(i, r)| Bar::new(i as f64 - 0.2, r.wins).name(&r.team).width(0.4))
        .collect();
    let losses: Vec<Bar> = records
        .iter()
        .enumerate()
        .map(|(i, r)| Bar::new(i as f64 + 0.2, r.losses).name(&r.team).width(0.4))
        .collect();

    Plot::new("wins_losses")
        .legend(Legend::default())
        .height(CHART_HEIGHT)
        .x_axis_label("Team")
        .y_axis_label("Games")
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(wins).name("W").color(WINS_COLOR));
            plot_ui.bar_chart(BarChart::new(losses).name("L").color(LOSSES_COLOR));
            for (i, r) in records.iter().enumerate() {
                plot_ui.text(Text::new(
                    PlotPoint::new(i as f64, r.wins.max(r.losses)),
                    RichText::new(&r.team).small(),
                ));
            }
        });
}

/// Mean runs scored and allowed per season, with markers.
fn runs_chart(ui: &mut Ui, seasons: &[SeasonRuns]) {
    let scored: Vec<[f64; 2]> = seasons
        .iter()
        .filter(|s| s.runs_scored.is_finite())
        .map(|s| [s.year as f64, s.runs_scored])
        .collect();
    let allowed: Vec<[f64; 2]> = seasons
        .iter()
        .filter(|s| s.runs_allowed.is_finite())
        .map(|s| [s.year as f64, s.runs_allowed])
        .collect();

    Plot::new("runs_by_year")
        .legend(Legend::default())
        .height(CHART_HEIGHT)
        .x_axis_label("Year")
        .y_axis_label("Runs (season mean)")
        .allow_boxed_zoom(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for (name, points, color) in [
                ("RS", scored, RUNS_SCORED_COLOR),
                ("RA", allowed, RUNS_ALLOWED_COLOR),
            ] {
                plot_ui.line(
                    Line::new(PlotPoints::from(points.clone()))
                        .name(name)
                        .color(color)
                        .width(1.5),
                );
                plot_ui.points(Points::new(PlotPoints::from(points)).radius(3.0).color(color));
            }
        });
}

/// Notices about the current selection, shown above the charts.
fn selection_notices(ui: &mut Ui, state: &AppState) {
    if state.report.team_column_missing() {
        ui.label(RichText::new("Team column missing: team filter not applied.").color(Color32::RED));
    }
    if state.report.view.is_empty() {
        ui.label(
            RichText::new("No rows match the current filters.")
                .color(Color32::from_rgb(200, 140, 0)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notice_names_required_columns() {
        assert_eq!(
            missing_columns_notice(Feature::WinsLosses),
            "Not shown: needs columns W, L, Team."
        );
        assert_eq!(
            missing_columns_notice(Feature::PlayerCounts),
            "Not shown: needs columns Player, Team."
        );
    }

    #[test]
    fn unavailable_tiles_read_na() {
        assert_eq!(tile_text(&Metric::Value(3usize)), "3");
        assert_eq!(tile_text::<usize>(&Metric::Unavailable), "N/A");
    }
}
