use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::model::TEAM;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Dashboard settings");
    ui.label("Choose which teams and seasons are shown.");
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            team_filter(ui, state);
            ui.separator();
            year_filter(ui, state);
            ui.separator();
            about(ui);
        });
}

fn team_filter(ui: &mut Ui, state: &mut AppState) {
    if !state.dataset.features.team_filter {
        ui.colored_label(
            Color32::RED,
            format!("Column '{TEAM}' was not found in the dataset."),
        );
        return;
    }

    // Clone what we need so we can mutate state inside the loop.
    let teams = state.dataset.teams.clone();
    let n_selected = state.criteria.selected_teams.len();
    let header_text = format!("Teams  ({n_selected}/{})", teams.len());

    let mut toggled: Option<String> = None;
    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt("team_filter")
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    state.select_all();
                }
                if ui.small_button("None").clicked() {
                    state.select_none();
                }
            });

            for team in &teams {
                let mut checked = state.criteria.selected_teams.contains(team);
                let text = RichText::new(team).color(state.palette.color_for(team));
                if ui.checkbox(&mut checked, text).changed() {
                    toggled = Some(team.clone());
                }
            }
        });

    if let Some(team) = toggled {
        state.toggle_team(&team);
    }
}

fn year_filter(ui: &mut Ui, state: &mut AppState) {
    let Some((min_year, max_year)) = state.dataset.year_bounds else {
        return;
    };
    if !state.dataset.features.year_filter {
        return;
    }

    ui.strong("Seasons");
    let (mut lo, mut hi) = state.criteria.year_interval.unwrap_or((min_year, max_year));
    let from = ui.add(egui::Slider::new(&mut lo, min_year..=max_year).text("from"));
    let to = ui.add(egui::Slider::new(&mut hi, min_year..=max_year).text("to"));

    // Keep the pair ordered: the handle being dragged pushes the other one.
    if from.changed() && lo > hi {
        hi = lo;
    }
    if to.changed() && hi < lo {
        lo = hi;
    }
    if from.changed() || to.changed() {
        state.set_years(lo, hi);
    }
}

fn about(ui: &mut Ui) {
    egui::CollapsingHeader::new("About")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            ui.label("Team statistics dashboard.");
            ui.label("Every chart reflects the filters above.");
            ui.label("Charts whose columns are missing from the file are skipped.");
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        ui.label(format!(
            "{}: {} rows loaded, {} visible",
            state.path.display(),
            state.dataset.len(),
            state.report.view.len()
        ));

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open team statistics")
        .add_filter(
            "Supported files",
            &["csv", "tsv", "tab", "txt", "json", "parquet", "pq"],
        )
        .add_filter("Delimited text", &["csv", "tsv", "tab", "txt"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.switch_dataset(&path);
    }
}
