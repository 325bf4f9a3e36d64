use eframe::egui::{self, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::filter::FilteredView;
use crate::data::model::Dataset;
use crate::data::stats::ColumnSummary;

const ROW_HEIGHT: f32 = 18.0;
const MAX_TABLE_HEIGHT: f32 = 360.0;

/// Collapsible table of the visible rows, all columns.
pub fn raw_rows(ui: &mut Ui, dataset: &Dataset, view: &FilteredView) {
    egui::CollapsingHeader::new(format!("Raw data ({} rows)", view.len()))
        .id_salt("raw_rows")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            ScrollArea::horizontal().id_salt("raw_rows_scroll").show(ui, |ui: &mut Ui| {
                TableBuilder::new(ui)
                    .striped(true)
                    .resizable(true)
                    .max_scroll_height(MAX_TABLE_HEIGHT)
                    .columns(Column::auto().at_least(48.0), dataset.column_names.len())
                    .header(ROW_HEIGHT + 2.0, |mut header| {
                        for name in &dataset.column_names {
                            header.col(|ui: &mut Ui| {
                                ui.strong(name);
                            });
                        }
                    })
                    .body(|body| {
                        body.rows(ROW_HEIGHT, view.len(), |mut row| {
                            let cells = &dataset.rows[view.indices[row.index()]];
                            for cell in cells {
                                row.col(|ui: &mut Ui| {
                                    ui.label(cell.to_string());
                                });
                            }
                        });
                    });
            });
        });
}

/// Collapsible descriptive statistics: one column per numeric dataset column.
pub fn summary(ui: &mut Ui, summary: &[ColumnSummary]) {
    egui::CollapsingHeader::new("Descriptive statistics")
        .id_salt("summary")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            if summary.is_empty() {
                ui.label("No numeric columns.");
                return;
            }
            ScrollArea::horizontal().id_salt("summary_scroll").show(ui, |ui: &mut Ui| {
                TableBuilder::new(ui)
                    .striped(true)
                    .column(Column::auto().at_least(48.0))
                    .columns(Column::auto().at_least(72.0), summary.len())
                    .header(ROW_HEIGHT + 2.0, |mut header| {
                        header.col(|_ui: &mut Ui| {});
                        for s in summary {
                            header.col(|ui: &mut Ui| {
                                ui.strong(&s.column);
                            });
                        }
                    })
                    .body(|body| {
                        body.rows(ROW_HEIGHT, ColumnSummary::LABELS.len(), |mut row| {
                            let stat = row.index();
                            row.col(|ui: &mut Ui| {
                                ui.strong(ColumnSummary::LABELS[stat]);
                            });
                            for s in summary {
                                row.col(|ui: &mut Ui| {
                                    ui.label(format_stat(stat, s.values()[stat]));
                                });
                            }
                        });
                    });
            });
        });
}

fn format_stat(stat: usize, value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if stat == 0 {
        format!("{value:.0}")
    } else {
        format!("{value:.3}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stat_formatting() {
        assert_eq!(format_stat(0, 12.0), "12");
        assert_eq!(format_stat(1, 2.5), "2.500");
        assert_eq!(format_stat(2, f64::NAN), "NaN");
    }
}
