use eframe::egui::{self, Align, Layout, Ui};
use egui_extras::{Column, TableBuilder};

use crossfilter_explorer::pagination::{page_links, page_slice, PageInfo, PageLink};
use crossfilter_explorer::state::AppState;

const ROW_HEIGHT: f32 = 20.0;
const HEADER_HEIGHT: f32 = 24.0;

// ---------------------------------------------------------------------------
// Data table (central panel)
// ---------------------------------------------------------------------------

/// Render the current page of filtered rows with its pagination bar.
pub fn data_table(ui: &mut Ui, state: &mut AppState) {
    let Some(snapshot) = state.snapshot() else {
        ui.centered_and_justified(|ui: &mut Ui| {
            if state.loading() {
                ui.spinner();
            } else {
                ui.heading("Open a file to explore it  (File → Open…)");
            }
        });
        return;
    };

    if snapshot.filtered_len() == 0 {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("No data available");
        });
        return;
    }

    let info = state.page_info();
    pagination_bar(ui, state, &info, snapshot.filtered_len());
    ui.separator();

    let indices = page_slice(snapshot.view().filtered_indices(), &info);
    let columns = snapshot.columns();
    let rows = &snapshot.dataset().rows;

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .cell_layout(Layout::left_to_right(Align::Center))
        .columns(Column::auto().at_least(60.0).clip(true), columns.len())
        .header(HEADER_HEIGHT, |mut header| {
            for column in columns {
                header.col(|ui: &mut Ui| {
                    ui.strong(column.label());
                });
            }
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, indices.len(), |mut row| {
                let data = &rows[indices[row.index()]];
                for column in columns {
                    let text = data.get(&column.key).map(|v| v.to_string()).unwrap_or_default();
                    row.col(|ui: &mut Ui| {
                        if column.is_numeric() {
                            ui.with_layout(Layout::right_to_left(Align::Center), |ui: &mut Ui| {
                                ui.label(text);
                            });
                        } else {
                            ui.label(text);
                        }
                    });
                }
            });
        });
}

fn pagination_bar(ui: &mut Ui, state: &mut AppState, info: &PageInfo, total: usize) {
    ui.horizontal(|ui: &mut Ui| {
        ui.label(format!(
            "Showing {}–{} of {}",
            info.start_index + 1,
            info.end_index,
            total
        ));

        ui.separator();

        if ui
            .add_enabled(info.has_prev_page, egui::Button::new("‹ Prev"))
            .clicked()
        {
            state.set_page(state.current_page - 1);
        }

        for link in page_links(state.current_page, info.total_pages) {
            match link {
                PageLink::Page(page) => {
                    if ui
                        .selectable_label(page == state.current_page, page.to_string())
                        .clicked()
                    {
                        state.set_page(page);
                    }
                }
                PageLink::Gap => {
                    ui.label("…");
                }
            }
        }

        if ui
            .add_enabled(info.has_next_page, egui::Button::new("Next ›"))
            .clicked()
        {
            state.set_page(state.current_page + 1);
        }
    });
}
