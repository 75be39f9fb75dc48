use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crossfilter_explorer::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");

    let Some(snapshot) = state.snapshot() else {
        ui.separator();
        if state.loading() {
            ui.spinner();
        } else {
            ui.label("No dataset loaded.");
        }
        return;
    };

    let applied = state.store.staged_selection().map_or(0, |s| s.selected_count());
    ui.label(format!("{applied} filters applied"));
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for column in snapshot.columns() {
                let key = column.key.as_str();
                let label = column.label();
                let total = snapshot.options(key).len();
                let selected = state
                    .store
                    .staged_selection()
                    .and_then(|s| s.get(key))
                    .map_or(0, |values| values.len());

                let header_text = if selected == 0 {
                    format!("Filter by {label}...")
                } else {
                    format!("{label}  ({selected} of {total} selected)")
                };

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(key)
                    .default_open(false)
                    .show(ui, |ui: &mut Ui| {
                        column_filter(ui, state, key, selected);
                    });
            }
        });
}

/// Search box, bulk buttons and checkboxes for one column.
fn column_filter(ui: &mut Ui, state: &mut AppState, key: &str, selected: usize) {
    ui.add(egui::TextEdit::singleline(state.search_text_mut(key)).hint_text("Search options..."));

    let options = state.visible_options(key);

    ui.horizontal(|ui: &mut Ui| {
        if ui
            .add_enabled(
                !options.is_empty(),
                egui::Button::new(format!("Select All ({})", options.len())).small(),
            )
            .clicked()
        {
            state.select_all_matching(key);
        }
        if ui
            .add_enabled(selected > 0, egui::Button::new("Clear All").small())
            .clicked()
        {
            state.clear_column(key);
        }
    });

    if options.is_empty() {
        ui.label(RichText::new("No options available").italics());
        return;
    }

    ScrollArea::vertical()
        .id_salt(key)
        .max_height(240.0)
        .show(ui, |ui: &mut Ui| {
            for option in &options {
                let mut checked = option.is_selected;
                if ui.checkbox(&mut checked, option.label.as_str()).changed() {
                    state.toggle_value(key, &option.value);
                }
            }
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

        let datasets = state.config.datasets.clone();
        for entry in &datasets {
            let checked = state.selected_dataset.as_deref() == Some(entry.name.as_str());
            if ui.radio(checked, entry.label.as_str()).clicked() && !checked {
                state.request_dataset(&entry.name);
            }
        }

        ui.separator();

        if state.loading() {
            ui.spinner();
            ui.label("Loading dataset...");
        } else if state.store.is_ready() {
            let metrics = state.metrics();
            ui.label(format!(
                "Total Rows: {}   Filtered Rows: {}   Active Filters: {}   Data Shown: {}%",
                metrics.total_rows,
                metrics.filtered_rows,
                metrics.active_filters,
                metrics.filter_percentage
            ));

            ui.separator();

            if ui
                .add_enabled(metrics.active_filters > 0, egui::Button::new("Clear All Filters"))
                .clicked()
            {
                state.clear_all();
            }
        }

        if let Some(msg) = state.status_message.clone() {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
            if state.selected_dataset.is_some() && ui.small_button("Retry").clicked() {
                state.retry();
            }
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open CSV data")
        .add_filter("CSV", &["csv"])
        .add_filter("All files", &["*"])
        .pick_file();

    if let Some(path) = file {
        log::info!("Opening {}", path.display());
        state.open_path(&path);
    }
}
