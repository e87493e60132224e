use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::snapshot::write_snapshot;
use crate::state::{AppState, FilterColumn, Tab};

// ---------------------------------------------------------------------------
// Left side panel – header and filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("📊 Sales Dashboard");

    // ---- Optional image (centered) ----
    if let Some(path) = state.config.sidebar_image.as_ref().filter(|p| p.exists()) {
        let uri = format!("file://{}", path.display());
        ui.vertical_centered(|ui: &mut Ui| {
            ui.add(
                egui::Image::new(uri)
                    .max_width(150.0)
                    .max_height(150.0)
                    .corner_radius(4.0),
            );
        });
    }
    ui.add_space(4.0);
    ui.label(&state.config.sidebar_description);
    ui.add_space(8.0);

    ui.strong("Filters");
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            year_range(ui, state);
            ui.separator();
            multi_select(ui, state, FilterColumn::Region);
            multi_select(ui, state, FilterColumn::Category);
        });
}

fn year_range(ui: &mut Ui, state: &mut AppState) {
    let (min, max) = state.config.year_bounds();
    let (mut from, mut to) = state.filters.year_range;

    ui.label("Select Year Range");
    if ui
        .add(egui::Slider::new(&mut from, min..=max).text("from"))
        .changed()
    {
        state.set_year_from(from);
    }
    if ui
        .add(egui::Slider::new(&mut to, min..=max).text("to"))
        .changed()
    {
        state.set_year_to(to);
    }
}

/// Collapsible checkbox list over every observed value, all selected by default.
fn multi_select(ui: &mut Ui, state: &mut AppState, column: FilterColumn) {
    // Clone what we need so we can mutate state inside the loop.
    let all_values = state.domain(column).clone();
    let n_selected = state.selected(column).len();
    let header_text = format!("{}  ({n_selected}/{})", column.label(), all_values.len());

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt(column.label())
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    state.select_all(column);
                }
                if ui.small_button("None").clicked() {
                    state.select_none(column);
                }
            });

            for value in &all_values {
                let mut checked = state.selected(column).contains(value);
                let mut text = RichText::new(&**value);
                if column == FilterColumn::Region {
                    text = text.color(state.region_colors.color_for(value));
                }
                if ui.checkbox(&mut checked, text).changed() {
                    state.toggle_filter_value(column, value);
                }
            }
        });
}

// ---------------------------------------------------------------------------
// KPI strip and tab bar
// ---------------------------------------------------------------------------

/// Four metrics side by side.
pub fn kpi_strip(ui: &mut Ui, state: &AppState) {
    let kpis = &state.dashboard.kpis;
    let metrics = [
        ("Total Sales", kpis.total_sales_label()),
        ("Total Orders", kpis.total_orders_label()),
        ("Avg Profit Margin", kpis.profit_margin_label()),
        ("Avg Delivery Time", kpis.delivery_label()),
    ];

    ui.columns(metrics.len(), |cols: &mut [Ui]| {
        for (col, (label, value)) in cols.iter_mut().zip(metrics) {
            col.label(RichText::new(label).weak());
            col.label(RichText::new(value).size(26.0).strong());
        }
    });
}

pub fn tab_bar(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        for tab in Tab::ALL {
            ui.selectable_value(&mut state.active_tab, tab, RichText::new(tab.title()).size(16.0));
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
            if ui.button("Open sources…").clicked() {
                open_sources_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reload").clicked() {
                let sources = state.config.sources.clone();
                state.reload_sources(sources);
                ui.close_menu();
            }
            if ui.button("Export filtered view…").clicked() {
                export_view_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        ui.label(format!(
            "{} rows cleaned from {} loaded, {} visible",
            state.table.len(),
            state.report.rows_loaded,
            state.dashboard.rows
        ));

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_sources_dialog(state: &mut AppState) {
    let files = rfd::FileDialog::new()
        .set_title("Open sales sources (one per year)")
        .add_filter("Supported files", &["xlsx", "xlsm", "xlsb", "xls", "ods", "csv", "parquet", "pq"])
        .add_filter("Spreadsheets", &["xlsx", "xlsm", "xlsb", "xls", "ods"])
        .add_filter("CSV", &["csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_files();

    if let Some(mut paths) = files {
        // Year-named files load in year order.
        paths.sort();
        state.reload_sources(paths);
    }
}

pub fn export_view_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export filtered view")
        .set_file_name("filtered_sales.xlsx")
        .add_filter("Excel", &["xlsx"])
        .add_filter("CSV", &["csv"])
        .add_filter("Parquet", &["parquet"])
        .save_file();

    if let Some(path) = file {
        let result = write_snapshot(&path, &state.table.schema, state.view().records());
        match result {
            Ok(n) => {
                log::info!("Exported {n} rows to {}", path.display());
                state.status_message = None;
            }
            Err(e) => {
                log::error!("Failed to export view: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
