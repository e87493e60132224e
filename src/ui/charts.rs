use std::f32::consts::TAU;

use eframe::egui::{self, Color32, Pos2, RichText, Sense, Shape, Stroke, Ui, Vec2};
use egui_plot::{Bar, BarChart, GridMark, Legend, Line, Plot, PlotPoints, Points};

use crate::color::{self, ColorMap};
use crate::data::metrics::{ChartData, TOP_N};
use crate::data::model::Text;
use crate::state::{AppState, Tab};

const CHART_HEIGHT: f32 = 320.0;
const PIE_DIAMETER: f32 = 260.0;
const LABEL_CHARS: usize = 18;

// ---------------------------------------------------------------------------
// Tabs
// ---------------------------------------------------------------------------

/// Render the three charts of the active tab.
pub fn tab_contents(ui: &mut Ui, state: &AppState) {
    let charts = &state.dashboard.charts;
    if state.view().is_empty() {
        ui.label(RichText::new("No rows match the current filters.").weak());
    }
    match state.active_tab {
        Tab::ProductAnalysis => product_analysis(ui, charts),
        Tab::SalesRevenue => sales_revenue(ui, charts, &state.region_colors),
        Tab::CustomerOrders => customer_orders(ui, charts),
    }
}

fn product_analysis(ui: &mut Ui, charts: &ChartData) {
    chart_title(ui, &format!("Top {TOP_N} Products by Sales"));
    bar_chart(ui, "top_products", &charts.top_products, color::TOP_PRODUCTS, "Sales");

    chart_title(ui, "Sales by Category");
    pie_chart(ui, &charts.sales_by_category, |v| format!("${v:.0}"));

    chart_title(ui, "Profit Margin by Category");
    bar_chart(
        ui,
        "margin_by_category",
        &charts.margin_by_category,
        color::CATEGORY_MARGIN,
        "Profit Margin",
    );
}

fn sales_revenue(ui: &mut Ui, charts: &ChartData, region_colors: &ColorMap) {
    chart_title(ui, "Monthly Sales Trend");
    monthly_line(ui, charts);

    chart_title(ui, "Sales by Region");
    bar_chart(ui, "sales_by_region", &charts.sales_by_region, color::REGION_SALES, "Sales");

    chart_title(ui, "Discount vs Sales");
    discount_scatter(ui, charts, region_colors);
}

fn customer_orders(ui: &mut Ui, charts: &ChartData) {
    chart_title(ui, &format!("Top {TOP_N} Customers by Sales"));
    horizontal_bar_chart(ui, "top_customers", &charts.top_customers, color::TOP_CUSTOMERS);

    chart_title(ui, "Average Shipping Time by Region");
    bar_chart(
        ui,
        "shipping_days_by_region",
        &charts.shipping_days_by_region,
        color::SHIPPING_TIME,
        "Days",
    );

    chart_title(ui, "Order Priority Distribution");
    let slices: Vec<(Text, f64)> = charts
        .orders_by_priority
        .iter()
        .map(|(priority, count)| (priority.clone(), *count as f64))
        .collect();
    pie_chart(ui, &slices, |v| format!("{v:.0} orders"));
}

fn chart_title(ui: &mut Ui, title: &str) {
    ui.add_space(12.0);
    ui.label(RichText::new(title).size(18.0).strong());
}

// ---------------------------------------------------------------------------
// Bar charts
// ---------------------------------------------------------------------------

/// Vertical bars at x = 0, 1, 2…, labelled with the category names.
fn bar_chart(ui: &mut Ui, id: &str, data: &[(Text, f64)], fill: Color32, y_label: &str) {
    let bars: Vec<Bar> = data
        .iter()
        .enumerate()
        .map(|(i, (name, value))| Bar::new(i as f64, *value).name(name).fill(fill))
        .collect();
    let labels = short_labels(data);

    Plot::new(id)
        .height(CHART_HEIGHT)
        .y_axis_label(y_label)
        .x_axis_formatter(move |mark: GridMark, _range| category_label(&labels, mark.value))
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).width(0.6).color(fill));
        });
}

/// Horizontal bars with the largest value on top.
fn horizontal_bar_chart(ui: &mut Ui, id: &str, data: &[(Text, f64)], fill: Color32) {
    let n = data.len();
    let bars: Vec<Bar> = data
        .iter()
        .enumerate()
        .map(|(i, (name, value))| Bar::new((n - 1 - i) as f64, *value).name(name).fill(fill))
        .collect();
    let mut labels = short_labels(data);
    labels.reverse();

    Plot::new(id)
        .height(CHART_HEIGHT)
        .x_axis_label("Sales")
        .y_axis_formatter(move |mark: GridMark, _range| category_label(&labels, mark.value))
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).width(0.6).color(fill).horizontal());
        });
}

fn short_labels(data: &[(Text, f64)]) -> Vec<String> {
    data.iter()
        .map(|(name, _)| {
            if name.chars().count() > LABEL_CHARS {
                let head: String = name.chars().take(LABEL_CHARS - 1).collect();
                format!("{head}…")
            } else {
                name.to_string()
            }
        })
        .collect()
}

/// Axis label for a grid mark: the category name on whole positions only.
fn category_label(labels: &[String], value: f64) -> String {
    let rounded = value.round();
    if rounded < 0.0 || (value - rounded).abs() > 1e-6 {
        return String::new();
    }
    labels.get(rounded as usize).cloned().unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Line and scatter
// ---------------------------------------------------------------------------

fn monthly_line(ui: &mut Ui, charts: &ChartData) {
    let labels: Vec<String> = charts.monthly_sales.iter().map(|(m, _)| m.to_string()).collect();
    let points: Vec<[f64; 2]> = charts
        .monthly_sales
        .iter()
        .enumerate()
        .map(|(i, (_, sales))| [i as f64, *sales])
        .collect();

    Plot::new("monthly_sales")
        .height(CHART_HEIGHT)
        .y_axis_label("Sales")
        .x_axis_formatter(move |mark: GridMark, _range| category_label(&labels, mark.value))
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(PlotPoints::from(points.clone()))
                    .name("Sales")
                    .color(color::MONTHLY_LINE)
                    .width(2.0),
            );
            plot_ui.points(
                Points::new(PlotPoints::from(points))
                    .color(color::MONTHLY_LINE)
                    .radius(2.5),
            );
        });
}

/// One point per row, one legend entry per region.
fn discount_scatter(ui: &mut Ui, charts: &ChartData, region_colors: &ColorMap) {
    Plot::new("discount_vs_sales")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .x_axis_label("Discount")
        .y_axis_label("Sales")
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for (region, points) in &charts.discount_vs_sales {
                plot_ui.points(
                    Points::new(PlotPoints::from(points.clone()))
                        .name(region)
                        .color(region_colors.color_for(region))
                        .radius(3.0),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Pie charts (painted)
// ---------------------------------------------------------------------------

/// Pie with a legend on the right. Hovering a slice shows its value.
fn pie_chart(ui: &mut Ui, slices: &[(Text, f64)], format_value: impl Fn(f64) -> String) {
    let total: f64 = slices.iter().map(|(_, v)| v.max(0.0)).sum();
    if total <= 0.0 {
        ui.label(RichText::new("No data for the current filters.").weak());
        return;
    }
    let n = slices.len();

    ui.horizontal(|ui: &mut Ui| {
        let (response, painter) = ui.allocate_painter(Vec2::splat(PIE_DIAMETER), Sense::hover());
        let center = response.rect.center();
        let radius = PIE_DIAMETER / 2.0 - 4.0;

        // Clockwise from twelve o'clock.
        let origin = -TAU / 4.0;
        let mut start = origin;
        let mut bounds = Vec::with_capacity(n);
        for (i, (_, value)) in slices.iter().enumerate() {
            let sweep = (value.max(0.0) / total) as f32 * TAU;
            paint_slice(&painter, center, radius, start, sweep, color::pastel(i, n));
            bounds.push((start, start + sweep));
            start += sweep;
        }
        if n > 1 {
            for &(a, _) in &bounds {
                painter.line_segment(
                    [center, center + radius * Vec2::angled(a)],
                    Stroke::new(1.5, Color32::WHITE),
                );
            }
        }

        if let Some(pos) = response.hover_pos() {
            let d = pos - center;
            if d.length() <= radius {
                let angle = origin + (d.angle() - origin).rem_euclid(TAU);
                if let Some(i) = bounds.iter().position(|&(a, b)| angle >= a && angle < b) {
                    let (label, value) = &slices[i];
                    let share = value.max(0.0) / total * 100.0;
                    response.on_hover_text(format!("{label}: {} ({share:.1}%)", format_value(*value)));
                }
            }
        }

        ui.vertical(|ui: &mut Ui| {
            for (i, (label, value)) in slices.iter().enumerate() {
                let share = value.max(0.0) / total * 100.0;
                ui.horizontal(|ui: &mut Ui| {
                    let (swatch, _) = ui.allocate_exact_size(Vec2::splat(12.0), Sense::hover());
                    ui.painter().rect_filled(swatch, 2.0, color::pastel(i, n));
                    ui.label(format!("{label}  {share:.1}%"));
                });
            }
        });
    });
}

/// `convex_polygon` needs convex input, so large slices are split into
/// pieces of at most a quarter turn.
fn paint_slice(painter: &egui::Painter, center: Pos2, radius: f32, start: f32, sweep: f32, fill: Color32) {
    if sweep <= 0.0 {
        return;
    }
    let pieces = (sweep / (TAU / 4.0)).ceil().max(1.0) as usize;
    let step = sweep / pieces as f32;
    for p in 0..pieces {
        let a0 = start + step * p as f32;
        let arc_steps = ((step / TAU) * 96.0).ceil().max(2.0) as usize;
        let mut points = Vec::with_capacity(arc_steps + 2);
        points.push(center);
        for k in 0..=arc_steps {
            let a = a0 + step * k as f32 / arc_steps as f32;
            points.push(center + radius * Vec2::angled(a));
        }
        painter.add(Shape::convex_polygon(points, fill, Stroke::NONE));
    }
}
