use analytics::Metric;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};
use core_types::Frequency;
use pipeline::{MetricCell, ResultStore};

const BAR_WIDTH: usize = 30;

/// Formats a metric value, or "n/a" when it is undefined. Never renders an undefined value as zero.
pub fn format_value(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.4}"),
        None => "n/a".to_string(),
    }
}

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// One row per symbol with every metric at `frequency`.
pub fn metrics_table(store: &ResultStore, frequency: Frequency) -> Table {
    let mut table = new_table();

    let mut header = vec![Cell::new("Symbol")];
    header.extend(Metric::ALL.iter().map(|m| Cell::new(m.label())));
    header.push(Cell::new("Periods"));
    table.set_header(header);

    for (key, outcome) in store.iter().filter(|(key, _)| key.frequency == frequency) {
        let mut row = vec![Cell::new(&key.symbol)];
        match outcome {
            Ok(result) => {
                row.extend(Metric::ALL.iter().map(|&metric| {
                    Cell::new(format_value(result.get(metric))).set_alignment(CellAlignment::Right)
                }));
                row.push(Cell::new(result.observations()).set_alignment(CellAlignment::Right));
            }
            Err(_) => {
                row.extend(Metric::ALL.iter().map(|_| Cell::new("failed")));
                row.push(Cell::new("-"));
            }
        }
        table.add_row(row);
    }

    table
}

/// Compares one metric across symbols, with a bar proportional to its magnitude.
pub fn comparison_table(store: &ResultStore, frequency: Frequency, metric: Metric) -> Table {
    let cells = store.metric_by_symbol(frequency, metric);
    let largest = cells
        .iter()
        .filter_map(|(_, cell)| cell.value())
        .fold(0.0_f64, |acc, v| acc.max(v.abs()));

    let mut table = new_table();
    table.set_header(vec!["Symbol", metric.label(), ""]);

    for (symbol, cell) in cells {
        let (value, bar) = match cell {
            MetricCell::Value(v) => (format_value(Some(v)), bar(v, largest)),
            MetricCell::NotApplicable => (format_value(None), String::new()),
            MetricCell::Failed(e) => ("failed".to_string(), e.to_string()),
        };
        table.add_row(vec![
            Cell::new(symbol),
            Cell::new(value).set_alignment(CellAlignment::Right),
            Cell::new(bar),
        ]);
    }

    table
}

/// Lines describing every failed pair at `frequency`.
pub fn failure_lines(store: &ResultStore, frequency: Frequency) -> Vec<String> {
    store
        .failures()
        .filter(|(key, _)| key.frequency == frequency)
        .map(|(key, e)| format!("ERROR {} ({}): {}", key.symbol, key.frequency, e))
        .collect()
}

fn bar(value: f64, largest: f64) -> String {
    if largest <= 0.0 {
        return String::new();
    }
    let len = ((value.abs() / largest) * BAR_WIDTH as f64).round() as usize;
    "█".repeat(len.min(BAR_WIDTH))
}
