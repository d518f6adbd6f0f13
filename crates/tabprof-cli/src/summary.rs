use anyhow::Result;
use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use tabprof_cli::pipeline::ProfileOutcome;
use tabprof_model::DataType;

pub fn print_summary(outcome: &ProfileOutcome) {
    let report = &outcome.report;
    println!("Lake: {}", outcome.lake_db.display());
    println!("Raw table: {}", outcome.raw_table);
    if let Some(name) = &outcome.inferred_table {
        println!("Inferred table: {name}");
    }
    println!(
        "Rows: {} (sampled {}, {:.1}%)",
        report.row_count,
        report.sample_size,
        report.coverage() * 100.0
    );

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Column"),
        header_cell("Raw"),
        header_cell("Inferred"),
        header_cell("Nullable"),
    ]);
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    align_column(&mut table, 3, CellAlignment::Center);
    for column in &report.columns {
        let label = if column.source_name == column.name {
            column.name.clone()
        } else {
            format!("{} ({})", column.name, column.source_name)
        };
        table.add_row(vec![
            Cell::new(label),
            dim_cell(column.raw_type),
            type_cell(column.inferred_type),
            if column.is_nullable {
                dim_cell("yes")
            } else {
                Cell::new("no")
            },
        ]);
    }
    println!("{table}");
}

pub fn print_json(outcome: &ProfileOutcome) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(outcome)?);
    Ok(())
}

fn type_cell(data_type: DataType) -> Cell {
    let color = match data_type {
        DataType::Text => return dim_cell(data_type),
        DataType::Integer | DataType::Float => Color::Green,
        DataType::Boolean => Color::Magenta,
        DataType::Date | DataType::Time | DataType::DateTime => Color::Blue,
    };
    Cell::new(data_type).fg(color).add_attribute(Attribute::Bold)
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value.to_string()).add_attribute(Attribute::Dim)
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}
