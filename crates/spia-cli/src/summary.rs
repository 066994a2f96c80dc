use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ColumnConstraint, ContentArrangement, Table, Width,
};

use spia_ingest::DistributionLayout;
use spia_model::ParseSummary;
use spia_report::ArtifactAudit;

use crate::types::TransformResult;

pub fn print_summary(result: &TransformResult) {
    println!("Target: FHIR {}", result.target);
    println!("Distribution SHA-256: {}", result.sha256);
    println!("Bundle: {}", result.outputs.bundle.display());
    if let Some(path) = &result.audit {
        println!("Audit report: {}", path.display());
    }
    println!("{}", refset_table(result));
    println!("{}", artifact_table(&result.artifacts));
}

/// Row accounting per reference set, with a total row.
pub fn refset_table(result: &TransformResult) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Reference set"),
        header_cell("Description"),
        header_cell("Rows"),
        header_cell("Entries"),
        header_cell("Blank"),
        header_cell("Invalid"),
        header_cell("Inactive"),
        header_cell("Excluded"),
        header_cell("Warnings"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 2..9 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for summary in &result.refsets {
        table.add_row(summary_row(summary));
    }
    let totals =
        |field: fn(&ParseSummary) -> usize| result.refsets.iter().map(field).sum::<usize>();
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new("All reference sets")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(totals(|s| s.rows_read)).add_attribute(Attribute::Bold),
        Cell::new(result.total_entries()).add_attribute(Attribute::Bold),
        count_cell(totals(|s| s.skipped_blank), Color::DarkGrey).add_attribute(Attribute::Bold),
        count_cell(totals(|s| s.skipped_invalid), Color::Red).add_attribute(Attribute::Bold),
        count_cell(totals(|s| s.skipped_inactive), Color::Red).add_attribute(Attribute::Bold),
        count_cell(totals(|s| s.skipped_excluded), Color::DarkGrey)
            .add_attribute(Attribute::Bold),
        count_cell(totals(|s| s.warnings), Color::Yellow).add_attribute(Attribute::Bold),
    ]);
    table
}

fn summary_row(summary: &ParseSummary) -> Vec<Cell> {
    vec![
        Cell::new(summary.domain.key())
            .fg(Color::Blue)
            .add_attribute(Attribute::Bold),
        Cell::new(summary.domain.description()),
        Cell::new(summary.rows_read),
        Cell::new(summary.entries),
        count_cell(summary.skipped_blank, Color::DarkGrey),
        count_cell(summary.skipped_invalid, Color::Red),
        count_cell(summary.skipped_inactive, Color::Red),
        count_cell(summary.skipped_excluded, Color::DarkGrey),
        count_cell(summary.warnings, Color::Yellow),
    ]
}

/// Generated resources in output order.
pub fn artifact_table(artifacts: &[ArtifactAudit]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Resource"),
        header_cell("Id"),
        header_cell("Items"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    for artifact in artifacts {
        table.add_row(vec![
            Cell::new(&artifact.resource_type),
            Cell::new(&artifact.id),
            Cell::new(artifact.items),
        ]);
    }
    table
}

/// Reference sets of a distribution layout with their archive entries.
pub fn domains_table(layout: &DistributionLayout) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Key"),
        header_cell("Description"),
        header_cell("Codes"),
        header_cell("Archive entry"),
    ]);
    apply_table_style(&mut table);
    for domain in layout.domains() {
        table.add_row(vec![
            Cell::new(domain.key())
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(domain.description()),
            Cell::new(domain.code_system()),
            layout
                .file_name(domain)
                .map_or_else(|| dim_cell("-"), Cell::new),
        ]);
    }
    table
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(140);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(150);
    if table.column_count() >= 9 {
        let mut constraints = vec![
            ColumnConstraint::UpperBoundary(Width::Fixed(22)),
            ColumnConstraint::UpperBoundary(Width::Percentage(35)),
        ];
        constraints.extend((0..7).map(|_| ColumnConstraint::LowerBoundary(Width::Fixed(6))));
        table.set_constraints(constraints);
    }
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count == 0 {
        dim_cell(count)
    } else {
        Cell::new(count).fg(color)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
