//! Markdown rendering: one table per sheet.

use std::fmt::Write;

use bf_common::{Cell, Sheet, Workbook};

use crate::pipeline::RuleMatch;

/// Render every sheet as a `##` heading followed by a pipe table.
pub fn workbook_markdown(workbook: &Workbook) -> String {
    let mut out = String::new();
    for (i, sheet) in workbook.sheets.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&sheet_markdown(sheet));
    }
    out
}

pub fn sheet_markdown(sheet: &Sheet) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "## {}", escape(&sheet.name));
    out.push('\n');

    if sheet.columns.is_empty() {
        out.push_str("_empty sheet_\n");
        return out;
    }

    let header: Vec<String> = sheet.columns.iter().map(|c| escape(c)).collect();
    let _ = writeln!(out, "| {} |", header.join(" | "));
    let _ = writeln!(out, "|{}", "---|".repeat(sheet.columns.len()));
    for row in 0..sheet.row_count() {
        let cells: Vec<String> = (0..sheet.columns.len())
            .map(|col| cell_text(sheet.cell(row, col)))
            .collect();
        let _ = writeln!(out, "| {} |", cells.join(" | "));
    }
    out
}

/// Explanation of one classified triple.
pub fn rule_match_markdown(m: &RuleMatch) -> String {
    let mut out = String::new();
    out.push_str("# BF-type classification\n\n");
    out.push_str("| origin (h) | current (c) | aspiration (s) | label | rule | condition |\n");
    out.push_str("|---|---|---|---|---|---|\n");
    let _ = writeln!(
        out,
        "| {} | {} | {} | {} | {} | {} |",
        m.triple.origin,
        m.triple.current,
        m.triple.aspiration,
        m.label,
        m.rule,
        escape(m.condition)
    );
    out
}

fn cell_text(cell: &Cell) -> String {
    match cell {
        Cell::Empty => String::new(),
        Cell::Number(v) => format_number(*v),
        Cell::Text(s) => escape(s),
    }
}

/// Up to six decimals, trailing zeros trimmed.
fn format_number(v: f64) -> String {
    let s = format!("{:.6}", v);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

fn escape(s: &str) -> String {
    s.replace('|', "\\|").replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_table() {
        let mut sheet = Sheet::new("types", vec!["class".into(), "X".into()]);
        sheet.push_row(vec![Cell::from("A"), Cell::from("d1->")]);
        sheet.push_row(vec![Cell::from("B|C"), Cell::Number(0.5)]);
        let md = sheet_markdown(&sheet);
        assert_eq!(
            md,
            "## types\n\n| class | X |\n|---|---|\n| A | d1-> |\n| B\\|C | 0.5 |\n"
        );
    }

    #[test]
    fn number_formatting() {
        assert_eq!(format_number(2.0), "2");
        assert_eq!(format_number(0.6), "0.6");
        assert_eq!(format_number(1.0 / 3.0), "0.333333");
        assert_eq!(format_number(-0.0000001), "0");
    }

    #[test]
    fn short_rows_render_blank() {
        let mut sheet = Sheet::new("s", vec!["a".into(), "b".into()]);
        sheet.push_row(vec![Cell::from("x")]);
        assert!(sheet_markdown(&sheet).ends_with("| x |  |\n"));
    }

    #[test]
    fn sheets_separated() {
        let mut wb = Workbook::new();
        wb.push_sheet(Sheet::new("one", vec!["a".into()]));
        wb.push_sheet(Sheet::new("two", vec!["b".into()]));
        let md = workbook_markdown(&wb);
        assert!(md.contains("## one"));
        assert!(md.contains("\n\n## two"));
    }
}
