//! End-to-end pipeline scenarios over in-memory workbooks.

use bf_common::{BfType, Cell, Error, Phase, Sheet, Workbook};
use bf_core::config::{PresetName, WorkbookLayout};
use bf_core::process_workbook;

/// Build a workbook with the default layout's sheet names.
///
/// `classification` is (identifier, class); `mixture` rows are
/// (identifier, values) under `components`.
fn workbook(
    classification: &[(&str, Option<&str>)],
    components: &[&str],
    mixture: &[(&str, Vec<Cell>)],
) -> Workbook {
    let mut cls = Sheet::new(
        "classification",
        vec!["TrendFactor".to_string(), "class".to_string()],
    );
    for (id, class) in classification {
        cls.push_row(vec![Cell::from(*id), class.map(Cell::from).unwrap_or(Cell::Empty)]);
    }

    let mut columns = vec!["TrendFactor".to_string()];
    columns.extend(components.iter().map(|c| c.to_string()));
    let mut mix = Sheet::new("mixture", columns);
    for (id, values) in mixture {
        let mut row = vec![Cell::from(*id)];
        row.extend(values.iter().cloned());
        mix.push_row(row);
    }

    let mut wb = Workbook::new();
    wb.push_sheet(cls);
    wb.push_sheet(mix);
    wb
}

/// One class per scenario. Every phase row has a BF total of 5 (a second
/// component Z pads the norm), so normalized X is X / 5.
fn scenario_workbook(scenarios: &[(&str, [f64; 3])]) -> Workbook {
    let mut classification = Vec::new();
    let mut mixture = Vec::new();
    for (class, xs) in scenarios {
        for (phase, x) in Phase::all().iter().zip(xs) {
            let id = format!("{}-{}", phase.name(), class);
            let z = (25.0 - x * x).sqrt();
            classification.push((id.clone(), class.to_string()));
            mixture.push((id, vec![Cell::Number(*x), Cell::Number(z)]));
        }
    }
    let classification: Vec<(&str, Option<&str>)> = classification
        .iter()
        .map(|(id, c)| (id.as_str(), Some(c.as_str())))
        .collect();
    let mixture: Vec<(&str, Vec<Cell>)> = mixture
        .iter()
        .map(|(id, v)| (id.as_str(), v.clone()))
        .collect();
    workbook(&classification, &["X", "Z"], &mixture)
}

#[test]
fn documented_label_scenarios() {
    let wb = scenario_workbook(&[
        ("A0", [0.0, 0.0, 0.0]),
        ("A1", [5.0, 0.0, 0.0]),
        ("A2", [0.0, 0.0, 5.0]),
        ("A3", [3.0, 0.0, 3.1]),
        ("A4", [1.0, 0.0, 5.0]),
        ("A5", [0.0, 3.0, 4.0]),
        ("A6", [4.0, 3.0, 0.0]),
    ]);
    let run = process_workbook(&wb, &WorkbookLayout::default()).unwrap();
    let types = &run.output.bf_types;

    let expected = [
        ("A0", BfType::None),
        ("A1", BfType::D0Origin),
        ("A2", BfType::D0Aspiration),
        ("A3", BfType::D1Equal),
        ("A4", BfType::D1Less),
        ("A5", BfType::D2),
        ("A6", BfType::D3),
    ];
    for (class, label) in expected {
        assert_eq!(types.label(class, "X"), Some(label), "class {}", class);
    }
}

#[test]
fn four_output_sheets_in_order() {
    let wb = scenario_workbook(&[("A", [3.0, 4.0, 5.0])]);
    let layout = WorkbookLayout::default();
    let run = process_workbook(&wb, &layout).unwrap();
    assert_eq!(
        run.workbook.sheet_names(),
        vec![
            "classified_mixture",
            "class_phase_totals",
            "class_phase_normalized",
            "class_bf_types"
        ]
    );
    let totals = &run.workbook.sheets[1];
    assert_eq!(totals.columns, vec!["class", "phase", "X", "Z", "BF total"]);
    assert_eq!(totals.rows.len(), 3);
    for row in &totals.rows {
        match &row[4] {
            Cell::Number(total) => assert!((total - 5.0).abs() < 1e-9),
            other => panic!("unexpected BF total cell {:?}", other),
        }
    }
}

#[test]
fn rerun_is_byte_identical() {
    let wb = workbook(
        &[
            ("origin-b", Some("B")),
            ("origin-a", Some("A")),
            ("current-a", Some("A")),
            ("aspiration-a", Some("A")),
            ("misc", Some("A")),
            ("current-b", None),
        ],
        &["X", "Y", "note"],
        &[
            ("origin-a", vec![1.5.into(), 0.25.into(), "x".into()]),
            ("current-a", vec![0.3.into(), 2.0.into(), Cell::Empty]),
            ("aspiration-a", vec![7.0.into(), 1.0.into(), Cell::Empty]),
            ("origin-b", vec![0.0.into(), 0.0.into(), Cell::Empty]),
            ("misc", vec![9.0.into(), 9.0.into(), Cell::Empty]),
        ],
    );
    let layout = WorkbookLayout::default();
    let first = process_workbook(&wb, &layout).unwrap().workbook;
    let second = process_workbook(&wb, &layout).unwrap().workbook;
    assert_eq!(first.to_json_pretty().unwrap(), second.to_json_pretty().unwrap());
    assert_eq!(first.digest().unwrap(), second.digest().unwrap());
}

#[test]
fn non_numeric_column_carried_but_not_aggregated() {
    let wb = workbook(
        &[("origin-1", Some("A"))],
        &["X", "note"],
        &[("origin-1", vec![2.0.into(), "see memo".into()])],
    );
    let run = process_workbook(&wb, &WorkbookLayout::default()).unwrap();

    let classified = &run.workbook.sheets[0];
    assert_eq!(classified.columns, vec!["class", "TrendFactor", "X", "note", "phase"]);
    assert_eq!(classified.rows[0][3], Cell::from("see memo"));

    assert_eq!(run.output.aggregate.components, vec!["X"]);
    assert_eq!(run.workbook.sheets[3].columns, vec!["class", "X"]);
}

#[test]
fn classification_memo_reaches_classified_sheet() {
    let mut wb = workbook(
        &[],
        &["X", "Y"],
        &[("origin-1", vec![3.0.into(), 4.0.into()])],
    );
    let mut cls = Sheet::new(
        "classification",
        vec!["TrendFactor".into(), "class".into(), "memo".into()],
    );
    cls.push_row(vec!["origin-1".into(), "A".into(), "keep me".into()]);
    wb.sheets[0] = cls;

    let run = process_workbook(&wb, &WorkbookLayout::default()).unwrap();
    let classified = &run.workbook.sheets[0];
    assert_eq!(
        classified.columns,
        vec!["class", "TrendFactor", "memo", "X", "Y", "phase"]
    );
    assert_eq!(classified.rows[0][2], Cell::from("keep me"));
    assert_eq!(run.output.aggregate.components, vec!["X", "Y"]);
}

#[test]
fn measurement_column_named_phase_fails_the_run() {
    let wb = workbook(
        &[("origin-1", Some("A"))],
        &["X", "phase"],
        &[("origin-1", vec![1.0.into(), 2.0.into()])],
    );
    let err = process_workbook(&wb, &WorkbookLayout::default()).unwrap_err();
    assert!(matches!(err, Error::MalformedWorkbook(_)), "{:?}", err);
    assert_eq!(err.code(), 13);
}

#[test]
fn identifiers_join_only_on_exact_text() {
    let wb = workbook(
        &[("origin-1 ", Some("A")), ("current-1", Some("A"))],
        &["X"],
        &[("origin-1", vec![4.0.into()]), ("current-1", vec![1.0.into()])],
    );
    let run = process_workbook(&wb, &WorkbookLayout::default()).unwrap();
    assert_eq!(run.output.merge_stats.matched, 1);
    assert_eq!(run.output.merge_stats.unmatched, 1);

    let padded = run
        .output
        .classified
        .rows
        .iter()
        .find(|r| r.trend_factor == "origin-1 ")
        .unwrap();
    assert!(!padded.is_matched());
}

#[test]
fn no_shared_identifiers_still_succeeds() {
    let wb = workbook(
        &[("origin-1", Some("A")), ("current-1", Some("A"))],
        &["X"],
        &[("origin-9", vec![1.0.into()])],
    );
    let run = process_workbook(&wb, &WorkbookLayout::default()).unwrap();
    assert_eq!(run.output.merge_stats.matched, 0);
    assert_eq!(run.output.classified.rows.len(), 2);
    // Groups exist with zero sums, so every component is `none`.
    assert_eq!(run.output.bf_types.label("A", "X"), Some(BfType::None));
    let normalized = &run.workbook.sheets[2];
    for row in &normalized.rows {
        assert_eq!(row[2], Cell::Number(0.0));
    }
}

#[test]
fn null_phase_rows_never_aggregated() {
    let wb = workbook(
        &[("origin-1", Some("A")), ("misc", Some("A"))],
        &["X"],
        &[("origin-1", vec![1.0.into()]), ("misc", vec![100.0.into()])],
    );
    let run = process_workbook(&wb, &WorkbookLayout::default()).unwrap();
    assert_eq!(run.output.aggregate.rows.len(), 1);
    assert_eq!(run.output.aggregate.rows[0].sums, vec![1.0]);
    let classified = &run.workbook.sheets[0];
    let misc = classified
        .rows
        .iter()
        .find(|r| r[1] == Cell::from("misc"))
        .unwrap();
    assert_eq!(misc[3], Cell::Empty);
}

#[test]
fn class_without_aggregate_rows_has_no_bf_types() {
    let wb = workbook(
        &[("origin-1", Some("A")), ("misc", Some("B"))],
        &["X"],
        &[("origin-1", vec![1.0.into()]), ("misc", vec![1.0.into()])],
    );
    let run = process_workbook(&wb, &WorkbookLayout::default()).unwrap();
    let classes: Vec<&str> = run
        .output
        .bf_types
        .rows
        .iter()
        .map(|r| r.class.as_str())
        .collect();
    assert_eq!(classes, vec!["A"]);
}

#[test]
fn structural_errors_fail_the_whole_run() {
    let mut wb = Workbook::new();
    wb.push_sheet(Sheet::new(
        "classification",
        vec!["TrendFactor".into(), "class".into()],
    ));
    let err = process_workbook(&wb, &WorkbookLayout::default()).unwrap_err();
    assert!(matches!(err, Error::MissingSheet { .. }));
    assert_eq!(err.code(), 10);
}

#[test]
fn japanese_workbook() {
    let mut cls = Sheet::new("クラス分け", vec!["TrendFactor".into(), "class".into()]);
    cls.push_row(vec!["本来性_1".into(), "健康".into()]);
    cls.push_row(vec!["志向性_1".into(), "健康".into()]);
    let mut mix = Sheet::new("配合表", vec!["Unnamed: 0".into(), "X".into()]);
    mix.push_row(vec!["本来性_1".into(), 2.0.into()]);
    mix.push_row(vec!["志向性_1".into(), 2.0.into()]);
    let mut wb = Workbook::new();
    wb.push_sheet(cls);
    wb.push_sheet(mix);

    let run = process_workbook(&wb, &PresetName::Ja.layout()).unwrap();
    assert_eq!(
        run.workbook.sheet_names(),
        vec![
            "クラス別配合表",
            "クラス別配合時制別合計表",
            "クラス別時制別正規化配合表",
            "クラス別BFタイプ"
        ]
    );
    let totals = &run.workbook.sheets[1];
    assert_eq!(totals.rows[0][1], Cell::from("本来性"));
    assert_eq!(totals.rows[1][1], Cell::from("志向性"));
    assert_eq!(run.output.bf_types.label("健康", "X"), Some(BfType::D1Equal));
}
