//! FILENAME: tests/test_pipeline.rs
//! Integration tests for the end-to-end merge, through encoded documents.

mod common;

use common::{bold_yellow, to_bytes, TestHarness};
use engine::cell::CellValue;
use engine::style::{Color, FillStyle};
use injector::{
    merge_bytes, run, run_with_report, InjectError, InjectorConfig, SummaryReport, Templates,
};
use persistence::{load_xlsx_from_bytes, save_xlsx};

const WIDTH_TOLERANCE: f64 = 0.01;

fn config_with_exclusion() -> InjectorConfig {
    InjectorConfig {
        preserve_sheet_names: vec!["2025_ΕΣΟΔΑ".to_string()],
        ..InjectorConfig::default()
    }
}

#[test]
fn test_merge_bytes_end_to_end() {
    let harness = TestHarness::with_user_income_sheet();
    let output = merge_bytes(
        &to_bytes(&harness.target),
        Some(&to_bytes(&harness.monthly)),
        &to_bytes(&harness.summary),
        &config_with_exclusion(),
    )
    .unwrap();

    let merged = load_xlsx_from_bytes(&output).unwrap();
    assert_eq!(
        merged.sheet_names(),
        vec![
            "Data",
            "2025_ΕΣΟΔΑ",
            "2025_Jan",
            "2025_Feb",
            "Γενικό Αποτέλεσμα",
            "Διαφορά"
        ]
    );

    // Monthly sheet: value and style survive encoding.
    let jan = merged.sheet("2025_Jan").unwrap();
    let b2 = jan.get_cell(1, 1).unwrap();
    assert_eq!(b2.value, CellValue::Number(10.0));
    let style = merged.resolve_style(b2);
    assert!(style.font.bold);
    assert_eq!(style.fill.fg_color, bold_yellow().fill.fg_color);
    assert_eq!(jan.row_heights.get(&1), Some(&30.0));
    let width = jan.column_widths.get(&1).copied().unwrap_or_default();
    assert!((width - 18.0).abs() < WIDTH_TOLERANCE, "width was {}", width);

    // Summary sheets: renamed, rewritten, highlighted.
    let primary = merged.sheet("Γενικό Αποτέλεσμα").unwrap();
    assert_eq!(
        primary.get_cell(2, 2).unwrap().formula.as_deref(),
        Some("=SUM(A1:A2)")
    );
    let c36 = primary.get_cell(35, 2).unwrap();
    assert_eq!(
        merged.resolve_style(c36).fill.fg_color,
        FillStyle::solid(Color::new(0x66, 0x99, 0xFF)).fg_color
    );

    let difference = merged.sheet("Διαφορά").unwrap();
    assert_eq!(
        difference.get_cell(3, 3).unwrap().formula.as_deref(),
        Some("='Γενικό Αποτέλεσμα'!C3*2")
    );
}

#[test]
fn test_excluded_sheet_survives_full_pipeline() {
    let harness = TestHarness::with_user_income_sheet();
    let templates = Templates {
        monthly: Some(harness.monthly.clone()),
        summary: harness.summary.clone(),
    };

    let (merged, report) =
        run_with_report(harness.target.clone(), &templates, &config_with_exclusion()).unwrap();

    let monthly = report.monthly.unwrap();
    assert_eq!(monthly.preserved, vec!["2025_ΕΣΟΔΑ".to_string()]);
    assert_eq!(
        merged.sheet("2025_ΕΣΟΔΑ"),
        harness.target.sheet("2025_ΕΣΟΔΑ")
    );
    match report.summary {
        SummaryReport::Adapted(adapted) => {
            assert_eq!(adapted.formulas_rewritten, 2);
            assert!(adapted.highlighted_cells > 0);
        }
        other => panic!("unexpected summary report {:?}", other),
    }
}

#[test]
fn test_without_exclusion_template_wins() {
    let harness = TestHarness::with_user_income_sheet();
    let templates = Templates {
        monthly: Some(harness.monthly.clone()),
        summary: harness.summary.clone(),
    };

    let merged = run(harness.target.clone(), &templates, &InjectorConfig::default()).unwrap();
    assert_eq!(
        merged.sheet("2025_ΕΣΟΔΑ").unwrap().get_cell(0, 0).unwrap().value,
        CellValue::Text("template income".to_string())
    );
}

#[test]
fn test_malformed_target_fails_before_anything_else() {
    let harness = TestHarness::new();
    let err = merge_bytes(
        b"PK\x03\x04 truncated",
        Some(&to_bytes(&harness.monthly)),
        &to_bytes(&harness.summary),
        &InjectorConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, InjectError::MalformedDocument(_)));
}

#[test]
fn test_malformed_template_is_reported() {
    let harness = TestHarness::new();
    let err = merge_bytes(
        &to_bytes(&harness.target),
        None,
        b"not a workbook",
        &InjectorConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, InjectError::MalformedDocument(_)));
}

#[test]
fn test_missing_summary_sheet_fails_the_run() {
    let mut harness = TestHarness::new();
    harness.summary.remove_sheet("v1");
    let templates = Templates {
        monthly: Some(harness.monthly.clone()),
        summary: harness.summary.clone(),
    };

    let err = run(harness.target.clone(), &templates, &InjectorConfig::default()).unwrap_err();
    assert!(matches!(err, InjectError::MissingSheet(ref name) if name == "v1"));
}

#[test]
fn test_templates_loaded_from_config_paths() {
    let harness = TestHarness::new();
    let dir = tempfile::tempdir().unwrap();
    save_xlsx(&harness.monthly, &dir.path().join("monthly.xlsx")).unwrap();
    save_xlsx(&harness.summary, &dir.path().join("summary.xlsx")).unwrap();

    let config_path = dir.path().join("merge.json");
    std::fs::write(
        &config_path,
        r#"{
            "monthly_template_path": "monthly.xlsx",
            "summary_template_path": "summary.xlsx",
            "summary": { "mode": "adapt", "highlight": null }
        }"#,
    )
    .unwrap();

    let config = InjectorConfig::from_json_file(&config_path).unwrap();
    let templates = Templates::load(&config).unwrap();
    let merged = run(harness.target.clone(), &templates, &config).unwrap();

    assert!(merged.contains_sheet("2025_Feb"));
    let primary = merged.sheet("Γενικό Αποτέλεσμα").unwrap();
    assert!(primary.get_cell(35, 2).is_none());
}

#[test]
fn test_inject_mode_summary() {
    let mut harness = TestHarness::new();
    // A summary template laid out for plain injection.
    harness.summary = harness.monthly.clone();
    let config = InjectorConfig::from_json_str(
        r#"{ "summary": { "mode": "inject", "sheet_names": ["Notes"] } }"#,
    )
    .unwrap();
    let templates = Templates {
        monthly: None,
        summary: harness.summary.clone(),
    };

    let (merged, report) = run_with_report(harness.target.clone(), &templates, &config).unwrap();
    assert!(matches!(report.summary, SummaryReport::Injected(_)));
    assert_eq!(merged.sheet_names(), vec!["Data", "Notes"]);
}

#[test]
fn test_untouched_sheets_keep_hidden_state_and_panes() {
    let mut harness = TestHarness::with_user_income_sheet();
    for sheet in harness.target.sheets.iter_mut() {
        match sheet.name.as_str() {
            "Data" => {
                sheet.freeze_panes = Some((1, 1));
                sheet.hidden_rows.insert(3);
            }
            "2025_ΕΣΟΔΑ" => {
                sheet.hidden = true;
                sheet.hidden_columns.insert(2);
            }
            _ => {}
        }
    }

    let output = merge_bytes(
        &to_bytes(&harness.target),
        Some(&to_bytes(&harness.monthly)),
        &to_bytes(&harness.summary),
        &config_with_exclusion(),
    )
    .unwrap();
    let merged = load_xlsx_from_bytes(&output).unwrap();

    let data = merged.sheet("Data").unwrap();
    assert_eq!(data.freeze_panes, Some((1, 1)));
    assert!(data.hidden_rows.contains(&3));

    let income = merged.sheet("2025_ΕΣΟΔΑ").unwrap();
    assert!(income.hidden);
    assert!(income.hidden_columns.contains(&2));
    assert_eq!(income.get_cell(0, 1).unwrap().value, CellValue::Number(1250.0));
}
