//! Application analysis integration tests
//!
//! Discovery, per-app statistics and CSV output over the fixture repository.

use layoutstat::analysis::Stat;
use layoutstat::discovery::{read_dirlist, write_dirlist};
use layoutstat::report::read_csv;
use layoutstat::{find_packages, AndroidDevice, AppAnalyzer, AppStats, Config, CsvReport};
use std::path::PathBuf;

fn repo_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/repo")
}

fn analyze_repo(config: &Config, device: Option<&AndroidDevice>) -> Vec<AppStats> {
    let packages = find_packages(&repo_path(), config).expect("Failed to find packages");
    AppAnalyzer::new(config)
        .with_device(device)
        .analyze_all(&packages, || {})
        .expect("Failed to analyze packages")
}

fn app<'a>(apps: &'a [AppStats], name: &str) -> &'a AppStats {
    apps.iter()
        .find(|app| app.package.contains(name))
        .unwrap_or_else(|| panic!("{} was not analyzed", name))
}

// ============================================================================
// Discovery
// ============================================================================

#[test]
fn test_find_packages_in_repository() {
    let packages = find_packages(&repo_path(), &Config::default()).unwrap();
    assert_eq!(packages.len(), 3);

    let calculator = &packages[0];
    assert!(calculator.layout_dirs[0].ends_with("calculator/res/layout"));
    assert!(calculator.values_dirs[0].ends_with("calculator/res/values"));

    let notes = &packages[1];
    assert!(notes.layout_dirs[0].ends_with("notes/app/src/main/res/layout"));
}

#[test]
fn test_dirlist_cache() {
    let dir = tempfile::tempdir().unwrap();
    let dirlist = dir.path().join("dirs.json");

    let packages = find_packages(&repo_path(), &Config::default()).unwrap();
    write_dirlist(&dirlist, &packages).unwrap();
    assert_eq!(read_dirlist(&dirlist).unwrap(), packages);
}

// ============================================================================
// Statistics
// ============================================================================

#[test]
fn test_unrated_apps_are_skipped() {
    let apps = analyze_repo(&Config::default(), None);
    assert_eq!(apps.len(), 2);
    assert!(apps.iter().all(|app| !app.package.contains("unrated")));
}

#[test]
fn test_calculator_statistics() {
    let apps = analyze_repo(&Config::default(), None);
    let calculator = app(&apps, "calculator");

    assert_eq!(calculator.layout_count, 3);
    assert_eq!(calculator.layouts_modelled, 2);
    assert_eq!(calculator.layouts_skipped, 1);
    assert_eq!(calculator.decode_errors, 0);

    assert_eq!(calculator.tags["tag_Button"], 5);
    assert_eq!(calculator.tags["tag_LinearLayout"], 2);
    assert_eq!(calculator.tags["tag_RelativeLayout"], 1);
    assert_eq!(calculator.tags["tag_TextView"], 2);

    // Buttons per layout: about 0, keypad 3, main 2
    assert_eq!(calculator.buttons.median, Stat::Value(2.0));
    assert_eq!(calculator.buttons.min, Stat::Value(0.0));
    assert_eq!(calculator.buttons.max, Stat::Value(3.0));
    assert_eq!(calculator.buttons.mode, Stat::NA);
    let stdev = calculator.buttons.stdev.value().unwrap();
    assert!((stdev - 1.527_525_231_651_947).abs() < 1e-9);

    // main covers 0.375, keypad 1.0; about is not modelled
    assert_eq!(calculator.ratio_mean, Stat::Value(0.6875));

    assert_eq!(calculator.rating["rating"], "4.2");
    assert_eq!(calculator.rating["stars_5"], "700");
}

#[test]
fn test_custom_tags() {
    let apps = analyze_repo(&Config::default(), None);
    assert!(!app(&apps, "notes").tags.contains_key("tag_com.example.notes.NoteView"));

    let config = Config {
        custom_tags: true,
        ..Config::default()
    };
    let apps = analyze_repo(&config, None);
    assert_eq!(app(&apps, "notes").tags["tag_com.example.notes.NoteView"], 1);
}

#[test]
fn test_device_resolves_fill_parent_roots() {
    let apps = analyze_repo(&Config::default(), None);
    assert_eq!(app(&apps, "notes").ratio_mean, Stat::NA);

    let device = AndroidDevice::galaxy_s3();
    let apps = analyze_repo(&Config::default(), Some(&device));
    let ratio = app(&apps, "notes").ratio_mean.value().unwrap();
    assert!((ratio - 48.0 / 669.0).abs() < 1e-9);
}

// ============================================================================
// CSV output
// ============================================================================

#[test]
fn test_rows_merge_into_csv() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("stats.csv");
    let apps = analyze_repo(&Config::default(), None);
    let rows: Vec<_> = apps.iter().map(AppStats::to_row).collect();

    let first = CsvReport::new(&output).write(rows.clone()).unwrap();
    assert_eq!(first.new_rows, 2);
    assert_eq!(first.kept_rows, 0);

    let second = CsvReport::new(&output).write(rows).unwrap();
    assert_eq!(second.kept_rows, 2);

    let (header, rows) = read_csv(&output).unwrap();
    assert_eq!(rows.len(), 4);

    let mut sorted = header.clone();
    sorted.sort();
    assert_eq!(header, sorted);
    for column in ["package", "layoutCount", "buttons_mean", "ratio_mean", "rating", "tag_Button"] {
        assert!(header.iter().any(|h| h == column), "missing column {}", column);
    }

    // Notes has no RelativeLayout, so the merged cell is zero-filled
    let notes = rows.iter().find(|row| row["package"].contains("notes")).unwrap();
    assert_eq!(notes["tag_RelativeLayout"], "0");
    assert_eq!(notes["ratio_mean"], "NA");
}
