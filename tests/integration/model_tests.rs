//! Layout model integration tests
//!
//! These tests build element trees from the fixture layouts and check the
//! resolved geometry.

use layoutstat::device::{DeviceError, Font, FontMetrics, TextExtent};
use layoutstat::model::{Element, LayoutError};
use layoutstat::{AndroidDevice, Dip, LayoutParser, LayoutTree, ResourceResolver};
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn calculator() -> PathBuf {
    fixtures_path().join("repo/calculator/res")
}

fn parse_with(path: &Path, values: &Path, device: Option<&AndroidDevice>) -> Result<LayoutTree, LayoutError> {
    let resources = ResourceResolver::with_dir(values);
    LayoutParser::new(&resources, device).parse_file(path)
}

fn children<'t>(tree: &'t LayoutTree, element: &Element) -> Vec<&'t Element> {
    element.children().iter().map(|id| &tree[*id]).collect()
}

// ============================================================================
// Structure
// ============================================================================

#[test]
fn test_linear_layout_with_resources() {
    let res = calculator();
    let tree = parse_with(&res.join("layout/main.xml"), &res.join("values"), None).unwrap();

    let root_id = tree.root().unwrap();
    let root = &tree[root_id];
    assert_eq!(root.tag_name(), "LinearLayout");
    assert_eq!(root.id(), Some("@+id/main"));
    assert_eq!(root.width(), Some(Dip(320)));
    assert_eq!(root.height(), Some(Dip(200)));

    let kids = children(&tree, root);
    assert_eq!(kids.len(), 3);
    assert_eq!(kids[0].tag_name(), "TextView");
    assert_eq!(kids[0].width(), Some(Dip(320)));

    let equals = kids[1].as_button().unwrap();
    assert_eq!(equals.text.as_deref(), Some("="));
    assert_eq!(kids[1].width(), Some(Dip(320)));
    // No layout_gravity: the container's gravity applies
    assert_eq!(kids[1].attrs().gravity.as_deref(), Some("center"));

    let clear = kids[2].as_button().unwrap();
    assert_eq!(clear.text.as_deref(), Some("Clear"));
    assert_eq!(clear.text_size, Dip(14));
    assert_eq!(kids[2].attrs().gravity.as_deref(), Some("right"));

    for kid in kids {
        assert_eq!(kid.parent(), Some(root_id));
    }

    assert_eq!(tree.button_count(), 2);
    assert!((tree.button_ratio(root_id).unwrap() - 0.375).abs() < 1e-9);
}

#[test]
fn test_parsing_is_deterministic() {
    let res = calculator();
    let first = parse_with(&res.join("layout/main.xml"), &res.join("values"), None).unwrap();
    let second = parse_with(&res.join("layout/main.xml"), &res.join("values"), None).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_relative_layout_is_not_supported() {
    let res = calculator();
    let err = parse_with(&res.join("layout/about.xml"), &res.join("values"), None).unwrap_err();
    assert!(err.is_not_supported());
    assert!(err.to_string().contains("RelativeLayout"));
}

// ============================================================================
// Geometry
// ============================================================================

#[test]
fn test_wrap_content_layout_without_device() {
    let res = calculator();
    let tree = parse_with(&res.join("layout/keypad.xml"), &res.join("values"), None).unwrap();

    let root_id = tree.root().unwrap();
    let root = &tree[root_id];
    // Horizontal: widths add up, the tallest child sets the height
    assert_eq!(root.width(), Some(Dip(128)));
    assert_eq!(root.height(), Some(Dip(64)));

    let nine = children(&tree, root)[2];
    assert_eq!(nine.width(), None);
    assert_eq!(nine.as_button().unwrap().text_size, Dip(18));
    assert!((tree.button_ratio(root_id).unwrap() - 1.0).abs() < 1e-9);
}

#[test]
fn test_wrap_content_layout_on_device() {
    let res = calculator();
    let device = AndroidDevice::galaxy_s3();
    let tree = parse_with(&res.join("layout/keypad.xml"), &res.join("values"), Some(&device)).unwrap();

    let root = &tree[tree.root().unwrap()];
    let nine = children(&tree, root)[2];
    let (width, height) = (nine.width().unwrap(), nine.height().unwrap());
    assert!(width.value() > 0);
    assert!(height > width);

    assert_eq!(root.width(), Some(Dip(128 + width.value())));
    assert_eq!(root.height(), Some(Dip(64i32.max(height.value()))));
    assert!(device.cached_measurements() >= 1);
}

#[derive(Debug)]
struct FixedLines;

impl FontMetrics for FixedLines {
    fn measure(&self, text: &str, _font: Font) -> Result<TextExtent, DeviceError> {
        // 14dp text on a 160 dpi screen is 14px per em
        Ok(TextExtent {
            width: text.chars().count() as f64 * 5.0 / 14.0,
            height: 20.0 / 14.0,
        })
    }
}

#[test]
fn test_auto_sized_button_is_three_lines_tall() {
    let device = AndroidDevice::baseline().with_metrics(Arc::new(FixedLines));
    let fixtures = fixtures_path();
    let tree = parse_with(
        &fixtures.join("layouts/login.xml"),
        &fixtures.join("values"),
        Some(&device),
    )
    .unwrap();

    let root = &tree[tree.root().unwrap()];
    assert_eq!(root.width(), Some(Dip(320)));
    assert_eq!(root.height(), Some(Dip(480)));

    let submit = children(&tree, root)[1];
    assert_eq!(submit.as_button().unwrap().text.as_deref(), Some("Sign in"));
    assert_eq!(submit.as_button().unwrap().font, Font::Monospace);
    assert_eq!(device.to_pixels(submit.height().unwrap()).unwrap(), 60);
    // 7 characters at 5px plus one line height
    assert_eq!(submit.width(), Some(Dip(55)));
}

#[test]
fn test_missing_values_dir_fails_resource_lookup() {
    let fixtures = fixtures_path();
    let err = parse_with(
        &fixtures.join("layouts/login.xml"),
        &fixtures.join("no-such-values"),
        None,
    )
    .unwrap_err();
    assert!(matches!(err, LayoutError::Resource(_)));
}
