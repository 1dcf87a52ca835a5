use futures::executor::block_on;
use jsx::{Node, RenderError, render, render_async};
use jsx_test_support::{RenderCase, diff_lines, load_cases};
use std::path::PathBuf;
use xml::{WriteOptions, XmlDocument};

fn cases() -> Vec<RenderCase> {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/render_cases.toml");
    load_cases(&path)
}

fn input(case: &RenderCase) -> Node {
    let value: serde_json::Value = serde_json::from_str(&case.input)
        .unwrap_or_else(|err| panic!("case {:?} has invalid JSON input: {err}", case.name));
    Node::foreign(value)
}

fn check(
    case: &RenderCase,
    engine: &str,
    result: Result<XmlDocument, RenderError>,
) -> Option<String> {
    let options = WriteOptions::headless().with_pretty_print(case.pretty);
    match (result, &case.expected, &case.error) {
        (Ok(doc), Some(expected), _) => {
            let actual = doc.serialize(&options);
            (actual != *expected).then(|| {
                format!(
                    "[{engine}] {}\n{}",
                    case.name,
                    diff_lines(expected, &actual)
                )
            })
        }
        (Err(err), _, Some(expected)) => (err.to_string() != *expected)
            .then(|| format!("[{engine}] {}: expected error {expected:?}, got {err:?}", case.name)),
        (Ok(doc), None, expected) => Some(format!(
            "[{engine}] {}: expected error {expected:?}, got output {:?}",
            case.name,
            doc.serialize(&options)
        )),
        (Err(err), _, None) => Some(format!("[{engine}] {}: unexpected error {err}", case.name)),
    }
}

#[test]
fn golden_cases_render_identically_in_both_engines() {
    let cases = cases();
    assert!(!cases.is_empty());
    let mut failures = Vec::new();
    for case in &cases {
        failures.extend(check(case, "sync", render(input(case))));
        failures.extend(check(case, "async", block_on(render_async(input(case)))));
    }
    assert!(
        failures.is_empty(),
        "{} golden failures:\n{}",
        failures.len(),
        failures.join("\n")
    );
}
