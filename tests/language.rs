use std::fs;

use calctree::get_result;
use pretty_assertions::assert_eq;
use walkdir::WalkDir;

/// Expected outcome written on the right of ` => ` when a line must fail.
const FAILURE: &str = "error";

#[test]
fn script_examples_work() {
    let mut count = 0;

    for entry in
        WalkDir::new("tests/scripts").into_iter()
                                     .filter_map(Result::ok)
                                     .filter(|e| e.path().extension().is_some_and(|ext| ext == "calc"))
    {
        let path = entry.path();
        let content =
            fs::read_to_string(path).unwrap_or_else(|e| panic!("Failed to read {path:?}: {e}"));

        for (i, (expression, expected)) in extract_cases(&content).into_iter().enumerate() {
            count += 1;
            match (get_result(expression), expected) {
                (Ok(output), FAILURE) => {
                    panic!("Case {} in {:?} succeeded but was expected to fail:\n{}\nOutput: {}",
                           i + 1,
                           path,
                           expression,
                           output)
                },
                (Ok(output), expected) => {
                    assert_eq!(output, expected, "case {} in {:?}: {}", i + 1, path, expression);
                },
                (Err(_), FAILURE) => {},
                (Err(e), _) => {
                    panic!("Case {} in {:?} failed:\n{}\nError: {}", i + 1, path, expression, e)
                },
            }
        }
    }

    assert!(count > 0, "No cases found in tests/scripts");
}

/// Reads `expression => expected` lines, skipping blank lines and `#`
/// comments.
fn extract_cases(content: &str) -> Vec<(&str, &str)> {
    content.lines()
           .map(str::trim)
           .filter(|line| !line.is_empty() && !line.starts_with('#'))
           .map(|line| {
               line.rsplit_once(" => ")
                   .map(|(expression, expected)| (expression.trim(), expected.trim()))
                   .unwrap_or_else(|| panic!("Malformed case: {line}"))
           })
           .collect()
}

fn assert_output(src: &str, expected: &str) {
    match get_result(src) {
        Ok(output) => assert_eq!(output, expected),
        Err(e) => panic!("Script failed: {e}"),
    }
}

fn assert_success(src: &str) {
    if let Err(e) = get_result(src) {
        panic!("Script failed: {e}");
    }
}

fn assert_failure(src: &str) {
    if get_result(src).is_ok() {
        panic!("Script succeeded but was expected to fail")
    }
}

#[test]
fn memory_persists_across_lines() {
    assert_output("3 <- 7\n3 mem", "7");
    assert_output("1 <- 2\n2 <- 1 mem * 10\n1 mem + 2 mem", "22");
    assert_output("5 <- 1\n5 <- 5 mem + 1\n5 <- 5 mem + 1\n5 mem", "3");
}

#[test]
fn comments_and_blank_lines_are_skipped() {
    assert_output("# setup\n4 <- 4\n\n   \n# result\n4 mem ^ 2", "16");
    assert_failure("# nothing here\n\n");
    assert_failure("");
}

#[test]
fn the_last_line_wins() {
    assert_output("1 + 1\n2 + 2\n[3, 3]", "[3, 3]");
    assert_output("{x | x}\nsqrt", "sqrt");
}

#[test]
fn any_failing_line_fails_the_script() {
    assert_failure("1 + 1\n1 / 0\n2 + 2");
    assert_failure("1 <- 1\n(1 mem");
    assert_failure("[1, 2] * 2\n3");
}

#[test]
fn pointers_do_not_outlive_their_line() {
    assert_success("2 ref deref");
    assert_output("2 ref <- 9\n2 mem", "9");
}

#[test]
fn lambdas_within_a_line() {
    assert_output("{x, y | x ^ 2 + y ^ 2}[3, 4] sqrt", "5");
    assert_output("{f: fn Number -> Number | [f[1], f[2]]}[{x | x * 3}]", "[3, 6]");
}
