//! Inputs made of one construct repeated many times parse in time
//! proportional to their length.

use std::time::{Duration, Instant};

use mdxtree_parser::parse;
use rstest::rstest;

const LIMIT: Duration = Duration::from_secs(5);

#[rstest]
#[case::open_brackets("[".repeat(40_000))]
#[case::open_images("![".repeat(20_000))]
#[case::open_braces("{".repeat(40_000))]
#[case::unclosed_destinations("[a](".repeat(10_000))]
#[case::labels_without_destinations("[a]".repeat(20_000))]
#[case::nested_elements("<A>\n".repeat(10_000))]
#[case::nested_quotes("> ".repeat(20_000))]
#[case::comparisons_in_tags("<A b={x <y}>\n".repeat(5_000))]
#[case::unclosed_tags("<A\n".repeat(20_000))]
fn test_repeated_construct_parses_in_linear_time(#[case] source: String) {
    let started = Instant::now();
    let ast = parse(&source).unwrap();
    let elapsed = started.elapsed();
    assert!(elapsed < LIMIT, "{} bytes took {elapsed:?}", source.len());
    let last = ast.tokens().last().map(|t| t.start as usize);
    assert_eq!(last, Some(source.len()));
}
