//! Rendering syntax errors as miette diagnostics.

use mdxtree_ast::ErrorKind;
use mdxtree_parser::{ParseError, ParseOptions, parse, parse_with_options};
use miette::{GraphicalReportHandler, GraphicalTheme, Report};

fn render(report: &Report) -> String {
    let mut out = String::new();
    GraphicalReportHandler::new_themed(GraphicalTheme::unicode_nocolor())
        .render_report(&mut out, report.as_ref())
        .unwrap();
    out
}

#[test]
fn renders_syntax_error_with_source() {
    let source = "<A>x</B>\n";
    let ast = parse(source).unwrap();
    let error = ast.errors()[0];
    assert_eq!(error.kind, ErrorKind::MismatchedTags);

    let report = Report::new(error).with_source_code(source.to_string());
    let rendered = render(&report);
    assert!(rendered.contains("mdx::mismatched_tags"));
    assert!(rendered.contains("closing tag does not match opening tag"));
    assert!(rendered.contains("<A>x</B>"));
}

#[test]
fn heading_warning_is_not_an_error() {
    let ast = parse("####### seven\n").unwrap();
    assert_eq!(ast.errors().len(), 1);
    assert!(ast.errors()[0].is_warning());
    assert!(!ast.has_errors());
}

#[test]
fn fatal_error_has_code() {
    let options = ParseOptions {
        max_input_len: Some(1),
        ..ParseOptions::default()
    };
    let error = parse_with_options("ab", &options).unwrap_err();
    assert!(matches!(error, ParseError::InputTooLarge { len: 2, limit: 1 }));
    let rendered = render(&Report::new(error));
    assert!(rendered.contains("mdx::input_too_large"));
}
