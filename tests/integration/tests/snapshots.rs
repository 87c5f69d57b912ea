//! Tree snapshots of small documents.

mod support;

use insta::assert_snapshot;
use mdxtree_parser::parse;
use support::dump;

#[test]
fn snapshot_markdown_document() {
    let ast = parse("# Hello\n\nThis has **bold** text.\n").unwrap();
    assert_snapshot!(dump(&ast), @r#"
    Document 0..33
      Heading 0..7
        Text 2..7 "Hello"
      Paragraph 9..32
        Text 9..18 "This has "
        Strong 18..26
          Text 20..24 "bold"
        Text 26..32 " text."
    "#);
}

#[test]
fn snapshot_element_with_flow_expression() {
    let ast = parse("<Card title=\"x\">\n{count}\n</Card>\n").unwrap();
    assert_snapshot!(dump(&ast), @r"
    Document 0..33
      Element 0..32 <Card>
        FlowExpression 17..24
    ");
}

#[test]
fn snapshot_list_with_link() {
    let ast = parse("- [x] see [docs](/d)\n- two\n").unwrap();
    assert_snapshot!(dump(&ast), @r#"
    Document 0..27
      ListUnordered 0..26
        ListItem 0..20
          Text 6..10 "see "
          Link 10..20
            Text 11..15 "docs"
        ListItem 21..26
          Text 23..26 "two"
    "#);
}
