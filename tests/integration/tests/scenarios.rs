//! End-to-end parses of representative documents.

mod support;

use mdxtree_ast::{AttributeKind, ErrorKind, NodeTag, TokenTag};
use mdxtree_parser::{MdxParser, ParseOptions, Parser, parse, parse_with_options};
use support::child_tags;

mod markdown {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn heading_and_paragraph() {
        let ast = parse("# Hello World\n\nThis is a test.\n").unwrap();
        let root = ast.root();
        assert_eq!(child_tags(&ast, root), vec![NodeTag::Heading, NodeTag::Paragraph]);

        let heading = ast.children(root)[0];
        assert_eq!(ast.heading_level(heading), Some(1));
        assert_eq!(ast.node_text(ast.children(heading)[0]), "Hello World");

        let paragraph = ast.children(root)[1];
        assert_eq!(ast.node_text(paragraph), "This is a test.");
        assert!(ast.errors().is_empty());
    }

    #[test]
    fn strong_in_paragraph() {
        let ast = parse("This has **bold text** in it.\n").unwrap();
        let paragraph = ast.children(ast.root())[0];
        assert_eq!(
            child_tags(&ast, paragraph),
            vec![NodeTag::Text, NodeTag::Strong, NodeTag::Text]
        );
        let strong = ast.children(paragraph)[1];
        assert_eq!(ast.node_text(ast.children(strong)[0]), "bold text");
        assert!(ast.errors().is_empty());
    }

    #[test]
    fn emphasis_markers_are_balanced() {
        let source = "*a* **b** ***c***\n";
        let ast = parse(source).unwrap();
        let tokens = ast.tokens();
        let count = |tag| tokens.iter().filter(|t| t.tag == tag).count();
        assert_eq!(count(TokenTag::EmphasisStart), count(TokenTag::EmphasisEnd));
        assert_eq!(count(TokenTag::StrongStart), count(TokenTag::StrongEnd));
        assert!(ast.errors().is_empty());
    }

    #[test]
    fn unclosed_strong_is_reported() {
        let ast = parse("**never closed\n").unwrap();
        assert_eq!(ast.errors()[0].kind, ErrorKind::UnclosedStrong);
        let paragraph = ast.children(ast.root())[0];
        assert_eq!(child_tags(&ast, paragraph), vec![NodeTag::Strong]);
    }

    #[test]
    fn document_outline() {
        let source = "\
# Guide

Intro with `code` and [a link](https://example.com).

- one
- two

> quoted

```js
let x = 1;
```
";
        let ast = parse(source).unwrap();
        assert_eq!(
            child_tags(&ast, ast.root()),
            vec![
                NodeTag::Heading,
                NodeTag::Paragraph,
                NodeTag::ListUnordered,
                NodeTag::Blockquote,
                NodeTag::CodeBlock,
            ]
        );
        assert!(ast.errors().is_empty());
    }
}

mod mdx {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn self_closing_element() {
        let ast = parse("<Button />").unwrap();
        let children = ast.children(ast.root());
        assert_eq!(children.len(), 1);
        let button = children[0];
        assert_eq!(ast.tag(button), NodeTag::SelfClosingElement);
        assert_eq!(ast.element_name(button), Some("Button"));
        assert_eq!(ast.attributes(button).count(), 0);
        assert!(ast.errors().is_empty());
    }

    #[test]
    fn element_with_attributes_and_children() {
        let source = "<Callout type=\"warning\" open>\n\nCareful with {value}.\n\n</Callout>\n";
        let ast = parse(source).unwrap();
        let callout = ast.children(ast.root())[0];
        assert_eq!(ast.tag(callout), NodeTag::Element);
        assert_eq!(ast.element_name(callout), Some("Callout"));

        let attributes: Vec<_> = ast.attributes(callout).collect();
        assert_eq!(attributes.len(), 2);
        assert_eq!(ast.attribute_name(&attributes[0]), Some("type"));
        assert_eq!(ast.attribute_value(&attributes[0]), "\"warning\"");
        assert_eq!(attributes[1].kind, AttributeKind::Boolean);

        let paragraph = ast.children(callout)[0];
        assert_eq!(
            child_tags(&ast, paragraph),
            vec![NodeTag::Text, NodeTag::TextExpression, NodeTag::Text]
        );
        assert!(ast.errors().is_empty());
    }

    #[test]
    fn esm_and_flow_expression() {
        let source = "import { Chart } from './chart'\n\n{data.length}\n\n<Chart data={data} />\n";
        let ast = parse(source).unwrap();
        assert_eq!(
            child_tags(&ast, ast.root()),
            vec![
                NodeTag::EsmImport,
                NodeTag::FlowExpression,
                NodeTag::SelfClosingElement,
            ]
        );
        let expression = ast.children(ast.root())[1];
        assert_eq!(ast.expression_source(expression), Some("data.length"));
    }

    #[test]
    fn unclosed_tag_still_returns_a_tree() {
        let ast = parse("<Unclosed").unwrap();
        assert_eq!(ast.tag(ast.root()), NodeTag::Document);
        assert!(
            ast.errors()
                .iter()
                .any(|e| e.kind == ErrorKind::ExpectedClosingTag)
        );
    }

    #[test]
    fn error_in_one_block_leaves_siblings_intact() {
        let source = "# Before\n\n<Card title=>\n\n# After\n";
        let ast = parse(source).unwrap();
        assert_eq!(ast.errors().len(), 1);
        assert_eq!(ast.errors()[0].kind, ErrorKind::InvalidAttribute);
        assert_eq!(
            child_tags(&ast, ast.root()),
            vec![NodeTag::Heading, NodeTag::Heading]
        );
    }
}

mod frontmatter {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn frontmatter_then_heading() {
        let ast = parse("---\ntitle: x\n---\n# T\n").unwrap();
        let children = ast.children(ast.root());
        assert_eq!(
            child_tags(&ast, ast.root()),
            vec![NodeTag::Frontmatter, NodeTag::Heading]
        );
        assert_eq!(ast.frontmatter(children[0]), Some("title: x"));
        assert_eq!(ast.heading_level(children[1]), Some(1));
        assert!(ast.errors().is_empty());
    }

    #[test]
    fn disabled_frontmatter() {
        let options = ParseOptions {
            frontmatter: false,
            ..ParseOptions::default()
        };
        let ast = parse_with_options("---\ntitle: x\n", &options).unwrap();
        assert_eq!(
            child_tags(&ast, ast.root())[0],
            NodeTag::ThematicBreak
        );
    }
}

mod positions {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn error_position() {
        let source = "ok\n\n<A b=>\n";
        let ast = MdxParser::new().parse(source).unwrap();
        let error = ast.errors()[0];
        let position = ast.line_col(error.span.start);
        assert_eq!((position.line, position.column), (3, 5));
    }
}
