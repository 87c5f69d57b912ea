//! Structural properties that hold for any input.

mod support;

use mdxtree_ast::{NodeTag, TokenTag};
use mdxtree_parser::parse;
use proptest::prelude::*;
use support::reachable;

/// Sources built from the characters that drive the lexer's decisions.
fn source() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            Just("# "),
            Just("*"),
            Just("**"),
            Just("`"),
            Just("["),
            Just("]"),
            Just("("),
            Just(")"),
            Just("!"),
            Just("<"),
            Just(">"),
            Just("/"),
            Just("{"),
            Just("}"),
            Just("="),
            Just("\""),
            Just("- "),
            Just("1. "),
            Just("> "),
            Just("```"),
            Just("> ```"),
            Just("---"),
            Just("import "),
            Just("import x\n"),
            Just("export "),
            Just("<A>"),
            Just("</A>"),
            Just("{a <b}"),
            Just("  "),
            Just("  \n"),
            Just("\\\n"),
            Just("\n"),
            Just("\n\n"),
            Just("word"),
            Just("A"),
            Just("é"),
            Just("\u{1}"),
        ],
        0..64,
    )
    .prop_map(|parts| parts.concat())
}

proptest! {
    #[test]
    fn test_parse_never_fails(source in source()) {
        prop_assert!(parse(&source).is_ok());
    }

    #[test]
    fn test_tokens_are_gapless(source in source()) {
        let ast = parse(&source).unwrap();
        let tokens = ast.tokens();
        prop_assert_eq!(tokens[0].start, 0);
        let last = tokens[tokens.len() - 1];
        prop_assert_eq!(last.tag, TokenTag::Eof);
        prop_assert_eq!(last.start as usize, source.len());
        for pair in tokens.windows(2) {
            prop_assert!(pair[0].start < pair[1].start);
        }
    }

    #[test]
    fn test_children_follow_parents(source in source()) {
        let ast = parse(&source).unwrap();
        for node in reachable(&ast) {
            prop_assert_ne!(ast.tag(node), NodeTag::Placeholder);
            for &child in ast.children(node) {
                prop_assert!(child > node);
            }
        }
    }

    #[test]
    fn test_paragraph_children_cover_paragraph(source in source()) {
        let ast = parse(&source).unwrap();
        for node in reachable(&ast) {
            if ast.tag(node) != NodeTag::Paragraph {
                continue;
            }
            let joined: String = ast
                .children(node)
                .iter()
                .map(|&child| ast.node_text(child))
                .collect();
            prop_assert_eq!(joined.as_str(), ast.node_text(node));
        }
    }

    #[test]
    fn test_errors_are_deterministic(source in source()) {
        let first = parse(&source).unwrap();
        let second = parse(&source).unwrap();
        prop_assert_eq!(first.errors(), second.errors());
        prop_assert_eq!(first.nodes().tags(), second.nodes().tags());
    }

    #[test]
    fn test_node_count_is_bounded(source in source()) {
        let ast = parse(&source).unwrap();
        prop_assert!(ast.nodes().len() <= 4 * ast.tokens().len());
    }
}
