//! Property-based tests for env-file quoting and reference parsing.
//!
//! Uses `proptest` to verify invariants across many random inputs.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use proptest::prelude::*;

use stackctl_cli::domain::env::{EnvMap, Segment, parse_template};
use stackctl_cli::domain::envfile::{quote_value, render_env_file};

/// Reverse the env-file escaping for a quoted value.
fn unquote(quoted: &str) -> String {
    let inner = &quoted[1..quoted.len() - 1];
    let mut out = String::new();
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        match (c, chars.peek().copied()) {
            ('\\', Some('n')) => {
                out.push('\n');
                chars.next();
            }
            ('\\', Some('r')) => {
                out.push('\r');
                chars.next();
            }
            ('\\', Some(next @ ('\\' | '"'))) => {
                out.push(next);
                chars.next();
            }
            ('$', Some('$')) => {
                out.push('$');
                chars.next();
            }
            _ => out.push(c),
        }
    }
    out
}

// ============================================================================
// quote_value() property tests
// ============================================================================

proptest! {
    /// A quoted value never spans lines and never leaves a lone `$` that
    /// compose would try to interpolate.
    #[test]
    fn prop_quoted_value_is_single_line_and_escaped(value in any::<String>()) {
        let quoted = quote_value(&value);
        prop_assert!(!quoted.contains('\n'), "raw newline in {:?}", quoted);
        prop_assert!(!quoted.contains('\r'), "raw carriage return in {:?}", quoted);
        let dollars_outside_pairs = quoted.replace("$$", "");
        prop_assert!(!dollars_outside_pairs.contains('$'), "lone $ in {:?}", quoted);
    }

    /// Quoting is lossless.
    #[test]
    fn prop_quote_value_round_trips(value in any::<String>()) {
        let quoted = quote_value(&value);
        if quoted.starts_with('"') {
            let unquoted = unquote(&quoted);
            prop_assert_eq!(&unquoted, &value);
        } else {
            prop_assert_eq!(quoted.as_ref(), value.as_str());
        }
    }

    /// Safe values are written bare.
    #[test]
    fn prop_safe_values_are_bare(value in "[A-Za-z0-9_./:@+,-]{0,40}") {
        let quoted = quote_value(&value);
        prop_assert_eq!(quoted.as_ref(), value.as_str());
    }

    /// Every variable becomes exactly one line, in insertion order.
    #[test]
    fn prop_env_file_has_one_line_per_variable(
        values in proptest::collection::vec(any::<String>(), 1..20),
    ) {
        let mut env = EnvMap::new();
        for (i, v) in values.iter().enumerate() {
            env.insert(format!("VAR_{i}"), v.clone(), i % 2 == 0);
        }
        let body = render_env_file("acme", &env);
        let keys: Vec<&str> = body
            .lines()
            .filter(|l| !l.starts_with('#'))
            .map(|l| l.split_once('=').expect("KEY=value").0)
            .collect();
        let expected: Vec<String> = (0..values.len()).map(|i| format!("VAR_{i}")).collect();
        prop_assert_eq!(keys, expected);
    }
}

// ============================================================================
// parse_template() property tests
// ============================================================================

proptest! {
    /// Text without `$` is a single literal (or nothing).
    #[test]
    fn prop_plain_text_is_one_literal(text in "[^$]{0,60}") {
        let segments = parse_template("V", &text).unwrap();
        if text.is_empty() {
            prop_assert!(segments.is_empty() || segments == vec![Segment::Literal("")]);
        } else {
            prop_assert_eq!(segments, vec![Segment::Literal(text.as_str())]);
        }
    }

    /// Well-formed references parse to the matching segment.
    #[test]
    fn prop_references_parse(
        key in "[A-Z_][A-Z0-9_]{0,15}",
        kind in prop::sample::select(vec!["secret", "env", "var"]),
    ) {
        let template = format!("pre-${{{kind}:{key}}}-post");
        let segments = parse_template("V", &template).unwrap();
        let expected = match kind {
            "secret" => Segment::Secret(key.as_str()),
            "env" => Segment::Host(key.as_str()),
            _ => Segment::Var(key.as_str()),
        };
        prop_assert_eq!(
            segments,
            vec![Segment::Literal("pre-"), expected, Segment::Literal("-post")]
        );
    }

    /// Unknown reference kinds are always rejected.
    #[test]
    fn prop_unknown_kind_rejected(kind in "[a-z]{1,8}", key in "[A-Z]{1,8}") {
        prop_assume!(!["secret", "env", "var"].contains(&kind.as_str()));
        let template = format!("${{{kind}:{key}}}");
        prop_assert!(parse_template("V", &template).is_err());
    }
}
