//! Search filter translation
//!
//! Users write filters in a compact form where one clause can list several
//! values for the same field:
//!
//! ```text
//! id:a,b,c status=available,unavailable
//! ```
//!
//! The search backend wants one required-match term per value instead:
//!
//! ```text
//! +id:a +id:b +id:c +status:available +status:unavailable
//! ```
//!
//! Values of the same field are OR-ed by the backend and distinct fields are
//! AND-ed. Anything that is not a `field:values` clause (a bare keyword, `*`)
//! is passed through untouched when no field clause is present.

/// Required-match marker understood by the search backend
const REQUIRED: char = '+';

/// Rewrite a compact filter expression into search backend syntax
///
/// Clauses are separated by single spaces. A clause with exactly one `:`
/// (or `=`) expands into one `+field:value` term per comma-separated value,
/// in order. Clauses with no separator or more than one are dropped. When no
/// clause expands, the trimmed and `=`-normalized input is returned as is.
///
/// A field that already carries the `+` marker is not marked twice, so
/// translating an already translated filter is a no-op.
///
/// # Example
/// ```
/// use metalcloud_client::filter::translate;
///
/// assert_eq!(
///     translate("server_status:available,used"),
///     "+server_status:available +server_status:used"
/// );
/// assert_eq!(translate("*"), "*");
/// ```
#[must_use]
pub fn translate(filter: &str) -> String {
    let normalized = filter.trim_matches(' ').replace('=', ":");

    let mut terms = Vec::new();
    for clause in normalized.split(' ') {
        let parts: Vec<&str> = clause.split(':').collect();
        let [field, values] = parts.as_slice() else {
            continue;
        };

        let field = field.strip_prefix(REQUIRED).unwrap_or(field);
        terms.extend(
            values
                .split(',')
                .map(|variant| format!("{REQUIRED}{field}:{variant}")),
        );
    }

    if terms.is_empty() {
        normalized
    } else {
        terms.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiple_fields() {
        assert_eq!(
            translate("id:a,b,c status:available,unavailable"),
            "+id:a +id:b +id:c +status:available +status:unavailable"
        );
    }

    #[test]
    fn test_trailing_space() {
        assert_eq!(translate("id:a,b,c "), "+id:a +id:b +id:c");
    }

    #[test]
    fn test_single_field() {
        assert_eq!(
            translate("server_status:available,used"),
            "+server_status:available +server_status:used"
        );
    }

    #[test]
    fn test_keyword_passthrough() {
        assert_eq!(translate("asasd"), "asasd");
        assert_eq!(translate("*"), "*");
    }

    #[test]
    fn test_empty() {
        assert_eq!(translate(""), "");
        assert_eq!(translate("   "), "");
    }

    #[test]
    fn test_equals_separator() {
        assert_eq!(translate("status=used,cleaning"), "+status:used +status:cleaning");
        assert_eq!(translate("id=1 status:used"), "+id:1 +status:used");
    }

    #[test]
    fn test_passthrough_is_normalized() {
        // No recognized clause, but `=` is still rewritten
        assert_eq!(translate("  a=b=c  "), "a:b:c");
    }

    #[test]
    fn test_multiple_colons_dropped() {
        assert_eq!(translate("a:b:c id:1"), "+id:1");
        assert_eq!(translate("a:b:c"), "a:b:c");
    }

    #[test]
    fn test_bare_words_dropped_alongside_fields() {
        assert_eq!(translate("web id:5 rack"), "+id:5");
    }

    #[test]
    fn test_consecutive_spaces() {
        assert_eq!(translate("id:1   status:used"), "+id:1 +status:used");
    }

    #[test]
    fn test_variant_order_and_duplicates_kept() {
        assert_eq!(translate("id:3,1,3"), "+id:3 +id:1 +id:3");
    }

    #[test]
    fn test_empty_values() {
        assert_eq!(translate("id:"), "+id:");
        assert_eq!(translate("id:a,,b"), "+id:a +id: +id:b");
    }

    #[test]
    fn test_already_translated() {
        let once = translate("id:a,b status:used");
        assert_eq!(translate(&once), once);
    }

    #[test]
    fn test_single_marker_stripped() {
        assert_eq!(translate("+id:a"), "+id:a");
        assert_eq!(translate("++id:a,b"), "++id:a ++id:b");
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn clause() -> impl Strategy<Value = (String, Vec<String>)> {
            (
                "[a-z_]{1,12}",
                prop::collection::vec("[a-z0-9]{1,8}", 1..5),
            )
        }

        proptest! {
            #[test]
            fn never_panics(input in any::<String>()) {
                let _ = translate(&input);
            }

            #[test]
            fn term_count_matches_variants(
                clauses in prop::collection::vec(clause(), 1..6),
                keyword in "[a-z]{1,8}",
            ) {
                let mut parts: Vec<String> = clauses
                    .iter()
                    .map(|(field, values)| format!("{field}:{}", values.join(",")))
                    .collect();
                parts.push(keyword);
                let input = parts.join(" ");

                let expected: usize = clauses.iter().map(|(_, values)| values.len()).sum();
                let output = translate(&input);
                prop_assert_eq!(output.split(' ').count(), expected);
                prop_assert!(output.split(' ').all(|term| term.starts_with('+')));
            }

            #[test]
            fn keywords_pass_through(words in prop::collection::vec("[a-z*]{1,8}", 1..4)) {
                let input = words.join(" ");
                prop_assert_eq!(translate(&input), input);
            }

            #[test]
            fn single_value_clauses_are_stable(
                clauses in prop::collection::vec(("[a-z_]{1,12}", "[a-z0-9]{1,8}"), 1..6),
            ) {
                let input = clauses
                    .iter()
                    .map(|(field, value)| format!("{field}:{value}"))
                    .collect::<Vec<_>>()
                    .join(" ");

                let once = translate(&input);
                prop_assert_eq!(translate(&once), once);
            }
        }
    }
}
