use super::scan::{interior, Event, Scanner};

/// Split a bracketed literal into its top-level items.
///
/// The outer delimiters are dropped; commas inside quotes or nested `{}`/`[]`
/// stay in their item. Items are not trimmed, and the last item is always
/// emitted, so `[]` yields a single empty item.
pub fn split_top_level(text: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut current = String::new();
    for event in Scanner::new(interior(text)) {
        match event {
            Event::Separator => items.push(std::mem::take(&mut current)),
            Event::Char(c) => current.push(c),
        }
    }
    items.push(current);
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_groups_and_quoted_braces_stay_intact() {
        let text = r#"[{"city":["redmond","s{eattle"]},{"state":["wa","ca"]},"test"]"#;
        let items = split_top_level(text);
        assert_eq!(items.len(), 3);
        assert_eq!(items[0], r#"{"city":["redmond","s{eattle"]}"#);
        assert_eq!(items[1], r#"{"state":["wa","ca"]}"#);
        assert_eq!(items[2], r#""test""#);
    }

    #[test]
    fn empty_collection_yields_one_empty_item() {
        assert_eq!(split_top_level("[]"), vec![String::new()]);
    }

    #[test]
    fn single_item_and_untrimmed_items() {
        assert_eq!(split_top_level("[42]"), vec!["42"]);
        assert_eq!(split_top_level("[5, 6, 8]"), vec!["5", " 6", " 8"]);
    }

    #[test]
    fn commas_inside_quotes_do_not_split() {
        assert_eq!(split_top_level(r#"["a,b","c"]"#), vec![r#""a,b""#, r#""c""#]);
        assert_eq!(split_top_level(r#"["x\",y","z"]"#), vec![r#""x\",y""#, r#""z""#]);
    }

    #[test]
    fn trailing_and_leading_separators_produce_empty_items() {
        assert_eq!(split_top_level("[,1,]"), vec!["", "1", ""]);
    }
}
