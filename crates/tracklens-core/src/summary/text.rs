use scraper::Html;

/// Strip markup from a prose statement produced upstream.
///
/// The classifier decorates its "on average" statements with inline HTML.
/// Absent or empty input yields `""`; markup-free text passes through
/// unchanged; anything else degrades to best-effort plain text. This never
/// fails — the fragment parser accepts arbitrary input.
pub fn strip_markup(input: Option<&str>) -> String {
    let Some(raw) = input else {
        return String::new();
    };
    if raw.is_empty() {
        return String::new();
    }
    // Markup-free statements skip the parse entirely.
    if !raw.contains('<') && !raw.contains('&') {
        return raw.to_string();
    }
    let fragment = Html::parse_fragment(raw);
    let mut out = String::with_capacity(raw.len());
    for piece in fragment.root_element().text() {
        out.push_str(piece);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_input_yields_empty_string() {
        assert_eq!(strip_markup(None), "");
        assert_eq!(strip_markup(Some("")), "");
    }

    #[test]
    fn plain_text_round_trips_unchanged() {
        let statement = "This is more than the average of 7 ad trackers.";
        assert_eq!(strip_markup(Some(statement)), statement);
    }

    #[test]
    fn tags_are_removed() {
        assert_eq!(
            strip_markup(Some("This is <strong>more</strong> than average.")),
            "This is more than average."
        );
    }

    #[test]
    fn nested_markup_degrades_to_text() {
        assert_eq!(
            strip_markup(Some("<p>Found <a href=\"#\">trackers</a> on <em>this</em> site</p>")),
            "Found trackers on this site"
        );
    }

    #[test]
    fn entities_are_decoded() {
        assert_eq!(strip_markup(Some("cookies &amp; trackers")), "cookies & trackers");
    }

    #[test]
    fn unbalanced_markup_does_not_error() {
        assert_eq!(strip_markup(Some("broken <b>tag")), "broken tag");
    }
}
