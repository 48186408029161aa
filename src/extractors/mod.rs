use crate::model::Recipe;
use scraper::Html;

mod heuristic;
mod json_ld;
mod microdata;

pub use self::heuristic::HeuristicExtractor;
pub use self::json_ld::JsonLdExtractor;
pub use self::microdata::MicroDataExtractor;

/// A single extraction strategy over a parsed page.
///
/// Returning `None` means the strategy found nothing to work with on this
/// page; it is not an error and the pipeline moves on to the next strategy.
pub trait Extractor {
    fn extract(&self, document: &Html) -> Option<Recipe>;
}

/// Parse the leading integer of a yield string, ignoring whatever follows:
/// "12 servings" -> 12, "Serves 12" -> None.
pub(crate) fn parse_integer_prefix(text: &str) -> Option<u32> {
    let digits: String = text
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

/// Collect an element's text content the way a browser would render it,
/// collapsing node boundaries to single spaces.
pub(crate) fn element_text(element: scraper::ElementRef) -> String {
    element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_integer_prefix() {
        assert_eq!(parse_integer_prefix("12 servings"), Some(12));
        assert_eq!(parse_integer_prefix("  4"), Some(4));
        assert_eq!(parse_integer_prefix("Serves 12"), None);
        assert_eq!(parse_integer_prefix(""), None);
        assert_eq!(parse_integer_prefix("6-8 portions"), Some(6));
    }
}
