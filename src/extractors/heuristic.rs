use crate::extractors::{element_text, Extractor};
use crate::model::Recipe;
use log::debug;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

/// Last-resort strategy for pages without any machine-readable metadata:
/// scores plain `<ul>`/`<ol>` lists by measurement-keyword density to find
/// ingredients, and by enumeration patterns or section words to find
/// directions. Always yields a record; the pipeline decides whether its
/// content is worth keeping.
pub struct HeuristicExtractor;

/// Unit-of-quantity tokens that signal a list item is an ingredient line.
/// Matched as case-insensitive substrings of the list's whole text.
// TODO: tighten the single-letter units ("g") to word-boundary matches
static MEASUREMENT_KEYWORDS: &[&str] = &[
    "cup",
    "cups",
    "tablespoon",
    "tablespoons",
    "tbsp",
    "teaspoon",
    "teaspoons",
    "tsp",
    "pound",
    "pounds",
    "lb",
    "ounce",
    "ounces",
    "oz",
    "gram",
    "grams",
    "g",
    "kilogram",
    "kilograms",
    "kg",
    "ml",
    "milliliter",
    "milliliters",
    "liter",
    "liters",
    "pinch",
    "pinches",
    "dash",
    "to taste",
];

/// Section words that mark a list as cooking directions.
static INSTRUCTION_KEYWORDS: &[&str] = &[
    "instructions",
    "directions",
    "method",
    "steps",
    "how to make",
    "preparation",
];

static ENUMERATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+\.|\d+\)|\d+|step\s+\d+)").unwrap());

static SERVINGS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)serves\s+(\d+)|servings?:\s*(\d+)|yield:\s*(\d+)").unwrap());

static PREP_TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)prep(?:aration)?\s+time:?\s*(\d+)\s*(min|minutes|hour|hours|hrs?)").unwrap()
});

static COOK_TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)cook(?:ing)?\s+time:?\s*(\d+)\s*(min|minutes|hour|hours|hrs?)").unwrap()
});

fn measurement_score(list_text: &str) -> usize {
    MEASUREMENT_KEYWORDS
        .iter()
        .filter(|keyword| list_text.contains(*keyword))
        .count()
}

/// The list with the strictly highest measurement score wins; ties keep the
/// earlier list, and a score of zero selects nothing.
fn find_ingredient_list<'a>(lists: &[ElementRef<'a>]) -> Option<ElementRef<'a>> {
    let mut best: Option<ElementRef> = None;
    let mut best_score = 0;

    for list in lists {
        let score = measurement_score(&element_text(*list).to_lowercase());
        if score > best_score {
            best_score = score;
            best = Some(*list);
        }
    }

    if best.is_some() {
        debug!("ingredient list selected with measurement score {best_score}");
    }
    best
}

/// First list that looks like a step sequence: at least two items, and
/// either a leading enumeration on some item or a directions keyword
/// anywhere in the list text.
fn find_instructions_list<'a>(
    lists: &[ElementRef<'a>],
    item_selector: &Selector,
) -> Option<ElementRef<'a>> {
    lists
        .iter()
        .find(|list| {
            let items: Vec<String> = list.select(item_selector).map(element_text).collect();
            if items.len() < 2 {
                return false;
            }

            let has_numbering = items
                .iter()
                .any(|item| ENUMERATION_RE.is_match(&item.to_lowercase()));
            let list_text = element_text(**list).to_lowercase();
            let has_keyword = INSTRUCTION_KEYWORDS
                .iter()
                .any(|keyword| list_text.contains(keyword));

            has_numbering || has_keyword
        })
        .copied()
}

fn list_items(list: ElementRef, item_selector: &Selector) -> Vec<String> {
    list.select(item_selector)
        .map(element_text)
        .filter(|text| !text.is_empty())
        .collect()
}

/// First non-empty of: h1 text, h2 text, og:title, document title.
fn resolve_title(document: &Html) -> String {
    let heading_candidates = ["h1", "h2"];
    for tag in heading_candidates {
        let selector = Selector::parse(tag).unwrap();
        if let Some(text) = document
            .select(&selector)
            .next()
            .map(element_text)
            .filter(|text| !text.is_empty())
        {
            return text;
        }
    }

    let og_title = Selector::parse("meta[property='og:title']").unwrap();
    if let Some(content) = document
        .select(&og_title)
        .next()
        .and_then(|el| el.value().attr("content"))
        .filter(|content| !content.trim().is_empty())
    {
        return content.to_string();
    }

    let title = Selector::parse("title").unwrap();
    document
        .select(&title)
        .next()
        .map(element_text)
        .unwrap_or_default()
}

/// og:image meta tag, else the first image inside a likely content container.
fn resolve_image(document: &Html) -> Option<String> {
    let og_image = Selector::parse("meta[property='og:image']").unwrap();
    if let Some(content) = document
        .select(&og_image)
        .next()
        .and_then(|el| el.value().attr("content"))
    {
        return Some(content.to_string());
    }

    let content_image = Selector::parse("article img, .recipe img, .post img").unwrap();
    document
        .select(&content_image)
        .next()
        .and_then(|img| img.value().attr("src"))
        .map(str::to_string)
}

fn capture_servings(page_text: &str) -> Option<u32> {
    SERVINGS_RE
        .captures(page_text)
        .and_then(|cap| cap.get(1).or_else(|| cap.get(2)).or_else(|| cap.get(3)))
        .and_then(|m| m.as_str().parse().ok())
}

fn capture_duration(page_text: &str, pattern: &Regex) -> Option<String> {
    pattern
        .captures(page_text)
        .map(|cap| format!("{} {}", &cap[1], &cap[2]))
}

impl Extractor for HeuristicExtractor {
    fn extract(&self, document: &Html) -> Option<Recipe> {
        let list_selector = Selector::parse("ul, ol").unwrap();
        let item_selector = Selector::parse("li").unwrap();
        let lists: Vec<ElementRef> = document.select(&list_selector).collect();

        let ingredients = find_ingredient_list(&lists)
            .map(|list| list_items(list, &item_selector))
            .unwrap_or_default();

        let instructions = find_instructions_list(&lists, &item_selector)
            .map(|list| list_items(list, &item_selector))
            .unwrap_or_default();

        let page_text = element_text(document.root_element());

        Some(Recipe {
            title: resolve_title(document),
            ingredients,
            instructions,
            prep_time: capture_duration(&page_text, &PREP_TIME_RE),
            cook_time: capture_duration(&page_text, &COOK_TIME_RE),
            servings: capture_servings(&page_text),
            image_url: resolve_image(document),
        })
    }
}
