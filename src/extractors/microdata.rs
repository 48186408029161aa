use crate::extractors::{element_text, parse_integer_prefix, Extractor};
use crate::model::Recipe;
use log::debug;
use scraper::{ElementRef, Html, Selector};

/// Reads `itemprop`-annotated recipe markup, scoped to the first element
/// whose `itemtype` mentions Recipe. Scoping matters: global itemprop
/// searches pick up site titles, author bios and ads.
pub struct MicroDataExtractor;

impl MicroDataExtractor {
    fn find_recipe_container<'a>(&self, document: &'a Html) -> Option<ElementRef<'a>> {
        let selector = Selector::parse("[itemtype*='Recipe']").unwrap();
        document.select(&selector).next()
    }

    fn get_itemprop(&self, root: ElementRef, prop: &str) -> Option<String> {
        let selector = Selector::parse(&format!("[itemprop='{prop}']")).unwrap();
        root.select(&selector).next().map(element_text)
    }

    fn get_itemprop_attr(&self, root: ElementRef, prop: &str, attr: &str) -> Option<String> {
        let selector = Selector::parse(&format!("[itemprop='{prop}']")).unwrap();
        root.select(&selector)
            .next()
            .and_then(|el| el.value().attr(attr))
            .map(str::to_string)
    }

    fn get_itemprop_list(&self, root: ElementRef, selector: &Selector) -> Vec<String> {
        root.select(selector)
            .map(element_text)
            .filter(|text| !text.is_empty())
            .collect()
    }
}

impl Extractor for MicroDataExtractor {
    fn extract(&self, document: &Html) -> Option<Recipe> {
        let container = self.find_recipe_container(document)?;
        debug!("Microdata recipe container found");

        // Older sites use the legacy 'ingredients' property name
        let ingredient_selector =
            Selector::parse("[itemprop='recipeIngredient'], [itemprop='ingredients']").unwrap();
        let instruction_selector = Selector::parse("[itemprop='recipeInstructions']").unwrap();

        Some(Recipe {
            title: self.get_itemprop(container, "name").unwrap_or_default(),
            ingredients: self.get_itemprop_list(container, &ingredient_selector),
            instructions: self.get_itemprop_list(container, &instruction_selector),
            prep_time: self.get_itemprop_attr(container, "prepTime", "content"),
            cook_time: self.get_itemprop_attr(container, "cookTime", "content"),
            servings: self
                .get_itemprop(container, "recipeYield")
                .as_deref()
                .and_then(parse_integer_prefix),
            image_url: self.get_itemprop_attr(container, "image", "src"),
        })
    }
}
