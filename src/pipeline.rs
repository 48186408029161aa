use crate::error::ExtractError;
use crate::extractors::{Extractor, HeuristicExtractor, JsonLdExtractor, MicroDataExtractor};
use crate::model::Recipe;
use log::debug;
use scraper::Html;

/// Default title for pages where no usable title could be found.
const UNTITLED: &str = "Untitled Recipe";

/// Boilerplate that ad-injected recipe cards leave inside their lists.
const AD_BOILERPLATE: &str = "Advertisement";

/// Run the extraction strategies over one page of HTML, most reliable
/// first, and clean up whichever result is accepted.
///
/// A strategy's record is accepted as soon as it carries ingredients or
/// instructions; a record with both lists empty is kept only as a fallback
/// carrier for its title/timing fields while later strategies get a try.
pub fn extract_recipe(html: &str) -> Result<Recipe, ExtractError> {
    let document = Html::parse_document(html);

    let strategies: [(&str, &dyn Extractor); 3] = [
        ("json-ld", &JsonLdExtractor),
        ("microdata", &MicroDataExtractor),
        ("heuristic", &HeuristicExtractor),
    ];

    let mut candidate: Option<Recipe> = None;
    for (name, strategy) in strategies {
        match strategy.extract(&document) {
            Some(recipe) if recipe.has_content() => {
                debug!("accepted {name} result");
                candidate = Some(recipe);
                break;
            }
            Some(recipe) => {
                debug!("{name} produced an empty record, trying next strategy");
                candidate = Some(recipe);
            }
            None => {
                debug!("{name} found nothing, trying next strategy");
            }
        }
    }

    let recipe = candidate.map(finalize).ok_or(ExtractError::NoRecipeFound)?;
    if recipe.has_content() {
        Ok(recipe)
    } else {
        Err(ExtractError::NoRecipeFound)
    }
}

/// Uniform cleanup applied to whichever strategy's record was chosen.
fn finalize(mut recipe: Recipe) -> Recipe {
    let trimmed = recipe.title.trim();
    recipe.title = if trimmed.is_empty() {
        UNTITLED.to_string()
    } else {
        trimmed.to_string()
    };
    recipe.ingredients = clean_lines(recipe.ingredients);
    recipe.instructions = clean_lines(recipe.instructions);
    recipe
}

fn clean_lines(lines: Vec<String>) -> Vec<String> {
    lines
        .into_iter()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty() && line != AD_BOILERPLATE)
        .collect()
}
