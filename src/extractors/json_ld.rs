use crate::extractors::{parse_integer_prefix, Extractor};
use crate::model::Recipe;
use html_escape::decode_html_entities;
use log::{debug, warn};
use scraper::{Html, Selector};
use serde::Deserialize;
use serde_json::Value;
use std::convert::TryFrom;

/// Reads schema.org `Recipe` objects out of `application/ld+json` script
/// blocks. This is the most reliable strategy when a site provides it.
pub struct JsonLdExtractor;

/// The subset of a schema.org Recipe object this crate consumes. Field
/// shapes vary wildly between sites, so every field is an optional,
/// permissive variant type; a mistyped field reads as absent instead of
/// failing the whole object.
#[derive(Debug, Deserialize)]
struct JsonLdRecipe {
    name: Option<String>,
    #[serde(rename = "recipeIngredient")]
    recipe_ingredient: Option<IngredientList>,
    #[serde(rename = "recipeInstructions")]
    recipe_instructions: Option<InstructionList>,
    #[serde(rename = "prepTime")]
    prep_time: Option<String>,
    #[serde(rename = "cookTime")]
    cook_time: Option<String>,
    #[serde(rename = "recipeYield")]
    recipe_yield: Option<RecipeYield>,
    image: Option<ImageField>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum IngredientList {
    Strings(Vec<String>),
    // recipeIngredient sometimes appears as a single string or an object
    // list; anything that is not an array of strings maps to no ingredients
    Other(Value),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InstructionList {
    Steps(Vec<InstructionEntry>),
    Other(Value),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InstructionEntry {
    Text(String),
    Step(StepObject),
    Other(Value),
}

#[derive(Debug, Deserialize)]
struct StepObject {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecipeYield {
    Number(i64),
    Text(String),
    List(Vec<String>),
    Other(Value),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ImageField {
    Url(String),
    Object(ImageObject),
    MultipleUrls(Vec<String>),
    MultipleObjects(Vec<ImageObject>),
    Other(Value),
}

#[derive(Debug, Deserialize)]
struct ImageObject {
    url: Option<String>,
}

impl TryFrom<&Value> for JsonLdRecipe {
    type Error = serde_json::Error;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        serde_json::from_value(value.clone())
    }
}

fn decode_html_symbols(text: &str) -> String {
    decode_html_entities(text).into_owned()
}

impl From<JsonLdRecipe> for Recipe {
    fn from(recipe: JsonLdRecipe) -> Self {
        let ingredients = match recipe.recipe_ingredient {
            Some(IngredientList::Strings(list)) => list
                .into_iter()
                .map(|ing| decode_html_symbols(&ing))
                .collect(),
            _ => Vec::new(),
        };

        let instructions = match recipe.recipe_instructions {
            Some(InstructionList::Steps(steps)) => steps
                .into_iter()
                .map(|step| match step {
                    InstructionEntry::Text(text) => decode_html_symbols(&text),
                    InstructionEntry::Step(obj) => {
                        decode_html_symbols(&obj.text.unwrap_or_default())
                    }
                    InstructionEntry::Other(_) => String::new(),
                })
                .collect(),
            _ => Vec::new(),
        };

        let servings = recipe.recipe_yield.as_ref().and_then(|y| match y {
            RecipeYield::Number(n) => u32::try_from(*n).ok(),
            RecipeYield::Text(text) => parse_integer_prefix(text),
            RecipeYield::List(items) => items.first().and_then(|s| parse_integer_prefix(s)),
            RecipeYield::Other(_) => None,
        });

        let image_url = recipe.image.and_then(|img| match img {
            ImageField::Url(url) => Some(decode_html_symbols(&url)),
            ImageField::Object(obj) => obj.url,
            ImageField::MultipleUrls(urls) => {
                urls.into_iter().next().map(|u| decode_html_symbols(&u))
            }
            ImageField::MultipleObjects(objs) => objs.into_iter().next().and_then(|o| o.url),
            ImageField::Other(_) => None,
        });

        Recipe {
            title: recipe
                .name
                .as_deref()
                .map(decode_html_symbols)
                .unwrap_or_default(),
            ingredients,
            instructions,
            prep_time: recipe.prep_time,
            cook_time: recipe.cook_time,
            servings,
            image_url,
        }
    }
}

fn is_recipe_type(value: &Value) -> bool {
    value.get("@type").and_then(Value::as_str) == Some("Recipe")
}

/// Locate the Recipe object inside one parsed JSON-LD value: a bare array
/// of typed objects, a `@graph` wrapper, or the object itself.
fn find_recipe_node(json_ld: &Value) -> Option<&Value> {
    if let Some(items) = json_ld.as_array() {
        return items.iter().find(|item| is_recipe_type(item));
    }
    if let Some(graph) = json_ld.get("@graph").and_then(Value::as_array) {
        return graph.iter().find(|item| is_recipe_type(item));
    }
    if is_recipe_type(json_ld) {
        return Some(json_ld);
    }
    None
}

/// Sites wrap JSON-LD in HTML comments or leave trailing commas often
/// enough that a light cleanup pass pays for itself before parsing.
fn sanitize_json(json_str: &str) -> String {
    json_str
        .trim()
        .replace("<!--", "")
        .replace("-->", "")
        .replace(",]", "]")
        .replace(",}", "}")
}

impl Extractor for JsonLdExtractor {
    fn extract(&self, document: &Html) -> Option<Recipe> {
        let selector = Selector::parse("script[type='application/ld+json']").unwrap();

        for script in document.select(&selector) {
            let cleaned_json = sanitize_json(&script.inner_html());
            let json_ld: Value = match serde_json::from_str(&cleaned_json) {
                Ok(value) => value,
                Err(e) => {
                    warn!("Skipping unparseable JSON-LD block: {e}");
                    continue;
                }
            };

            let Some(node) = find_recipe_node(&json_ld) else {
                continue;
            };

            // First matching block wins; later blocks are never consulted,
            // even when this one fails to deserialize.
            return match JsonLdRecipe::try_from(node) {
                Ok(recipe) => {
                    debug!("JSON-LD recipe found: {:?}", recipe.name);
                    Some(Recipe::from(recipe))
                }
                Err(e) => {
                    warn!("JSON-LD Recipe object did not deserialize: {e}");
                    None
                }
            };
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn create_html_document(json_ld: &str) -> Html {
        let html = format!(
            r#"
            <!DOCTYPE html>
            <html>
            <head>
                <script type="application/ld+json">
                    {json_ld}
                </script>
            </head>
            <body></body>
            </html>
            "#
        );
        Html::parse_document(&html)
    }

    #[test]
    fn test_parse_basic_recipe() {
        let json_ld = r#"
        {
            "@context": "https://schema.org/",
            "@type": "Recipe",
            "name": "Soup",
            "recipeIngredient": ["1 cup broth"],
            "recipeInstructions": ["Boil it"]
        }
        "#;
        let document = create_html_document(json_ld);

        let recipe = JsonLdExtractor.extract(&document).unwrap();

        assert_eq!(recipe.title, "Soup");
        assert_eq!(recipe.ingredients, vec!["1 cup broth"]);
        assert_eq!(recipe.instructions, vec!["Boil it"]);
        assert_eq!(recipe.servings, None);
        assert_eq!(recipe.image_url, None);
    }

    #[test]
    fn test_parse_full_recipe_with_step_objects() {
        let json_ld = r#"
        {
            "@context": "https://schema.org/",
            "@type": "Recipe",
            "name": "Pasta Carbonara",
            "image": ["https://example.com/carbonara1.jpg", "https://example.com/carbonara2.jpg"],
            "recipeIngredient": ["spaghetti", "eggs", "bacon", "cheese"],
            "recipeInstructions": [
                {"@type": "HowToStep", "text": "Cook pasta"},
                {"@type": "HowToStep", "text": "Fry bacon"},
                "Combine all ingredients"
            ],
            "prepTime": "PT15M",
            "cookTime": "PT20M",
            "recipeYield": "4 servings"
        }
        "#;
        let document = create_html_document(json_ld);

        let recipe = JsonLdExtractor.extract(&document).unwrap();

        assert_eq!(recipe.title, "Pasta Carbonara");
        assert_eq!(
            recipe.ingredients,
            vec!["spaghetti", "eggs", "bacon", "cheese"]
        );
        assert_eq!(
            recipe.instructions,
            vec!["Cook pasta", "Fry bacon", "Combine all ingredients"]
        );
        assert_eq!(recipe.prep_time.as_deref(), Some("PT15M"));
        assert_eq!(recipe.cook_time.as_deref(), Some("PT20M"));
        assert_eq!(recipe.servings, Some(4));
        assert_eq!(
            recipe.image_url.as_deref(),
            Some("https://example.com/carbonara1.jpg")
        );
    }

    #[test]
    fn test_parse_recipe_inside_graph() {
        let json_ld = r#"
        {
            "@context": "https://schema.org/",
            "@graph": [
                {"@type": "WebSite", "name": "Some Food Blog"},
                {
                    "@type": "Recipe",
                    "name": "Banana Bread",
                    "recipeIngredient": ["3 bananas", "2 cups flour"],
                    "recipeInstructions": [{"text": "Mash"}, {"text": "Bake"}]
                }
            ]
        }
        "#;
        let document = create_html_document(json_ld);

        let recipe = JsonLdExtractor.extract(&document).unwrap();

        assert_eq!(recipe.title, "Banana Bread");
        assert_eq!(recipe.ingredients, vec!["3 bananas", "2 cups flour"]);
        assert_eq!(recipe.instructions, vec!["Mash", "Bake"]);
    }

    #[test]
    fn test_parse_recipe_in_top_level_array() {
        let json_ld = r#"
        [
            {"@type": "BreadcrumbList", "itemListElement": []},
            {
                "@type": "Recipe",
                "name": "Pancakes",
                "recipeIngredient": ["1 cup flour"],
                "recipeInstructions": ["Fry"]
            }
        ]
        "#;
        let document = create_html_document(json_ld);

        let recipe = JsonLdExtractor.extract(&document).unwrap();
        assert_eq!(recipe.title, "Pancakes");
    }

    #[test]
    fn test_malformed_block_is_skipped() {
        let html = r#"
            <html>
            <head>
                <script type="application/ld+json">{this is not json</script>
                <script type="application/ld+json">
                {
                    "@type": "Recipe",
                    "name": "Survivor",
                    "recipeIngredient": ["1 tsp salt"],
                    "recipeInstructions": ["Season"]
                }
                </script>
            </head>
            <body></body>
            </html>
        "#;
        let document = Html::parse_document(html);

        let recipe = JsonLdExtractor.extract(&document).unwrap();
        assert_eq!(recipe.title, "Survivor");
    }

    #[test]
    fn test_first_matching_block_wins() {
        let html = r#"
            <html>
            <head>
                <script type="application/ld+json">
                {"@type": "Recipe", "name": "First", "recipeIngredient": ["a"], "recipeInstructions": ["x"]}
                </script>
                <script type="application/ld+json">
                {"@type": "Recipe", "name": "Second", "recipeIngredient": ["b"], "recipeInstructions": ["y"]}
                </script>
            </head>
            <body></body>
            </html>
        "#;
        let document = Html::parse_document(html);

        let recipe = JsonLdExtractor.extract(&document).unwrap();
        assert_eq!(recipe.title, "First");
    }

    #[test]
    fn test_non_array_fields_map_to_empty() {
        let json_ld = r#"
        {
            "@type": "Recipe",
            "name": "Odd Shapes",
            "recipeIngredient": "1 cup flour",
            "recipeInstructions": "Mix and bake."
        }
        "#;
        let document = create_html_document(json_ld);

        let recipe = JsonLdExtractor.extract(&document).unwrap();

        assert_eq!(recipe.title, "Odd Shapes");
        assert!(recipe.ingredients.is_empty());
        assert!(recipe.instructions.is_empty());
    }

    #[test]
    fn test_yield_variants() {
        for (yield_json, expected) in [
            (r#""4 servings""#, Some(4)),
            (r#"6"#, Some(6)),
            (r#"["12 cookies", "12"]"#, Some(12)),
            (r#""Serves four""#, None),
            (r#"{"value": 8}"#, None),
        ] {
            let json_ld = format!(
                r#"{{"@type": "Recipe", "name": "Yields", "recipeYield": {yield_json},
                    "recipeIngredient": ["x"], "recipeInstructions": ["y"]}}"#
            );
            let document = create_html_document(&json_ld);
            let recipe = JsonLdExtractor.extract(&document).unwrap();
            assert_eq!(recipe.servings, expected, "yield {yield_json}");
        }
    }

    #[test]
    fn test_html_entities_are_decoded() {
        let json_ld = r#"
        {
            "@type": "Recipe",
            "name": "Mac &amp; Cheese",
            "recipeIngredient": ["1 cup macaroni &amp; shells"],
            "recipeInstructions": ["Boil &amp; drain"]
        }
        "#;
        let document = create_html_document(json_ld);

        let recipe = JsonLdExtractor.extract(&document).unwrap();

        assert_eq!(recipe.title, "Mac & Cheese");
        assert_eq!(recipe.ingredients, vec!["1 cup macaroni & shells"]);
        assert_eq!(recipe.instructions, vec!["Boil & drain"]);
    }

    #[test]
    fn test_no_recipe_type_yields_nothing() {
        let json_ld = r#"{"@type": "NewsArticle", "headline": "Ten soups ranked"}"#;
        let document = create_html_document(json_ld);

        assert!(JsonLdExtractor.extract(&document).is_none());
    }

    #[test]
    fn test_step_object_without_text_maps_to_empty_string() {
        let json_ld = r#"
        {
            "@type": "Recipe",
            "name": "Sparse Steps",
            "recipeInstructions": [{"name": "Prep"}, {"text": "Cook"}]
        }
        "#;
        let document = create_html_document(json_ld);

        let recipe = JsonLdExtractor.extract(&document).unwrap();
        assert_eq!(recipe.instructions, vec!["", "Cook"]);
    }
}
