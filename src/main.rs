use recipe_scrape::fetch_recipe;
use std::env;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let url = args.get(1).ok_or("Please provide a URL as an argument")?;

    let recipe = fetch_recipe(url)?;
    println!("{}", serde_json::to_string_pretty(&recipe)?);

    Ok(())
}
