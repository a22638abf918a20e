use crate::database::RecipeDatabase;
use crate::model::Recipe;

mod model;

use model::*;

/// Which part of the database a search covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchFilter {
    #[default]
    All,
    Craftable,
    Gatherable,
}

impl SearchFilter {
    fn accepts(self, recipe: &Recipe) -> bool {
        match self {
            SearchFilter::All => true,
            SearchFilter::Craftable => recipe.is_craftable(),
            SearchFilter::Gatherable => !recipe.is_craftable(),
        }
    }
}

/// Search item names, best matches first
///
/// An empty query matches every item of the filter, sorted by name.
pub fn search(database: &RecipeDatabase, query: &str, filter: SearchFilter) -> Vec<String> {
    let query_lower = query.to_lowercase();
    let terms: Vec<String> = query_lower.split_whitespace().map(String::from).collect();
    let mut scored_results = vec![];

    for recipe in database.iter().filter(|recipe| filter.accepts(recipe)) {
        let mut result = SearchResult::new(recipe.name.clone());

        // Score based on name match (using full query)
        result.add_score(score_name_match(&recipe.name, &query_lower));

        // Score based on ingredient matches (using individual terms)
        result.add_score(score_ingredient_matches(recipe, &terms));

        if result.score > 0.0 {
            scored_results.push(result);
        }
    }

    sort_results(&mut scored_results);
    scored_results.into_iter().map(|r| r.name).collect()
}

/// Calculate score for item name matches
fn score_name_match(name: &str, query: &str) -> f64 {
    let name = name.to_lowercase();
    if name == query {
        20.0 // Highest score for exact match
    } else if name.contains(query) {
        10.0 // High score for partial match
    } else {
        0.0
    }
}

/// Calculate score for ingredient name matches
fn score_ingredient_matches(recipe: &Recipe, terms: &[String]) -> f64 {
    let matches = count_matches(recipe, terms);
    if matches > 0 {
        // Base score for having any match
        let mut score = 1.0;
        // Additional score for multiple matches (capped)
        score += (0.1 * matches as f64).min(5.0);
        score
    } else {
        0.0
    }
}

/// Count how many times the terms appear in the ingredient names
fn count_matches(recipe: &Recipe, terms: &[String]) -> usize {
    recipe
        .items
        .keys()
        .map(|name| {
            let name = name.to_lowercase();
            terms
                .iter()
                .map(|term| name.matches(term.as_str()).count())
                .sum::<usize>()
        })
        .sum()
}

/// Sort search results by score in descending order
fn sort_results(results: &mut [SearchResult]) {
    results.sort_unstable_by(|a, b| {
        // First sort by score (highest first)
        let score_cmp = b
            .score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal);

        if score_cmp != std::cmp::Ordering::Equal {
            return score_cmp;
        }

        // If scores are equal, sort by name
        a.name.to_lowercase().cmp(&b.name.to_lowercase())
    });
}
