//! Spoonacular recipe lookup (complexSearch endpoint) and the mapper that
//! reshapes its nutrient-fact lists into the fixed seven-field bundle the
//! rest of the system expects.

use crate::api::{ApiError, classify_transport, remote_message};
use crate::models::{NutrientAmount, NutrientBundle, RecipeHit};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

const BASE_URL: &str = "https://api.spoonacular.com/recipes/complexSearch";

/// How many candidate recipes to request per query.
const RESULT_COUNT: u32 = 5;

/// Broad cuisine filter carried over from the product's target audience.
const CUISINE_FILTER: &str = "Indian,Asian,Middle Eastern,European,American";

/// Outcome of a recipe lookup. "No matches" is its own variant, distinct both
/// from an empty success list and from an [`ApiError`], so the caller can
/// prompt the user to refine the query rather than report a failure.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    Recipes(Vec<RecipeHit>),
    NoMatches,
}

// Wire shapes for the complexSearch response; only the fields we read.

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(default = "unknown_title")]
    title: String,
    #[serde(default)]
    nutrition: NutritionBlock,
}

fn unknown_title() -> String {
    "Unknown Recipe".to_string()
}

#[derive(Debug, Deserialize, Default)]
struct NutritionBlock {
    #[serde(default)]
    nutrients: Vec<NutrientFact>,
}

#[derive(Debug, Deserialize)]
struct NutrientFact {
    name: String,
    #[serde(default)]
    amount: f64,
}

/// Client for the recipe lookup service. Cheap to clone; the underlying
/// reqwest client is shared.
#[derive(Debug, Clone)]
pub struct RecipeClient {
    http: Client,
    api_key: String,
}

impl RecipeClient {
    /// Builds a client with the given key and a fixed request timeout.
    #[must_use]
    pub fn new(api_key: &str, timeout: Duration) -> Self {
        let http = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            http,
            api_key: api_key.trim().to_string(),
        }
    }

    /// Installs a new API key, e.g. after the user edits settings.
    pub fn set_api_key(&mut self, api_key: &str) {
        self.api_key = api_key.trim().to_string();
    }

    /// Searches for recipes matching a free-text meal description.
    ///
    /// # Errors
    ///
    /// `EmptyQuery` / `MissingKey` before any request is made; `InvalidKey`
    /// (401), `QuotaExceeded` (402) or `Remote` for other rejections; and
    /// `Timeout` / `Connection` / `Parse` for local transport failures.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<LookupOutcome, ApiError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ApiError::EmptyQuery);
        }
        if self.api_key.is_empty() {
            warn!("Recipe lookup attempted without an API key");
            return Err(ApiError::MissingKey);
        }

        debug!("Sending complexSearch request for '{}'", query);
        let response = self
            .http
            .get(BASE_URL)
            .query(&[
                ("apiKey", self.api_key.as_str()),
                ("query", query),
                ("addRecipeNutrition", "true"),
                ("number", &RESULT_COUNT.to_string()),
                ("cuisine", CUISINE_FILTER),
            ])
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status();
        debug!("Spoonacular response status: {}", status);
        match status {
            StatusCode::UNAUTHORIZED => return Err(ApiError::InvalidKey),
            StatusCode::PAYMENT_REQUIRED => return Err(ApiError::QuotaExceeded),
            s if s.is_client_error() || s.is_server_error() => {
                let body = response.text().await.unwrap_or_default();
                return Err(ApiError::Remote {
                    status: s.as_u16(),
                    message: remote_message(&body),
                });
            }
            _ => {}
        }

        let parsed: SearchResponse = response.json().await.map_err(classify_transport)?;
        let outcome = map_search_response(parsed);
        if let LookupOutcome::Recipes(hits) = &outcome {
            info!("Recipe lookup for '{}' returned {} candidates", query, hits.len());
        } else {
            info!("Recipe lookup for '{}' found no matches", query);
        }
        Ok(outcome)
    }
}

/// Canonical nutrient names looked up case-sensitively in each result's fact
/// list, paired with the unit used when the fact is absent.
const CANONICAL_NUTRIENTS: [(&str, &str); 7] = [
    ("Calories", "kcal"),
    ("Protein", "g"),
    ("Carbohydrates", "g"),
    ("Fat", "g"),
    ("Fiber", "g"),
    ("Sugar", "g"),
    ("Sodium", "mg"),
];

/// Reshapes a raw search response into mapped recipe candidates.
///
/// Pure with respect to its input: same response, same bundles. An empty
/// result list becomes [`LookupOutcome::NoMatches`].
#[must_use]
pub fn map_search_response(response: SearchResponse) -> LookupOutcome {
    if response.results.is_empty() {
        return LookupOutcome::NoMatches;
    }

    let hits = response
        .results
        .into_iter()
        .map(|item| {
            let lookup = |canonical: (&str, &str)| {
                let (name, unit) = canonical;
                let quantity = item
                    .nutrition
                    .nutrients
                    .iter()
                    .find(|n| n.name == name)
                    .map_or(0.0, |n| n.amount);
                NutrientAmount::new(quantity, unit)
            };

            let calories = lookup(CANONICAL_NUTRIENTS[0]);
            #[allow(clippy::cast_possible_truncation)]
            let rounded_calories = calories.quantity.round() as i64;
            RecipeHit {
                title: item.title.clone(),
                calories: rounded_calories,
                nutrients: NutrientBundle {
                    calories,
                    protein: lookup(CANONICAL_NUTRIENTS[1]),
                    carbs: lookup(CANONICAL_NUTRIENTS[2]),
                    fat: lookup(CANONICAL_NUTRIENTS[3]),
                    fiber: lookup(CANONICAL_NUTRIENTS[4]),
                    sugar: lookup(CANONICAL_NUTRIENTS[5]),
                    sodium: lookup(CANONICAL_NUTRIENTS[6]),
                },
            }
        })
        .collect();

    LookupOutcome::Recipes(hits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response_from(value: serde_json::Value) -> SearchResponse {
        serde_json::from_value(value).expect("test fixture should deserialize")
    }

    #[test]
    fn maps_present_and_missing_nutrients() {
        let response = response_from(json!({
            "results": [{
                "title": "Masala Chickpeas",
                "nutrition": {
                    "nutrients": [
                        {"name": "Calories", "amount": 250.0, "unit": "kcal"},
                        {"name": "Protein", "amount": 12.5, "unit": "g"}
                    ]
                }
            }]
        }));

        let LookupOutcome::Recipes(hits) = map_search_response(response) else {
            panic!("Expected recipes");
        };
        assert_eq!(hits.len(), 1);
        let hit = &hits[0];
        assert_eq!(hit.title, "Masala Chickpeas");
        assert_eq!(hit.calories, 250);
        assert_eq!(hit.nutrients.protein, NutrientAmount::new(12.5, "g"));
        // Absent facts default to 0 with the field's expected unit
        assert_eq!(hit.nutrients.fat, NutrientAmount::new(0.0, "g"));
        assert_eq!(hit.nutrients.carbs, NutrientAmount::new(0.0, "g"));
        assert_eq!(hit.nutrients.fiber, NutrientAmount::new(0.0, "g"));
        assert_eq!(hit.nutrients.sugar, NutrientAmount::new(0.0, "g"));
        assert_eq!(hit.nutrients.sodium, NutrientAmount::new(0.0, "mg"));
    }

    #[test]
    fn nutrient_name_lookup_is_case_sensitive() {
        let response = response_from(json!({
            "results": [{
                "title": "Mystery Bowl",
                "nutrition": {
                    "nutrients": [
                        {"name": "calories", "amount": 900.0, "unit": "kcal"},
                        {"name": "PROTEIN", "amount": 50.0, "unit": "g"}
                    ]
                }
            }]
        }));

        let LookupOutcome::Recipes(hits) = map_search_response(response) else {
            panic!("Expected recipes");
        };
        assert_eq!(hits[0].calories, 0, "Only exact canonical names match");
        assert_eq!(hits[0].nutrients.protein.quantity, 0.0);
    }

    #[test]
    fn calories_is_the_rounded_integer_of_the_amount() {
        let response = response_from(json!({
            "results": [{
                "title": "Halfway",
                "nutrition": {
                    "nutrients": [{"name": "Calories", "amount": 249.6, "unit": "kcal"}]
                }
            }]
        }));

        let LookupOutcome::Recipes(hits) = map_search_response(response) else {
            panic!("Expected recipes");
        };
        assert_eq!(hits[0].calories, 250);
        assert_eq!(hits[0].nutrients.calories.quantity, 249.6);
    }

    #[test]
    fn empty_result_list_is_no_matches_not_empty_success() {
        assert_eq!(
            map_search_response(response_from(json!({"results": []}))),
            LookupOutcome::NoMatches
        );
        // A response with the list missing entirely behaves the same
        assert_eq!(
            map_search_response(response_from(json!({}))),
            LookupOutcome::NoMatches
        );
    }

    #[test]
    fn missing_title_and_nutrition_get_defaults() {
        let response = response_from(json!({"results": [{}]}));
        let LookupOutcome::Recipes(hits) = map_search_response(response) else {
            panic!("Expected recipes");
        };
        assert_eq!(hits[0].title, "Unknown Recipe");
        assert_eq!(hits[0].calories, 0);
    }

    #[tokio::test]
    async fn search_refuses_blank_query_and_missing_key_locally() {
        let client = RecipeClient::new("key", Duration::from_secs(1));
        assert!(matches!(
            client.search("   ").await,
            Err(ApiError::EmptyQuery)
        ));

        let keyless = RecipeClient::new("  ", Duration::from_secs(1));
        assert!(matches!(
            keyless.search("dal").await,
            Err(ApiError::MissingKey)
        ));
    }
}
