//! Startup discovery through the Google Maps Places API. Few reviews is
//! used as a proxy for "small company" — the kind that posts openings on
//! its own site long before any job board.
use anyhow::{anyhow, Result};
use reqwest::Client;
use serde_json::Value;

use crate::config::SourcesConfig;

const GEOCODE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";
const NEARBY_URL: &str = "https://maps.googleapis.com/maps/api/place/nearbysearch/json";

const SEARCH_RADIUS_METERS: u32 = 10_000;
const SMALL_COMPANY_REVIEW_CEILING: u64 = 100;

pub async fn find_startups(
    client: &Client,
    config: &SourcesConfig,
    industry: &str,
    location: &str,
    max_results: usize,
) -> Result<String> {
    let api_key = match &config.google_maps_api_key {
        Some(key) => key,
        None => {
            return Ok(format!(
                "Google Maps API key not configured.\n\
                 To enable startup discovery:\n\
                 1. Go to https://console.cloud.google.com\n\
                 2. Enable 'Places API'\n\
                 3. Create an API key and set it as GOOGLE_MAPS_API_KEY\n\n\
                 Manual alternative: search Google Maps for '{} {}' and look for \
                 companies with few reviews (these are likely startups).",
                industry, location
            ))
        }
    };

    // Resolve the location to coordinates first.
    let geo: Value = client
        .get(GEOCODE_URL)
        .query(&[("address", location), ("key", api_key)])
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    let point = match geo.pointer("/results/0/geometry/location") {
        Some(point) => point,
        None => return Ok(format!("Could not find location: {}", location)),
    };
    let lat = point["lat"].as_f64().ok_or_else(|| anyhow!("bad geocode response"))?;
    let lng = point["lng"].as_f64().ok_or_else(|| anyhow!("bad geocode response"))?;

    let coords = format!("{},{}", lat, lng);
    let radius = SEARCH_RADIUS_METERS.to_string();
    let places: Value = client
        .get(NEARBY_URL)
        .query(&[
            ("location", coords.as_str()),
            ("radius", radius.as_str()),
            ("keyword", industry),
            ("type", "establishment"),
            ("key", api_key),
        ])
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    let all: Vec<Value> = places
        .get("results")
        .and_then(|r| r.as_array())
        .cloned()
        .unwrap_or_default();

    if all.is_empty() {
        return Ok(format!(
            "No companies found for '{}' in '{}'",
            industry, location
        ));
    }

    // Few reviews = less established = likely smaller. Places that report
    // no count at all are treated as established, not as tiny.
    let mut small: Vec<&Value> = all
        .iter()
        .filter(|p| {
            p.get("user_ratings_total")
                .and_then(|v| v.as_u64())
                .unwrap_or(999)
                < SMALL_COMPANY_REVIEW_CEILING
        })
        .collect();
    small.sort_by_key(|p| reviews(p));
    if small.len() < 3 {
        small = all.iter().collect();
    }

    let shown = small.len().min(max_results);
    let mut output = vec![format!(
        "Found {} small/startup companies for '{}' in '{}':\n",
        shown, industry, location
    )];

    for (i, place) in small.iter().take(max_results).enumerate() {
        let place_id = place.get("place_id").and_then(|v| v.as_str()).unwrap_or("");
        output.push(format!(
            "{}. {}\n   Address:  {}\n   Rating:   {}/5 ({} reviews)\n   Maps:     https://maps.google.com/?place_id={}\n",
            i + 1,
            place.get("name").and_then(|v| v.as_str()).unwrap_or("Unknown"),
            place
                .get("vicinity")
                .and_then(|v| v.as_str())
                .unwrap_or("Address not available"),
            place
                .get("rating")
                .map(|r| r.to_string())
                .unwrap_or_else(|| "No rating".to_string()),
            reviews(place),
            place_id,
        ));
    }

    output.push(
        "\nTip: visit these companies' websites and look for a 'Careers' or 'Jobs' page — \
         startups often post there first!"
            .to_string(),
    );
    Ok(output.join("\n"))
}

fn reviews(place: &Value) -> u64 {
    place
        .get("user_ratings_total")
        .and_then(|v| v.as_u64())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_key_returns_instructions() {
        let client = Client::new();
        let config = SourcesConfig::default();
        let result = find_startups(&client, &config, "software startup", "Berlin", 10)
            .await
            .unwrap();

        assert!(result.contains("GOOGLE_MAPS_API_KEY"));
        assert!(result.contains("software startup Berlin"));
    }

    #[test]
    fn test_reviews_defaults_to_zero() {
        assert_eq!(reviews(&serde_json::json!({})), 0);
        assert_eq!(reviews(&serde_json::json!({"user_ratings_total": 42})), 42);
    }
}
