//! Job-board connectors. Each returns a readable text block the model can
//! reason over, or an error the executor converts into tool-result text.
use anyhow::{anyhow, Result};
use reqwest::Client;
use serde_json::Value;

use crate::config::SourcesConfig;

const ADZUNA_HOST: &str = "https://api.adzuna.com";
const REMOTEOK_API: &str = "https://remoteok.com/api";
const HN_SEARCH_API: &str = "https://hn.algolia.com/api/v1/search_by_date";

/// Search Adzuna for fresh postings, newest first.
pub async fn search_adzuna(
    client: &Client,
    config: &SourcesConfig,
    keywords: &str,
    location: &str,
    max_days_old: u32,
) -> Result<String> {
    let (app_id, app_key) = match (&config.adzuna_app_id, &config.adzuna_app_key) {
        (Some(id), Some(key)) => (id, key),
        _ => {
            return Ok(
                "Adzuna API keys not configured. Set ADZUNA_APP_ID and ADZUNA_APP_KEY \
                 (free keys at https://developer.adzuna.com/signup)."
                    .to_string(),
            )
        }
    };

    let country = detect_country(location);
    let url = format!("{}/v1/api/jobs/{}/search/1", ADZUNA_HOST, country);

    let max_days = max_days_old.to_string();
    let mut request = client.get(&url).query(&[
        ("app_id", app_id.as_str()),
        ("app_key", app_key.as_str()),
        ("results_per_page", "20"),
        ("what", keywords),
        ("max_days_old", max_days.as_str()),
        ("sort_by", "date"),
    ]);
    if !location.is_empty() {
        request = request.query(&[("where", location)]);
    }

    let response = request.send().await?;
    let status = response.status();
    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return Ok("Adzuna API key error. Check ADZUNA_APP_ID and ADZUNA_APP_KEY; \
                   get free keys at https://developer.adzuna.com/signup."
            .to_string());
    }
    if !status.is_success() {
        return Err(anyhow!("job board API error: HTTP {}", status));
    }

    let data: Value = response.json().await?;
    let jobs = data
        .get("results")
        .and_then(|r| r.as_array())
        .cloned()
        .unwrap_or_default();

    if jobs.is_empty() {
        return Ok(format!(
            "No jobs found for '{}' in '{}' in the last {} day(s).",
            keywords, location, max_days_old
        ));
    }

    let mut output = vec![format!("Found {} jobs for '{}':\n", jobs.len(), keywords)];
    for job in &jobs {
        let posted = job.get("created").and_then(|v| v.as_str()).unwrap_or("");
        output.push(format!(
            "- {}\n  Company:  {}\n  Location: {}\n  Posted:   {}\n  Link:     {}\n",
            job.get("title").and_then(|v| v.as_str()).unwrap_or("N/A"),
            job.pointer("/company/display_name")
                .and_then(|v| v.as_str())
                .unwrap_or("N/A"),
            job.pointer("/location/display_name")
                .and_then(|v| v.as_str())
                .unwrap_or("N/A"),
            if posted.len() >= 10 { &posted[..10] } else { "Unknown date" },
            job.get("redirect_url")
                .and_then(|v| v.as_str())
                .unwrap_or("N/A"),
        ));
    }

    Ok(output.join("\n"))
}

/// Map common location names to Adzuna country codes, defaulting to "us".
pub fn detect_country(location: &str) -> &'static str {
    let location = location.to_lowercase();
    let country_map: &[(&str, &str)] = &[
        ("uk", "gb"),
        ("united kingdom", "gb"),
        ("london", "gb"),
        ("manchester", "gb"),
        ("usa", "us"),
        ("united states", "us"),
        ("new york", "us"),
        ("san francisco", "us"),
        ("austin", "us"),
        ("chicago", "us"),
        ("canada", "ca"),
        ("toronto", "ca"),
        ("vancouver", "ca"),
        ("australia", "au"),
        ("sydney", "au"),
        ("melbourne", "au"),
        ("germany", "de"),
        ("berlin", "de"),
        ("munich", "de"),
        ("france", "fr"),
        ("paris", "fr"),
        ("india", "in"),
        ("bangalore", "in"),
        ("mumbai", "in"),
        ("netherlands", "nl"),
        ("amsterdam", "nl"),
    ];
    for (name, code) in country_map {
        if location.contains(name) {
            return code;
        }
    }
    "us"
}

/// RemoteOK's public JSON API — remote-only tech jobs, updated frequently.
pub async fn search_remoteok(client: &Client, keywords: &str, max_results: usize) -> Result<String> {
    let response = client
        .get(REMOTEOK_API)
        .header("Accept", "application/json")
        .send()
        .await?
        .error_for_status()?;
    let data: Vec<Value> = response.json().await?;

    // The first item is a legal notice, jobs have a position field.
    let jobs: Vec<&Value> = data
        .iter()
        .filter(|j| j.get("position").and_then(|p| p.as_str()).is_some())
        .collect();

    let kw_lower: Vec<String> = keywords
        .to_lowercase()
        .split_whitespace()
        .map(String::from)
        .collect();
    let mut matched: Vec<&Value> = jobs
        .iter()
        .copied()
        .filter(|job| {
            let tags = job
                .get("tags")
                .and_then(|t| t.as_array())
                .map(|tags| {
                    tags.iter()
                        .filter_map(|t| t.as_str())
                        .collect::<Vec<_>>()
                        .join(" ")
                })
                .unwrap_or_default();
            let haystack = format!(
                "{} {} {}",
                job.get("position").and_then(|v| v.as_str()).unwrap_or(""),
                job.get("description").and_then(|v| v.as_str()).unwrap_or(""),
                tags
            )
            .to_lowercase();
            kw_lower.iter().any(|kw| haystack.contains(kw))
        })
        .collect();

    // No keyword match: fall back to the most recent postings.
    if matched.is_empty() {
        matched = jobs.into_iter().take(max_results).collect();
    }

    let mut out = vec![format!("RemoteOK jobs for '{}' (remote only):\n", keywords)];
    for (i, job) in matched.iter().take(max_results).enumerate() {
        let tags = job
            .get("tags")
            .and_then(|t| t.as_array())
            .map(|tags| {
                tags.iter()
                    .filter_map(|t| t.as_str())
                    .take(4)
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .unwrap_or_default();
        let posted = job
            .get("date")
            .and_then(|v| v.as_str())
            .map(|d| if d.len() >= 10 { &d[..10] } else { d })
            .unwrap_or("Recently");
        out.push(format!(
            "{}. {}\n   Company: {}\n   Tags:    {}\n   Posted:  {}\n   Link:    https://remoteok.com/remote-jobs/{}\n",
            i + 1,
            job.get("position").and_then(|v| v.as_str()).unwrap_or("N/A"),
            job.get("company").and_then(|v| v.as_str()).unwrap_or("N/A"),
            tags,
            posted,
            job.get("id")
                .map(|id| id.to_string().trim_matches('"').to_string())
                .unwrap_or_default(),
        ));
    }
    out.push(format!(
        "Browse more: https://remoteok.com/?q={}",
        keywords.replace(' ', "+")
    ));
    Ok(out.join("\n"))
}

/// Scrape Wellfound for startup roles. They render heavily with JavaScript,
/// so when nothing extractable comes back we hand the model a direct search
/// link instead.
pub async fn search_wellfound(
    client: &Client,
    keywords: &str,
    location: &str,
    max_results: usize,
) -> Result<String> {
    let role_slug = keywords.to_lowercase().replace(' ', "-");
    let urls = [
        format!("https://wellfound.com/role/r/{}", role_slug),
        format!(
            "https://wellfound.com/jobs?q={}&l={}",
            keywords.replace(' ', "+"),
            location.replace(' ', "+")
        ),
    ];

    for url in &urls {
        let response = match client.get(url).send().await {
            Ok(response) if response.status().is_success() => response,
            _ => continue,
        };
        let body = match response.text().await {
            Ok(body) => body,
            Err(_) => continue,
        };

        let jobs = extract_job_cards(&body, max_results);
        if !jobs.is_empty() {
            let mut out = vec![format!("Wellfound startup jobs for '{}':\n", keywords)];
            for (i, job) in jobs.iter().enumerate() {
                out.push(format!("{}. {}", i + 1, job));
            }
            out.push(format!("\nView more: {}", url));
            return Ok(out.join("\n"));
        }
    }

    let search_url = format!("https://wellfound.com/jobs?q={}", keywords.replace(' ', "+"));
    Ok(format!(
        "Wellfound search ready. Could not auto-scrape (they use heavy JS).\n\
         Open this URL to find startup jobs: {}\n\
         Wellfound specialises in Y Combinator and funded startups — great for early-stage roles.",
        search_url
    ))
}

fn extract_job_cards(html: &str, max_results: usize) -> Vec<String> {
    let document = scraper::Html::parse_document(html);
    let selector = scraper::Selector::parse("[class]").unwrap();

    let mut jobs = Vec::new();
    for element in document.select(&selector) {
        let classes = element.value().attr("class").unwrap_or_default();
        if !classes.to_lowercase().contains("job") {
            continue;
        }
        let text = element
            .text()
            .collect::<Vec<_>>()
            .join(" | ")
            .trim()
            .to_string();
        if text.len() > 30 && text.len() < 500 {
            jobs.push(text);
        }
        if jobs.len() >= max_results {
            break;
        }
    }
    jobs
}

/// Search the Hacker News "Who Is Hiring?" threads via the Algolia API.
pub async fn search_hn_hiring(
    client: &Client,
    keywords: &str,
    max_results: usize,
) -> Result<String> {
    let cutoff = chrono::Utc::now().timestamp() - 60 * 24 * 60 * 60; // last 60 days
    let query = format!("who is hiring {}", keywords);
    let filters = format!("created_at_i>{}", cutoff);
    let per_page = max_results.to_string();
    let response = client
        .get(HN_SEARCH_API)
        .query(&[
            ("query", query.as_str()),
            ("tags", "comment,story"),
            ("numericFilters", filters.as_str()),
            ("hitsPerPage", per_page.as_str()),
        ])
        .send()
        .await?
        .error_for_status()?;

    let data: Value = response.json().await?;
    let hits = data
        .get("hits")
        .and_then(|h| h.as_array())
        .cloned()
        .unwrap_or_default();

    let kw_lower: Vec<String> = keywords
        .to_lowercase()
        .split_whitespace()
        .map(String::from)
        .collect();
    let job_hits: Vec<&Value> = hits
        .iter()
        .filter(|hit| {
            let text = hit
                .get("comment_text")
                .or_else(|| hit.get("title"))
                .and_then(|t| t.as_str())
                .unwrap_or("");
            text.len() > 100 && kw_lower.iter().any(|kw| text.to_lowercase().contains(kw))
        })
        .collect();

    if job_hits.is_empty() {
        return Ok(format!(
            "No recent HN hiring posts found for '{}'.\n\
             Check manually: https://news.ycombinator.com/jobs",
            keywords
        ));
    }

    let mut out = vec![format!("Hacker News jobs for '{}':\n", keywords)];
    for (i, hit) in job_hits.iter().take(max_results).enumerate() {
        let text = hit
            .get("comment_text")
            .or_else(|| hit.get("title"))
            .and_then(|t| t.as_str())
            .unwrap_or("");
        let text = strip_html(text);
        let preview: String = text.chars().take(200).collect();
        let created = hit
            .get("created_at")
            .and_then(|v| v.as_str())
            .map(|d| if d.len() >= 10 { &d[..10] } else { d })
            .unwrap_or("");
        out.push(format!(
            "{}. {}...\n   Posted: {}  |  Link: https://news.ycombinator.com/item?id={}\n",
            i + 1,
            preview,
            created,
            hit.get("objectID").and_then(|v| v.as_str()).unwrap_or(""),
        ));
    }
    out.push("\nBrowse HN jobs: https://news.ycombinator.com/jobs".to_string());
    Ok(out.join("\n"))
}

fn strip_html(text: &str) -> String {
    let fragment = scraper::Html::parse_fragment(text);
    fragment
        .root_element()
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Indeed blocks unauthenticated scraping, so hand back a date-sorted search
/// link the way Glassdoor is handled.
pub fn indeed_search_link(keywords: &str, location: &str) -> String {
    let mut url = format!(
        "https://www.indeed.com/jobs?q={}&sort=date",
        keywords.replace(' ', "+")
    );
    if !location.is_empty() {
        url.push_str(&format!("&l={}", location.replace(' ', "+")));
    }
    format!(
        "Indeed (sorted by newest):\n{}\n\
         Tip: filter by 'Posted today' after opening the link for the freshest jobs.",
        url
    )
}

/// Run every source and combine the results into one report.
pub async fn search_all_sources(
    client: &Client,
    keywords: &str,
    location: &str,
) -> Result<String> {
    let mut results = Vec::new();

    results.push(format!("MULTI-SOURCE JOB SEARCH: '{}'\n", keywords));

    results.push("── RemoteOK ──".to_string());
    results.push(section(search_remoteok(client, keywords, 10).await));

    results.push("\n── Wellfound Startups ──".to_string());
    results.push(section(
        search_wellfound(client, keywords, location, 10).await,
    ));

    results.push("\n── Hacker News ──".to_string());
    results.push(section(search_hn_hiring(client, keywords, 10).await));

    results.push("\n── Indeed (link) ──".to_string());
    results.push(indeed_search_link(keywords, location));

    Ok(results.join("\n"))
}

/// One source failing must not sink the combined report.
fn section(result: Result<String>) -> String {
    match result {
        Ok(text) => text,
        Err(err) => format!("(source unavailable: {})", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_country() {
        assert_eq!(detect_country("London"), "gb");
        assert_eq!(detect_country("Berlin, Germany"), "de");
        assert_eq!(detect_country("Toronto"), "ca");
        assert_eq!(detect_country(""), "us");
        assert_eq!(detect_country("Mars Colony"), "us");
    }

    #[test]
    fn test_indeed_search_link() {
        let link = indeed_search_link("rust engineer", "New York");
        assert!(link.contains("q=rust+engineer"));
        assert!(link.contains("l=New+York"));
        assert!(link.contains("sort=date"));
    }

    #[test]
    fn test_extract_job_cards_filters_by_length() {
        let html = r#"
            <div class="job-listing">Senior Rust Engineer | Acme Robotics | London | Full-time</div>
            <div class="job-listing">x</div>
            <div class="nav-bar">Senior navigation element that is long enough to pass</div>
        "#;
        let cards = extract_job_cards(html, 10);
        assert_eq!(cards.len(), 1);
        assert!(cards[0].contains("Senior Rust Engineer"));
    }

    #[test]
    fn test_strip_html() {
        assert_eq!(
            strip_html("<p>Hiring <b>Rust</b> devs</p>"),
            "Hiring Rust devs"
        );
    }

    #[tokio::test]
    async fn test_search_adzuna_without_keys_is_instructional() {
        let client = Client::new();
        let config = SourcesConfig::default();
        let result = search_adzuna(&client, &config, "rust", "", 1).await.unwrap();
        assert!(result.contains("ADZUNA_APP_ID"));
    }
}
