//! Careers-page scraping: pull plausible job listings straight off a
//! company's own site, where startups often post before any board.
use anyhow::{anyhow, Result};
use reqwest::Client;
use scraper::{Html, Selector};
use std::collections::HashSet;

const MAX_JOBS: usize = 20;
const MAX_SHOWN: usize = 15;

/// Fetch a careers page and extract job-looking entries. Generic by design:
/// most career pages mark listings with a class containing one of a few
/// telltale words; when none match we fall back to list items and cards.
pub async fn scrape_company_careers(
    client: &Client,
    company_name: &str,
    careers_url: &str,
    keywords: &str,
) -> Result<String> {
    let response = client.get(careers_url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(anyhow!("could not access {}: HTTP {}", careers_url, status));
    }
    let body = response.text().await?;

    let jobs_found = extract_listings(&body, keywords);

    if jobs_found.is_empty() {
        return Ok(format!(
            "Could not extract jobs from {}'s career page at {}. \
             The page may require JavaScript or have a different structure.",
            company_name, careers_url
        ));
    }

    let mut output = vec![format!(
        "Jobs found on {}'s career page ({}):\n",
        company_name, careers_url
    )];
    for (i, job) in jobs_found.iter().take(MAX_SHOWN).enumerate() {
        output.push(format!("{}. {}", i + 1, job));
    }

    Ok(output.join("\n"))
}

fn extract_listings(html: &str, keywords: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    let job_words = ["job", "position", "role", "opening", "career", "posting"];
    let class_selector = Selector::parse("[class]").unwrap();

    let mut candidates: Vec<String> = document
        .select(&class_selector)
        .filter(|el| {
            let classes = el.value().attr("class").unwrap_or_default().to_lowercase();
            job_words.iter().any(|word| classes.contains(word))
        })
        .map(element_text)
        .collect();

    // No marked-up listings: scan generic containers instead.
    if candidates.is_empty() {
        let fallback_selector = Selector::parse("li, div, article").unwrap();
        candidates = document
            .select(&fallback_selector)
            .take(50)
            .map(element_text)
            .collect();
    }

    let kw_lower: Vec<String> = keywords
        .to_lowercase()
        .split_whitespace()
        .map(String::from)
        .collect();

    let mut seen = HashSet::new();
    let mut jobs = Vec::new();
    for text in candidates {
        if text.len() <= 20 || text.len() >= 300 || seen.contains(&text) {
            continue;
        }
        if !kw_lower.is_empty() {
            let lower = text.to_lowercase();
            if !kw_lower.iter().any(|kw| lower.contains(kw)) {
                continue;
            }
        }
        seen.insert(text.clone());
        jobs.push(text);
        if jobs.len() >= MAX_JOBS {
            break;
        }
    }
    jobs
}

fn element_text(el: scraper::ElementRef) -> String {
    el.text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
