//! The capabilities the agent can invoke, and the executor that runs them.
//!
//! Execution never fails at the type level: every problem — unknown tool,
//! missing argument, connector I/O error — becomes descriptive text that is
//! handed back to the model as a tool result, so one flaky data source can
//! never abort a whole research session. Structured errors still go to the
//! log.
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

use crate::config::SourcesConfig;
use crate::models::tool::{Tool, ToolCall};
use crate::store::{JobRecord, JobStore};

pub mod boards;
pub mod careers;
pub mod maps;

pub(crate) const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// The seam between the run-loop and whatever actually does the work.
#[async_trait]
pub trait Toolkit: Send + Sync {
    /// The tools to declare to the model
    fn tools(&self) -> &[Tool];

    /// Execute one tool call. Always produces text; failures are reported in
    /// the text itself, prefixed with the failing tool's name.
    async fn execute(&self, call: &ToolCall) -> String;
}

/// Tool declarations for the job-search toolkit.
pub fn job_tools() -> Vec<Tool> {
    vec![
        Tool::new(
            "search_job_boards",
            "Search the Adzuna job board for newly posted jobs sorted by date. \
             Returns title, company, location, date posted, and URL.",
            json!({
                "type": "object",
                "properties": {
                    "keywords": {"type": "string", "description": "Job title or skills"},
                    "location": {"type": "string", "description": "City or country"}
                },
                "required": ["keywords"]
            }),
        ),
        Tool::new(
            "scrape_company_careers",
            "Scrape a company's own careers page for jobs not listed on job boards.",
            json!({
                "type": "object",
                "properties": {
                    "company_name": {"type": "string", "description": "Company name"},
                    "careers_url": {"type": "string", "description": "URL of careers page"},
                    "keywords": {"type": "string", "description": "Filter by keywords (optional)"}
                },
                "required": ["company_name", "careers_url"]
            }),
        ),
        Tool::new(
            "find_startups_on_maps",
            "Find small/unknown companies via Google Maps that may be hiring.",
            json!({
                "type": "object",
                "properties": {
                    "industry": {"type": "string", "description": "e.g. software startup"},
                    "location": {"type": "string", "description": "City or area"},
                    "max_results": {"type": "integer", "description": "Max companies (default 10)"}
                },
                "required": ["industry", "location"]
            }),
        ),
        Tool::new(
            "search_more_sources",
            "Search RemoteOK, Wellfound (YC startups), Indeed, or Hacker News hiring posts.",
            json!({
                "type": "object",
                "properties": {
                    "keywords": {"type": "string", "description": "Job title or skills"},
                    "location": {"type": "string", "description": "City or blank for remote"},
                    "source": {
                        "type": "string",
                        "description": "Which source to use",
                        "enum": ["all", "remoteok", "wellfound", "indeed", "hackernews"]
                    }
                },
                "required": ["keywords"]
            }),
        ),
        Tool::new(
            "save_job",
            "Save an interesting job to the local jobs file.",
            json!({
                "type": "object",
                "properties": {
                    "title": {"type": "string", "description": "Job title"},
                    "company": {"type": "string", "description": "Company name"},
                    "location": {"type": "string", "description": "Job location"},
                    "url": {"type": "string", "description": "Link to the job"},
                    "source": {"type": "string", "description": "Where this job was found"},
                    "notes": {"type": "string", "description": "Extra info about this job"}
                },
                "required": ["title", "company", "source"]
            }),
        ),
    ]
}

/// The production toolkit: job-board connectors plus the saved-jobs store.
pub struct JobToolkit {
    client: Client,
    config: SourcesConfig,
    store: JobStore,
    tools: Vec<Tool>,
}

impl JobToolkit {
    pub fn new(config: SourcesConfig, store: JobStore) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(15))
            .build()?;

        Ok(Self {
            client,
            config,
            store,
            tools: job_tools(),
        })
    }

    async fn dispatch(&self, call: &ToolCall) -> Result<String> {
        let args = &call.arguments;
        match call.name.as_str() {
            "search_job_boards" => {
                let keywords = require_str(args, "keywords")?;
                let location = opt_str(args, "location");
                boards::search_adzuna(&self.client, &self.config, keywords, &location, 1).await
            }
            "scrape_company_careers" => {
                let company = require_str(args, "company_name")?;
                let careers_url = require_str(args, "careers_url")?;
                let keywords = opt_str(args, "keywords");
                careers::scrape_company_careers(&self.client, company, careers_url, &keywords)
                    .await
            }
            "find_startups_on_maps" => {
                let industry = require_str(args, "industry")?;
                let location = require_str(args, "location")?;
                let max_results = opt_u64(args, "max_results").unwrap_or(10) as usize;
                maps::find_startups(&self.client, &self.config, industry, location, max_results)
                    .await
            }
            "search_more_sources" => {
                let keywords = require_str(args, "keywords")?;
                let location = opt_str(args, "location");
                let source = args
                    .get("source")
                    .and_then(|v| v.as_str())
                    .unwrap_or("all");
                match source {
                    "remoteok" => boards::search_remoteok(&self.client, keywords, 15).await,
                    "wellfound" => {
                        boards::search_wellfound(&self.client, keywords, &location, 15).await
                    }
                    "indeed" => Ok(boards::indeed_search_link(keywords, &location)),
                    "hackernews" => boards::search_hn_hiring(&self.client, keywords, 15).await,
                    _ => boards::search_all_sources(&self.client, keywords, &location).await,
                }
            }
            "save_job" => self.save_job(args),
            other => Ok(format!("Unknown tool: {}", other)),
        }
    }

    fn save_job(&self, args: &Value) -> Result<String> {
        let title = require_str(args, "title")?;
        let company = require_str(args, "company")?;
        let source = require_str(args, "source")?;

        let record = JobRecord::new(title, company, source)
            .with_location(opt_str(args, "location"))
            .with_url(opt_str(args, "url"))
            .with_notes(opt_str(args, "notes"));

        let saved = self.store.append(record)?;
        Ok(format!(
            "Saved job: '{}' at {} to {}",
            saved.title,
            saved.company,
            self.store.path().display()
        ))
    }
}

#[async_trait]
impl Toolkit for JobToolkit {
    fn tools(&self) -> &[Tool] {
        &self.tools
    }

    async fn execute(&self, call: &ToolCall) -> String {
        match self.dispatch(call).await {
            Ok(text) => text,
            Err(err) => {
                tracing::error!(tool = %call.name, %err, "tool execution failed");
                format!("Tool error in {}: {}", call.name, err)
            }
        }
    }
}

fn require_str<'a>(args: &'a Value, key: &str) -> Result<&'a str> {
    args.get(key)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| anyhow!("missing required field '{}'", key))
}

fn opt_str(args: &Value, key: &str) -> String {
    args.get(key)
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string()
}

fn opt_u64(args: &Value, key: &str) -> Option<u64> {
    args.get(key).and_then(|v| v.as_u64())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SourcesConfig;
    use tempfile::tempdir;

    fn toolkit_in(dir: &tempfile::TempDir) -> JobToolkit {
        let store = JobStore::new(dir.path().join("saved_jobs.json"));
        JobToolkit::new(SourcesConfig::default(), store).unwrap()
    }

    #[tokio::test]
    async fn test_unknown_tool_is_text_not_error() {
        let dir = tempdir().unwrap();
        let toolkit = toolkit_in(&dir);

        let result = toolkit
            .execute(&ToolCall::new("nonexistent_tool", json!({})))
            .await;
        assert_eq!(result, "Unknown tool: nonexistent_tool");
    }

    #[tokio::test]
    async fn test_save_job_persists_record() {
        let dir = tempdir().unwrap();
        let toolkit = toolkit_in(&dir);

        let result = toolkit
            .execute(&ToolCall::new(
                "save_job",
                json!({
                    "title": "Rust Engineer",
                    "company": "Acme",
                    "source": "adzuna",
                    "location": "London",
                    "url": "https://example.com/job",
                    "notes": "Looks promising"
                }),
            ))
            .await;

        assert!(result.contains("Saved job: 'Rust Engineer' at Acme"));

        let store = JobStore::new(dir.path().join("saved_jobs.json"));
        let jobs = store.load().unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].location, "London");
        assert_eq!(jobs[0].status, crate::store::JobStatus::Saved);
    }

    #[tokio::test]
    async fn test_save_job_missing_field_reports_in_text() {
        let dir = tempdir().unwrap();
        let toolkit = toolkit_in(&dir);

        let result = toolkit
            .execute(&ToolCall::new("save_job", json!({"title": "Rust Engineer"})))
            .await;

        assert!(result.starts_with("Tool error in save_job:"));
        assert!(result.contains("missing required field 'company'"));

        let store = JobStore::new(dir.path().join("saved_jobs.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_arguments_still_produce_a_result() {
        let dir = tempdir().unwrap();
        let toolkit = toolkit_in(&dir);

        // A malformed-argument substitution upstream hands us an empty map;
        // the tool must still answer with text.
        let result = toolkit
            .execute(&ToolCall::new("search_job_boards", json!({})))
            .await;
        assert!(result.starts_with("Tool error in search_job_boards:"));
    }

    #[test]
    fn test_job_tools_declares_five_tools() {
        let tools = job_tools();
        assert_eq!(tools.len(), 5);
        assert!(tools.iter().any(|t| t.name == "save_job"));
        let save = tools.iter().find(|t| t.name == "save_job").unwrap();
        assert_eq!(
            save.input_schema["required"],
            json!(["title", "company", "source"])
        );
    }
}
