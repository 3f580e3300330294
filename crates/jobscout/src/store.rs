use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use strum_macros::{Display, EnumString};

/// Application pipeline states for a saved job.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
pub enum JobStatus {
    Saved,
    Applied,
    Interview,
    Offer,
    Rejected,
    #[strum(serialize = "No Response")]
    #[serde(rename = "No Response")]
    NoResponse,
}

impl Default for JobStatus {
    fn default() -> Self {
        JobStatus::Saved
    }
}

/// One discovered job opportunity. Unknown or missing fields default so that
/// files written by older versions still load.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobRecord {
    #[serde(default)]
    pub id: usize,
    #[serde(default)]
    pub saved_at: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub status: JobStatus,
    #[serde(default)]
    pub applied_at: String,
    #[serde(default)]
    pub followup_sent: bool,
}

impl JobRecord {
    pub fn new<T, C, S>(title: T, company: C, source: S) -> Self
    where
        T: Into<String>,
        C: Into<String>,
        S: Into<String>,
    {
        Self {
            id: 0,
            saved_at: String::new(),
            title: title.into(),
            company: company.into(),
            location: String::new(),
            url: String::new(),
            source: source.into(),
            notes: String::new(),
            status: JobStatus::Saved,
            applied_at: String::new(),
            followup_sent: false,
        }
    }

    pub fn with_location<S: Into<String>>(mut self, location: S) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_url<S: Into<String>>(mut self, url: S) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_notes<S: Into<String>>(mut self, notes: S) -> Self {
        self.notes = notes.into();
        self
    }
}

/// JSON-file persistence for saved jobs.
pub struct JobStore {
    path: PathBuf,
}

impl JobStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Load every saved job; a missing file is just an empty list.
    pub fn load(&self) -> Result<Vec<JobRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let data = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        let jobs: Vec<JobRecord> = serde_json::from_str(&data)
            .with_context(|| format!("failed to parse {}", self.path.display()))?;
        Ok(jobs)
    }

    /// Write the full list back, re-assigning sequential ids.
    pub fn save_all(&self, jobs: &mut [JobRecord]) -> Result<()> {
        for (i, job) in jobs.iter_mut().enumerate() {
            job.id = i + 1;
        }
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let data = serde_json::to_string_pretty(&jobs)?;
        fs::write(&self.path, data)
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        Ok(())
    }

    /// Append one record, stamping its save time, and persist.
    pub fn append(&self, mut record: JobRecord) -> Result<JobRecord> {
        record.saved_at = Utc::now().to_rfc3339();
        let mut jobs = self.load()?;
        jobs.push(record);
        self.save_all(&mut jobs)?;
        Ok(jobs.pop().expect("just appended"))
    }

    /// Move a job to a new status. Entering Applied stamps the date.
    pub fn update_status(&self, id: usize, status: JobStatus) -> Result<Option<JobRecord>> {
        let mut jobs = self.load()?;
        let updated = match jobs.iter_mut().find(|job| job.id == id) {
            Some(job) => {
                job.status = status;
                if status == JobStatus::Applied && job.applied_at.is_empty() {
                    job.applied_at = Utc::now().to_rfc3339();
                }
                Some(job.clone())
            }
            None => None,
        };
        if updated.is_some() {
            self.save_all(&mut jobs)?;
        }
        Ok(updated)
    }

    /// Counts per status, in pipeline order.
    pub fn stats(&self) -> Result<Vec<(JobStatus, usize)>> {
        let jobs = self.load()?;
        let order = [
            JobStatus::Saved,
            JobStatus::Applied,
            JobStatus::Interview,
            JobStatus::Offer,
            JobStatus::Rejected,
            JobStatus::NoResponse,
        ];
        Ok(order
            .into_iter()
            .map(|status| {
                let count = jobs.iter().filter(|job| job.status == status).count();
                (status, count)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store_in(dir: &tempfile::TempDir) -> JobStore {
        JobStore::new(dir.path().join("saved_jobs.json"))
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_append_assigns_ids_and_timestamps() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);

        let saved = store
            .append(JobRecord::new("Rust Engineer", "Acme", "adzuna"))
            .unwrap();
        assert_eq!(saved.id, 1);
        assert!(!saved.saved_at.is_empty());
        assert_eq!(saved.status, JobStatus::Saved);

        let saved = store
            .append(JobRecord::new("Backend Engineer", "Initech", "remoteok"))
            .unwrap();
        assert_eq!(saved.id, 2);

        let jobs = store.load().unwrap();
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].title, "Rust Engineer");
    }

    #[test]
    fn test_update_status_stamps_applied_at() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        store
            .append(JobRecord::new("Rust Engineer", "Acme", "adzuna"))
            .unwrap();

        let updated = store.update_status(1, JobStatus::Applied).unwrap().unwrap();
        assert_eq!(updated.status, JobStatus::Applied);
        assert!(!updated.applied_at.is_empty());

        assert!(store.update_status(99, JobStatus::Offer).unwrap().is_none());
    }

    #[test]
    fn test_load_tolerates_missing_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("saved_jobs.json");
        std::fs::write(
            &path,
            r#"[{"title": "Rust Engineer", "company": "Acme"}]"#,
        )
        .unwrap();

        let store = JobStore::new(path);
        let jobs = store.load().unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].status, JobStatus::Saved);
        assert_eq!(jobs[0].source, "");
        assert!(!jobs[0].followup_sent);
    }

    #[test]
    fn test_stats_counts_by_status() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        store
            .append(JobRecord::new("A", "Acme", "adzuna"))
            .unwrap();
        store
            .append(JobRecord::new("B", "Initech", "remoteok"))
            .unwrap();
        store.update_status(2, JobStatus::Interview).unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats[0], (JobStatus::Saved, 1));
        assert_eq!(stats[2], (JobStatus::Interview, 1));
    }
}
