use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cliclack::{input, spinner};
use console::style;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use jobscout::agent::Agent;
use jobscout::career::{CareerAssistant, CoverLetterTone};
use jobscout::config::{default_jobs_file, SearchDefaults, SourcesConfig};
use jobscout::providers::router::FallbackRouter;
use jobscout::store::{JobStatus, JobStore};
use jobscout::toolkit::JobToolkit;

const RESUME_FILE: &str = "my_resume.txt";
const COVER_LETTERS_DIR: &str = "cover_letters";
const INTERVIEW_DIR: &str = "interview_prep";

#[derive(Parser)]
#[command(author, version, about = "AI agent that hunts fresh job postings", long_about = None)]
struct Cli {
    /// Path to the saved-jobs file (defaults to ~/.config/jobscout/saved_jobs.json)
    #[arg(long, global = true)]
    jobs_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the agent once against a goal
    Run {
        /// What to look for, e.g. "Find rust jobs posted today in Berlin"
        goal: Option<String>,

        /// Hard ceiling on model turns for this run
        #[arg(long, default_value_t = jobscout::agent::DEFAULT_MAX_TURNS)]
        max_turns: usize,
    },

    /// Re-run the agent on an interval, looking for brand-new postings
    Monitor {
        #[arg(long)]
        keywords: Option<String>,

        #[arg(long)]
        location: Option<String>,

        /// Minutes between checks
        #[arg(long)]
        interval: Option<u64>,
    },

    /// Show which model backends are configured
    Status,

    /// Browse and manage saved jobs
    Jobs {
        #[command(subcommand)]
        command: JobsCommand,
    },

    /// Resume and interview tools powered by the same model backends
    Career {
        #[command(subcommand)]
        command: CareerCommand,
    },
}

#[derive(Subcommand)]
enum JobsCommand {
    /// List every saved job
    List,
    /// Counts per application status
    Stats,
    /// Move a job to a new status (Saved, Applied, Interview, Offer, Rejected, "No Response")
    SetStatus { id: usize, status: String },
}

#[derive(Subcommand)]
enum CareerCommand {
    /// Score your resume against a pasted job description
    Score,
    /// Rewrite your resume bullets toward a pasted job description
    Tailor,
    /// Write a cover letter for a saved job
    Letter {
        /// Saved job id
        id: usize,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "Hiring Team")]
        hiring_manager: String,
        /// professional, enthusiastic or concise
        #[arg(long, default_value = "professional")]
        tone: String,
    },
    /// Generate interview questions and prep notes for a saved job
    Prep {
        /// Saved job id
        id: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let store = JobStore::new(cli.jobs_file.clone().unwrap_or_else(default_jobs_file));

    match cli.command {
        Command::Run { goal, max_turns } => run_once(goal, max_turns, store).await,
        Command::Monitor {
            keywords,
            location,
            interval,
        } => monitor(keywords, location, interval, store).await,
        Command::Status => {
            let router = FallbackRouter::from_env()?;
            println!("Model backends: {}", style(router.status()).cyan());
            Ok(())
        }
        Command::Jobs { command } => jobs_command(command, &store),
        Command::Career { command } => career_command(command, &store).await,
    }
}

fn build_agent(store: JobStore, max_turns: usize) -> Result<Agent> {
    let router = FallbackRouter::from_env()?;
    let toolkit = JobToolkit::new(SourcesConfig::from_env(), store)?;
    Ok(Agent::new(router, Box::new(toolkit)).with_max_turns(max_turns))
}

async fn run_once(goal: Option<String>, max_turns: usize, store: JobStore) -> Result<()> {
    let goal = match goal {
        Some(goal) => goal,
        None => input("What jobs are you looking for?")
            .placeholder("Find software engineer jobs posted today.")
            .interact()?,
    };

    let agent = build_agent(store, max_turns)?;
    println!(
        "{} {}",
        style("Goal:").bold(),
        style(goal.trim()).cyan()
    );
    println!("{} {}\n", style("AI:").bold(), agent.status());

    let spin = spinner();
    spin.start("searching...");
    let outcome = agent.run(&goal).await?;
    spin.stop("done");

    println!("\n{}", style("SUMMARY").bold().green());
    println!("{}", outcome.summary());
    Ok(())
}

async fn monitor(
    keywords: Option<String>,
    location: Option<String>,
    interval: Option<u64>,
    store: JobStore,
) -> Result<()> {
    let defaults = SearchDefaults::from_env();
    let keywords = keywords.unwrap_or(defaults.keywords);
    let location = location.unwrap_or(defaults.location);
    let minutes = interval.unwrap_or(defaults.monitor_interval_minutes);

    println!(
        "{} '{}' every {} min (ctrl-c to stop)\n",
        style("MONITOR STARTED —").bold().green(),
        keywords,
        minutes
    );

    let goal = if location.is_empty() {
        format!(
            "Find brand new '{}' jobs posted in the last hour. Search all sources. Save any found.",
            keywords
        )
    } else {
        format!(
            "Find brand new '{}' jobs in {} posted in the last hour. Search all sources. Save any found.",
            keywords, location
        )
    };

    let agent = build_agent(store, jobscout::agent::DEFAULT_MAX_TURNS)?;
    let mut ticker = tokio::time::interval(Duration::from_secs(minutes * 60));

    loop {
        ticker.tick().await;
        let now = chrono::Local::now().format("%H:%M:%S");
        println!("[{}] checking...", now);
        match agent.run(&goal).await {
            Ok(outcome) => println!("[{}] {}", now, outcome.summary()),
            Err(err) => {
                eprintln!("[{}] {}", now, style(format!("run failed: {}", err)).red());
                return Err(err.into());
            }
        }
        println!("[{}] next check in {} min.", now, minutes);
    }
}

fn jobs_command(command: JobsCommand, store: &JobStore) -> Result<()> {
    match command {
        JobsCommand::List => {
            let jobs = store.load()?;
            if jobs.is_empty() {
                println!(
                    "{}",
                    style("No jobs saved yet. Run the agent first to find some.").yellow()
                );
                return Ok(());
            }
            println!(
                "{:<4} {:<28} {:<22} {:<16} {:<12} {}",
                style("ID").bold(),
                style("Role").bold(),
                style("Company").bold(),
                style("Location").bold(),
                style("Status").bold(),
                style("Saved").bold(),
            );
            for job in &jobs {
                println!(
                    "{:<4} {:<28} {:<22} {:<16} {:<12} {}",
                    job.id,
                    truncate(&job.title, 26),
                    truncate(&job.company, 20),
                    truncate(&job.location, 14),
                    job.status,
                    &job.saved_at.get(..10).unwrap_or(""),
                );
            }
        }
        JobsCommand::Stats => {
            for (status, count) in store.stats()? {
                println!("{:<14} {}", status.to_string(), count);
            }
        }
        JobsCommand::SetStatus { id, status } => {
            let status = JobStatus::from_str(&status)
                .map_err(|_| anyhow::anyhow!("unknown status '{}'", status))?;
            match store.update_status(id, status)? {
                Some(job) => println!(
                    "{} '{}' at {} → {}",
                    style("Updated:").green(),
                    job.title,
                    job.company,
                    job.status
                ),
                None => println!("{}", style(format!("No job with id {}", id)).yellow()),
            }
        }
    }
    Ok(())
}

async fn career_command(command: CareerCommand, store: &JobStore) -> Result<()> {
    let router = FallbackRouter::from_env()?;
    let assistant = CareerAssistant::new(&router);
    let resume = ensure_resume()?;

    match command {
        CareerCommand::Score => {
            let jd = paste_job_description()?;
            let spin = spinner();
            spin.start("analysing match...");
            let report = assistant.score_match(&resume, &jd).await?;
            spin.stop("done");

            let score_style = if report.score >= 80 {
                style(format!("{}/100  Grade: {}", report.score, report.grade)).green()
            } else if report.score >= 60 {
                style(format!("{}/100  Grade: {}", report.score, report.grade)).yellow()
            } else {
                style(format!("{}/100  Grade: {}", report.score, report.grade)).red()
            };
            println!("\n{} {}", style("Match Score:").bold(), score_style.bold());
            println!("{} {}\n", style("Verdict:").bold(), report.verdict);
            if !report.matched_keywords.is_empty() {
                println!(
                    "{} {}",
                    style("Matched:").green().bold(),
                    report.matched_keywords.join(", ")
                );
            }
            if !report.missing_skills.is_empty() {
                println!(
                    "{} {}",
                    style("Missing:").red().bold(),
                    report.missing_skills.join(", ")
                );
            }
            if !report.recommendation.is_empty() {
                println!("\n{} {}", style("Recommendation:").bold(), report.recommendation);
            }
        }
        CareerCommand::Tailor => {
            let jd = paste_job_description()?;
            let spin = spinner();
            spin.start("tailoring resume...");
            let tailored = assistant.tailor_resume(&resume, &jd).await?;
            spin.stop("done");

            let filename = format!(
                "tailored_resume_{}.txt",
                chrono::Local::now().format("%Y%m%d")
            );
            fs::write(&filename, &tailored)?;
            println!("\n{}\n", tailored);
            println!("{} {}", style("Saved to:").green(), filename);
        }
        CareerCommand::Letter {
            id,
            name,
            hiring_manager,
            tone,
        } => {
            let job = find_job(store, id)?;
            let jd = paste_job_description()?;
            let tone = match tone.as_str() {
                "enthusiastic" => CoverLetterTone::Enthusiastic,
                "concise" => CoverLetterTone::Concise,
                _ => CoverLetterTone::Professional,
            };

            let spin = spinner();
            spin.start("writing cover letter...");
            let letter = assistant
                .cover_letter(&resume, &jd, &name, &hiring_manager, tone)
                .await?;
            spin.stop("done");

            fs::create_dir_all(COVER_LETTERS_DIR)?;
            let filename = format!(
                "{}/cover_{}_{}.txt",
                COVER_LETTERS_DIR,
                safe_filename(&job.company),
                chrono::Local::now().format("%Y%m%d")
            );
            fs::write(&filename, &letter)?;
            println!("\n{}\n", letter);
            println!("{} {}", style("Saved to:").green(), filename);
        }
        CareerCommand::Prep { id } => {
            let job = find_job(store, id)?;
            let jd = paste_job_description()?;

            let spin = spinner();
            spin.start("generating interview prep...");
            let prep = assistant
                .interview_prep(&resume, &jd, &job.company, &job.title)
                .await?;
            spin.stop("done");

            fs::create_dir_all(INTERVIEW_DIR)?;
            let filename = format!(
                "{}/prep_{}_{}.txt",
                INTERVIEW_DIR,
                safe_filename(&job.company),
                chrono::Local::now().format("%Y%m%d")
            );
            fs::write(&filename, &prep)?;
            println!("\n{}\n", prep);
            println!("{} {}", style("Full guide saved to:").green(), filename);
        }
    }
    Ok(())
}

fn find_job(store: &JobStore, id: usize) -> Result<jobscout::store::JobRecord> {
    store
        .load()?
        .into_iter()
        .find(|job| job.id == id)
        .with_context(|| format!("no saved job with id {}", id))
}

/// Load the resume from my_resume.txt, or ask for it once and save it.
fn ensure_resume() -> Result<String> {
    if let Ok(resume) = fs::read_to_string(RESUME_FILE) {
        let resume = resume.trim().to_string();
        if !resume.is_empty() {
            return Ok(resume);
        }
    }

    println!(
        "{}",
        style("No resume found — paste it below (saved to my_resume.txt for next time).")
            .yellow()
    );
    let resume: String = input("Resume:").multiline().interact()?;
    fs::write(RESUME_FILE, &resume)?;
    println!("{}", style("Resume saved!").green());
    Ok(resume)
}

fn paste_job_description() -> Result<String> {
    let jd: String = input("Paste the job description:").multiline().interact()?;
    Ok(jd)
}

fn safe_filename(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric() || *c == ' ' || *c == '_' || *c == '-')
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_filename() {
        assert_eq!(safe_filename("Acme, Inc."), "Acme Inc");
        assert_eq!(safe_filename("foo/bar"), "foobar");
        assert_eq!(safe_filename("plain-name_1"), "plain-name_1");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a very long job title here", 10), "a very lo…");
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let mut out: String = text.chars().take(max - 1).collect();
        out.push('…');
        out
    }
}
