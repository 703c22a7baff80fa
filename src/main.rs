use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{ArgGroup, Parser};
use tfidf_recommender::{
    load_applicants, load_candidates, load_job_postings, Corpus, ErrorKind, RankedResult,
    RecommendationService, ServiceConfig,
};
use tracing_subscriber::EnvFilter;

/// Rank candidates against a job description.
#[derive(Parser, Debug)]
#[command(name = "tfidf-recommender")]
#[command(author, version, about, long_about = None)]
#[command(group(ArgGroup::new("query").required(true).args(["description", "job_id"])))]
struct Cli {
    /// Candidate file (JSON array of template rows)
    #[arg(long)]
    candidates: PathBuf,

    /// Read `--candidates` as the keyed applicants dataset instead
    #[arg(long)]
    applicants: bool,

    /// Job description text
    #[arg(long, short)]
    description: Option<String>,

    /// Job postings dataset, used with `--job-id`
    #[arg(long, requires = "job_id")]
    jobs: Option<PathBuf>,

    /// Use the description of this posting from `--jobs`
    #[arg(long, requires = "jobs")]
    job_id: Option<String>,

    /// Number of candidates to show
    #[arg(long, short = 'n', default_value_t = 5, allow_negative_numbers = true)]
    top: i64,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Fitted space cache file; read when present, written after fitting otherwise
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// JSON config file; without it `RECOMMENDER_*` variables apply
    #[arg(long, env = "RECOMMENDER_CONFIG")]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ServiceConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ServiceConfig::from_env().context("reading RECOMMENDER_* variables")?,
    };
    let service: RecommendationService = RecommendationService::new(config)?;

    let candidates = if cli.applicants {
        load_applicants(&cli.candidates)?
    } else {
        load_candidates(&cli.candidates)?
    };
    let corpus = Corpus::new(candidates);
    tracing::info!(candidates = corpus.len(), fingerprint = corpus.fingerprint().short(), "corpus loaded");

    let description = match (&cli.description, &cli.jobs, &cli.job_id) {
        (Some(text), _, _) => text.clone(),
        (None, Some(jobs), Some(job_id)) => {
            let postings = load_job_postings(jobs)?;
            let Some(posting) = postings.into_iter().find(|p| &p.id == job_id) else {
                bail!("job posting {job_id} not found in {}", jobs.display());
            };
            tracing::info!(job_id = %posting.id, title = %posting.title, "using job posting");
            posting.description
        }
        _ => bail!("either --description or --jobs with --job-id is required"),
    };

    let mut snapshot_loaded = false;
    if let Some(path) = cli.snapshot.as_ref().filter(|p| p.exists()) {
        let bytes = std::fs::read(path).with_context(|| format!("reading snapshot {}", path.display()))?;
        match service.import_snapshot(&bytes) {
            Ok(fingerprint) => {
                snapshot_loaded = &fingerprint == corpus.fingerprint();
                if !snapshot_loaded {
                    tracing::warn!(path = %path.display(), "snapshot belongs to another corpus, refitting");
                }
            }
            Err(e) if e.kind() == ErrorKind::Snapshot => {
                tracing::warn!(path = %path.display(), error = %e, "snapshot rejected, refitting");
            }
            Err(e) => return Err(e.into()),
        }
    }

    let ranked = service.recommend(&corpus, &description, cli.top)?;

    if let Some(path) = cli.snapshot.as_ref().filter(|_| !snapshot_loaded) {
        let bytes = service.export_snapshot(&corpus)?;
        std::fs::write(path, bytes).with_context(|| format!("writing snapshot {}", path.display()))?;
        tracing::info!(path = %path.display(), "snapshot written");
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&ranked)?);
    } else {
        print_table(&ranked);
    }
    Ok(())
}

fn print_table(ranked: &[RankedResult<'_>]) {
    if ranked.is_empty() {
        println!("no candidates");
        return;
    }
    println!("{:>4}  {:<10}  {:<32}  {:<12}  {:>6}", "#", "id", "name", "seniority", "score");
    for (pos, result) in ranked.iter().enumerate() {
        let c = result.candidate;
        println!(
            "{:>4}  {:<10}  {:<32}  {:<12}  {:>6.4}",
            pos + 1,
            c.id,
            c.name,
            c.seniority.as_deref().unwrap_or("-"),
            result.score
        );
    }
}
