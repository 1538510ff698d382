use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use paper_hype::config::Config;
use paper_hype::llm::{self, CliBackend, LlmOutcome};
use paper_hype::{
    matcher, pipeline, ranking, topics, util, HypeScoreEngine, Paper, PaperText, Topic,
    TopicMatcher,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "paper-hype")]
#[command(about = "Rank tracked papers by hype and match them to research topics")]
struct Cli {
    /// Config file (default: <config dir>/paper-hype/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compute the hype score for one set of metrics
    Score {
        #[arg(long)]
        stars: Option<i64>,
        #[arg(long)]
        citations: Option<i64>,
        /// Net votes (may be negative)
        #[arg(long, allow_negative_numbers = true)]
        votes: Option<i64>,
        /// Publication date (YYYY-MM-DD)
        #[arg(long)]
        published: Option<NaiveDate>,
        /// Scoring date (default: today)
        #[arg(long)]
        today: Option<NaiveDate>,
        /// Print the per-component breakdown as JSON
        #[arg(long)]
        json: bool,
    },

    /// Keyword relevance of a paper to a topic or ad-hoc keyword list
    Relevance {
        #[arg(long)]
        title: String,
        #[arg(long = "abstract", default_value = "")]
        abstract_text: String,
        /// Comma-separated keywords
        #[arg(short, long, value_delimiter = ',')]
        keywords: Vec<String>,
        /// Score against a named topic instead of --keywords
        #[arg(short, long, conflicts_with = "keywords")]
        topic: Option<String>,
    },

    /// Rank papers from a JSON file by hype score
    Rank {
        /// JSON array of papers
        #[arg(short, long)]
        input: PathBuf,
        #[arg(long)]
        today: Option<NaiveDate>,
        /// Show at most this many papers
        #[arg(short, long, default_value = "20")]
        limit: usize,
        #[arg(long)]
        json: bool,
    },

    /// Assign topics to papers from a JSON file
    Assign {
        #[arg(short, long)]
        input: PathBuf,
        /// Extra topic definitions (TOML, [[topic]] tables)
        #[arg(long)]
        topics: Option<PathBuf>,
        /// Ask the LLM about topics the keywords missed
        #[arg(long)]
        llm: bool,
        /// Output JSON file for matches
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run the daily job: snapshots + topic matches
    Daily {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(long)]
        topics: Option<PathBuf>,
        /// Snapshot date (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Output JSON file for the report
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List known topics
    Topics {
        #[arg(long)]
        topics: Option<PathBuf>,
    },

    /// Parse a saved LLM completion
    ParseLlm {
        /// File holding the raw completion
        #[arg(short, long)]
        input: PathBuf,
        #[arg(long, value_enum, default_value = "query")]
        mode: LlmMode,
        #[arg(long)]
        topics: Option<PathBuf>,
    },

    /// Ask a free-form question; the LLM turns it into a read-only query
    Ask {
        question: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum LlmMode {
    Query,
    Relevance,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load(cli.config.as_deref()).context("loading config")?;

    match cli.command {
        Command::Score {
            stars,
            citations,
            votes,
            published,
            today,
            json,
        } => cmd_score(&config, stars, citations, votes, published, today, json),
        Command::Relevance {
            title,
            abstract_text,
            keywords,
            topic,
        } => cmd_relevance(&config, &title, &abstract_text, keywords, topic),
        Command::Rank {
            input,
            today,
            limit,
            json,
        } => cmd_rank(&config, &input, today, limit, json),
        Command::Assign {
            input,
            topics,
            llm,
            output,
        } => cmd_assign(&config, &input, topics, llm, output),
        Command::Daily {
            input,
            topics,
            date,
            output,
        } => cmd_daily(&config, &input, topics, date, output),
        Command::Topics { topics } => cmd_topics(&config, topics),
        Command::ParseLlm { input, mode, topics } => cmd_parse_llm(&config, &input, mode, topics),
        Command::Ask { question } => cmd_ask(&question),
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "paper_hype=info",
        1 => "paper_hype=debug",
        _ => "paper_hype=trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn today_or(date: Option<NaiveDate>) -> NaiveDate {
    date.unwrap_or_else(|| chrono::Local::now().date_naive())
}

fn read_papers(path: &Path) -> Result<Vec<Paper>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let papers: Vec<Paper> = serde_json::from_str(&json)
        .with_context(|| format!("parsing papers from {}", path.display()))?;
    tracing::info!(count = papers.len(), path = %path.display(), "loaded papers");
    Ok(papers)
}

/// System topics plus user topics from --topics, else from the config file.
fn load_topics(config: &Config, flag: Option<PathBuf>) -> Result<Vec<Topic>> {
    let user = match flag.or_else(|| config.topics_file.clone()) {
        Some(path) => topics::load_topics(&path)
            .with_context(|| format!("loading topics from {}", path.display()))?,
        None => Vec::new(),
    };
    Ok(topics::merge_with_system(user)?)
}

fn write_json<T: serde::Serialize>(value: &T, output: Option<PathBuf>) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            std::fs::write(&path, json)?;
            eprintln!("Saved to {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn cmd_score(
    config: &Config,
    stars: Option<i64>,
    citations: Option<i64>,
    votes: Option<i64>,
    published: Option<NaiveDate>,
    today: Option<NaiveDate>,
    json: bool,
) -> Result<()> {
    let engine = HypeScoreEngine::new(config.scoring.clone())?;
    let point = paper_hype::MetricPoint {
        github_stars: stars,
        citation_count: citations,
        vote_count: votes,
        published_date: published,
    };
    let breakdown = engine.breakdown(&point, today_or(today));

    if json {
        println!("{}", serde_json::to_string_pretty(&breakdown)?);
    } else {
        println!("hype score: {:.4}", breakdown.total);
        println!("  stars:     {:.4}", breakdown.stars);
        println!("  citations: {:.4}", breakdown.citations);
        println!("  votes:     {:.4}", breakdown.votes);
        println!("  recency:   {:.4}", breakdown.recency);
    }
    Ok(())
}

fn cmd_relevance(
    config: &Config,
    title: &str,
    abstract_text: &str,
    keywords: Vec<String>,
    topic: Option<String>,
) -> Result<()> {
    let matcher = TopicMatcher::new(config.matching.clone())?;
    let text = PaperText::new(title, abstract_text);

    let (label, keywords) = match topic {
        Some(name) => {
            let all = load_topics(config, None)?;
            let Some(t) = topics::find_by_name(&all, &name) else {
                bail!("unknown topic: {}", name);
            };
            (t.name().to_string(), t.keywords().to_vec())
        }
        None if keywords.is_empty() => bail!("specify --keywords or --topic"),
        None => ("keywords".to_string(), keywords),
    };

    let hits = matcher::matched_in_corpus(&text.corpus(), &keywords);
    let relevance = matcher.relevance(title, abstract_text, &keywords);
    let verdict = if matcher.is_match(relevance) { "MATCH" } else { "no match" };

    println!("[{}] {}: {:.1}/10", verdict, label, relevance);
    if !hits.is_empty() {
        println!("  matched: {}", hits.join(", "));
    }
    Ok(())
}

fn cmd_rank(
    config: &Config,
    input: &Path,
    today: Option<NaiveDate>,
    limit: usize,
    json: bool,
) -> Result<()> {
    let engine = HypeScoreEngine::new(config.scoring.clone())?;
    let papers = read_papers(input)?;
    let ranked = ranking::rank_papers(&engine, &papers, today_or(today));
    let shown: Vec<_> = ranked.into_iter().take(limit).collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&shown)?);
        return Ok(());
    }

    println!("=== Hype Ranking ({} papers) ===\n", papers.len());
    for (i, r) in shown.iter().enumerate() {
        println!(
            "{:3}. {:.4}  [{}] {}",
            i + 1,
            r.hype_score,
            r.paper_id,
            util::truncate(&r.title, 70)
        );
    }
    if papers.len() > shown.len() {
        println!("\n... and {} more", papers.len() - shown.len());
    }
    Ok(())
}

fn cmd_assign(
    config: &Config,
    input: &Path,
    topics_flag: Option<PathBuf>,
    use_llm: bool,
    output: Option<PathBuf>,
) -> Result<()> {
    let matcher = TopicMatcher::new(config.matching.clone())?;
    let papers = read_papers(input)?;
    let topics = load_topics(config, topics_flag)?;

    let matches = if use_llm {
        let backend = CliBackend::default();
        let mut rows = Vec::new();
        for p in &papers {
            eprintln!("  {} ...", util::truncate(&p.text.title, 60));
            rows.extend(pipeline::assign_with_llm(&backend, &matcher, &p.id, &p.text, &topics));
        }
        rows
    } else {
        pipeline::assign_topics(&matcher, &papers, &topics)
    };

    eprintln!("{} matches across {} papers", matches.len(), papers.len());
    write_json(&matches, output)
}

fn cmd_daily(
    config: &Config,
    input: &Path,
    topics_flag: Option<PathBuf>,
    date: Option<NaiveDate>,
    output: Option<PathBuf>,
) -> Result<()> {
    let engine = HypeScoreEngine::new(config.scoring.clone())?;
    let matcher = TopicMatcher::new(config.matching.clone())?;
    let papers = read_papers(input)?;
    let topics = load_topics(config, topics_flag)?;

    let report = pipeline::run_daily(&engine, &matcher, &papers, &topics, today_or(date));
    write_json(&report, output)
}

fn cmd_topics(config: &Config, topics_flag: Option<PathBuf>) -> Result<()> {
    let topics = load_topics(config, topics_flag)?;
    println!("=== Topics ({}) ===\n", topics.len());
    for t in &topics {
        let kind = if t.is_system() { "system" } else { "user" };
        println!("[{:6}] {:<24} {}", kind, t.name(), t.keywords().join(", "));
    }
    Ok(())
}

fn cmd_parse_llm(
    config: &Config,
    input: &Path,
    mode: LlmMode,
    topics_flag: Option<PathBuf>,
) -> Result<()> {
    let raw = std::fs::read_to_string(input)
        .with_context(|| format!("reading {}", input.display()))?;
    match mode {
        LlmMode::Query => {
            let outcome = llm::parse_query_response(&raw);
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        LlmMode::Relevance => {
            let topics = load_topics(config, topics_flag)?;
            match llm::parse_relevance_response(&raw, &topics) {
                Ok(judgments) => println!("{}", serde_json::to_string_pretty(&judgments)?),
                Err(e) => {
                    let outcome = serde_json::json!({ "error": e.to_string() });
                    println!("{}", serde_json::to_string_pretty(&outcome)?);
                }
            }
        }
    }
    Ok(())
}

fn cmd_ask(question: &str) -> Result<()> {
    let backend = CliBackend::default();
    eprintln!("Asking model...");
    let outcome = llm::ask(&backend, question, llm::DEFAULT_SCHEMA);
    match &outcome {
        LlmOutcome::Query { sql } => println!("{}", sql),
        LlmOutcome::Message { message } => println!("{}", message),
        LlmOutcome::Error { error } => eprintln!("error: {}", error),
    }
    Ok(())
}
