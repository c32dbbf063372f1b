use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use transcript_hits::{
    execute_stage3, load_records, read_terms_file, scan_records, AnthropicConfig,
    AnthropicRecognizer, HitSummary, HttpNerConfig, HttpRecognizer, MatcherConfig, Mode,
    PatternMatcher, Recognizer, Record, Roster, Stage2Config, Stage3Config,
};

#[derive(Parser)]
#[command(name = "transcript-hits")]
#[command(author, version, about = "Find query terms, patterns and proper nouns in support transcripts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan transcripts and write one CSV row per hit; the last file is the output
    Scan {
        #[command(flatten)]
        args: ScanArgs,

        /// Also write a JSON hit report to this file
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// Scan transcripts and print hit statistics without writing a file
    Analyze {
        #[command(flatten)]
        args: ScanArgs,
    },
}

#[derive(Args)]
struct ScanArgs {
    /// Transcript format
    #[arg(value_enum)]
    mode: Mode,

    /// Input CSV exports
    files: Vec<PathBuf>,

    /// Term list; the first line is a header
    #[arg(long, default_value = "text_terms_DS.txt")]
    terms: PathBuf,

    /// Operator roster used for role and campus columns
    #[arg(long, default_value = "names.csv")]
    roster: PathBuf,

    /// Proper noun detection backend
    #[arg(long, value_enum, default_value_t = RecognizerKind::Anthropic)]
    recognizer: RecognizerKind,

    /// NER service endpoint for `--recognizer http` (defaults to NER_SERVICE_URL)
    #[arg(long)]
    ner_url: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum RecognizerKind {
    Anthropic,
    Http,
    None,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.kind() == ErrorKind::MissingRequiredArgument => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
        Err(e) => e.exit(),
    };

    match cli.command {
        Commands::Scan { args, json } => {
            setup_logging(args.verbose);
            if args.files.len() < 2 {
                eprintln!(
                    "Usage: transcript-hits scan <MODE> <INPUT>... <OUTPUT>\n\
                     At least one input file and one output file are required."
                );
                std::process::exit(1);
            }
            scan_to_file(args, json).await
        }
        Commands::Analyze { args } => {
            setup_logging(args.verbose);
            if args.files.is_empty() {
                eprintln!("Usage: transcript-hits analyze <MODE> <INPUT>...");
                std::process::exit(1);
            }
            analyze_hits(args).await
        }
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

fn build_recognizer(kind: RecognizerKind, ner_url: Option<String>) -> Result<Option<Recognizer>> {
    let recognizer = match kind {
        RecognizerKind::Anthropic => {
            let config = AnthropicConfig::from_env()?;
            Some(Recognizer::Anthropic(AnthropicRecognizer::new(config)))
        }
        RecognizerKind::Http => {
            let config = HttpNerConfig::from_env_or(ner_url)?;
            Some(Recognizer::Http(HttpRecognizer::new(config)?))
        }
        RecognizerKind::None => None,
    };
    Ok(recognizer)
}

/// Load inputs and terms, then run stages 0 to 2
async fn run_scan(args: &ScanArgs, inputs: &[PathBuf]) -> Result<Vec<Record>> {
    let terms = read_terms_file(&args.terms).context("Failed to load term list")?;
    let matcher = PatternMatcher::new(&terms, &MatcherConfig::default())
        .context("Failed to compile term list")?;
    let recognizer = build_recognizer(args.recognizer, args.ner_url.clone())?;

    let mut records = load_records(inputs, args.mode).context("Failed to read input files")?;

    let summary = scan_records(
        &mut records,
        &matcher,
        recognizer.as_ref(),
        &Stage2Config::default(),
    )
    .await?;

    info!(
        "Scanned {} records ({} lines): {} term/pattern hits, {} proper noun hits",
        summary.normalization.records,
        summary.normalization.lines,
        summary.matching.hits,
        summary.entities.as_ref().map_or(0, |e| e.hits)
    );

    Ok(records)
}

async fn scan_to_file(args: ScanArgs, json: Option<PathBuf>) -> Result<()> {
    let Some((output, inputs)) = args.files.split_last() else {
        anyhow::bail!("No output file given");
    };

    let records = run_scan(&args, inputs).await?;

    info!("Stage 3: Rendering output...");
    let roster = Roster::load(&args.roster)?;
    let stage3_config = Stage3Config {
        generate_csv: true,
        generate_json: json.is_some(),
    };
    let stage3_result = execute_stage3(
        &records,
        args.mode,
        &roster,
        Some(output.as_path()),
        json.as_deref(),
        &stage3_config,
    )?;

    info!(
        "Complete: {} rows written to {:?}",
        stage3_result.rows_written, output
    );
    if let Some(json_path) = stage3_result.json_path {
        info!("Hit report written to {:?}", json_path);
    }

    Ok(())
}

async fn analyze_hits(args: ScanArgs) -> Result<()> {
    let records = run_scan(&args, &args.files).await?;
    let summary = HitSummary::from_records(&records);

    println!("Hit Analysis");
    println!("============");
    println!("Run at: {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));
    println!("Records: {}", summary.total_records);
    println!("Records with hits: {}", summary.records_with_hits);
    println!("Total hits: {}", summary.total_hits);
    println!();

    println!("Hits by Type");
    println!("------------");
    for (kind, count) in &summary.by_kind {
        println!("{}: {}", kind, count);
    }
    println!();

    println!("Hits by Speaker");
    println!("---------------");
    for (speaker, count) in &summary.by_speaker {
        println!("{}: {}", speaker, count);
    }
    println!();

    let mut values: HashMap<(&str, &str), usize> = HashMap::new();
    for hit in records.iter().flat_map(|r| &r.hits) {
        *values.entry((hit.kind.label(), hit.value.as_str())).or_default() += 1;
    }
    let mut ranked: Vec<_> = values.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    println!("Most Frequent Hits");
    println!("------------------");
    for ((kind, value), count) in ranked.iter().take(10) {
        println!("{:>5}  {} ({})", count, value, kind);
    }

    Ok(())
}
