use std::{
    fs::File,
    io::{self, BufRead, BufReader, Write},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tf_idf_responder::{
    utils::resource::{read_lines, read_stopwords},
    Analyzer, IdfPolicy, LexiconSentiment, ProfanityFilter, Responder, ResponderConfig, ResponderError,
    SentimentMode,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Answers queries with the most similar line of a text corpus.
#[derive(Parser, Debug)]
#[command(name = "tf-idf-responder", version, about)]
struct Cli {
    /// Corpus file, one response per line
    #[arg(long)]
    corpus: PathBuf,

    /// Stopword list, one word per line
    #[arg(long)]
    stopwords: PathBuf,

    /// Profanity list, one word per line
    #[arg(long)]
    profanity: PathBuf,

    /// TOML responder config; flags given on the command line win
    #[arg(long)]
    config: Option<PathBuf>,

    /// Sentiment lexicon, `word score` per line
    #[arg(long)]
    sentiment_lexicon: Option<PathBuf>,

    /// Prompt for queries until `quit` instead of answering a batch
    #[arg(short, long)]
    interactive: bool,

    /// Batch input, one query per line (default: stdin)
    #[arg(long, conflicts_with = "interactive")]
    queries: Option<PathBuf>,

    /// Drop responses with negative sentiment
    #[arg(long)]
    exclude_negative: bool,

    /// Keep responses whose sentiment sign matches the query's
    #[arg(long)]
    match_sentiment: bool,

    /// How query time IDF relates to the training corpus [default: overlay]
    #[arg(long, value_enum)]
    idf_policy: Option<PolicyArg>,

    /// Increase log verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PolicyArg {
    Overlay,
    Incremental,
    Frozen,
}

impl From<PolicyArg> for IdfPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Overlay => IdfPolicy::Overlay,
            PolicyArg::Incremental => IdfPolicy::Incremental,
            PolicyArg::Frozen => IdfPolicy::Frozen,
        }
    }
}

impl Cli {
    fn config(&self) -> Result<ResponderConfig> {
        let mut config = match &self.config {
            Some(path) => ResponderConfig::from_file(path).context("loading config")?,
            None => ResponderConfig::default(),
        };
        if let Some(policy) = self.idf_policy {
            config.idf_policy = policy.into();
        }
        config.sentiment = SentimentMode {
            exclude_negative: config.sentiment.exclude_negative || self.exclude_negative,
            match_sentiment: config.sentiment.match_sentiment || self.match_sentiment,
        };
        Ok(config)
    }

    fn log_filter(&self) -> EnvFilter {
        let level = match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        };
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    }
}

fn build_responder(cli: &Cli) -> Result<Responder> {
    let stopwords = read_stopwords(&cli.stopwords).context("loading stopwords")?;
    let profanity = ProfanityFilter::from_file(&cli.profanity).context("loading profanity list")?;
    let mut responder = Responder::new(cli.config()?, Analyzer::new(stopwords), profanity);
    if let Some(path) = &cli.sentiment_lexicon {
        let lexicon = LexiconSentiment::from_file(path).context("loading sentiment lexicon")?;
        responder = responder.with_sentiment(lexicon);
    }
    let lines = read_lines(&cli.corpus).context("loading corpus")?;
    responder.train(lines).context("training")?;
    Ok(responder)
}

/// Answer one query per input line. Returns false once the session ended.
fn answer(responder: &mut Responder, query: &str, out: &mut impl Write) -> Result<bool> {
    match responder.match_best_input(query) {
        Ok(answer) => {
            writeln!(out, "{answer}")?;
            Ok(true)
        }
        Err(ResponderError::EmptyQuery) => {
            info!("empty query, ending session");
            Ok(false)
        }
        Err(e) => Err(e).context("answering query"),
    }
}

fn run_batch(responder: &mut Responder, input: impl BufRead, out: &mut impl Write) -> Result<()> {
    for line in input.lines() {
        let line = line.context("reading queries")?;
        if !answer(responder, &line, out)? {
            break;
        }
    }
    Ok(())
}

fn run_interactive(responder: &mut Responder, input: impl BufRead, out: &mut impl Write) -> Result<()> {
    writeln!(out, "Tell or ask me something. Type 'quit' to exit.")?;
    let mut lines = input.lines();
    loop {
        write!(out, "> ")?;
        out.flush()?;
        let Some(line) = lines.next() else { break };
        let line = line.context("reading input")?;
        if line.trim().eq_ignore_ascii_case("quit") {
            break;
        }
        if !answer(responder, &line, out)? {
            break;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(cli.log_filter())
        .init();

    let mut responder = build_responder(&cli)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if cli.interactive {
        run_interactive(&mut responder, io::stdin().lock(), &mut out)
    } else if let Some(path) = &cli.queries {
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        run_batch(&mut responder, BufReader::new(file), &mut out)
    } else {
        run_batch(&mut responder, io::stdin().lock(), &mut out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REQUIRED: [&str; 7] = [
        "tf-idf-responder",
        "--corpus",
        "corpus.txt",
        "--stopwords",
        "stopwords.txt",
        "--profanity",
        "profanity.txt",
    ];

    fn parse(extra: &[&str]) -> std::result::Result<Cli, clap::Error> {
        Cli::try_parse_from(REQUIRED.iter().chain(extra).copied())
    }

    fn responder() -> Responder {
        let mut r = Responder::new(
            ResponderConfig::default(),
            Analyzer::new(["i", "is"]),
            ProfanityFilter::default(),
        );
        r.train(["I love pizza", "I hate rain", "Pizza is great"]).unwrap();
        r
    }

    #[test]
    fn cli_requires_resources() {
        assert!(Cli::try_parse_from(["tf-idf-responder"]).is_err());
        let cli = parse(&[]).unwrap();
        assert!(!cli.interactive);
        assert_eq!(cli.idf_policy, None);
        let config = cli.config().unwrap();
        assert_eq!(config.idf_policy, IdfPolicy::Overlay);
        assert!(!config.sentiment.is_enabled());
    }

    #[test]
    fn cli_parses_filters_and_policy() {
        let cli = parse(&["--exclude-negative", "--match-sentiment", "--idf-policy", "frozen", "-vv"]).unwrap();
        let config = cli.config().unwrap();
        assert!(config.sentiment.exclude_negative && config.sentiment.match_sentiment);
        assert_eq!(config.idf_policy, IdfPolicy::Frozen);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn flags_override_the_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("responder.toml");
        std::fs::write(&path, "idf_policy = \"frozen\"\nseed = 42\n[sentiment]\nexclude_negative = true\n").unwrap();
        let path = path.to_str().unwrap();

        let from_file = parse(&["--config", path]).unwrap().config().unwrap();
        assert_eq!(from_file.idf_policy, IdfPolicy::Frozen);
        assert_eq!(from_file.seed, 42);
        assert!(from_file.sentiment.exclude_negative);

        let overridden = parse(&["--config", path, "--idf-policy", "incremental", "--match-sentiment"])
            .unwrap()
            .config()
            .unwrap();
        assert_eq!(overridden.idf_policy, IdfPolicy::Incremental);
        assert!(overridden.sentiment.exclude_negative && overridden.sentiment.match_sentiment);
    }

    #[test]
    fn cli_rejects_queries_in_interactive_mode() {
        assert!(parse(&["--interactive", "--queries", "q.txt"]).is_err());
    }

    #[test]
    fn batch_stops_at_empty_query() {
        let mut out = Vec::new();
        run_batch(&mut responder(), "I love pizza\nxyzzy\n\nI hate rain\n".as_bytes(), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "I love pizza\nI don't know\n");
    }

    #[test]
    fn interactive_stops_at_quit() {
        let mut out = Vec::new();
        run_interactive(&mut responder(), "I love pizza\nQUIT\nI hate rain\n".as_bytes(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("> I love pizza\n"));
        assert!(!text.contains("I hate rain"));
    }
}
