//! Argbind CLI - inspect how a line is tokenized, extracted and bound
//!
//! Usage:
//!   argbind tokenize "copy 'a b' n=1"                  # JSON array of words
//!   argbind extract "copy 'a b' n=1"                   # positionals + keywords
//!   argbind bind --spec copy.json "src dst retries=3"  # typed arguments
//!   argbind bind --positional int --keyword retries:int=0 "3 9"
//!   argbind schema                                      # JSON Schema of a spec file

use anyhow::{Context, Result, bail};
use argbind::{ArgParser, DuplicatePolicy, KeywordSlot, ParameterSpec, ParseOptions, SemanticType};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Argbind - text to typed arguments
#[derive(Parser, Debug)]
#[command(name = "argbind")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Keyword separator
    #[arg(long = "equals", global = true, default_value = "=")]
    equals: String,

    /// Quote characters
    #[arg(long, global = true, default_value = "'\"")]
    quotes: String,

    /// Treat backslash inside quotes as an ordinary character
    #[arg(long, global = true)]
    no_escape: bool,

    /// Decode escape sequences (\n, \t, \u{..}) in extracted values
    #[arg(long, global = true)]
    process_escapes: bool,

    /// Keep the last value when a keyword is given twice
    #[arg(long, global = true)]
    last_wins: bool,

    /// Log parser decisions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: SubCmd,
}

#[derive(Subcommand, Debug)]
enum SubCmd {
    /// Split a line into words
    Tokenize { line: String },

    /// Extract positionals and keywords from a line
    Extract { line: String },

    /// Bind a line against a parameter spec
    Bind {
        /// JSON file with a parameter spec
        #[arg(long, conflicts_with_all = ["positional", "keyword", "var_args", "var_kwargs"])]
        spec: Option<PathBuf>,

        /// Required positional slot type (repeatable)
        #[arg(long)]
        positional: Vec<String>,

        /// Optional keyword slot as NAME:TYPE[=DEFAULT] (repeatable)
        #[arg(long)]
        keyword: Vec<String>,

        /// Accept extra positionals
        #[arg(long)]
        var_args: bool,

        /// Accept undeclared keywords
        #[arg(long)]
        var_kwargs: bool,

        line: String,
    },

    /// Print the JSON Schema of a parameter spec file
    Schema,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::from_default_env()
                    .add_directive(tracing::Level::TRACE.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }

    let parser = ArgParser::builder().options(parse_options(&args)?).build();

    match &args.command {
        SubCmd::Tokenize { line } => {
            let tokens = parser.tokenize(line).context("Failed to tokenize line")?;
            print_json(&tokens)
        }
        SubCmd::Extract { line } => {
            let raw = parser.parse_line(line).context("Failed to extract arguments")?;
            print_json(&raw)
        }
        SubCmd::Bind {
            spec,
            positional,
            keyword,
            var_args,
            var_kwargs,
            line,
        } => {
            let spec = match spec {
                Some(path) => load_spec(path)?,
                None => inline_spec(positional, keyword, *var_args, *var_kwargs)?,
            };
            let typed = parser.parse(line, &spec).context("Failed to bind arguments")?;
            print_json(&typed)
        }
        SubCmd::Schema => print_json(&schemars::schema_for!(ParameterSpec)),
    }
}

fn parse_options(args: &Args) -> Result<ParseOptions> {
    if args.quotes.chars().any(char::is_whitespace) {
        bail!("quote characters must not include whitespace");
    }
    let mut options = ParseOptions::new()
        .quote_chars(args.quotes.chars())
        .equality_specifier(args.equals.as_str())
        .process_escapes(args.process_escapes);
    if args.no_escape {
        options = options.escape_char(None);
    }
    if args.last_wins {
        options = options.duplicate_keywords(DuplicatePolicy::LastWins);
    }
    Ok(options)
}

fn load_spec(path: &Path) -> Result<ParameterSpec> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read spec: {}", path.display()))?;
    let spec: ParameterSpec = serde_json::from_str(&text)
        .with_context(|| format!("Invalid spec: {}", path.display()))?;
    spec.validate()
        .with_context(|| format!("Invalid spec: {}", path.display()))?;
    Ok(spec)
}

fn inline_spec(
    positionals: &[String],
    keywords: &[String],
    var_args: bool,
    var_kwargs: bool,
) -> Result<ParameterSpec> {
    let mut spec = ParameterSpec::new();
    for ty in positionals {
        spec = spec.positional(ty.parse().with_context(|| format!("--positional {ty}"))?);
    }
    for slot in keywords {
        spec.keywords
            .push(parse_keyword_slot(slot).with_context(|| format!("--keyword {slot}"))?);
    }
    spec.var_args = var_args;
    spec.var_kwargs = var_kwargs;
    spec.validate()?;
    Ok(spec)
}

/// Parse `NAME:TYPE[=DEFAULT]`. The default is read as JSON, falling back to
/// a plain string.
fn parse_keyword_slot(text: &str) -> Result<KeywordSlot> {
    let (decl, default) = match text.split_once('=') {
        Some((decl, default)) => (
            decl,
            serde_json::from_str(default)
                .unwrap_or_else(|_| serde_json::Value::String(default.to_string())),
        ),
        None => (text, serde_json::Value::Null),
    };
    let (name, ty) = match decl.split_once(':') {
        Some((name, ty)) => (name, ty.parse::<SemanticType>()?),
        None => (decl, SemanticType::Text),
    };
    if name.is_empty() {
        bail!("keyword slot needs a name");
    }
    Ok(KeywordSlot::new(name, ty, default))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{json}");
    Ok(())
}
