use anyhow::{Context as AnyhowContext, Result};
use clap::Parser;
use metashu_core::{OutputMode, ShuffleOptions, ShuffleReport, Shuffler, Window};
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

mod flags;

use flags::HashFlag;

/// Environment fallback for `--salt`
pub const SALT_ENV: &str = "METASHU_SALT";

fn print_stdout(text: &str) -> Result<()> {
    use std::io::Write;

    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

#[derive(Parser, Debug)]
#[command(name = "metashu")]
#[command(
    about = "Shuffle an array of NFT metadata using a salt (e.g. a future block hash)",
    long_about = None
)]
#[command(version)]
#[command(after_help = "Examples:
  # export a single shuffled array
  metashu -i all-meta.json -o shuffled-meta.json -s 0x0863243f8d858815db8de23b7f1399b8f975672a750284209ac35e8d91d89afd

  # export one file per token id into an existing folder
  metashu -i all-meta.json -o meta -s 0x0863...afd --add-token-id --extension")]
struct Cli {
    /// A file containing an array of metadata JSON
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Where to save the shuffled array; an existing folder gets one file per token id
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// The salt used to shuffle the array (defaults to $METASHU_SALT)
    #[arg(short, long)]
    salt: Option<String>,

    /// Token id of the first ranked record (default: 1)
    #[arg(short, long)]
    first_id: Option<u64>,

    /// Add a tokenId property to every exported record
    #[arg(short, long)]
    add_token_id: bool,

    /// Inclusive range of ranked positions to export, e.g. 0,99
    #[arg(long, value_parser = parse_subset, conflicts_with = "limit")]
    subset: Option<Window>,

    /// Export only the first N ranked records (same as --subset 0,N-1)
    #[arg(short, long)]
    limit: Option<usize>,

    /// Rename records to <PREFIX><tokenId>
    #[arg(short, long)]
    prefix: Option<String>,

    /// Name template, e.g. "Everdragons Genesis #{id} | {name}" ({{ and }} for literal braces)
    #[arg(short, long)]
    mask: Option<String>,

    /// Prefix for per-record file names
    #[arg(long)]
    file_prefix: Option<String>,

    /// Add a .json extension to per-record file names
    #[arg(short, long)]
    extension: bool,

    /// Where to save records outside the subset (default: next to the input)
    #[arg(short, long)]
    remaining: Option<PathBuf>,

    /// Digest algorithm
    #[arg(long, value_enum)]
    hash: Option<HashFlag>,

    /// JSON file with default options (camelCase keys); flags take precedence
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the run report as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(short, long)]
    quiet: bool,
}

fn parse_subset(raw: &str) -> std::result::Result<Window, String> {
    let (start, end) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected START,END but got '{raw}'"))?;
    let parse = |value: &str| {
        value
            .trim()
            .parse::<usize>()
            .map_err(|err| format!("invalid subset bound '{value}': {err}"))
    };
    Ok(Window {
        start: parse(start)?,
        end: parse(end)?,
    })
}

fn load_options_file(path: &Path) -> Result<ShuffleOptions> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read options from {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Invalid options JSON in {}", path.display()))
}

impl Cli {
    /// Layer flags over `base`; the salt falls back to `env_salt` when nothing else sets it.
    fn into_options(self, mut base: ShuffleOptions, env_salt: Option<String>) -> ShuffleOptions {
        if self.input.is_some() {
            base.input = self.input;
        }
        if self.output.is_some() {
            base.output = self.output;
        }
        if self.salt.is_some() {
            base.salt = self.salt;
        }
        base.salt = base.salt.filter(|salt| !salt.is_empty());
        if base.salt.is_none() {
            base.salt = env_salt.filter(|salt| !salt.is_empty());
        }
        if self.first_id.is_some() {
            base.first_id = self.first_id;
        }
        if self.subset.is_some() || self.limit.is_some() {
            base.subset = self.subset;
            base.limit = self.limit;
        }
        if self.prefix.is_some() {
            base.prefix = self.prefix;
        }
        if self.mask.is_some() {
            base.mask = self.mask;
        }
        if self.file_prefix.is_some() {
            base.file_prefix = self.file_prefix;
        }
        if self.remaining.is_some() {
            base.remaining = self.remaining;
        }
        if let Some(hash) = self.hash {
            base.hash = hash.as_domain();
        }
        base.add_token_id |= self.add_token_id;
        base.extension |= self.extension;
        base
    }
}

fn render_summary(report: &ShuffleReport) -> String {
    let mut text = match report.mode {
        OutputMode::Aggregate => format!(
            "Shuffled {} records into {}",
            report.selected,
            report.output.display()
        ),
        OutputMode::PerRecord => format!(
            "Shuffled {} records into {} (one file per token id)",
            report.selected,
            report.output.display()
        ),
    };
    if let (Some(first), Some(last)) = (report.first_token_id, report.last_token_id) {
        text.push_str(&format!(", token ids {first}..={last}"));
    }
    if let Some(path) = &report.remaining_path {
        text.push_str(&format!(
            "\n{} remaining records saved to {}",
            report.remaining,
            path.display()
        ));
    }
    text
}

pub async fn main_entry() -> Result<()> {
    let mut cli = Cli::parse();
    if cli.json {
        cli.quiet = true;
    }

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    log::info!("metashu v{}", env!("CARGO_PKG_VERSION"));

    let base = match &cli.config {
        Some(path) => load_options_file(path)?,
        None => ShuffleOptions::default(),
    };
    let json = cli.json;
    let options = cli.into_options(base, env::var(SALT_ENV).ok());

    let report = Shuffler::new(options).run().await?;

    let output = if json {
        serde_json::to_string_pretty(&report)?
    } else {
        render_summary(&report)
    };
    print_stdout(&output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use metashu_core::HashAlgorithm;
    use pretty_assertions::assert_eq;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("metashu").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn subset_flag_parses_inclusive_bounds() {
        assert_eq!(parse_subset("0,99").unwrap(), Window { start: 0, end: 99 });
        assert_eq!(parse_subset(" 3 , 7 ").unwrap(), Window { start: 3, end: 7 });
        assert!(parse_subset("12").is_err());
        assert!(parse_subset("a,2").is_err());
    }

    #[test]
    fn subset_and_limit_conflict() {
        let result = Cli::try_parse_from(["metashu", "--subset", "0,9", "--limit", "10"]);
        assert!(result.is_err());
    }

    #[test]
    fn flags_map_onto_options() {
        let cli = parse(&[
            "-i", "in.json", "-o", "out", "-s", "0xabc", "-f", "0", "-a", "--limit", "5", "-p",
            "Ape #", "--file-prefix", "ape-", "-e", "--hash", "blake3",
        ]);
        let options = cli.into_options(ShuffleOptions::default(), None);
        assert_eq!(
            options,
            ShuffleOptions {
                input: Some(PathBuf::from("in.json")),
                output: Some(PathBuf::from("out")),
                salt: Some("0xabc".to_string()),
                first_id: Some(0),
                add_token_id: true,
                prefix: Some("Ape #".to_string()),
                limit: Some(5),
                file_prefix: Some("ape-".to_string()),
                extension: true,
                hash: HashAlgorithm::Blake3,
                ..Default::default()
            }
        );
    }

    #[test]
    fn flags_override_config_file_values() {
        let base = ShuffleOptions {
            input: Some(PathBuf::from("file.json")),
            salt: Some("from-file".to_string()),
            subset: Some(Window { start: 10, end: 20 }),
            mask: Some("{name}".to_string()),
            ..Default::default()
        };
        let cli = parse(&["-s", "from-flag", "-l", "3"]);
        let options = cli.into_options(base, Some("from-env".to_string()));
        assert_eq!(options.input, Some(PathBuf::from("file.json")));
        assert_eq!(options.salt.as_deref(), Some("from-flag"));
        assert_eq!(options.subset, None);
        assert_eq!(options.limit, Some(3));
        assert_eq!(options.mask.as_deref(), Some("{name}"));
    }

    #[test]
    fn environment_salt_is_only_a_fallback() {
        let options = parse(&[]).into_options(ShuffleOptions::default(), Some("env".to_string()));
        assert_eq!(options.salt.as_deref(), Some("env"));

        let base = ShuffleOptions {
            salt: Some("file".to_string()),
            ..Default::default()
        };
        let options = parse(&[]).into_options(base, Some("env".to_string()));
        assert_eq!(options.salt.as_deref(), Some("file"));

        let options = parse(&[]).into_options(ShuffleOptions::default(), Some(String::new()));
        assert_eq!(options.salt, None);
    }

    #[test]
    fn empty_salt_from_file_or_flag_uses_environment() {
        let base = ShuffleOptions {
            salt: Some(String::new()),
            ..Default::default()
        };
        let options = parse(&[]).into_options(base, Some("env".to_string()));
        assert_eq!(options.salt.as_deref(), Some("env"));

        let options =
            parse(&["-s", ""]).into_options(ShuffleOptions::default(), Some("env".to_string()));
        assert_eq!(options.salt.as_deref(), Some("env"));

        let base = ShuffleOptions {
            salt: Some(String::new()),
            ..Default::default()
        };
        let options = parse(&[]).into_options(base, None);
        assert_eq!(options.salt, None);
    }

    #[test]
    fn summary_mentions_remaining_file() {
        let report = ShuffleReport {
            output: PathBuf::from("out.json"),
            mode: OutputMode::Aggregate,
            selected: 10,
            remaining: 5,
            remaining_path: Some(PathBuf::from("rest.json")),
            first_token_id: Some(1),
            last_token_id: Some(10),
            hash: HashAlgorithm::Sha256,
        };
        assert_eq!(
            render_summary(&report),
            "Shuffled 10 records into out.json, token ids 1..=10\n5 remaining records saved to rest.json"
        );
    }
}
