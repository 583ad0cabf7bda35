use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::Parser;
use tag_pattern::image::{ImageInfo, filter_and_sort};
use tag_pattern::pattern::{Pattern, TagMatcher};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tag-pattern")]
#[command(version, about = "Match image tags against a glob or semver pattern, newest first")]
struct Cli {
    /// Pattern such as `glob:v1.*` or `semver:>=1.2.0 <2.0.0` (no prefix means glob)
    pattern: String,

    /// Candidate tags, optionally with a creation time: `TAG@2024-01-31T12:00:00Z`
    tags: Vec<String>,

    /// Fail on an invalid semver expression instead of matching every version
    #[arg(long)]
    strict: bool,

    /// Only report whether the pattern is valid
    #[arg(long)]
    validate: bool,
}

fn parse_image(arg: &str) -> anyhow::Result<ImageInfo> {
    let Some((tag, created_at)) = arg.rsplit_once('@') else {
        return Ok(ImageInfo::new(arg));
    };
    let created_at = DateTime::parse_from_rfc3339(created_at)
        .with_context(|| format!("Invalid creation time in '{}'", arg))?;
    Ok(ImageInfo::new(tag).with_created_at(created_at.with_timezone(&Utc)))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let pattern = if cli.strict {
        Pattern::try_new(&cli.pattern)
            .with_context(|| format!("Invalid pattern '{}'", cli.pattern))?
    } else {
        Pattern::new(&cli.pattern)
    };

    if cli.validate {
        let valid = pattern.is_valid();
        println!("{}: {}", pattern, if valid { "valid" } else { "invalid" });
        if !valid {
            std::process::exit(1);
        }
        return Ok(());
    }

    let images = cli
        .tags
        .iter()
        .map(|arg| parse_image(arg))
        .collect::<anyhow::Result<Vec<_>>>()?;

    for image in filter_and_sort(&pattern, images) {
        println!("{}", image.tag);
    }

    Ok(())
}
