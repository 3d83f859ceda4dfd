use crate::{Config, PaletteError, ShortfallPolicy};
use clap::Parser;
use std::path::PathBuf;
use tokio::fs;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "dominant-colors")]
#[command(about = "Download images and report their three most frequent colors")]
#[command(version)]
pub struct Cli {
    #[arg(short, long, help = "Input file containing URLs (one per line) [default: ./input.txt]")]
    pub input: Option<PathBuf>,

    #[arg(short, long, help = "Output file results are appended to [default: ./output.txt]")]
    pub output: Option<PathBuf>,

    #[arg(short, long, help = "Number of concurrent image workers [default: 10]")]
    pub concurrency: Option<usize>,

    #[arg(long, help = "Configuration file path (JSON)")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Per-download timeout in seconds")]
    pub timeout: Option<u64>,

    #[arg(long, help = "User-Agent header for downloads")]
    pub user_agent: Option<String>,

    #[arg(long, help = "Images with fewer than three colors (pad-last, skip)")]
    pub shortfall: Option<String>,

    #[arg(long, help = "Enable verbose logging")]
    pub verbose: bool,
}

/// Builds the run configuration: defaults, then the optional JSON file,
/// then command-line overrides.
pub async fn load_config(args: &Cli) -> Result<Config, PaletteError> {
    let mut config = if let Some(config_path) = &args.config {
        let config_content = fs::read_to_string(config_path)
            .await
            .map_err(|e| PaletteError::file_open(config_path, e))?;
        serde_json::from_str(&config_content)?
    } else {
        Config::default()
    };

    if let Some(input) = &args.input {
        config.input_path = input.clone();
    }

    if let Some(output) = &args.output {
        config.output_path = output.clone();
    }

    if let Some(concurrency) = args.concurrency {
        config.concurrency = concurrency;
    }

    if let Some(timeout) = args.timeout {
        config.request_timeout_secs = Some(timeout);
    }

    if let Some(user_agent) = &args.user_agent {
        config.user_agent = Some(user_agent.clone());
    }

    if let Some(shortfall) = &args.shortfall {
        config.shortfall_policy = parse_shortfall(shortfall)?;
    }

    config.validate()?;

    info!("Concurrency: {}", config.concurrency);
    info!("Input: {}", config.input_path.display());
    info!("Output: {}", config.output_path.display());
    info!("Request timeout: {:?}", config.request_timeout());

    Ok(config)
}

fn parse_shortfall(value: &str) -> Result<ShortfallPolicy, PaletteError> {
    match value {
        "pad-last" | "pad_last" => Ok(ShortfallPolicy::PadLast),
        "skip" => Ok(ShortfallPolicy::Skip),
        other => Err(PaletteError::Configuration(format!(
            "Unknown shortfall policy '{other}' (expected pad-last or skip)"
        ))),
    }
}

pub fn setup_logging(verbose: bool) -> anyhow::Result<()> {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio_test::{assert_err, assert_ok};

    #[tokio::test]
    async fn test_no_arguments_uses_defaults() {
        let args = Cli::parse_from(["dominant-colors"]);
        let config = assert_ok!(load_config(&args).await);

        assert_eq!(config.concurrency, 10);
        assert_eq!(config.input_path, PathBuf::from("./input.txt"));
        assert_eq!(config.output_path, PathBuf::from("./output.txt"));
        assert_eq!(config.shortfall_policy, ShortfallPolicy::PadLast);
    }

    #[tokio::test]
    async fn test_overrides() {
        let args = Cli::parse_from([
            "dominant-colors",
            "--input",
            "urls.txt",
            "-c",
            "3",
            "--timeout",
            "15",
            "--shortfall",
            "skip",
        ]);
        let config = assert_ok!(load_config(&args).await);

        assert_eq!(config.input_path, PathBuf::from("urls.txt"));
        assert_eq!(config.concurrency, 3);
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(15)));
        assert_eq!(config.shortfall_policy, ShortfallPolicy::Skip);
    }

    #[tokio::test]
    async fn test_config_file_then_flags() {
        let path = std::env::temp_dir().join(format!("dominant-colors-{}.json", uuid::Uuid::new_v4()));
        fs::write(&path, r#"{ "concurrency": 2, "output_path": "colors.txt", "request_timeout_secs": 20 }"#)
            .await
            .unwrap();

        let args = Cli::parse_from([
            "dominant-colors",
            "--config",
            path.to_str().unwrap(),
            "--concurrency",
            "5",
        ]);
        let config = assert_ok!(load_config(&args).await);

        assert_eq!(config.concurrency, 5);
        assert_eq!(config.output_path, PathBuf::from("colors.txt"));
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(20)));

        let _ = fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn test_rejects_bad_values() {
        let args = Cli::parse_from(["dominant-colors", "--concurrency", "0"]);
        assert!(matches!(load_config(&args).await, Err(PaletteError::Configuration(_))));

        let args = Cli::parse_from(["dominant-colors", "--shortfall", "repeat"]);
        let err = assert_err!(load_config(&args).await);
        assert!(err.to_string().contains("repeat"));
    }
}
