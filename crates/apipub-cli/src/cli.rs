use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "apipub")]
#[command(about = "apipub CLI: run lifecycle events and render API definitions")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (defaults to apipub.toml)
    #[arg(short, long, global = true, env = "APIPUB_CONFIG")]
    pub config: Option<String>,

    /// Output format
    #[arg(short, long, global = true)]
    pub format: Option<OutputFormat>,
}

#[derive(Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one lifecycle event and print the result
    Invoke(InvokeArgs),
    /// Render the API definition template
    Render(RenderArgs),
}

#[derive(clap::Args)]
pub struct InvokeArgs {
    /// Lifecycle event JSON file
    pub event: PathBuf,
    /// Run against in-memory backends instead of the configured endpoints
    #[arg(long)]
    pub dry_run: bool,
    /// With --dry-run, pretend an API with the event's name already exists
    #[arg(long, value_name = "API_ID", requires = "dry_run")]
    pub existing: Option<String>,
}

#[derive(clap::Args)]
pub struct RenderArgs {
    /// Template file (overrides template.path from config)
    #[arg(short, long)]
    pub template: Option<PathBuf>,
    /// Take substitutions from the properties of a lifecycle event
    #[arg(short, long)]
    pub event: Option<PathBuf>,
    /// Placeholder value, applied after the event's (repeatable)
    #[arg(short, long = "set", value_name = "KEY=VALUE", value_parser = parse_key_val)]
    pub set: Vec<(String, String)>,
}

pub fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("Invalid KEY=VALUE: no `=` found in `{s}`"))?;
    if key.is_empty() {
        return Err(format!("Invalid KEY=VALUE: empty key in `{s}`"));
    }
    Ok((key.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_val() {
        assert_eq!(
            parse_key_val("API_NAME=demo").unwrap(),
            ("API_NAME".to_string(), "demo".to_string())
        );
        assert_eq!(
            parse_key_val("URL=https://x?a=b").unwrap(),
            ("URL".to_string(), "https://x?a=b".to_string())
        );
        assert!(parse_key_val("novalue").is_err());
        assert!(parse_key_val("=x").is_err());
    }

    #[test]
    fn test_parse_invoke() {
        let cli = Cli::try_parse_from(["apipub", "invoke", "event.json", "--dry-run"]).unwrap();
        match cli.command {
            Commands::Invoke(args) => {
                assert_eq!(args.event, PathBuf::from("event.json"));
                assert!(args.dry_run);
                assert!(args.existing.is_none());
            }
            Commands::Render(_) => panic!("expected invoke"),
        }
    }

    #[test]
    fn test_existing_requires_dry_run() {
        assert!(Cli::try_parse_from(["apipub", "invoke", "e.json", "--existing", "abc"]).is_err());
    }

    #[test]
    fn test_parse_render_sets() {
        let cli = Cli::try_parse_from([
            "apipub",
            "--config",
            "custom.toml",
            "render",
            "--set",
            "API_NAME=demo",
            "--set",
            "OTHER=1",
        ])
        .unwrap();
        assert_eq!(cli.config.as_deref(), Some("custom.toml"));
        match cli.command {
            Commands::Render(args) => {
                assert_eq!(args.set.len(), 2);
                assert!(args.template.is_none());
            }
            Commands::Invoke(_) => panic!("expected render"),
        }
    }
}
