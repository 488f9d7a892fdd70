//! Configuration command implementations

use crate::cli::Output;
use crate::config::PagepoolConfig;
use anyhow::{Context, Result};
use clap::{Subcommand, ValueEnum};

/// Configuration subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the merged configuration
    Show {
        /// Output format
        #[arg(long, value_enum, default_value_t = ConfigFormat::Toml)]
        format: ConfigFormat,
    },
    /// Load and validate the merged configuration
    Validate,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
}

/// Execute config commands
pub fn execute(cmd: ConfigCommands, custom_config: Option<&str>, output: &Output) -> Result<()> {
    match cmd {
        ConfigCommands::Show { format } => show(format, custom_config),
        ConfigCommands::Validate => validate(custom_config, output),
    }
}

fn show(format: ConfigFormat, custom_config: Option<&str>) -> Result<()> {
    let config = PagepoolConfig::load_with(custom_config, None)?;
    print!("{}", render(&config, format)?);
    Ok(())
}

fn render(config: &PagepoolConfig, format: ConfigFormat) -> Result<String> {
    let text = match format {
        ConfigFormat::Toml => {
            toml::to_string_pretty(config).context("Failed to render configuration as TOML")?
        }
        ConfigFormat::Json => {
            let mut json = serde_json::to_string_pretty(config)
                .context("Failed to render configuration as JSON")?;
            json.push('\n');
            json
        }
    };
    Ok(text)
}

fn validate(custom_config: Option<&str>, output: &Output) -> Result<()> {
    let config = PagepoolConfig::load_with(custom_config, None)?;
    config.validate()?;

    output.success("Configuration is valid");
    output.table_row("Processes", &config.pool.processes.to_string());
    output.table_row(
        "Range",
        &format!("[{}, {})", config.range.start, config.range.limit),
    );
    output.table_row(
        "Output directory",
        &config
            .output
            .directory
            .as_ref()
            .map(|d| d.display().to_string())
            .unwrap_or_else(|| "(none)".to_string()),
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_toml_round_trips_through_parser() {
        let config = PagepoolConfig::default();
        let text = render(&config, ConfigFormat::Toml).unwrap();
        assert!(text.contains("processes = 10"));
        let parsed: PagepoolConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_render_json() {
        let text = render(&PagepoolConfig::default(), ConfigFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["pool"]["processes"], 10);
        assert_eq!(value["range"]["url_prefix"], "https://www.google.ca/search?q=");
    }
}
