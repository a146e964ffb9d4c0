//! Subcommand implementations.

use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::io::{ErrorKind, Read, Write};
use std::path::Path;
use tracing::{info, warn};

use ratematch_core::{Catalog, FilterCriteria, MortgageFormData};
use ratematch_runtime::{MissingFieldsService, RuntimeConfig};

use crate::cli::{Cli, Command};

pub async fn run(cli: Cli) -> Result<()> {
    let Cli {
        config,
        model,
        pretty,
        command,
        ..
    } = cli;

    match command {
        Command::Products { catalog, criteria } => {
            let catalog = Catalog::from_path(&catalog)
                .with_context(|| format!("Failed to load catalog {}", catalog.display()))?;
            let criteria = match criteria {
                Some(source) => load_criteria(&source)?,
                None => None,
            };

            let listing = ratematch_core::recommend(&catalog, criteria.as_ref());
            info!(total = listing.total, "Filtered catalog");
            print_json(&listing, pretty)
        }
        Command::Check { form, offline } => {
            let config = load_config(config.as_deref(), model)?;
            let form = load_form(&form)?;

            let service = if offline {
                MissingFieldsService::offline(config)
            } else {
                MissingFieldsService::from_config(config)
            }
            .context("Failed to start missing-fields service")?;

            let report = service.check(&form).await.context("Missing-fields check failed")?;
            info!(
                missing = report.response.missing_fields.len(),
                tokens = report.usage.total_tokens,
                completed_at = %report.completed_at,
                "Check finished"
            );
            print_json(&report.response, pretty)
        }
        Command::Chat { message } => {
            let config = load_config(config.as_deref(), model)?;
            let service = MissingFieldsService::from_config(config)
                .context("Failed to start missing-fields service")?;

            let reply = service.chat(&message).await.context("Chat failed")?;
            print_json(&reply, pretty)
        }
        Command::Health => {
            let config = load_config(config.as_deref(), model)?;
            let service = match MissingFieldsService::from_config(config.clone()) {
                Ok(service) => service,
                Err(e) => {
                    warn!(error = %e, "Provider unavailable, reporting offline health");
                    MissingFieldsService::offline(config)
                        .context("Failed to start missing-fields service")?
                }
            };
            print_json(&service.health().await, pretty)
        }
    }
}

/// Config file if given, then the `--model` override.
fn load_config(path: Option<&Path>, model: Option<String>) -> Result<RuntimeConfig> {
    let mut config = match path {
        Some(path) => RuntimeConfig::from_yaml_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => RuntimeConfig::default(),
    };

    if let Some(model) = model {
        config.completion.model = Some(model);
    }
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Blank input is an absent body: no criteria, whole catalog.
fn load_criteria(source: &str) -> Result<Option<FilterCriteria>> {
    let text = read_source(source)?;
    parse_criteria(&text, is_yaml(source))
        .with_context(|| format!("Failed to parse criteria from {}", describe(source)))
}

fn parse_criteria(text: &str, yaml: bool) -> Result<Option<FilterCriteria>> {
    if text.trim().is_empty() {
        return Ok(None);
    }

    let criteria = if yaml {
        FilterCriteria::from_yaml(text)?
    } else {
        FilterCriteria::from_json(text)?
    };
    Ok(Some(criteria))
}

fn load_form(source: &str) -> Result<MortgageFormData> {
    let text = read_source(source)?;
    if text.trim().is_empty() {
        bail!("No form data in {}", describe(source));
    }

    let parsed = if is_yaml(source) {
        MortgageFormData::from_yaml(&text)
    } else {
        MortgageFormData::from_json(&text)
    };
    parsed.with_context(|| format!("Failed to parse form from {}", describe(source)))
}

/// Read a file, or stdin for `-`.
fn read_source(source: &str) -> Result<String> {
    if source == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read stdin")?;
        return Ok(text);
    }

    std::fs::read_to_string(source).with_context(|| format!("Failed to read {}", source))
}

fn is_yaml(source: &str) -> bool {
    matches!(
        Path::new(source).extension().and_then(|e| e.to_str()),
        Some("yaml" | "yml")
    )
}

fn describe(source: &str) -> &str {
    if source == "-" {
        "stdin"
    } else {
        source
    }
}

/// A closed pipe (`ratematch products | head`) is not an error.
fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .context("Failed to serialize output")?;

    write_output(&mut std::io::stdout().lock(), &json)
}

fn write_output(out: &mut impl Write, json: &str) -> Result<()> {
    match writeln!(out, "{}", json).and_then(|_| out.flush()) {
        Err(e) if e.kind() == ErrorKind::BrokenPipe => Ok(()),
        result => result.context("Failed to write output"),
    }
}
