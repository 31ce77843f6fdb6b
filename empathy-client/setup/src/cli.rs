use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Error};
use clap::{Parser, Subcommand};
use empathy_configuration::AppConfig;
use empathy_domain::EmotionPresentationMapper;
use tokio::io::{AsyncReadExt, BufReader};
use validator::Validate;

use crate::render::{render_descriptor, render_view};
use crate::{rest_client, Application, InteractiveSession};

/// Terminal client for the narrative emotion analysis service
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Analysis service base address, overriding configuration
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyze one narrative and print the result
    Analyze {
        /// Narrative text; read from stdin when omitted
        text: Option<String>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        /// Save the generated audio into this directory
        #[arg(long, value_name = "DIR")]
        export: Option<PathBuf>,
    },

    /// Compose and submit narratives line by line
    Interactive,

    /// Show the emotion presentation table, or one entry
    Legend { emotion: Option<String> },

    /// Check that the analysis service is reachable
    Health,
}

impl Cli {
    /// Applies command-line overrides on top of file and environment configuration.
    pub fn apply_overrides(&self, config: &mut AppConfig) -> Result<(), Error> {
        if let Some(base_url) = &self.base_url {
            config.service.base_url = base_url.clone();
            config
                .validate()
                .with_context(|| format!("invalid --base-url `{base_url}`"))?;
        }
        Ok(())
    }
}

pub async fn run(cli: Cli, config: AppConfig) -> Result<(), Error> {
    match cli.command {
        Command::Analyze { text, json, export } => {
            let text = match text {
                Some(text) => text,
                None => read_stdin().await?,
            };
            let app = Application::new(config)?;
            let view = app.analyze_once(&text).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                println!("{}", render_view(&view));
            }
            if let Some(directory) = export {
                let path = app.export(&view, Some(&directory)).await?;
                eprintln!("exported audio to {}", path.display());
            }
            Ok(())
        }
        Command::Interactive => {
            let app = Application::new(config)?;
            let reader = BufReader::new(tokio::io::stdin());
            InteractiveSession::new(&app, tokio::io::stdout())
                .run(reader)
                .await
        }
        Command::Legend { emotion: Some(raw) } => {
            let descriptor = EmotionPresentationMapper::lookup(&raw)?;
            println!("{}", render_descriptor(&descriptor));
            Ok(())
        }
        Command::Legend { emotion: None } => {
            for descriptor in EmotionPresentationMapper::legend() {
                println!("{}", render_descriptor(&descriptor));
            }
            Ok(())
        }
        Command::Health => {
            let client = rest_client(&config)?;
            let status = client.check_health().await?;
            println!("{}: {status}", config.service.normalized_base_url());
            Ok(())
        }
    }
}

async fn read_stdin() -> Result<String, Error> {
    let mut text = String::new();
    tokio::io::stdin()
        .read_to_string(&mut text)
        .await
        .map_err(|err| anyhow!("failed to read narrative from stdin: {err}"))?;
    if text.trim().is_empty() {
        bail!(empathy_domain::EMPTY_TEXT_MESSAGE);
    }
    Ok(text)
}
