//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::ClientConfig;
use crate::connector::CrmConnector;
use crate::error::{Error, Result};
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Instant;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Tasks {
                user_id,
                external_id,
            } => self.tasks(user_id.as_deref(), external_id.as_deref()).await,
            Commands::Call {
                method,
                params_json,
            } => self.call(method, params_json.as_deref()).await,
            Commands::Lists {
                iblock_id,
                type_ids,
            } => self.lists(iblock_id, type_ids).await,
            Commands::Check => self.check().await,
            Commands::Serve { port } => {
                crate::cli::serve(crate::cli::ServerConfig::default(), *port).await
            }
        }
    }

    /// Build client configuration: file, then environment, then flags
    pub fn load_config(&self) -> Result<ClientConfig> {
        let base = match &self.cli.config {
            Some(path) => ClientConfig::from_file(path)?,
            None => ClientConfig::default(),
        };
        Ok(apply_flags(base.with_env_overrides(), &self.cli))
    }

    fn connector(&self) -> Result<CrmConnector> {
        CrmConnector::from_config(self.load_config()?)
    }

    async fn tasks(&self, user_id: Option<&str>, external_id: Option<&str>) -> Result<()> {
        let connector = self.connector()?;
        let start = Instant::now();

        let collection = match (user_id, external_id) {
            (Some(id), _) => connector.fetch_tasks(id).await?,
            (None, Some(external)) => connector.fetch_tasks_for(external).await?,
            (None, None) if connector.config().demo_mode => connector.fetch_tasks("").await?,
            (None, None) => {
                return Err(Error::config(
                    "Pass --user-id or --external-id to select whose tasks to fetch",
                ))
            }
        };

        self.log(format!(
            "Fetched {} tasks in {:.2}s via {}",
            collection.len(),
            start.elapsed().as_secs_f64(),
            connector.preference().active()
        ));
        self.output(&collection);
        Ok(())
    }

    async fn call(&self, method: &str, params_json: Option<&str>) -> Result<()> {
        let params: Value = match params_json {
            Some(raw) => serde_json::from_str(raw)?,
            None => json!({}),
        };
        let response = self.connector()?.call(method, &params).await?;
        self.output(&response);
        Ok(())
    }

    async fn lists(&self, iblock_id: &str, type_ids: &[String]) -> Result<()> {
        let connector = self.connector()?;
        let type_ids: Vec<&str> = type_ids.iter().map(String::as_str).collect();

        let collection = connector.fetch_list_elements(iblock_id, &type_ids).await?;

        self.log(format!(
            "Fetched {} elements of list {}",
            collection.len(),
            iblock_id
        ));
        self.output(&collection);
        Ok(())
    }

    async fn check(&self) -> Result<()> {
        let result = self.connector()?.check().await;
        self.output(&json!({
            "type": "CONNECTION_STATUS",
            "connectionStatus": {
                "status": if result.success { "SUCCEEDED" } else { "FAILED" },
                "message": result.message
            }
        }));
        Ok(())
    }

    /// Write one document to stdout
    fn output<T: Serialize>(&self, value: &T) {
        let rendered = match self.cli.format {
            OutputFormat::Json => serde_json::to_string(value),
            OutputFormat::Pretty => serde_json::to_string_pretty(value),
        };
        println!("{}", rendered.unwrap_or_default());
    }

    /// Progress messages go through tracing (stderr); stdout stays machine-readable
    fn log(&self, message: String) {
        tracing::info!("{}", message);
    }
}

/// Apply command-line overrides on top of a loaded configuration
fn apply_flags(mut config: ClientConfig, cli: &Cli) -> ClientConfig {
    if let Some(webhook) = &cli.webhook {
        config.webhook = Some(crate::types::ensure_trailing_slash(webhook)).filter(|w| !w.is_empty());
    }
    if let Some(proxy) = &cli.proxy_url {
        config.proxy.url = Some(proxy.trim().to_string()).filter(|p| !p.is_empty());
    }
    if cli.no_proxy {
        config.proxy.enabled = false;
    }
    config
}
