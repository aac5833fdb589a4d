//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, FetchArgs};
use crate::config::AppConfig;
use crate::control::{self, ControlRegistry, PageRequestValue, PAGED_RESULTS_OID};
use crate::directory::{ConnectionSettings, DirectoryClient, Ldap3Client};
use crate::error::{Error, Result, ResultExt};
use crate::mapping::RecordMapper;
use crate::output::{write_records, JsonWriterConfig};
use crate::pagination::PagedSearch;
use crate::types::{cookie_from_base64, cookie_to_base64};
use bytes::Bytes;
use serde_json::{json, Value};
use std::path::Path;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

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
            Commands::Fetch(args) => {
                let config = self.load_config()?;
                let mut client =
                    Ldap3Client::with_settings(ConnectionSettings::from(&config.connection));
                let cancel = CancellationToken::new();
                spawn_interrupt_handler(cancel.clone());
                self.fetch(&config, &mut client, args, cancel).await?;
                Ok(())
            }
            Commands::Validate => self.validate(),
            Commands::Encode { page_size, cookie } => self.encode(*page_size, cookie),
            Commands::Decode { value } => self.decode(value),
        }
    }

    /// Load configuration
    fn load_config(&self) -> Result<AppConfig> {
        let path = self
            .cli
            .config
            .as_ref()
            .ok_or_else(|| Error::config("Config file not specified (use -c flag)"))?;
        AppConfig::load(path)
    }

    /// Run the paged search against `client` and write the records
    ///
    /// Returns the number of records written.
    pub async fn fetch<C>(
        &self,
        config: &AppConfig,
        client: &mut C,
        args: &FetchArgs,
        cancel: CancellationToken,
    ) -> Result<usize>
    where
        C: DirectoryClient + ?Sized,
    {
        let mut options = config.search_options()?;
        if let Some(page_size) = args.page_size {
            options = options.with_page_size(page_size);
        }

        let registry = ControlRegistry::with_paged_results()
            .context("Failed to register the paged results control")?;
        let mapper = RecordMapper::from_config(&config.mapping);
        let mut search = PagedSearch::new(mapper, registry)?
            .with_cancellation(cancel)
            .with_max_pages(args.max_pages.or(config.search.max_pages));

        let start = Instant::now();
        let records = search.load_all_pages(client, &options).await?;

        let writer_config = JsonWriterConfig::new()
            .with_format(args.format)
            .pretty(args.pretty);
        let written = write_records(&records, args.output.as_deref(), &writer_config)?;

        let stats = search.stats();
        info!(
            records = written,
            pages = stats.pages,
            skipped = stats.skipped,
            duration_ms = start.elapsed().as_millis() as u64,
            output = %args.output.as_deref().map_or("stdout".into(), Path::to_string_lossy),
            "Fetch complete"
        );
        Ok(written)
    }

    /// Validate the configuration file
    fn validate(&self) -> Result<()> {
        let config = self.load_config()?;
        let options = config.search_options()?;

        self.output_message(&json!({
            "status": "valid",
            "host": options.host,
            "port": options.port,
            "searchBase": options.search_base,
            "filter": options.filter,
            "resultPageSize": options.result_page_size,
            "mappedAttributes": config.mapping.fields.len(),
        }));
        Ok(())
    }

    /// Encode a request value
    fn encode(&self, page_size: u32, cookie: &str) -> Result<()> {
        self.output_message(&encode_message(page_size, cookie)?);
        Ok(())
    }

    /// Decode a response value
    fn decode(&self, value: &str) -> Result<()> {
        self.output_message(&decode_message(value)?);
        Ok(())
    }

    /// Print a command result
    fn output_message(&self, msg: &Value) {
        if self.cli.verbose {
            println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
        } else {
            println!("{}", serde_json::to_string(msg).unwrap_or_default());
        }
    }
}

/// Build the `encode` command output for a page size and base64 cookie
pub(super) fn encode_message(page_size: u32, cookie: &str) -> Result<Value> {
    let cookie = Bytes::from(cookie_from_base64(cookie)?);
    let request = PageRequestValue::new(page_size, cookie)?;
    let value = request.encode();

    Ok(json!({
        "oid": PAGED_RESULTS_OID,
        "pageSize": request.page_size(),
        "value": cookie_to_base64(&value),
        "length": value.len(),
    }))
}

/// Build the `decode` command output for a base64 response value
pub(super) fn decode_message(value: &str) -> Result<Value> {
    let raw = cookie_from_base64(value)
        .map_err(|_| Error::invalid_value("value", "control value is not valid base64"))?;
    let response = control::decode(&raw)?;

    Ok(json!({
        "oid": PAGED_RESULTS_OID,
        "size": response.size(),
        "cookie": cookie_to_base64(response.cookie()),
        "lastPage": response.is_last_page(),
    }))
}

/// Cancel `token` on Ctrl-C; the search stops at the next page boundary
fn spawn_interrupt_handler(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping after the current page");
            token.cancel();
        }
    });
}
