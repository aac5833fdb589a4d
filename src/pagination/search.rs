//! Paged search driver
//!
//! Runs a `PageSequencer` against a `DirectoryClient` and maps every
//! returned entry. All-or-nothing: any fatal error discards the entries
//! collected from earlier pages.

use super::sequencer::PageSequencer;
use super::types::{PageOutcome, SearchStats, SequencerState};
use crate::config::SearchOptions;
use crate::control::{ControlRegistry, PAGED_RESULTS_OID};
use crate::directory::{DirectoryClient, SearchRequest};
use crate::error::{Error, Result};
use crate::mapping::{EntryMapper, EntryOutcome};
use crate::types::cookie_to_base64;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Paged search over a directory client
pub struct PagedSearch<M> {
    mapper: M,
    registry: ControlRegistry,
    cancel: Option<CancellationToken>,
    max_pages: Option<u32>,
    stats: SearchStats,
}

impl<M: EntryMapper> PagedSearch<M> {
    /// Create a paged search
    ///
    /// The registry must have a decoder bound to the paged results OID.
    pub fn new(mapper: M, registry: ControlRegistry) -> Result<Self> {
        if !registry.is_registered(PAGED_RESULTS_OID) {
            return Err(Error::config(format!(
                "no decoder registered for paged results control <{PAGED_RESULTS_OID}>"
            )));
        }
        Ok(Self {
            mapper,
            registry,
            cancel: None,
            max_pages: None,
            stats: SearchStats::default(),
        })
    }

    /// Stop between pages once the token is cancelled
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Fail when the server still has more pages after this many
    #[must_use]
    pub fn with_max_pages(mut self, max_pages: Option<u32>) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Statistics accumulated over all searches run by this instance
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Load every page of the search described by `options`
    ///
    /// Connects and binds once, then requests pages until the server
    /// returns an empty cookie or stops sending the control. The client
    /// is closed on every path after a successful connect.
    pub async fn load_all_pages<C>(
        &mut self,
        client: &mut C,
        options: &SearchOptions,
    ) -> Result<Vec<M::Output>>
    where
        C: DirectoryClient + ?Sized,
    {
        options.validate()?;
        let mut sequencer = PageSequencer::new(options.result_page_size)?;

        client.connect(&options.host, options.port).await?;
        let result = self.run(client, options, &mut sequencer).await;
        let closed = client.close().await;

        match (result, closed) {
            (Ok(entries), Ok(())) => Ok(entries),
            (Ok(entries), Err(e)) => {
                warn!(error = %e, "Failed to close directory connection");
                Ok(entries)
            }
            (Err(e), closed) => {
                if let Err(close_error) = closed {
                    warn!(error = %close_error, "Failed to close directory connection");
                }
                Err(e)
            }
        }
    }

    async fn run<C>(
        &mut self,
        client: &mut C,
        options: &SearchOptions,
        sequencer: &mut PageSequencer,
    ) -> Result<Vec<M::Output>>
    where
        C: DirectoryClient + ?Sized,
    {
        client
            .bind(options.protocol_version, &options.login, &options.password)
            .await?;
        info!(
            host = %options.host,
            port = options.port,
            login = %options.login,
            "Connected to directory"
        );

        let start = Instant::now();
        let mut entries = Vec::new();

        while !sequencer.is_terminal() {
            self.check_page_boundary(sequencer)?;
            let Some(page) = self.fetch_page(client, options, sequencer).await? else {
                break;
            };
            entries.extend(page.entries);
        }

        info!(
            pages = sequencer.pages_fetched(),
            entries = entries.len(),
            state = sequencer.state().name(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Paged search finished"
        );
        Ok(entries)
    }

    pub(super) fn check_page_boundary(&self, sequencer: &PageSequencer) -> Result<()> {
        if self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled) {
            info!(pages = sequencer.pages_fetched(), "Paged search cancelled");
            return Err(Error::Cancelled);
        }
        if let Some(max_pages) = self.max_pages {
            if sequencer.pages_fetched() >= max_pages {
                return Err(Error::PageLimit { max_pages });
            }
        }
        Ok(())
    }

    /// Fetch the next page of the sequence
    ///
    /// Returns `None` when the sequencer has already finished. Referral
    /// entries are dropped; any other mapping failure aborts the page.
    pub async fn fetch_page<C>(
        &mut self,
        client: &mut C,
        options: &SearchOptions,
        sequencer: &mut PageSequencer,
    ) -> Result<Option<PageOutcome<M::Output>>>
    where
        C: DirectoryClient + ?Sized,
    {
        let Some(request) = sequencer.next_request()? else {
            return Ok(None);
        };
        debug!(
            page = sequencer.pages_fetched() + 1,
            page_size = request.page_size(),
            cookie = %cookie_to_base64(request.cookie()),
            "Requesting page"
        );

        let search = SearchRequest::from_options(options).with_control(request.to_control());
        let response = client.search(&search).await?;

        let mut entries = Vec::with_capacity(response.entries.len());
        let mut skipped = 0;
        for raw in &response.entries {
            match self.mapper.map(raw) {
                EntryOutcome::Mapped(entry) => entries.push(entry),
                EntryOutcome::Skipped(reason) => {
                    skipped += 1;
                    debug!(dn = raw.dn().unwrap_or("<referral>"), %reason, "Skipping entry");
                }
                EntryOutcome::Failed(message) => {
                    return Err(Error::entry_conversion(
                        raw.dn().unwrap_or("<referral>"),
                        message,
                    ));
                }
            }
        }

        let control = self
            .registry
            .find_paged_results(&response.controls)
            .transpose()?;
        let next_cookie = match sequencer.observe(control)? {
            SequencerState::HasMore(cookie) => Some(cookie.clone()),
            _ => None,
        };

        self.stats.add_page(entries.len(), skipped);
        debug!(
            page = sequencer.pages_fetched(),
            entries = entries.len(),
            skipped,
            "Fetched page"
        );
        Ok(Some(PageOutcome::new(entries, next_cookie)))
    }
}
