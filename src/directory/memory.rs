//! In-memory directory
//!
//! Serves either a fixed script of responses or a list of entries paged
//! the way a real server would. Records every request so callers can
//! check what was sent.

use super::types::{DirectoryClient, RawEntry, SearchRequest, SearchResponse};
use crate::control::{self, RawControl, PAGED_RESULTS_OID};
use crate::error::{Error, Result};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::VecDeque;

/// One scripted search response
#[derive(Debug, Clone, Default)]
pub struct ScriptedPage {
    /// Entries returned by the search
    pub entries: Vec<RawEntry>,
    /// Controls returned with the search result
    pub controls: Vec<RawControl>,
}

impl ScriptedPage {
    /// Create a page without controls
    pub fn new(entries: Vec<RawEntry>) -> Self {
        Self {
            entries,
            controls: Vec::new(),
        }
    }

    /// Attach a paged results control with this cookie
    #[must_use]
    pub fn with_cookie(self, cookie: impl AsRef<[u8]>) -> Self {
        self.with_control(RawControl::new(
            PAGED_RESULTS_OID,
            false,
            control::encode(0, cookie.as_ref()),
        ))
    }

    /// Attach a paged results control with an empty cookie
    #[must_use]
    pub fn last(self) -> Self {
        self.with_cookie(b"")
    }

    /// Attach an arbitrary control
    #[must_use]
    pub fn with_control(mut self, control: RawControl) -> Self {
        self.controls.push(control);
        self
    }
}

#[derive(Debug)]
enum Source {
    Script(VecDeque<ScriptedPage>),
    Paging(Vec<RawEntry>),
}

/// In-memory `DirectoryClient`
#[derive(Debug)]
pub struct ScriptedDirectory {
    source: Source,
    connected: bool,
    requests: Vec<SearchRequest>,
    binds: Vec<(u32, String)>,
    connects: usize,
    closes: usize,
    fail_connect: Option<String>,
    fail_bind: Option<String>,
    fail_search_at: Option<(usize, String)>,
}

impl ScriptedDirectory {
    fn with_source(source: Source) -> Self {
        Self {
            source,
            connected: false,
            requests: Vec::new(),
            binds: Vec::new(),
            connects: 0,
            closes: 0,
            fail_connect: None,
            fail_bind: None,
            fail_search_at: None,
        }
    }

    /// Serve the given responses in order, one per search
    pub fn scripted(pages: Vec<ScriptedPage>) -> Self {
        Self::with_source(Source::Script(pages.into()))
    }

    /// Serve `entries` honouring the page size and cookie of each request
    ///
    /// Cookies are the big-endian offset of the next entry. Requests
    /// without a paged results control get every entry and no control.
    pub fn paging(entries: Vec<RawEntry>) -> Self {
        Self::with_source(Source::Paging(entries))
    }

    /// Fail the connect call
    #[must_use]
    pub fn fail_connect(mut self, message: impl Into<String>) -> Self {
        self.fail_connect = Some(message.into());
        self
    }

    /// Fail the bind call
    #[must_use]
    pub fn fail_bind(mut self, message: impl Into<String>) -> Self {
        self.fail_bind = Some(message.into());
        self
    }

    /// Fail the search with this 1-based index
    #[must_use]
    pub fn fail_search_at(mut self, call: usize, message: impl Into<String>) -> Self {
        self.fail_search_at = Some((call, message.into()));
        self
    }

    /// Requests received so far
    pub fn requests(&self) -> &[SearchRequest] {
        &self.requests
    }

    /// Number of search calls
    pub fn search_count(&self) -> usize {
        self.requests.len()
    }

    /// Bind calls as (protocol version, login)
    pub fn binds(&self) -> &[(u32, String)] {
        &self.binds
    }

    /// Number of connect calls
    pub fn connect_count(&self) -> usize {
        self.connects
    }

    /// Number of close calls
    pub fn close_count(&self) -> usize {
        self.closes
    }

    /// Check if a connection is open
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Paged results request values sent so far, as (page size, cookie)
    pub fn sent_page_requests(&self) -> Vec<(u32, Bytes)> {
        self.requests
            .iter()
            .filter_map(|r| r.control(PAGED_RESULTS_OID))
            .filter_map(|c| control::decode(c.value.as_deref().unwrap_or_default()).ok())
            .map(|v| (v.size(), Bytes::copy_from_slice(v.cookie())))
            .collect()
    }

    fn serve_paging(entries: &[RawEntry], request: &SearchRequest) -> Result<SearchResponse> {
        let Some(paged) = request.control(PAGED_RESULTS_OID) else {
            return Ok(SearchResponse::new(entries.to_vec(), Vec::new()));
        };
        let value = control::decode(paged.value.as_deref().unwrap_or_default())?;

        let offset = match value.cookie() {
            [] => 0,
            [a, b, c, d] => u32::from_be_bytes([*a, *b, *c, *d]) as usize,
            other => {
                return Err(Error::search(format!(
                    "unwilling to perform: unknown cookie of {} bytes",
                    other.len()
                )))
            }
        };
        let start = offset.min(entries.len());
        let end = start
            .saturating_add(value.size() as usize)
            .min(entries.len());

        let next_cookie = if end < entries.len() {
            (end as u32).to_be_bytes().to_vec()
        } else {
            Vec::new()
        };
        let response_value = control::encode(entries.len() as u32, &next_cookie);

        Ok(SearchResponse::new(
            entries[start..end].to_vec(),
            vec![RawControl::new(PAGED_RESULTS_OID, false, response_value)],
        ))
    }
}

#[async_trait]
impl DirectoryClient for ScriptedDirectory {
    async fn connect(&mut self, _host: &str, _port: u16) -> Result<()> {
        self.connects += 1;
        if let Some(message) = &self.fail_connect {
            return Err(Error::connection(message.clone()));
        }
        self.connected = true;
        Ok(())
    }

    async fn bind(&mut self, protocol_version: u32, login: &str, _password: &str) -> Result<()> {
        if !self.connected {
            return Err(Error::connection("Not connected"));
        }
        self.binds.push((protocol_version, login.to_string()));
        if let Some(message) = &self.fail_bind {
            return Err(Error::connection(message.clone()));
        }
        Ok(())
    }

    async fn search(&mut self, request: &SearchRequest) -> Result<SearchResponse> {
        if !self.connected {
            return Err(Error::connection("Not connected"));
        }
        self.requests.push(request.clone());
        if let Some((call, message)) = &self.fail_search_at {
            if *call == self.requests.len() {
                return Err(Error::search(message.clone()));
            }
        }

        match &mut self.source {
            Source::Script(pages) => {
                let page = pages
                    .pop_front()
                    .ok_or_else(|| Error::search("no scripted response left"))?;
                Ok(SearchResponse::new(page.entries, page.controls))
            }
            Source::Paging(entries) => Self::serve_paging(entries, request),
        }
    }

    async fn close(&mut self) -> Result<()> {
        self.closes += 1;
        self.connected = false;
        Ok(())
    }
}
