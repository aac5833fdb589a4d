//! Directory client backed by `ldap3`
//!
//! Plain LDAP (no TLS), simple bind, protocol version 3 only.

use super::types::{DirectoryClient, DirectoryEntry, RawEntry, SearchRequest, SearchResponse};
use crate::config::ConnectionConfig;
use crate::control::RawControl;
use crate::error::{Error, Result};
use async_trait::async_trait;
use base64::Engine as _;
use bytes::Bytes;
use ldap3::{Ldap, LdapConnAsync, LdapConnSettings, ResultEntry, SearchEntry};
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use url::Url;

/// Build the `ldap://` URL for a host and port
pub fn ldap_url(host: &str, port: u16) -> Result<Url> {
    let mut url = Url::parse("ldap://localhost")
        .map_err(|e| Error::connection(format!("Invalid LDAP URL: {e}")))?;
    url.set_host(Some(host))
        .map_err(|e| Error::connection(format!("Invalid host <{host}>: {e}")))?;
    url.set_port(Some(port))
        .map_err(|()| Error::connection(format!("Invalid port <{port}>")))?;
    Ok(url)
}

/// Settings applied when opening a connection
#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    /// Timeout for establishing the TCP connection
    pub connect_timeout: Duration,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
        }
    }
}

impl From<&ConnectionConfig> for ConnectionSettings {
    fn from(config: &ConnectionConfig) -> Self {
        Self {
            connect_timeout: Duration::from_secs(config.connect_timeout_secs),
        }
    }
}

/// `DirectoryClient` over an `ldap3` async connection
#[derive(Default)]
pub struct Ldap3Client {
    settings: ConnectionSettings,
    ldap: Option<Ldap>,
    driver: Option<JoinHandle<()>>,
}

impl Ldap3Client {
    /// Create a client with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a client with the given settings
    pub fn with_settings(settings: ConnectionSettings) -> Self {
        Self {
            settings,
            ldap: None,
            driver: None,
        }
    }

    /// Check if a connection is open
    pub fn is_connected(&self) -> bool {
        self.ldap.is_some()
    }

    fn ldap_mut(&mut self) -> Result<&mut Ldap> {
        self.ldap
            .as_mut()
            .ok_or_else(|| Error::connection("Not connected"))
    }
}

#[async_trait]
impl DirectoryClient for Ldap3Client {
    async fn connect(&mut self, host: &str, port: u16) -> Result<()> {
        let url = ldap_url(host, port)?;
        let settings = LdapConnSettings::new().set_conn_timeout(self.settings.connect_timeout);
        let (conn, ldap) = LdapConnAsync::with_settings(settings, url.as_str())
            .await
            .map_err(|e| Error::connection(format!("Failed to connect to <{host}:{port}>: {e}")))?;

        self.driver = Some(tokio::spawn(async move {
            if let Err(e) = conn.drive().await {
                warn!(error = %e, "LDAP connection driver stopped");
            }
        }));
        self.ldap = Some(ldap);
        debug!(%url, "Opened directory connection");
        Ok(())
    }

    async fn bind(&mut self, protocol_version: u32, login: &str, password: &str) -> Result<()> {
        if protocol_version != 3 {
            return Err(Error::connection(format!(
                "Unsupported LDAP protocol version {protocol_version}"
            )));
        }
        let ldap = self.ldap_mut()?;
        ldap.simple_bind(login, password)
            .await
            .and_then(ldap3::LdapResult::success)
            .map_err(|e| Error::connection(format!("Bind as <{login}> failed: {e}")))?;
        info!(%login, "Bound to directory");
        Ok(())
    }

    async fn search(&mut self, request: &SearchRequest) -> Result<SearchResponse> {
        let controls: Vec<ldap3::controls::RawControl> =
            request.controls.iter().map(to_ldap3_control).collect();
        let ldap = self.ldap_mut()?;

        let ldap3::SearchResult(results, result) = ldap
            .with_controls(controls)
            .search(
                &request.base,
                request.scope.into(),
                &request.filter,
                request.attributes.clone(),
            )
            .await
            .map_err(|e| Error::search(e.to_string()))?;

        if result.rc != 0 {
            return Err(Error::search(format!(
                "server returned rc={} ({})",
                result.rc, result.text
            )));
        }

        let entries = results
            .into_iter()
            .filter(|entry| !entry.is_intermediate())
            .map(to_raw_entry)
            .collect();
        let controls = result
            .ctrls
            .into_iter()
            .map(|ldap3::controls::Control(_, raw)| from_ldap3_control(raw))
            .collect();

        Ok(SearchResponse { entries, controls })
    }

    async fn close(&mut self) -> Result<()> {
        let unbind = match self.ldap.take() {
            Some(mut ldap) => ldap
                .unbind()
                .await
                .map_err(|e| Error::connection(format!("Unbind failed: {e}"))),
            None => Ok(()),
        };
        if let Some(driver) = self.driver.take() {
            driver.abort();
        }
        debug!("Closed directory connection");
        unbind
    }
}

impl Drop for Ldap3Client {
    fn drop(&mut self) {
        if let Some(driver) = self.driver.take() {
            driver.abort();
        }
    }
}

// ============================================================================
// Conversions
// ============================================================================

pub(super) fn to_ldap3_control(control: &RawControl) -> ldap3::controls::RawControl {
    ldap3::controls::RawControl {
        ctype: control.oid.clone(),
        crit: control.critical,
        val: control.value.as_ref().map(|value| value.to_vec()),
    }
}

pub(super) fn from_ldap3_control(control: ldap3::controls::RawControl) -> RawControl {
    RawControl {
        oid: control.ctype,
        critical: control.crit,
        value: control.val.map(Bytes::from),
    }
}

pub(super) fn to_raw_entry(entry: ResultEntry) -> RawEntry {
    if entry.is_ref() {
        return RawEntry::Referral;
    }
    let entry = SearchEntry::construct(entry);
    let mut attributes: BTreeMap<String, Vec<String>> = entry.attrs.into_iter().collect();
    // binary values (e.g. objectGUID) are carried as base64
    for (name, values) in entry.bin_attrs {
        attributes.entry(name).or_default().extend(
            values
                .iter()
                .map(|value| base64::engine::general_purpose::STANDARD.encode(value)),
        );
    }
    RawEntry::Entry(DirectoryEntry {
        dn: entry.dn,
        attributes,
    })
}
