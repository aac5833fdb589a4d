//! Configuration types for paged searches
//!
//! This module contains the structures loaded from the YAML/JSON config
//! file and the flattened `SearchOptions` handed to the paged search.

use crate::error::{Error, Result};
use crate::template;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// LDAP protocol version supported by the directory client
pub const SUPPORTED_PROTOCOL_VERSION: u32 = 3;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete configuration loaded from a file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// Server and credentials
    pub connection: ConnectionConfig,

    /// Search parameters
    pub search: SearchConfig,

    /// Entry to record mapping
    #[serde(default)]
    pub mapping: MappingConfig,
}

impl AppConfig {
    /// Load a config file; `.json` files are parsed as JSON, anything else as YAML
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_yaml_str(&content)
        }
    }

    /// Parse and validate a YAML config
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON config
    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the values that cannot be expressed by the types alone
    pub fn validate(&self) -> Result<()> {
        self.connection.validate()?;
        self.search.validate()?;
        self.mapping.validate()
    }

    /// Build the options for one paged search session
    ///
    /// `${VAR}` references in the login and password are resolved from
    /// the environment here, not at load time.
    pub fn search_options(&self) -> Result<SearchOptions> {
        let options = SearchOptions {
            host: self.connection.host.clone(),
            port: self.connection.port,
            login: template::render_env(&self.connection.login)?,
            password: template::render_env(&self.connection.password)?,
            search_base: self.search.search_base.clone(),
            filter: self.search.filter.clone(),
            protocol_version: self.connection.protocol_version,
            result_page_size: self.search.result_page_size,
            target_attributes: self.search.target_attributes.clone(),
        };
        options.validate()?;
        Ok(options)
    }
}

// ============================================================================
// Connection Config
// ============================================================================

/// Server address and credentials
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionConfig {
    /// Server host name or address
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Bind DN or user principal
    pub login: String,

    /// Bind password (may reference `${VAR}`)
    pub password: String,

    /// LDAP protocol version
    #[serde(default = "default_protocol_version", alias = "protocol_version")]
    pub protocol_version: u32,

    /// TCP connect timeout in seconds
    #[serde(default = "default_connect_timeout", alias = "connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("login", &self.login)
            .field("password", &"***")
            .field("protocol_version", &self.protocol_version)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

impl ConnectionConfig {
    fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(Error::missing_field("connection.host"));
        }
        if self.port == 0 {
            return Err(Error::invalid_value("connection.port", "must not be 0"));
        }
        validate_protocol_version(self.protocol_version)?;
        if self.connect_timeout_secs == 0 {
            return Err(Error::invalid_value(
                "connection.connectTimeoutSecs",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}

fn default_port() -> u16 {
    389
}

fn default_protocol_version() -> u32 {
    SUPPORTED_PROTOCOL_VERSION
}

fn default_connect_timeout() -> u64 {
    30
}

// ============================================================================
// Search Config
// ============================================================================

/// Search parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchConfig {
    /// Base DN of the subtree search
    #[serde(alias = "search_base")]
    pub search_base: String,

    /// LDAP filter
    #[serde(default = "default_filter")]
    pub filter: String,

    /// Entries requested per page
    #[serde(default = "default_page_size", alias = "result_page_size")]
    pub result_page_size: u32,

    /// Attributes to return (empty = all user attributes)
    #[serde(default, alias = "target_attributes")]
    pub target_attributes: Vec<String>,

    /// Give up when the server keeps returning cookies past this many pages
    #[serde(default, alias = "max_pages")]
    pub max_pages: Option<u32>,
}

impl SearchConfig {
    fn validate(&self) -> Result<()> {
        if self.search_base.trim().is_empty() {
            return Err(Error::missing_field("search.searchBase"));
        }
        if self.result_page_size == 0 {
            return Err(Error::InvalidPageSize);
        }
        if self.max_pages == Some(0) {
            return Err(Error::invalid_value(
                "search.maxPages",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}

fn default_filter() -> String {
    "(objectClass=*)".to_string()
}

fn default_page_size() -> u32 {
    500
}

// ============================================================================
// Mapping Config
// ============================================================================

/// Attribute to record field table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingConfig {
    /// Output field holding the entry DN (`null` to omit)
    #[serde(default = "default_dn_field", alias = "dn_field")]
    pub dn_field: Option<String>,

    /// Keep attributes without a mapping under their own name
    #[serde(default, alias = "include_unmapped")]
    pub include_unmapped: bool,

    /// Attribute name to output field name
    #[serde(default = "default_fields")]
    pub fields: BTreeMap<String, String>,

    /// Attributes every entry must carry
    #[serde(default)]
    pub required: Vec<String>,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            dn_field: default_dn_field(),
            include_unmapped: false,
            fields: default_fields(),
            required: Vec::new(),
        }
    }
}

impl MappingConfig {
    fn validate(&self) -> Result<()> {
        let mut seen = BTreeMap::new();
        for (attribute, field) in &self.fields {
            if field.trim().is_empty() {
                return Err(Error::invalid_value(
                    format!("mapping.fields.{attribute}"),
                    "field name must not be empty",
                ));
            }
            if let Some(other) = seen.insert(field.as_str(), attribute.as_str()) {
                return Err(Error::invalid_value(
                    format!("mapping.fields.{attribute}"),
                    format!("field '{field}' is already mapped from '{other}'"),
                ));
            }
        }
        if let Some(dn_field) = &self.dn_field {
            if let Some(attribute) = seen.get(dn_field.as_str()) {
                return Err(Error::invalid_value(
                    "mapping.dnField",
                    format!("field '{dn_field}' is already mapped from '{attribute}'"),
                ));
            }
        }
        Ok(())
    }
}

fn default_dn_field() -> Option<String> {
    Some("dn".to_string())
}

/// Employee-style mapping for Active Directory user entries
fn default_fields() -> BTreeMap<String, String> {
    [
        ("sAMAccountName", "login"),
        ("givenName", "name"),
        ("sn", "surname"),
        ("initials", "initials"),
        ("department", "department"),
    ]
    .into_iter()
    .map(|(attribute, field)| (attribute.to_string(), field.to_string()))
    .collect()
}

// ============================================================================
// Search Options
// ============================================================================

/// Immutable options for one paged search session
#[derive(Clone, PartialEq, Eq)]
pub struct SearchOptions {
    /// Server host name or address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Bind DN or user principal
    pub login: String,
    /// Bind password
    pub password: String,
    /// Base DN of the subtree search
    pub search_base: String,
    /// LDAP filter
    pub filter: String,
    /// LDAP protocol version
    pub protocol_version: u32,
    /// Entries requested per page
    pub result_page_size: u32,
    /// Attributes to return, in order
    pub target_attributes: Vec<String>,
}

impl fmt::Debug for SearchOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchOptions")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("login", &self.login)
            .field("password", &"***")
            .field("search_base", &self.search_base)
            .field("filter", &self.filter)
            .field("protocol_version", &self.protocol_version)
            .field("result_page_size", &self.result_page_size)
            .field("target_attributes", &self.target_attributes)
            .finish()
    }
}

impl SearchOptions {
    /// Create options with defaults for everything but the server and base
    pub fn new(host: impl Into<String>, search_base: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: default_port(),
            login: String::new(),
            password: String::new(),
            search_base: search_base.into(),
            filter: default_filter(),
            protocol_version: default_protocol_version(),
            result_page_size: default_page_size(),
            target_attributes: Vec::new(),
        }
    }

    /// Set the port
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the bind credentials
    #[must_use]
    pub fn with_credentials(mut self, login: impl Into<String>, password: impl Into<String>) -> Self {
        self.login = login.into();
        self.password = password.into();
        self
    }

    /// Set the filter
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    /// Set the page size
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.result_page_size = page_size;
        self
    }

    /// Set the protocol version
    #[must_use]
    pub fn with_protocol_version(mut self, version: u32) -> Self {
        self.protocol_version = version;
        self
    }

    /// Set the attributes to return
    #[must_use]
    pub fn with_attributes<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.target_attributes = attributes.into_iter().map(Into::into).collect();
        self
    }

    /// Validate before any request is issued
    pub fn validate(&self) -> Result<()> {
        if self.result_page_size == 0 {
            return Err(Error::InvalidPageSize);
        }
        if self.host.trim().is_empty() {
            return Err(Error::missing_field("host"));
        }
        if self.search_base.trim().is_empty() {
            return Err(Error::missing_field("searchBase"));
        }
        validate_protocol_version(self.protocol_version)
    }
}

fn validate_protocol_version(version: u32) -> Result<()> {
    if version == SUPPORTED_PROTOCOL_VERSION {
        Ok(())
    } else {
        Err(Error::invalid_value(
            "protocolVersion",
            format!("only LDAPv{SUPPORTED_PROTOCOL_VERSION} is supported, got {version}"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const MINIMAL_YAML: &str = r#"
connection:
  host: 192.168.1.208
  login: yulyankin@its
  password: 123QWEasd
search:
  searchBase: "CN=users, DC=its, DC=local"
"#;

    #[test]
    fn test_parse_minimal_config() {
        let config = AppConfig::from_yaml_str(MINIMAL_YAML).unwrap();
        assert_eq!(config.connection.host, "192.168.1.208");
        assert_eq!(config.connection.port, 389);
        assert_eq!(config.connection.protocol_version, 3);
        assert_eq!(config.connection.connect_timeout_secs, 30);
        assert_eq!(config.search.filter, "(objectClass=*)");
        assert_eq!(config.search.result_page_size, 500);
        assert!(config.search.target_attributes.is_empty());
        assert!(config.search.max_pages.is_none());
        assert_eq!(config.mapping.dn_field.as_deref(), Some("dn"));
        assert_eq!(config.mapping.fields.get("sn").map(String::as_str), Some("surname"));
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
connection:
  host: ldap.example.com
  port: 3389
  login: "CN=reader,DC=example,DC=com"
  password: secret
  protocolVersion: 3
  connectTimeoutSecs: 5
search:
  searchBase: "DC=example,DC=com"
  filter: "(&(memberof=CN=ITS Developers,CN=Users,DC=its,DC=local))"
  resultPageSize: 5
  targetAttributes: [sAMAccountName, givenName, sn]
  maxPages: 100
mapping:
  dnField: null
  includeUnmapped: true
  fields:
    sAMAccountName: login
  required: [sAMAccountName]
"#;
        let config = AppConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.connection.port, 3389);
        assert_eq!(config.connection.connect_timeout_secs, 5);
        assert_eq!(config.search.result_page_size, 5);
        assert_eq!(
            config.search.target_attributes,
            vec!["sAMAccountName", "givenName", "sn"]
        );
        assert_eq!(config.search.max_pages, Some(100));
        assert!(config.mapping.dn_field.is_none());
        assert!(config.mapping.include_unmapped);
        assert_eq!(config.mapping.fields.len(), 1);
        assert_eq!(config.mapping.required, vec!["sAMAccountName"]);
    }

    #[test]
    fn test_parse_snake_case_keys() {
        let yaml = r#"
connection:
  host: ldap.example.com
  login: reader
  password: secret
  protocol_version: 3
  connect_timeout_secs: 7
search:
  search_base: "DC=example,DC=com"
  result_page_size: 20
  target_attributes: [sAMAccountName]
  max_pages: 4
mapping:
  dn_field: distinguishedName
  include_unmapped: true
"#;
        let config = AppConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.connection.connect_timeout_secs, 7);
        assert_eq!(config.search.search_base, "DC=example,DC=com");
        assert_eq!(config.search.result_page_size, 20);
        assert_eq!(config.search.target_attributes, vec!["sAMAccountName"]);
        assert_eq!(config.search.max_pages, Some(4));
        assert_eq!(config.mapping.dn_field.as_deref(), Some("distinguishedName"));
        assert!(config.mapping.include_unmapped);
    }

    #[test]
    fn test_parse_json_config() {
        let json = r#"{
            "connection": {"host": "h", "login": "l", "password": "p"},
            "search": {"searchBase": "DC=x", "resultPageSize": 10}
        }"#;
        let config = AppConfig::from_json_str(json).unwrap();
        assert_eq!(config.search.result_page_size, 10);
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let yaml = MINIMAL_YAML.replace("searchBase:", "resultPageSize: 0\n  searchBase:");
        let err = AppConfig::from_yaml_str(&yaml).unwrap_err();
        assert!(matches!(err, Error::InvalidPageSize));
    }

    #[test]
    fn test_unsupported_protocol_version_rejected() {
        let yaml = MINIMAL_YAML.replace("password:", "protocolVersion: 2\n  password:");
        let err = AppConfig::from_yaml_str(&yaml).unwrap_err();
        assert!(err.to_string().contains("only LDAPv3"));
    }

    #[test]
    fn test_missing_search_base_rejected() {
        let yaml = MINIMAL_YAML.replace("\"CN=users, DC=its, DC=local\"", "\"  \"");
        let err = AppConfig::from_yaml_str(&yaml).unwrap_err();
        assert!(matches!(err, Error::MissingConfigField { ref field } if field == "search.searchBase"));
    }

    #[test]
    fn test_duplicate_mapping_target_rejected() {
        let yaml = format!("{MINIMAL_YAML}mapping:\n  fields:\n    sn: name\n    givenName: name\n");
        let err = AppConfig::from_yaml_str(&yaml).unwrap_err();
        assert!(err.to_string().contains("already mapped"));
    }

    #[test]
    fn test_dn_field_collision_rejected() {
        let yaml = format!("{MINIMAL_YAML}mapping:\n  dnField: login\n");
        let err = AppConfig::from_yaml_str(&yaml).unwrap_err();
        assert!(err.to_string().contains("mapping.dnField"));
    }

    #[test]
    fn test_search_options_from_config() {
        let config = AppConfig::from_yaml_str(MINIMAL_YAML).unwrap();
        let options = config.search_options().unwrap();
        assert_eq!(options.host, "192.168.1.208");
        assert_eq!(options.login, "yulyankin@its");
        assert_eq!(options.password, "123QWEasd");
        assert_eq!(options.search_base, "CN=users, DC=its, DC=local");
        assert_eq!(options.result_page_size, 500);
    }

    #[test]
    fn test_search_options_undefined_password_variable() {
        let yaml = MINIMAL_YAML.replace("123QWEasd", "${LDAP_PAGER_TEST_UNSET_VARIABLE}");
        let config = AppConfig::from_yaml_str(&yaml).unwrap();
        let err = config.search_options().unwrap_err();
        assert!(matches!(err, Error::UndefinedVariable { .. }));
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = AppConfig::from_yaml_str(MINIMAL_YAML).unwrap();
        let options = config.search_options().unwrap();
        assert!(!format!("{:?}", config.connection).contains("123QWEasd"));
        assert!(!format!("{options:?}").contains("123QWEasd"));
    }

    #[test]
    fn test_search_options_builder() {
        let options = SearchOptions::new("localhost", "DC=example,DC=com")
            .with_port(1389)
            .with_credentials("cn=admin", "pw")
            .with_filter("(uid=*)")
            .with_page_size(2)
            .with_attributes(["uid", "cn"]);

        assert_eq!(options.port, 1389);
        assert_eq!(options.result_page_size, 2);
        assert_eq!(options.target_attributes, vec!["uid", "cn"]);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_search_options_validate() {
        let options = SearchOptions::new("localhost", "DC=x");
        assert!(matches!(
            options.clone().with_page_size(0).validate(),
            Err(Error::InvalidPageSize)
        ));
        assert!(options.clone().with_protocol_version(2).validate().is_err());
        assert!(SearchOptions::new("", "DC=x").validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pager.yaml");
        std::fs::write(&path, MINIMAL_YAML).unwrap();
        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.connection.login, "yulyankin@its");

        let missing = AppConfig::load(dir.path().join("missing.yaml")).unwrap_err();
        assert!(missing.to_string().contains("Failed to read config file"));
    }
}
