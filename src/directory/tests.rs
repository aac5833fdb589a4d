//! Tests for directory module

use super::ldap::{from_ldap3_control, to_ldap3_control, to_raw_entry};
use super::*;
use crate::config::{ConnectionConfig, SearchOptions};
use crate::control::{self, RawControl, PAGED_RESULTS_OID};
use crate::Error;
use bytes::Bytes;
use ldap3::asn1::{StructureTag, TagClass, PL};
use ldap3::ResultEntry;
use pretty_assertions::assert_eq;
use std::time::Duration;
use test_case::test_case;

fn people(count: usize) -> Vec<RawEntry> {
    (0..count)
        .map(|i| DirectoryEntry::new(format!("uid=user{i},dc=example,dc=com")).into())
        .collect()
}

fn paged_request(page_size: u32, cookie: &[u8]) -> SearchRequest {
    SearchRequest::from_options(&SearchOptions::new("localhost", "dc=example,dc=com"))
        .with_control(RawControl::new(
            PAGED_RESULTS_OID,
            true,
            control::encode(page_size, cookie),
        ))
}

fn response_cookie(response: &SearchResponse) -> Vec<u8> {
    let raw = response.controls[0].value.clone().unwrap_or_default();
    control::decode(&raw).unwrap().cookie().to_vec()
}

// ============================================================================
// URL and Settings Tests
// ============================================================================

#[test_case("ldap.example.com", 389, "ldap://ldap.example.com:389" ; "hostname")]
#[test_case("10.0.0.5", 3268, "ldap://10.0.0.5:3268" ; "ipv4 global catalog")]
fn test_ldap_url(host: &str, port: u16, expected: &str) {
    assert_eq!(ldap_url(host, port).unwrap().as_str(), expected);
}

#[test]
fn test_ldap_url_rejects_bad_host() {
    let err = ldap_url("bad host", 389).unwrap_err();
    assert!(err.is_connection_error());
}

#[test]
fn test_connection_settings_from_config() {
    let config = ConnectionConfig {
        host: "ldap.example.com".to_string(),
        port: 389,
        login: "cn=reader".to_string(),
        password: "secret".to_string(),
        protocol_version: 3,
        connect_timeout_secs: 5,
    };
    let settings = ConnectionSettings::from(&config);
    assert_eq!(settings.connect_timeout, Duration::from_secs(5));
    assert_eq!(
        ConnectionSettings::default().connect_timeout,
        Duration::from_secs(30)
    );
}

#[tokio::test]
async fn test_ldap3_client_requires_connection() {
    let mut client = Ldap3Client::new();
    assert!(!client.is_connected());

    let err = client.bind(3, "cn=reader", "secret").await.unwrap_err();
    assert!(err.is_connection_error());

    let request = paged_request(10, b"");
    assert!(client.search(&request).await.unwrap_err().is_connection_error());

    // closing an unopened client is a no-op
    client.close().await.unwrap();
}

#[test]
fn test_scope_conversion() {
    assert_eq!(Scope::default(), Scope::Subtree);
    assert!(matches!(ldap3::Scope::from(Scope::Base), ldap3::Scope::Base));
    assert!(matches!(
        ldap3::Scope::from(Scope::OneLevel),
        ldap3::Scope::OneLevel
    ));
    assert!(matches!(
        ldap3::Scope::from(Scope::Subtree),
        ldap3::Scope::Subtree
    ));
}

// ============================================================================
// ldap3 Conversion Tests
// ============================================================================

fn octets(value: &[u8]) -> StructureTag {
    StructureTag {
        class: TagClass::Universal,
        id: 4,
        payload: PL::P(value.to_vec()),
    }
}

fn constructed(class: TagClass, id: u64, items: Vec<StructureTag>) -> StructureTag {
    StructureTag {
        class,
        id,
        payload: PL::C(items),
    }
}

/// SearchResultEntry ::= [APPLICATION 4] SEQUENCE { objectName, attributes }
fn search_result_entry(dn: &str, attributes: Vec<(&str, Vec<&[u8]>)>) -> ResultEntry {
    let attributes = attributes
        .into_iter()
        .map(|(name, values)| {
            constructed(
                TagClass::Universal,
                16,
                vec![
                    octets(name.as_bytes()),
                    constructed(
                        TagClass::Universal,
                        17,
                        values.into_iter().map(octets).collect(),
                    ),
                ],
            )
        })
        .collect();
    let tag = constructed(
        TagClass::Application,
        4,
        vec![
            octets(dn.as_bytes()),
            constructed(TagClass::Universal, 16, attributes),
        ],
    );
    ResultEntry::new(tag)
}

#[test_case(Some(Bytes::from_static(&[0x30, 0x05, 0x02, 0x01, 0x05, 0x04, 0x00])) ; "with value")]
#[test_case(Some(Bytes::new()) ; "empty value")]
#[test_case(None ; "no value")]
fn test_control_conversion_round_trip(value: Option<Bytes>) {
    let control = RawControl {
        oid: PAGED_RESULTS_OID.to_string(),
        critical: true,
        value,
    };

    let converted = to_ldap3_control(&control);
    assert_eq!(converted.ctype, PAGED_RESULTS_OID);
    assert!(converted.crit);
    assert_eq!(converted.val.as_deref(), control.value.as_deref());

    assert_eq!(from_ldap3_control(converted), control);
}

#[test]
fn test_response_control_keeps_cookie_bytes() {
    let cookie = [0x00, 0xFF, 0x10];
    let raw = ldap3::controls::RawControl {
        ctype: PAGED_RESULTS_OID.to_string(),
        crit: false,
        val: Some(control::encode(42, &cookie).to_vec()),
    };

    let converted = from_ldap3_control(raw);
    assert!(!converted.critical);
    let value = control::decode(converted.value.as_deref().unwrap_or_default()).unwrap();
    assert_eq!(value.size(), 42);
    assert_eq!(value.cookie(), &cookie);
}

#[test]
fn test_search_entry_conversion() {
    let entry = search_result_entry(
        "CN=Ivan Petrov,CN=Users,DC=its,DC=local",
        vec![
            ("sAMAccountName", vec![b"ipetrov".as_slice()]),
            ("memberOf", vec![b"CN=Developers".as_slice(), b"CN=Admins"]),
            ("objectGUID", vec![[0xFF, 0x00, 0x10].as_slice()]),
        ],
    );

    let RawEntry::Entry(entry) = to_raw_entry(entry) else {
        panic!("Expected Entry");
    };
    assert_eq!(entry.dn, "CN=Ivan Petrov,CN=Users,DC=its,DC=local");
    assert_eq!(entry.attributes["sAMAccountName"], vec!["ipetrov"]);
    assert_eq!(entry.attributes["memberOf"], vec!["CN=Developers", "CN=Admins"]);
    assert_eq!(entry.attributes["objectGUID"], vec!["/wAQ"]);
}

#[test]
fn test_search_reference_becomes_referral() {
    // SearchResultReference ::= [APPLICATION 19] SEQUENCE OF URI
    let tag = constructed(
        TagClass::Application,
        19,
        vec![octets(b"ldap://dc02.its.local/CN=Users,DC=its,DC=local")],
    );
    assert_eq!(to_raw_entry(ResultEntry::new(tag)), RawEntry::Referral);
}

// ============================================================================
// Entry and Request Tests
// ============================================================================

#[test]
fn test_directory_entry_first_value() {
    let entry = DirectoryEntry::new("CN=a")
        .with_attribute("sAMAccountName", "a")
        .with_values("memberOf", ["CN=x", "CN=y"]);

    assert_eq!(entry.first_value("samaccountname"), Some("a"));
    assert_eq!(entry.first_value("MEMBEROF"), Some("CN=x"));
    assert_eq!(entry.first_value("mail"), None);
    assert_eq!(entry.attributes["memberOf"].len(), 2);
}

#[test]
fn test_raw_entry_dn() {
    let entry: RawEntry = DirectoryEntry::new("CN=a").into();
    assert_eq!(entry.dn(), Some("CN=a"));
    assert!(!entry.is_referral());
    assert_eq!(RawEntry::Referral.dn(), None);
    assert!(RawEntry::Referral.is_referral());
}

#[test]
fn test_search_request_from_options() {
    let options = SearchOptions::new("localhost", "CN=Users,DC=its,DC=local")
        .with_filter("(objectClass=person)")
        .with_attributes(["sAMAccountName", "sn"]);

    let request = SearchRequest::from_options(&options);
    assert_eq!(request.base, "CN=Users,DC=its,DC=local");
    assert_eq!(request.scope, Scope::Subtree);
    assert_eq!(request.filter, "(objectClass=person)");
    assert_eq!(request.attributes, vec!["sAMAccountName", "sn"]);
    assert!(request.controls.is_empty());
    assert!(request.control(PAGED_RESULTS_OID).is_none());

    let request = request.with_control(RawControl {
        oid: "1.2.3".to_string(),
        critical: false,
        value: None,
    });
    assert!(request.control("1.2.3").is_some());
}

// ============================================================================
// ScriptedDirectory Tests
// ============================================================================

#[tokio::test]
async fn test_search_before_connect_fails() {
    let mut directory = ScriptedDirectory::paging(people(3));
    let err = directory.search(&paged_request(2, b"")).await.unwrap_err();
    assert!(matches!(err, Error::Connection { .. }));
}

#[tokio::test]
async fn test_paging_directory_walks_offsets() {
    let mut directory = ScriptedDirectory::paging(people(5));
    directory.connect("localhost", 389).await.unwrap();

    let first = directory.search(&paged_request(2, b"")).await.unwrap();
    assert_eq!(first.entries, people(5)[0..2].to_vec());
    let cookie = response_cookie(&first);
    assert_eq!(cookie, vec![0, 0, 0, 2]);

    let second = directory.search(&paged_request(2, &cookie)).await.unwrap();
    assert_eq!(second.entries, people(5)[2..4].to_vec());

    let third = directory
        .search(&paged_request(2, &response_cookie(&second)))
        .await
        .unwrap();
    assert_eq!(third.entries.len(), 1);
    assert!(response_cookie(&third).is_empty());

    let size = control::decode(third.controls[0].value.as_deref().unwrap_or_default())
        .unwrap()
        .size();
    assert_eq!(size, 5);
}

#[tokio::test]
async fn test_paging_directory_without_control_returns_everything() {
    let mut directory = ScriptedDirectory::paging(people(3));
    directory.connect("localhost", 389).await.unwrap();

    let request = SearchRequest::from_options(&SearchOptions::new("localhost", "dc=example"));
    let response = directory.search(&request).await.unwrap();
    assert_eq!(response.entries.len(), 3);
    assert!(response.controls.is_empty());
}

#[tokio::test]
async fn test_paging_directory_rejects_foreign_cookie() {
    let mut directory = ScriptedDirectory::paging(people(3));
    directory.connect("localhost", 389).await.unwrap();

    let err = directory
        .search(&paged_request(2, b"xyz"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Search { .. }));
}

#[tokio::test]
async fn test_scripted_directory_serves_in_order() {
    let mut directory = ScriptedDirectory::scripted(vec![
        ScriptedPage::new(people(1)).with_cookie(b"next"),
        ScriptedPage::new(vec![RawEntry::Referral]),
    ]);
    directory.connect("localhost", 389).await.unwrap();

    let first = directory.search(&paged_request(1, b"")).await.unwrap();
    assert_eq!(response_cookie(&first), b"next".to_vec());

    let second = directory.search(&paged_request(1, b"next")).await.unwrap();
    assert_eq!(second.entries, vec![RawEntry::Referral]);
    assert!(second.controls.is_empty());

    let err = directory
        .search(&paged_request(1, b""))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Search { .. }));

    assert_eq!(
        directory.sent_page_requests(),
        vec![
            (1, Bytes::new()),
            (1, Bytes::from_static(b"next")),
            (1, Bytes::new()),
        ]
    );
}

#[tokio::test]
async fn test_scripted_directory_failure_injection() {
    let mut directory = ScriptedDirectory::paging(people(1)).fail_connect("refused");
    assert!(directory.connect("localhost", 389).await.is_err());
    assert!(!directory.is_connected());
    assert_eq!(directory.connect_count(), 1);

    let mut directory = ScriptedDirectory::paging(people(1)).fail_bind("invalid credentials");
    directory.connect("localhost", 389).await.unwrap();
    let err = directory.bind(3, "cn=reader", "wrong").await.unwrap_err();
    assert!(err.is_connection_error());
    assert_eq!(directory.binds(), &[(3, "cn=reader".to_string())]);

    directory.close().await.unwrap();
    assert!(!directory.is_connected());
    assert_eq!(directory.close_count(), 1);
}
