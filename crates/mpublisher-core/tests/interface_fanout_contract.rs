//! Contract Test: A-Record Interface Fan-Out
//!
//! Constraints verified:
//! - One A record per interface with an IPv4 address, all in one group
//! - Records are scoped to their interface and allow duplicates by name
//! - The first IPv4 address of an interface is used
//! - Interfaces without IPv4 addresses are skipped
//!
//! If this test fails, A records are published on the wrong interfaces.

mod common;

use common::*;
use mpublisher_core::{DnsType, Publisher, PublisherConfig, RecordScope, RecordType};
use std::net::Ipv4Addr;
use std::sync::atomic::Ordering;

#[test]
fn two_interfaces_yield_two_scoped_records() {
    let (mut publisher, state) = publisher_with(two_ipv4_interfaces());

    assert!(publisher.publish("web.local", true, RecordType::A).unwrap());

    let groups = state.groups();
    assert_eq!(groups.len(), 1, "all A records share one group");
    assert_eq!(groups[0].commit_count(), 1, "group is committed once");

    let a_records = groups[0].records_of(DnsType::A);
    assert_eq!(a_records.len(), 2);
    assert!(groups[0].records_of(DnsType::Cname).is_empty());

    assert_eq!(a_records[0].scope, RecordScope::Interface(2));
    assert_eq!(a_records[0].rdata, vec![192, 168, 1, 20]);
    assert_eq!(a_records[1].scope, RecordScope::Interface(3));
    assert_eq!(a_records[1].rdata, vec![10, 0, 0, 7]);
    assert!(a_records.iter().all(|r| r.allow_multiple && r.name == "web.local"));
}

#[test]
fn first_address_wins_and_bare_interfaces_are_skipped() {
    let interfaces = vec![
        mpublisher_core::NetInterface::new("lo", 1, vec![Ipv4Addr::LOCALHOST]),
        mpublisher_core::NetInterface::new("ip6tnl0", 4, Vec::new()),
        mpublisher_core::NetInterface::new(
            "eth0",
            2,
            vec![Ipv4Addr::new(192, 168, 1, 20), Ipv4Addr::new(192, 168, 1, 21)],
        ),
    ];
    let (mut publisher, state) = publisher_with(interfaces);

    assert!(publisher.publish_a("web.local", true).unwrap());

    let records = state.groups()[0].records();
    let scopes: Vec<RecordScope> = records.iter().map(|r| r.scope).collect();
    assert_eq!(scopes, vec![RecordScope::Interface(1), RecordScope::Interface(2)]);
    assert_eq!(records[1].rdata, vec![192, 168, 1, 20]);
}

#[test]
fn no_ipv4_interface_aborts_publish() {
    let (mut publisher, state) = publisher_with(vec![mpublisher_core::NetInterface::new(
        "wg0",
        7,
        Vec::new(),
    )]);

    assert!(!publisher.publish_a("web.local", true).unwrap());
    assert_eq!(publisher.count(), 0);
    assert!(state.groups().is_empty(), "no group is created without addresses");
}

#[test]
fn interface_failure_aborts_publish() {
    let daemon = MockDaemon::new(IDENTITY);
    let state = daemon.state();
    let mut publisher = Publisher::new(
        Box::new(daemon),
        Box::new(FailingInterfaces),
        PublisherConfig::default(),
    )
    .unwrap();

    assert!(!publisher.publish_a("web.local", true).unwrap());
    assert_eq!(publisher.count(), 0);
    assert!(state.groups().is_empty());

    // CNAME publishing does not touch the interface inventory
    assert!(publisher.publish_cname("alias.local", true).unwrap());
}

#[test]
fn cname_does_not_enumerate_interfaces() {
    let daemon = MockDaemon::new(IDENTITY);
    let interfaces = StaticInterfaces::new(two_ipv4_interfaces());
    let calls = interfaces.call_counter();
    let mut publisher =
        Publisher::new(Box::new(daemon), Box::new(interfaces), PublisherConfig::default())
            .unwrap();

    assert!(publisher.publish_cname("alias.local", true).unwrap());
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    assert!(publisher.publish_a("web.local", true).unwrap());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
