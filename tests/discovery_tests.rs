use hostwatch::discovery;
use std::net::Ipv4Addr;

#[tokio::test]
async fn probe_of_documentation_address_is_unreachable() {
    // TEST-NET-1 (RFC 5737) never answers; a missing ping binary degrades
    // to the same verdict
    assert!(!discovery::probe(Ipv4Addr::new(192, 0, 2, 1)).await);
}

#[tokio::test]
async fn scan_puts_the_local_host_first() {
    let snapshot = discovery::scan().await;

    assert!(!snapshot.is_empty());
    let first = &snapshot[0];
    assert!(first.is_local);
    assert_eq!(first.ip, discovery::detect_local_ip().to_string());

    // Exactly one local record, and no duplicate addresses
    assert_eq!(snapshot.iter().filter(|s| s.is_local).count(), 1);
    let mut ips: Vec<&str> = snapshot.iter().map(|s| s.ip.as_str()).collect();
    ips.sort();
    ips.dedup();
    assert_eq!(ips.len(), snapshot.len());
}

#[tokio::test]
async fn resolver_falls_back_to_the_address_on_failure() {
    // A TEST-NET address has no PTR record anywhere
    let label = discovery::resolve_hostname(Ipv4Addr::new(192, 0, 2, 200)).await;
    assert!(!label.is_empty());
}
