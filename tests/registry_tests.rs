use hostwatch::config::MonitorConfig;
use hostwatch::registry::{SelectError, ServerRegistry};
use std::sync::Arc;

mod test_utils;
use test_utils::{record, temp_config_path};

fn two_host_registry() -> ServerRegistry {
    let registry = ServerRegistry::from_config(
        MonitorConfig::default(),
        temp_config_path("registry"),
    );
    registry.replace_snapshot(vec![
        record("192.168.1.50", "workbench", true),
        record("192.168.1.1", "gateway", false),
    ]);
    registry
}

#[test]
fn listing_is_idempotent_between_mutations() {
    let registry = two_host_registry();
    assert_eq!(registry.list_servers(), registry.list_servers());
}

#[test]
fn select_known_server_updates_the_selection() {
    let registry = two_host_registry();
    let record = registry.select("192.168.1.1").unwrap();
    assert_eq!(record.hostname, "gateway");

    let selection = registry.current_selection();
    assert_eq!(selection.server.unwrap().ip, "192.168.1.1");
    assert!(!selection.scan_needed);
    assert!(selection.last_error.is_none());
}

#[test]
fn select_unknown_server_is_rejected_and_leaves_state_alone() {
    let registry = two_host_registry();
    registry.select("192.168.1.1").unwrap();

    let err = registry.select("10.0.0.9").unwrap_err();
    assert!(matches!(err, SelectError::NotFound(ip) if ip == "10.0.0.9"));

    // Selection is still the gateway; the failure is only diagnostic
    let selection = registry.current_selection();
    assert_eq!(selection.server.unwrap().ip, "192.168.1.1");
    assert!(selection.last_error.is_some());
}

#[test]
fn unselected_registry_falls_back_to_the_local_host() {
    let registry = two_host_registry();
    let selection = registry.current_selection();
    let server = selection.server.unwrap();
    assert!(server.is_local);
    assert_eq!(server.ip, "192.168.1.50");
    assert!(!selection.scan_needed);
}

#[test]
fn stale_persisted_selection_falls_back_to_the_local_host() {
    // last_server points at a host the latest scan no longer sees
    let config = MonitorConfig {
        last_server: "192.168.1.77".to_string(),
        ..MonitorConfig::default()
    };
    let registry = ServerRegistry::from_config(config, temp_config_path("stale"));
    registry.replace_snapshot(vec![record("192.168.1.50", "workbench", true)]);

    let selection = registry.current_selection();
    assert_eq!(selection.server.unwrap().ip, "192.168.1.50");
    assert!(!selection.scan_needed);
}

#[test]
fn persisted_selection_survives_restart() {
    let config = MonitorConfig {
        last_server: "192.168.1.1".to_string(),
        found_servers: vec![
            record("192.168.1.50", "workbench", true),
            record("192.168.1.1", "gateway", false),
        ],
        ..MonitorConfig::default()
    };
    let registry = ServerRegistry::from_config(config, temp_config_path("restart"));

    let selection = registry.current_selection();
    assert_eq!(selection.server.unwrap().ip, "192.168.1.1");
}

#[test]
fn empty_snapshot_requests_a_scan() {
    let registry = ServerRegistry::from_config(
        MonitorConfig::default(),
        temp_config_path("empty"),
    );
    let selection = registry.current_selection();
    assert!(selection.server.is_none());
    assert!(selection.scan_needed);
}

#[test]
fn selection_reappears_when_the_host_returns() {
    let registry = two_host_registry();
    registry.select("192.168.1.1").unwrap();

    // The gateway drops out of a scan: resolution falls back to local
    registry.replace_snapshot(vec![record("192.168.1.50", "workbench", true)]);
    assert!(registry.current_selection().server.unwrap().is_local);

    // It comes back: the retained selection resolves again
    registry.replace_snapshot(vec![
        record("192.168.1.50", "workbench", true),
        record("192.168.1.1", "gateway", false),
    ]);
    assert_eq!(registry.current_selection().server.unwrap().ip, "192.168.1.1");
}

#[test]
fn successful_select_is_written_to_disk() {
    let path = temp_config_path("persist");
    let registry = ServerRegistry::from_config(MonitorConfig::default(), path.clone());
    registry.replace_snapshot(vec![
        record("192.168.1.50", "workbench", true),
        record("192.168.1.1", "gateway", false),
    ]);
    registry.select("192.168.1.1").unwrap();

    let saved = hostwatch::config::load(&path);
    assert_eq!(saved.last_server, "192.168.1.1");
    assert_eq!(saved.found_servers.len(), 2);
    assert!(saved.found_servers[0].is_local);

    let _ = std::fs::remove_file(&path);
}

#[test]
fn concurrent_selects_and_scans_never_break_resolution() {
    let registry = Arc::new(ServerRegistry::from_config(
        MonitorConfig::default(),
        temp_config_path("concurrent"),
    ));
    registry.replace_snapshot(vec![
        record("192.168.1.50", "workbench", true),
        record("192.168.1.1", "gateway", false),
        record("192.168.1.2", "backup", false),
    ]);

    let mut handles = Vec::new();

    // Writers: scans keep replacing the snapshot, selectors keep flipping
    // the selection between two always-present hosts
    for _ in 0..2 {
        let reg = registry.clone();
        handles.push(std::thread::spawn(move || {
            for round in 0..200 {
                reg.replace_snapshot(vec![
                    record("192.168.1.50", "workbench", true),
                    record("192.168.1.1", "gateway", false),
                    record("192.168.1.2", "backup", false),
                    record(&format!("192.168.1.{}", 100 + round % 50), "drifter", false),
                ]);
            }
        }));
    }
    for target in ["192.168.1.1", "192.168.1.2"] {
        let reg = registry.clone();
        handles.push(std::thread::spawn(move || {
            for _ in 0..200 {
                reg.select(target).unwrap();
            }
        }));
    }

    // Readers: every resolved selection must be a host some snapshot holds
    for _ in 0..500 {
        let selection = registry.current_selection();
        let server = selection.server.expect("snapshot always has a local host");
        assert!(
            ["192.168.1.50", "192.168.1.1", "192.168.1.2"].contains(&server.ip.as_str())
                || server.ip.starts_with("192.168.1.1")
        );
    }

    for handle in handles {
        handle.join().unwrap();
    }

    // After the dust settles the selection resolves against the final snapshot
    let final_servers = registry.list_servers();
    let resolved = registry.current_selection().server.unwrap();
    assert!(final_servers.contains(&resolved));
}
