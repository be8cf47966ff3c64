use hostwatch::registry::ServerRecord;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

static NEXT_ID: AtomicUsize = AtomicUsize::new(0);

/// Unique throwaway path for a test's persisted config file.
#[allow(dead_code)]
pub fn temp_config_path(tag: &str) -> PathBuf {
    let n = NEXT_ID.fetch_add(1, Ordering::SeqCst);
    std::env::temp_dir().join(format!(
        "hostwatch-test-{}-{}-{}.json",
        tag,
        std::process::id(),
        n
    ))
}

#[allow(dead_code)]
pub fn record(ip: &str, hostname: &str, is_local: bool) -> ServerRecord {
    ServerRecord {
        ip: ip.to_string(),
        hostname: hostname.to_string(),
        is_local,
    }
}
