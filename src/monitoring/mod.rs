//! System monitoring — collects CPU, RAM, disk, temperature, GPU, and
//! network stats for the dashboard's JSON API.

use chrono::{Local, TimeZone};
use serde_json::{Value, json};
use std::process::Command;
use sysinfo::{Components, Disks, Networks, System, Users};

/// System monitor that maintains sysinfo state between polls
pub struct SystemMonitor {
    sys: System,
    disks: Disks,
    networks: Networks,
    components: Components,
    users: Users,
}

impl SystemMonitor {
    pub fn new() -> Self {
        let mut sys = System::new_all();
        sys.refresh_all();
        Self {
            sys,
            disks: Disks::new_with_refreshed_list(),
            networks: Networks::new_with_refreshed_list(),
            components: Components::new_with_refreshed_list(),
            users: Users::new_with_refreshed_list(),
        }
    }

    /// Static host facts: OS, kernel, architecture, uptime
    pub fn system_info(&self) -> Value {
        let cpu_model = self
            .sys
            .cpus()
            .first()
            .map(|c| c.brand().to_string())
            .unwrap_or_else(|| "Unknown".to_string());

        let boot_time = Local
            .timestamp_opt(System::boot_time() as i64, 0)
            .single()
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default();

        json!({
            "hostname": System::host_name().unwrap_or_else(|| "unknown".to_string()),
            "os": System::name().unwrap_or_else(|| "unknown".to_string()),
            "os_release": System::os_version().unwrap_or_else(|| "unknown".to_string()),
            "kernel": System::kernel_version().unwrap_or_else(|| "unknown".to_string()),
            "architecture": System::cpu_arch().unwrap_or_else(|| "unknown".to_string()),
            "processor": cpu_model,
            "uptime": format_uptime(System::uptime()),
            "boot_time": boot_time,
        })
    }

    /// CPU, memory, and disk usage in one payload
    pub fn resources(&mut self) -> Value {
        self.sys.refresh_all();
        self.disks.refresh();

        let cpus = self.sys.cpus();
        let cpu_usage: f32 =
            cpus.iter().map(|c| c.cpu_usage()).sum::<f32>() / cpus.len().max(1) as f32;
        let per_core: Vec<f32> = cpus.iter().map(|c| c.cpu_usage()).collect();
        let frequency = cpus.first().map(|c| c.frequency()).unwrap_or(0);

        let total = self.sys.total_memory();
        let used = self.sys.used_memory();

        json!({
            "cpu": {
                "percent": cpu_usage,
                "count": cpus.len(),
                "physical_cores": self.sys.physical_core_count(),
                "frequency_mhz": frequency,
                "per_core": per_core,
            },
            "memory": {
                "total": format_bytes(total),
                "used": format_bytes(used),
                "available": format_bytes(self.sys.available_memory()),
                "percent": if total > 0 { used as f32 / total as f32 * 100.0 } else { 0.0 },
                "swap_total": format_bytes(self.sys.total_swap()),
                "swap_used": format_bytes(self.sys.used_swap()),
            },
            "disk": self.disk_info(),
            "time": Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        })
    }

    fn disk_info(&self) -> Value {
        let disks: Vec<Value> = self
            .disks
            .iter()
            .filter(|d| {
                let mount = d.mount_point().to_string_lossy();
                !mount.starts_with("/snap") && !mount.starts_with("/boot/efi")
                    && d.total_space() > 0
            })
            .map(|d| {
                let total = d.total_space();
                let available = d.available_space();
                let used = total.saturating_sub(available);
                json!({
                    "device": d.name().to_string_lossy(),
                    "mountpoint": d.mount_point().to_string_lossy(),
                    "fstype": d.file_system().to_string_lossy(),
                    "total": format_bytes(total),
                    "used": format_bytes(used),
                    "free": format_bytes(available),
                    "percent": if total > 0 { used as f32 / total as f32 * 100.0 } else { 0.0 },
                })
            })
            .collect();
        Value::Array(disks)
    }

    /// Top 20 processes by CPU usage
    pub fn processes(&mut self) -> Value {
        self.sys.refresh_all();

        let total_mem = self.sys.total_memory().max(1);
        let mut procs: Vec<_> = self.sys.processes().values().collect();
        procs.sort_by(|a, b| {
            b.cpu_usage()
                .partial_cmp(&a.cpu_usage())
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let list: Vec<Value> = procs
            .iter()
            .take(20)
            .map(|p| {
                let username = p
                    .user_id()
                    .and_then(|uid| self.users.get_user_by_id(uid))
                    .map(|u| u.name().to_string())
                    .unwrap_or_else(|| "-".to_string());
                let mem_pct = p.memory() as f64 / total_mem as f64 * 100.0;
                json!({
                    "pid": p.pid().as_u32(),
                    "name": p.name().to_string_lossy(),
                    "username": username,
                    "cpu_percent": p.cpu_usage(),
                    "memory_percent": (mem_pct * 100.0).round() / 100.0,
                })
            })
            .collect();
        Value::Array(list)
    }

    /// Sensor label → °C for every component the kernel exposes
    pub fn temperature(&mut self) -> Value {
        self.components.refresh();
        let mut temps = serde_json::Map::new();
        for component in self.components.iter() {
            temps.insert(component.label().to_string(), json!(component.temperature()));
        }
        Value::Object(temps)
    }

    /// Per-interface addresses and traffic counters (loopback skipped)
    pub fn network(&mut self) -> Value {
        self.networks.refresh();
        let mut interfaces = serde_json::Map::new();
        for (name, data) in self.networks.iter() {
            if name.as_str() == "lo" {
                continue;
            }
            let addresses: Vec<Value> = data
                .ip_networks()
                .iter()
                .map(|net| json!({ "address": net.addr.to_string(), "prefix": net.prefix }))
                .collect();
            interfaces.insert(
                name.clone(),
                json!({
                    "addresses": addresses,
                    "mac": data.mac_address().to_string(),
                    "rx_bytes": data.total_received(),
                    "tx_bytes": data.total_transmitted(),
                    "rx_packets": data.total_packets_received(),
                    "tx_packets": data.total_packets_transmitted(),
                }),
            );
        }
        Value::Object(interfaces)
    }

    /// Everything at once, timestamped
    pub fn all(&mut self) -> Value {
        json!({
            "timestamp": Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            "system": self.system_info(),
            "resources": self.resources(),
            "temperature": self.temperature(),
            "gpu": gpu_info(),
            "network": self.network(),
            "processes": self.processes(),
        })
    }
}

/// GPU device and driver — the device line from lspci, the driver from
/// the loaded-module list in /proc/modules.
pub fn gpu_info() -> Value {
    let device = Command::new("lspci")
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| {
            String::from_utf8_lossy(&o.stdout)
                .lines()
                .filter(|line| line.contains("VGA") || line.contains("3D controller"))
                .map(|l| l.to_string())
                .collect::<Vec<_>>()
                .join("; ")
        })
        .filter(|s| !s.is_empty());

    let driver = std::fs::read_to_string("/proc/modules")
        .ok()
        .and_then(|modules| {
            let loaded: Vec<&str> = modules
                .lines()
                .filter_map(|l| l.split_whitespace().next())
                .collect();
            if loaded.contains(&"nvidia") {
                Some("NVIDIA proprietary driver")
            } else if loaded.contains(&"nouveau") {
                Some("Nouveau open source driver (NVIDIA)")
            } else if loaded.contains(&"amdgpu") {
                Some("AMDGPU open source driver (AMD)")
            } else if loaded.contains(&"radeon") {
                Some("Radeon open source driver (AMD)")
            } else {
                None
            }
        })
        .unwrap_or("Unknown");

    match device {
        Some(device) => json!({ "device": device, "driver": driver }),
        None => json!({ "error": "No GPU information available" }),
    }
}

/// Human-readable byte count, e.g. "3.42 GB"
pub fn format_bytes(bytes: u64) -> String {
    let mut value = bytes as f64;
    for unit in ["B", "KB", "MB", "GB", "TB"] {
        if value < 1024.0 {
            return format!("{:.2} {}", value, unit);
        }
        value /= 1024.0;
    }
    format!("{:.2} PB", value)
}

/// "3d 7h 42m" from a seconds count
pub fn format_uptime(secs: u64) -> String {
    let days = secs / 86_400;
    let hours = (secs % 86_400) / 3_600;
    let minutes = (secs % 3_600) / 60;
    format!("{}d {}h {}m", days, hours, minutes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_format_scales_units() {
        assert_eq!(format_bytes(512), "512.00 B");
        assert_eq!(format_bytes(2048), "2.00 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.00 MB");
        assert_eq!(format_bytes(3 * 1024 * 1024 * 1024), "3.00 GB");
    }

    #[test]
    fn uptime_format_breaks_down_days() {
        assert_eq!(format_uptime(0), "0d 0h 0m");
        assert_eq!(format_uptime(86_400 + 3_600 + 60), "1d 1h 1m");
        assert_eq!(format_uptime(90 * 60), "0d 1h 30m");
    }
}
