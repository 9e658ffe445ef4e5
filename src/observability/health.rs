//! Health snapshots and runtime introspection

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::{Duration, Instant};

/// Kernel clock ticks per second used by `/proc/self/stat`
const CLOCK_TICKS_PER_SEC: u64 = 100;

/// `rustc --version` of the compiler that built this binary
pub const RUNTIME_VERSION: &str = env!("STATUS_SERVICE_RUSTC_VERSION");

/// Memory usage of the process
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryUsage {
    /// Resident set size in bytes
    pub rss_bytes: Option<u64>,
    /// Peak resident set size in bytes
    pub peak_rss_bytes: Option<u64>,
    /// Virtual memory size in bytes
    pub virtual_bytes: Option<u64>,
}

impl MemoryUsage {
    pub fn rss_mb(&self) -> Option<u64> {
        self.rss_bytes.map(|b| b / 1024 / 1024)
    }

    pub fn virtual_mb(&self) -> Option<u64> {
        self.virtual_bytes.map(|b| b / 1024 / 1024)
    }
}

/// CPU time consumed by the process, in microseconds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CpuUsage {
    pub user: Option<u64>,
    pub system: Option<u64>,
}

/// Derived health view, computed on every call
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthSnapshot {
    pub status: &'static str,
    pub timestamp: String,
    /// Uptime in seconds
    pub uptime: f64,
    pub memory: MemoryUsage,
    pub cpu: CpuUsage,
    pub platform: &'static str,
    pub arch: &'static str,
    pub pid: u32,
    pub service_version: &'static str,
    pub runtime_version: &'static str,
    pub environment: &'static str,
}

/// Reads process state; holds nothing but the start time
#[derive(Debug, Clone)]
pub struct HealthReporter {
    start_time: Instant,
    started_at: DateTime<Utc>,
    environment: &'static str,
}

impl HealthReporter {
    pub fn new(environment: &'static str) -> Self {
        Self {
            start_time: Instant::now(),
            started_at: Utc::now(),
            environment,
        }
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Build a fresh health snapshot
    pub fn snapshot(&self) -> HealthSnapshot {
        HealthSnapshot {
            status: "OK",
            timestamp: Utc::now().to_rfc3339(),
            uptime: self.uptime().as_secs_f64(),
            memory: memory_usage(),
            cpu: cpu_usage(),
            platform: std::env::consts::OS,
            arch: std::env::consts::ARCH,
            pid: std::process::id(),
            service_version: env!("CARGO_PKG_VERSION"),
            runtime_version: RUNTIME_VERSION,
            environment: self.environment,
        }
    }
}

/// Current memory usage; all fields are `None` where `/proc` is unavailable
pub fn memory_usage() -> MemoryUsage {
    std::fs::read_to_string("/proc/self/status")
        .map(|status| parse_status(&status))
        .unwrap_or_default()
}

/// CPU time used so far; `None` where `/proc` is unavailable
pub fn cpu_usage() -> CpuUsage {
    std::fs::read_to_string("/proc/self/stat")
        .ok()
        .and_then(|stat| parse_stat(&stat))
        .unwrap_or_default()
}

fn parse_status(status: &str) -> MemoryUsage {
    let field = |name: &str| {
        status
            .lines()
            .find_map(|line| line.strip_prefix(name))
            .and_then(|rest| rest.trim().trim_end_matches("kB").trim().parse::<u64>().ok())
            .map(|kb| kb * 1024)
    };

    MemoryUsage {
        rss_bytes: field("VmRSS:"),
        peak_rss_bytes: field("VmHWM:"),
        virtual_bytes: field("VmSize:"),
    }
}

fn parse_stat(stat: &str) -> Option<CpuUsage> {
    // The command name may contain spaces, so fields are counted after ')'.
    let rest = &stat[stat.rfind(')')? + 1..];
    let fields: Vec<&str> = rest.split_whitespace().collect();
    // utime and stime are fields 14 and 15 of the full line.
    let utime: u64 = fields.get(11)?.parse().ok()?;
    let stime: u64 = fields.get(12)?.parse().ok()?;
    let to_micros = |ticks: u64| ticks * 1_000_000 / CLOCK_TICKS_PER_SEC;

    Some(CpuUsage {
        user: Some(to_micros(utime)),
        system: Some(to_micros(stime)),
    })
}
