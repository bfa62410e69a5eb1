//! Live system snapshot from the local host.
//!
//! Reads what Linux exposes under `/proc` and `/etc` plus a few environment
//! variables. Every field falls back to `Unknown` on its own.

use sage_core::system::SystemInspector;

const UNKNOWN: &str = "Unknown";

/// Gathers the snapshot injected as the second priming message.
#[derive(Debug, Default)]
pub struct LocalSystemInspector;

impl LocalSystemInspector {
    pub fn new() -> Self {
        Self
    }
}

impl SystemInspector for LocalSystemInspector {
    fn snapshot(&self) -> String {
        let user = env_or_unknown(&["USER", "LOGNAME"]);
        let host = read_trimmed("/proc/sys/kernel/hostname")
            .or_else(|| read_trimmed("/etc/hostname"))
            .unwrap_or_else(|| UNKNOWN.to_string());
        let os = std::fs::read_to_string("/etc/os-release")
            .ok()
            .and_then(|text| parse_os_release(&text))
            .unwrap_or_else(|| std::env::consts::OS.to_string());
        let kernel = read_trimmed("/proc/sys/kernel/osrelease").unwrap_or_else(|| UNKNOWN.to_string());
        let cpus = std::thread::available_parallelism()
            .map(|n| n.get().to_string())
            .unwrap_or_else(|_| UNKNOWN.to_string());
        let memory = std::fs::read_to_string("/proc/meminfo")
            .ok()
            .and_then(|text| parse_meminfo_total_mb(&text))
            .map(|mb| format!("{mb} MB"))
            .unwrap_or_else(|| UNKNOWN.to_string());
        let uptime = std::fs::read_to_string("/proc/uptime")
            .ok()
            .and_then(|text| parse_uptime(&text))
            .unwrap_or_else(|| UNKNOWN.to_string());
        let shell = env_or_unknown(&["SHELL"]);
        let terminal = env_or_unknown(&["TERM"]);
        let captured = chrono::Local::now().format("%Y-%m-%d %H:%M:%S %Z");

        format!(
            "User: {user}\n\
             Host: {host}\n\
             OS: {os} (Kernel: {kernel})\n\
             Architecture: {arch}\n\
             CPU Count: {cpus}\n\
             Total Memory: {memory}\n\
             Uptime: {uptime}\n\
             Shell: {shell}\n\
             Terminal: {terminal}\n\
             Captured: {captured}",
            arch = std::env::consts::ARCH,
        )
    }
}

fn env_or_unknown(names: &[&str]) -> String {
    names
        .iter()
        .find_map(|name| std::env::var(name).ok().filter(|v| !v.is_empty()))
        .unwrap_or_else(|| UNKNOWN.to_string())
}

fn read_trimmed(path: &str) -> Option<String> {
    std::fs::read_to_string(path)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// `PRETTY_NAME` from an os-release file.
fn parse_os_release(text: &str) -> Option<String> {
    text.lines()
        .find_map(|line| line.strip_prefix("PRETTY_NAME="))
        .map(|value| value.trim_matches('"').to_string())
        .filter(|value| !value.is_empty())
}

/// `MemTotal` from `/proc/meminfo`, in MB.
fn parse_meminfo_total_mb(text: &str) -> Option<u64> {
    let line = text.lines().find(|line| line.starts_with("MemTotal:"))?;
    let kb: u64 = line.split_whitespace().nth(1)?.parse().ok()?;
    Some(kb / 1024)
}

/// Human uptime from the first field of `/proc/uptime`.
fn parse_uptime(text: &str) -> Option<String> {
    let seconds: f64 = text.split_whitespace().next()?.parse().ok()?;
    let total = seconds as u64;
    let (days, hours, minutes) = (total / 86_400, (total % 86_400) / 3_600, (total % 3_600) / 60);

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(plural(days, "day"));
    }
    if hours > 0 {
        parts.push(plural(hours, "hour"));
    }
    if minutes > 0 || parts.is_empty() {
        parts.push(plural(minutes, "minute"));
    }
    Some(format!("up {}", parts.join(", ")))
}

fn plural(n: u64, unit: &str) -> String {
    if n == 1 {
        format!("1 {unit}")
    } else {
        format!("{n} {unit}s")
    }
}
