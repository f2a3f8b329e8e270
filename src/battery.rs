/*
 * This file is part of Acctui.
 *
 * Copyright (C) 2025 Acctui contributors
 *
 * Acctui is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Acctui is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Acctui. If not, see <https://www.gnu.org/licenses/>.
 */

//! The sysfs battery boundary: enumerating charging-switch and voltage
//! control files, sampling the battery supply, probing a switch on demand,
//! and locating the daemon's log file. Every entry point takes a base
//! directory so the whole module runs against a temp tree in tests.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use serde_json::json;
use thiserror::Error;

use crate::logger;

pub const POWER_SUPPLY_ROOT: &str = "/sys/class/power_supply";
pub const LOG_DIR: &str = "/var/log/acc";

const LOG_FILE_PREFIX: &str = "acc-daemon-";
const LOG_FILE_SUFFIX: &str = ".log";

/// Settle time between flipping a switch and sampling the supply; charge
/// controllers report stale status for a few hundred milliseconds.
pub const SWITCH_SETTLE: Duration = Duration::from_millis(1000);

/// Control files that gate charge current on common kernels, with the values
/// that mean "charging on" / "charging off" for each.
const SWITCH_CANDIDATES: &[(&str, &str, &str)] = &[
    ("charging_enabled", "1", "0"),
    ("battery_charging_enabled", "1", "0"),
    ("charge_disable", "0", "1"),
    ("input_suspend", "0", "1"),
    ("store_mode", "0", "1"),
    ("op_disable_charge", "0", "1"),
];

/// Control files that accept a charging voltage ceiling.
const VOLTAGE_CANDIDATES: &[&str] = &[
    "constant_charge_voltage",
    "constant_charge_voltage_max",
    "voltage_max",
    "batt_tune_float_voltage",
];

#[derive(Error, Debug)]
pub enum BatteryError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("no log file matching acc-daemon-*.log in {0}")]
    LogFileNotFound(PathBuf),
}

/// A charging switch as the daemon spells it: a control path relative to the
/// power-supply root plus the values to write for on and off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargingSwitch {
    pub path: String,
    pub on_value: String,
    pub off_value: String,
}

impl ChargingSwitch {
    pub fn spec(&self) -> String {
        format!("{} {} {}", self.path, self.on_value, self.off_value)
    }

    pub fn parse_spec(s: &str) -> Option<Self> {
        let mut parts = s.split_whitespace();
        let path = parts.next()?.to_string();
        let on_value = parts.next()?.to_string();
        let off_value = parts.next()?.to_string();
        if parts.next().is_some() {
            return None;
        }
        Some(Self { path, on_value, off_value })
    }
}

/// What the supply currently reports, for the header line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatterySnapshot {
    pub status: String,
    pub capacity: Option<u8>,
    pub current_ma: Option<i64>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SwitchTest {
    Works,
    DoesNotWork,
    NotPlugged,
    Error,
}

impl SwitchTest {
    pub fn describe(&self) -> &'static str {
        match self {
            SwitchTest::Works => "Charging switch works",
            SwitchTest::DoesNotWork => "Charging switch does NOT work on this device",
            SwitchTest::NotPlugged => "Plug the charger to test the switch",
            SwitchTest::Error => "An error occurred while testing the switch",
        }
    }
}

fn read_trimmed<P: AsRef<Path>>(p: P) -> io::Result<String> {
    let mut s = String::new();
    fs::File::open(p)?.read_to_string(&mut s)?;
    Ok(s.trim().to_string())
}

fn supply_dirs(root: &Path) -> Vec<PathBuf> {
    let mut out = Vec::new();
    if let Ok(entries) = fs::read_dir(root) {
        for ent in entries.flatten() {
            let path = ent.path();
            if path.is_dir() {
                out.push(path);
            }
        }
    }
    out.sort();
    out
}

fn supply_type(dir: &Path) -> String {
    read_trimmed(dir.join("type")).unwrap_or_default()
}

fn battery_dir(root: &Path) -> Option<PathBuf> {
    supply_dirs(root)
        .into_iter()
        .find(|d| supply_type(d).eq_ignore_ascii_case("Battery"))
}

/// Enumerate the charging switches present on this device, as spec strings.
/// Queried once per dialog open; order is stable across calls.
pub fn list_charging_switches(root: &Path) -> Vec<String> {
    let mut out = Vec::new();
    for dir in supply_dirs(root) {
        let supply = match dir.file_name().and_then(|s| s.to_str()) {
            Some(n) => n.to_string(),
            None => continue,
        };
        for (name, on, off) in SWITCH_CANDIDATES {
            if dir.join(name).is_file() {
                let sw = ChargingSwitch {
                    path: format!("{}/{}", supply, name),
                    on_value: (*on).to_string(),
                    off_value: (*off).to_string(),
                };
                out.push(sw.spec());
            }
        }
    }
    out
}

/// Enumerate voltage-ceiling control files whose current content looks like a
/// voltage (the kernel exposes plenty of write-only or junk nodes).
pub fn list_voltage_control_files(root: &Path) -> Vec<String> {
    let mut out = Vec::new();
    for dir in supply_dirs(root) {
        let supply = match dir.file_name().and_then(|s| s.to_str()) {
            Some(n) => n.to_string(),
            None => continue,
        };
        for name in VOLTAGE_CANDIDATES {
            let p = dir.join(name);
            if !p.is_file() {
                continue;
            }
            if let Ok(raw) = read_trimmed(&p) {
                if raw.parse::<u64>().is_ok() {
                    out.push(format!("{}/{}", supply, name));
                }
            }
        }
    }
    out
}

pub fn read_battery(root: &Path) -> Result<BatterySnapshot, BatteryError> {
    let dir = battery_dir(root)
        .ok_or_else(|| BatteryError::InvalidData("no battery supply found".to_string()))?;
    let status = read_trimmed(dir.join("status")).unwrap_or_else(|_| "Unknown".to_string());
    let capacity = read_trimmed(dir.join("capacity"))
        .ok()
        .and_then(|s| s.parse::<u8>().ok());
    // current_now is in microamps; sign conventions vary by kernel
    let current_ma = read_trimmed(dir.join("current_now"))
        .ok()
        .and_then(|s| s.parse::<i64>().ok())
        .map(|ua| ua / 1000);
    Ok(BatterySnapshot { status, capacity, current_ma })
}

/// Charger presence: any non-battery supply reporting online, or the battery
/// itself reporting Charging/Full.
pub fn charger_online(root: &Path) -> bool {
    for dir in supply_dirs(root) {
        if supply_type(&dir).eq_ignore_ascii_case("Battery") {
            if let Ok(status) = read_trimmed(dir.join("status")) {
                if status.eq_ignore_ascii_case("Charging") || status.eq_ignore_ascii_case("Full") {
                    return true;
                }
            }
            continue;
        }
        if let Ok(raw) = read_trimmed(dir.join("online")) {
            if raw == "1" {
                return true;
            }
        }
    }
    false
}

fn battery_still_charging(root: &Path) -> bool {
    if let Ok(snapshot) = read_battery(root) {
        if snapshot.status.eq_ignore_ascii_case("Charging") {
            return true;
        }
        // Some drivers keep status stale; positive inflow current settles it.
        if let Some(ma) = snapshot.current_ma {
            return ma > 0;
        }
    }
    false
}

fn resolve_switch(root: &Path, spec: Option<&str>) -> Option<ChargingSwitch> {
    match spec {
        Some(s) => ChargingSwitch::parse_spec(s),
        None => list_charging_switches(root)
            .first()
            .and_then(|s| ChargingSwitch::parse_spec(s)),
    }
}

/// Probe a charging switch: flip it off, give the controller time to settle,
/// sample the supply, and restore the previous value. `None` probes whatever
/// switch would be selected automatically. Every failure mode maps onto one
/// of the four outcomes; this never panics or propagates.
pub fn test_charging_switch(root: &Path, spec: Option<&str>, settle: Duration) -> SwitchTest {
    let Some(switch) = resolve_switch(root, spec) else {
        return SwitchTest::Error;
    };
    if !charger_online(root) {
        return SwitchTest::NotPlugged;
    }

    let control = root.join(&switch.path);
    let previous = match read_trimmed(&control) {
        Ok(v) => v,
        Err(_) => return SwitchTest::Error,
    };

    if fs::write(&control, &switch.off_value).is_err() {
        return SwitchTest::Error;
    }
    thread::sleep(settle);
    let stopped = !battery_still_charging(root);
    let restored = fs::write(&control, &previous).is_ok();

    logger::log_event(
        "switch_test",
        json!({
            "switch": switch.spec(),
            "stopped": stopped,
            "restored": restored,
        }),
    );

    if !restored {
        return SwitchTest::Error;
    }
    if stopped {
        SwitchTest::Works
    } else {
        SwitchTest::DoesNotWork
    }
}

/// Locate the daemon's log file: the first `acc-daemon-<anything>.log` in the
/// log directory. Absence is fatal for the log screen only.
pub fn find_log_file(dir: &Path) -> Result<PathBuf, BatteryError> {
    let entries = match fs::read_dir(dir) {
        Ok(it) => it,
        Err(_) => return Err(BatteryError::LogFileNotFound(dir.to_path_buf())),
    };
    let mut matches: Vec<PathBuf> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| {
            p.is_file()
                && p.file_name()
                    .and_then(|s| s.to_str())
                    .map(|name| {
                        name.strip_prefix(LOG_FILE_PREFIX)
                            .and_then(|rest| rest.strip_suffix(LOG_FILE_SUFFIX))
                            .is_some_and(|mid| !mid.is_empty())
                    })
                    .unwrap_or(false)
        })
        .collect();
    matches.sort();
    matches
        .into_iter()
        .next()
        .ok_or_else(|| BatteryError::LogFileNotFound(dir.to_path_buf()))
}
