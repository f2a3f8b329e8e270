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

use std::env;
use std::fs;
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bounds;

/// Capacity thresholds, in battery percent. The daemon shuts the device down
/// at `shutdown`, resumes charging at `resume` and pauses at `pause`.
/// Invariant: `shutdown <= resume < pause <= 100`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityControl {
    pub shutdown: u8,
    pub resume: u8,
    pub pause: u8,
}

/// Temperature limits in whole degrees Celsius. The pair (>=90, >=95) is the
/// daemon's sentinel for "temperature control disabled".
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemperatureControl {
    pub cool_down_c: u8,
    pub pause_c: u8,
}

/// Cooldown duty cycle. `at_percent > 100` (stored as 101) disables the
/// cooldown regime; the charge/pause ratios are seconds of the duty cycle.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoolDownControl {
    pub at_percent: u8,
    pub charge_seconds: u8,
    pub pause_seconds: u8,
}

/// Charging voltage ceiling. Both fields are set together or not at all:
/// a millivolt limit is meaningless without a control file to write it to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoltageControl {
    #[serde(default)]
    pub control_file: Option<String>,
    #[serde(default)]
    pub max_mv: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AccConfig {
    pub capacity: CapacityControl,
    pub temperature: TemperatureControl,
    pub cooldown: CoolDownControl,
    /// Shell snippet the daemon runs once on boot.
    #[serde(default)]
    pub on_boot: Option<String>,
    /// Exit the daemon after running the on-boot snippet.
    #[serde(default)]
    pub on_boot_exit: bool,
    /// Shell snippet the daemon runs when a charger is plugged.
    #[serde(default)]
    pub on_plug: Option<String>,
    /// Charging switch as "path on_value off_value"; None selects automatically.
    #[serde(default)]
    pub charge_switch: Option<String>,
    #[serde(default)]
    pub voltage: VoltageControl,
}

impl Default for AccConfig {
    fn default() -> Self {
        Self {
            capacity: CapacityControl { shutdown: 5, resume: 70, pause: 75 },
            temperature: TemperatureControl { cool_down_c: 40, pause_c: 45 },
            cooldown: CoolDownControl {
                at_percent: bounds::COOLDOWN_DISABLED,
                charge_seconds: bounds::CHARGE_RATIO_DEFAULT,
                pause_seconds: bounds::PAUSE_RATIO_DEFAULT,
            },
            on_boot: None,
            on_boot_exit: false,
            on_plug: None,
            charge_switch: None,
            voltage: VoltageControl::default(),
        }
    }
}

impl AccConfig {
    pub fn temp_control_enabled(&self) -> bool {
        !(self.temperature.cool_down_c >= bounds::TEMP_DISABLE_COOL_DOWN
            && self.temperature.pause_c >= bounds::TEMP_DISABLE_PAUSE)
    }

    pub fn cooldown_enabled(&self) -> bool {
        self.cooldown.at_percent <= 100
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

pub fn config_path() -> PathBuf {
    if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
        return Path::new(&xdg).join("acctui").join("config.json");
    }
    if let Ok(home) = env::var("HOME") {
        return Path::new(&home)
            .join(".config")
            .join("acctui")
            .join("config.json");
    }
    PathBuf::from("/etc/acctui/config.json")
}

pub fn system_config_path() -> PathBuf { PathBuf::from("/etc/acctui/config.json") }

/// Best-effort load of the user's draft config. None when absent or unreadable.
pub fn load_saved_config() -> Option<AccConfig> {
    load_config_from(&config_path()).ok()
}

/// Load the daemon-facing system config, surfacing why it could not be used.
pub fn try_load_system_config() -> Result<AccConfig, ConfigError> {
    load_config_from(&system_config_path())
}

pub fn load_config_from(path: &Path) -> Result<AccConfig, ConfigError> {
    let data = fs::read_to_string(path)?;
    let cfg: AccConfig = serde_json::from_str(&data)?;
    validate_config(&cfg).map_err(ConfigError::Invalid)?;
    Ok(cfg)
}

pub fn save_user_config(cfg: &AccConfig) -> io::Result<()> {
    write_config_to(cfg, &config_path())
}

/// Commit a config to the daemon-facing system path. Called only on explicit
/// save; an abandoned editing session never touches the store.
pub fn write_system_config(cfg: &AccConfig) -> io::Result<()> {
    write_config_to(cfg, &system_config_path())
}

pub fn write_config_to(cfg: &AccConfig, path: &Path) -> io::Result<()> {
    validate_config(cfg).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(cfg).unwrap_or_else(|_| "{}".to_string());
    fs::write(path, json)?;
    // Best-effort set permissions to 0644
    let perms = fs::Permissions::from_mode(0o644);
    let _ = fs::set_permissions(path, perms);
    Ok(())
}

fn is_safe_snippet(s: &str) -> bool {
    // Hook snippets and switch specs are stored verbatim; just bound the size
    // and reject embedded NUL/newlines that would corrupt the daemon's view.
    s.len() <= 512 && !s.contains('\u{0}') && !s.contains('\n')
}

pub fn validate_config(cfg: &AccConfig) -> Result<(), String> {
    let cap = &cfg.capacity;
    if cap.shutdown > bounds::SHUTDOWN_MAX {
        return Err(format!("shutdown capacity out of range (0..{})", bounds::SHUTDOWN_MAX));
    }
    if !(cap.shutdown <= cap.resume && cap.resume < cap.pause && cap.pause <= 100) {
        return Err("capacity chain violated (shutdown <= resume < pause <= 100)".to_string());
    }

    let temp = &cfg.temperature;
    if !(bounds::TEMP_MIN..=bounds::COOL_DOWN_TEMP_MAX).contains(&temp.cool_down_c) {
        return Err("cool-down temperature out of range (20..90)".to_string());
    }
    if !(bounds::TEMP_MIN..=bounds::PAUSE_TEMP_MAX).contains(&temp.pause_c) {
        return Err("pause temperature out of range (20..95)".to_string());
    }

    let cd = &cfg.cooldown;
    if !(cap.shutdown..=bounds::COOLDOWN_DISABLED).contains(&cd.at_percent) {
        return Err("cooldown percent out of range (shutdown..101)".to_string());
    }
    if !(bounds::RATIO_MIN..=bounds::RATIO_MAX).contains(&cd.charge_seconds) {
        return Err("cooldown charge ratio out of range (1..120)".to_string());
    }
    if !(bounds::RATIO_MIN..=bounds::RATIO_MAX).contains(&cd.pause_seconds) {
        return Err("cooldown pause ratio out of range (1..120)".to_string());
    }

    match (&cfg.voltage.control_file, cfg.voltage.max_mv) {
        (None, None) => {}
        (Some(file), Some(mv)) => {
            if file.is_empty() || !is_safe_snippet(file) {
                return Err("invalid voltage control file".to_string());
            }
            if !(bounds::VOLTAGE_MIN_MV..bounds::VOLTAGE_MAX_MV).contains(&mv) {
                return Err("voltage limit out of range (3920..4199 mV)".to_string());
            }
        }
        _ => return Err("voltage limit and control file must be set together".to_string()),
    }

    for snippet in [&cfg.on_boot, &cfg.on_plug, &cfg.charge_switch].into_iter().flatten() {
        if !is_safe_snippet(snippet) {
            return Err("invalid characters or length in command/switch string".to_string());
        }
    }
    Ok(())
}
