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

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::battery::{self, BatterySnapshot, SwitchTest};
use crate::config::{load_saved_config, try_load_system_config, AccConfig};
use crate::logwatch::LogWatcher;
use crate::system::{read_daemon_version, read_device_name};

pub const EDITOR_STATUS: &str =
    "↑/↓: field | ←/→: adjust | Enter: edit/toggle | l: log | s: save | ?: info | q: quit";
pub const LOG_STATUS: &str =
    "↑/↓: scroll | G: bottom | g: top | y: yank line | Esc: back";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Page {
    Editor,
    LogView,
}

/// Editor rows, in display order.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Field {
    ShutdownCapacity,
    ResumeCapacity,
    PauseCapacity,
    TempControl,
    CoolDownTemp,
    PauseTemp,
    Cooldown,
    CooldownPercent,
    ChargeRatio,
    PauseRatio,
    OnBoot,
    OnBootExit,
    OnPlug,
    ChargeSwitch,
    VoltageLimit,
}

pub const FIELDS: &[Field] = &[
    Field::ShutdownCapacity,
    Field::ResumeCapacity,
    Field::PauseCapacity,
    Field::TempControl,
    Field::CoolDownTemp,
    Field::PauseTemp,
    Field::Cooldown,
    Field::CooldownPercent,
    Field::ChargeRatio,
    Field::PauseRatio,
    Field::OnBoot,
    Field::OnBootExit,
    Field::OnPlug,
    Field::ChargeSwitch,
    Field::VoltageLimit,
];

impl Field {
    pub fn label(&self) -> &'static str {
        match self {
            Field::ShutdownCapacity => "Shutdown capacity",
            Field::ResumeCapacity => "Resume capacity",
            Field::PauseCapacity => "Pause capacity",
            Field::TempControl => "Temperature control",
            Field::CoolDownTemp => "Cool-down temperature",
            Field::PauseTemp => "Pause temperature",
            Field::Cooldown => "Cooldown",
            Field::CooldownPercent => "Cooldown above",
            Field::ChargeRatio => "Cooldown charge ratio",
            Field::PauseRatio => "Cooldown pause ratio",
            Field::OnBoot => "On boot",
            Field::OnBootExit => "Exit on boot",
            Field::OnPlug => "On plugged",
            Field::ChargeSwitch => "Charging switch",
            Field::VoltageLimit => "Voltage limit",
        }
    }

    /// Section help, shown from the `?` popup for the focused row.
    pub fn info(&self) -> &'static str {
        match self {
            Field::ShutdownCapacity | Field::ResumeCapacity | Field::PauseCapacity => {
                "Capacity control: the daemon shuts the device down at the shutdown \
                 threshold, resumes charging at the resume threshold and pauses at the \
                 pause threshold. The three values always satisfy shutdown <= resume < pause."
            }
            Field::TempControl | Field::CoolDownTemp | Field::PauseTemp => {
                "Temperature control: above the cool-down temperature the daemon cycles \
                 charging to limit heat; above the pause temperature it stops charging \
                 entirely. Disabling writes the (90, 95) sentinel pair."
            }
            Field::Cooldown | Field::CooldownPercent | Field::ChargeRatio | Field::PauseRatio => {
                "Cooldown: above the given charge percent the daemon alternates charging \
                 for the charge ratio seconds and pausing for the pause ratio seconds, \
                 which prolongs battery life near full charge."
            }
            Field::OnBoot | Field::OnBootExit => {
                "On boot: a shell snippet the daemon runs once at boot, typically used to \
                 apply kernel-specific tweaks. 'Exit on boot' stops the daemon afterwards."
            }
            Field::OnPlug => {
                "On plugged: a shell snippet the daemon runs every time a charger is \
                 connected."
            }
            Field::ChargeSwitch => {
                "Charging switch: the kernel control file the daemon writes to start and \
                 stop charging. Automatic lets the daemon pick the first switch that works. \
                 Use the test action to verify a switch on this device."
            }
            Field::VoltageLimit => {
                "Voltage limit: caps the charging voltage (3920-4199 mV) via a voltage \
                 control file. Requires selecting a control file; both settings are \
                 cleared together when disabled."
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct LogViewState {
    pub lines: Vec<String>,
    pub selected: usize,
    /// Auto-follow: true only while the selection sits on the last line.
    pub pinned: bool,
}

pub struct App {
    pub last_refresh: Instant,
    pub refresh_interval: Duration,
    pub page: Page,
    pub status: String,
    // header
    pub device_name: String,
    pub daemon_version: Option<String>,
    pub battery: Option<BatterySnapshot>,
    // editor session: one config instance, owned exclusively by this screen
    pub config: AccConfig,
    pub unsaved_changes: bool,
    pub field_idx: usize,
    // notice popup (config read error, missing log file, ...)
    pub show_notice_popup: bool,
    pub notice_title: String,
    pub notice_message: String,
    // section info popup
    pub show_help_popup: bool,
    // unsaved-changes prompt (save / discard / cancel)
    pub show_unsaved_popup: bool,
    pub pending_quit: bool,
    // save confirmation
    pub show_confirm_save_popup: bool,
    // on-boot / on-plugged hook editors (one open at a time, shared buffer)
    pub show_on_boot_popup: bool,
    pub show_on_plug_popup: bool,
    pub hook_input: String,
    // charging switch chooser
    pub show_switch_popup: bool,
    pub switch_items: Vec<String>,
    pub switch_idx: usize,
    pub switch_test_running: Arc<Mutex<bool>>,
    pub switch_test_result: Arc<Mutex<Option<SwitchTest>>>,
    pub show_switch_test_popup: bool,
    pub switch_test_outcome: Option<SwitchTest>,
    // voltage limit editor
    pub show_voltage_popup: bool,
    pub voltage_files: Vec<String>,
    pub voltage_file_idx: Option<usize>,
    pub voltage_enabled: bool,
    pub voltage_input: String,
    // log view
    pub log: LogViewState,
    pub log_watcher: Option<LogWatcher>,
    // overridable roots so tests never touch the real sysfs
    pub supply_root: PathBuf,
    pub log_dir: PathBuf,
}

impl App {
    pub fn new() -> Self {
        let mut app = Self {
            last_refresh: Instant::now() - Duration::from_secs(10),
            refresh_interval: Duration::from_millis(1000),
            page: Page::Editor,
            status: EDITOR_STATUS.to_string(),
            device_name: read_device_name(),
            daemon_version: read_daemon_version(),
            battery: None,
            config: AccConfig::default(),
            unsaved_changes: false,
            field_idx: 0,
            show_notice_popup: false,
            notice_title: String::new(),
            notice_message: String::new(),
            show_help_popup: false,
            show_unsaved_popup: false,
            pending_quit: false,
            show_confirm_save_popup: false,
            show_on_boot_popup: false,
            show_on_plug_popup: false,
            hook_input: String::new(),
            show_switch_popup: false,
            switch_items: Vec::new(),
            switch_idx: 0,
            switch_test_running: Arc::new(Mutex::new(false)),
            switch_test_result: Arc::new(Mutex::new(None)),
            show_switch_test_popup: false,
            switch_test_outcome: None,
            show_voltage_popup: false,
            voltage_files: Vec::new(),
            voltage_file_idx: None,
            voltage_enabled: false,
            voltage_input: String::new(),
            log: LogViewState::default(),
            log_watcher: None,
            supply_root: PathBuf::from(battery::POWER_SUPPLY_ROOT),
            log_dir: PathBuf::from(battery::LOG_DIR),
        };

        // System config first, then the user draft; a default with a notice
        // when neither can be read. Editing proceeds either way.
        match try_load_system_config() {
            Ok(cfg) => app.config = cfg,
            Err(_) => match load_saved_config() {
                Some(cfg) => app.config = cfg,
                None => {
                    app.show_notice_popup = true;
                    app.notice_title = "Config error".to_string();
                    app.notice_message =
                        "The daemon config could not be read. Default values are shown; \
                         saving will write a fresh config."
                            .to_string();
                }
            },
        }
        app
    }

    pub fn refresh(&mut self) {
        self.battery = battery::read_battery(&self.supply_root).ok();
        if !self.any_popup_open() {
            self.status = match self.page {
                Page::Editor => EDITOR_STATUS.to_string(),
                Page::LogView => LOG_STATUS.to_string(),
            };
        }
        self.last_refresh = Instant::now();
    }

    pub fn any_popup_open(&self) -> bool {
        self.show_notice_popup
            || self.show_help_popup
            || self.show_unsaved_popup
            || self.show_confirm_save_popup
            || self.show_on_boot_popup
            || self.show_on_plug_popup
            || self.show_switch_popup
            || self.show_switch_test_popup
            || self.show_voltage_popup
    }

    pub fn current_field(&self) -> Field {
        FIELDS[self.field_idx.min(FIELDS.len() - 1)]
    }

    /// Rows tied to a disabled section render dim and ignore adjustment.
    pub fn field_enabled(&self, field: Field) -> bool {
        match field {
            Field::CoolDownTemp | Field::PauseTemp => self.config.temp_control_enabled(),
            Field::CooldownPercent | Field::ChargeRatio | Field::PauseRatio => {
                self.config.cooldown_enabled()
            }
            _ => true,
        }
    }

    pub fn notice(&mut self, title: &str, message: String) {
        self.show_notice_popup = true;
        self.notice_title = title.to_string();
        self.notice_message = message;
    }

    pub fn switch_test_running(&self) -> bool {
        self.switch_test_running.lock().map(|g| *g).unwrap_or(false)
    }

    /// Take a finished probe result, if one is parked in the slot.
    pub fn take_switch_test_result(&mut self) -> Option<SwitchTest> {
        self.switch_test_result.lock().ok().and_then(|mut g| g.take())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_new_default_state() {
        let app = App::new();

        assert_eq!(app.page, Page::Editor);
        assert_eq!(app.field_idx, 0);
        assert!(!app.unsaved_changes);
        assert!(!app.pending_quit);

        assert!(!app.show_help_popup);
        assert!(!app.show_unsaved_popup);
        assert!(!app.show_confirm_save_popup);
        assert!(!app.show_on_boot_popup);
        assert!(!app.show_on_plug_popup);
        assert!(!app.show_switch_popup);
        assert!(!app.show_switch_test_popup);
        assert!(!app.show_voltage_popup);

        assert!(app.log.lines.is_empty());
        assert!(app.log_watcher.is_none());
        assert!(!app.switch_test_running());
        assert!(!app.status.is_empty());
    }

    #[test]
    fn test_current_field_follows_index() {
        let mut app = App::new();
        assert_eq!(app.current_field(), Field::ShutdownCapacity);
        app.field_idx = 2;
        assert_eq!(app.current_field(), Field::PauseCapacity);
        // Out-of-range index degrades to the last row instead of panicking
        app.field_idx = 999;
        assert_eq!(app.current_field(), Field::VoltageLimit);
    }

    #[test]
    fn test_field_enabled_tracks_sections() {
        let mut app = App::new();
        app.config = AccConfig::default();
        // Default: temperature control on, cooldown off
        assert!(app.field_enabled(Field::CoolDownTemp));
        assert!(app.field_enabled(Field::PauseTemp));
        assert!(!app.field_enabled(Field::CooldownPercent));
        assert!(!app.field_enabled(Field::ChargeRatio));
        assert!(!app.field_enabled(Field::PauseRatio));
        assert!(app.field_enabled(Field::ShutdownCapacity));

        crate::bounds::set_cooldown(&mut app.config, true);
        assert!(app.field_enabled(Field::CooldownPercent));
        crate::bounds::set_temp_control(&mut app.config, false);
        assert!(!app.field_enabled(Field::CoolDownTemp));
    }

    #[test]
    fn test_notice_sets_popup() {
        let mut app = App::new();
        app.notice("Log file not found", "no acc-daemon-*.log".to_string());
        assert!(app.show_notice_popup);
        assert_eq!(app.notice_title, "Log file not found");
        assert!(app.any_popup_open());
    }

    #[test]
    fn test_take_switch_test_result_drains_slot() {
        let mut app = App::new();
        assert_eq!(app.take_switch_test_result(), None);
        *app.switch_test_result.lock().unwrap() = Some(SwitchTest::Works);
        assert_eq!(app.take_switch_test_result(), Some(SwitchTest::Works));
        assert_eq!(app.take_switch_test_result(), None);
    }

    #[test]
    fn test_fields_cover_every_row_once() {
        assert_eq!(FIELDS.len(), 15);
        let mut seen = Vec::new();
        for f in FIELDS {
            assert!(!seen.contains(f), "duplicate field {:?}", f);
            seen.push(*f);
        }
    }

    #[test]
    fn test_every_field_has_label_and_info() {
        for f in FIELDS {
            assert!(!f.label().is_empty());
            assert!(!f.info().is_empty());
        }
    }
}
