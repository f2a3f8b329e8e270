/*
 * Test utilities and mock helpers for Acctui
 *
 * This module provides common builders used across different test modules:
 * configs in known states and fake sysfs power-supply trees.
 */

use std::fs;

use tempfile::TempDir;

use crate::app::App;
use crate::config::{AccConfig, CapacityControl, CoolDownControl, TemperatureControl, VoltageControl};

/// A config with every section populated, for store/validation tests.
pub fn create_test_config() -> AccConfig {
    AccConfig {
        capacity: CapacityControl { shutdown: 10, resume: 60, pause: 80 },
        temperature: TemperatureControl { cool_down_c: 45, pause_c: 55 },
        cooldown: CoolDownControl { at_percent: 60, charge_seconds: 50, pause_seconds: 10 },
        on_boot: Some("acc --set applyOnBoot".to_string()),
        on_boot_exit: false,
        on_plug: Some("echo plugged".to_string()),
        charge_switch: Some("battery/charging_enabled 1 0".to_string()),
        voltage: VoltageControl {
            control_file: Some("battery/constant_charge_voltage".to_string()),
            max_mv: Some(4100),
        },
    }
}

/// An App with a deterministic default config and any startup notice cleared.
pub fn create_test_app() -> App {
    let mut app = App::new();
    app.config = AccConfig::default();
    app.show_notice_popup = false;
    app.unsaved_changes = false;
    app
}

/// A power-supply tree with one battery (given status) and one AC adapter
/// (given online state), carrying one charging switch and one voltage file.
pub fn fake_supply_tree(battery_status: &str, ac_online: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    let batt = dir.path().join("battery");
    fs::create_dir_all(&batt).unwrap();
    fs::write(batt.join("type"), "Battery\n").unwrap();
    fs::write(batt.join("status"), format!("{}\n", battery_status)).unwrap();
    fs::write(batt.join("capacity"), "73\n").unwrap();
    fs::write(batt.join("charging_enabled"), "1\n").unwrap();
    fs::write(batt.join("constant_charge_voltage"), "4350000\n").unwrap();

    let ac = dir.path().join("ac");
    fs::create_dir_all(&ac).unwrap();
    fs::write(ac.join("type"), "Mains\n").unwrap();
    fs::write(ac.join("online"), format!("{}\n", ac_online)).unwrap();
    dir
}

/// A log directory holding one daemon log with the given lines.
pub fn fake_log_dir(lines: &[&str]) -> TempDir {
    let dir = TempDir::new().unwrap();
    let mut content = lines.join("\n");
    if !content.is_empty() {
        content.push('\n');
    }
    fs::write(dir.path().join("acc-daemon-main.log"), content).unwrap();
    dir
}
