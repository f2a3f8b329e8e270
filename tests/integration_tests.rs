/*
 * Integration tests for Acctui
 *
 * These tests verify the interaction between different modules
 * and the end-to-end editor scenarios from the daemon's contract.
 */

use std::fs;
use std::thread;
use std::time::Duration;

use serial_test::serial;
use tempfile::TempDir;

use acctui::app::{App, Field, Page, FIELDS};
use acctui::battery::{self, SwitchTest};
use acctui::bounds;
use acctui::config::{self, AccConfig, CapacityControl, VoltageControl};
use acctui::handlers;
use acctui::logwatch::{reconcile, LogUpdate, LogWatcher};

fn test_app() -> App {
    let mut app = App::new();
    app.config = AccConfig::default();
    app.show_notice_popup = false;
    app.unsaved_changes = false;
    app
}

fn field_index(field: Field) -> usize {
    FIELDS.iter().position(|f| *f == field).unwrap()
}

fn lines(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_every_bounds_edit_keeps_config_storable() {
    // Whatever sequence of setter calls runs, the result must pass the
    // store's validation gate.
    let mut cfg = AccConfig::default();
    bounds::set_shutdown_capacity(&mut cfg, 200);
    bounds::set_pause_capacity(&mut cfg, 0);
    bounds::set_resume_capacity(&mut cfg, 255);
    bounds::set_cooldown(&mut cfg, true);
    bounds::set_cooldown_percent(&mut cfg, 0);
    bounds::set_charge_ratio(&mut cfg, 0);
    bounds::set_pause_ratio(&mut cfg, 255);
    bounds::set_temp_control(&mut cfg, false);
    assert!(config::validate_config(&cfg).is_ok(), "bounds engine produced {:?}", cfg);
}

#[test]
fn test_pause_scenario_then_save_roundtrip() {
    // (5,10,50) with pause dropped to 8 converges to (5,7,8), and the result
    // survives a store roundtrip.
    let mut cfg = AccConfig::default();
    cfg.capacity = CapacityControl { shutdown: 5, resume: 10, pause: 50 };
    bounds::set_pause_capacity(&mut cfg, 8);
    assert_eq!(cfg.capacity, CapacityControl { shutdown: 5, resume: 7, pause: 8 });

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    config::write_config_to(&cfg, &path).unwrap();
    let loaded = config::load_config_from(&path).unwrap();
    assert_eq!(loaded.capacity, CapacityControl { shutdown: 5, resume: 7, pause: 8 });
}

#[test]
fn test_editor_session_discard_has_no_side_effects() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    let original = AccConfig::default();
    config::write_config_to(&original, &path).unwrap();
    let before = fs::read_to_string(&path).unwrap();

    // Mutate a session copy heavily, then drop it without saving.
    let mut session = config::load_config_from(&path).unwrap();
    bounds::set_shutdown_capacity(&mut session, 20);
    bounds::set_temp_control(&mut session, false);
    drop(session);

    assert_eq!(fs::read_to_string(&path).unwrap(), before);
}

#[test]
fn test_voltage_dialog_gate_end_to_end() {
    // A max entered with no control file keeps OK disabled; choosing a
    // file enables it.
    let mut app = test_app();
    let dir = TempDir::new().unwrap();
    app.supply_root = dir.path().to_path_buf();

    handlers::open_voltage_editor(&mut app);
    app.voltage_enabled = true;
    app.voltage_input = "4000".to_string();
    assert!(!handlers::voltage_popup_valid(&app));
    handlers::apply_voltage_editor(&mut app);
    assert!(app.show_voltage_popup);
    assert_eq!(app.config.voltage, VoltageControl::default());

    app.voltage_files = vec!["battery/voltage_max".to_string()];
    app.voltage_file_idx = Some(0);
    assert!(handlers::voltage_popup_valid(&app));
    handlers::apply_voltage_editor(&mut app);
    assert!(!app.show_voltage_popup);
    assert_eq!(app.config.voltage.max_mv, Some(4000));
    assert!(config::validate_config(&app.config).is_ok());
}

#[test]
fn test_switch_probe_outcomes_on_fake_trees() {
    // Works: adapter online, battery not charging once the switch is off.
    let dir = TempDir::new().unwrap();
    let batt = dir.path().join("battery");
    fs::create_dir_all(&batt).unwrap();
    fs::write(batt.join("type"), "Battery\n").unwrap();
    fs::write(batt.join("status"), "Discharging\n").unwrap();
    fs::write(batt.join("charging_enabled"), "1\n").unwrap();
    let ac = dir.path().join("ac");
    fs::create_dir_all(&ac).unwrap();
    fs::write(ac.join("type"), "Mains\n").unwrap();
    fs::write(ac.join("online"), "1\n").unwrap();

    let outcome = battery::test_charging_switch(dir.path(), None, Duration::ZERO);
    assert_eq!(outcome, SwitchTest::Works);

    // NotPlugged: no adapter, battery discharging.
    fs::write(ac.join("online"), "0\n").unwrap();
    let outcome = battery::test_charging_switch(dir.path(), None, Duration::ZERO);
    assert_eq!(outcome, SwitchTest::NotPlugged);
}

#[test]
fn test_log_view_lifecycle_with_growing_file() {
    let mut app = test_app();
    let dir = TempDir::new().unwrap();
    let log_path = dir.path().join("acc-daemon-2025.log");
    fs::write(&log_path, "one\ntwo\nthree\n").unwrap();
    app.log_dir = dir.path().to_path_buf();

    handlers::open_log_view(&mut app);
    assert_eq!(app.page, Page::LogView);

    wait_for(&mut app, |a| !a.log.lines.is_empty());
    assert_eq!(app.log.lines, lines(&["one", "two", "three"]));
    // Pinned on entry: the selection follows the bottom.
    assert_eq!(app.log.selected, 2);

    // Grow the file; only the two tail lines may be appended.
    let mut content = fs::read_to_string(&log_path).unwrap();
    content.push_str("four\nfive\n");
    fs::write(&log_path, content).unwrap();

    wait_for(&mut app, |a| a.log.lines.len() == 5);
    assert_eq!(app.log.lines, lines(&["one", "two", "three", "four", "five"]));
    assert_eq!(app.log.selected, 4, "pinned view must follow the new bottom");

    // Unpin by scrolling up; further growth keeps the position.
    handlers::log_scroll_up(&mut app);
    let held = app.log.selected;
    fs::write(&log_path, "one\ntwo\nthree\nfour\nfive\nsix\n").unwrap();
    wait_for(&mut app, |a| a.log.lines.len() == 6);
    assert_eq!(app.log.selected, held);

    handlers::close_log_view(&mut app);
    assert_eq!(app.page, Page::Editor);
    assert!(app.log_watcher.is_none());
}

#[test]
fn test_log_rotation_replaces_view() {
    let mut app = test_app();
    let dir = TempDir::new().unwrap();
    let log_path = dir.path().join("acc-daemon-2025.log");
    fs::write(&log_path, "a\nb\nc\nd\n").unwrap();
    app.log_dir = dir.path().to_path_buf();

    handlers::open_log_view(&mut app);
    wait_for(&mut app, |a| a.log.lines.len() == 4);

    // Rotate: the file shrinks, the whole view is replaced.
    fs::write(&log_path, "fresh\n").unwrap();
    wait_for(&mut app, |a| a.log.lines.len() == 1);
    assert_eq!(app.log.lines, lines(&["fresh"]));

    handlers::close_log_view(&mut app);
}

#[test]
fn test_missing_log_file_keeps_editor_alive() {
    let mut app = test_app();
    let dir = TempDir::new().unwrap();
    app.log_dir = dir.path().to_path_buf();

    handlers::open_log_view(&mut app);
    assert_eq!(app.page, Page::Editor);
    assert!(app.show_notice_popup);
    assert!(app.log_watcher.is_none());

    // The editor still edits.
    app.show_notice_popup = false;
    app.field_idx = field_index(Field::ShutdownCapacity);
    handlers::adjust_field(&mut app, 1);
    assert!(app.unsaved_changes);
}

#[test]
fn test_reconcile_contract_matrix() {
    // m < n replaces, m > n appends the tail, m == n leaves the view alone.
    assert_eq!(
        reconcile(4, lines(&["x"])),
        LogUpdate::Replace(lines(&["x"]))
    );
    assert_eq!(
        reconcile(1, lines(&["x", "y", "z"])),
        LogUpdate::Append(lines(&["y", "z"]))
    );
    assert_eq!(reconcile(2, lines(&["x", "y"])), LogUpdate::Unchanged);
}

#[test]
fn test_watcher_single_outstanding_read() {
    // A second tick must not start while the first apply is unacknowledged.
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("acc-daemon-x.log");
    fs::write(&path, "one\n").unwrap();

    let mut watcher = LogWatcher::new(path.clone());
    watcher.start();
    let first = loop {
        if let Some(s) = watcher.poll() {
            break s;
        }
        thread::sleep(Duration::from_millis(20));
    };
    assert_eq!(first, lines(&["one"]));

    fs::write(&path, "one\ntwo\n").unwrap();
    thread::sleep(Duration::from_millis(1500));
    assert_eq!(watcher.poll(), None, "read overlapped an unapplied snapshot");

    watcher.ack();
    let second = loop {
        if let Some(s) = watcher.poll() {
            break s;
        }
        thread::sleep(Duration::from_millis(20));
    };
    assert_eq!(second, lines(&["one", "two"]));
    watcher.stop();
}

#[test]
#[serial]
fn test_user_config_store_under_custom_xdg() {
    let dir = TempDir::new().unwrap();
    std::env::set_var("XDG_CONFIG_HOME", dir.path());

    let mut cfg = AccConfig::default();
    bounds::set_cooldown(&mut cfg, true);
    config::save_user_config(&cfg).unwrap();

    let loaded = config::load_saved_config().expect("draft saved under XDG must load");
    assert_eq!(loaded.cooldown.at_percent, 60);

    std::env::remove_var("XDG_CONFIG_HOME");
}

#[test]
fn test_temp_and_cooldown_toggle_scenarios() {
    // The fixed-value toggle pairs, driven through the editor rows.
    let mut app = test_app();
    app.field_idx = field_index(Field::TempControl);
    handlers::toggle_field(&mut app);
    assert_eq!(
        (app.config.temperature.cool_down_c, app.config.temperature.pause_c),
        (90, 95)
    );
    handlers::toggle_field(&mut app);
    assert_eq!(
        (app.config.temperature.cool_down_c, app.config.temperature.pause_c),
        (40, 45)
    );

    app.field_idx = field_index(Field::Cooldown);
    handlers::toggle_field(&mut app);
    assert_eq!(app.config.cooldown.at_percent, 60);
    handlers::toggle_field(&mut app);
    assert_eq!(app.config.cooldown.at_percent, 101);
}

fn wait_for(app: &mut App, pred: impl Fn(&App) -> bool) {
    for _ in 0..150 {
        handlers::pump_background(app);
        if pred(app) {
            return;
        }
        thread::sleep(Duration::from_millis(20));
    }
    panic!("condition not reached within timeout");
}
