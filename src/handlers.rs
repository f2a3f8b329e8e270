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

use std::thread;

use serde_json::json;

use crate::app::{App, Field, LogViewState, Page, EDITOR_STATUS, LOG_STATUS};
use crate::battery;
use crate::bounds;
use crate::config::write_system_config;
use crate::logger;
use crate::logwatch::{reconcile, LogUpdate, LogWatcher};

// ===== Editor field handlers =====

fn picker_value(app: &App, field: Field) -> Option<u8> {
    let cfg = &app.config;
    match field {
        Field::ShutdownCapacity => Some(cfg.capacity.shutdown),
        Field::ResumeCapacity => Some(cfg.capacity.resume),
        Field::PauseCapacity => Some(cfg.capacity.pause),
        Field::CoolDownTemp => Some(cfg.temperature.cool_down_c),
        Field::PauseTemp => Some(cfg.temperature.pause_c),
        Field::CooldownPercent => Some(cfg.cooldown.at_percent),
        Field::ChargeRatio => Some(cfg.cooldown.charge_seconds),
        Field::PauseRatio => Some(cfg.cooldown.pause_seconds),
        _ => None,
    }
}

/// Step the focused numeric row by `delta` through the bounds engine.
/// Disabled rows and non-numeric rows ignore adjustment.
pub fn adjust_field(app: &mut App, delta: i16) {
    let field = app.current_field();
    if !app.field_enabled(field) {
        return;
    }
    let Some(current) = picker_value(app, field) else {
        // Switch rows treat left/right as a toggle, like the editor's
        // original switches.
        if matches!(field, Field::TempControl | Field::Cooldown | Field::OnBootExit) {
            toggle_field(app);
        }
        return;
    };
    let target = (current as i16).saturating_add(delta).clamp(0, 255) as u8;
    let cfg = &mut app.config;
    match field {
        Field::ShutdownCapacity => bounds::set_shutdown_capacity(cfg, target),
        Field::ResumeCapacity => bounds::set_resume_capacity(cfg, target),
        Field::PauseCapacity => bounds::set_pause_capacity(cfg, target),
        Field::CoolDownTemp => bounds::set_cool_down_temp(cfg, target),
        Field::PauseTemp => bounds::set_pause_temp(cfg, target),
        Field::CooldownPercent => bounds::set_cooldown_percent(cfg, target),
        Field::ChargeRatio => bounds::set_charge_ratio(cfg, target),
        Field::PauseRatio => bounds::set_pause_ratio(cfg, target),
        _ => unreachable!("picker_value covered numeric rows"),
    };
    if picker_value(app, field) != Some(current) {
        app.unsaved_changes = true;
    }
}

pub fn toggle_field(app: &mut App) {
    match app.current_field() {
        Field::TempControl => {
            let enabled = app.config.temp_control_enabled();
            bounds::set_temp_control(&mut app.config, !enabled);
            app.unsaved_changes = true;
        }
        Field::Cooldown => {
            let enabled = app.config.cooldown_enabled();
            bounds::set_cooldown(&mut app.config, !enabled);
            app.unsaved_changes = true;
        }
        Field::OnBootExit => {
            app.config.on_boot_exit = !app.config.on_boot_exit;
            app.unsaved_changes = true;
        }
        _ => {}
    }
}

/// Enter on the focused row: switch rows toggle, dialog rows open their popup.
pub fn activate_field(app: &mut App) {
    match app.current_field() {
        Field::TempControl | Field::Cooldown | Field::OnBootExit => toggle_field(app),
        Field::OnBoot => open_on_boot_editor(app),
        Field::OnPlug => open_on_plug_editor(app),
        Field::ChargeSwitch => open_switch_chooser(app),
        Field::VoltageLimit => open_voltage_editor(app),
        _ => {}
    }
}

pub fn move_field_up(app: &mut App) {
    if app.field_idx > 0 {
        app.field_idx -= 1;
    }
}

pub fn move_field_down(app: &mut App) {
    if app.field_idx + 1 < crate::app::FIELDS.len() {
        app.field_idx += 1;
    }
}

// ===== Hook (on boot / on plugged) editors =====

pub fn open_on_boot_editor(app: &mut App) {
    app.hook_input = app.config.on_boot.clone().unwrap_or_default();
    app.show_on_boot_popup = true;
}

pub fn open_on_plug_editor(app: &mut App) {
    app.hook_input = app.config.on_plug.clone().unwrap_or_default();
    app.show_on_plug_popup = true;
}

/// A blank entry clears the hook; anything else is stored verbatim.
pub fn apply_hook_editor(app: &mut App) {
    let text = app.hook_input.trim().to_string();
    let value = if text.is_empty() { None } else { Some(text) };
    if app.show_on_boot_popup {
        app.config.on_boot = value;
    } else if app.show_on_plug_popup {
        app.config.on_plug = value;
    }
    app.unsaved_changes = true;
    cancel_hook_editor(app);
}

pub fn cancel_hook_editor(app: &mut App) {
    app.show_on_boot_popup = false;
    app.show_on_plug_popup = false;
    app.hook_input.clear();
}

// ===== Charging switch chooser =====

pub const AUTOMATIC_SWITCH: &str = "Automatic";

pub fn open_switch_chooser(app: &mut App) {
    let mut items = vec![AUTOMATIC_SWITCH.to_string()];
    items.extend(battery::list_charging_switches(&app.supply_root));
    // A configured switch the enumerator no longer reports stays selectable,
    // the same way an unknown voltage control file does.
    if let Some(current) = &app.config.charge_switch {
        if !items.iter().any(|i| i == current) {
            items.push(current.clone());
        }
    }
    app.switch_idx = match &app.config.charge_switch {
        Some(current) => items.iter().position(|i| i == current).unwrap_or(0),
        None => 0,
    };
    app.switch_items = items;
    app.show_switch_popup = true;
}

pub fn apply_switch_choice(app: &mut App) {
    if !app.show_switch_popup {
        return;
    }
    app.config.charge_switch = if app.switch_idx == 0 {
        None
    } else {
        app.switch_items.get(app.switch_idx).cloned()
    };
    app.unsaved_changes = true;
    app.show_switch_popup = false;
    app.status = match &app.config.charge_switch {
        Some(s) => format!("Charging switch set to {}", s),
        None => "Charging switch set to automatic".to_string(),
    };
}

pub fn cancel_switch_chooser(app: &mut App) {
    app.show_switch_popup = false;
}

/// Probe the highlighted switch on a worker thread; the result lands in the
/// shared slot and `pump_background` surfaces it as a popup.
pub fn start_switch_test(app: &mut App) {
    if app.switch_test_running() {
        return;
    }
    let spec = if app.switch_idx == 0 {
        None
    } else {
        app.switch_items.get(app.switch_idx).cloned()
    };
    if let Ok(mut running) = app.switch_test_running.lock() {
        *running = true;
    }
    if let Ok(mut slot) = app.switch_test_result.lock() {
        *slot = None;
    }
    app.status = "Testing charging switch, this takes a moment...".to_string();

    let running = app.switch_test_running.clone();
    let slot = app.switch_test_result.clone();
    let root = app.supply_root.clone();
    thread::spawn(move || {
        let outcome =
            battery::test_charging_switch(&root, spec.as_deref(), battery::SWITCH_SETTLE);
        if let Ok(mut guard) = slot.lock() {
            *guard = Some(outcome);
        }
        if let Ok(mut guard) = running.lock() {
            *guard = false;
        }
    });
}

pub fn dismiss_switch_test_popup(app: &mut App) {
    app.show_switch_test_popup = false;
    app.switch_test_outcome = None;
}

// ===== Voltage limit editor =====

pub fn open_voltage_editor(app: &mut App) {
    let mut files = battery::list_voltage_control_files(&app.supply_root);
    if let Some(current) = &app.config.voltage.control_file {
        if !files.iter().any(|f| f == current) {
            files.push(current.clone());
        }
    }
    app.voltage_file_idx = match &app.config.voltage.control_file {
        Some(current) => files.iter().position(|f| f == current),
        None => {
            if files.is_empty() {
                None
            } else {
                Some(0)
            }
        }
    };
    app.voltage_files = files;
    app.voltage_enabled = app.config.voltage.max_mv.is_some();
    app.voltage_input = app
        .config
        .voltage
        .max_mv
        .map(|mv| mv.to_string())
        .unwrap_or_default();
    app.show_voltage_popup = true;
}

pub fn voltage_popup_valid(app: &App) -> bool {
    bounds::voltage_entry_valid(
        app.voltage_enabled,
        &app.voltage_input,
        app.voltage_file_idx.is_some(),
    )
}

/// OK is gated on `voltage_popup_valid`; disabling the limit clears both
/// fields so they stay jointly set or jointly empty.
pub fn apply_voltage_editor(app: &mut App) {
    if !voltage_popup_valid(app) {
        return;
    }
    if app.voltage_enabled {
        let mv = match app.voltage_input.trim().parse::<u32>() {
            Ok(v) => v,
            Err(_) => return,
        };
        let file = match app.voltage_file_idx.and_then(|i| app.voltage_files.get(i)) {
            Some(f) => f.clone(),
            None => return,
        };
        app.config.voltage.control_file = Some(file);
        app.config.voltage.max_mv = Some(mv);
    } else {
        app.config.voltage.control_file = None;
        app.config.voltage.max_mv = None;
    }
    app.unsaved_changes = true;
    app.show_voltage_popup = false;
}

pub fn cancel_voltage_editor(app: &mut App) {
    app.show_voltage_popup = false;
}

// ===== Save and quit =====

pub fn request_save(app: &mut App) {
    app.show_confirm_save_popup = true;
}

pub fn cancel_save(app: &mut App) {
    app.show_confirm_save_popup = false;
}

pub fn apply_save(app: &mut App) -> bool {
    app.show_confirm_save_popup = false;
    match write_system_config(&app.config) {
        Ok(()) => {
            app.unsaved_changes = false;
            app.status = "Saved config to /etc/acctui/config.json".to_string();
            logger::log_event("config_save", json!({ "ok": true }));
            true
        }
        Err(e) => {
            app.status = format!("Failed to save config: {}", e);
            logger::log_event("config_save", json!({ "ok": false, "error": e.to_string() }));
            false
        }
    }
}

/// True means the caller should exit now; with unsaved changes the three-way
/// prompt takes over instead.
pub fn request_quit(app: &mut App) -> bool {
    if app.unsaved_changes {
        app.pending_quit = true;
        app.show_unsaved_popup = true;
        return false;
    }
    true
}

pub fn unsaved_prompt_save(app: &mut App) -> bool {
    app.show_unsaved_popup = false;
    let saved = apply_save(app);
    let quit = saved && app.pending_quit;
    app.pending_quit = false;
    quit
}

pub fn unsaved_prompt_discard(app: &mut App) -> bool {
    app.show_unsaved_popup = false;
    let quit = app.pending_quit;
    app.pending_quit = false;
    quit
}

pub fn unsaved_prompt_cancel(app: &mut App) {
    app.show_unsaved_popup = false;
    app.pending_quit = false;
}

// ===== Log view =====

pub fn open_log_view(app: &mut App) {
    match battery::find_log_file(&app.log_dir) {
        Ok(path) => {
            let name = path
                .file_name()
                .and_then(|s| s.to_str())
                .unwrap_or("acc daemon log")
                .to_string();
            let mut watcher = LogWatcher::new(path);
            watcher.start();
            app.log_watcher = Some(watcher);
            app.log = LogViewState { lines: Vec::new(), selected: 0, pinned: true };
            app.page = Page::LogView;
            app.status = format!("{} | {}", name, LOG_STATUS);
        }
        Err(e) => {
            // Fatal for the viewer only; the editor stays usable.
            app.notice("Log file not found", e.to_string());
        }
    }
}

pub fn close_log_view(app: &mut App) {
    if let Some(mut watcher) = app.log_watcher.take() {
        watcher.stop();
    }
    app.log = LogViewState::default();
    app.page = Page::Editor;
    app.status = EDITOR_STATUS.to_string();
}

/// Fold a fresh snapshot into the displayed list. Auto-scroll happens only
/// while pinned to the bottom.
pub fn apply_log_lines(app: &mut App, fresh: Vec<String>) {
    match reconcile(app.log.lines.len(), fresh) {
        LogUpdate::Replace(all) => {
            app.log.lines = all;
            let last = app.log.lines.len().saturating_sub(1);
            if app.log.pinned {
                app.log.selected = last;
            } else {
                app.log.selected = app.log.selected.min(last);
            }
        }
        LogUpdate::Append(tail) => {
            app.log.lines.extend(tail);
            if app.log.pinned {
                app.log.selected = app.log.lines.len().saturating_sub(1);
            }
        }
        LogUpdate::Unchanged => {}
    }
}

pub fn log_scroll_up(app: &mut App) {
    if app.log.selected > 0 {
        app.log.selected -= 1;
    }
    app.log.pinned = !app.log.lines.is_empty()
        && app.log.selected == app.log.lines.len() - 1;
}

pub fn log_scroll_down(app: &mut App) {
    let last = app.log.lines.len().saturating_sub(1);
    if app.log.selected < last {
        app.log.selected += 1;
    }
    app.log.pinned = !app.log.lines.is_empty() && app.log.selected == last;
}

pub fn log_scroll_top(app: &mut App) {
    app.log.selected = 0;
    app.log.pinned = app.log.lines.len() <= 1;
}

pub fn log_scroll_bottom(app: &mut App) {
    app.log.selected = app.log.lines.len().saturating_sub(1);
    app.log.pinned = true;
}

/// Clipboard integration is out of scope; the line lands in the status bar.
pub fn yank_log_line(app: &mut App) {
    if let Some(line) = app.log.lines.get(app.log.selected) {
        app.status = format!("Line {}: {}", app.log.selected + 1, line);
    }
}

// ===== Background pumps, driven from the run loop =====

pub fn pump_background(app: &mut App) {
    pump_switch_test(app);
    pump_log_watcher(app);
}

fn pump_switch_test(app: &mut App) {
    if let Some(outcome) = app.take_switch_test_result() {
        app.switch_test_outcome = Some(outcome);
        app.show_switch_test_popup = true;
    }
}

fn pump_log_watcher(app: &mut App) {
    if app.page != Page::LogView {
        return;
    }
    let fresh = app.log_watcher.as_ref().and_then(|w| w.poll());
    if let Some(fresh) = fresh {
        apply_log_lines(app, fresh);
        // The worker schedules its next read from this acknowledgement.
        if let Some(watcher) = &app.log_watcher {
            watcher.ack();
        }
    }
}
