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

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, Page};
use crate::handlers::*;

const HOOK_INPUT_MAX: usize = 512;
const VOLTAGE_INPUT_MAX: usize = 4;

/// Main event handler. Returns Ok(true) when the application should exit.
pub fn handle_key_event(app: &mut App, key_event: KeyEvent) -> anyhow::Result<bool> {
    let KeyEvent { code, modifiers, .. } = key_event;

    // Popups swallow input first (highest priority)
    if let Some(exit) = handle_popup_events(app, code)? {
        return Ok(exit);
    }

    match app.page {
        Page::LogView => handle_log_view_events(app, code),
        Page::Editor => handle_editor_events(app, code, modifiers),
    }
}

/// Some(exit) when a popup consumed the key, None when no popup is open.
fn handle_popup_events(app: &mut App, code: KeyCode) -> anyhow::Result<Option<bool>> {
    // Generic notice (config read error, missing log file)
    if app.show_notice_popup {
        if matches!(code, KeyCode::Esc | KeyCode::Enter) {
            app.show_notice_popup = false;
            app.notice_title.clear();
            app.notice_message.clear();
        }
        return Ok(Some(false));
    }

    // Section info
    if app.show_help_popup {
        if matches!(code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('?')) {
            app.show_help_popup = false;
        }
        return Ok(Some(false));
    }

    // Switch test outcome
    if app.show_switch_test_popup {
        if matches!(code, KeyCode::Esc | KeyCode::Enter) {
            dismiss_switch_test_popup(app);
        }
        return Ok(Some(false));
    }

    // Unsaved changes: save / discard / cancel
    if app.show_unsaved_popup {
        match code {
            KeyCode::Char('s') => return Ok(Some(unsaved_prompt_save(app))),
            KeyCode::Char('d') => return Ok(Some(unsaved_prompt_discard(app))),
            KeyCode::Esc | KeyCode::Char('c') => unsaved_prompt_cancel(app),
            _ => {}
        }
        return Ok(Some(false));
    }

    // Save confirmation
    if app.show_confirm_save_popup {
        match code {
            KeyCode::Esc => cancel_save(app),
            KeyCode::Enter => {
                apply_save(app);
            }
            _ => {}
        }
        return Ok(Some(false));
    }

    // On-boot / on-plugged hook editors
    if app.show_on_boot_popup || app.show_on_plug_popup {
        handle_hook_editor_popup(app, code);
        return Ok(Some(false));
    }

    // Charging switch chooser
    if app.show_switch_popup {
        handle_switch_popup(app, code);
        return Ok(Some(false));
    }

    // Voltage limit editor
    if app.show_voltage_popup {
        handle_voltage_popup(app, code);
        return Ok(Some(false));
    }

    Ok(None)
}

fn handle_hook_editor_popup(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Esc => cancel_hook_editor(app),
        KeyCode::Enter => apply_hook_editor(app),
        KeyCode::Backspace => {
            app.hook_input.pop();
        }
        KeyCode::Char(c) => {
            if !c.is_control() && app.hook_input.len() < HOOK_INPUT_MAX {
                app.hook_input.push(c);
            }
        }
        _ => {}
    }
}

fn handle_switch_popup(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Esc => cancel_switch_chooser(app),
        KeyCode::Enter => apply_switch_choice(app),
        KeyCode::Up => {
            if app.switch_idx > 0 {
                app.switch_idx -= 1;
            }
        }
        KeyCode::Down => {
            if app.switch_idx + 1 < app.switch_items.len() {
                app.switch_idx += 1;
            }
        }
        KeyCode::Char('t') => start_switch_test(app),
        _ => {}
    }
}

fn handle_voltage_popup(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Esc => cancel_voltage_editor(app),
        // apply_voltage_editor refuses invalid entries, so the popup stays
        // open until the value and file pass the gate
        KeyCode::Enter => apply_voltage_editor(app),
        KeyCode::Char(' ') => app.voltage_enabled = !app.voltage_enabled,
        KeyCode::Up => {
            if let Some(idx) = app.voltage_file_idx {
                if idx > 0 {
                    app.voltage_file_idx = Some(idx - 1);
                }
            }
        }
        KeyCode::Down => match app.voltage_file_idx {
            Some(idx) if idx + 1 < app.voltage_files.len() => {
                app.voltage_file_idx = Some(idx + 1);
            }
            None if !app.voltage_files.is_empty() => {
                app.voltage_file_idx = Some(0);
            }
            _ => {}
        },
        KeyCode::Backspace => {
            app.voltage_input.pop();
        }
        KeyCode::Char(c) if c.is_ascii_digit() => {
            if app.voltage_input.len() < VOLTAGE_INPUT_MAX {
                app.voltage_input.push(c);
            }
        }
        _ => {}
    }
}

fn handle_log_view_events(app: &mut App, code: KeyCode) -> anyhow::Result<bool> {
    match code {
        // Leaving the viewer must stop the watcher; back to the editor,
        // never straight out of the app.
        KeyCode::Esc | KeyCode::Char('q') => close_log_view(app),
        KeyCode::Up | KeyCode::Char('k') => log_scroll_up(app),
        KeyCode::Down | KeyCode::Char('j') => log_scroll_down(app),
        KeyCode::PageUp => {
            for _ in 0..10 {
                log_scroll_up(app);
            }
        }
        KeyCode::PageDown => {
            for _ in 0..10 {
                log_scroll_down(app);
            }
        }
        KeyCode::Home | KeyCode::Char('g') => log_scroll_top(app),
        KeyCode::End | KeyCode::Char('G') => log_scroll_bottom(app),
        KeyCode::Char('y') => yank_log_line(app),
        _ => {}
    }
    Ok(false)
}

fn handle_editor_events(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
) -> anyhow::Result<bool> {
    let step: i16 = if modifiers.contains(KeyModifiers::SHIFT) { 10 } else { 1 };
    match code {
        KeyCode::Char('q') | KeyCode::Esc => return Ok(request_quit(app)),
        KeyCode::Up => move_field_up(app),
        KeyCode::Down => move_field_down(app),
        KeyCode::Left => adjust_field(app, -step),
        KeyCode::Right => adjust_field(app, step),
        KeyCode::Char('l') => open_log_view(app),
        KeyCode::Enter | KeyCode::Char(' ') => activate_field(app),
        KeyCode::Char('s') => request_save(app),
        KeyCode::Char('?') => app.show_help_popup = true,
        KeyCode::Char('R') => app.refresh(),
        _ => {}
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{Field, FIELDS};
    use crate::test_utils::create_test_app as test_app;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn shift(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::SHIFT)
    }

    #[test]
    fn test_quit_clean_session() {
        let mut app = test_app();
        assert!(handle_key_event(&mut app, key(KeyCode::Char('q'))).unwrap());
    }

    #[test]
    fn test_quit_dirty_session_prompts() {
        let mut app = test_app();
        app.unsaved_changes = true;
        assert!(!handle_key_event(&mut app, key(KeyCode::Char('q'))).unwrap());
        assert!(app.show_unsaved_popup);
        // Discard from the prompt exits.
        assert!(handle_key_event(&mut app, key(KeyCode::Char('d'))).unwrap());
    }

    #[test]
    fn test_arrow_adjust_steps_picker() {
        let mut app = test_app();
        app.field_idx = FIELDS.iter().position(|f| *f == Field::PauseCapacity).unwrap();
        let before = app.config.capacity.pause;
        handle_key_event(&mut app, key(KeyCode::Right)).unwrap();
        assert_eq!(app.config.capacity.pause, before + 1);
        handle_key_event(&mut app, shift(KeyCode::Left)).unwrap();
        assert_eq!(app.config.capacity.pause, before + 1 - 10);
    }

    #[test]
    fn test_enter_opens_switch_chooser() {
        let mut app = test_app();
        let dir = tempfile::TempDir::new().unwrap();
        app.supply_root = dir.path().to_path_buf();
        app.field_idx = FIELDS.iter().position(|f| *f == Field::ChargeSwitch).unwrap();
        handle_key_event(&mut app, key(KeyCode::Enter)).unwrap();
        assert!(app.show_switch_popup);
        // Popup swallows navigation; Esc closes it.
        handle_key_event(&mut app, key(KeyCode::Esc)).unwrap();
        assert!(!app.show_switch_popup);
    }

    #[test]
    fn test_notice_popup_swallows_keys() {
        let mut app = test_app();
        app.notice("Config error", "details".to_string());
        let before = app.field_idx;
        handle_key_event(&mut app, key(KeyCode::Down)).unwrap();
        assert_eq!(app.field_idx, before, "navigation must not leak through");
        handle_key_event(&mut app, key(KeyCode::Enter)).unwrap();
        assert!(!app.show_notice_popup);
    }

    #[test]
    fn test_hook_editor_typing() {
        let mut app = test_app();
        app.field_idx = FIELDS.iter().position(|f| *f == Field::OnBoot).unwrap();
        handle_key_event(&mut app, key(KeyCode::Enter)).unwrap();
        assert!(app.show_on_boot_popup);
        for c in "echo ok".chars() {
            handle_key_event(&mut app, key(KeyCode::Char(c))).unwrap();
        }
        handle_key_event(&mut app, key(KeyCode::Backspace)).unwrap();
        handle_key_event(&mut app, key(KeyCode::Char('n'))).unwrap();
        handle_key_event(&mut app, key(KeyCode::Enter)).unwrap();
        assert_eq!(app.config.on_boot, Some("echo on".to_string()));
        assert!(app.unsaved_changes);
    }

    #[test]
    fn test_voltage_popup_digit_entry_and_toggle() {
        let mut app = test_app();
        app.show_voltage_popup = true;
        app.voltage_files = vec!["battery/voltage_max".to_string()];
        app.voltage_file_idx = Some(0);
        app.voltage_enabled = false;

        handle_key_event(&mut app, key(KeyCode::Char(' '))).unwrap();
        assert!(app.voltage_enabled);
        for c in "4100".chars() {
            handle_key_event(&mut app, key(KeyCode::Char(c))).unwrap();
        }
        // A fifth digit is rejected by the input cap.
        handle_key_event(&mut app, key(KeyCode::Char('9'))).unwrap();
        assert_eq!(app.voltage_input, "4100");
        handle_key_event(&mut app, key(KeyCode::Enter)).unwrap();
        assert!(!app.show_voltage_popup);
        assert_eq!(app.config.voltage.max_mv, Some(4100));
    }

    #[test]
    fn test_voltage_popup_rejects_letters() {
        let mut app = test_app();
        app.show_voltage_popup = true;
        handle_key_event(&mut app, key(KeyCode::Char('x'))).unwrap();
        assert!(app.voltage_input.is_empty());
    }

    #[test]
    fn test_log_view_keys_do_not_exit() {
        let mut app = test_app();
        app.page = Page::LogView;
        app.log.lines = vec!["a".to_string(), "b".to_string()];
        app.log.selected = 1;
        app.log.pinned = true;

        assert!(!handle_key_event(&mut app, key(KeyCode::Up)).unwrap());
        assert!(!app.log.pinned);
        // q in the viewer returns to the editor instead of quitting.
        assert!(!handle_key_event(&mut app, key(KeyCode::Char('q'))).unwrap());
        assert_eq!(app.page, Page::Editor);
    }

    #[test]
    fn test_help_popup_open_close() {
        let mut app = test_app();
        handle_key_event(&mut app, key(KeyCode::Char('?'))).unwrap();
        assert!(app.show_help_popup);
        handle_key_event(&mut app, key(KeyCode::Char('?'))).unwrap();
        assert!(!app.show_help_popup);
    }
}
