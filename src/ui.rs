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

mod ui_components;
mod ui_log_view;
mod ui_main;

use ratatui::prelude::*;

use crate::app::{App, Page};

pub fn ui(f: &mut Frame, app: &App) {
    let size = f.area();

    match app.page {
        Page::Editor => ui_main::render_editor(f, app, size),
        Page::LogView => ui_log_view::render_log_view(f, app, size),
    }

    // Popup overlays, mirroring the event dispatch priority
    if app.show_on_boot_popup {
        ui_components::render_input_popup(
            f,
            size,
            " Edit On Boot ",
            "Command the daemon runs once on boot (empty clears it)",
            &app.hook_input,
        );
    }
    if app.show_on_plug_popup {
        ui_components::render_input_popup(
            f,
            size,
            " Edit On Plugged ",
            "Command the daemon runs when a charger is connected (empty clears it)",
            &app.hook_input,
        );
    }
    if app.show_switch_popup {
        ui_components::render_switch_popup(f, app, size);
    }
    if app.show_voltage_popup {
        ui_components::render_voltage_popup(f, app, size);
    }
    if app.show_confirm_save_popup {
        ui_components::render_confirm_save_popup(f, size);
    }
    if app.show_unsaved_popup {
        ui_components::render_unsaved_popup(f, size);
    }
    if app.show_switch_test_popup {
        ui_components::render_switch_test_popup(f, app, size);
    }
    if app.show_help_popup {
        ui_components::render_help_popup(f, app, size);
    }
    if app.show_notice_popup {
        ui_components::render_notice_popup(f, app, size);
    }
}
