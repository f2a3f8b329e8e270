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

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::widgets::{Block, BorderType, Borders, List, ListItem, ListState, Paragraph};

use crate::app::{App, Field, FIELDS};
use crate::bounds;

/// Render the config editor (default page).
pub fn render_editor(f: &mut Frame, app: &App, size: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(size);

    render_header(f, app, chunks[0]);
    render_settings_list(f, app, chunks[1]);
    render_status_bar(f, app, chunks[2]);
}

fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let header_cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(80), Constraint::Percentage(20)])
        .split(area);

    let battery_text = match &app.battery {
        Some(b) => {
            let capacity = b
                .capacity
                .map(|c| format!("{}%", c))
                .unwrap_or_else(|| "?".to_string());
            let current = b
                .current_ma
                .map(|ma| format!(" {:+} mA", ma))
                .unwrap_or_default();
            format!("{} {}{}", capacity, b.status, current)
        }
        None => "no battery found".to_string(),
    };
    let header_text = format!(
        " Device: {}    |    Battery: {} ",
        if app.device_name.is_empty() { "?" } else { &app.device_name },
        battery_text
    );
    let header = Paragraph::new(header_text).style(Style::default().fg(Color::Yellow));
    f.render_widget(header, header_cols[0]);

    let daemon_label = match &app.daemon_version {
        Some(v) => format!("acc {}", v),
        None => "acc daemon".to_string(),
    };
    let daemon_widget = Paragraph::new(daemon_label)
        .alignment(Alignment::Right)
        .style(Style::default().fg(Color::Gray));
    f.render_widget(daemon_widget, header_cols[1]);
}

fn field_value(app: &App, field: Field) -> String {
    let cfg = &app.config;
    match field {
        Field::ShutdownCapacity => {
            let r = bounds::shutdown_range(cfg);
            format!("{:>3} %   [{}..{}]", cfg.capacity.shutdown, r.min, r.max)
        }
        Field::ResumeCapacity => {
            let r = bounds::resume_range(cfg);
            format!("{:>3} %   [{}..{}]", cfg.capacity.resume, r.min, r.max)
        }
        Field::PauseCapacity => {
            let r = bounds::pause_range(cfg);
            format!("{:>3} %   [{}..{}]", cfg.capacity.pause, r.min, r.max)
        }
        Field::TempControl => {
            if cfg.temp_control_enabled() { "enabled".to_string() } else { "disabled".to_string() }
        }
        Field::CoolDownTemp => {
            let r = bounds::cool_down_temp_range(cfg);
            format!("{:>3} °C  [{}..{}]", cfg.temperature.cool_down_c, r.min, r.max)
        }
        Field::PauseTemp => {
            let r = bounds::pause_temp_range(cfg);
            format!("{:>3} °C  [{}..{}]", cfg.temperature.pause_c, r.min, r.max)
        }
        Field::Cooldown => {
            if cfg.cooldown_enabled() { "enabled".to_string() } else { "disabled".to_string() }
        }
        Field::CooldownPercent => {
            let r = bounds::cooldown_percent_range(cfg);
            if cfg.cooldown_enabled() {
                format!("{:>3} %   [{}..{}]", cfg.cooldown.at_percent, r.min, r.max)
            } else {
                "off".to_string()
            }
        }
        Field::ChargeRatio => format!("{:>3} s   [1..120]", cfg.cooldown.charge_seconds),
        Field::PauseRatio => format!("{:>3} s   [1..120]", cfg.cooldown.pause_seconds),
        Field::OnBoot => cfg.on_boot.clone().unwrap_or_else(|| "Not set".to_string()),
        Field::OnBootExit => {
            if cfg.on_boot_exit { "yes".to_string() } else { "no".to_string() }
        }
        Field::OnPlug => cfg.on_plug.clone().unwrap_or_else(|| "Not set".to_string()),
        Field::ChargeSwitch => cfg
            .charge_switch
            .clone()
            .unwrap_or_else(|| "Automatic".to_string()),
        Field::VoltageLimit => match (&cfg.voltage.control_file, cfg.voltage.max_mv) {
            (Some(file), Some(mv)) => format!("{} mV via {}", mv, file),
            _ => "Disabled".to_string(),
        },
    }
}

fn render_settings_list(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(" acc daemon config ")
        .border_style(Style::default().fg(Color::Cyan));

    let highlight = Style::default().bg(Color::Blue).fg(Color::White);
    let dim = Style::default().fg(Color::DarkGray);

    let items: Vec<ListItem> = FIELDS
        .iter()
        .map(|field| {
            let marker = if app.current_field() == *field { "> " } else { "  " };
            let line = format!("{}{:<24} {}", marker, field.label(), field_value(app, *field));
            let item = ListItem::new(line);
            if app.field_enabled(*field) { item } else { item.style(dim) }
        })
        .collect();

    let mut state = ListState::default();
    state.select(Some(app.field_idx.min(FIELDS.len() - 1)));

    let list = List::new(items).block(block).highlight_style(highlight);
    f.render_stateful_widget(list, area, &mut state);
}

fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let text = if app.unsaved_changes {
        format!(" * {}", app.status)
    } else {
        format!("   {}", app.status)
    };
    let style = if app.unsaved_changes {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::Gray)
    };
    f.render_widget(Paragraph::new(text).style(style), area);
}
