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

use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::widgets::{Block, BorderType, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};

use crate::app::App;
use crate::handlers::voltage_popup_valid;

/// Helper function to create a centered rectangle for popups
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

fn popup_frame(f: &mut Frame, area: Rect, title: &str) -> Rect {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(title.to_string());
    let inner = block.inner(area);
    f.render_widget(Clear, area);
    f.render_widget(block, area);
    inner
}

fn help_footer(f: &mut Frame, area: Rect, text: &str) {
    let help = Paragraph::new(text.to_string())
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Gray));
    f.render_widget(help, area);
}

/// Free-text entry popup used by the on-boot / on-plugged hook editors.
pub fn render_input_popup(f: &mut Frame, size: Rect, title: &str, message: &str, input: &str) {
    let area = centered_rect(70, 30, size);
    let inner = popup_frame(f, area, title);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(inner);

    let msg = Paragraph::new(message.to_string())
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(msg, chunks[0]);

    let entry = Paragraph::new(format!("{}_", input))
        .block(Block::default().borders(Borders::ALL))
        .style(Style::default().fg(Color::White));
    f.render_widget(entry, chunks[1]);

    help_footer(f, chunks[2], "Enter save  |  Esc cancel");
}

pub fn render_switch_popup(f: &mut Frame, app: &App, size: Rect) {
    let area = centered_rect(70, 60, size);
    let inner = popup_frame(f, area, " Charging Switch ");

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(1), Constraint::Length(1)])
        .split(inner);

    let items: Vec<ListItem> = app
        .switch_items
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let sel = if i == app.switch_idx { "> " } else { "  " };
            ListItem::new(format!("{}{}", sel, s))
        })
        .collect();

    let mut state = ListState::default();
    if !app.switch_items.is_empty() {
        state.select(Some(app.switch_idx.min(app.switch_items.len() - 1)));
    }
    let list = List::new(items).highlight_style(Style::default().bg(Color::Blue).fg(Color::White));
    f.render_stateful_widget(list, chunks[0], &mut state);

    if app.switch_test_running() {
        let testing = Paragraph::new("Testing switch, please wait...")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Yellow));
        f.render_widget(testing, chunks[1]);
    }
    help_footer(f, chunks[2], "↑/↓ select  |  t test  |  Enter save  |  Esc cancel");
}

pub fn render_voltage_popup(f: &mut Frame, app: &App, size: Rect) {
    let area = centered_rect(70, 60, size);
    let inner = popup_frame(f, area, " Voltage Limit ");

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(4),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);

    let checkbox = if app.voltage_enabled { "[x]" } else { "[ ]" };
    let enable_line = Paragraph::new(format!("{} Limit charging voltage (Space toggles)", checkbox));
    f.render_widget(enable_line, chunks[0]);

    let items: Vec<ListItem> = if app.voltage_files.is_empty() {
        vec![ListItem::new("(no voltage control files detected)")
            .style(Style::default().fg(Color::DarkGray))]
    } else {
        app.voltage_files
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let sel = if app.voltage_file_idx == Some(i) { "> " } else { "  " };
                ListItem::new(format!("{}{}", sel, name))
            })
            .collect()
    };
    let mut state = ListState::default();
    if let Some(idx) = app.voltage_file_idx {
        state.select(Some(idx.min(app.voltage_files.len().saturating_sub(1))));
    }
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(" Control file "))
        .highlight_style(Style::default().bg(Color::Blue).fg(Color::White));
    f.render_stateful_widget(list, chunks[1], &mut state);

    let entry_style = if app.voltage_enabled {
        Style::default().fg(Color::White)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let entry = Paragraph::new(format!("{}_", app.voltage_input))
        .block(Block::default().borders(Borders::ALL).title(" Max voltage (mV) "))
        .style(entry_style);
    f.render_widget(entry, chunks[2]);

    if app.voltage_enabled && !voltage_popup_valid(app) {
        let warn = Paragraph::new("Voltage must be 3920..4199 mV and a control file selected")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Red));
        f.render_widget(warn, chunks[3]);
    }
    // OK is a no-op while the entry is invalid; the hint reflects that.
    let ok_hint = if voltage_popup_valid(app) { "Enter save" } else { "Enter (disabled)" };
    help_footer(
        f,
        chunks[4],
        &format!("↑/↓ file  |  digits edit  |  Space toggle  |  {}  |  Esc cancel", ok_hint),
    );
}

pub fn render_confirm_save_popup(f: &mut Frame, size: Rect) {
    let area = centered_rect(60, 25, size);
    let inner = popup_frame(f, area, " Save config ");

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(2), Constraint::Length(1)])
        .split(inner);

    let msg = Paragraph::new("Write the current settings to /etc/acctui/config.json?\nThe daemon picks the change up on its next cycle.")
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(msg, chunks[0]);
    help_footer(f, chunks[1], "Enter save  |  Esc cancel");
}

pub fn render_unsaved_popup(f: &mut Frame, size: Rect) {
    let area = centered_rect(60, 25, size);
    let inner = popup_frame(f, area, " Unsaved changes ");

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(2), Constraint::Length(1)])
        .split(inner);

    let msg = Paragraph::new("The config has unsaved changes.")
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(msg, chunks[0]);
    help_footer(f, chunks[1], "s save & exit  |  d discard & exit  |  Esc stay");
}

pub fn render_switch_test_popup(f: &mut Frame, app: &App, size: Rect) {
    let area = centered_rect(60, 25, size);
    let inner = popup_frame(f, area, " Test Charging Switch ");

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(2), Constraint::Length(1)])
        .split(inner);

    let text = app
        .switch_test_outcome
        .map(|o| o.describe())
        .unwrap_or("No result");
    let msg = Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(msg, chunks[0]);
    help_footer(f, chunks[1], "Enter / Esc close");
}

pub fn render_help_popup(f: &mut Frame, app: &App, size: Rect) {
    let area = centered_rect(70, 40, size);
    let inner = popup_frame(f, area, &format!(" {} ", app.current_field().label()));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(2), Constraint::Length(1)])
        .split(inner);

    let msg = Paragraph::new(app.current_field().info())
        .wrap(Wrap { trim: true });
    f.render_widget(msg, chunks[0]);
    help_footer(f, chunks[1], "Enter / Esc close");
}

pub fn render_notice_popup(f: &mut Frame, app: &App, size: Rect) {
    let area = centered_rect(60, 30, size);
    let inner = popup_frame(f, area, &format!(" {} ", app.notice_title));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(2), Constraint::Length(1)])
        .split(inner);

    let msg = Paragraph::new(app.notice_message.clone())
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(msg, chunks[0]);
    help_footer(f, chunks[1], "Enter / Esc close");
}
