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

use crate::app::App;

/// Render the log tail page.
pub fn render_log_view(f: &mut Frame, app: &App, size: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(size);

    let file_name = app
        .log_watcher
        .as_ref()
        .and_then(|w| w.path().file_name())
        .and_then(|s| s.to_str())
        .unwrap_or("acc daemon log");
    let follow = if app.log.pinned { "following" } else { "paused" };
    let title = format!(" {} ({} lines, {}) ", file_name, app.log.lines.len(), follow);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(title)
        .border_style(if app.log.pinned {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        });

    let highlight = Style::default().bg(Color::Blue).fg(Color::White);
    let items: Vec<ListItem> = if app.log.lines.is_empty() {
        vec![ListItem::new("(log is empty)").style(Style::default().fg(Color::DarkGray))]
    } else {
        app.log.lines.iter().map(|l| ListItem::new(l.clone())).collect()
    };

    let mut state = ListState::default();
    if !app.log.lines.is_empty() {
        state.select(Some(app.log.selected.min(app.log.lines.len() - 1)));
    }

    let list = List::new(items).block(block).highlight_style(highlight);
    f.render_stateful_widget(list, chunks[0], &mut state);

    let status = Paragraph::new(format!("   {}", app.status)).style(Style::default().fg(Color::Gray));
    f.render_widget(status, chunks[1]);
}
