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

mod app;
mod battery;
mod bounds;
mod config;
mod events;
mod handlers;
mod logger;
mod logwatch;
mod system;
#[cfg(test)]
mod test_utils;
mod ui;

use std::io::stdout;
use std::path::Path;
use std::time::Duration;

use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::Terminal;

use app::App;
use battery::SwitchTest;
use events::handle_key_event;
use ui::ui;

fn main() -> anyhow::Result<()> {
    // The daemon config and the charging control files are root-only
    if unsafe { libc::geteuid() } != 0 {
        eprintln!("Error: acctui requires root privileges to edit the daemon config and test charging switches.");
        eprintln!(
            "Please run with: sudo {}",
            std::env::args().next().unwrap_or_else(|| "acctui".to_string())
        );
        std::process::exit(1);
    }

    // Gather args once
    let args: Vec<String> = std::env::args().collect();

    // Optional logging to /etc/acctui/logs.json
    let logging_enabled = args.iter().any(|a| a == "--logging");
    if logging_enabled {
        logger::init_logging();
        logger::log_event("startup", serde_json::json!({
            "mode": "cli",
            "args": args,
        }));
    }

    // Simple CLI handling: `acctui save` promotes the user draft to
    // /etc/acctui/config.json and exits
    if args.get(1).map(|s| s.as_str()) == Some("save") {
        match config::load_saved_config() {
            Some(cfg) => {
                config::write_system_config(&cfg)?;
                println!("Wrote config to /etc/acctui/config.json");
                return Ok(());
            }
            None => {
                eprintln!(
                    "No user config found at {}. Edit and save in the TUI first, then run: sudo acctui save",
                    config::config_path().display()
                );
                std::process::exit(1);
            }
        }
    }

    // Headless probe: `acctui test-switch [switch spec]`
    if args.get(1).map(|s| s.as_str()) == Some("test-switch") {
        let spec = if args.len() > 2 { Some(args[2..].join(" ")) } else { None };
        let outcome = battery::test_charging_switch(
            Path::new(battery::POWER_SUPPLY_ROOT),
            spec.as_deref(),
            battery::SWITCH_SETTLE,
        );
        println!("{}", outcome.describe());
        if outcome == SwitchTest::Error {
            std::process::exit(1);
        }
        return Ok(());
    }

    // Terminal init
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    if logging_enabled {
        logger::log_event("tui_start", serde_json::json!({}));
    }
    let res = run_app(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
        if logging_enabled {
            logger::log_event("fatal_error", serde_json::json!({ "error": err.to_string() }));
        }
        std::process::exit(1);
    }

    Ok(())
}

fn run_app(terminal: &mut Terminal<ratatui::backend::CrosstermBackend<std::io::Stdout>>) -> anyhow::Result<()> {
    let mut app = App::new();
    app.refresh();

    loop {
        // draw
        terminal.draw(|f| ui(f, &app))?;

        // Surface finished switch probes and pending log snapshots. The
        // watcher reschedules itself only after its snapshot is applied here,
        // so reads never overlap the apply.
        handlers::pump_background(&mut app);

        // tick; the short cap keeps log updates flowing while idle
        let timeout = app
            .refresh_interval
            .saturating_sub(app.last_refresh.elapsed())
            .min(Duration::from_millis(100));
        if event::poll(timeout).unwrap_or(false) {
            if let Event::Key(key_event) = event::read()? {
                if handle_key_event(&mut app, key_event)? {
                    return Ok(());
                }
            }
        }

        if app.last_refresh.elapsed() >= app.refresh_interval {
            app.refresh();
        }
    }
}
