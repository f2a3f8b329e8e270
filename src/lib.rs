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

//! Acctui - terminal front-end for the acc battery charging daemon
//!
//! This library provides the config model with its cross-field bounds
//! engine, the sysfs battery boundary (charging switches, voltage control
//! files, switch probing), and the log tail synchronizer behind the TUI.

pub mod app;
pub mod battery;
pub mod bounds;
pub mod config;
pub mod events;
pub mod handlers;
pub mod logger;
pub mod logwatch;
pub mod system;
pub mod ui;

#[cfg(test)]
pub mod test_utils;
