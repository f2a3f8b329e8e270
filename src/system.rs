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

use std::fs;

/// Human-readable device name for the header line.
pub fn read_device_name() -> String {
    let read_trim = |p: &str| -> Option<String> {
        fs::read_to_string(p)
            .ok()
            .map(|s| s.trim().trim_matches('\u{0}').to_string())
            .filter(|s| !s.is_empty())
    };

    // Phones and SBCs expose the device tree model; desktops expose DMI.
    if let Some(model) = read_trim("/proc/device-tree/model") {
        return model;
    }
    let vendor = read_trim("/sys/devices/virtual/dmi/id/sys_vendor");
    let product = read_trim("/sys/devices/virtual/dmi/id/product_name");
    match (vendor, product) {
        (Some(v), Some(p)) => format!("{} {}", v, p),
        (Some(v), None) => v,
        (None, Some(p)) => p,
        (None, None) => String::new(),
    }
}

/// Version string the daemon writes next to its config, when present.
pub fn read_daemon_version() -> Option<String> {
    fs::read_to_string("/etc/acc/version")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
