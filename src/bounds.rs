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

//! Per-field update functions for the config editor.
//!
//! Every edit goes through one of these setters. A setter clamps the incoming
//! value into the range that is valid given the rest of the config, writes the
//! field, re-establishes the capacity chain `shutdown <= resume < pause`, and
//! returns which dependent ranges changed so the editor can re-clamp its
//! pickers. Out-of-range input never errors; it lands on the nearest valid
//! value.

use crate::config::AccConfig;

pub const SHUTDOWN_MIN: u8 = 0;
pub const SHUTDOWN_MAX: u8 = 20;
pub const CAPACITY_MAX: u8 = 100;

pub const TEMP_MIN: u8 = 20;
pub const COOL_DOWN_TEMP_MAX: u8 = 90;
pub const PAUSE_TEMP_MAX: u8 = 95;
// Writing (90, 95) tells the daemon to ignore temperature entirely.
pub const TEMP_DISABLE_COOL_DOWN: u8 = 90;
pub const TEMP_DISABLE_PAUSE: u8 = 95;
pub const TEMP_ENABLE_COOL_DOWN: u8 = 40;
pub const TEMP_ENABLE_PAUSE: u8 = 45;

// 101 keeps the percent picker one notch above "always on" as the off state.
pub const COOLDOWN_DISABLED: u8 = 101;
pub const COOLDOWN_DEFAULT_PERCENT: u8 = 60;
pub const RATIO_MIN: u8 = 1;
pub const RATIO_MAX: u8 = 120;
pub const CHARGE_RATIO_DEFAULT: u8 = 50;
pub const PAUSE_RATIO_DEFAULT: u8 = 10;

pub const VOLTAGE_MIN_MV: u32 = 3920;
pub const VOLTAGE_MAX_MV: u32 = 4200; // exclusive

/// Inclusive allowed range for a numeric picker.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Range {
    pub min: u8,
    pub max: u8,
}

impl Range {
    pub fn clamp(&self, v: u8) -> u8 {
        v.clamp(self.min, self.max)
    }
}

/// Change-set returned by a setter: the dependent ranges the editor must
/// refresh after this single-field update. Absent entries are unaffected.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct RangeUpdate {
    pub resume: Option<Range>,
    pub pause: Option<Range>,
    pub cooldown_percent: Option<Range>,
}

pub fn shutdown_range(_cfg: &AccConfig) -> Range {
    Range { min: SHUTDOWN_MIN, max: SHUTDOWN_MAX }
}

pub fn resume_range(cfg: &AccConfig) -> Range {
    Range { min: cfg.capacity.shutdown, max: cfg.capacity.pause - 1 }
}

pub fn pause_range(cfg: &AccConfig) -> Range {
    Range { min: cfg.capacity.shutdown + 1, max: CAPACITY_MAX }
}

pub fn cool_down_temp_range(_cfg: &AccConfig) -> Range {
    Range { min: TEMP_MIN, max: COOL_DOWN_TEMP_MAX }
}

pub fn pause_temp_range(_cfg: &AccConfig) -> Range {
    Range { min: TEMP_MIN, max: PAUSE_TEMP_MAX }
}

pub fn cooldown_percent_range(cfg: &AccConfig) -> Range {
    Range { min: cfg.capacity.shutdown, max: COOLDOWN_DISABLED }
}

pub fn ratio_range(_cfg: &AccConfig) -> Range {
    Range { min: RATIO_MIN, max: RATIO_MAX }
}

/// Lowering the shutdown threshold widens the resume and cooldown ranges;
/// raising it can push the whole chain up.
pub fn set_shutdown_capacity(cfg: &mut AccConfig, v: u8) -> RangeUpdate {
    cfg.capacity.shutdown = shutdown_range(cfg).clamp(v);
    // Re-establish the chain from the left: resume first, then pause.
    if cfg.capacity.resume < cfg.capacity.shutdown {
        cfg.capacity.resume = cfg.capacity.shutdown;
    }
    if cfg.capacity.pause <= cfg.capacity.resume {
        cfg.capacity.pause = cfg.capacity.resume + 1;
    }
    // The cooldown threshold may not sit below shutdown; the disabled
    // sentinel (101) is above any shutdown value and is never touched.
    if cfg.cooldown.at_percent < cfg.capacity.shutdown {
        cfg.cooldown.at_percent = cfg.capacity.shutdown;
    }
    RangeUpdate {
        resume: Some(resume_range(cfg)),
        pause: Some(pause_range(cfg)),
        cooldown_percent: Some(cooldown_percent_range(cfg)),
    }
}

/// Resume moves strictly inside the other two thresholds.
pub fn set_resume_capacity(cfg: &mut AccConfig, v: u8) -> RangeUpdate {
    cfg.capacity.resume = resume_range(cfg).clamp(v);
    RangeUpdate {
        pause: Some(pause_range(cfg)),
        ..RangeUpdate::default()
    }
}

/// Pause accepts anything above shutdown; a pause below the current resume
/// drags resume down with it so the chain holds after the single write.
pub fn set_pause_capacity(cfg: &mut AccConfig, v: u8) -> RangeUpdate {
    cfg.capacity.pause = pause_range(cfg).clamp(v);
    if cfg.capacity.resume >= cfg.capacity.pause {
        cfg.capacity.resume = cfg.capacity.pause - 1;
    }
    RangeUpdate {
        resume: Some(resume_range(cfg)),
        ..RangeUpdate::default()
    }
}

pub fn set_cool_down_temp(cfg: &mut AccConfig, v: u8) -> RangeUpdate {
    cfg.temperature.cool_down_c = cool_down_temp_range(cfg).clamp(v);
    RangeUpdate::default()
}

pub fn set_pause_temp(cfg: &mut AccConfig, v: u8) -> RangeUpdate {
    cfg.temperature.pause_c = pause_temp_range(cfg).clamp(v);
    RangeUpdate::default()
}

/// Toggling temperature control always lands on the fixed pairs: (40, 45)
/// when enabled, the (90, 95) sentinel when disabled, whatever was set before.
pub fn set_temp_control(cfg: &mut AccConfig, enabled: bool) -> RangeUpdate {
    if enabled {
        cfg.temperature.cool_down_c = TEMP_ENABLE_COOL_DOWN;
        cfg.temperature.pause_c = TEMP_ENABLE_PAUSE;
    } else {
        cfg.temperature.cool_down_c = TEMP_DISABLE_COOL_DOWN;
        cfg.temperature.pause_c = TEMP_DISABLE_PAUSE;
    }
    RangeUpdate::default()
}

pub fn set_cooldown_percent(cfg: &mut AccConfig, v: u8) -> RangeUpdate {
    cfg.cooldown.at_percent = cooldown_percent_range(cfg).clamp(v);
    RangeUpdate::default()
}

pub fn set_cooldown(cfg: &mut AccConfig, enabled: bool) -> RangeUpdate {
    cfg.cooldown.at_percent = if enabled { COOLDOWN_DEFAULT_PERCENT } else { COOLDOWN_DISABLED };
    RangeUpdate::default()
}

/// Ratio setters check the cooldown state as it is at call time: editing a
/// ratio while cooldown is disabled resets the opposite ratio to its default
/// before the new value lands. Carried over from the daemon's editor as a
/// deliberate, tested rule.
pub fn set_charge_ratio(cfg: &mut AccConfig, v: u8) -> RangeUpdate {
    if !cfg.cooldown_enabled() {
        cfg.cooldown.pause_seconds = PAUSE_RATIO_DEFAULT;
    }
    cfg.cooldown.charge_seconds = ratio_range(cfg).clamp(v);
    RangeUpdate::default()
}

pub fn set_pause_ratio(cfg: &mut AccConfig, v: u8) -> RangeUpdate {
    if !cfg.cooldown_enabled() {
        cfg.cooldown.charge_seconds = CHARGE_RATIO_DEFAULT;
    }
    cfg.cooldown.pause_seconds = ratio_range(cfg).clamp(v);
    RangeUpdate::default()
}

/// The voltage dialog's OK gate: a millivolt limit needs a parseable value in
/// [3920, 4200) and a selected control file. With the limit disabled there is
/// nothing to validate.
pub fn voltage_entry_valid(enabled: bool, input: &str, file_selected: bool) -> bool {
    if !enabled {
        return true;
    }
    match input.trim().parse::<u32>() {
        Ok(mv) => (VOLTAGE_MIN_MV..VOLTAGE_MAX_MV).contains(&mv) && file_selected,
        Err(_) => false,
    }
}

pub fn capacity_chain_holds(cfg: &AccConfig) -> bool {
    let c = &cfg.capacity;
    c.shutdown <= c.resume && c.resume < c.pause && c.pause <= CAPACITY_MAX
}
