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

//! Tail the daemon's log file.
//!
//! A `LogWatcher` owns one worker thread that re-reads the whole file, ships
//! the snapshot to the UI thread, and then waits for the UI to acknowledge
//! the apply before sleeping out the remainder of the tick. The next read can
//! therefore never start while the previous one is still being applied, and a
//! slow read stretches the tick instead of piling up. `stop()` is
//! cancel-on-teardown: it joins the worker, and no snapshot is delivered
//! afterwards.

use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use serde_json::json;

use crate::logger;

pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// How a fresh read of the file relates to what is displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogUpdate {
    /// File shrank: it was truncated or rotated, replace everything.
    Replace(Vec<String>),
    /// File grew: exactly the trailing new lines, in order.
    Append(Vec<String>),
    /// Same length; assumed content-identical. A same-length in-place
    /// rewrite is not detected (accepted gap, by contract).
    Unchanged,
}

/// Diff a fresh snapshot against the `displayed_len` lines already shown.
pub fn reconcile(displayed_len: usize, fresh: Vec<String>) -> LogUpdate {
    use std::cmp::Ordering as CmpOrdering;
    match fresh.len().cmp(&displayed_len) {
        CmpOrdering::Less => LogUpdate::Replace(fresh),
        CmpOrdering::Greater => LogUpdate::Append(fresh[displayed_len..].to_vec()),
        CmpOrdering::Equal => LogUpdate::Unchanged,
    }
}

pub fn split_lines(content: &str) -> Vec<String> {
    content.lines().map(|l| l.to_string()).collect()
}

enum WatcherState {
    Idle,
    Watching {
        handle: JoinHandle<()>,
        snapshots: Receiver<Vec<String>>,
        ack_tx: Sender<()>,
        stop: Arc<AtomicBool>,
    },
}

pub struct LogWatcher {
    path: PathBuf,
    state: WatcherState,
}

impl LogWatcher {
    pub fn new(path: PathBuf) -> Self {
        Self { path, state: WatcherState::Idle }
    }

    pub fn is_watching(&self) -> bool {
        matches!(self.state, WatcherState::Watching { .. })
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Idle -> Watching. A no-op when already watching.
    pub fn start(&mut self) {
        if self.is_watching() {
            return;
        }
        let (snapshot_tx, snapshots) = mpsc::channel::<Vec<String>>();
        let (ack_tx, ack_rx) = mpsc::channel::<()>();
        let stop = Arc::new(AtomicBool::new(false));
        let worker_stop = Arc::clone(&stop);
        let path = self.path.clone();

        let handle = thread::spawn(move || {
            while !worker_stop.load(Ordering::SeqCst) {
                // A mid-session read error (file momentarily gone during
                // rotation) skips the tick rather than tearing anything down.
                if let Ok(content) = fs::read_to_string(&path) {
                    if snapshot_tx.send(split_lines(&content)).is_err() {
                        break;
                    }
                    // Block until the UI applied this snapshot; a stalled UI
                    // stalls the watcher rather than letting reads overlap.
                    // The receiver hanging up means teardown.
                    loop {
                        if worker_stop.load(Ordering::SeqCst) {
                            return;
                        }
                        match ack_rx.recv_timeout(TICK_INTERVAL) {
                            Ok(()) => break,
                            Err(RecvTimeoutError::Timeout) => continue,
                            Err(RecvTimeoutError::Disconnected) => return,
                        }
                    }
                }
                // The tick is measured from apply-completion, not wall-clock.
                let mut slept = Duration::ZERO;
                let slice = Duration::from_millis(50);
                while slept < TICK_INTERVAL {
                    if worker_stop.load(Ordering::SeqCst) {
                        return;
                    }
                    thread::sleep(slice);
                    slept += slice;
                }
            }
        });

        logger::log_event("logwatch_start", json!({ "path": self.path.display().to_string() }));
        self.state = WatcherState::Watching { handle, snapshots, ack_tx, stop };
    }

    /// Non-blocking: the snapshot of the last completed read, if one is
    /// waiting to be applied. The caller must `ack()` after applying it.
    pub fn poll(&self) -> Option<Vec<String>> {
        match &self.state {
            WatcherState::Watching { snapshots, .. } => match snapshots.try_recv() {
                Ok(lines) => Some(lines),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
            },
            WatcherState::Idle => None,
        }
    }

    /// Tell the worker the last snapshot has been applied to the UI.
    pub fn ack(&self) {
        if let WatcherState::Watching { ack_tx, .. } = &self.state {
            let _ = ack_tx.send(());
        }
    }

    /// Watching -> Idle. Joins the worker: once this returns there are no
    /// further reads and no further snapshots.
    pub fn stop(&mut self) {
        let state = std::mem::replace(&mut self.state, WatcherState::Idle);
        if let WatcherState::Watching { handle, snapshots, ack_tx, stop } = state {
            stop.store(true, Ordering::SeqCst);
            // Unblock a worker waiting on the ack channel, then hang up.
            let _ = ack_tx.send(());
            drop(ack_tx);
            drop(snapshots);
            let _ = handle.join();
            logger::log_event(
                "logwatch_stop",
                json!({ "path": self.path.display().to_string() }),
            );
        }
    }
}

impl Drop for LogWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn lines(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_reconcile_growth_appends_tail_only() {
        let fresh = lines(&["a", "b", "c", "d", "e"]);
        match reconcile(3, fresh) {
            LogUpdate::Append(tail) => assert_eq!(tail, lines(&["d", "e"])),
            other => panic!("expected Append, got {:?}", other),
        }
    }

    #[test]
    fn test_reconcile_shrink_replaces() {
        let fresh = lines(&["x", "y"]);
        match reconcile(5, fresh.clone()) {
            LogUpdate::Replace(all) => assert_eq!(all, fresh),
            other => panic!("expected Replace, got {:?}", other),
        }
    }

    #[test]
    fn test_reconcile_equal_is_unchanged() {
        assert_eq!(reconcile(3, lines(&["a", "b", "c"])), LogUpdate::Unchanged);
        assert_eq!(reconcile(0, Vec::new()), LogUpdate::Unchanged);
    }

    #[test]
    fn test_reconcile_from_empty_appends_everything() {
        let fresh = lines(&["first", "second"]);
        match reconcile(0, fresh.clone()) {
            LogUpdate::Append(tail) => assert_eq!(tail, fresh),
            other => panic!("expected Append, got {:?}", other),
        }
    }

    #[test]
    fn test_split_lines_drops_trailing_newline() {
        assert_eq!(split_lines("a\nb\n"), lines(&["a", "b"]));
        assert_eq!(split_lines(""), Vec::<String>::new());
    }

    #[test]
    fn test_watcher_delivers_snapshot() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("acc-daemon-test.log");
        fs::write(&path, "one\ntwo\n").unwrap();

        let mut watcher = LogWatcher::new(path);
        watcher.start();
        let snapshot = wait_for_snapshot(&watcher);
        assert_eq!(snapshot, lines(&["one", "two"]));
        watcher.ack();
        watcher.stop();
    }

    #[test]
    fn test_watcher_no_second_read_before_ack() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("acc-daemon-test.log");
        fs::write(&path, "one\n").unwrap();

        let mut watcher = LogWatcher::new(path.clone());
        watcher.start();
        let first = wait_for_snapshot(&watcher);
        assert_eq!(first, lines(&["one"]));

        // Grow the file but do NOT ack: the worker must stay blocked.
        let mut f = fs::OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(f, "two").unwrap();
        drop(f);
        thread::sleep(Duration::from_millis(1500));
        assert_eq!(watcher.poll(), None);

        // After the ack the next tick picks the growth up.
        watcher.ack();
        let second = wait_for_snapshot(&watcher);
        assert_eq!(second, lines(&["one", "two"]));
        watcher.stop();
    }

    #[test]
    fn test_watcher_stop_delivers_nothing_after_join() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("acc-daemon-test.log");
        fs::write(&path, "one\n").unwrap();

        let mut watcher = LogWatcher::new(path);
        watcher.start();
        let _ = wait_for_snapshot(&watcher);
        watcher.stop();
        assert!(!watcher.is_watching());
        assert_eq!(watcher.poll(), None);
    }

    #[test]
    fn test_watcher_stop_without_start_is_noop() {
        let dir = TempDir::new().unwrap();
        let mut watcher = LogWatcher::new(dir.path().join("missing.log"));
        watcher.stop();
        assert!(!watcher.is_watching());
    }

    #[test]
    fn test_watcher_restart_after_stop() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("acc-daemon-test.log");
        fs::write(&path, "one\n").unwrap();

        let mut watcher = LogWatcher::new(path);
        watcher.start();
        let _ = wait_for_snapshot(&watcher);
        watcher.stop();

        watcher.start();
        assert!(watcher.is_watching());
        let again = wait_for_snapshot(&watcher);
        assert_eq!(again, lines(&["one"]));
        watcher.stop();
    }

    #[test]
    fn test_watcher_missing_file_delivers_nothing() {
        let dir = TempDir::new().unwrap();
        let mut watcher = LogWatcher::new(dir.path().join("missing.log"));
        watcher.start();
        thread::sleep(Duration::from_millis(300));
        assert_eq!(watcher.poll(), None);
        watcher.stop();
    }

    fn wait_for_snapshot(watcher: &LogWatcher) -> Vec<String> {
        for _ in 0..100 {
            if let Some(snapshot) = watcher.poll() {
                return snapshot;
            }
            thread::sleep(Duration::from_millis(20));
        }
        panic!("no snapshot within timeout");
    }
}
