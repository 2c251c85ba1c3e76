// Copyright (c) 2025 Mikko Tanner. All rights reserved.
// Licensed under the MIT License or the Apache License, Version 2.0.
// SPDX-License-Identifier: MIT OR Apache-2.0

//! RAII terminal setup/teardown shared by the render loop. Layout and
//! widget construction live in `layout.rs`/`render.rs`; this module only
//! owns the ratatui/crossterm handle and its panic-safe cleanup.

use crossterm::{
    cursor::{Hide, Show},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::{
    io::{Result, Stdout, stdout},
    panic,
};

/// RAII guard object for TUI console using [ratatui] and [crossterm].
/// - sets up a panic handler to restore normal terminal on panic
/// - initializes a full-screen TUI on creation (the RAII part)
/// - restores the normal terminal on drop (automatic cleanup)
pub struct TerminalGuard {
    pub term: Terminal<CrosstermBackend<Stdout>>,
    verbose: bool,
}

impl TerminalGuard {
    pub fn new(interval_ms: u128, verbose: bool) -> Result<Self> {
        if verbose {
            let hz: f64 = 1e3 / interval_ms as f64;
            eprintln!("Initializing terminal UI (display refresh rate: {hz:.1} Hz)...");
        }

        // set up the ratatui/crossterm environment (panic hook first!)
        panic::set_hook(Box::new(panic_handler));
        enable_raw_mode()?;
        let mut stdout: Stdout = stdout();
        execute!(stdout, EnterAlternateScreen, Hide)?;

        Ok(Self {
            term: Terminal::new(CrosstermBackend::new(stdout))?,
            verbose,
        })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        terminal_teardown(self.verbose);
    }
}

/// Tear down the terminal environment cleanly. Restores terminal to a sane state.
fn terminal_teardown(verbose: bool) {
    let _ = disable_raw_mode();
    let _ = execute!(stdout(), LeaveAlternateScreen, Show);

    if verbose {
        eprintln!("Terminal UI was terminated.");
    }
}

/// Panic handler to restore the console to a sane state if a panic occurs
pub(crate) fn panic_handler(info: &panic::PanicHookInfo) {
    terminal_teardown(true);
    eprintln!("Application panic: {}", info);
}
