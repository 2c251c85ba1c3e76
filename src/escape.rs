// Copyright (c) 2025 Mikko Tanner. All rights reserved.
// Licensed under the MIT License or the Apache License, Version 2.0.
// SPDX-License-Identifier: MIT OR Apache-2.0

//! ESC-aware key resolution. crossterm already decodes CSI/SS3 byte
//! sequences into discrete `KeyCode` events before we ever see them, so
//! there is no raw byte stream here to apply the original's inter-byte-gap
//! buffering to; what's left of that heuristic at this layer is the total
//! cap on how long an arrow key may lag behind the Esc that could precede
//! it before the Esc is treated as bare.

use std::time::Duration;

pub const TOTAL_CAP: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedKey {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Bare,
}
