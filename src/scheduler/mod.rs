// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Cooperative scheduling for XHR-style completions

mod event_loop;

pub use event_loop::{EventLoop, IdleConfig, IdleResult, IoGuard, Task, TaskId};
