// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod activity;
pub mod athlete;
pub mod filter;
pub mod gear;
pub mod stats;
pub mod streams;
pub mod tokens;

pub use activity::{Activity, ActivityMap};
pub use athlete::Athlete;
pub use filter::ActivityFilter;
pub use gear::Gear;
pub use stats::ActivityStats;
pub use streams::StreamBundle;
pub use tokens::StravaTokens;
