// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod activities;
pub mod credentials;
pub mod gear;
pub mod gpx;
pub mod notify;
pub mod storage;
pub mod strava;
pub mod tracks;

pub use activities::ActivityAggregator;
pub use credentials::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
pub use gear::GearResolver;
pub use gpx::TrackDocument;
pub use strava::{AuthRetryPolicy, StravaClient, StravaService};
pub use tracks::TrackSynthesizer;
