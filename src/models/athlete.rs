// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Authenticated athlete profile.

use serde::{Deserialize, Serialize};

/// Athlete profile from `GET /athlete`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Athlete {
    pub id: u64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub firstname: Option<String>,
    #[serde(default)]
    pub lastname: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub sex: Option<String>,
    #[serde(default)]
    pub premium: Option<bool>,
    #[serde(default)]
    pub weight: Option<f64>,
    /// Profile picture URLs
    #[serde(default)]
    pub profile_medium: Option<String>,
    #[serde(default)]
    pub profile: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}
