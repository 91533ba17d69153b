// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Gear (shoes, bikes) model.

use serde::{Deserialize, Serialize};

/// Gear item from `GET /gear/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gear {
    /// Gear ID (`g…` for shoes, `b…` for bikes)
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub primary: bool,
    #[serde(default)]
    pub retired: Option<bool>,
    /// Cumulative distance in meters
    #[serde(default)]
    pub distance: Option<f64>,
    #[serde(default)]
    pub converted_distance: Option<f64>,
}
