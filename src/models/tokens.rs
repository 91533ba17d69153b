// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! OAuth credentials for the Strava API.

use serde::{Deserialize, Serialize};

/// Current OAuth credentials, as persisted by the credential store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StravaTokens {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token expiry (unix seconds)
    pub expires_at: i64,
}

impl StravaTokens {
    /// True if the access token is missing or expires within `margin_secs` of `now`.
    pub fn expires_within(&self, now: i64, margin_secs: i64) -> bool {
        self.access_token.is_empty() || self.expires_at < now + margin_secs
    }
}
