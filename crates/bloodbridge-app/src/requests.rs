// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

use crate::model::RequestStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    Accept,
    Decline,
}

impl Decision {
    pub const fn outcome(self) -> RequestStatus {
        match self {
            Self::Accept => RequestStatus::Accepted,
            Self::Decline => RequestStatus::Declined,
        }
    }

    pub const fn verb(self) -> &'static str {
        match self {
            Self::Accept => "accept",
            Self::Decline => "decline",
        }
    }
}

impl RequestStatus {
    pub const fn is_pending(self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Only pending entries can be decided; decisions are final.
    pub fn apply(self, decision: Decision) -> Result<Self> {
        if !self.is_pending() {
            bail!(
                "cannot {} -- entry is already {}",
                decision.verb(),
                self.as_str().to_ascii_lowercase()
            );
        }
        Ok(decision.outcome())
    }
}
