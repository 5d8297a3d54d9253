// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use chrono::{DateTime, Utc};

/// Supplies the moment used to stamp every audit in one logical operation.
pub trait Clock: Send + Sync {
	fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
	fn now(&self) -> DateTime<Utc> {
		Utc::now()
	}
}

/// Always returns the same moment.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(DateTime<Utc>);

impl FixedClock {
	pub fn new(moment: DateTime<Utc>) -> Self {
		Self(moment)
	}
}

impl Clock for FixedClock {
	fn now(&self) -> DateTime<Utc> {
		self.0
	}
}
