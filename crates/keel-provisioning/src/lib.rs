// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Transactional provisioning for Keel.
//!
//! Every operation runs inside one transaction opened through the
//! [`TransactionCoordinator`] and either commits in full or leaves nothing
//! behind. Each mutation is stamped with the caller's [`keel_core::Audit`].
//!
//! - [`OrgService`]: orgs, optionally created with an app and a user
//! - [`AppService`]: apps under existing orgs, API key rotation
//! - [`UserService`]: users in existing orgs
//! - [`OrgKindService`]: administrative org kinds
//! - [`GenesisService`]: the one-time bootstrap
//! - [`AuditService`]: resolves an acting app and user into an audit
//! - [`PingService`]: database liveness

mod app;
mod audit;
mod error;
mod genesis;
mod org;
mod org_kind;
mod ping;
mod request;
mod response;
mod transaction;
mod user;

pub use app::AppService;
pub use audit::AuditService;
pub use error::{ErrorKind, ProvisioningError, Result};
pub use genesis::{GenesisService, GenesisState};
pub use org::OrgService;
pub use org_kind::OrgKindService;
pub use ping::PingService;
pub use request::{
	default_key_deactivation, CreateAppRequest, CreateOrgAppRequest, CreateOrgKindRequest,
	CreateOrgRequest, CreateOrgUserRequest, CreateUserRequest, GenesisRequest, UpdateAppRequest,
	UpdateOrgRequest,
};
pub use response::{
	ApiKeyResponse, AppResponse, AuditResponse, DeleteResponse, FullGenesisResponse, GenesisBundle,
	OrgKindResponse, OrgResponse, PingResponse, UserResponse,
};
pub use transaction::TransactionCoordinator;
pub use user::UserService;
