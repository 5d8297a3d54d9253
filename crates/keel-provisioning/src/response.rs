// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Hydrated results returned to callers.
//!
//! Responses carry external identifiers only. Timestamps are RFC 3339 with
//! second precision.

use chrono::{DateTime, SecondsFormat, Utc};
use keel_core::{App, ExternalId, Org, OrgKind, SimpleAudit, User};
use serde::{Deserialize, Serialize};

fn format_moment(moment: DateTime<Utc>) -> String {
	moment.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Create and update provenance, flattened into each response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditResponse {
	pub create_app_external_id: String,
	pub create_username: String,
	pub create_user_first_name: String,
	pub create_user_last_name: String,
	pub create_date_time: String,
	pub update_app_external_id: String,
	pub update_username: String,
	pub update_user_first_name: String,
	pub update_user_last_name: String,
	pub update_date_time: String,
}

impl From<&SimpleAudit> for AuditResponse {
	fn from(audit: &SimpleAudit) -> Self {
		let create = audit.create();
		let update = audit.update();
		Self {
			create_app_external_id: create.app().external_id.to_string(),
			create_username: create.user().username.clone(),
			create_user_first_name: create.user().first_name.clone(),
			create_user_last_name: create.user().last_name.clone(),
			create_date_time: format_moment(create.moment()),
			update_app_external_id: update.app().external_id.to_string(),
			update_username: update.user().username.clone(),
			update_user_first_name: update.user().first_name.clone(),
			update_user_last_name: update.user().last_name.clone(),
			update_date_time: format_moment(update.moment()),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgResponse {
	pub external_id: String,
	pub name: String,
	pub description: String,
	pub kind_external_id: String,
	#[serde(flatten)]
	pub audit: AuditResponse,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub app: Option<AppResponse>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub user: Option<UserResponse>,
}

impl OrgResponse {
	pub(crate) fn new(org: &Org, audit: &SimpleAudit) -> Self {
		Self {
			external_id: org.external_id.to_string(),
			name: org.name.clone(),
			description: org.description.clone(),
			kind_external_id: org.kind.external_id.clone(),
			audit: audit.into(),
			app: None,
			user: None,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKeyResponse {
	pub key: String,
	pub deactivation_date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppResponse {
	pub external_id: String,
	pub org_external_id: String,
	pub name: String,
	pub description: String,
	#[serde(flatten)]
	pub audit: AuditResponse,
	pub api_keys: Vec<ApiKeyResponse>,
}

impl AppResponse {
	pub(crate) fn new(app: &App, org_external_id: &ExternalId, audit: &SimpleAudit) -> Self {
		Self {
			external_id: app.external_id.to_string(),
			org_external_id: org_external_id.to_string(),
			name: app.name.clone(),
			description: app.description.clone(),
			audit: audit.into(),
			api_keys: app
				.api_keys
				.iter()
				.map(|k| ApiKeyResponse {
					key: k.key().expose().to_string(),
					deactivation_date: format_moment(k.deactivation()),
				})
				.collect(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserResponse {
	pub username: String,
	pub org_external_id: String,
	pub first_name: String,
	pub last_name: String,
	#[serde(flatten)]
	pub audit: AuditResponse,
}

impl UserResponse {
	pub(crate) fn new(user: &User, org_external_id: &ExternalId, audit: &SimpleAudit) -> Self {
		Self {
			username: user.username.clone(),
			org_external_id: org_external_id.to_string(),
			first_name: user.profile.first_name.clone(),
			last_name: user.profile.last_name.clone(),
			audit: audit.into(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgKindResponse {
	pub external_id: String,
	pub description: String,
	#[serde(flatten)]
	pub audit: AuditResponse,
}

impl OrgKindResponse {
	pub(crate) fn new(kind: &OrgKind, audit: &SimpleAudit) -> Self {
		Self {
			external_id: kind.external_id.clone(),
			description: kind.description.clone(),
			audit: audit.into(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResponse {
	pub external_id: String,
	pub deleted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PingResponse {
	pub db_up: bool,
}

/// One org, its app and its user, as written by the genesis bootstrap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisBundle {
	pub org: OrgResponse,
	pub app: AppResponse,
	pub user: UserResponse,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FullGenesisResponse {
	pub genesis: GenesisBundle,
	pub test: GenesisBundle,
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::TimeZone;
	use keel_core::{Audit, AuditApp, AuditUser, OrgKindId, AppId, UserId, OrgId};

	fn audit() -> SimpleAudit {
		SimpleAudit::new(Audit::from_parts(
			AuditApp {
				id: AppId::generate(),
				external_id: ExternalId::generate(),
			},
			AuditUser {
				id: UserId::generate(),
				username: "root".to_string(),
				first_name: "Ada".to_string(),
				last_name: "Lovelace".to_string(),
			},
			Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap(),
		))
	}

	#[test]
	fn org_response_never_carries_internal_ids() {
		let org = Org {
			id: OrgId::generate(),
			external_id: ExternalId::generate(),
			name: "Acme".to_string(),
			description: "Acme Corp".to_string(),
			kind: OrgKind {
				id: OrgKindId::generate(),
				external_id: "standard".to_string(),
				description: "standard".to_string(),
			},
		};
		let response = OrgResponse::new(&org, &audit());
		let json = serde_json::to_string(&response).unwrap();

		assert!(!json.contains(&org.id.to_string()));
		assert!(!json.contains(&org.kind.id.to_string()));
		assert!(json.contains(org.external_id.as_str()));
		assert!(!json.contains("\"app\""));
	}

	#[test]
	fn audit_is_flattened_with_second_precision() {
		let response = AuditResponse::from(&audit());
		assert_eq!(response.create_date_time, "2025-01-02T03:04:05Z");
		assert_eq!(response.create_date_time, response.update_date_time);
		assert_eq!(response.create_user_first_name, "Ada");
	}
}
