// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use chrono::{DateTime, TimeZone, Utc};
use keel_core::GENESIS_KIND;
use serde::{Deserialize, Serialize};

use crate::error::{ProvisioningError, Result};

/// Deactivation used for keys issued without an explicit one:
/// 2099-12-31T00:00:00Z.
pub fn default_key_deactivation() -> DateTime<Utc> {
	Utc.with_ymd_and_hms(2099, 12, 31, 0, 0, 0)
		.single()
		.unwrap_or(DateTime::<Utc>::MAX_UTC)
}

fn require(field: &str, value: &str) -> Result<()> {
	if value.trim().is_empty() {
		return Err(ProvisioningError::Validation(format!("{field} is required")));
	}
	Ok(())
}

fn require_if_present(field: &str, value: Option<&str>) -> Result<()> {
	match value {
		Some(v) => require(field, v),
		None => Ok(()),
	}
}

/// Request to create an org, optionally with an app and a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOrgRequest {
	pub name: String,
	pub description: String,
	/// Tag of an existing org kind.
	pub kind: String,
	#[serde(default)]
	pub app: Option<CreateOrgAppRequest>,
	#[serde(default)]
	pub user: Option<CreateOrgUserRequest>,
}

impl CreateOrgRequest {
	pub fn validate(&self) -> Result<()> {
		require("name", &self.name)?;
		require("description", &self.description)?;
		require("kind", &self.kind)?;
		// Only the bootstrap may hold the genesis kind.
		if self.kind.trim() == GENESIS_KIND {
			return Err(ProvisioningError::Validation(format!(
				"org kind {GENESIS_KIND} is reserved"
			)));
		}
		if let Some(app) = &self.app {
			app.validate()?;
		}
		if let Some(user) = &self.user {
			user.validate()?;
		}
		Ok(())
	}
}

/// App bundled into a [`CreateOrgRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOrgAppRequest {
	pub name: String,
	pub description: String,
	#[serde(default)]
	pub api_key_deactivation: Option<DateTime<Utc>>,
}

impl CreateOrgAppRequest {
	pub fn validate(&self) -> Result<()> {
		require("app name", &self.name)?;
		require("app description", &self.description)
	}

	pub fn deactivation(&self) -> DateTime<Utc> {
		self.api_key_deactivation
			.unwrap_or_else(default_key_deactivation)
	}
}

/// User bundled into a [`CreateOrgRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOrgUserRequest {
	pub username: String,
	pub first_name: String,
	pub last_name: String,
}

impl CreateOrgUserRequest {
	pub fn validate(&self) -> Result<()> {
		require("username", &self.username)?;
		require("first name", &self.first_name)?;
		require("last name", &self.last_name)
	}
}

/// Field overrides for an existing org. `None` keeps the current value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateOrgRequest {
	pub external_id: String,
	#[serde(default)]
	pub name: Option<String>,
	#[serde(default)]
	pub description: Option<String>,
}

impl UpdateOrgRequest {
	pub fn validate(&self) -> Result<()> {
		require("external ID", &self.external_id)?;
		require_if_present("name", self.name.as_deref())?;
		require_if_present("description", self.description.as_deref())
	}
}

/// Request to create an app under an existing org.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateAppRequest {
	pub org_external_id: String,
	pub name: String,
	pub description: String,
	#[serde(default)]
	pub api_key_deactivation: Option<DateTime<Utc>>,
}

impl CreateAppRequest {
	pub fn validate(&self) -> Result<()> {
		require("org external ID", &self.org_external_id)?;
		require("name", &self.name)?;
		require("description", &self.description)
	}

	pub fn deactivation(&self) -> DateTime<Utc> {
		self.api_key_deactivation
			.unwrap_or_else(default_key_deactivation)
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateAppRequest {
	pub external_id: String,
	#[serde(default)]
	pub name: Option<String>,
	#[serde(default)]
	pub description: Option<String>,
}

impl UpdateAppRequest {
	pub fn validate(&self) -> Result<()> {
		require("external ID", &self.external_id)?;
		require_if_present("name", self.name.as_deref())?;
		require_if_present("description", self.description.as_deref())
	}
}

/// Request to create a user in an existing org.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateUserRequest {
	pub org_external_id: String,
	pub username: String,
	pub first_name: String,
	pub last_name: String,
}

impl CreateUserRequest {
	pub fn validate(&self) -> Result<()> {
		require("org external ID", &self.org_external_id)?;
		require("username", &self.username)?;
		require("first name", &self.first_name)?;
		require("last name", &self.last_name)
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOrgKindRequest {
	pub external_id: String,
	pub description: String,
}

impl CreateOrgKindRequest {
	pub fn validate(&self) -> Result<()> {
		require("external ID", &self.external_id)?;
		require("description", &self.description)
	}
}

/// Seed values for the genesis bootstrap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisRequest {
	pub seed_username: String,
	pub seed_user_first_name: String,
	pub seed_user_last_name: String,
}

impl GenesisRequest {
	pub fn validate(&self) -> Result<()> {
		require("seed username", &self.seed_username)?;
		require("seed user first name", &self.seed_user_first_name)?;
		require("seed user last name", &self.seed_user_last_name)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn org_request() -> CreateOrgRequest {
		CreateOrgRequest {
			name: "Acme".to_string(),
			description: "Acme Corp".to_string(),
			kind: "standard".to_string(),
			app: None,
			user: None,
		}
	}

	#[test]
	fn complete_org_request_is_valid() {
		assert!(org_request().validate().is_ok());
	}

	#[test]
	fn blank_fields_are_rejected() {
		let mut request = org_request();
		request.kind = "  ".to_string();
		assert!(matches!(
			request.validate(),
			Err(ProvisioningError::Validation(ref m)) if m == "kind is required"
		));
	}

	#[test]
	fn genesis_kind_is_reserved() {
		let mut request = org_request();
		request.kind = " genesis ".to_string();
		assert!(matches!(
			request.validate(),
			Err(ProvisioningError::Validation(ref m)) if m == "org kind genesis is reserved"
		));
	}

	#[test]
	fn bundled_app_is_validated() {
		let mut request = org_request();
		request.app = Some(CreateOrgAppRequest {
			name: String::new(),
			description: "portal".to_string(),
			api_key_deactivation: None,
		});
		assert!(request.validate().is_err());
	}

	#[test]
	fn update_overrides_are_optional_but_not_blank() {
		let mut request = UpdateOrgRequest {
			external_id: "abc".to_string(),
			name: None,
			description: None,
		};
		assert!(request.validate().is_ok());

		request.name = Some(String::new());
		assert!(request.validate().is_err());
	}

	#[test]
	fn missing_deactivation_defaults_to_end_of_2099() {
		let app = CreateOrgAppRequest {
			name: "portal".to_string(),
			description: "portal".to_string(),
			api_key_deactivation: None,
		};
		assert_eq!(app.deactivation().to_rfc3339(), "2099-12-31T00:00:00+00:00");
	}

	#[test]
	fn genesis_request_uses_seed_field_names() {
		let request: GenesisRequest = serde_json::from_str(
			r#"{"seed_username":"root","seed_user_first_name":"Ada","seed_user_last_name":"Lovelace"}"#,
		)
		.unwrap();
		assert_eq!(request.seed_username, "root");
		assert!(request.validate().is_ok());
	}
}
