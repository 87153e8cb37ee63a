use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::constants::{ENTERPRISE_PLAN, KAFKA_HTTP_URL_EXTENSION};
use crate::{MirroringError, Result};

/// State of the mirroring config resource of one Event Streams instance.
///
/// `id` is the instance CRN with the type segment set to `mirroring-config`.
/// It is recomputed on every read and never used as a source of truth,
/// except on import where it is the only thing known.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirroringConfigState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// The ID or CRN of the Event Streams service instance
    #[serde(default)]
    pub resource_instance_id: String,
    /// The topic patterns to use for mirroring, order is kept as given
    #[serde(default)]
    pub mirroring_topic_patterns: Vec<String>,
}

impl MirroringConfigState {
    pub fn new(resource_instance_id: impl Into<String>, patterns: Vec<String>) -> Self {
        Self {
            id: None,
            resource_instance_id: resource_instance_id.into(),
            mirroring_topic_patterns: patterns,
        }
    }

    /// state known before importing an existing resource
    pub fn from_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Default::default()
        }
    }

    /// a blank or whitespace-only instance id counts as missing
    fn has_instance_id(&self) -> bool {
        !self.resource_instance_id.trim().is_empty()
    }

    pub fn validate_for_apply(&self) -> Result<()> {
        if !self.has_instance_id() {
            return Err(MirroringError::MissingInstanceId);
        }
        Ok(())
    }

    pub fn is_importing(&self) -> bool {
        !self.has_instance_id()
    }
}

/// body of the admin REST topic selection endpoints
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirroringTopicSelection {
    #[serde(default)]
    pub includes: Vec<String>,
}

impl MirroringTopicSelection {
    pub fn new(includes: Vec<String>) -> Self {
        Self { includes }
    }

    /// selection that turns mirroring of every topic off
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Resource controller view of a service instance, only the fields used here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstanceDetails {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub guid: String,
    #[serde(default)]
    pub crn: String,
    #[serde(default)]
    pub resource_plan_id: String,
    #[serde(default)]
    pub extensions: BTreeMap<String, serde_json::Value>,
}

impl InstanceDetails {
    pub fn admin_url(&self) -> Result<&str> {
        self.extensions
            .get(KAFKA_HTTP_URL_EXTENSION)
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| MirroringError::MissingAdminUrl(self.crn.clone()))
    }

    pub fn supports_mirroring(&self) -> bool {
        self.resource_plan_id.contains(ENTERPRISE_PLAN)
    }

    pub fn ensure_mirroring_plan(&self) -> Result<()> {
        if self.supports_mirroring() {
            Ok(())
        } else {
            Err(MirroringError::PlanNotSupported(self.resource_plan_id.clone()))
        }
    }
}
