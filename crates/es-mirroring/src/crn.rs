//! # Cloud Resource Names
//!
//! An instance CRN has ten colon separated segments. Segment 8 names the
//! resource type and segment 9 the resource, both empty for a service
//! instance. A sub-resource id is the instance CRN with those two segments
//! overwritten, e.g.
//!
//! ```text
//! crn:v1:bluemix:public:messagehub:us-south:a/123:<guid>::
//! crn:v1:bluemix:public:messagehub:us-south:a/123:<guid>:mirroring-config:
//! ```

use std::fmt;
use std::str::FromStr;

use crate::constants::MIRRORING_CONFIG_RESOURCE_TYPE;
use crate::{MirroringError, Result};

pub const CRN_SEPARATOR: char = ':';
pub const CRN_SEGMENTS: usize = 10;

const RESOURCE_TYPE_SEGMENT: usize = 8;
const RESOURCE_SEGMENT: usize = 9;

/// A CRN split into its ten segments.
///
/// Segments are not escaped, a segment never contains the separator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Crn {
    segments: Vec<String>,
}

impl Crn {
    fn split(value: &str) -> Vec<String> {
        value.split(CRN_SEPARATOR).map(str::to_owned).collect()
    }

    pub fn resource_type(&self) -> &str {
        &self.segments[RESOURCE_TYPE_SEGMENT]
    }

    /// Sub-resource id for `resource_type`: segment 8 is set to the type and
    /// segment 9 is cleared.
    ///
    /// Meant to be called on an instance CRN. Deriving from an id that is
    /// already derived just overwrites the type again, so the result is not
    /// guaranteed to recover the base the caller started from.
    pub fn derive(&self, resource_type: &str) -> Crn {
        let mut segments = self.segments.clone();
        segments[RESOURCE_TYPE_SEGMENT] = resource_type.to_owned();
        segments[RESOURCE_SEGMENT] = String::new();
        Crn { segments }
    }

    /// Inverse of [`Crn::derive`]: strip the type from a sub-resource id and
    /// return the instance CRN.
    pub fn recover(id: &str, resource_type: &str) -> Result<Crn> {
        let mut segments = Self::split(id);
        if segments.len() != CRN_SEGMENTS || segments[RESOURCE_TYPE_SEGMENT] != resource_type {
            return Err(MirroringError::MalformedIdentifier(id.to_owned()));
        }
        segments[RESOURCE_TYPE_SEGMENT] = String::new();
        segments[RESOURCE_SEGMENT] = String::new();
        Ok(Crn { segments })
    }
}

impl FromStr for Crn {
    type Err = MirroringError;

    fn from_str(value: &str) -> Result<Self> {
        let segments = Self::split(value);
        if segments.len() != CRN_SEGMENTS {
            return Err(MirroringError::InvalidCrn {
                crn: value.to_owned(),
                expected: CRN_SEGMENTS,
                found: segments.len(),
            });
        }
        Ok(Crn { segments })
    }
}

impl fmt::Display for Crn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join(":"))
    }
}

/// id of the mirroring config resource of an instance
pub fn mirroring_config_id(instance_crn: &Crn) -> String {
    instance_crn.derive(MIRRORING_CONFIG_RESOURCE_TYPE).to_string()
}

/// instance CRN from a mirroring config resource id (used on import)
pub fn instance_crn_from_id(id: &str) -> Result<Crn> {
    Crn::recover(id, MIRRORING_CONFIG_RESOURCE_TYPE)
}
