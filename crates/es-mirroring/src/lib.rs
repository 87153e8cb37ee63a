//! Mirroring topic selection of Event Streams service instances.
//!
//! The selection is read, replaced wholesale, and reset to empty on delete
//! through the instance admin REST API. Resource ids are derived from the
//! instance CRN, see [`crn`].

mod errors;

pub mod api;
pub mod constants;
pub mod crn;
pub mod htclient;
pub mod resource;
pub mod session;
pub mod state;

pub use api::EventStreamsApi;
pub use crn::{Crn, instance_crn_from_id, mirroring_config_id};
pub use errors::{MirroringError, Result};
pub use session::{HttpSession, SessionConfig};
pub use state::{InstanceDetails, MirroringConfigState, MirroringTopicSelection};
