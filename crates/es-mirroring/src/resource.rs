//! # Mirroring config resource
//!
//! Lifecycle of the mirroring topic selection of an instance. The remote
//! side has no delete, so delete resets the selection to an empty list.
//! Create and update both replace the whole selection.

use tracing::{debug, info, instrument};

use crate::api::EventStreamsApi;
use crate::crn::{Crn, instance_crn_from_id, mirroring_config_id};
use crate::state::{MirroringConfigState, MirroringTopicSelection};
use crate::{MirroringError, Result};

/// Admin endpoint and instance CRN resolved for one operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedInstance {
    pub admin_url: String,
    pub instance_crn: String,
}

/// Find the admin endpoint of the instance the state points at.
///
/// With no `resource_instance_id` the state is being imported, the instance
/// CRN is recovered from `id` and written back to the state.
pub async fn resolve_instance<A>(api: &A, state: &mut MirroringConfigState) -> Result<ResolvedInstance>
where
    A: EventStreamsApi + ?Sized,
{
    if state.is_importing() {
        let id = state.id.as_deref().unwrap_or_default();
        let instance_crn = instance_crn_from_id(id)?;
        debug!(%id, %instance_crn, "importing");
        state.resource_instance_id = instance_crn.to_string();
    }

    let instance = api.instance_details(&state.resource_instance_id).await?;
    instance.ensure_mirroring_plan()?;
    let admin_url = instance.admin_url()?.to_owned();

    // the resource controller accepts a guid too, prefer the CRN it reports
    let instance_crn = if instance.crn.is_empty() {
        state.resource_instance_id.clone()
    } else {
        instance.crn
    };

    Ok(ResolvedInstance {
        admin_url,
        instance_crn,
    })
}

/// Refresh the state from the remote topic selection.
#[instrument(skip(api, state), fields(instance = %state.resource_instance_id))]
pub async fn read<A>(api: &A, state: &mut MirroringConfigState) -> Result<()>
where
    A: EventStreamsApi + ?Sized,
{
    let resolved = resolve_instance(api, state).await?;
    let selection = api.topic_selection(&resolved.admin_url).await?;
    let instance_crn: Crn = resolved.instance_crn.parse()?;

    state.id = Some(mirroring_config_id(&instance_crn));
    state.resource_instance_id = resolved.instance_crn;
    state.mirroring_topic_patterns = selection.includes;
    Ok(())
}

/// Replace the remote selection with the patterns of the state, then read it back.
#[instrument(skip(api, state), fields(instance = %state.resource_instance_id))]
pub async fn replace<A>(api: &A, state: &mut MirroringConfigState) -> Result<()>
where
    A: EventStreamsApi + ?Sized,
{
    state.validate_for_apply()?;
    let resolved = resolve_instance(api, state).await?;
    let selection = MirroringTopicSelection::new(state.mirroring_topic_patterns.clone());
    api.replace_topic_selection(&resolved.admin_url, &selection)
        .await?;
    info!(
        patterns = selection.includes.len(),
        "mirroring topic selection replaced"
    );
    read(api, state).await
}

pub async fn create<A>(api: &A, state: &mut MirroringConfigState) -> Result<()>
where
    A: EventStreamsApi + ?Sized,
{
    replace(api, state).await
}

pub async fn update<A>(api: &A, state: &mut MirroringConfigState) -> Result<()>
where
    A: EventStreamsApi + ?Sized,
{
    replace(api, state).await
}

/// Reset the selection to an empty list and forget the id.
#[instrument(skip(api, state), fields(instance = %state.resource_instance_id))]
pub async fn delete<A>(api: &A, state: &mut MirroringConfigState) -> Result<()>
where
    A: EventStreamsApi + ?Sized,
{
    let resolved = resolve_instance(api, state).await?;
    api.replace_topic_selection(&resolved.admin_url, &MirroringTopicSelection::empty())
        .await?;
    info!("mirroring topic selection reset");
    state.id = None;
    Ok(())
}

/// Build the state of an existing mirroring config from its id.
pub async fn import<A>(api: &A, id: &str) -> Result<MirroringConfigState>
where
    A: EventStreamsApi + ?Sized,
{
    let mut state = MirroringConfigState::from_id(id);
    read(api, &mut state).await?;
    Ok(state)
}

/// Data source read: the current selection of an instance.
pub async fn read_data_source<A>(api: &A, resource_instance_id: &str) -> Result<MirroringConfigState>
where
    A: EventStreamsApi + ?Sized,
{
    if resource_instance_id.trim().is_empty() {
        return Err(MirroringError::MissingInstanceId);
    }
    let mut state = MirroringConfigState::new(resource_instance_id, Vec::new());
    read(api, &mut state).await?;
    Ok(state)
}
