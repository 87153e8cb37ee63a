use anyhow::Result;
use clap::Parser;

use es_mirroring::resource;
use es_mirroring::{EventStreamsApi, MirroringConfigState};

use super::GlobalOptions;

/// Option for resetting the mirroring topic selection.
/// There is no delete on the remote side, the selection becomes empty.
#[derive(Debug, Parser)]
pub struct ResetOpt {
    /// ID or CRN of the Event Streams instance
    instance: String,
}

impl ResetOpt {
    pub async fn process<A: EventStreamsApi>(self, opts: &GlobalOptions, api: &A) -> Result<()> {
        let mut state = MirroringConfigState::new(self.instance, Vec::new());
        resource::delete(api, &mut state).await?;
        opts.notify(format!(
            "mirroring topic selection of \"{}\" reset",
            state.resource_instance_id
        ));
        Ok(())
    }
}
