use anyhow::Result;
use clap::Parser;

use es_mirroring::resource;
use es_mirroring::{EventStreamsApi, MirroringConfigState};

use crate::output::{OutputType, render_state};

use super::GlobalOptions;

/// Option for replacing the mirroring topic selection
#[derive(Debug, Parser)]
pub struct ApplyOpt {
    /// ID or CRN of the Event Streams instance
    instance: String,

    /// Topic pattern to mirror, repeat for more patterns, order is kept
    #[clap(short = 'p', long = "pattern", value_name = "PATTERN")]
    patterns: Vec<String>,

    /// Output format of the resulting state
    #[clap(short = 'O', long, value_enum, default_value_t = OutputType::Table)]
    output: OutputType,
}

impl ApplyOpt {
    pub async fn process<A: EventStreamsApi>(self, opts: &GlobalOptions, api: &A) -> Result<()> {
        let mut state = MirroringConfigState::new(self.instance, self.patterns);
        resource::update(api, &mut state).await?;
        opts.notify(format!(
            "mirroring topic selection of \"{}\" replaced",
            state.resource_instance_id
        ));
        println!("{}", render_state(&state, self.output)?);
        Ok(())
    }
}
