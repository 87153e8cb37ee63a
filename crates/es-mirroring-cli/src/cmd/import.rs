use anyhow::Result;
use clap::Parser;

use es_mirroring::EventStreamsApi;
use es_mirroring::resource;

use crate::output::{OutputType, render_state};

use super::GlobalOptions;

/// Option for importing a mirroring config by id
#[derive(Debug, Parser)]
pub struct ImportOpt {
    /// Mirroring config id, the instance CRN ending in `mirroring-config:`
    id: String,

    /// Output format
    #[clap(short = 'O', long, value_enum, default_value_t = OutputType::Json)]
    output: OutputType,
}

impl ImportOpt {
    pub async fn process<A: EventStreamsApi>(self, _opts: &GlobalOptions, api: &A) -> Result<()> {
        let state = resource::import(api, &self.id).await?;
        println!("{}", render_state(&state, self.output)?);
        Ok(())
    }
}
