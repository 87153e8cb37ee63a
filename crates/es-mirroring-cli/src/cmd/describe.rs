use anyhow::Result;
use clap::Parser;

use es_mirroring::EventStreamsApi;
use es_mirroring::resource::read_data_source;

use crate::output::{OutputType, render_state};

use super::GlobalOptions;

/// Option for describing the mirroring topic selection
#[derive(Debug, Parser)]
pub struct DescribeOpt {
    /// ID or CRN of the Event Streams instance
    instance: String,

    /// Output format
    #[clap(short = 'O', long, value_enum, default_value_t = OutputType::Table)]
    output: OutputType,
}

impl DescribeOpt {
    pub async fn process<A: EventStreamsApi>(self, _opts: &GlobalOptions, api: &A) -> Result<()> {
        let state = read_data_source(api, &self.instance).await?;
        println!("{}", render_state(&state, self.output)?);
        Ok(())
    }
}
