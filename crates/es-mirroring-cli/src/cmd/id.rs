use anyhow::Result;
use clap::Subcommand;

use es_mirroring::{Crn, instance_crn_from_id, mirroring_config_id};

use super::GlobalOptions;

#[derive(Debug, Subcommand)]
pub enum IdCmd {
    /// Print the mirroring config id of an instance CRN
    Derive {
        /// Instance CRN, ten colon separated segments
        crn: String,
    },
    /// Print the instance CRN of a mirroring config id
    Recover {
        /// Mirroring config id
        id: String,
    },
}

impl IdCmd {
    pub fn process(self, _opts: &GlobalOptions) -> Result<()> {
        println!("{}", self.convert()?);
        Ok(())
    }

    fn convert(&self) -> Result<String> {
        match self {
            Self::Derive { crn } => {
                let crn: Crn = crn.parse()?;
                Ok(mirroring_config_id(&crn))
            }
            Self::Recover { id } => Ok(instance_crn_from_id(id)?.to_string()),
        }
    }
}
