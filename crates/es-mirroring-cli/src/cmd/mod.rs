mod apply;
mod describe;
mod id;
mod import;
mod reset;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing::debug;

use es_mirroring::{HttpSession, SessionConfig};

use self::apply::ApplyOpt;
use self::describe::DescribeOpt;
use self::id::IdCmd;
use self::import::ImportOpt;
use self::reset::ResetOpt;

#[derive(Args, Clone, Default)]
pub struct GlobalOptions {
    /// Suppress stdout notifications
    #[clap(short = 'q', long, global = true, default_value_t = false)]
    quiet: bool,

    /// Path to the session config file
    #[clap(long, global = true, env = "ES_MIRRORING_CONFIG")]
    config: Option<PathBuf>,

    /// IBM Cloud API key, overrides the config file
    #[clap(long, global = true, env = "IC_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
}

impl std::fmt::Debug for GlobalOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlobalOptions")
            .field("quiet", &self.quiet)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl GlobalOptions {
    pub fn session_config(&self) -> Result<SessionConfig> {
        let config = SessionConfig::load(self.config.as_deref())?;
        Ok(match &self.api_key {
            Some(api_key) if !api_key.is_empty() => config.with_api_key(api_key.as_str()),
            _ => config,
        })
    }

    pub async fn connect(&self) -> Result<HttpSession> {
        let config = self.session_config()?;
        debug!(?config, "connecting");
        Ok(HttpSession::connect(config).await?)
    }

    /// print unless quiet
    pub fn notify(&self, msg: impl AsRef<str>) {
        if !self.quiet {
            println!("{}", msg.as_ref());
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    about = "Manage the mirroring topic selection of Event Streams instances",
    name = "es-mirroring",
    max_term_width = 100
)]
pub struct Cli {
    #[clap(flatten)]
    global_opts: GlobalOptions,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the mirroring topic selection of an instance
    #[command(name = "describe")]
    Describe(DescribeOpt),

    /// Replace the mirroring topic selection of an instance
    #[command(name = "apply")]
    Apply(ApplyOpt),

    /// Reset the mirroring topic selection of an instance to empty
    #[command(name = "reset")]
    Reset(ResetOpt),

    /// Read an existing mirroring config by its id
    #[command(name = "import")]
    Import(ImportOpt),

    /// Convert between instance CRNs and mirroring config ids, offline
    #[command(subcommand)]
    Id(IdCmd),
}

impl Cli {
    pub async fn process(self) -> Result<()> {
        let opts = self.global_opts;
        match self.command {
            Command::Id(cmd) => cmd.process(&opts),
            Command::Describe(cmd) => cmd.process(&opts, &opts.connect().await?).await,
            Command::Apply(cmd) => cmd.process(&opts, &opts.connect().await?).await,
            Command::Reset(cmd) => cmd.process(&opts, &opts.connect().await?).await,
            Command::Import(cmd) => cmd.process(&opts, &opts.connect().await?).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_apply() {
        let cli = Cli::try_parse_from([
            "es-mirroring",
            "-q",
            "apply",
            "crn:v1:bluemix:public:messagehub:us-south:a/1:g::",
            "--pattern",
            "orders.*",
            "--pattern",
            "audit",
        ])
        .expect("parse");
        assert!(cli.global_opts.quiet);
        assert!(matches!(cli.command, Command::Apply(_)));
    }

    #[test]
    fn test_parse_id_derive() {
        let cli = Cli::try_parse_from([
            "es-mirroring",
            "id",
            "derive",
            "crn:v1:bluemix:public:messagehub:us-south:a/1:g::",
        ])
        .expect("parse");
        assert!(matches!(cli.command, Command::Id(_)));
    }

    #[test]
    fn test_api_key_flag_overrides_config() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("config");
        std::fs::write(&path, "api_key = \"from-file\"\n").expect("write");

        let opts = GlobalOptions {
            quiet: true,
            config: Some(path.clone()),
            api_key: Some("from-flag".into()),
        };
        assert_eq!(opts.session_config().expect("config").api_key, "from-flag");
        assert!(!format!("{opts:?}").contains("from-flag"));
    }
}
