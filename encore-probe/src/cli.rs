use clap::{Parser, Subcommand};
use encore_model::VideoKey;
use std::path::PathBuf;

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "encore-probe")]
#[command(
    about = "Warm Encore's videos over HTTP and report readiness",
    version
)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Site config file (TOML or JSON); overrides ENCORE_CONFIG_PATH
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Serve the videos from this root instead of the configured one
    #[arg(long, global = true, env = "ENCORE_ASSET_BASE_URL")]
    pub asset_base_url: Option<String>,

    /// Request metadata only, as on a metered connection
    #[arg(long, global = true, default_value_t = false)]
    pub save_data: bool,

    /// TCP connect timeout for video fetches
    #[arg(long, global = true, default_value_t = 10)]
    pub connect_timeout_secs: u64,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true, default_value_t = false)]
    pub json: bool,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Preload the critical set (the configured one when no keys are given)
    Critical {
        /// Video keys, first one loads fully
        /// (hero, guitar, vinyl1, vinyl2, drumcym)
        keys: Vec<VideoKey>,
    },
    /// List every video with its URL and size
    Registry,
    /// Run the loading screen sequence and print each progress update
    Gate,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn critical_keys_parse_case_insensitively() {
        let cli = Cli::try_parse_from([
            "encore-probe",
            "critical",
            "Hero",
            "drumcym",
            "--json",
        ])
        .unwrap();
        assert!(cli.json);
        match cli.command {
            Command::Critical { keys } => {
                assert_eq!(keys, vec![VideoKey::Hero, VideoKey::Drumcym])
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn unknown_key_is_a_usage_error() {
        assert!(
            Cli::try_parse_from(["encore-probe", "critical", "bass"]).is_err()
        );
    }
}
