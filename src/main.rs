//! txdisplay - Entry Point

use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

use txdisplay::config::{self, CliOverrides, ResolvedConfig};
use txdisplay::display::{render_review, DecryptionKey, ReviewSession};
use txdisplay::model::AppError;
use txdisplay::parser::TxMode;

/// txdisplay - review a transaction page by page before signing
#[derive(Parser, Debug)]
#[command(name = "txdisplay")]
#[command(version)]
#[command(about = "Lists the review pages a signing device shows for a transaction")]
pub struct Args {
    /// Path to the JSON sign document (reads from stdin if not provided)
    pub file: Option<PathBuf>,

    /// Show every field, including chain id, account number and sequence
    #[arg(short, long)]
    pub expert: bool,

    /// Chain id of the expected network
    #[arg(long, value_name = "ID")]
    pub default_chain_id: Option<String>,

    /// Address of the signing device; its own sender pages are hidden
    #[arg(long, value_name = "ADDR")]
    pub own_address: Option<String>,

    /// Transaction encryption key (64 hex characters)
    #[arg(long, value_name = "HEX")]
    pub decryption_key: Option<String>,

    /// Columns per value page (must be positive)
    #[arg(short = 'w', long, value_name = "N", value_parser = clap::value_parser!(u16).range(1..))]
    pub page_width: Option<u16>,

    /// Show raw item keys instead of labels
    #[arg(long)]
    pub raw_keys: bool,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Path to the log file
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

impl Args {
    fn cli_overrides(&self) -> CliOverrides {
        CliOverrides {
            // --expert can only switch expert mode on
            expert_mode: self.expert.then_some(true),
            default_chain_id: self.default_chain_id.clone(),
            own_address: self.own_address.clone(),
            page_width: self.page_width.map(usize::from),
            log_file_path: self.log_file.clone(),
        }
    }
}

/// Resolves configuration with the full precedence chain:
/// Defaults → Config File → Env Vars → CLI Args
fn resolve_config(args: &Args) -> Result<ResolvedConfig, AppError> {
    let config_file = config::load_config_with_precedence(args.config.clone())?;
    let merged = config::merge_config(config_file)?;
    let with_env = config::apply_env_overrides(merged)?;
    Ok(config::apply_cli_overrides(with_env, args.cli_overrides()))
}

fn run(args: Args) -> Result<(), AppError> {
    let config = resolve_config(&args)?;

    let _log_guard = txdisplay::logging::init(&config.log_file_path)?;
    info!(config = ?config, "Configuration loaded and resolved");

    let decryption_key = args
        .decryption_key
        .as_deref()
        .map(DecryptionKey::from_hex)
        .transpose()?;

    let bytes = txdisplay::source::read_input(args.file.clone())?;

    let mut session = ReviewSession::new(config.session_settings());
    session.set_decryption_key(decryption_key);
    session.read_tx(&bytes, TxMode::Json)?;

    let listing = render_review(&mut session, !args.raw_keys).inspect_err(|err| {
        error!(error = %err, "Review aborted");
    })?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(listing.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

fn main() -> ExitCode {
    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_help_does_not_error() {
        let result = Args::try_parse_from(["txdisplay", "--help"]);
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_version_does_not_error() {
        let result = Args::try_parse_from(["txdisplay", "--version"]);
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_no_args_defaults() {
        let args = Args::parse_from(["txdisplay"]);
        assert_eq!(args.file, None);
        assert!(!args.expert);
        assert_eq!(args.default_chain_id, None);
        assert_eq!(args.own_address, None);
        assert_eq!(args.decryption_key, None);
        assert_eq!(args.page_width, None);
        assert!(!args.raw_keys);
        assert_eq!(args.config, None);
        assert_eq!(args.log_file, None);
        assert_eq!(args.cli_overrides(), CliOverrides::default());
    }

    #[test]
    fn test_file_path_populates_file_field() {
        let args = Args::parse_from(["txdisplay", "tx.json"]);
        assert_eq!(args.file, Some(PathBuf::from("tx.json")));
    }

    #[test]
    fn test_expert_flag_short() {
        let args = Args::parse_from(["txdisplay", "-e"]);
        assert_eq!(args.cli_overrides().expert_mode, Some(true));
    }

    #[test]
    fn test_page_width_rejects_zero() {
        let result = Args::try_parse_from(["txdisplay", "--page-width", "0"]);
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_combined_flags() {
        let args = Args::parse_from([
            "txdisplay",
            "tx.json",
            "--expert",
            "--default-chain-id",
            "pulsar-3",
            "--own-address",
            "secret1me",
            "-w",
            "20",
            "--raw-keys",
            "--log-file",
            "/tmp/txdisplay.log",
        ]);
        assert_eq!(args.file, Some(PathBuf::from("tx.json")));
        assert!(args.raw_keys);

        let overrides = args.cli_overrides();
        assert_eq!(overrides.expert_mode, Some(true));
        assert_eq!(overrides.default_chain_id.as_deref(), Some("pulsar-3"));
        assert_eq!(overrides.own_address.as_deref(), Some("secret1me"));
        assert_eq!(overrides.page_width, Some(20));
        assert_eq!(
            overrides.log_file_path,
            Some(PathBuf::from("/tmp/txdisplay.log"))
        );
    }

    #[test]
    fn test_chain_id_flows_through_config_precedence_chain() {
        use txdisplay::config::{apply_cli_overrides, merge_config, ConfigFile};

        let config_file = ConfigFile {
            default_chain_id: Some("from-file".to_string()),
            ..ConfigFile::default()
        };
        let merged = merge_config(Some(config_file)).unwrap();
        assert_eq!(merged.default_chain_id, "from-file");

        let args = Args::parse_from(["txdisplay", "--default-chain-id", "from-cli"]);
        let with_cli = apply_cli_overrides(merged, args.cli_overrides());
        assert_eq!(
            with_cli.default_chain_id, "from-cli",
            "CLI chain id should override all other sources"
        );
    }
}
