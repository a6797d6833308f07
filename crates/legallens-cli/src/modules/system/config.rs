use std::fs;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use legallens_core::DEFAULT_ADDR;
use legallens_session::{
    CredentialStore, FileCredentialStore, KeyringCredentialStore, Session, SessionConfig,
};
use tracing::debug;

use super::notifier::StderrNotifier;
use super::types::{CliConfig, StoreKind};
use crate::cli_args::{ConfigArgs, ConfigCommand};

pub(crate) fn handle_config_command(
    args: ConfigArgs,
    config: &mut CliConfig,
) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => {
            let effective = serde_json::json!({
                "addr": config.addr.as_deref().unwrap_or(DEFAULT_ADDR),
                "credential_store": config.credential_store,
                "renewal_timeout_secs": config.renewal_timeout_secs,
            });
            println!("{}", serde_json::to_string_pretty(&effective)?);
        }
        ConfigCommand::SetAddr(args) => {
            let addr = args.addr.trim().trim_end_matches('/');
            if !addr.starts_with("http://") && !addr.starts_with("https://") {
                anyhow::bail!("server address must start with http:// or https://");
            }
            config.addr = Some(addr.to_string());
        }
        ConfigCommand::SetStore(args) => {
            config.credential_store = args.store;
        }
        ConfigCommand::SetRenewalTimeout(args) => {
            if args.seconds == 0 {
                anyhow::bail!("renewal timeout must be at least one second");
            }
            config.renewal_timeout_secs = Some(args.seconds);
        }
    }
    Ok(())
}

pub(crate) fn state_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map_err(|_| anyhow::anyhow!("HOME is not set"))?;
    Ok(Path::new(&home).join(".legallens"))
}

fn config_path() -> anyhow::Result<PathBuf> {
    Ok(state_dir()?.join("config.json"))
}

pub(crate) fn load_config() -> anyhow::Result<CliConfig> {
    let path = config_path()?;
    if !path.exists() {
        return Ok(CliConfig::default());
    }
    let contents = fs::read_to_string(path)?;
    let config = serde_json::from_str(&contents)?;
    Ok(config)
}

pub(crate) fn save_config(config: &CliConfig) -> anyhow::Result<()> {
    let path = config_path()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let contents = serde_json::to_string_pretty(config)?;
    fs::write(path, contents)?;
    Ok(())
}

pub(crate) fn resolve_addr(addr_arg: Option<String>, config: &CliConfig) -> String {
    addr_arg
        .or_else(|| config.addr.clone())
        .unwrap_or_else(|| DEFAULT_ADDR.to_string())
}

pub(crate) fn ensure_secure_addr(addr: &str, allow_insecure: bool) -> anyhow::Result<()> {
    if addr.starts_with("http://") && !allow_insecure && !is_loopback(addr) {
        anyhow::bail!("refusing to use http:// without --insecure");
    }
    Ok(())
}

fn is_loopback(addr: &str) -> bool {
    let Ok(url) = reqwest::Url::parse(addr) else {
        return false;
    };
    match url.host_str() {
        Some("localhost") => true,
        Some(host) => host
            .trim_start_matches('[')
            .trim_end_matches(']')
            .parse::<IpAddr>()
            .is_ok_and(|ip| ip.is_loopback()),
        None => false,
    }
}

pub(crate) fn open_session(
    client: reqwest::Client,
    addr: &str,
    config: &CliConfig,
) -> anyhow::Result<Session> {
    let store: Arc<dyn CredentialStore> = match config.credential_store {
        StoreKind::File => Arc::new(FileCredentialStore::in_dir(&state_dir()?)),
        StoreKind::Keyring => Arc::new(KeyringCredentialStore::default()),
    };
    let mut session_config = SessionConfig::new(addr);
    if let Some(seconds) = config.renewal_timeout_secs {
        session_config = session_config.with_renewal_timeout(Duration::from_secs(seconds));
    }
    debug!(addr = %addr, store = ?config.credential_store, "opening session");
    Ok(Session::new(
        client,
        session_config,
        store,
        Arc::new(StderrNotifier),
    ))
}
