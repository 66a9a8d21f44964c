//! Command handlers. Results go to stdout as JSON, logs to stderr.

use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, BufReader};

use domain_market_app::AppState;
use domain_market_core::types::{PasswordUpdate, SnapshotOptions};

use crate::args::{
    Command, DbAction, DocumentAction, PasswordAction, PasswordInput, SectionArgs,
};

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

impl From<SectionArgs> for SnapshotOptions {
    fn from(args: SectionArgs) -> Self {
        Self {
            include_settings: !args.no_settings,
            include_auth: !args.no_auth,
        }
    }
}

pub async fn run(state: &AppState, command: Command) -> Result<()> {
    match command {
        Command::Init => {
            state.ensure_ready().await.context("storage bootstrap failed")?;
            print_json(&json!({
                "storage": state.storage_kind(),
                "dataDir": state.config.data_dir,
                "ready": true,
            }))
        }
        Command::Status => status(state).await,
        Command::Export { output, sections } => {
            let download = state.backups.export_for_download(sections.into()).await?;
            match output {
                Some(path) => {
                    tokio::fs::write(&path, &download.content)
                        .await
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    tracing::info!("Backup written to {}", path.display());
                    Ok(())
                }
                None => {
                    println!("{}", download.content);
                    Ok(())
                }
            }
        }
        Command::Backup { sections } => {
            let name = state.backups.persist_snapshot(sections.into()).await?;
            print_json(&json!({ "snapshot": name }))
        }
        Command::Restore { file, snapshot } => {
            let report = match (file, snapshot) {
                (Some(path), _) => {
                    let envelope = read_envelope(&path).await?;
                    state.restore.restore(&envelope).await?
                }
                (None, Some(name)) => state.restore.restore_document(&name).await?,
                (None, None) => bail!("either --file or --snapshot is required"),
            };
            print_json(&report)
        }
        Command::Snapshots => print_json(&state.backups.list_snapshots().await),
        Command::Db { action } => db(state, action).await,
        Command::Password { action } => password(state, action).await,
        Command::Documents { action } => documents(state, action).await,
        Command::AutoBackup { once } => auto_backup(state, once).await,
    }
}

async fn status(state: &AppState) -> Result<()> {
    state.ensure_ready().await.context("storage bootstrap failed")?;
    let market = &state.market;
    let credential = state.credentials.info().await?;

    print_json(&json!({
        "storage": state.storage_kind(),
        "dataDir": state.config.data_dir,
        "deployment": state.config.deployment,
        "ready": state.bootstrap.is_ready(),
        "counts": {
            "domains": market.domains().await?.len(),
            "soldDomains": market.sold_domains().await?.len(),
            "friendlyLinks": market.friendly_links().await?.len(),
            "registrars": market.registrars().await?.len(),
        },
        "credential": credential.map(|(last_updated, version)| json!({
            "lastUpdated": last_updated,
            "version": version,
        })),
        "snapshots": state.backups.list_snapshots().await.len(),
        "autoBackup": state.auto_backup.state().await,
    }))
}

async fn read_envelope(path: &Path) -> Result<Value> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("{} is not valid JSON", path.display()))
}

async fn db(state: &AppState, action: DbAction) -> Result<()> {
    let files = &state.db_files;
    match action {
        DbAction::Download { output } => {
            let bytes = files.download_database_file().await?;
            tokio::fs::write(&output, &bytes)
                .await
                .with_context(|| format!("failed to write {}", output.display()))?;
            print_json(&json!({ "output": output, "size": bytes.len() }))
        }
        DbAction::Backup => print_json(&json!({ "backup": files.create_backup().await? })),
        DbAction::List => print_json(&files.list_backups().await?),
        DbAction::Restore { name } => {
            let safety = files.restore_from_backup(&name).await?;
            print_json(&json!({ "restored": name, "previous": safety }))
        }
        DbAction::Upload { file } => {
            let file_name = file
                .file_name()
                .and_then(|n| n.to_str())
                .with_context(|| format!("{} has no usable file name", file.display()))?
                .to_string();
            let bytes = tokio::fs::read(&file)
                .await
                .with_context(|| format!("failed to read {}", file.display()))?;
            let safety = files.upload_and_restore(&file_name, &bytes).await?;
            print_json(&json!({ "restored": file_name, "previous": safety }))
        }
        DbAction::Delete { name } => {
            if !files.delete_backup(&name).await? {
                bail!("database backup {name} does not exist");
            }
            print_json(&json!({ "deleted": name }))
        }
    }
}

async fn password(state: &AppState, action: PasswordAction) -> Result<()> {
    let credentials = &state.credentials;
    match action {
        PasswordAction::Verify { input } => {
            let password = read_password(input).await?;
            if !credentials.verify(&password).await? {
                bail!("password does not match");
            }
            print_json(&json!({ "valid": true }))
        }
        PasswordAction::Set { input } => {
            let password = read_password(input).await?;
            report_update(credentials.update(&password).await?)
        }
        PasswordAction::Reset => report_update(credentials.reset().await?),
    }
}

/// Flag or environment value, else the first line of stdin.
async fn read_password(input: PasswordInput) -> Result<String> {
    if let Some(value) = input.value {
        return Ok(value);
    }
    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await
        .context("failed to read password from stdin")?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        bail!("no password given on stdin or in DOMAIN_MARKET_PASSWORD");
    }
    Ok(password)
}

/// A cached-only update is lost when the command exits.
fn report_update(update: PasswordUpdate) -> Result<()> {
    match update {
        PasswordUpdate::Persisted => print_json(&json!({ "updated": true })),
        PasswordUpdate::CachedOnly => bail!("password could not be written to storage"),
    }
}

async fn documents(state: &AppState, action: DocumentAction) -> Result<()> {
    let market = &state.market;
    match action {
        DocumentAction::List => print_json(&market.list_documents().await),
        DocumentAction::Read { name } => match market.read_document(&name, Value::Null).await {
            Value::Null => bail!("document {name} not found or unreadable"),
            document => print_json(&document),
        },
        DocumentAction::Delete { name } => {
            if !market.delete_document(&name).await? {
                bail!("failed to delete {name}");
            }
            print_json(&json!({ "deleted": name }))
        }
    }
}

async fn auto_backup(state: &AppState, once: bool) -> Result<()> {
    if once {
        let written = state.auto_backup.run_once(Utc::now()).await?;
        return print_json(&json!({ "snapshot": written }));
    }

    let handle = state.start_auto_backup();
    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl-C")?;
    tracing::info!("Stopping auto-backup");
    handle.abort();
    Ok(())
}
