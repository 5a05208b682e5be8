use anyhow::Result;

use crate::config::AppConfig;
use crate::history::{JsonFileStore, TranscriptStore};
use crate::ui::{DisplayOptions, Output};

/// Print the stored transcript, or clear it after confirmation
pub fn history(clear: bool, skip_confirm: bool, force_local: bool, force_global: bool) -> Result<()> {
    let output = Output::new();
    let config = AppConfig::load_with_scope(force_local, force_global)?;
    let scope_name = AppConfig::get_scope_name(force_local, force_global);
    let store = JsonFileStore::new(config.get_history_path());

    let transcript = store.load()?;
    output.status(
        "History",
        &format!("{} ({} messages)", store.path().display(), transcript.len()),
    );

    if !clear {
        if transcript.is_empty() {
            output.info("No conversation yet.");
        } else {
            println!();
            output.transcript(&transcript, &DisplayOptions::from_config(&config));
        }
        return Ok(());
    }

    if transcript.is_empty() {
        output.info("History is empty, nothing to clear.");
        return Ok(());
    }

    output.warning("this will delete the stored conversation");
    output.info(&format!("{} messages will be deleted", transcript.len()));

    if !skip_confirm && !output.confirm("yes")? {
        output.info("Operation cancelled");
        return Ok(());
    }

    store.save(&[])?;
    output.finish("clearing history", scope_name);

    Ok(())
}
