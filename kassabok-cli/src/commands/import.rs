//! Import command - ingest a statement file

use std::path::Path;

use anyhow::Result;
use kassabok_core::services::LogEvent;
use kassabok_core::OwnerId;

use super::{get_logger, get_session, log_event};
use crate::output;

pub fn run(file: &Path, owner: Option<OwnerId>, delimiter: char, json: bool) -> Result<()> {
    let session = get_session()?;
    let owner_id = session.owner(owner);
    let logger = get_logger();

    let result = session
        .ctx
        .import_service
        .import_file(owner_id, file, delimiter as u8);

    let summary = match result {
        Ok(summary) => summary,
        Err(e) => {
            log_event(
                &logger,
                LogEvent::new("import_failed")
                    .with_command("import")
                    .with_error(e.to_string()),
            );
            return Err(e.into());
        }
    };

    session.commit()?;
    log_event(&logger, LogEvent::new("import_completed").with_command("import"));

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    output::success(&format!(
        "Imported {} transaction(s) ({} parsed, {} already at or before watermark)",
        summary.imported, summary.parsed, summary.skipped_at_watermark
    ));
    Ok(())
}
