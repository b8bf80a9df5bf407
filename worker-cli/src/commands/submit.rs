use std::path::Path;

use anyhow::{bail, Context};
use chrono::NaiveDate;
use tracing::info;
use warranty::extractor::{parse_calendar_date, DateExtractor};
use warranty::pipeline::SubmissionProcessor;
use warranty::storage::accept;
use warranty::{ClaimStore, NewClaim};

use crate::state::AppState;

pub struct SubmitArgs<'a> {
    pub file: &'a Path,
    pub installation_date: &'a str,
    pub owner: i64,
    pub customer_name: &'a str,
    pub customer_phone: &'a str,
    pub product_name: &'a str,
}

/// Accepts `raw` as a calendar date or a timestamp truncated to its UTC date.
pub fn parse_installation_date(raw: &str) -> anyhow::Result<NaiveDate> {
    match parse_calendar_date(raw) {
        Some(date) => Ok(date),
        None => bail!(
            "invalid installation date '{}': expected YYYY-MM-DD or an RFC 3339 timestamp",
            raw
        ),
    }
}

/// Stores the upload, creates the pending claim and waits for the
/// background classification so the process does not exit first.
pub fn submit(state: &AppState, args: SubmitArgs<'_>) -> anyhow::Result<()> {
    let installation_date = parse_installation_date(args.installation_date)?;
    let store = state.open_store()?;
    let processor = SubmissionProcessor::new(state.pipeline(store.clone())?);

    let invoice = accept(&state.uploads, args.file)
        .with_context(|| format!("upload of {} refused", args.file.display()))?;

    let new_claim = NewClaim {
        owner_id: args.owner,
        customer_name: args.customer_name.to_string(),
        customer_phone: args.customer_phone.to_string(),
        product_name: args.product_name.to_string(),
        installation_date,
        invoice,
    };

    let rt = tokio::runtime::Runtime::new()?;
    let claim = rt.block_on(async {
        let (claim, handle) = processor.submit(&new_claim)?;
        println!("{}", serde_json::to_string_pretty(&claim)?);

        let outcome = handle.await.context("classification task did not finish")?;
        info!(claim_id = claim.id, ?outcome, "Background classification finished");
        anyhow::Ok(claim)
    })?;

    if let Some(updated) = store.find_by_id(claim.id)? {
        println!("{}", serde_json::to_string_pretty(&updated)?);
    }
    Ok(())
}

/// Runs extraction only and prints the date, or nothing when absent.
pub fn extract(state: &AppState, file: &Path) -> anyhow::Result<()> {
    let extractor = DateExtractor::new(state.ocr_client()?, state.pipeline_config.ocr_timeout);
    let rt = tokio::runtime::Runtime::new()?;

    match rt.block_on(extractor.try_extract(file)) {
        Ok(date) => println!("{}", date),
        Err(e) => {
            println!("absent");
            eprintln!("{} ({})", e, e.cause());
        }
    }
    Ok(())
}
