use warranty::db::claim_repo;
use warranty::{Claim, ClaimId, ClaimStatus, ClaimStore};

use crate::state::AppState;

fn print_claim(claim: &Claim) {
    println!(
        "{:>6}  {:<13}  installed {}  invoice {:<10}  {}  ({})",
        claim.id,
        claim.status.as_str(),
        claim.installation_date,
        claim
            .invoice_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string()),
        claim.product_name,
        claim.invoice.stored_name,
    );
}

pub fn list(state: &AppState, status: Option<ClaimStatus>) -> anyhow::Result<()> {
    let store = state.open_store()?;
    let claims = match status {
        Some(status) => store.find_all_by_status(status)?,
        None => store.find_all()?,
    };

    for claim in &claims {
        print_claim(claim);
    }
    println!("{} claim(s)", claims.len());
    Ok(())
}

/// Staff decision on a claim, typically one in `manual_review`.
pub fn review(state: &AppState, id: ClaimId, status: ClaimStatus) -> anyhow::Result<()> {
    let store = state.open_store()?;
    let claim = claim_repo::override_status(&store, id, status)?;
    print_claim(&claim);
    Ok(())
}

pub fn summary(state: &AppState) -> anyhow::Result<()> {
    let store = state.open_store()?;
    let counts = claim_repo::count_by_status(&store)?;
    println!("{}", serde_json::to_string_pretty(&counts)?);
    Ok(())
}
