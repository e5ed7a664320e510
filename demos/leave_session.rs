//! Walks one leave request through the workflow: a rejected first attempt,
//! a fixed draft, an explicit confirmation and a look at the history.
//!
//! Run with `RUST_LOG=leave_request=debug cargo run --example leave_session`.
//! Drop a `leave.toml` next to it or set `LEAVE_COMMIT_MODE=remote` to post
//! to a running leave service instead of committing locally.

use std::sync::Arc;

use anyhow::Context;
use chrono::{Duration, Utc};
use leave_request::{
    Confirmation, Recipient, Submission, SubmissionWorkflow,
    config,
    history::{SortKey, SortState},
    notify::TracingSink,
    types::LeaveType,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("leave_request=debug")),
        )
        .init();

    let config = config::load_config().context("loading leave.toml")?;
    let mut workflow = SubmissionWorkflow::from_config(&config, Arc::new(TracingSink))?;

    let start = Utc::now().date_naive() + Duration::days(7);

    // too short a reason, the form comes back with field errors
    workflow.edit(|draft| {
        draft
            .set_leave_type(LeaveType::Annual)
            .set_from_date(start)
            .set_to_date(start + Duration::days(4))
            .set_reason("Trip")
    })?;
    if let Submission::Rejected(errors) = workflow.submit()? {
        for (field, message) in errors.iter() {
            println!("{field}: {message}");
        }
    }

    workflow.edit(|draft| {
        draft
            .set_reason("Family trip to the coast")
            .add_recipient(Recipient::Manager)
            .add_recipient(Recipient::HR)
    })?;
    workflow.submit()?;

    if let Some(gate) = workflow.gate() {
        let candidate = gate.candidate().context("gate without a candidate")?;
        println!(
            "Confirm {} leave for {} day(s)?",
            candidate.leave_type(),
            candidate.day_span()
        );
        match gate.confirm().await? {
            Confirmation::Committed(record) => println!("committed {}", record.id()),
            Confirmation::Failed(err) => println!("commit failed: {err}"),
            Confirmation::Unrecorded { record, error } => {
                println!("committed {} but not recorded: {error}", record.id())
            }
        }
    }

    let mut sort = SortState::default();
    sort.toggle(SortKey::From);
    let page = workflow.query_history("", sort, 1)?;
    println!("page {} of {} ({} total)", page.page, page.total_pages, page.total_count);
    for record in &page.records {
        println!(
            "{:<8} {} -> {} {:>3}d {:<9} {}",
            record.leave_type(),
            record.range().from(),
            record.range().to(),
            record.day_span(),
            record.status(),
            record.reason()
        );
    }

    Ok(())
}
