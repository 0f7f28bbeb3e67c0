use std::time::Duration;

use alerta_core::models::{IncidentKind, Urgency};
use alerta_core::sync::{ConnectOutcome, SubmitOutcome};
use alerta_core::IncidentDraft;

use crate::commands::common::{wait_for_connection, AppContext};
use crate::error::CliError;

pub struct ReportArgs {
    pub kind: IncidentKind,
    pub location: String,
    pub description: String,
    pub urgency: Urgency,
    pub timeout: Duration,
}

pub async fn run_report(context: &AppContext, args: ReportArgs) -> Result<(), CliError> {
    let user = context.require_user()?;
    let draft = IncidentDraft::new(args.kind, args.location, args.description, args.urgency)
        .with_created_by(&user.id);
    draft.validate()?;

    let mut synchronizer = context.synchronizer();
    if synchronizer.connect(&context.feed_url) == ConnectOutcome::Skipped {
        return Err(CliError::NotDelivered(context.feed_url.clone()));
    }

    if !wait_for_connection(&synchronizer, args.timeout).await {
        synchronizer.disconnect();
        return Err(CliError::NotDelivered(context.feed_url.clone()));
    }

    let outcome = synchronizer.submit_incident(draft);
    synchronizer.close().await;

    match outcome {
        SubmitOutcome::Sent(incident_id) => {
            println!("Reported incident {incident_id}");
            Ok(())
        }
        SubmitOutcome::NotSent => Err(CliError::NotDelivered(context.feed_url.clone())),
    }
}
