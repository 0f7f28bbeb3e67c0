use std::time::Duration;

use alerta_core::models::IncidentStatus;
use alerta_core::IncidentCollection;

use crate::commands::common::{
    end_message, follow_feed, format_connection_state, format_incident_lines,
    incident_to_list_item, stop_signal, AppContext, FeedEvent,
};
use crate::error::CliError;

pub async fn run_watch(
    context: &AppContext,
    status: Option<IncidentStatus>,
    as_json: bool,
    duration: Option<Duration>,
) -> Result<(), CliError> {
    let user = context.require_user()?;
    if !as_json {
        println!("Signed in as {} ({})", user.email, user.role.label());
        println!("Use `alerta report` to submit an incident.");
    }

    let mut synchronizer = context.synchronizer();
    let mut previous = IncidentCollection::new();
    let end = follow_feed(
        &mut synchronizer,
        &context.feed_url,
        stop_signal(duration),
        |event| match event {
            FeedEvent::State(state) => {
                if !as_json {
                    eprintln!("{}", format_connection_state(state, &context.feed_url));
                }
                Ok(())
            }
            FeedEvent::Incidents(current) => {
                print_changes(current, &previous, status, as_json)?;
                previous = current.clone();
                Ok(())
            }
        },
    )
    .await?;

    if let Some(message) = end_message(end, &context.feed_url, context.reconnects()) {
        eprintln!("{message}");
    }
    Ok(())
}

fn print_changes(
    current: &IncidentCollection,
    previous: &IncidentCollection,
    status: Option<IncidentStatus>,
    as_json: bool,
) -> Result<(), CliError> {
    let changed = current
        .changes_since(previous)
        .into_iter()
        .filter(|incident| status.map_or(true, |status| incident.status == status))
        .collect::<Vec<_>>();

    if as_json {
        for incident in changed {
            println!("{}", serde_json::to_string(&incident_to_list_item(incident))?);
        }
    } else {
        for line in format_incident_lines(changed) {
            println!("{line}");
        }
    }
    Ok(())
}
