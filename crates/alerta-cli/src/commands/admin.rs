use std::time::Duration;

use alerta_core::IncidentCollection;

use crate::commands::common::{
    end_message, follow_feed, format_connection_state, format_incident_lines, format_stats_line,
    stop_signal, AppContext, FeedEvent,
};
use crate::error::CliError;

const URGENT_SHOWN: usize = 5;

pub async fn run_admin(context: &AppContext, duration: Option<Duration>) -> Result<(), CliError> {
    let user = context.require_user()?;
    if !user.role.has_admin_view() {
        return Err(CliError::NotAuthorized(user.role.label().to_string()));
    }
    println!("Administrative view for {} ({})", user.email, user.role.label());
    for line in render_admin_view(&IncidentCollection::new()) {
        println!("{line}");
    }

    let mut synchronizer = context.synchronizer();
    let end = follow_feed(
        &mut synchronizer,
        &context.feed_url,
        stop_signal(duration),
        |event| {
            match event {
                FeedEvent::State(state) => {
                    eprintln!("{}", format_connection_state(state, &context.feed_url));
                }
                FeedEvent::Incidents(current) => {
                    for line in render_admin_view(current) {
                        println!("{line}");
                    }
                }
            }
            Ok(())
        },
    )
    .await?;

    if let Some(message) = end_message(end, &context.feed_url, context.reconnects()) {
        eprintln!("{message}");
    }
    Ok(())
}

pub fn render_admin_view(incidents: &IncidentCollection) -> Vec<String> {
    let mut lines = vec![String::new(), format_stats_line(incidents.stats())];

    let urgent = incidents.urgent();
    lines.push(format!("Urgent ({}):", urgent.len()));
    if urgent.is_empty() {
        lines.push("  none".to_string());
    } else {
        lines.extend(
            format_incident_lines(urgent.into_iter().take(URGENT_SHOWN))
                .into_iter()
                .map(|line| format!("  {line}")),
        );
    }

    lines.push(format!("All incidents ({}):", incidents.len()));
    lines.extend(
        format_incident_lines(incidents)
            .into_iter()
            .map(|line| format!("  {line}")),
    );
    lines
}
