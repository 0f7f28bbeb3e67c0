use alerta_core::util::is_secure_feed_url;

use crate::cli::ConfigCommands;
use crate::commands::common::AppContext;
use crate::error::CliError;

pub fn run_config(command: ConfigCommands, context: &AppContext) -> Result<(), CliError> {
    match command {
        ConfigCommands::Show => {
            run_config_show(context);
            Ok(())
        }
        ConfigCommands::Set {
            url,
            reconnect_attempts,
        } => run_config_set(context, url, reconnect_attempts),
    }
}

fn run_config_show(context: &AppContext) {
    println!("config file: {}", context.config_path.display());
    println!("data dir:    {}", context.data_dir.display());
    println!(
        "feed url:    {} (from {})",
        context.feed_url,
        context.feed_source.label()
    );
    if !is_secure_feed_url(&context.feed_url) {
        println!("             not wss://, live updates disabled (demo mode)");
    }
    match context.config.reconnect {
        Some(policy) => println!(
            "reconnect:   up to {} attempts, {}-{} ms backoff",
            policy.max_attempts, policy.initial_delay_ms, policy.max_delay_ms
        ),
        None => println!("reconnect:   off"),
    }
}

fn run_config_set(
    context: &AppContext,
    feed_url: Option<String>,
    reconnect_attempts: Option<u32>,
) -> Result<(), CliError> {
    if feed_url.is_none() && reconnect_attempts.is_none() {
        return Err(CliError::Config(
            "Nothing to set. Pass --url and/or --reconnect-attempts.".to_string(),
        ));
    }

    let mut config = context.config.clone();
    if let Some(url) = feed_url {
        let url = url.trim().to_string();
        if !url.is_empty() && !is_secure_feed_url(&url) {
            return Err(CliError::Config(format!(
                "feed_url must use wss:// (got {url})"
            )));
        }
        config.feed_url = Some(url);
    }
    if let Some(attempts) = reconnect_attempts {
        config.set_reconnect_attempts(attempts);
    }

    config.save_to_path(&context.config_path)?;
    println!("Saved {}", context.config_path.display());
    Ok(())
}
