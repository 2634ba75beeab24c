use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let initial_url = std::env::var("TASKHUB_INITIAL_URL").unwrap_or_else(|_| "/".to_owned());
    let (engine, events) = taskhub_client::start_client(&initial_url)?;

    let mut events = events.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            tracing::debug!(event = ?event, "client event");
        }
    });

    match engine.user_profile().await {
        Ok(profile) => tracing::info!(user = %profile.name, "profile loaded"),
        Err(err) => tracing::warn!(error = %err, "profile unavailable"),
    }

    let header = engine.header_snapshot().await?;
    tracing::info!(
        rev = header.rev,
        workspaces = header.workspaces.len(),
        selected = header.selected_workspace.map(|w| w.name).as_deref(),
        "header ready"
    );
    Ok(())
}
