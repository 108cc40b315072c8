use clap::Parser; // for cli
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use code_review_gateway::{
    AppState,
    completion::OpenAiClient,
    config::{Args, describe_window},
    router,
    state::CredentialSource,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // parse cli arguments
    let args = Args::parse();
    let policy = args.policy();

    let completion = OpenAiClient::new(
        reqwest::Client::new(),
        &args.api_base_url,
        &args.model,
        args.max_tokens,
    );

    info!(
        profile = ?args.profile,
        human_quota = policy.effective_quota(false),
        bot_quota = policy.effective_quota(true),
        window = %describe_window(policy.window),
        "rate limit policy"
    );
    info!(url = %args.api_base_url, model = %args.model, "forwarding reviews");

    // creating shared state
    let state = Arc::new(AppState::new(
        policy,
        Arc::new(completion),
        CredentialSource::Env(args.api_key_env.clone()),
    ));

    let app = router(state);

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Gateway running on http://localhost:{}", args.port);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}
