use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use foliod::config::Config;
use foliod::github::{CommitOrchestrator, HttpTransport};
use foliod::llm::OpenAiClient;
use foliod::server::{serve, AppState};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            std::process::exit(1);
        }
    };

    // Secrets are required up front; a missing one should fail the process,
    // not the first request.
    let (api_key, token) = match (config.llm_api_key(), config.github_token()) {
        (Ok(api_key), Ok(token)) => (api_key, token),
        (Err(e), _) | (_, Err(e)) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let chat_client = match OpenAiClient::new(
        config.llm.api_url.clone(),
        api_key,
        config.llm.model.clone(),
    ) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Error creating LLM client: {e}");
            std::process::exit(1);
        }
    };

    let transport = match HttpTransport::new(config.github.api_url.clone(), token) {
        Ok(transport) => transport,
        Err(e) => {
            eprintln!("Error creating GitHub transport: {e}");
            std::process::exit(1);
        }
    };

    let orchestrator = CommitOrchestrator::new(
        Arc::new(transport),
        config.github.owner.clone(),
        config.github.repo.clone(),
        config.github.branch.clone(),
    );

    let bind_addr = config.server.bind_addr.clone();
    let state = AppState {
        config: Arc::new(config),
        chat_client: Arc::new(chat_client),
        orchestrator: Arc::new(orchestrator),
    };

    if let Err(e) = serve(state, &bind_addr).await {
        tracing::error!(error = %e, "HTTP server exited with error");
        std::process::exit(1);
    }
}
