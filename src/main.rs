use clap::Parser;
use clap::Subcommand;
use ragserve::config::AppConfig;
use ragserve::Result;
use tracing::info;

#[derive(Parser)]
#[command(name = "ragserve")]
#[command(about = "RAG service over Postgres/pgvector with pluggable LLM backends")]
#[command(version)]
struct Cli {
    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
        /// Disable CORS even if the config enables it
        #[arg(long)]
        no_cors: bool,
    },
    /// Load JSON document files into a running server
    Load {
        /// Directory containing *.json files of {content, metadata} records
        dir: String,
        /// Base URL of the running server
        #[arg(long, default_value = "http://localhost:8000")]
        endpoint: String,
        /// Documents per upload batch
        #[arg(long, default_value_t = ragserve::loader::DEFAULT_BATCH_SIZE)]
        batch_size: usize,
    },
    /// Run a one-shot retrieval query against a running server
    Query {
        /// The question to search for
        question: String,
        /// Number of documents to retrieve
        #[arg(short, long, default_value = "3")]
        k: usize,
        /// Base URL of the running server
        #[arg(long, default_value = "http://localhost:8000")]
        endpoint: String,
    },
    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        ragserve::logging::init_logging_with_level("debug")?;
    } else {
        ragserve::logging::init_logging()?;
    }

    // Load configuration (file + environment overrides)
    let config = AppConfig::load()?;
    info!("Configuration loaded successfully");

    match cli.command {
        Commands::Serve { host, port, no_cors } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            let enable_cors = config.server.enable_cors && !no_cors;
            ragserve::api::serve_api(&config, host, port, enable_cors).await?;
        }
        Commands::Load {
            dir,
            endpoint,
            batch_size,
        } => {
            let report =
                ragserve::loader::load_directory(std::path::Path::new(&dir), &endpoint, batch_size)
                    .await?;
            if report.batches_failed > 0 {
                println!("⚠️  {} batches failed; see logs", report.batches_failed);
            } else {
                println!("✅ All documents loaded");
            }
        }
        Commands::Query {
            question,
            k,
            endpoint,
        } => {
            handle_query_command(&question, k, &endpoint).await?;
        }
        Commands::Config => {
            handle_config_command(&config);
        }
    }

    Ok(())
}

async fn handle_query_command(question: &str, k: usize, endpoint: &str) -> Result<()> {
    use ragserve::api::types::QueryRequest;
    use ragserve::api::types::SearchResponse;

    println!("🔍 Retrieving top {k} documents for: \"{question}\"");

    let client = reqwest::Client::new();
    let response = client
        .post(format!("{endpoint}/retrieve"))
        .json(&QueryRequest {
            question: question.to_string(),
            k,
            conversation_history: None,
        })
        .send()
        .await
        .map_err(|e| ragserve::RagServeError::Http(format!("Cannot reach {endpoint}: {e}")))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(ragserve::RagServeError::Http(format!(
            "Server error ({status}): {body}"
        )));
    }

    let result: SearchResponse = response
        .json()
        .await
        .map_err(|e| ragserve::RagServeError::Http(e.to_string()))?;

    println!("Found {} documents:", result.count);
    for (idx, doc) in result.results.iter().enumerate() {
        let preview: String = doc.content.chars().take(120).collect();
        println!();
        println!("  {}. similarity {:.3}", idx + 1, doc.similarity);
        println!("     {preview}");
        if !doc.metadata.is_null() && doc.metadata != serde_json::json!({}) {
            println!("     metadata: {}", doc.metadata);
        }
    }

    Ok(())
}

fn handle_config_command(config: &AppConfig) {
    println!("📋 ragserve Configuration:");
    println!();

    println!("🗄️  Database:");
    println!("  URL: {}", mask_database_url(config.database_url()));
    println!("  Max connections: {}", config.max_connections());
    println!("  Min connections: {}", config.min_connections());
    println!("  Connection timeout: {}s", config.connection_timeout());
    println!();

    println!("🌐 Server:");
    println!("  Host: {}", config.server.host);
    println!("  Port: {}", config.server.port);
    println!("  CORS: {}", config.server.enable_cors);
    println!();

    println!("📚 Store:");
    println!("  Collection: {}", config.collection_name());
    println!("  Vector index: {}", config.store.enable_vector_index);
    println!();

    println!("🧠 Embeddings:");
    println!("  Provider: {}", config.embeddings.provider);
    println!("  Model: {}", config.embedding_model());
    println!("  Dimension: {}", config.embedding_dimension());
    println!();

    println!("💬 LLM:");
    println!("  Provider: {}", config.llm_provider());
    match config.llm_provider() {
        ragserve::config::LlmProvider::OpenAi => {
            println!("  Model: {}", config.llm.openai.model);
            println!("  Temperature: {}", config.llm.openai.temperature);
            println!(
                "  API key: {}",
                if config.llm.openai.api_key.is_some() { "set" } else { "NOT SET" }
            );
        }
        ragserve::config::LlmProvider::Ollama => {
            println!("  Base URL: {}", config.llm.ollama.base_url);
            println!("  Model: {}", config.llm.ollama.model);
        }
        ragserve::config::LlmProvider::Local => {
            println!(
                "  Model path: {}",
                config.llm.local.model_path.as_deref().unwrap_or("NOT SET")
            );
            println!(
                "  Adapter path: {}",
                config.llm.local.adapter_path.as_deref().unwrap_or("none")
            );
            println!("  Device: {}", config.llm.local.device);
            println!("  Runtime endpoint: {}", config.llm.local.runtime_endpoint);
            println!("  Max new tokens: {}", config.llm.local.max_new_tokens);
        }
    }
}

/// Mask database URL for logging (hide password)
fn mask_database_url(url: &str) -> String {
    if let Ok(parsed) = url::Url::parse(url) {
        if let Some(host) = parsed.host_str() {
            format!(
                "{}://{}@{}:{}",
                parsed.scheme(),
                parsed.username(),
                host,
                parsed.port().unwrap_or(5432)
            )
        } else {
            "***masked***".to_string()
        }
    } else {
        "***invalid***".to_string()
    }
}
