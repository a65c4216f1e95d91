use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use heritxr::config::{self, Config, DatabaseConfig, LlmConfig, PersonaConfig};
use heritxr::persona::{LlmPersonaGenerator, PersonaPipeline, PersonaService, RawVisitorInput};
use heritxr::server::{self, AppState};

#[derive(Parser)]
#[command(name = "heritxr", version, about = "Visitor persona and guide queue service")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default).
    Serve,

    /// Apply the database schema and exit.
    Migrate,

    /// Run the persona pipeline once and print the outcome as JSON.
    /// Nothing is written to the database.
    Persona {
        /// JSON file with the raw visitor profile.
        #[arg(long)]
        input: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    config::load_dotenv();
    init_tracing();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve().await,
        Command::Migrate => {
            let db_config = DatabaseConfig::resolve()?;
            heritxr::db::connect_from_config(&db_config).await?;
            tracing::info!(path = %db_config.libsql_path.display(), "Schema applied");
            Ok(())
        }
        Command::Persona { input } => {
            let raw = std::fs::read_to_string(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            let raw: RawVisitorInput = serde_json::from_str(&raw)
                .with_context(|| format!("parsing {}", input.display()))?;

            let pipeline = build_pipeline(&LlmConfig::resolve()?, PersonaConfig::resolve()?)?;
            let run = pipeline.run(raw).await?;
            println!("{}", serde_json::to_string_pretty(&run)?);
            Ok(())
        }
    }
}

async fn serve() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    let addr = config.server.socket_addr()?;

    let db = heritxr::db::connect_from_config(&config.database).await?;
    let pipeline = build_pipeline(&config.llm, config.persona.clone())?;
    let persona = Arc::new(PersonaService::new(pipeline, db.clone()));
    let state = Arc::new(AppState::new(db, persona, config.server, &config.tokens));

    server::serve(addr, state, async {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("Shutdown signal received");
    })
    .await?;
    Ok(())
}

fn build_pipeline(llm: &LlmConfig, persona: PersonaConfig) -> anyhow::Result<PersonaPipeline> {
    let provider = heritxr::llm::create_llm_provider(llm, &persona.model)?;
    let generator = Arc::new(LlmPersonaGenerator::new(provider, persona.temperature));
    Ok(PersonaPipeline::new(generator, persona))
}

/// `RUST_LOG` filters; `HERITXR_LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let json = std::env::var("HERITXR_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("heritxr=info,tower_http=info")),
        )
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(|| tracing_subscriber::fmt::layer().with_target(false)))
        .init();
}
