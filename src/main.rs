use anyhow::Context;
use policy_analyzer::{
    build_app,
    cli::{commands, init, output::Output, Cli, Commands},
    utils::toml_config::ServerConfig,
    AppState, PolicyConfigManager,
};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing(server: &ServerConfig, verbose: bool) {
    let default_level = if verbose { "debug" } else { server.log_level.as_str() };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},tower_http=info", default_level)));

    let registry = tracing_subscriber::registry().with(filter);
    if server.log_format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn serve(config_manager: Arc<PolicyConfigManager>, output: &Output) -> anyhow::Result<()> {
    let config = config_manager.config();

    if let Err(e) = config_manager.start_watching() {
        tracing::warn!("Config hot reload disabled: {}", e);
    }

    let state = AppState::from_config(Arc::clone(&config_manager))
        .context("Failed to initialize application state")?;
    let app = build_app(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    output.banner();
    output.info(&format!("Form:     http://{}/", addr));
    output.info(&format!("OpenAPI:  http://{}/api-docs/openapi.json", addr));
    #[cfg(feature = "swagger-ui")]
    output.info(&format!("Swagger:  http://{}/swagger-ui/", addr));

    tracing::info!(%addr, work_dir = %config.server.work_dir.display(), "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down");
        })
        .await
        .context("Server error")?;

    config_manager.stop_watching();
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();
    let output = if cli.no_color {
        Output::no_color()
    } else {
        Output::new()
    };

    // init does not need (and must not require) an existing config
    if let Some(Commands::Init { path, force }) = &cli.command {
        return match init::run(
            init::InitConfig {
                path: path.clone(),
                force: *force,
            },
            &output,
        ) {
            init::InitResult::Success => ExitCode::SUCCESS,
            init::InitResult::AlreadyExists | init::InitResult::Error(_) => ExitCode::FAILURE,
        };
    }

    let config_manager = match PolicyConfigManager::new(&cli.config) {
        Ok(manager) => Arc::new(manager),
        Err(e) => {
            output.error(&format!("Failed to load {}: {}", cli.config.display(), e));
            return ExitCode::FAILURE;
        }
    };

    init_tracing(&config_manager.config().server, cli.verbose);

    let result = match cli.command {
        None | Some(Commands::Serve) => serve(config_manager, &output).await.map(|_| true),
        Some(Commands::Analyze { url, file, api_key }) => {
            commands::analyze(config_manager, url, file, api_key).await
        }
        Some(Commands::Chunks { path, word_length }) => {
            commands::chunks(&config_manager.config(), &path, word_length, &output).map(|_| true)
        }
        Some(Commands::Config { validate, toml }) => {
            commands::config(&config_manager, validate, toml, &output).map(|_| true)
        }
        Some(Commands::Init { .. }) => Ok(true),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            output.error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}
