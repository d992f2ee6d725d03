//! Application wiring and command dispatch

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use validator::Validate;

use crate::api::ApiServer;
use crate::core::banner;
use crate::core::cli::{self, CliConfig, Commands};
use crate::core::config::AppConfig;
use crate::core::constants::{APP_NAME_LOWER, ENV_LOG, SHUTDOWN_TIMEOUT_SECS};
use crate::core::shutdown::ShutdownService;
use crate::core::storage::AppStorage;
use crate::data::SqliteService;
use crate::data::filters::{FilterRequest, QueryCompiler};
use crate::domain::{CatalogGenerator, SearchService, seed_catalog};

pub struct CoreApp {
    pub shutdown: ShutdownService,
    pub config: AppConfig,
    pub storage: AppStorage,
    pub database: Arc<SqliteService>,
    pub search: Arc<SearchService>,
}

impl CoreApp {
    pub async fn run() -> Result<()> {
        dotenvy::dotenv().ok();
        Self::init_logging();

        tracing::debug!("Application starting");

        let (cli_config, command) = cli::parse();
        tracing::trace!(command = ?command, "Parsed command");

        match command {
            Some(Commands::Explain { request }) => Self::explain(&cli_config, &request),
            Some(Commands::Seed { count, reset }) => {
                let app = Self::init(&cli_config).await?;
                let result = app.seed(count, reset).await;
                app.shutdown.shutdown().await;
                result
            }
            Some(Commands::Start) | None => {
                let app = Self::init(&cli_config).await?;
                Self::start_server(app).await
            }
        }
    }

    async fn init(cli: &CliConfig) -> Result<Self> {
        let config = AppConfig::load(cli)?;
        let storage = AppStorage::init(&config).await?;

        let database = Arc::new(
            SqliteService::init(&storage)
                .await
                .context("Failed to open catalog database")?,
        );

        let compiler = QueryCompiler::from_config(&config.catalog, &config.search)?;
        let search = Arc::new(SearchService::new(compiler, Arc::new(database.clone())));
        let shutdown = ShutdownService::new(database.clone());

        Ok(Self {
            shutdown,
            config,
            storage,
            database,
            search,
        })
    }

    /// Compile a request and print the statements; needs no database
    fn explain(cli: &CliConfig, body: &str) -> Result<()> {
        let config = AppConfig::load(cli)?;
        let compiler = QueryCompiler::from_config(&config.catalog, &config.search)?;

        let request: FilterRequest =
            serde_json::from_str(body).context("Request is not valid JSON")?;
        request.validate()?;

        let compiled = compiler
            .compile(&request)
            .map_err(|e| anyhow::anyhow!("{} ({})", e, e.code()))?;
        println!("{}", serde_json::to_string_pretty(&compiled)?);
        Ok(())
    }

    async fn seed(&self, count: usize, reset: bool) -> Result<()> {
        let mut generator = CatalogGenerator::from_entropy();
        let inserted = seed_catalog(&self.database, &mut generator, count, reset).await?;
        println!(
            "Seeded {} products into {}",
            inserted,
            self.storage.database_path().display()
        );
        Ok(())
    }

    fn init_logging() {
        let default_filter = format!("info,{}=info", APP_NAME_LOWER);

        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or(default_filter);

        tracing_subscriber::fmt()
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .with_ansi(true)
            .compact()
            .with_env_filter(filter)
            .init();
    }

    async fn start_server(app: Self) -> Result<()> {
        app.shutdown.install_signal_handlers();

        banner::print_banner(
            &app.config.server.host,
            app.config.server.port,
            &app.storage.database_path().display().to_string(),
        );

        let server = ApiServer::new(app);
        let app = server.start().await?;

        if tokio::time::timeout(
            Duration::from_secs(SHUTDOWN_TIMEOUT_SECS),
            app.shutdown.shutdown(),
        )
        .await
        .is_err()
        {
            tracing::warn!(
                timeout_secs = SHUTDOWN_TIMEOUT_SECS,
                "Shutdown timed out, exiting"
            );
        }

        Ok(())
    }
}
