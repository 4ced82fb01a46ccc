//! 配線: 標準アダプタで UseCase を組み立てる

use std::sync::Arc;

use common::adapter::{FileJsonLog, NoopLog, StdClock, StdEnvResolver, StdFileSystem, StderrLog, TeeLog};
use common::error::Error;
use common::gateway::GatewayClient;
use common::ports::outbound::{Clock, EnvResolver, FileSystem, Log, LogLevel, LogRecord};

use crate::adapter::{
    load_console_config, ConsoleConfig, HttpCatalog, HttpOptionStore, HttpTaskLog, NoopInterruptChecker,
    SigintChecker, SseChatStream,
};
use crate::domain::PlaygroundConfig;
use crate::ports::outbound::InterruptChecker;
use crate::usecase::{CatalogUseCase, ChatUseCase, SettingsUseCase, TaskLogUseCase};

/// main が使う UseCase 一式
pub struct App {
    pub logger: Arc<dyn Log>,
    pub chat: ChatUseCase,
    pub catalog: CatalogUseCase,
    pub settings: SettingsUseCase,
    pub tasks: TaskLogUseCase,
}

fn build_logger(fs: &Arc<dyn FileSystem>, env: &dyn EnvResolver, verbose: bool) -> Arc<dyn Log> {
    let file: Arc<dyn Log> = match env.resolve_home_dir() {
        Ok(home) => Arc::new(FileJsonLog::new(Arc::clone(fs), home.log_file())),
        Err(_) => Arc::new(NoopLog),
    };
    if verbose {
        Arc::new(TeeLog::new(vec![file, Arc::new(StderrLog::new(LogLevel::Debug))]))
    } else {
        file
    }
}

/// ホームが解決できない場合は既定値（GWC_BASE_URL だけは効く）
fn resolve_config(fs: &dyn FileSystem, env: &dyn EnvResolver) -> Result<ConsoleConfig, Error> {
    match env.resolve_home_dir() {
        Ok(home) => load_console_config(&home, fs, env),
        Err(_) => Ok(ConsoleConfig {
            base_url: env
                .base_url_override()
                .unwrap_or_else(|| common::gateway::client::DEFAULT_BASE_URL.to_string()),
            token: env.var(crate::adapter::config::DEFAULT_TOKEN_ENV),
            playground: PlaygroundConfig::default(),
        }),
    }
}

/// 配線: 標準アダプタで App を組み立てる
pub fn wire_gwc(verbose: bool) -> Result<App, Error> {
    let fs: Arc<dyn FileSystem> = Arc::new(StdFileSystem);
    let env = StdEnvResolver;
    let clock: Arc<dyn Clock> = Arc::new(StdClock);
    let logger = build_logger(&fs, &env, verbose);

    let config = resolve_config(fs.as_ref(), &env)?;
    let _ = logger.log(
        &LogRecord::new(LogLevel::Debug, "config resolved")
            .layer("wiring")
            .kind("lifecycle")
            .field("base_url", config.base_url.clone())
            .field("token", config.token.is_some())
            .field("model", config.playground.model.to_string()),
    );
    let client = GatewayClient::new(config.base_url.clone(), config.token.clone())?;

    let interrupt: Arc<dyn InterruptChecker> = match SigintChecker::new() {
        Ok(c) => Arc::new(c),
        Err(e) => {
            let _ = logger.log(
                &LogRecord::new(LogLevel::Warn, "SIGINT handler not installed")
                    .layer("wiring")
                    .kind("lifecycle")
                    .field("error", e.to_string()),
            );
            Arc::new(NoopInterruptChecker)
        }
    };

    let chat = ChatUseCase::new(
        config.playground,
        Arc::new(SseChatStream::new(client.clone(), Arc::clone(&logger))),
        clock,
        Arc::clone(&fs),
        interrupt,
        Arc::clone(&logger),
    );
    let catalog = CatalogUseCase::new(Arc::new(HttpCatalog::new(client.clone())), Arc::clone(&logger));
    let settings = SettingsUseCase::new(Arc::new(HttpOptionStore::new(client.clone())), Arc::clone(&logger));
    let tasks = TaskLogUseCase::new(Arc::new(HttpTaskLog::new(client)));

    Ok(App {
        logger,
        chat,
        catalog,
        settings,
        tasks,
    })
}
