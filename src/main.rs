use clap::Parser;
use simple_cards::config::LogFormat;
use simple_cards::core::{ModuleDraft, ModuleStore, QuizletModuleParser};
use simple_cards::utils::{logger, validation::Validate};
use simple_cards::{App, AppConfig, CliConfig, Command, JsonFileModuleStore, QuizletParser};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::default(),
    };
    cli.apply_to(&mut config);

    // 初始化日誌
    match config.logging.format {
        LogFormat::Compact => logger::init_cli_logger(cli.verbose, config.logging.filter.as_deref()),
        LogFormat::Json => logger::init_json_logger(cli.verbose, config.logging.filter.as_deref()),
    }

    tracing::info!("Starting simple-cards CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // 驗證配置
    if let Err(e) = config.validate().and_then(|_| cli.validate()) {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    let store: Arc<dyn ModuleStore> = Arc::new(JsonFileModuleStore::new(&config.storage.data_dir));
    let parser = Arc::new(QuizletParser::with_settings(config.quizlet_settings())?);

    match cli.command {
        Command::ParseQuizlet { module_id } => {
            let cards = parser
                .parse(module_id.trim(), &CancellationToken::new())
                .await?;
            for card in &cards {
                println!("{}\t{}", card.front, card.back);
            }
            tracing::info!("✅ {} cards parsed", cards.len());
        }
        Command::List { user } => {
            for module in store.list_modules(user).await? {
                println!("{}\t{}", module.uuid, module.name);
            }
        }
        Command::Show { user, module } => {
            let stored = store.get_module_with_cards(user, module).await?;
            println!("{} ({} cards)", stored.module.name, stored.cards.len());
            for card in &stored.cards {
                println!("{}\t{}", card.term, card.meaning);
            }
        }
        Command::ImportCsv { user, name, file } => {
            let reader = std::fs::File::open(&file)?;
            let app = App::new(&config, Arc::clone(&store), parser);
            app.start();
            app.modules()
                .queue_csv_module_import(ModuleDraft::new(name.trim(), user), reader)
                .await?;
            finish_imports(&app, store.as_ref(), user).await?;
        }
        Command::ImportQuizlet {
            user,
            name,
            module_id,
        } => {
            let app = App::new(&config, Arc::clone(&store), parser);
            app.start();
            app.modules()
                .queue_quizlet_module_import(ModuleDraft::new(name.trim(), user), module_id.trim())
                .await?;
            finish_imports(&app, store.as_ref(), user).await?;
        }
    }

    Ok(())
}

/// Runs the queued imports to completion; Ctrl-C cancels them instead.
async fn finish_imports(app: &App, store: &dyn ModuleStore, user: Uuid) -> anyhow::Result<()> {
    let drain = app.drain();
    tokio::pin!(drain);

    tokio::select! {
        _ = &mut drain => {}
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("interrupt received, cancelling imports");
            app.close();
            drain.await;
        }
    }

    let modules = store.list_modules(user).await?;
    tracing::info!("📁 {} module(s) stored for user {}", modules.len(), user);
    println!("📁 {} module(s) stored for user {}", modules.len(), user);

    Ok(())
}
