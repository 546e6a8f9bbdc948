use std::sync::Arc;

use anyhow::{Context, Result};
use holiday::config::SiteConfig;
use holiday::database::{ContentStore, MemoryStore, SqlStore};
use holiday::i18n::Translations;
use holiday::servers::web::WebState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_ansi(std::io::IsTerminal::is_terminal(&std::io::stderr()))
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut conf_file = "conf/site.yaml".to_string();
    let mut memory = false;

    let args: Vec<String> = std::env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "--h" | "--?" | "/?" => {
                println!("Usage: web_server [--conf FILE] [--memory]");
                println!("  --memory   keep content in process instead of MySQL");
                return Ok(());
            }
            "--conf" => {
                if i + 1 < args.len() {
                    i += 1;
                    conf_file = args[i].clone();
                } else {
                    eprintln!("Error: --conf requires a FILE argument");
                    return Ok(());
                }
            }
            "--memory" => memory = true,
            other => {
                eprintln!("Warning: ignoring unknown argument {}", other);
            }
        }
        i += 1;
    }

    let config = SiteConfig::from_file(&conf_file)
        .with_context(|| format!("Cannot load config: {}", conf_file))?;

    let store: Arc<dyn ContentStore> = if memory {
        tracing::warn!("[web] [memory] content is not persisted");
        Arc::new(MemoryStore::new())
    } else {
        let sql = SqlStore::connect(&config)
            .await
            .with_context(|| format!("Cannot connect to DB: {}", config.sql_ip))?;
        sql.migrate().await.context("Cannot apply migrations")?;
        Arc::new(sql)
    };

    let translations = Translations::embedded().context("Cannot load translations")?;
    for key in translations.mismatched_keys() {
        tracing::warn!("[i18n] [untranslated] {}", key);
    }

    let bind = config.bind_addr();
    let state = WebState::new(config, store, translations).context("Cannot set up sessions")?;

    tracing::info!("[web] [started] Website Started");
    state.run(&bind).await?;
    Ok(())
}
