use actix_web::{web, App, HttpServer};
use anyhow::Result;
use std::sync::Arc;

use service_assistant::{api, IntentResolver, KnowledgeBase, SessionStore, Settings};

#[actix_web::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = Settings::load("Config")?;

    let knowledge = match &settings.data.knowledge_file {
        Some(path) => match KnowledgeBase::load_from_file(path) {
            Ok(base) => base,
            Err(e) => {
                log::error!("Could not load knowledge file {:?}: {:#}", path, e);
                return Err(e);
            }
        },
        None => KnowledgeBase::builtin(),
    };

    log::info!(
        "Initializing virtual assistant with {} knowledge entries...",
        knowledge.entries().len()
    );
    let resolver = Arc::new(IntentResolver::new(Arc::new(knowledge)));
    let store = web::Data::new(SessionStore::with_limits(
        resolver,
        settings.thinking_delay(),
        settings.session_limits(),
    ));

    let host = settings.server.host.clone();
    let port = settings.server.port;

    log::info!("Starting server at http://{}:{}", host, port);
    HttpServer::new(move || App::new().app_data(store.clone()).configure(api::configure))
        .bind((host, port))?
        .run()
        .await?;
    Ok(())
}
