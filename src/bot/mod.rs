pub mod commands;
pub mod handlers;
pub mod parser;

use std::sync::Arc;
use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::dptree;
use teloxide::prelude::*;
use teloxide::types::BotCommand;

use crate::config::AppConfig;
use crate::import::BatchImporter;
use crate::pontomais::HrApi;
use crate::session::SessionStore;

pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;
pub type HandlerResult = Result<(), HandlerError>;

/// Shared application state, accessible from all handlers.
pub struct AppState {
    pub config: AppConfig,
    pub hr: Arc<dyn HrApi>,
    pub sessions: SessionStore,
    pub importer: BatchImporter,
}

impl AppState {
    pub fn new(config: AppConfig, hr: Arc<dyn HrApi>) -> Self {
        let importer = BatchImporter::new(config.import_row_delay);
        Self {
            config,
            hr,
            sessions: SessionStore::new(),
            importer,
        }
    }
}

/// Build the teloxide update handler tree.
pub fn build_handler() -> UpdateHandler<HandlerError> {
    let message_handler = Update::filter_message().endpoint(handlers::handle_message);

    dptree::entry().branch(message_handler)
}

/// Commands shown in the Telegram command menu.
pub fn menu_commands() -> Vec<BotCommand> {
    parser::COMMAND_MENU
        .iter()
        .map(|(name, description)| BotCommand::new(*name, *description))
        .collect()
}
