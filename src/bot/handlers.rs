use std::sync::Arc;
use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::Document;

use crate::bot::{commands, parser, AppState, HandlerResult};
use crate::import::{sheet, BatchImporter};
use crate::session::{self, Inbound, Route, UploadPurpose};

pub const UNAUTHORIZED_TEXT: &str = "Você não está autorizado a usar este bot.";
const REPROMPT_TEXT: &str = "Por favor, envie um arquivo Excel (.xlsx).";

/// Entry point for every message: authorization, upload session, then commands.
pub async fn handle_message(bot: Bot, msg: Message, state: Arc<AppState>) -> HandlerResult {
    let chat_id = msg.chat.id.0;

    let inbound = if msg.document().is_some() {
        Inbound::Document
    } else if let Some(text) = msg.text() {
        Inbound::Text(text)
    } else {
        Inbound::Other
    };

    let authorized = state.config.is_authorized(chat_id);
    let (next, route) = session::route(authorized, state.sessions.get(chat_id), inbound);

    if route == Route::Refuse {
        tracing::warn!("Unauthorized access attempt from chat {}", chat_id);
        bot.send_message(msg.chat.id, UNAUTHORIZED_TEXT).await?;
        return Ok(());
    }
    state.sessions.set(chat_id, next);

    match route {
        Route::Refuse => {}

        Route::Command(text) => match parser::parse(text) {
            Ok(cmd) => commands::handle_command(&bot, &msg, cmd, &state).await?,
            Err(e) => {
                tracing::info!("Rejected command from chat {}: {:?}", chat_id, e);
                bot.send_message(msg.chat.id, e.to_string()).await?;
            }
        },

        Route::Import(purpose) => {
            if let Some(doc) = msg.document() {
                handle_document(&bot, &msg, doc, purpose, &state).await?;
            }
        }

        Route::RepromptUpload => {
            bot.send_message(msg.chat.id, REPROMPT_TEXT).await?;
        }

        Route::CancelUpload => {
            tracing::info!("Chat {} cancelled pending upload", chat_id);
            bot.send_message(msg.chat.id, "Envio de planilha cancelado.")
                .await?;
        }

        Route::UnexpectedDocument => {
            bot.send_message(
                msg.chat.id,
                "Use /relatorio antes de enviar a planilha com os lançamentos.",
            )
            .await?;
        }

        Route::Ignore => {
            tracing::debug!("Ignoring non-command message from chat {}", chat_id);
        }
    }

    Ok(())
}

/// Download the uploaded sheet and run it through the importer.
async fn handle_document(
    bot: &Bot,
    msg: &Message,
    doc: &Document,
    purpose: UploadPurpose,
    state: &AppState,
) -> HandlerResult {
    let chat_id = msg.chat.id.0;
    let file_name = doc.file_name.clone().unwrap_or_default();
    tracing::info!(
        "Document '{}' received from chat {} for /{}",
        file_name,
        chat_id,
        purpose.name()
    );

    // A wrong file type keeps the chat waiting for the right one.
    let format = match sheet::SheetFormat::from_file_name(&file_name) {
        Ok(f) => f,
        Err(e) => {
            state.sessions.set(chat_id, session::arm(purpose));
            bot.send_message(msg.chat.id, e.to_string()).await?;
            return Ok(());
        }
    };

    let mut buf = Vec::new();
    let downloaded = match bot.get_file(doc.file.id.clone()).await {
        Ok(file) => bot.download_file(&file.path, &mut buf).await.map_err(|e| e.to_string()),
        Err(e) => Err(e.to_string()),
    };
    if let Err(e) = downloaded {
        tracing::error!("Failed to download document from chat {}: {}", chat_id, e);
        bot.send_message(msg.chat.id, "Erro ao baixar o arquivo.").await?;
        return Ok(());
    }

    let rows = match sheet::read_rows(&buf, format) {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!("Failed to read spreadsheet from chat {}: {}", chat_id, e);
            bot.send_message(msg.chat.id, e.to_string()).await?;
            return Ok(());
        }
    };
    tracing::debug!("Spreadsheet has {} rows", rows.len());

    if let Err(e) = BatchImporter::validate(&rows) {
        tracing::info!("Spreadsheet rejected for chat {}: {}", chat_id, e);
        bot.send_message(msg.chat.id, e.to_string()).await?;
        return Ok(());
    }

    bot.send_message(
        msg.chat.id,
        "Processando lançamentos no banco de horas. Isso pode levar alguns instantes...",
    )
    .await?;

    let reply = match state.importer.import(&rows, state.hr.as_ref()).await {
        Ok(report) => report.render(),
        Err(e) => e.to_string(),
    };
    bot.send_message(msg.chat.id, reply).await?;

    Ok(())
}
