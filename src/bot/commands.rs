use teloxide::prelude::*;

use crate::bot::parser::{Command, EntryArgs};
use crate::bot::{AppState, HandlerResult};
use crate::pontomais::Employee;
use crate::session::{self, UploadPurpose};

/// Telegram rejects messages longer than 4096 characters.
const MAX_MESSAGE_CHARS: usize = 4000;

pub const HELP_TEXT: &str = r#"Comandos disponíveis:

/start - Inicia o bot
/help - Mostra esta mensagem de ajuda
/listar - Lista todos os colaboradores ativos
/editar <ID> <quantidade_segundos> <data> <observação> <retirada> - Edita o banco de horas de um colaborador
/criar <ID_funcionário> <quantidade_segundos> <data> <observação> <retirada> - Cria um novo lançamento no banco de horas
/relatorio - Permite processar múltiplos lançamentos de banco de horas a partir de um arquivo Excel.
/cancelar - Cancela o envio de planilha pendente

Exemplo de edição:
/editar 59 9000.0 2023-05-15 "2.5 horas extras" false

Exemplo de criação:
/criar 1487972 60.0 2023-05-15 "1 minuto de trabalho" false

Parâmetros:
- ID: ID do registro no banco de horas (para edição)
- ID_funcionário: ID do funcionário (para criação)
- quantidade_segundos: Valor em segundos (use ponto para decimais)
- data: Data no formato YYYY-MM-DD
- observação: Texto entre aspas com o motivo
- retirada: true para retirada, false para adição

Planilha do /relatorio: colunas ID, NOME, DATA, HORAS (em segundos), OBSERVAÇÃO, DEBITO"#;

pub async fn handle_command(
    bot: &Bot,
    msg: &Message,
    cmd: Command,
    state: &AppState,
) -> HandlerResult {
    let chat_id = msg.chat.id.0;
    tracing::info!("Command {:?} from chat {}", cmd, chat_id);

    match cmd {
        Command::Start => {
            let name = msg
                .from
                .as_ref()
                .map(|u| u.first_name.as_str())
                .unwrap_or("");
            bot.send_message(
                msg.chat.id,
                format!(
                    "Olá, {}! Bem-vindo ao PontoGo Bot.\n\nUse /help para ver os comandos disponíveis.",
                    name
                ),
            )
            .await?;
        }

        Command::Help => {
            bot.send_message(msg.chat.id, HELP_TEXT).await?;
        }

        Command::Listar => {
            bot.send_message(msg.chat.id, "Buscando colaboradores...")
                .await?;

            match state.hr.list_employees().await {
                Ok(employees) if employees.is_empty() => {
                    bot.send_message(msg.chat.id, "Nenhum colaborador encontrado.")
                        .await?;
                }
                Ok(employees) => {
                    tracing::info!("Found {} employees", employees.len());
                    for chunk in employee_listing(&employees) {
                        bot.send_message(msg.chat.id, chunk).await?;
                    }
                }
                Err(e) => {
                    tracing::error!("Failed to list employees: {}", e);
                    bot.send_message(
                        msg.chat.id,
                        format!("Erro ao buscar colaboradores: {}", e),
                    )
                    .await?;
                }
            }
        }

        Command::Criar(args) => {
            bot.send_message(
                msg.chat.id,
                "Processando criação do lançamento no banco de horas...",
            )
            .await?;

            let entry = args.to_entry(Some(args.target_id.clone()));
            let reply = match state.hr.create_time_balance_entry(&entry).await {
                Ok(()) => format!(
                    "Lançamento no banco de horas criado com sucesso!\n\nFuncionário ID: {}",
                    entry_summary(&args)
                ),
                Err(e) => {
                    tracing::error!("Failed to create entry for employee {}: {}", args.target_id, e);
                    format!("Erro ao criar o lançamento no banco de horas: {}", e)
                }
            };
            bot.send_message(msg.chat.id, reply).await?;
        }

        Command::Editar(args) => {
            bot.send_message(
                msg.chat.id,
                "Processando atualização do banco de horas...",
            )
            .await?;

            let entry = args.to_entry(None);
            let reply = match state
                .hr
                .update_time_balance_entry(&args.target_id, &entry)
                .await
            {
                Ok(()) => format!(
                    "Banco de horas atualizado com sucesso!\n\nID: {}",
                    entry_summary(&args)
                ),
                Err(e) => {
                    tracing::error!("Failed to update entry {}: {}", args.target_id, e);
                    format!("Erro ao atualizar o banco de horas: {}", e)
                }
            };
            bot.send_message(msg.chat.id, reply).await?;
        }

        Command::Relatorio => {
            state
                .sessions
                .set(chat_id, session::arm(UploadPurpose::Relatorio));
            bot.send_message(
                msg.chat.id,
                "Por favor, envie o arquivo Excel com os dados.",
            )
            .await?;
        }

        Command::Cancelar => {
            bot.send_message(msg.chat.id, "Nenhum envio de planilha pendente.")
                .await?;
        }
    }

    Ok(())
}

/// The tail of a create/edit confirmation, after the ID label.
fn entry_summary(args: &EntryArgs) -> String {
    format!(
        "{}\nQuantidade: {:.2} segundos ({:.2} horas)\nData: {}\nObservação: {}\nRetirada: {}",
        args.target_id,
        args.amount_seconds,
        args.amount_seconds / 3600.0,
        args.input_date(),
        args.observation,
        args.withdraw
    )
}

/// Total followed by one line per employee, split into messages that fit.
fn employee_listing(employees: &[Employee]) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = format!("Total de funcionários: {}\n", employees.len());

    for e in employees {
        let line = format!("\n{} - {}", e.id, e.full_name());
        if current.chars().count() + line.chars().count() > MAX_MESSAGE_CHARS {
            chunks.push(std::mem::take(&mut current));
        }
        current.push_str(&line);
    }
    chunks.push(current);
    chunks
}
