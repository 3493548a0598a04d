use chrono::NaiveDate;

use crate::dates;
use crate::error::ParseError;
use crate::pontomais::TimeBalanceEntry;

pub const CRIAR_USAGE: &str = "/criar <ID_funcionário> <quantidade_segundos> <data> <observação> <retirada>\n\nExemplo:\n/criar 1487972 3600.0 2023-05-15 \"1 hora de trabalho\" false";
pub const EDITAR_USAGE: &str = "/editar <ID> <quantidade_segundos> <data> <observação> <retirada>\n\nExemplo:\n/editar 3833376 60.0 2025-03-18 \"Editando lançamento\" false";

/// Command names and descriptions, in menu order.
pub const COMMAND_MENU: &[(&str, &str)] = &[
    ("start", "Inicia o bot"),
    ("help", "Mostra a ajuda"),
    ("listar", "Lista os colaboradores ativos"),
    ("criar", "Cria um lançamento no banco de horas"),
    ("editar", "Edita um lançamento do banco de horas"),
    ("relatorio", "Importa lançamentos de uma planilha"),
    ("cancelar", "Cancela o envio de planilha pendente"),
];

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Start,
    Help,
    Listar,
    Criar(EntryArgs),
    Editar(EntryArgs),
    Relatorio,
    Cancelar,
}

/// Arguments shared by `/criar` and `/editar`. `target_id` is the employee
/// for a create and the ledger entry for an edit.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryArgs {
    pub target_id: String,
    pub amount_seconds: f64,
    pub date: NaiveDate,
    pub observation: String,
    pub withdraw: bool,
}

impl EntryArgs {
    pub fn to_entry(&self, employee_id: Option<String>) -> TimeBalanceEntry {
        TimeBalanceEntry {
            employee_id,
            amount_seconds: self.amount_seconds,
            date: self.date,
            observation: self.observation.clone(),
            withdraw: self.withdraw,
        }
    }

    /// The date as the user typed it.
    pub fn input_date(&self) -> String {
        dates::ISO.format(self.date)
    }
}

pub fn parse(raw: &str) -> Result<Command, ParseError> {
    let text = raw.trim();
    let (head, rest) = next_token(text).ok_or(ParseError::NotACommand)?;
    let name = head.strip_prefix('/').ok_or(ParseError::NotACommand)?;
    // "/criar@PontoGoBot" addresses this bot explicitly in group chats.
    let name = name.split('@').next().unwrap_or(name);

    match name {
        "start" => Ok(Command::Start),
        "help" => Ok(Command::Help),
        "listar" => Ok(Command::Listar),
        "relatorio" => Ok(Command::Relatorio),
        "cancelar" => Ok(Command::Cancelar),
        "criar" => parse_entry_args(rest, CRIAR_USAGE).map(Command::Criar),
        "editar" => parse_entry_args(rest, EDITAR_USAGE).map(Command::Editar),
        other => Err(ParseError::UnknownCommand(other.to_string())),
    }
}

/// `<id> <seconds> <YYYY-MM-DD> "<observation>" <true|false>`
fn parse_entry_args(args: &str, usage: &'static str) -> Result<EntryArgs, ParseError> {
    let (target_id, rest) = next_token(args).ok_or(ParseError::Usage(usage))?;
    let (amount, rest) = next_token(rest).ok_or(ParseError::Usage(usage))?;
    let (date, remainder) = next_token(rest).ok_or(ParseError::Usage(usage))?;
    if remainder.is_empty() {
        return Err(ParseError::Usage(usage));
    }

    let amount_seconds = amount
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ParseError::InvalidNumber(amount.to_string()))?;

    let date = dates::ISO.parse(date).ok_or_else(|| ParseError::InvalidDate(date.to_string()))?;

    let (observation, flag) = split_observation(remainder)?;
    let withdraw = match flag {
        "true" => true,
        "false" => false,
        other => return Err(ParseError::InvalidWithdrawFlag(other.to_string())),
    };

    Ok(EntryArgs {
        target_id: target_id.to_string(),
        amount_seconds,
        date,
        observation: observation.to_string(),
        withdraw,
    })
}

/// Text between the first and last `"`, plus the trimmed text after the last.
fn split_observation(remainder: &str) -> Result<(&str, &str), ParseError> {
    let first = remainder.find('"').ok_or(ParseError::MissingQuotes)?;
    let last = remainder.rfind('"').ok_or(ParseError::MissingQuotes)?;
    if first == last {
        return Err(ParseError::MissingQuotes);
    }
    Ok((&remainder[first + 1..last], remainder[last + 1..].trim()))
}

/// Split off the next whitespace-delimited token; the rest keeps its inner
/// spacing so quoted observations survive intact.
fn next_token(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_start();
    if s.is_empty() {
        return None;
    }
    match s.find(char::is_whitespace) {
        Some(idx) => Some((&s[..idx], s[idx..].trim_start())),
        None => Some((s, "")),
    }
}
