use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} não definido")]
    Missing(&'static str),

    #[error("valor inválido para {key}: '{value}'")]
    Invalid { key: &'static str, value: String },
}

/// Why a chat line could not be turned into a command. The Display text is
/// sent back to the chat as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Mensagem não é um comando.")]
    NotACommand,

    #[error("Comando desconhecido. Use /help para ver os comandos disponíveis.")]
    UnknownCommand(String),

    #[error("Formato incorreto. Use:\n{0}")]
    Usage(&'static str),

    #[error("Erro: A observação deve estar entre aspas duplas.")]
    MissingQuotes,

    #[error("Erro: A quantidade deve ser um número válido (use ponto para decimais).")]
    InvalidNumber(String),

    #[error("Erro: A data deve estar no formato YYYY-MM-DD.")]
    InvalidDate(String),

    #[error("Erro: O parâmetro 'retirada' deve ser 'true' ou 'false'.")]
    InvalidWithdrawFlag(String),
}

#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("acesso negado pela API, status: {status}")]
    Unauthorized { status: u16 },

    #[error("registro não encontrado, status: 404 ({body})")]
    NotFound { body: String },

    #[error("erro na resposta da API, status: {status} ({body})")]
    Rejected { status: u16, body: String },

    #[error("falha de comunicação com a API: {0}")]
    Network(#[from] reqwest::Error),

    #[error("resposta inválida da API: {0}")]
    Decode(String),
}

/// Failures that abort a whole import before any row reaches the API.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImportError {
    #[error("O arquivo Excel não contém dados suficientes.")]
    InsufficientData,

    #[error("Colunas obrigatórias não encontradas: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Formato de arquivo não suportado: '{0}'. Envie um arquivo .xlsx ou .csv.")]
    UnsupportedFile(String),

    #[error("Erro ao ler a planilha: {0}")]
    Unreadable(String),
}

/// A single spreadsheet row that could not be turned into a ledger entry.
#[derive(Error, Debug)]
pub enum RowError {
    #[error("Dados insuficientes")]
    InsufficientRowData,

    #[error("Formato de data inválido '{0}'")]
    InvalidDate(String),

    #[error("Valor de segundos inválido '{0}'")]
    InvalidAmount(String),

    #[error(transparent)]
    Remote(#[from] RemoteError),
}
