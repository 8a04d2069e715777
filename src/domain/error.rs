//! Domain error types.

/// A parse error with position information for command parsing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("parse error at position {position}: {message}")]
pub struct ParseError {
    pub message: String,
    pub position: usize,
}

impl ParseError {
    /// Format the error with a caret pointing at the error position in the input.
    pub fn display_with_context(&self, input: &str) -> String {
        let column = input
            .char_indices()
            .take_while(|(i, _)| *i < self.position)
            .count();
        let caret = " ".repeat(column) + "^";
        format!(
            "{input}\n{caret}\n{err}",
            input = input,
            caret = caret,
            err = self
        )
    }
}

/// Top-level error type for investiq.
#[derive(Debug, thiserror::Error)]
pub enum InvestiqError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    CommandParse(#[from] ParseError),

    #[error("{reason}")]
    Provider { reason: String },

    #[error("no price data found for {symbol}")]
    NoData { symbol: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl InvestiqError {
    pub fn provider(reason: impl Into<String>) -> Self {
        Self::Provider {
            reason: reason.into(),
        }
    }
}

impl From<&InvestiqError> for std::process::ExitCode {
    fn from(err: &InvestiqError) -> Self {
        let code: u8 = match err {
            InvestiqError::Io(_) => 1,
            InvestiqError::ConfigParse { .. }
            | InvestiqError::ConfigMissing { .. }
            | InvestiqError::ConfigInvalid { .. } => 2,
            InvestiqError::Provider { .. } => 3,
            InvestiqError::CommandParse(_) => 4,
            InvestiqError::NoData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

/// Failure of a single command request, tagged by where it went wrong.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error(
        "Invalid query format. Please use 'Buy {{symbol}} if price goes below {{price}}' or 'Sell {{symbol}} if price goes above {{price}}'."
    )]
    Parse(#[source] ParseError),

    #[error("Error fetching stock data for {symbol}: {reason}")]
    PriceFetch { symbol: String, reason: String },

    #[error("Error processing the query: {0}")]
    Unexpected(String),
}

impl CommandError {
    /// Stable tag reported alongside the message.
    pub fn kind(&self) -> &'static str {
        match self {
            CommandError::Parse(_) => "invalid_query",
            CommandError::PriceFetch { .. } => "price_fetch_error",
            CommandError::Unexpected(_) => "unexpected_error",
        }
    }
}

impl From<&CommandError> for std::process::ExitCode {
    fn from(err: &CommandError) -> Self {
        let code: u8 = match err {
            CommandError::Unexpected(_) => 1,
            CommandError::PriceFetch { .. } => 3,
            CommandError::Parse(_) => 4,
        };
        std::process::ExitCode::from(code)
    }
}

impl From<ParseError> for CommandError {
    fn from(err: ParseError) -> Self {
        CommandError::Parse(err)
    }
}
