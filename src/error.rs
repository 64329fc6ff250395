use derive_more::{Display, Error};

#[derive(Debug, Display, Error)]
pub enum ConfigError {
    #[display("failed to read config file")]
    ReadFile,
    #[display("failed to parse config: {reason}")]
    Parse { reason: String },
    #[display("invalid config: {field}")]
    Validation { field: String },
}

/// Failures of the market-data collaborator. Kept apart from computation
/// errors so the shell can tell "could not get data" from anything else.
#[derive(Debug, Display, Error)]
pub enum FetchError {
    #[display("request to {endpoint} failed")]
    Request { endpoint: String },
    #[display("{endpoint} responded with HTTP {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },
    #[display("failed to parse response from {endpoint}")]
    ResponseParse { endpoint: String },
    #[display("symbol {symbol} not found in coin list")]
    SymbolNotFound { symbol: String },
    #[display("coin {coin_id} not found")]
    CoinNotFound { coin_id: String },
    #[display("price series from {endpoint} is malformed")]
    MalformedSeries { endpoint: String },
}

#[derive(Debug, Display, Error)]
pub enum SeriesError {
    #[display("timestamps not strictly increasing at index {index}")]
    Unordered { index: usize },
    #[display("non-finite price at index {index}")]
    NonFinitePrice { index: usize },
}

#[derive(Debug, Display, Error)]
pub enum IndicatorError {
    #[display("invalid parameter: {name}")]
    InvalidParameter { name: String },
}

#[derive(Debug, Display, Error)]
pub enum ExportError {
    #[display("failed to write figure")]
    Figure,
    #[display("failed to write alert summary")]
    Summary,
}
