use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Response body of the remote `/portfolio` endpoint.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct PortfolioDocument {
    #[serde(default)]
    pub projects: Option<Vec<Project>>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub cached_at: Option<String>,
}

impl PortfolioDocument {
    /// The remote error, if it reported one. An empty string counts as no error.
    pub fn remote_error(&self) -> Option<&str> {
        self.error.as_deref().filter(|err| !err.trim().is_empty())
    }

    pub fn project_count(&self) -> usize {
        self.projects.as_ref().map_or(0, Vec::len)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Project {
    #[serde(default)]
    pub project_name: String,
    #[serde(default)]
    pub chain: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub total_value: Option<String>,
    #[serde(default)]
    pub sections: Option<Vec<Section>>,
}

/// One section of a project. `section_type` stays a raw string so that tags
/// this crate does not know about still deserialize; see [`SectionKind`].
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Section {
    #[serde(default)]
    pub section_type: String,
    #[serde(default)]
    pub market_name: Option<String>,
    #[serde(default)]
    pub assets: Option<Vec<Asset>>,
    #[serde(default)]
    pub supplied: Option<Vec<Asset>>,
    #[serde(default)]
    pub borrowed: Option<Vec<Asset>>,
}

impl Section {
    pub fn kind(&self) -> Option<SectionKind> {
        SectionKind::parse(&self.section_type)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Asset {
    #[serde(default, deserialize_with = "lenient_text")]
    pub token: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub pool: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub balance: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub amount: Option<f64>,
    #[serde(default, rename = "yield", deserialize_with = "lenient_number")]
    pub yield_pct: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub value: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub usd_value: Option<f64>,
}

/// Closed set of section tags the flattener knows how to render.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    Wallet,
    Farming,
    LiquidityPool,
    Leverage,
    Lending,
    Token,
    Yield,
    Deposit,
    Staked,
    Locked,
}

impl SectionKind {
    pub const ALL: [SectionKind; 10] = [
        SectionKind::Wallet,
        SectionKind::Farming,
        SectionKind::LiquidityPool,
        SectionKind::Leverage,
        SectionKind::Lending,
        SectionKind::Token,
        SectionKind::Yield,
        SectionKind::Deposit,
        SectionKind::Staked,
        SectionKind::Locked,
    ];

    pub fn parse(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == tag)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SectionKind::Wallet => "Wallet",
            SectionKind::Farming => "Farming",
            SectionKind::LiquidityPool => "LiquidityPool",
            SectionKind::Leverage => "Leverage",
            SectionKind::Lending => "Lending",
            SectionKind::Token => "Token",
            SectionKind::Yield => "Yield",
            SectionKind::Deposit => "Deposit",
            SectionKind::Staked => "Staked",
            SectionKind::Locked => "Locked",
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ChainMode {
    Solana,
    Evm,
}

impl ChainMode {
    /// EVM addresses are `0x`-prefixed; everything else is treated as Solana.
    pub fn detect(address: &str) -> Self {
        if address.trim().starts_with("0x") {
            ChainMode::Evm
        } else {
            ChainMode::Solana
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ChainMode::Solana => "solana",
            ChainMode::Evm => "evm",
        }
    }
}

impl fmt::Display for ChainMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown chain mode {0:?}, expected \"solana\" or \"evm\"")]
pub struct UnknownChainMode(pub String);

impl FromStr for ChainMode {
    type Err = UnknownChainMode;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "solana" | "sol" => Ok(ChainMode::Solana),
            "evm" => Ok(ChainMode::Evm),
            other => Err(UnknownChainMode(other.to_string())),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("wallet address is empty")]
    EmptyAddress,
}

/// Trims the address and lower-cases EVM-style ones. Solana addresses are
/// base58 and case-sensitive, so they pass through untouched.
pub fn normalize_address(raw: &str) -> Result<String, AddressError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AddressError::EmptyAddress);
    }
    if trimmed.starts_with("0x") {
        Ok(trimmed.to_lowercase())
    } else {
        Ok(trimmed.to_string())
    }
}

/// A single spreadsheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Empty,
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }
}

impl From<Option<f64>> for Cell {
    fn from(value: Option<f64>) -> Self {
        value.map(Cell::Number).unwrap_or(Cell::Empty)
    }
}

impl From<Option<&str>> for Cell {
    fn from(value: Option<&str>) -> Self {
        value.map(Cell::text).unwrap_or(Cell::Empty)
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Cell::Text(text) => serializer.serialize_str(text),
            Cell::Number(number) if is_integral(*number) => serializer.serialize_i64(*number as i64),
            Cell::Number(number) => serializer.serialize_f64(*number),
            Cell::Empty => serializer.serialize_str(""),
        }
    }
}

// Whole numbers within f64's exact integer range are written without a fraction.
fn is_integral(number: f64) -> bool {
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;
    number.is_finite() && number.fract() == 0.0 && number.abs() <= MAX_EXACT
}

impl<'de> Deserialize<'de> for Cell {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::Number(n) => n.as_f64().map(Cell::Number).unwrap_or(Cell::Empty),
            serde_json::Value::String(s) if s.is_empty() => Cell::Empty,
            serde_json::Value::String(s) => Cell::Text(s),
            serde_json::Value::Null => Cell::Empty,
            other => Cell::Text(other.to_string()),
        })
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(transparent)]
pub struct FlatRow(pub Vec<Cell>);

impl FlatRow {
    pub fn cells(&self) -> &[Cell] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Cell>> for FlatRow {
    fn from(cells: Vec<Cell>) -> Self {
        FlatRow(cells)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct HealthResult {
    pub healthy: bool,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    pub checked_at: DateTime<Utc>,
}

impl HealthResult {
    pub fn healthy(status: impl Into<String>) -> Self {
        Self {
            healthy: true,
            status: Some(status.into()),
            error: None,
            checked_at: Utc::now(),
        }
    }

    pub fn unhealthy(status: Option<String>, error: impl Into<String>) -> Self {
        Self {
            healthy: false,
            status,
            error: Some(error.into()),
            checked_at: Utc::now(),
        }
    }

    pub fn with_checked_at(mut self, checked_at: DateTime<Utc>) -> Self {
        self.checked_at = checked_at;
        self
    }
}

/// First `max_chars` characters of `text`, for error messages that quote a response body.
pub fn excerpt(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => {
            let cleaned: String = s
                .trim()
                .chars()
                .filter(|c| *c != ',' && *c != '$')
                .collect();
            cleaned.parse::<f64>().ok()
        }
        _ => None,
    }))
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| match value {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }))
}
