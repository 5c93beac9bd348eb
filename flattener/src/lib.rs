//! Flattens a portfolio document into spreadsheet rows.
//!
//! One routine serves both chain modes; the differences (headers, field
//! aliases, row shape) live in a per-mode [`Layout`].

mod layout;
mod sections;

pub use layout::{AssetField, Layout, EVM_HEADERS, SOLANA_HEADERS};
pub use sections::category_label;

use domain::{ChainMode, FlatRow, PortfolioDocument};
use serde::Serialize;
use thiserror::Error;

use crate::layout::ProjectContext;
use crate::sections::{emit_section, RowSink};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FlattenError {
    #[error("remote returned error: {error}")]
    InvalidDocument {
        error: String,
        message: Option<String>,
    },
}

/// Header row plus data rows for one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<FlatRow>,
}

impl Table {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub fn headers(mode: ChainMode) -> Vec<String> {
    Layout::for_mode(mode).header_row()
}

pub fn flatten(document: &PortfolioDocument, mode: ChainMode) -> Result<Table, FlattenError> {
    if let Some(error) = document.remote_error() {
        return Err(FlattenError::InvalidDocument {
            error: error.to_string(),
            message: document.message.clone(),
        });
    }

    let layout = Layout::for_mode(mode);
    let mut rows = Vec::new();

    for project in document.projects.iter().flatten() {
        let Some(sections) = project.sections.as_deref() else {
            continue;
        };
        let ctx = ProjectContext::new(project);
        let mut sink = RowSink {
            layout,
            project: &ctx,
            rows: &mut rows,
        };
        for section in sections {
            emit_section(section, &mut sink);
        }
    }

    Ok(Table {
        headers: layout.header_row(),
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::Cell;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> PortfolioDocument {
        serde_json::from_value(value).expect("valid document")
    }

    fn text(value: &str) -> Cell {
        Cell::text(value)
    }

    #[test]
    fn kamino_lending_example() {
        let document = doc(json!({
            "projects": [{
                "project_name": "Kamino",
                "sections": [{
                    "section_type": "Lending",
                    "market_name": "Main",
                    "supplied": [{"token": "USDC", "balance": 100, "value": 100}],
                    "borrowed": [{"token": "SOL", "balance": 2, "value": 300}]
                }]
            }]
        }));

        let table = flatten(&document, ChainMode::Solana).expect("flatten");
        assert_eq!(table.headers, SOLANA_HEADERS);
        assert_eq!(
            table.rows,
            vec![
                FlatRow(vec![
                    text("Kamino"),
                    text("Lending"),
                    text("Main (Supplied)"),
                    text("USDC"),
                    Cell::Number(100.0),
                    Cell::Empty,
                    Cell::Number(100.0),
                ]),
                FlatRow(vec![
                    text("Kamino"),
                    text("Lending"),
                    text("Main (Borrowed)"),
                    text("SOL"),
                    Cell::Number(2.0),
                    Cell::Empty,
                    Cell::Number(300.0),
                ]),
            ]
        );
        assert_eq!(
            serde_json::to_value(&table.rows[0]).unwrap(),
            json!(["Kamino", "Lending", "Main (Supplied)", "USDC", 100, "", 100])
        );
    }

    #[test]
    fn remote_error_is_invalid_document() {
        let document = doc(json!({
            "error": "Data not yet available",
            "message": "Please try again in a moment.",
            "projects": [{"project_name": "Kamino", "sections": []}]
        }));

        let err = flatten(&document, ChainMode::Evm).unwrap_err();
        assert_eq!(
            err,
            FlattenError::InvalidDocument {
                error: "Data not yet available".to_string(),
                message: Some("Please try again in a moment.".to_string()),
            }
        );
    }

    #[test]
    fn missing_or_empty_projects_yield_headers_only() {
        for value in [json!({}), json!({"projects": []}), json!({"projects": null})] {
            for mode in [ChainMode::Solana, ChainMode::Evm] {
                let table = flatten(&doc(value.clone()), mode).expect("not an error");
                assert!(table.is_empty());
                assert_eq!(table.headers, headers(mode));
            }
        }
        assert_eq!(headers(ChainMode::Evm).len(), 8);
        assert_eq!(headers(ChainMode::Solana).len(), 7);
    }

    #[test]
    fn unknown_sections_are_skipped_without_aborting_siblings() {
        let document = doc(json!({
            "projects": [{
                "project_name": "Jupiter",
                "sections": [
                    {"section_type": "Airdrop", "assets": [{"token": "JUP", "balance": 5}]},
                    {"section_type": "Wallet", "assets": [{"token": "JUP", "balance": 5, "yield": 12, "value": 4.5}]}
                ]
            }]
        }));

        let table = flatten(&document, ChainMode::Solana).expect("flatten");
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].cells()[2], text("Holdings"));
        // Wallet rows never carry a yield.
        assert_eq!(table.rows[0].cells()[5], Cell::Empty);
    }

    #[test]
    fn supplied_rows_precede_borrowed_rows() {
        let document = doc(json!({
            "projects": [{
                "project_name": "Marginfi",
                "sections": [{
                    "section_type": "Leverage",
                    "borrowed": [{"token": "B1"}, {"token": "B2"}],
                    "supplied": [{"token": "S1"}, {"token": "S2"}]
                }]
            }]
        }));

        let table = flatten(&document, ChainMode::Solana).expect("flatten");
        let tokens: Vec<_> = table.rows.iter().map(|r| r.cells()[3].clone()).collect();
        assert_eq!(tokens, vec![text("S1"), text("S2"), text("B1"), text("B2")]);
        assert_eq!(table.rows[0].cells()[2], text("Unknown Market (Supplied)"));
        assert_eq!(table.rows[3].cells()[2], text("Unknown Market (Borrowed)"));
    }

    #[test]
    fn sections_without_lists_emit_nothing() {
        let document = doc(json!({
            "projects": [
                {"project_name": "NoSections"},
                {"project_name": "Bare", "sections": [
                    {"section_type": "Farming"},
                    {"section_type": "Lending", "market_name": "Main"}
                ]}
            ]
        }));
        let table = flatten(&document, ChainMode::Solana).expect("flatten");
        assert!(table.rows.is_empty());
    }

    #[test]
    fn farming_yield_and_pool_fallback() {
        let document = doc(json!({
            "projects": [{
                "project_name": "Meteora",
                "sections": [
                    {"section_type": "Farming", "assets": [
                        {"token": "JLP", "balance": 10, "yield": 8.5, "value": 45},
                        {"pool": "SOL-USDC", "amount": 3, "yield": 0, "usd_value": 12}
                    ]}
                ]
            }]
        }));
        let table = flatten(&document, ChainMode::Solana).expect("flatten");
        assert_eq!(table.rows[0].cells()[5], Cell::Number(8.5));
        let second = table.rows[1].cells();
        assert_eq!(second[3], text("SOL-USDC"));
        assert_eq!(second[4], Cell::Number(3.0));
        assert_eq!(second[5], Cell::Empty);
        assert_eq!(second[6], Cell::Number(12.0));
    }

    #[test]
    fn evm_rows_carry_chain_and_total_value() {
        let document = doc(json!({
            "projects": [
                {
                    "project_name": "Wallet",
                    "chain": "Ethereum",
                    "total_value": "$1,204",
                    "sections": [
                        {"section_type": "Token", "assets": [{"token": "ETH", "amount": 0.4, "usd_value": 1200}]}
                    ]
                },
                {
                    "project_name": "Pendle",
                    "sections": [
                        {"section_type": "Yield", "assets": [{"pool": "PT-sUSDe", "balance": 50, "usd_value": 49.5}]},
                        {"section_type": "Lending", "market_name": "Core", "supplied": [{"token": "USDC", "balance": 10, "usd_value": 10}]}
                    ]
                }
            ]
        }));

        let table = flatten(&document, ChainMode::Evm).expect("flatten");
        assert_eq!(table.headers, EVM_HEADERS);
        assert_eq!(
            table.rows[0],
            FlatRow(vec![
                text("Wallet"),
                text("Ethereum"),
                text("$1,204"),
                text("Token"),
                text("Token"),
                text("ETH"),
                Cell::Number(0.4),
                Cell::Number(1200.0),
            ])
        );
        assert_eq!(table.rows[1].cells()[1], text("unknown"));
        assert_eq!(table.rows[1].cells()[2], text("$0"));
        assert_eq!(table.rows[1].cells()[5], text("PT-sUSDe"));
        assert_eq!(table.rows[2].cells()[4], text("Core (Supplied)"));
        assert!(table.rows.iter().all(|row| row.len() == 8));
    }

    #[test]
    fn value_is_preferred_over_usd_value_in_both_modes() {
        let document = doc(json!({
            "projects": [{
                "project_name": "Orca",
                "sections": [
                    {"section_type": "LiquidityPool", "assets": [{"pool": "x", "balance": 1, "value": 5, "usd_value": 7}]}
                ]
            }]
        }));
        let evm = flatten(&document, ChainMode::Evm).expect("flatten");
        assert_eq!(evm.rows[0].cells()[7], Cell::Number(5.0));
        let solana = flatten(&document, ChainMode::Solana).expect("flatten");
        assert_eq!(solana.rows[0].cells()[6], Cell::Number(5.0));
    }

    #[test]
    fn blank_chain_and_total_value_fall_back_to_defaults() {
        let document = doc(json!({
            "projects": [{
                "project_name": "Aave",
                "chain": "",
                "total_value": "  ",
                "sections": [
                    {"section_type": "Deposit", "assets": [{"token": "USDC", "amount": 3, "usd_value": 3}]}
                ]
            }]
        }));
        let table = flatten(&document, ChainMode::Evm).expect("flatten");
        assert_eq!(table.rows[0].cells()[1], text("unknown"));
        assert_eq!(table.rows[0].cells()[2], text("$0"));
    }

    #[test]
    fn flattening_is_deterministic() {
        let document = doc(json!({
            "projects": [
                {"project_name": "A", "sections": [{"section_type": "Staked", "assets": [{"pool": "p1", "balance": 1}, {"pool": "p2", "balance": 2}]}]},
                {"project_name": "B", "sections": [{"section_type": "Locked", "assets": [{"pool": "p3", "balance": 3}]}]}
            ]
        }));
        let first = serde_json::to_vec(&flatten(&document, ChainMode::Evm).unwrap()).unwrap();
        let second = serde_json::to_vec(&flatten(&document, ChainMode::Evm).unwrap()).unwrap();
        assert_eq!(first, second);
    }
}
