use domain::{Asset, FlatRow, Section, SectionKind};
use tracing::debug;

use crate::layout::{Layout, ProjectContext, RowContext};

const UNKNOWN_MARKET: &str = "Unknown Market";

/// Collects rows for one project.
pub(crate) struct RowSink<'a> {
    pub layout: &'a Layout,
    pub project: &'a ProjectContext<'a>,
    pub rows: &'a mut Vec<FlatRow>,
}

impl RowSink<'_> {
    fn push(&mut self, kind: SectionKind, category: &str, assets: &[Asset]) {
        for asset in assets {
            let ctx = RowContext {
                project: self.project,
                kind,
                category,
                asset,
            };
            self.rows.push(self.layout.row(&ctx));
        }
    }
}

type Emit = fn(SectionKind, &Section, &mut RowSink<'_>);

const HANDLERS: [(SectionKind, Emit); 10] = [
    (SectionKind::Wallet, emit_simple),
    (SectionKind::Farming, emit_simple),
    (SectionKind::LiquidityPool, emit_simple),
    (SectionKind::Token, emit_simple),
    (SectionKind::Yield, emit_simple),
    (SectionKind::Deposit, emit_simple),
    (SectionKind::Staked, emit_simple),
    (SectionKind::Locked, emit_simple),
    (SectionKind::Lending, emit_two_sided),
    (SectionKind::Leverage, emit_two_sided),
];

fn handler(tag: &str) -> Option<(SectionKind, Emit)> {
    HANDLERS
        .iter()
        .copied()
        .find(|(kind, _)| kind.as_str() == tag)
}

pub(crate) fn emit_section(section: &Section, sink: &mut RowSink<'_>) {
    match handler(&section.section_type) {
        Some((kind, emit)) => emit(kind, section, sink),
        None => debug!(
            project = sink.project.name,
            section_type = %section.section_type,
            "skipping unrecognized section type"
        ),
    }
}

pub fn category_label(kind: SectionKind) -> &'static str {
    match kind {
        SectionKind::Wallet => "Holdings",
        other => other.as_str(),
    }
}

fn emit_simple(kind: SectionKind, section: &Section, sink: &mut RowSink<'_>) {
    let assets = section.assets.as_deref().unwrap_or_default();
    sink.push(kind, category_label(kind), assets);
}

fn emit_two_sided(kind: SectionKind, section: &Section, sink: &mut RowSink<'_>) {
    let market = section
        .market_name
        .as_deref()
        .filter(|name| !name.trim().is_empty())
        .unwrap_or(UNKNOWN_MARKET);
    let supplied = section.supplied.as_deref().unwrap_or_default();
    let borrowed = section.borrowed.as_deref().unwrap_or_default();
    sink.push(kind, &format!("{market} (Supplied)"), supplied);
    sink.push(kind, &format!("{market} (Borrowed)"), borrowed);
}
