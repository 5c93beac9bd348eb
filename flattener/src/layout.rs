use domain::{Asset, Cell, ChainMode, FlatRow, SectionKind};

pub const SOLANA_HEADERS: [&str; 7] = [
    "Project",
    "Section Type",
    "Market/Type",
    "Token",
    "Balance",
    "Yield (%)",
    "Value ($)",
];

pub const EVM_HEADERS: [&str; 8] = [
    "Project",
    "Chain",
    "Total Value",
    "Section Type",
    "Category",
    "Token/Pool",
    "Balance",
    "USD Value",
];

const DEFAULT_CHAIN: &str = "unknown";
const DEFAULT_TOTAL_VALUE: &str = "$0";

/// Numeric asset fields that can feed a column, tried in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetField {
    Balance,
    Amount,
    Value,
    UsdValue,
}

impl AssetField {
    fn read(self, asset: &Asset) -> Option<f64> {
        match self {
            AssetField::Balance => asset.balance,
            AssetField::Amount => asset.amount,
            AssetField::Value => asset.value,
            AssetField::UsdValue => asset.usd_value,
        }
    }
}

fn first_present(fields: &[AssetField], asset: &Asset) -> Option<f64> {
    fields.iter().find_map(|field| field.read(asset))
}

/// Project-level values repeated on every row of that project.
#[derive(Debug, Clone)]
pub struct ProjectContext<'a> {
    pub name: &'a str,
    pub chain: &'a str,
    pub total_value: &'a str,
}

impl<'a> ProjectContext<'a> {
    pub fn new(project: &'a domain::Project) -> Self {
        Self {
            name: project.project_name.as_str(),
            chain: non_blank(project.chain.as_deref()).unwrap_or(DEFAULT_CHAIN),
            total_value: non_blank(project.total_value.as_deref())
                .unwrap_or(DEFAULT_TOTAL_VALUE),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

pub struct RowContext<'a> {
    pub project: &'a ProjectContext<'a>,
    pub kind: SectionKind,
    pub category: &'a str,
    pub asset: &'a Asset,
}

impl RowContext<'_> {
    fn token(&self) -> Cell {
        Cell::from(self.asset.token.as_deref().or(self.asset.pool.as_deref()))
    }
}

/// Column mapping for one chain mode: header set, field aliases and the row shape.
pub struct Layout {
    pub mode: ChainMode,
    pub headers: &'static [&'static str],
    pub balance_fields: &'static [AssetField],
    pub value_fields: &'static [AssetField],
    build_row: fn(&Layout, &RowContext<'_>) -> FlatRow,
}

impl Layout {
    pub fn for_mode(mode: ChainMode) -> &'static Layout {
        match mode {
            ChainMode::Solana => &SOLANA,
            ChainMode::Evm => &EVM,
        }
    }

    pub fn header_row(&self) -> Vec<String> {
        self.headers.iter().map(|h| h.to_string()).collect()
    }

    pub fn row(&self, ctx: &RowContext<'_>) -> FlatRow {
        (self.build_row)(self, ctx)
    }

    fn balance(&self, asset: &Asset) -> Cell {
        Cell::from(first_present(self.balance_fields, asset))
    }

    fn value(&self, asset: &Asset) -> Cell {
        Cell::from(first_present(self.value_fields, asset))
    }
}

static SOLANA: Layout = Layout {
    mode: ChainMode::Solana,
    headers: &SOLANA_HEADERS,
    balance_fields: &[AssetField::Balance, AssetField::Amount],
    value_fields: &[AssetField::Value, AssetField::UsdValue],
    build_row: solana_row,
};

static EVM: Layout = Layout {
    mode: ChainMode::Evm,
    headers: &EVM_HEADERS,
    balance_fields: &[AssetField::Balance, AssetField::Amount],
    value_fields: &[AssetField::Value, AssetField::UsdValue],
    build_row: evm_row,
};

fn solana_row(layout: &Layout, ctx: &RowContext<'_>) -> FlatRow {
    FlatRow(vec![
        Cell::text(ctx.project.name),
        Cell::text(ctx.kind.as_str()),
        Cell::text(ctx.category),
        ctx.token(),
        layout.balance(ctx.asset),
        yield_cell(ctx),
        layout.value(ctx.asset),
    ])
}

fn evm_row(layout: &Layout, ctx: &RowContext<'_>) -> FlatRow {
    FlatRow(vec![
        Cell::text(ctx.project.name),
        Cell::text(ctx.project.chain),
        Cell::text(ctx.project.total_value),
        Cell::text(ctx.kind.as_str()),
        Cell::text(ctx.category),
        ctx.token(),
        layout.balance(ctx.asset),
        layout.value(ctx.asset),
    ])
}

// Wallet holdings carry no yield. Upstream writes 0 when it could not read one.
fn yield_cell(ctx: &RowContext<'_>) -> Cell {
    if ctx.kind == SectionKind::Wallet {
        return Cell::Empty;
    }
    Cell::from(ctx.asset.yield_pct.filter(|pct| *pct != 0.0))
}
