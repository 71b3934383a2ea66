use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::models::Currency;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoldingKind {
    Asset,
    Credit,
}

impl HoldingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            HoldingKind::Asset => "asset",
            HoldingKind::Credit => "credit",
        }
    }
}

impl fmt::Display for HoldingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HoldingKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asset" => Ok(HoldingKind::Asset),
            "credit" => Ok(HoldingKind::Credit),
            other => Err(format!("unknown holding kind: {}", other)),
        }
    }
}

/// Precious metals quoted through the FX-style endpoint of the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Commodity {
    Gold,
    Silver,
}

impl Commodity {
    pub fn name(&self) -> &'static str {
        match self {
            Commodity::Gold => "gold",
            Commodity::Silver => "silver",
        }
    }

    /// Provider proxy symbol; metals are treated as currencies upstream.
    pub fn proxy_symbol(&self) -> &'static str {
        match self {
            Commodity::Gold => "XAU",
            Commodity::Silver => "XAG",
        }
    }
}

/// Which quote endpoint a category's price comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteKind {
    Stock,
    Crypto,
    Commodity(Commodity),
}

/// Closed category set shared by assets and credits. `Other` is valid for
/// both kinds; everything else belongs to exactly one side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Cash,
    Stock,
    Crypto,
    Bond,
    RealEstate,
    Gold,
    Silver,
    CreditCard,
    Loan,
    Mortgage,
    LineOfCredit,
    Other,
}

impl Category {
    pub const ASSET_CATEGORIES: [Category; 8] = [
        Category::Cash,
        Category::Stock,
        Category::Crypto,
        Category::Bond,
        Category::RealEstate,
        Category::Gold,
        Category::Silver,
        Category::Other,
    ];

    pub const CREDIT_CATEGORIES: [Category; 5] = [
        Category::CreditCard,
        Category::Loan,
        Category::Mortgage,
        Category::LineOfCredit,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Cash => "cash",
            Category::Stock => "stock",
            Category::Crypto => "crypto",
            Category::Bond => "bond",
            Category::RealEstate => "real_estate",
            Category::Gold => "gold",
            Category::Silver => "silver",
            Category::CreditCard => "credit_card",
            Category::Loan => "loan",
            Category::Mortgage => "mortgage",
            Category::LineOfCredit => "line_of_credit",
            Category::Other => "other",
        }
    }

    pub fn valid_for(&self, kind: HoldingKind) -> bool {
        match kind {
            HoldingKind::Asset => Category::ASSET_CATEGORIES.contains(self),
            HoldingKind::Credit => Category::CREDIT_CATEGORIES.contains(self),
        }
    }

    /// Quote endpoint for market-tracked categories; None means the category
    /// is only ever valued from its stored amount.
    pub fn quote_kind(&self) -> Option<QuoteKind> {
        match self {
            Category::Stock => Some(QuoteKind::Stock),
            Category::Crypto => Some(QuoteKind::Crypto),
            Category::Gold => Some(QuoteKind::Commodity(Commodity::Gold)),
            Category::Silver => Some(QuoteKind::Commodity(Commodity::Silver)),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cash" => Ok(Category::Cash),
            "stock" => Ok(Category::Stock),
            "crypto" => Ok(Category::Crypto),
            "bond" => Ok(Category::Bond),
            "real_estate" => Ok(Category::RealEstate),
            "gold" => Ok(Category::Gold),
            "silver" => Ok(Category::Silver),
            "credit_card" => Ok(Category::CreditCard),
            "loan" => Ok(Category::Loan),
            "mortgage" => Ok(Category::Mortgage),
            "line_of_credit" => Ok(Category::LineOfCredit),
            "other" => Ok(Category::Other),
            other => Err(format!("unknown category: {}", other)),
        }
    }
}

// An asset or credit owned by a device-identified user. `amount` is the
// stored record (cost basis for assets, balance for credits); `current_value`
// is the derived market snapshot written by the refresh path and is the only
// field that path ever overwrites.
#[derive(Debug, Clone, Serialize)]
pub struct Holding {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: HoldingKind,
    pub name: String,
    pub category: Category,
    pub amount: BigDecimal,
    pub currency: Currency,
    pub symbol: Option<String>,
    pub shares: Option<BigDecimal>,
    pub market_tracked: bool,
    pub current_value: Option<BigDecimal>,
    pub price_updated_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub acquired_on: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateHolding {
    pub name: String,
    pub category: Category,
    pub amount: BigDecimal,
    pub currency: Currency,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub shares: Option<BigDecimal>,
    #[serde(default)]
    pub market_tracked: bool,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub acquired_on: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateHolding {
    pub name: Option<String>,
    pub category: Option<Category>,
    pub amount: Option<BigDecimal>,
    pub currency: Option<Currency>,
    pub symbol: Option<String>,
    pub shares: Option<BigDecimal>,
    pub market_tracked: Option<bool>,
    pub notes: Option<String>,
    pub acquired_on: Option<NaiveDate>,
}

impl Holding {
    pub fn new(user_id: Uuid, kind: HoldingKind, input: CreateHolding) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            kind,
            name: input.name,
            category: input.category,
            amount: input.amount,
            currency: input.currency,
            symbol: input.symbol,
            shares: input.shares,
            market_tracked: input.market_tracked,
            current_value: None,
            price_updated_at: None,
            notes: input.notes,
            acquired_on: input.acquired_on,
            created_at: now,
            updated_at: now,
        }
    }

    /// Fields set in the payload replace the stored ones; absent fields are
    /// left untouched.
    pub fn apply_update(&mut self, input: UpdateHolding) {
        if let Some(name) = input.name {
            self.name = name;
        }
        if let Some(category) = input.category {
            self.category = category;
        }
        if let Some(amount) = input.amount {
            self.amount = amount;
        }
        if let Some(currency) = input.currency {
            self.currency = currency;
        }
        if let Some(symbol) = input.symbol {
            self.symbol = Some(symbol);
        }
        if let Some(shares) = input.shares {
            self.shares = Some(shares);
        }
        if let Some(market_tracked) = input.market_tracked {
            self.market_tracked = market_tracked;
        }
        if let Some(notes) = input.notes {
            self.notes = Some(notes);
        }
        if let Some(acquired_on) = input.acquired_on {
            self.acquired_on = Some(acquired_on);
        }
        self.updated_at = Utc::now();
    }
}
