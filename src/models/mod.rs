mod currency;
mod holding;
mod portfolio;
mod user;

pub use currency::Currency;
pub use holding::{
    Category, Commodity, CreateHolding, Holding, HoldingKind, QuoteKind, UpdateHolding,
};
pub use portfolio::{
    CategoryGroup, CategoryTotal, Conversion, CurrencyInfo, PortfolioSummary, RefreshReport,
    ValuedHolding,
};
pub use user::User;
