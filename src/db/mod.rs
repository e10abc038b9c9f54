mod category;
mod coin;
mod contact;
mod file;
mod ledger;
mod prices;
mod transactions;
mod wallet;

pub use category::{random_color, Category, PALETTE};
pub use coin::Coin;
pub use contact::Contact;
pub use file::{load, load_or_new, save};
pub use ledger::Ledger;
pub use prices::{format_usd, is_stablecoin, PriceTable};
pub use transactions::{
    InsertResult, Transaction, TransactionId, TransactionKind, TransactionType, Transactions,
};
pub use wallet::{Balance, Wallet};
