use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::PathBuf;

/// Track crypto wallets, balances and transactions in a local JSON ledger.
#[derive(Parser, Debug)]
pub struct Args {
    /// Ledger file to use instead of ~/.wago/wago.json
    #[clap(long, global = true)]
    pub data_file: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage wallets
    #[clap(visible_alias = "w")]
    Wallet {
        #[clap(subcommand)]
        command: Option<WalletCommand>,
    },

    /// Manage wallet categories
    #[clap(visible_alias = "cat")]
    Category {
        #[clap(subcommand)]
        command: Option<CategoryCommand>,
    },

    /// Manage contacts
    #[clap(visible_alias = "con")]
    Contact {
        #[clap(subcommand)]
        command: Option<ContactCommand>,
    },

    /// Manage transactions
    Tx {
        #[clap(subcommand)]
        command: Option<TxCommand>,
    },

    /// Manage manual USD prices
    Price {
        #[clap(subcommand)]
        command: Option<PriceCommand>,
    },

    /// Print total balances, net worth and balances per category
    Summary,

    /// Print the flow of funds for one month
    Flow {
        /// Month as YYYY-MM, defaults to the most recent month with transactions
        #[clap(long)]
        month: Option<String>,
    },

    /// Interactive dashboard with a command prompt
    #[clap(visible_alias = "dash")]
    Dashboard,
}

#[derive(Debug, Subcommand)]
pub enum WalletCommand {
    /// List all wallets
    List,

    /// Show a wallet with its balances and transactions
    Show { name: String },

    /// Add a new wallet
    Add {
        name: String,
        #[clap(long, short)]
        address: String,
        #[clap(long, short = 'n')]
        chain: String,
        #[clap(long = "type", short = 't', default_value = "hot")]
        wallet_type: String,
        /// Created with a random colour if it doesn't exist yet
        #[clap(long, short)]
        category: Option<String>,
        #[clap(long)]
        note: Option<String>,
    },

    /// Update a wallet, only the given fields change
    Upd {
        name: String,
        /// New name
        #[clap(long)]
        rename: Option<String>,
        #[clap(long, short)]
        address: Option<String>,
        #[clap(long, short = 'n')]
        chain: Option<String>,
        #[clap(long = "type", short = 't')]
        wallet_type: Option<String>,
        /// Empty string removes the category
        #[clap(long, short)]
        category: Option<String>,
        #[clap(long)]
        note: Option<String>,
    },

    /// Delete a wallet. Its transactions are kept.
    Del {
        name: String,
        /// Don't ask for confirmation
        #[clap(long, short)]
        yes: bool,
    },

    /// Overwrite a coin balance directly
    Balance {
        name: String,
        amount: Decimal,
        coin: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum CategoryCommand {
    List,
    Add {
        name: String,
        /// Random palette colour if not given
        #[clap(long)]
        color: Option<String>,
    },
    /// Delete a category. Wallets using it become uncategorized.
    Del { name: String },
}

#[derive(Debug, Subcommand)]
pub enum ContactCommand {
    List,
    Add {
        name: String,
        #[clap(long, short)]
        address: String,
        #[clap(long, short = 'n')]
        chain: Option<String>,
        #[clap(long)]
        note: Option<String>,
    },
    Del { name: String },
}

#[derive(Debug, Subcommand)]
pub enum TxCommand {
    /// List transactions, newest first
    List {
        /// Only transactions touching this wallet
        #[clap(long, short)]
        wallet: Option<String>,
    },

    /// Add a transaction. The type follows from the wallet flags: --swap makes a swap,
    /// --from and --to a transfer, only --from a withdrawal, only --to a deposit.
    Add(TxAddArgs),

    /// Delete a transaction and undo its balance changes
    Del { id: String },
}

#[derive(Debug, Default, clap::Args)]
pub struct TxAddArgs {
    /// Source wallet, or contact/address for deposits
    #[clap(long, short)]
    pub from: Option<String>,
    /// Destination wallet, or contact/address for withdrawals
    #[clap(long, short)]
    pub to: Option<String>,
    /// Wallet of a swap
    #[clap(long, short)]
    pub swap: Option<String>,
    #[clap(long, short)]
    pub coin: Option<String>,
    #[clap(long, short)]
    pub amount: Option<Decimal>,
    #[clap(long, short = 'F')]
    pub fee: Option<Decimal>,
    /// Defaults to the transaction's coin
    #[clap(long, short = 'C')]
    pub fee_coin: Option<String>,
    #[clap(long, short = 'S')]
    pub sell_coin: Option<String>,
    #[clap(long, short = 'A')]
    pub sell_amount: Option<Decimal>,
    #[clap(long, short = 'B')]
    pub buy_coin: Option<String>,
    #[clap(long, short = 'M')]
    pub buy_amount: Option<Decimal>,
    #[clap(long, short)]
    pub note: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum PriceCommand {
    List,
    Set { coin: String, price: Decimal },
}

pub fn parse() -> Args {
    Args::parse()
}
