use rust_decimal::Decimal;
use std::str::FromStr as _;
use thiserror::Error;

use crate::db::Coin;

const ADD_USAGE: &str = "add wallet|category|contact ...";
const ADD_WALLET_USAGE: &str = "add wallet NAME ADDR CHAIN-TYPE (CAT) (NOTE)";
const ADD_CATEGORY_USAGE: &str = "add category NAME (COLOR)";
const ADD_CONTACT_USAGE: &str = "add contact NAME ADDR (CHAIN) (NOTE)";
const DELETE_USAGE: &str = "del wallet|category|contact|tx NAME|ID";
const DEPOSIT_USAGE: &str = "deposit WALLET AMOUNT COIN (NOTE)";
const WITHDRAW_USAGE: &str = "withdraw WALLET AMOUNT COIN (NOTE)";
const TRANSFER_USAGE: &str = "transfer FROM TO AMOUNT COIN (NOTE)";
const SWAP_USAGE: &str = "swap WALLET SELL_AMT SELL_COIN BUY_AMT BUY_COIN (NOTE)";
const BALANCE_USAGE: &str = "balance WALLET AMOUNT COIN";
const PRICE_USAGE: &str = "price COIN USD_PRICE";

/// Wallet type used when `CHAIN-TYPE` has no type part
const DEFAULT_WALLET_TYPE: &str = "hot";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteTarget {
    Wallet,
    Category,
    Contact,
    Transaction,
}

/// One parsed command palette line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    AddWallet {
        name: String,
        address: String,
        chain: String,
        wallet_type: String,
        category: Option<String>,
        note: Option<String>,
    },
    AddCategory {
        name: String,
        color: Option<String>,
    },
    AddContact {
        name: String,
        address: String,
        chain: Option<String>,
        note: Option<String>,
    },
    Delete {
        target: DeleteTarget,
        key: String,
    },
    Deposit {
        wallet: String,
        amount: Decimal,
        coin: Coin,
        note: Option<String>,
    },
    Withdraw {
        wallet: String,
        amount: Decimal,
        coin: Coin,
        note: Option<String>,
    },
    Transfer {
        from: String,
        to: String,
        amount: Decimal,
        coin: Coin,
        note: Option<String>,
    },
    Swap {
        wallet: String,
        sell_amount: Decimal,
        sell_coin: Coin,
        buy_amount: Decimal,
        buy_coin: Coin,
        note: Option<String>,
    },
    Balance {
        wallet: String,
        amount: Decimal,
        coin: Coin,
    },
    Price {
        coin: Coin,
        price: Decimal,
    },
    Help,
    Quit,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("Unknown command: {0} (:help for commands)")]
    UnknownCommand(String),

    #[error("Unknown type: {0} (use wallet, category, or contact)")]
    UnknownAddType(String),

    #[error("Unknown type: {0}")]
    UnknownDeleteType(String),

    #[error("Invalid {what}: {value}")]
    InvalidNumber { what: &'static str, value: String },
}

/// Parse one line. Blank lines parse to `None`.
pub fn parse(line: &str) -> Result<Option<Command>, ParseError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Some((command, args)) = tokens.split_first() else {
        return Ok(None);
    };
    let command = match command.to_lowercase().as_str() {
        "q" | "quit" | "exit" => Command::Quit,
        "help" | "h" | "?" => Command::Help,
        "add" | "a" => parse_add(args)?,
        "del" | "d" | "delete" | "rm" => parse_delete(args)?,
        "deposit" | "dep" => {
            require(args, 3, DEPOSIT_USAGE)?;
            Command::Deposit {
                wallet: args[0].to_string(),
                amount: parse_number("amount", args[1])?,
                coin: Coin::new(args[2]),
                note: rest(args, 3),
            }
        }
        "withdraw" | "wd" => {
            require(args, 3, WITHDRAW_USAGE)?;
            Command::Withdraw {
                wallet: args[0].to_string(),
                amount: parse_number("amount", args[1])?,
                coin: Coin::new(args[2]),
                note: rest(args, 3),
            }
        }
        "transfer" | "tf" => {
            require(args, 4, TRANSFER_USAGE)?;
            Command::Transfer {
                from: args[0].to_string(),
                to: args[1].to_string(),
                amount: parse_number("amount", args[2])?,
                coin: Coin::new(args[3]),
                note: rest(args, 4),
            }
        }
        "swap" | "sw" => {
            require(args, 5, SWAP_USAGE)?;
            Command::Swap {
                wallet: args[0].to_string(),
                sell_amount: parse_number("sell amount", args[1])?,
                sell_coin: Coin::new(args[2]),
                buy_amount: parse_number("buy amount", args[3])?,
                buy_coin: Coin::new(args[4]),
                note: rest(args, 5),
            }
        }
        "balance" | "bal" | "b" => {
            require(args, 3, BALANCE_USAGE)?;
            Command::Balance {
                wallet: args[0].to_string(),
                amount: parse_number("amount", args[1])?,
                coin: Coin::new(args[2]),
            }
        }
        "price" | "p" => {
            require(args, 2, PRICE_USAGE)?;
            Command::Price {
                coin: Coin::new(args[0]),
                price: parse_number("price", args[1])?,
            }
        }
        other => return Err(ParseError::UnknownCommand(other.to_string())),
    };
    Ok(Some(command))
}

fn parse_add(args: &[&str]) -> Result<Command, ParseError> {
    require(args, 1, ADD_USAGE)?;
    let sub_args = &args[1..];
    match args[0].to_lowercase().as_str() {
        "wallet" | "w" => {
            require(sub_args, 3, ADD_WALLET_USAGE)?;
            let (chain, wallet_type) = split_chain_type(sub_args[2]);
            Ok(Command::AddWallet {
                name: sub_args[0].to_string(),
                address: sub_args[1].to_string(),
                chain,
                wallet_type,
                category: sub_args.get(3).map(|category| category.to_string()),
                note: rest(sub_args, 4),
            })
        }
        "category" | "cat" | "c" => {
            require(sub_args, 1, ADD_CATEGORY_USAGE)?;
            Ok(Command::AddCategory {
                name: sub_args[0].to_string(),
                color: sub_args.get(1).map(|color| color.to_string()),
            })
        }
        "contact" | "con" => {
            require(sub_args, 2, ADD_CONTACT_USAGE)?;
            Ok(Command::AddContact {
                name: sub_args[0].to_string(),
                address: sub_args[1].to_string(),
                chain: sub_args.get(2).map(|chain| chain.to_string()),
                note: rest(sub_args, 3),
            })
        }
        other => Err(ParseError::UnknownAddType(other.to_string())),
    }
}

fn parse_delete(args: &[&str]) -> Result<Command, ParseError> {
    require(args, 2, DELETE_USAGE)?;
    let target = match args[0].to_lowercase().as_str() {
        "wallet" | "w" => DeleteTarget::Wallet,
        "category" | "cat" | "c" => DeleteTarget::Category,
        "contact" | "con" => DeleteTarget::Contact,
        "tx" | "transaction" => DeleteTarget::Transaction,
        other => return Err(ParseError::UnknownDeleteType(other.to_string())),
    };
    Ok(Command::Delete {
        target,
        key: args[1].to_string(),
    })
}

/// `solana-hot` -> (`solana`, `hot`), split at the last hyphen. Without a hyphen the whole
/// token is the chain.
fn split_chain_type(token: &str) -> (String, String) {
    match token.rfind('-') {
        Some(index) if index > 0 => (
            token[..index].to_string(),
            token[index + 1..].to_string(),
        ),
        _ => (token.to_string(), DEFAULT_WALLET_TYPE.to_string()),
    }
}

fn require(args: &[&str], count: usize, usage: &'static str) -> Result<(), ParseError> {
    if args.len() < count {
        return Err(ParseError::Usage(usage));
    }
    Ok(())
}

/// Free-text tail starting at `from`, joined with single spaces
fn rest(args: &[&str], from: usize) -> Option<String> {
    if args.len() <= from {
        return None;
    }
    Some(args[from..].join(" "))
}

fn parse_number(what: &'static str, value: &str) -> Result<Decimal, ParseError> {
    Decimal::from_str(value)
        .or_else(|_| Decimal::from_scientific(value))
        .map_err(|_| ParseError::InvalidNumber {
            what,
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn blank_line(#[case] line: &str) {
        assert_eq!(Ok(None), parse(line));
    }

    #[rstest]
    #[case("q")]
    #[case("quit")]
    #[case("EXIT")]
    fn quit(#[case] line: &str) {
        assert_eq!(Ok(Some(Command::Quit)), parse(line));
    }

    #[rstest]
    #[case("help")]
    #[case("h")]
    #[case("?")]
    fn help(#[case] line: &str) {
        assert_eq!(Ok(Some(Command::Help)), parse(line));
    }

    #[test]
    fn add_wallet_with_everything() {
        assert_eq!(
            Ok(Some(Command::AddWallet {
                name: "main".to_string(),
                address: "7xKX".to_string(),
                chain: "solana".to_string(),
                wallet_type: "cold".to_string(),
                category: Some("defi".to_string()),
                note: Some("long term storage".to_string()),
            })),
            parse("a w main 7xKX solana-cold defi long term   storage")
        );
    }

    #[rstest]
    #[case("solana", "solana", "hot")]
    #[case("solana-cold", "solana", "cold")]
    #[case("arbitrum-one-exchange", "arbitrum-one", "exchange")]
    #[case("-cold", "-cold", "hot")]
    fn chain_type(#[case] token: &str, #[case] chain: &str, #[case] wallet_type: &str) {
        assert_eq!(
            (chain.to_string(), wallet_type.to_string()),
            split_chain_type(token)
        );
    }

    #[test]
    fn add_category_without_color() {
        assert_eq!(
            Ok(Some(Command::AddCategory {
                name: "defi".to_string(),
                color: None,
            })),
            parse("add cat defi")
        );
    }

    #[test]
    fn add_unknown_type() {
        assert_eq!(
            Err(ParseError::UnknownAddType("thing".to_string())),
            parse("add thing x")
        );
    }

    #[test]
    fn delete_tx() {
        assert_eq!(
            Ok(Some(Command::Delete {
                target: DeleteTarget::Transaction,
                key: "tx_123".to_string(),
            })),
            parse("rm tx tx_123")
        );
    }

    #[test]
    fn deposit_normalizes_coin() {
        assert_eq!(
            Ok(Some(Command::Deposit {
                wallet: "main".to_string(),
                amount: Decimal::new(15, 1),
                coin: Coin::new("SOL"),
                note: None,
            })),
            parse("dep main 1.5 sol")
        );
    }

    #[test]
    fn swap_with_note() {
        assert_eq!(
            Ok(Some(Command::Swap {
                wallet: "main".to_string(),
                sell_amount: Decimal::ONE,
                sell_coin: Coin::new("SOL"),
                buy_amount: Decimal::from(200),
                buy_coin: Coin::new("USDC"),
                note: Some("took profit".to_string()),
            })),
            parse("sw main 1 sol 200 usdc took profit")
        );
    }

    #[rstest]
    #[case("deposit main 1", DEPOSIT_USAGE)]
    #[case("wd main", WITHDRAW_USAGE)]
    #[case("tf a b 1", TRANSFER_USAGE)]
    #[case("swap main 1 sol 200", SWAP_USAGE)]
    #[case("b main 1", BALANCE_USAGE)]
    #[case("p sol", PRICE_USAGE)]
    #[case("del wallet", DELETE_USAGE)]
    #[case("add", ADD_USAGE)]
    #[case("add wallet main addr", ADD_WALLET_USAGE)]
    #[case("add contact alice", ADD_CONTACT_USAGE)]
    fn too_few_args(#[case] line: &str, #[case] usage: &'static str) {
        assert_eq!(Err(ParseError::Usage(usage)), parse(line));
    }

    #[test]
    fn invalid_amount() {
        let err = parse("deposit main lots sol").unwrap_err();
        assert_eq!("Invalid amount: lots", err.to_string());
    }

    #[test]
    fn scientific_amount() {
        assert_eq!(
            Ok(Some(Command::Price {
                coin: Coin::new("BONK"),
                price: Decimal::new(2, 5),
            })),
            parse("price bonk 2e-5")
        );
    }

    #[test]
    fn unknown_command() {
        let err = parse("frobnicate all").unwrap_err();
        assert_eq!(
            "Unknown command: frobnicate (:help for commands)",
            err.to_string()
        );
    }
}
