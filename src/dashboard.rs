use anyhow::{Context as _, Result};
use chrono::Local;
use console::{style, StyledObject};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::aggregate::{
    self, build_flow_graph, date_range_label, format_month_key, FlowEdge, FlowNode, SwapGroup,
};
use crate::command::CommandPalette;
use crate::db::{format_usd, Ledger, PriceTable, Transaction, TransactionType, Wallet};
use crate::store::LedgerStore;
use crate::terminal::{self, BulletPointPrinter, LineWriter};

/// Totals per coin with their USD value, then the net worth split.
pub fn print_totals<W: LineWriter + Clone>(printer: &BulletPointPrinter<W>, ledger: &Ledger) {
    let totals = aggregate::total_by_coin(ledger.wallets.values());
    if totals.is_empty() {
        printer.print_line(style("No balances yet").italic());
        return;
    }
    for (coin, amount) in &totals {
        let value = ledger
            .prices
            .value_of(coin, *amount)
            .map(|value| format!(" ({})", format_usd(value)))
            .unwrap_or_default();
        printer.print_item(format!(
            "{}: {}{}",
            style(coin).bold(),
            style_amount(*amount),
            style(value).dim()
        ));
    }

    let net_worth = aggregate::net_worth(&totals, &ledger.prices);
    if net_worth.total() > Decimal::ZERO {
        printer.print_line("");
        printer.print_line(
            style(format!("Non-Stables: {}", format_usd(net_worth.non_stables)))
                .bold()
                .color256(208),
        );
        printer.print_line(
            style(format!("Stables: {}", format_usd(net_worth.stables)))
                .bold()
                .green(),
        );
        printer.print_line(
            style(format!("Total: {}", format_usd(net_worth.total())))
                .bold()
                .yellow(),
        );
    }
}

pub fn print_categories<W: LineWriter + Clone>(printer: &BulletPointPrinter<W>, ledger: &Ledger) {
    let by_category = aggregate::balance_by_category(ledger.wallets.values());
    for (category, coins) in by_category.iter().filter(|(_, coins)| !coins.is_empty()) {
        let value = category_value(coins, &ledger.prices);
        printer.print_item(format!(
            "{} {}",
            style_category(ledger, category),
            style(format_usd(value)).dim()
        ));
        let printer = printer.indent();
        for (coin, amount) in coins {
            printer.print_line(format!("{}: {}", coin, style_amount(*amount)));
        }
    }
}

pub fn print_wallets<W: LineWriter + Clone>(printer: &BulletPointPrinter<W>, ledger: &Ledger) {
    if ledger.wallets.is_empty() {
        printer.print_line(style("(none)").italic());
        return;
    }
    for wallet in ledger.wallets.values() {
        print_wallet(printer, ledger, wallet);
    }
}

pub fn print_wallet<W: LineWriter + Clone>(
    printer: &BulletPointPrinter<W>,
    ledger: &Ledger,
    wallet: &Wallet,
) {
    let category = wallet
        .category
        .as_deref()
        .map(|category| format!(" [{}]", style_category(ledger, category)))
        .unwrap_or_default();
    printer.print_item(format!(
        "{} {} {}{}",
        style(&wallet.name).cyan().bold(),
        style(wallet.chain_type()).magenta(),
        style(short_address(&wallet.address, 8, 6)).dim(),
        category,
    ));
    let printer = printer.indent();
    if let Some(note) = &wallet.note {
        printer.print_line(style(note).italic());
    }
    for balance in &wallet.balances {
        let value = ledger
            .prices
            .value_of(&balance.coin, balance.amount)
            .map(|value| format!(" ({})", format_usd(value)))
            .unwrap_or_default();
        printer.print_line(format!(
            "{}: {}{}",
            balance.coin,
            style_amount(balance.amount),
            style(value).dim()
        ));
    }
}

pub fn print_transaction<W: LineWriter + Clone>(
    printer: &BulletPointPrinter<W>,
    transaction: &Transaction,
) {
    let fee = match (transaction.fee, &transaction.fee_coin) {
        (Some(fee), Some(coin)) => format!(" fee {} {}", fee, coin),
        (Some(fee), None) => format!(" fee {}", fee),
        _ => String::new(),
    };
    let note = transaction
        .note
        .as_ref()
        .map(|note| format!(" \"{note}\""))
        .unwrap_or_default();
    printer.print_item(format!(
        "{} {} {}{}{} {}",
        style(transaction.date.with_timezone(&Local).format("%Y-%m-%d %H:%M")).dim(),
        style_tx_type(transaction.tx_type()),
        describe(transaction),
        style(fee).dim(),
        style(note).blue(),
        style(&transaction.id).dim(),
    ));
}

/// The flow graph of one month: edges grouped by source, then swaps.
pub fn print_flow<W: LineWriter + Clone>(
    printer: &BulletPointPrinter<W>,
    month_key: &str,
    transactions: &[&Transaction],
    wallets: &BTreeMap<String, Wallet>,
) {
    printer.print_line(style_header(&format_month_key(month_key)));
    let graph = build_flow_graph(transactions.iter().copied(), wallets);
    if graph.is_empty() {
        printer.print_line(style("No transactions this month").dim());
        return;
    }

    for (source, edges) in graph.by_source() {
        printer.print_line(style_node(source, wallets));
        let branches = printer.indent();
        for (index, edge) in edges.iter().enumerate() {
            branches.print_branch(describe_edge(edge, wallets), index + 1 == edges.len());
        }
    }

    if !graph.swaps.is_empty() {
        printer.print_line("");
        printer.print_line(style("Swaps:").bold());
        let swaps = printer.indent();
        for group in &graph.swaps {
            print_swap_group(&swaps, group);
        }
    }
}

fn print_swap_group<W: LineWriter + Clone>(printer: &BulletPointPrinter<W>, group: &SwapGroup) {
    for swap in &group.swaps {
        printer.print_line(format!(
            "{}  {}  {}",
            style(&group.wallet).cyan(),
            style(format!(
                "{:.2} {}  ⇄  {:.2} {}",
                swap.sell_amount.round_dp(2),
                group.sell_coin,
                swap.buy_amount.round_dp(2),
                group.buy_coin
            ))
            .magenta(),
            style(date_range_label(&[swap.date], &Local)).dim(),
        ));
    }
    if let Some((sell, buy)) = group.totals() {
        printer.print_line(
            style(format!(
                "Σ {:.2} {}  ⇄  {:.2} {}  ({})",
                sell.round_dp(2),
                group.sell_coin,
                buy.round_dp(2),
                group.buy_coin,
                date_range_label(&group.dates(), &Local),
            ))
            .magenta()
            .bold(),
        );
    }
}

fn describe_edge(edge: &FlowEdge, wallets: &BTreeMap<String, Wallet>) -> String {
    let count = if edge.count > 1 {
        format!(" (×{})", edge.count)
    } else {
        String::new()
    };
    let amount = format!("{:.2} {}{}", edge.amount.round_dp(2), edge.coin, count);
    let amount = match edge.tx_type {
        TransactionType::Deposit => style(amount).green(),
        TransactionType::Withdraw => style(amount).red(),
        _ => style(amount).yellow(),
    };
    format!(
        "{} ──> {}   {}",
        amount,
        style_node(&edge.to, wallets),
        style(date_range_label(&edge.dates, &Local)).dim()
    )
}

fn describe(transaction: &Transaction) -> String {
    use crate::db::TransactionKind::*;
    match &transaction.kind {
        Deposit {
            to_wallet,
            coin,
            amount,
            from_wallet,
            ..
        } => match from_wallet {
            Some(from) => format!("{} {} {} → {}", style_amount(*amount), coin, from, to_wallet),
            None => format!("{} {} → {}", style_amount(*amount), coin, to_wallet),
        },
        Withdraw {
            from_wallet,
            coin,
            amount,
            to_wallet,
            ..
        } => match to_wallet {
            Some(to) => format!("{} {} {} → {}", style_amount(-*amount), coin, from_wallet, to),
            None => format!("{} {} {} →", style_amount(-*amount), coin, from_wallet),
        },
        Transfer {
            from_wallet,
            to_wallet,
            coin,
            amount,
            ..
        } => format!("{} {} {} → {}", amount, coin, from_wallet, to_wallet),
        Swap {
            swap_wallet,
            sell_coin,
            sell_amount,
            buy_coin,
            buy_amount,
        } => format!(
            "{} {} ⇄ {} {} in {}",
            sell_amount, sell_coin, buy_amount, buy_coin, swap_wallet
        ),
    }
}

fn category_value(coins: &BTreeMap<crate::db::Coin, Decimal>, prices: &PriceTable) -> Decimal {
    coins
        .iter()
        .filter_map(|(coin, amount)| prices.value_of(coin, *amount))
        .fold(Decimal::ZERO, Decimal::saturating_add)
}

/// `abcd...wxyz` style shortening for display, keeping `head` and `tail` characters
fn short_address(address: &str, head: usize, tail: usize) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= head + tail {
        return address.to_string();
    }
    format!(
        "{}...{}",
        chars[..head].iter().collect::<String>(),
        chars[chars.len() - tail..].iter().collect::<String>()
    )
}

pub fn style_header(header: &str) -> StyledObject<&str> {
    style(header).bold().underlined()
}

fn style_node(node: &FlowNode, wallets: &BTreeMap<String, Wallet>) -> String {
    match node {
        FlowNode::Wallet(name) => {
            let address = wallets
                .get(name)
                .map(|wallet| format!(" {}", style(short_address(&wallet.address, 4, 4)).dim()))
                .unwrap_or_default();
            format!("{}{}", style(name).cyan(), address)
        }
        FlowNode::Counterparty(name) => style(name).color256(208).to_string(),
        FlowNode::External => style(node.to_string()).dim().to_string(),
    }
}

fn style_category(ledger: &Ledger, name: &str) -> String {
    let styled = style(name).bold();
    let color = ledger
        .categories
        .get(name)
        .map(|category| category.color.as_str())
        .unwrap_or("white");
    let styled = match color.trim_start_matches("bright") {
        "red" => styled.red(),
        "green" => styled.green(),
        "yellow" => styled.yellow(),
        "blue" => styled.blue(),
        "magenta" => styled.magenta(),
        "cyan" => styled.cyan(),
        _ => styled.white(),
    };
    if color.starts_with("bright") {
        styled.bright().to_string()
    } else {
        styled.to_string()
    }
}

fn style_tx_type(tx_type: TransactionType) -> StyledObject<String> {
    let label = format!("{:<8}", tx_type.to_string());
    match tx_type {
        TransactionType::Deposit => style(label).green(),
        TransactionType::Withdraw => style(label).red(),
        TransactionType::Transfer => style(label).yellow(),
        TransactionType::Swap => style(label).magenta(),
    }
}

fn style_amount(amount: Decimal) -> StyledObject<String> {
    let result = style(amount.normalize().to_string()).bold();
    if amount < Decimal::ZERO {
        result.red()
    } else {
        result.green()
    }
}

/// Interactive loop: print the overview for the selected month, read a command, repeat.
///
/// Besides palette commands this understands `n`/`next` and `prev` for month navigation
/// and `r`/`reload` to re-read the ledger file.
pub fn run(store: &mut LedgerStore) -> Result<()> {
    let mut palette = CommandPalette::new();
    let mut month_index = 0;
    let mut status: Option<String> = None;

    loop {
        let groups = aggregate::group_by_month(store.ledger().transactions.iter());
        let months = aggregate::month_keys(&groups);
        month_index = month_index.min(months.len().saturating_sub(1));

        println!();
        println!("{}", style_header("Total Balance"));
        let printer = BulletPointPrinter::new();
        print_totals(&printer, store.ledger());
        println!();
        println!("{}", style_header("By Category"));
        print_categories(&printer, store.ledger());
        println!();
        match months.get(month_index) {
            Some(month) => print_flow(&printer, month, &groups[month], &store.ledger().wallets),
            None => println!("{}", style("No transactions yet").dim()),
        }
        if let Some(status) = status.take() {
            println!();
            println!("{status}");
        }
        println!();

        let line = terminal::prompt(":").context("Failed to read command")?;
        match line.trim() {
            "n" | "next" => {
                month_index = month_index.saturating_sub(1);
                continue;
            }
            "prev" => {
                month_index += 1;
                continue;
            }
            "r" | "reload" => {
                status = Some(reload(store));
                continue;
            }
            _ => {}
        }

        let result = palette.execute(store, &line);
        if result.quit {
            return Ok(());
        }
        status = match result.help {
            Some(help) => Some(help),
            None if result.message.is_empty() => None,
            None if result.success => Some(style(result.message).green().to_string()),
            None => Some(style(result.message).red().to_string()),
        };
    }
}

/// Re-read the ledger file and describe the outcome for the status line. If the file
/// can't be read or parsed, the in-memory ledger stays as it was.
fn reload(store: &mut LedgerStore) -> String {
    match store.reload() {
        Ok(()) => style("Reloaded").green().to_string(),
        Err(err) => {
            log::warn!("Failed to reload ledger: {err}");
            style(format!("Failed to reload ledger: {err}"))
                .red()
                .to_string()
        }
    }
}
