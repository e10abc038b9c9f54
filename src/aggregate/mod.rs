//! Read-only views over the ledger for display: month buckets, per-month flow graphs
//! and balance summaries.

mod flow;
mod month;
mod summary;

pub use flow::{
    build_flow_graph, date_range_label, truncate_address, FlowEdge, FlowGraph, FlowNode,
    SwapGroup, SwapLeg,
};
pub use month::{format_month_key, group_by_month, group_by_month_in, month_keys, MonthKey};
pub use summary::{balance_by_category, net_worth, total_by_coin, NetWorth, UNCATEGORIZED};
