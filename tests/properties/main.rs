//! Property tests over generated graphs and operation sequences.

mod strategies;

mod graph_properties;
mod ledger_properties;
mod transaction_properties;
