pub mod types;
pub mod error;
pub mod config;
pub mod data;
pub mod filter;
pub mod pagination;
pub mod aggregate;
pub mod controller;
pub mod render;
pub mod map_view;
pub mod chart_view;
pub mod table_view;
pub mod lookup;
pub mod basemap;
pub mod snapshot;
pub mod dashboard;
pub mod server;

#[cfg(test)]
mod test_support;
