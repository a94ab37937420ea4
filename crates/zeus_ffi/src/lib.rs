//! Flutter bridge surface over `zeus_core`.

pub mod api;
