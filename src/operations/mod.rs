// Copyright @yucwang 2026

pub mod compactor;
pub mod projector;
pub mod query;
pub mod reconcile;
pub mod resizer;
