//! Value types shared between the sapper engine and any view that renders it.

pub mod models;
pub mod protocol;
