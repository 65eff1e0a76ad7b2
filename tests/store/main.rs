#[path = "../common/mod.rs"]
mod common;

mod backup;
mod crud;
mod failures;
mod persistence;
