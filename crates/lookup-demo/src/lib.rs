#![forbid(unsafe_code)]

//! Invoice form demo for the lookup controls.

pub mod app;
pub mod cli;
pub mod data;
