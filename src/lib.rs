#![forbid(unsafe_code)]

pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod controller;
pub mod formats;
pub mod i18n;
pub mod logging;
pub mod markdown;
pub mod nav;
pub mod prefs;
pub mod toc;
pub mod tracker;
pub mod view;
