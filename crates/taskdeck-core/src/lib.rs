//! taskdeck-core
//!
//! Deferred auto-completion for a task tracker.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, task, state, actor, outcome, errors）
//! - **ports**: 抽象化レイヤー（TaskStore, CompletionSink, Clock, IdGenerator）
//! - **impls**: 実装（bounded completion queue, InMemoryTaskStore）
//! - **app**: worker pool, lifecycle, TaskService
//! - **config**: 環境変数からの設定
//! - **observability**: completion の統計

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod observability;
pub mod ports;

pub use self::app::{AutoCompleter, AutoCompleterBuilder, DrainReport, TaskService};
pub use self::config::Config;
