//! Impls - ports の実装（開発用・テスト用）
//!
//! - **InMemoryTaskStore**: 開発用の TaskStore
//! - **CompletionQueue**: auto-complete の bounded hand-off queue
//!
//! 本番の TaskStore（関係 DB）は別クレートに置く想定です。

pub mod completion_queue;
pub mod inmem_store;

pub use self::completion_queue::{CompletionProducer, CompletionReceiver, completion_queue};
pub use self::inmem_store::InMemoryTaskStore;
