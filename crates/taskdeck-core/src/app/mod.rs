//! App - アプリケーション層
//!
//! ports を組み合わせて auto-complete のライフサイクルを組み立てます。
//!
//! # 主要コンポーネント
//! - **AutoCompleterBuilder**: 設定の検証とワイヤリング
//! - **AutoCompleter**: worker pool の起動と bounded shutdown
//! - **WorkerLoop**: recv → delay → conditional complete
//! - **TaskService**: ユーザー向け操作と producer 側
//! - **WorkerBoard**: worker ごとの状態

pub mod builder;
pub mod lifecycle;
pub mod service;
pub mod status;
pub mod worker_loop;

// 主要な型を再エクスポート
pub use self::builder::{AutoCompleterBuilder, BuildError};
pub use self::lifecycle::{AutoCompleter, DrainReport};
pub use self::service::{ServiceError, TaskService};
pub use self::status::{WorkerBoard, WorkerState};
pub use self::worker_loop::{WorkerExit, WorkerLoop};
