//! Ports - 抽象化レイヤー
//!
//! Hexagonal Architecture の「ポート」です。
//! auto-complete のコアが外部に要求するのは TaskStore だけで、
//! 残りは時刻・ID 生成・producer 側の口です。

pub mod clock;
pub mod completion_sink;
pub mod id_generator;
pub mod task_store;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::completion_sink::{CompletionSink, EnqueueOutcome};
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::task_store::TaskStore;
