// 基本的なデータ型と数学ユーティリティ
pub mod common;

// エージェントの基本インターフェース（trait）定義
pub mod traits;

// 群エージェントモデル
pub mod agent;

// 便利な re-export
pub use agent::{Agent, BehaviorFlags};
pub use common::*;
pub use traits::*;
