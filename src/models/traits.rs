use crate::models::common::Vector3;
use crate::orbit::CartesianState;

/// 全てのシミュレーションエージェントが実装する基本インターフェース
pub trait IAgent {
    /// エージェントIDの取得
    fn get_id(&self) -> &str;

    /// 群制御の挙動が1つでも有効かどうか
    fn is_active(&self) -> bool;
}

/// 軌道上を移動するエージェントのインターフェース
pub trait IMovable {
    /// 現在のECI状態ベクトル
    fn get_state(&self) -> CartesianState;

    /// 状態ベクトルの設定
    fn set_state(&mut self, state: CartesianState);

    /// 現在位置の取得
    fn get_position(&self) -> Vector3 {
        self.get_state().position
    }

    /// 現在速度の取得
    fn get_velocity(&self) -> Vector3 {
        self.get_state().velocity
    }

    /// 速度に差分を加える（位置は変更しない）
    fn apply_velocity_delta(&mut self, delta: Vector3) {
        let mut state = self.get_state();
        state.velocity += delta;
        self.set_state(state);
    }
}
