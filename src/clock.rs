//! # シミュレーションクロック
//!
//! 一時停止・時間倍率・シード・固定ステップを持つ決定論的な時間積算器です。
//! 乱数生成器（`Pcg64Mcg`）はクロックが所有し、シード文字列から毎回同じ状態に
//! 初期化されます。グローバルな乱数は使用しません。

use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;
use tracing::{debug, info};

/// 時間倍率の下限
pub const MIN_TIME_SCALE: f64 = 0.1;
/// 時間倍率の上限
pub const MAX_TIME_SCALE: f64 = 100.0;
/// 固定ステップの既定値 (s)
pub const DEFAULT_FIXED_DT: f64 = 1.0 / 60.0;

const FNV_OFFSET_BASIS: u64 = 0xCBF2_9CE4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01B3;

fn splitmix64(mut state: u64) -> u64 {
    state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// シード文字列から128bitのRNGシードを導出（FNV-1a → splitmix64）
fn seed_bytes(seed: &str) -> [u8; 16] {
    let hash = seed
        .bytes()
        .fold(FNV_OFFSET_BASIS, |h, b| (h ^ u64::from(b)).wrapping_mul(FNV_PRIME));
    let lo = splitmix64(hash);
    let hi = splitmix64(lo);
    ((u128::from(hi) << 64) | u128::from(lo)).to_le_bytes()
}

/// シード文字列から乱数生成器を作成
pub fn rng_from_seed(seed: &str) -> Pcg64Mcg {
    Pcg64Mcg::from_seed(seed_bytes(seed))
}

/// 決定論的シミュレーションクロック
#[derive(Debug, Clone)]
pub struct SimClock {
    paused: bool,
    time_scale: f64,
    sim_time: f64,
    seed: String,
    fixed_dt: f64,
    rng: Pcg64Mcg,
}

impl SimClock {
    /// 新しいクロックを作成
    ///
    /// # 引数
    ///
    /// * `seed` - 乱数シード文字列
    /// * `fixed_dt` - シングルステップ時の時間刻み (s)。正でなければ既定値
    pub fn new(seed: &str, fixed_dt: f64) -> Self {
        let fixed_dt = if fixed_dt > 0.0 && fixed_dt.is_finite() {
            fixed_dt
        } else {
            DEFAULT_FIXED_DT
        };
        Self {
            paused: false,
            time_scale: 1.0,
            sim_time: 0.0,
            seed: seed.to_string(),
            fixed_dt,
            rng: rng_from_seed(seed),
        }
    }

    /// フレーム経過時間からシミュレーション時間を進める
    ///
    /// # 戻り値
    ///
    /// 進めたシミュレーション時間 (s)。一時停止中・倍率0のときは 0 で時刻も進まない
    pub fn update(&mut self, frame_delta: f64) -> f64 {
        if self.paused || self.time_scale == 0.0 || !(frame_delta > 0.0 && frame_delta.is_finite()) {
            return 0.0;
        }
        let delta = frame_delta * self.time_scale;
        self.sim_time += delta;
        delta
    }

    /// 固定ステップ分だけ進める（一時停止中でも進む）
    pub fn step(&mut self) -> f64 {
        self.sim_time += self.fixed_dt;
        self.fixed_dt
    }

    /// 時刻を0に戻し、同じシードで乱数生成器を再初期化
    pub fn reset(&mut self) {
        self.sim_time = 0.0;
        self.rng = rng_from_seed(&self.seed);
        info!(seed = %self.seed, "CLOCK_RESET: クロックをリセットしました");
    }

    /// 時間倍率を設定
    ///
    /// [0.1, 100] に制限します。0 以下を指定すると倍率 0 で自動的に一時停止します。
    pub fn set_time_scale(&mut self, scale: f64) {
        if scale.is_nan() || scale <= 0.0 {
            self.time_scale = 0.0;
            self.paused = true;
        } else {
            self.time_scale = scale.clamp(MIN_TIME_SCALE, MAX_TIME_SCALE);
        }
        debug!(time_scale = self.time_scale, paused = self.paused, "時間倍率を変更しました");
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// 再開（倍率0で停止していた場合は等倍に戻す）
    pub fn resume(&mut self) {
        if self.time_scale == 0.0 {
            self.time_scale = 1.0;
        }
        self.paused = false;
    }

    /// シードを変更し、乱数生成器を再初期化
    pub fn set_seed(&mut self, seed: &str) {
        self.seed = seed.to_string();
        self.rng = rng_from_seed(seed);
    }

    pub fn set_fixed_dt(&mut self, fixed_dt: f64) {
        if fixed_dt > 0.0 && fixed_dt.is_finite() {
            self.fixed_dt = fixed_dt;
        }
    }

    pub fn rng_mut(&mut self) -> &mut Pcg64Mcg {
        &mut self.rng
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }

    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }

    pub fn fixed_dt(&self) -> f64 {
        self.fixed_dt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_frame_rate_invariance() {
        let mut fast = SimClock::new("alpha", 0.1);
        let mut slow = SimClock::new("alpha", 0.1);
        for _ in 0..60 {
            fast.update(0.016);
        }
        for _ in 0..30 {
            slow.update(0.032);
        }
        assert!((fast.sim_time() - slow.sim_time()).abs() < 1e-5);
        assert!((fast.sim_time() - 0.96).abs() < 1e-9);
    }

    #[test]
    fn test_paused_clock_does_not_advance() {
        let mut clock = SimClock::new("alpha", 0.5);
        clock.pause();
        assert_eq!(clock.update(1.0), 0.0);
        assert_eq!(clock.sim_time(), 0.0);
        // シングルステップは一時停止中でも進む
        assert_eq!(clock.step(), 0.5);
        assert_eq!(clock.sim_time(), 0.5);
    }

    #[test]
    fn test_time_scale_clamp_and_zero_pauses() {
        let mut clock = SimClock::new("alpha", 0.1);
        clock.set_time_scale(1000.0);
        assert_eq!(clock.time_scale(), MAX_TIME_SCALE);
        clock.set_time_scale(0.01);
        assert_eq!(clock.time_scale(), MIN_TIME_SCALE);
        assert!((clock.update(1.0) - 0.1).abs() < 1e-12);

        clock.set_time_scale(0.0);
        assert!(clock.is_paused());
        assert_eq!(clock.update(1.0), 0.0);
        clock.resume();
        assert_eq!(clock.time_scale(), 1.0);
        assert_eq!(clock.update(2.0), 2.0);
    }

    #[test]
    fn test_reset_reseeds_with_same_seed() {
        let mut clock = SimClock::new("swarm-42", 0.1);
        let first: Vec<u64> = (0..4).map(|_| clock.rng_mut().r#gen()).collect();
        clock.update(3.0);
        clock.reset();
        let second: Vec<u64> = (0..4).map(|_| clock.rng_mut().r#gen()).collect();
        assert_eq!(first, second);
        assert_eq!(clock.sim_time(), 0.0);
        assert_eq!(clock.seed(), "swarm-42");
    }

    #[test]
    fn test_set_seed_matches_fresh_clock() {
        let mut clock = SimClock::new("alpha", 0.1);
        clock.set_seed("beta");
        let mut fresh = SimClock::new("beta", 0.1);
        let a: u64 = clock.rng_mut().r#gen();
        let b: u64 = fresh.rng_mut().r#gen();
        assert_eq!(a, b);
        assert_eq!(clock.seed(), "beta");
    }

    #[test]
    fn test_set_fixed_dt_ignores_invalid_values() {
        let mut clock = SimClock::new("alpha", 0.1);
        clock.set_fixed_dt(0.25);
        assert_eq!(clock.step(), 0.25);
        clock.set_fixed_dt(-1.0);
        clock.set_fixed_dt(f64::NAN);
        assert_eq!(clock.step(), 0.25);
        assert!((clock.sim_time() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_different_seeds_diverge() {
        let mut a = rng_from_seed("a");
        let mut b = rng_from_seed("b");
        let xa: u64 = a.r#gen();
        let xb: u64 = b.r#gen();
        assert_ne!(xa, xb);
    }
}
