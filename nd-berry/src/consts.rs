//! 通用常量.

/// 每个轴上默认的物理分辨率 (每个采样点对应的物理长度).
pub const DEFAULT_RESOLUTION: f64 = 1.0;

/// Harris 角点检测的默认参数.
pub mod harris {
    /// 角点响应 `det - kappa * trace^2` 中的经验系数.
    pub const KAPPA: f64 = 0.04;

    /// 结构张量盒式平均窗口的边长.
    pub const WINDOW_SIZE: usize = 3;

    /// 输出图像中角点像素的默认值.
    pub const FOREGROUND: u8 = 255;

    /// 输出图像中非角点像素的默认值.
    pub const BACKGROUND: u8 = 0;
}

/// 高斯混合分布 EM 估计.
pub mod mixture {
    /// 每轮 M 步之后, 权重之和偏离 1 的最大容许量. 超过即判定估计失败.
    pub const WEIGHT_DRIFT_LIMIT: f64 = 0.1;

    /// 二维协方差被截断时, 从 `sqrt(vx * vy)` 中额外减去的量.
    pub const COVARIANCE_EPSILON: f64 = 1e-10;

    /// 默认最大迭代次数.
    pub const DEFAULT_MAX_ITERATIONS: usize = 200;

    /// 默认收敛阈值 (对数似然的绝对改进量).
    pub const DEFAULT_EPSILON: f64 = 1e-6;
}

/// 函数极小化.
pub mod minimization {
    /// 黄金分割比.
    pub const GOLDEN_RATIO: f64 = 1.618034;

    /// 黄金分割搜索的区间收缩比 `(sqrt(5) - 1) / 2`.
    pub const GOLDEN_SHRINK: f64 = 0.618_033_99;

    /// Brent 方法中退化为黄金分割步时使用的比例 `1 - GOLDEN_SHRINK`.
    pub const GOLDEN_STEP: f64 = 0.381_966_0;

    /// 包围区间搜索中, 抛物线外插相对当前步长的最大放大倍数.
    pub const BRACKET_GROWTH_LIMIT: f64 = 100.0;

    /// 包围区间搜索的最大迭代次数. 单调函数不存在包围区间.
    pub const BRACKET_MAX_ITERATIONS: usize = 100;

    /// 避免除零的极小量.
    pub const TINY: f64 = 1e-20;

    /// Brent 方法在最优点为 0 附近时使用的绝对容差.
    pub const ZEPS: f64 = 1e-10;

    /// 多维方法相对收敛判据中的绝对项.
    pub const ABS_TOLERANCE: f64 = 1e-25;

    /// 一维 Brent 线搜索的迭代上限, 与外层方法的迭代次数独立.
    pub const DEFAULT_MAX_ITERATIONS: usize = 200;

    /// 多维方法沿搜索方向做一维极小化时的初始区间.
    pub const LINE_SEARCH_BRACKET: (f64, f64) = (-0.5, 0.5);
}
