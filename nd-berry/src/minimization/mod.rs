//! 函数极小化.
//!
//! 一维: 包围区间搜索 [`enclose`], 黄金分割搜索 [`golden_section`] (线性收敛),
//! Brent 抛物线插值 [`brent`] (超线性收敛).
//!
//! 多维: 梯度下降 [`gradient_descent`] / [`gradient_descent_numeric`],
//! 以及基于方向集的 Powell 方法 [`powell`]. 它们都沿某个方向做一维 Brent 搜索,
//! 初始区间为 [`LINE_SEARCH_BRACKET`].
//!
//! 参考: W. H. Press et al., "Numerical Recipes", 第 10 章.

use ndarray::Array1;

use crate::consts::minimization::{DEFAULT_MAX_ITERATIONS, LINE_SEARCH_BRACKET};

mod bracket;
mod brent;
mod golden;
mod gradient;
mod powell;

pub use bracket::{enclose, Bracket};
pub use brent::brent;
pub use golden::golden_section;
pub use gradient::{gradient_descent, gradient_descent_numeric};
pub use powell::powell;

/// 一维极小化结果.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Minimum {
    /// 极小点.
    pub x: f64,
    /// 极小值.
    pub value: f64,
    /// 实际迭代次数.
    pub iterations: usize,
}

/// 多维极小化结果.
#[derive(Debug, Clone, PartialEq)]
pub struct MinimumNd {
    /// 极小点.
    pub point: Array1<f64>,
    /// 极小值.
    pub value: f64,
    /// 实际迭代次数.
    pub iterations: usize,
}

/// 极小化失败.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MinimizeError {
    /// 在给定迭代次数内找不到包围极小值的区间 (如函数单调).
    #[error("{iterations} 次扩展后仍未找到包围极小值的区间")]
    BracketNotFound {
        /// 已进行的扩展次数.
        iterations: usize,
    },

    /// 输入的维数不一致.
    #[error("维数不符: 需要 {expected:?}, 实际为 {actual:?}")]
    DimensionMismatch {
        /// 需要的形状.
        expected: (usize, usize),
        /// 实际的形状.
        actual: (usize, usize),
    },

    /// 起始点为空向量.
    #[error("起始点维数为 0")]
    EmptyPoint,
}

/// 计算结果.
pub type MinimizeResult<T> = Result<T, MinimizeError>;

/// 从 `p` 出发沿 `dir` 做一维 Brent 搜索, 返回步长 `x` 及 `f(p + x * dir)`.
///
/// 一维搜索的迭代上限固定为 [`DEFAULT_MAX_ITERATIONS`], 与外层迭代次数无关.
pub(crate) fn line_minimize<F>(
    p: &Array1<f64>,
    dir: &Array1<f64>,
    f: &mut F,
    tolerance: f64,
) -> MinimizeResult<Minimum>
where
    F: FnMut(&Array1<f64>) -> f64,
{
    let mut tmp = p.clone();
    let (lo, hi) = LINE_SEARCH_BRACKET;
    brent(
        lo,
        hi,
        |t| {
            tmp.assign(p);
            tmp.scaled_add(t, dir);
            f(&tmp)
        },
        tolerance,
        DEFAULT_MAX_ITERATIONS,
    )
}

/// 多维方法的相对收敛判据.
#[inline]
pub(crate) fn relative_converged(old: f64, new: f64, tolerance: f64) -> bool {
    use crate::consts::minimization::ABS_TOLERANCE;
    2.0 * (old - new).abs() <= tolerance * (old.abs() + new.abs()) + ABS_TOLERANCE
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_line_minimize() {
        let p = array![0.0, 0.0];
        let dir = array![1.0, 0.0];
        let mut f = |v: &Array1<f64>| (v[0] - 0.3).powi(2) + v[1];
        let m = line_minimize(&p, &dir, &mut f, 1e-8).unwrap();
        assert!((m.x - 0.3).abs() < 1e-6);
        assert!(m.value.abs() < 1e-10);
    }

    #[test]
    fn test_relative_converged() {
        assert!(relative_converged(100.0, 100.0, 1e-10));
        assert!(relative_converged(0.0, 0.0, 0.0));
        assert!(!relative_converged(1.0, 0.5, 1e-3));
    }
}
