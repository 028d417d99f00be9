//! 高斯混合分布的 EM (Expectation-Maximization) 估计.
//!
//! 给定成分个数和初始参数, 迭代地交替执行:
//!
//! 1. E 步: 计算每个数据点属于每个成分的后验概率 (责任);
//! 2. M 步: 以责任加权重新估计每个成分的权重, 均值和 (协) 方差.
//!
//! 每轮之后重新计算对数似然. 似然下降或改进量小于 `epsilon` 时停止,
//! 否则最多迭代 `max_iterations` 轮. 直方图变体见 [`histogram`].
//!
//! # 注意
//!
//! 失败时调用者传入的成分参数保持不变, 需要换用其它初值重新估计.

use num::traits::AsPrimitive;

use crate::consts::mixture::{DEFAULT_EPSILON, DEFAULT_MAX_ITERATIONS};
use crate::Vector2;

mod distribution;
mod engine;
pub mod histogram;

pub use distribution::{Distribution, Distribution2};

/// EM 迭代参数.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EmParams {
    /// 最大迭代次数.
    pub max_iterations: usize,

    /// 收敛阈值: 相邻两轮对数似然之差的绝对值小于它即停止.
    pub epsilon: f64,
}

impl Default for EmParams {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            epsilon: DEFAULT_EPSILON,
        }
    }
}

impl EmParams {
    /// 直接初始化.
    pub const fn new(max_iterations: usize, epsilon: f64) -> Self {
        Self {
            max_iterations,
            epsilon,
        }
    }
}

/// 迭代停止的原因.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Termination {
    /// 对数似然的改进量小于阈值.
    Converged,

    /// 对数似然出现数值上的下降. 视为收敛.
    LikelihoodDecreased,

    /// 达到最大迭代次数仍未收敛. 返回最后一轮的参数.
    MaxIterations,
}

/// 一次成功估计的诊断信息.
#[derive(Debug, Clone, PartialEq)]
pub struct EmReport {
    /// 实际迭代次数.
    pub iterations: usize,

    /// 停止原因.
    pub termination: Termination,

    /// 最终参数下的对数似然.
    pub log_likelihood: f64,

    /// 每轮 M 步之后的对数似然.
    pub likelihoods: Vec<f64>,
}

impl EmReport {
    /// 是否在最大迭代次数之前停止.
    #[inline]
    pub fn converged(&self) -> bool {
        self.termination != Termination::MaxIterations
    }
}

/// 估计失败.
///
/// `sample` 为参与计算的数据点序号 (直方图变体中跳过了计数为 0 的格子).
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum EstimateError {
    /// 没有数据点 (或直方图计数全为 0).
    #[error("没有可用的数据点")]
    EmptyInput,

    /// 成分个数为 0.
    #[error("成分个数为 0")]
    NoComponents,

    /// 初始权重之和不为正.
    #[error("初始权重之和 {sum} 不为正")]
    NonPositiveWeights {
        /// 权重之和.
        sum: f64,
    },

    /// 直方图格宽不为正.
    #[error("直方图格宽必须为正")]
    ZeroBinWidth,

    /// E 步中某个数据点的归一化因子为 0 (或非有限值).
    #[error("第 {sample} 个数据点的后验概率无法归一化")]
    DegenerateResponsibility {
        /// 数据点序号.
        sample: usize,
    },

    /// M 步中某个成分的责任之和为 0.
    #[error("第 {component} 个成分已退化")]
    ComponentCollapsed {
        /// 成分序号.
        component: usize,
    },

    /// 权重之和偏离 1 过多.
    #[error("权重之和 {sum} 偏离 1 过多")]
    WeightDrift {
        /// 权重之和.
        sum: f64,
    },

    /// 某个数据点的混合密度为 0, 对数似然无定义.
    #[error("第 {sample} 个数据点的似然为 0")]
    ZeroLikelihood {
        /// 数据点序号.
        sample: usize,
    },
}

/// 以一维样本估计一维高斯混合分布. `comps` 给出初始参数, 成功时被更新.
pub fn estimate_mixture<T>(
    samples: &[T],
    comps: &mut [Distribution],
    params: &EmParams,
) -> Result<EmReport, EstimateError>
where
    T: AsPrimitive<f64>,
{
    let points: Vec<f64> = samples.iter().map(|v| v.as_()).collect();
    let counts = vec![1.0; points.len()];
    engine::estimate(&points, &counts, comps, params)
}

/// 以二维样本估计二维高斯混合分布. `comps` 给出初始参数, 成功时被更新.
pub fn estimate_mixture2(
    samples: &[Vector2<f64>],
    comps: &mut [Distribution2],
    params: &EmParams,
) -> Result<EmReport, EstimateError> {
    let counts = vec![1.0; samples.len()];
    engine::estimate(samples, &counts, comps, params)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rand_distr::{Distribution as _, Normal};

    /// 500 个 N(0, 1) 样本与 500 个 N(10, 1) 样本.
    pub(crate) fn two_clusters(seed: u64) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        let a = Normal::new(0.0, 1.0).unwrap();
        let b = Normal::new(10.0, 1.0).unwrap();
        let mut ans: Vec<f64> = (0..500).map(|_| a.sample(&mut rng)).collect();
        ans.extend((0..500).map(|_| b.sample(&mut rng)));
        ans
    }

    pub(crate) fn initial_guess() -> [Distribution; 2] {
        [Distribution::new(0.5, 1.0, 2.0), Distribution::new(0.5, 9.0, 2.0)]
    }

    /// 均值约为 (0, 0) 与 (10, 10), 各 400 个点, 带相关性.
    pub(crate) fn two_clusters2(seed: u64) -> Vec<Vector2<f64>> {
        let mut rng = StdRng::seed_from_u64(seed);
        let n = Normal::new(0.0, 1.0).unwrap();
        let mut ans = Vec::with_capacity(800);
        for center in [0.0, 10.0] {
            for _ in 0..400 {
                let u = n.sample(&mut rng);
                let v = n.sample(&mut rng);
                ans.push(Vector2::new(center + u, center + 0.6 * u + 0.8 * v));
            }
        }
        ans
    }

    #[test]
    fn test_em_two_clusters() {
        let _ = simple_logger::init_with_level(log::Level::Warn);
        let samples = two_clusters(7);
        let mut comps = initial_guess();
        let report = estimate_mixture(&samples, &mut comps, &EmParams::default()).unwrap();

        assert!(report.converged());
        assert!(report.iterations <= 200);
        assert_eq!(report.likelihoods.len(), report.iterations);
        assert!((comps[0].mean - 0.0).abs() < 0.3);
        assert!((comps[1].mean - 10.0).abs() < 0.3);
        for c in comps.iter() {
            assert!((c.weight - 0.5).abs() < 0.05);
            assert!((c.sd - 1.0).abs() < 0.2);
        }
    }

    #[test]
    fn test_em_weight_conservation_and_monotone() {
        let samples = two_clusters(11);
        // 故意给一个不太好的初值, 让迭代多跑几轮.
        let mut comps = [
            Distribution::new(2.0, 3.0, 5.0),
            Distribution::new(1.0, 4.0, 5.0),
        ];
        let report = estimate_mixture(&samples, &mut comps, &EmParams::new(200, 1e-9)).unwrap();
        let sum: f64 = comps.iter().map(|c| c.weight).sum();
        assert!((sum - 1.0).abs() < 1e-9);

        assert!(report.converged());
        assert_eq!(report.iterations, report.likelihoods.len());
        let ll = &report.likelihoods;
        let last = ll.len() - 1;
        assert!(ll[..last].windows(2).all(|w| w[1] >= w[0]));
        assert_eq!(report.log_likelihood, ll[last]);
        // 只有最后一轮可能下降, 且下降时停止原因与之一致.
        match report.termination {
            Termination::LikelihoodDecreased => assert!(ll[last] < ll[last - 1]),
            Termination::Converged => assert!(ll[last] - ll[last - 1] < 1e-9),
            Termination::MaxIterations => unreachable!(),
        }
    }

    #[test]
    fn test_em_max_iterations() {
        let samples = two_clusters(7);
        let mut comps = initial_guess();
        let report = estimate_mixture(&samples, &mut comps, &EmParams::new(1, 1e-6)).unwrap();
        assert_eq!(report.termination, Termination::MaxIterations);
        assert_eq!(report.iterations, 1);
        assert!(!report.converged());
        // 仍然返回最后一轮的参数.
        assert_ne!(comps, initial_guess());

        let mut comps = initial_guess();
        let report = estimate_mixture(&samples, &mut comps, &EmParams::new(0, 1e-6)).unwrap();
        assert_eq!(report.iterations, 0);
        assert!(report.likelihoods.is_empty());
        assert!(report.log_likelihood.is_finite());
    }

    #[test]
    fn test_em_input_errors() {
        let mut comps = initial_guess();
        assert_eq!(
            estimate_mixture::<f64>(&[], &mut comps, &EmParams::default()),
            Err(EstimateError::EmptyInput)
        );
        assert_eq!(
            estimate_mixture(&[1.0f32], &mut [], &EmParams::default()),
            Err(EstimateError::NoComponents)
        );
        let mut zero = [Distribution::new(0.0, 0.0, 1.0); 2];
        assert_eq!(
            estimate_mixture(&[1u8, 2, 3], &mut zero, &EmParams::default()),
            Err(EstimateError::NonPositiveWeights { sum: 0.0 })
        );
    }

    #[test]
    fn test_em_numerical_failures() {
        // 远离所有成分的样本.
        let mut comps = [Distribution::new(1.0, 1e6, 1.0)];
        assert_eq!(
            estimate_mixture(&[0.0, 1.0], &mut comps, &EmParams::default()),
            Err(EstimateError::DegenerateResponsibility { sample: 0 })
        );
        // 失败时参数不变.
        assert_eq!(comps[0], Distribution::new(1.0, 1e6, 1.0));

        // 第二个成分得不到任何责任.
        let mut comps = [Distribution::new(0.5, 0.0, 1.0), Distribution::new(0.5, 1e6, 1.0)];
        assert_eq!(
            estimate_mixture(&[0.0, 0.5, -0.5], &mut comps, &EmParams::default()),
            Err(EstimateError::ComponentCollapsed { component: 1 })
        );
    }

    #[test]
    fn test_em_2d() {
        let samples = two_clusters2(3);
        let mut comps = [
            Distribution2::new(0.5, Vector2::new(1.0, 1.0), [4.0, 0.0, 0.0, 4.0]),
            Distribution2::new(0.5, Vector2::new(9.0, 9.0), [4.0, 0.0, 0.0, 4.0]),
        ];
        let report = estimate_mixture2(&samples, &mut comps, &EmParams::default()).unwrap();
        assert!(report.converged());
        for (c, center) in comps.iter().zip([0.0, 10.0]) {
            assert!((c.weight - 0.5).abs() < 0.05);
            assert!((c.mean.x - center).abs() < 0.3);
            assert!((c.mean.y - center).abs() < 0.3);
            // 真实协方差为 [1, 0.6; 0.6, 1].
            assert!((c.cov[1] - 0.6).abs() < 0.25);
            assert!(c.det() > 0.0);
        }
    }
}
