//! EM 迭代的通用实现. 一维/二维, 样本/直方图各变体共用同一状态机,
//! 区别只在于数据点类型和每个点的计数 (样本恒为 1).

use ndarray::ArrayView1;

use super::{Distribution, Distribution2, EmParams, EmReport, EstimateError, Termination};
use crate::consts::mixture::{COVARIANCE_EPSILON, WEIGHT_DRIFT_LIMIT};
use crate::{Array2, Vector2};

/// 可以参与 EM 估计的混合成分.
pub(crate) trait Component: Copy {
    /// 数据点类型.
    type Point: Copy;

    fn weight(&self) -> f64;

    fn set_weight(&mut self, w: f64);

    /// 归一化概率密度 (不含权重).
    fn density(&self, p: Self::Point) -> f64;

    /// M 步: 依据该成分的责任 `resp` 重新估计均值与散布. `wsum = Σ counts * resp > 0`.
    fn refit(&mut self, points: &[Self::Point], counts: &[f64], resp: ArrayView1<f64>, wsum: f64);
}

impl Component for Distribution {
    type Point = f64;

    #[inline]
    fn weight(&self) -> f64 {
        self.weight
    }

    #[inline]
    fn set_weight(&mut self, w: f64) {
        self.weight = w;
    }

    #[inline]
    fn density(&self, p: f64) -> f64 {
        self.pdf(p)
    }

    fn refit(&mut self, points: &[f64], counts: &[f64], resp: ArrayView1<f64>, wsum: f64) {
        let weighted = || points.iter().zip(counts).zip(resp.iter()).map(|((&x, &c), &r)| (x, c * r));
        let mean = weighted().map(|(x, w)| w * x).sum::<f64>() / wsum;
        let var = weighted().map(|(x, w)| w * (x - mean) * (x - mean)).sum::<f64>() / wsum;
        self.mean = mean;
        self.sd = var.sqrt();
    }
}

impl Component for Distribution2 {
    type Point = Vector2<f64>;

    #[inline]
    fn weight(&self) -> f64 {
        self.weight
    }

    #[inline]
    fn set_weight(&mut self, w: f64) {
        self.weight = w;
    }

    #[inline]
    fn density(&self, p: Vector2<f64>) -> f64 {
        self.pdf(p)
    }

    fn refit(&mut self, points: &[Vector2<f64>], counts: &[f64], resp: ArrayView1<f64>, wsum: f64) {
        let weighted = || points.iter().zip(counts).zip(resp.iter()).map(|((&p, &c), &r)| (p, c * r));
        let mean = weighted().fold(Vector2::default(), |acc, (p, w)| acc + p * w) / wsum;
        let (mut v1, mut v2, mut v3) = (0.0, 0.0, 0.0);
        for (p, w) in weighted() {
            let d = p - mean;
            v1 += w * d.x * d.x;
            v2 += w * d.y * d.y;
            v3 += w * d.x * d.y;
        }
        let (v1, v2) = (v1 / wsum, v2 / wsum);
        let mut v3 = v3 / wsum;
        // 保持协方差矩阵正定.
        if v1 * v2 <= v3 * v3 {
            v3 = v3.signum() * ((v1 * v2).sqrt() - COVARIANCE_EPSILON);
        }
        self.mean = mean;
        self.cov = [v1, v3, v3, v2];
    }
}

/// 由相邻两轮的对数似然判断是否停止迭代; 第一轮 (`prev` 为空) 总是继续.
fn stop_reason(prev: Option<f64>, ll: f64, epsilon: f64) -> Option<Termination> {
    let prev = prev?;
    if ll < prev {
        Some(Termination::LikelihoodDecreased)
    } else if ll - prev < epsilon {
        Some(Termination::Converged)
    } else {
        None
    }
}

/// 以 `points` (及其计数 `counts`) 估计混合成分 `comps`.
///
/// 所有计算都在 `comps` 的副本上进行, 只有成功时才写回.
pub(crate) fn estimate<C: Component>(
    points: &[C::Point],
    counts: &[f64],
    comps: &mut [C],
    params: &EmParams,
) -> Result<EmReport, EstimateError> {
    debug_assert_eq!(points.len(), counts.len());
    if points.is_empty() {
        return Err(EstimateError::EmptyInput);
    }
    if comps.is_empty() {
        return Err(EstimateError::NoComponents);
    }

    let mut work = comps.to_vec();
    let sum: f64 = work.iter().map(C::weight).sum();
    if !(sum > 0.0 && sum.is_finite()) {
        return Err(EstimateError::NonPositiveWeights { sum });
    }
    work.iter_mut().for_each(|c| c.set_weight(c.weight() / sum));

    let total: f64 = counts.iter().sum();
    // 责任矩阵: 第一个轴为数据点, 第二个轴为成分.
    let mut resp = Array2::from_elem([points.len(), work.len()], 0.0f64);
    let mut likelihoods = Vec::new();
    let mut termination = Termination::MaxIterations;
    let mut iterations = 0;

    for it in 1..=params.max_iterations {
        iterations = it;
        expectation(&work, points, &mut resp)?;
        maximization(&mut work, points, counts, &resp, total)?;

        let weight_sum: f64 = work.iter().map(C::weight).sum();
        if (weight_sum - 1.0).abs() > WEIGHT_DRIFT_LIMIT {
            return Err(EstimateError::WeightDrift { sum: weight_sum });
        }

        let ll = log_likelihood(&work, points, counts)?;
        log::debug!("EM 第 {it} 轮: 对数似然 {ll}");
        let prev = likelihoods.last().copied();
        likelihoods.push(ll);
        if let Some(reason) = stop_reason(prev, ll, params.epsilon) {
            termination = reason;
            break;
        }
    }

    if termination == Termination::MaxIterations {
        log::warn!("EM 在 {} 轮内未收敛", params.max_iterations);
    }
    let log_likelihood = match likelihoods.last() {
        Some(&ll) => ll,
        None => log_likelihood(&work, points, counts)?,
    };
    comps.copy_from_slice(&work);
    Ok(EmReport {
        iterations,
        termination,
        log_likelihood,
        likelihoods,
    })
}

/// E 步: 计算每个数据点属于每个成分的后验概率.
fn expectation<C: Component>(comps: &[C], points: &[C::Point], resp: &mut Array2<f64>) -> Result<(), EstimateError> {
    for (n, &p) in points.iter().enumerate() {
        let mut row = resp.y_lane_mut(n, 0);
        for (r, c) in row.iter_mut().zip(comps) {
            *r = c.weight() * c.density(p);
        }
        let sum = row.sum();
        if !(sum > 0.0 && sum.is_finite()) {
            return Err(EstimateError::DegenerateResponsibility { sample: n });
        }
        row.mapv_inplace(|r| r / sum);
    }
    Ok(())
}

/// M 步: 以责任加权重新估计每个成分.
fn maximization<C: Component>(
    comps: &mut [C],
    points: &[C::Point],
    counts: &[f64],
    resp: &Array2<f64>,
    total: f64,
) -> Result<(), EstimateError> {
    for (m, c) in comps.iter_mut().enumerate() {
        let col = resp.x_lane(m, 0);
        let wsum: f64 = counts.iter().zip(col.iter()).map(|(n, r)| n * r).sum();
        if !(wsum > 0.0 && wsum.is_finite()) {
            return Err(EstimateError::ComponentCollapsed { component: m });
        }
        c.set_weight(wsum / total);
        c.refit(points, counts, col, wsum);
    }
    Ok(())
}

/// 混合分布的对数似然 `Σ count * ln Σ weight * pdf`.
fn log_likelihood<C: Component>(comps: &[C], points: &[C::Point], counts: &[f64]) -> Result<f64, EstimateError> {
    points
        .iter()
        .zip(counts)
        .enumerate()
        .try_fold(0.0, |acc, (n, (&p, &count))| {
            let density: f64 = comps.iter().map(|c| c.weight() * c.density(p)).sum();
            if density > 0.0 && density.is_finite() {
                Ok(acc + count * density.ln())
            } else {
                Err(EstimateError::ZeroLikelihood { sample: n })
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array1;

    #[test]
    fn test_stop_reason() {
        assert_eq!(stop_reason(None, -10.0, 1e-6), None);
        assert_eq!(stop_reason(Some(-10.0), -5.0, 1e-6), None);
        assert_eq!(
            stop_reason(Some(-10.0), -10.0 + 1e-9, 1e-6),
            Some(Termination::Converged)
        );
        assert_eq!(stop_reason(Some(-10.0), -10.0, 1e-6), Some(Termination::Converged));
        // 任何下降都优先于收敛判据, 即使下降量小于 epsilon.
        assert_eq!(
            stop_reason(Some(-10.0), -10.0 - 1e-9, 1e-6),
            Some(Termination::LikelihoodDecreased)
        );
        assert_eq!(
            stop_reason(Some(-10.0), -12.0, 1e-6),
            Some(Termination::LikelihoodDecreased)
        );
    }

    #[test]
    fn test_covariance_clamp_keeps_sign() {
        let ones = [1.0; 4];
        let resp = Array1::from_elem(4, 1.0);
        for sign in [1.0, -1.0] {
            let points: Vec<_> = (0..4).map(|i| Vector2::new(i as f64, sign * i as f64)).collect();
            let mut d = Distribution2::default();
            d.refit(&points, &ones, resp.view(), 4.0);
            assert_eq!(d.mean, Vector2::new(1.5, sign * 1.5));
            assert_eq!(d.cov[0], 1.25);
            assert_eq!(d.cov[3], 1.25);
            assert_eq!(d.cov[1], d.cov[2]);
            assert_eq!(d.cov[1].signum(), sign);
            assert!(d.det() > 0.0);
        }
    }

    #[test]
    fn test_refit_weighted_counts() {
        // 计数 3 的点等价于重复 3 次.
        let mut a = Distribution::default();
        a.refit(&[1.0, 5.0], &[3.0, 1.0], Array1::from_elem(2, 1.0).view(), 4.0);
        let mut b = Distribution::default();
        b.refit(&[1.0, 1.0, 1.0, 5.0], &[1.0; 4], Array1::from_elem(4, 1.0).view(), 4.0);
        assert_eq!(a, b);
        assert_eq!(a.mean, 2.0);
        assert_eq!(a.sd, 3.0f64.sqrt());
    }
}
