//! 以直方图为输入的 EM 估计.
//!
//! 第 `i` 个格子代表位置 `(i + 0.5) * bin + minimum`, 其计数作为该位置的权重.
//! 计数为 0 (或负数) 的格子不参与计算.

use num::traits::AsPrimitive;

use super::{engine, Distribution, Distribution2, EmParams, EmReport, EstimateError};
use crate::{Array1, Array2, Vector2};

/// 以一维直方图估计一维高斯混合分布.
///
/// `minimum` 为第 0 个格子的左端, `bin` 为格宽.
pub fn estimate_mixture<C>(
    hist: &Array1<C>,
    comps: &mut [Distribution],
    minimum: f64,
    bin: f64,
    params: &EmParams,
) -> Result<EmReport, EstimateError>
where
    C: AsPrimitive<f64>,
{
    if !(bin > 0.0) {
        return Err(EstimateError::ZeroBinWidth);
    }
    let (points, counts): (Vec<f64>, Vec<f64>) = hist
        .indexed_iter()
        .map(|([i], c)| ((i as f64 + 0.5) * bin + minimum, AsPrimitive::<f64>::as_(*c)))
        .filter(|(_, c)| *c > 0.0)
        .unzip();
    engine::estimate(&points, &counts, comps, params)
}

/// 以二维直方图估计二维高斯混合分布.
///
/// `minimum` 为格子 `(0, 0)` 的左下角, 两个轴使用同一格宽 `bin`.
pub fn estimate_mixture2<C>(
    hist: &Array2<C>,
    comps: &mut [Distribution2],
    minimum: [f64; 2],
    bin: f64,
    params: &EmParams,
) -> Result<EmReport, EstimateError>
where
    C: AsPrimitive<f64>,
{
    if !(bin > 0.0) {
        return Err(EstimateError::ZeroBinWidth);
    }
    let (points, counts): (Vec<Vector2<f64>>, Vec<f64>) = hist
        .indexed_iter()
        .map(|([i, j], c)| {
            let p = Vector2::new(
                (i as f64 + 0.5) * bin + minimum[0],
                (j as f64 + 0.5) * bin + minimum[1],
            );
            (p, AsPrimitive::<f64>::as_(*c))
        })
        .filter(|(_, c)| *c > 0.0)
        .unzip();
    engine::estimate(&points, &counts, comps, params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mixture::tests::{initial_guess, two_clusters, two_clusters2};

    #[test]
    fn test_histogram_em() {
        let (minimum, bin) = (-5.0, 0.25);
        let mut hist = Array1::<u32>::from_extents([80]);
        for x in two_clusters(7) {
            let i = ((x - minimum) / bin).floor();
            if (0.0..80.0).contains(&i) {
                hist[[i as usize]] += 1;
            }
        }
        let mut comps = initial_guess();
        let report = estimate_mixture(&hist, &mut comps, minimum, bin, &EmParams::default()).unwrap();
        assert!(report.converged());
        assert!((comps[0].mean - 0.0).abs() < 0.3);
        assert!((comps[1].mean - 10.0).abs() < 0.3);
        assert!((comps[0].weight - 0.5).abs() < 0.05);
    }

    #[test]
    fn test_histogram_em_skips_empty_bins() {
        // 只有两个非零格子: 位置 1.5 (计数 3) 与 2.5 (计数 1).
        let hist = Array1::from_vec([4], vec![0.0, 3.0, 1.0, 0.0]).unwrap();
        let mut comps = [Distribution::new(1.0, 2.0, 1.0)];
        estimate_mixture(&hist, &mut comps, 0.0, 1.0, &EmParams::new(1, 1e-6)).unwrap();
        assert!((comps[0].mean - 1.75).abs() < 1e-12);
        assert!((comps[0].sd - 0.1875f64.sqrt()).abs() < 1e-12);

        let zeros = Array1::<u8>::from_extents([10]);
        assert_eq!(
            estimate_mixture(&zeros, &mut comps, 0.0, 1.0, &EmParams::default()),
            Err(EstimateError::EmptyInput)
        );
        assert_eq!(
            estimate_mixture(&hist, &mut comps, 0.0, 0.0, &EmParams::default()),
            Err(EstimateError::ZeroBinWidth)
        );
    }

    #[test]
    fn test_histogram_em_2d() {
        let (minimum, bin) = ([-5.0, -5.0], 0.5);
        let mut hist = Array2::<u16>::from_extents([40, 40]);
        for p in two_clusters2(5) {
            let i = ((p.x - minimum[0]) / bin).floor();
            let j = ((p.y - minimum[1]) / bin).floor();
            if (0.0..40.0).contains(&i) && (0.0..40.0).contains(&j) {
                hist[[i as usize, j as usize]] += 1;
            }
        }
        let mut comps = [
            Distribution2::new(0.5, Vector2::new(1.0, 1.0), [4.0, 0.0, 0.0, 4.0]),
            Distribution2::new(0.5, Vector2::new(9.0, 9.0), [4.0, 0.0, 0.0, 4.0]),
        ];
        estimate_mixture2(&hist, &mut comps, minimum, bin, &EmParams::default()).unwrap();
        for (c, center) in comps.iter().zip([0.0, 10.0]) {
            assert!((c.mean.x - center).abs() < 0.4);
            assert!((c.mean.y - center).abs() < 0.4);
            assert!((c.weight - 0.5).abs() < 0.05);
        }
    }
}
