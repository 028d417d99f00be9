//! 梯度下降法.

use ndarray::Array1;

use super::{line_minimize, relative_converged, MinimizeError, MinimizeResult, MinimumNd};

/// 梯度下降: 每步沿 `-g(p)` 方向做一维搜索.
///
/// `g` 返回的梯度长度必须与 `start` 一致. 当相邻两步函数值满足相对收敛判据,
/// 或梯度为零时停止; 达到 `max_iterations` 时返回当前点.
pub fn gradient_descent<F, G>(
    start: &Array1<f64>,
    mut f: F,
    mut g: G,
    tolerance: f64,
    max_iterations: usize,
) -> MinimizeResult<MinimumNd>
where
    F: FnMut(&Array1<f64>) -> f64,
    G: FnMut(&Array1<f64>) -> Array1<f64>,
{
    let n = start.len();
    descend(start, &mut f, tolerance, max_iterations, |p, _| {
        let grad = g(p);
        if grad.len() != n {
            return Err(MinimizeError::DimensionMismatch {
                expected: (n, 1),
                actual: (grad.len(), 1),
            });
        }
        Ok(-grad)
    })
}

/// 梯度下降, 梯度由中心差分 `f(p - distance * e_i) - f(p + distance * e_i)` 近似.
pub fn gradient_descent_numeric<F>(
    start: &Array1<f64>,
    mut f: F,
    tolerance: f64,
    distance: f64,
    max_iterations: usize,
) -> MinimizeResult<MinimumNd>
where
    F: FnMut(&Array1<f64>) -> f64,
{
    descend(start, &mut f, tolerance, max_iterations, |p, f| {
        let mut shifted = p.clone();
        let dir = Array1::from_shape_fn(p.len(), |i| {
            shifted[i] = p[i] + distance;
            let hi = f(&shifted);
            shifted[i] = p[i] - distance;
            let lo = f(&shifted);
            shifted[i] = p[i];
            lo - hi
        });
        Ok(dir)
    })
}

/// 下降主循环. `direction` 给出未归一化的下降方向.
fn descend<F, D>(
    start: &Array1<f64>,
    f: &mut F,
    tolerance: f64,
    max_iterations: usize,
    mut direction: D,
) -> MinimizeResult<MinimumNd>
where
    F: FnMut(&Array1<f64>) -> f64,
    D: FnMut(&Array1<f64>, &mut F) -> MinimizeResult<Array1<f64>>,
{
    if start.is_empty() {
        return Err(MinimizeError::EmptyPoint);
    }

    let mut p = start.clone();
    let mut old = f(&p);

    for it in 1..=max_iterations {
        let mut dir = direction(&p, &mut *f)?;
        let norm = dir.dot(&dir).sqrt();
        if norm == 0.0 {
            return Ok(MinimumNd {
                point: p,
                value: old,
                iterations: it,
            });
        }
        dir /= norm;

        let m = line_minimize(&p, &dir, f, tolerance)?;
        if relative_converged(old, m.value, tolerance) {
            if m.value < old {
                p.scaled_add(m.x, &dir);
            }
            return Ok(MinimumNd {
                point: p,
                value: m.value.min(old),
                iterations: it,
            });
        }
        old = m.value;
        p.scaled_add(m.x, &dir);
        log::trace!("gradient: 第 {it} 次迭代, f = {old}");
    }

    log::debug!("gradient: {max_iterations} 次迭代后未收敛");
    Ok(MinimumNd {
        point: p,
        value: old,
        iterations: max_iterations,
    })
}
