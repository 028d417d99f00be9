//! Powell 方向集方法.

use ndarray::{Array1, Array2};

use super::{line_minimize, relative_converged, MinimizeError, MinimizeResult, MinimumNd};

/// Powell 方法: 依次沿 `dirs` 的各列做一维搜索, 并以本轮总位移替换下降最多的方向.
///
/// `dirs` 为 `n x n` 的方向矩阵, 每列为一个方向, 计算过程中会被更新.
/// 通常以单位矩阵作为初始方向集.
///
/// # Errors
///
/// - `start` 为空时返回 [`MinimizeError::EmptyPoint`];
/// - `dirs` 形状不是 `n x n` 时返回 [`MinimizeError::DimensionMismatch`].
pub fn powell<F>(
    start: &Array1<f64>,
    dirs: &mut Array2<f64>,
    mut f: F,
    tolerance: f64,
    max_iterations: usize,
) -> MinimizeResult<MinimumNd>
where
    F: FnMut(&Array1<f64>) -> f64,
{
    let n = start.len();
    if n == 0 {
        return Err(MinimizeError::EmptyPoint);
    }
    if dirs.dim() != (n, n) {
        return Err(MinimizeError::DimensionMismatch {
            expected: (n, n),
            actual: dirs.dim(),
        });
    }

    let mut p = start.clone();
    let mut pt = p.clone();
    let mut fret = f(&p);

    for it in 1..=max_iterations {
        let fp = fret;
        let mut ibig = 0;
        let mut del = 0.0;

        for i in 0..n {
            let dir = dirs.column(i).to_owned();
            let fptt = fret;
            let m = line_minimize(&p, &dir, &mut f, tolerance)?;
            p.scaled_add(m.x, &dir);
            fret = m.value;
            if fptt - fret > del {
                del = fptt - fret;
                ibig = i;
            }
        }

        if relative_converged(fp, fret, tolerance) {
            return Ok(MinimumNd {
                point: p,
                value: fret,
                iterations: it,
            });
        }

        // 外推点与本轮平均方向.
        let ptt = &p * 2.0 - &pt;
        let xit = &p - &pt;
        pt.assign(&p);

        let fptt = f(&ptt);
        if fptt < fp {
            let t = 2.0 * (fp - 2.0 * fret + fptt) * (fp - fret - del).powi(2) - del * (fp - fptt).powi(2);
            if t < 0.0 {
                let m = line_minimize(&p, &xit, &mut f, tolerance)?;
                p.scaled_add(m.x, &xit);
                fret = m.value;
                let last = dirs.column(n - 1).to_owned();
                dirs.column_mut(ibig).assign(&last);
                dirs.column_mut(n - 1).assign(&xit);
            }
        }
        log::trace!("powell: 第 {it} 次迭代, f = {fret}");
    }

    log::debug!("powell: {max_iterations} 次迭代后未收敛");
    Ok(MinimumNd {
        point: p,
        value: fret,
        iterations: max_iterations,
    })
}
