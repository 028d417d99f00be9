//! Brent 方法.

use super::bracket::sign;
use super::{enclose, Minimum, MinimizeResult};
use crate::consts::minimization::{GOLDEN_STEP, ZEPS};

/// Brent 方法求 `f` 的局部极小值 (超线性收敛).
///
/// 先以 [`enclose`] 从 `a`, `b` 出发确定包围区间, 然后在区间内交替使用抛物线插值
/// 与黄金分割: 抛物线步落在区间外, 或没有比上上步缩小一半以上时退化为黄金分割步.
///
/// 当 `|x - xm| <= 2 * (tolerance * |x| + ZEPS) - (b - a) / 2` 时停止; 达到
/// `max_iterations` 时返回当前最优点.
pub fn brent<F>(a: f64, b: f64, mut f: F, tolerance: f64, max_iterations: usize) -> MinimizeResult<Minimum>
where
    F: FnMut(f64) -> f64,
{
    let br = enclose(a, b, &mut f)?;
    let (mut a, mut b) = (br.lower(), br.upper());
    let (mut x, mut w, mut v) = (br.b, br.b, br.b);
    let (mut fx, mut fw, mut fv) = (br.fb, br.fb, br.fb);
    // `d` 为本步步长, `e` 为上上步步长.
    let mut d = 0.0f64;
    let mut e = 0.0f64;

    for it in 1..=max_iterations {
        let xm = 0.5 * (a + b);
        let tol1 = tolerance * x.abs() + ZEPS;
        let tol2 = 2.0 * tol1;
        if (x - xm).abs() <= tol2 - 0.5 * (b - a) {
            return Ok(Minimum {
                x,
                value: fx,
                iterations: it,
            });
        }

        let mut golden = true;
        if e.abs() > tol1 {
            let r = (x - w) * (fx - fv);
            let mut q = (x - v) * (fx - fw);
            let mut p = (x - v) * q - (x - w) * r;
            q = 2.0 * (q - r);
            if q > 0.0 {
                p = -p;
            }
            q = q.abs();
            let e_prev = e;
            e = d;
            if !(p.abs() >= (0.5 * q * e_prev).abs() || p <= q * (a - x) || p >= q * (b - x)) {
                golden = false;
                d = p / q;
                let u = x + d;
                if u - a < tol2 || b - u < tol2 {
                    d = sign(tol1, xm - x);
                }
            }
        }
        if golden {
            e = if x >= xm { a - x } else { b - x };
            d = GOLDEN_STEP * e;
        }

        let u = if d.abs() >= tol1 { x + d } else { x + sign(tol1, d) };
        let fu = f(u);
        if fu <= fx {
            if u >= x {
                a = x;
            } else {
                b = x;
            }
            (v, w, x) = (w, x, u);
            (fv, fw, fx) = (fw, fx, fu);
        } else {
            if u < x {
                a = u;
            } else {
                b = u;
            }
            if fu <= fw || w == x {
                (v, w) = (w, u);
                (fv, fw) = (fw, fu);
            } else if fu <= fv || v == x || v == w {
                v = u;
                fv = fu;
            }
        }
    }

    log::debug!("brent: {max_iterations} 次迭代后未满足收敛条件");
    Ok(Minimum {
        x,
        value: fx,
        iterations: max_iterations,
    })
}
