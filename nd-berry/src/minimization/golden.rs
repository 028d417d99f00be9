//! 黄金分割搜索.

use super::{enclose, Minimum, MinimizeResult};
use crate::consts::minimization::GOLDEN_SHRINK;

/// 黄金分割搜索求 `f` 的局部极小值 (线性收敛).
///
/// 先以 [`enclose`] 从 `a`, `b` 出发确定包围区间, 每步按黄金比例缩小区间,
/// 直到区间长度不超过 `tolerance * (|x1| + |x2|)` 或达到 `max_iterations`.
pub fn golden_section<F>(a: f64, b: f64, mut f: F, tolerance: f64, max_iterations: usize) -> MinimizeResult<Minimum>
where
    F: FnMut(f64) -> f64,
{
    let br = enclose(a, b, &mut f)?;
    let r = GOLDEN_SHRINK;
    let c = 1.0 - r;

    let (mut x0, mut x3) = (br.a, br.c);
    let (mut x1, mut x2) = if (br.c - br.b).abs() > (br.b - br.a).abs() {
        (br.b, br.b + c * (br.c - br.b))
    } else {
        (br.b - c * (br.b - br.a), br.b)
    };
    let mut f1 = f(x1);
    let mut f2 = f(x2);

    let mut iterations = 0;
    while (x3 - x0).abs() > tolerance * (x1.abs() + x2.abs()) && iterations < max_iterations {
        iterations += 1;
        if f2 < f1 {
            (x0, x1, x2) = (x1, x2, r * x2 + c * x3);
            f1 = f2;
            f2 = f(x2);
        } else {
            (x3, x2, x1) = (x2, x1, r * x1 + c * x0);
            f2 = f1;
            f1 = f(x1);
        }
    }

    let (x, value) = if f1 < f2 { (x1, f1) } else { (x2, f2) };
    Ok(Minimum { x, value, iterations })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_golden_parabola() {
        let m = golden_section(0.0, 5.0, |x| (x - 3.0) * (x - 3.0), 1e-6, 200).unwrap();
        assert!((m.x - 3.0).abs() < 1e-4);
        assert!(m.iterations < 200);
    }

    #[test]
    fn test_golden_slower_than_brent() {
        let f = |x: f64| (x - 3.0) * (x - 3.0) + 1.0;
        let g = golden_section(0.0, 5.0, f, 1e-6, 200).unwrap();
        let b = super::super::brent(0.0, 5.0, f, 1e-6, 200).unwrap();
        assert!(b.iterations < g.iterations);
        assert!((g.value - 1.0).abs() < 1e-8);
    }
}
