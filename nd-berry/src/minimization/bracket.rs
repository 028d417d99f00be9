//! 包围区间搜索.

use super::{MinimizeError, MinimizeResult};
use crate::consts::minimization::{BRACKET_GROWTH_LIMIT, BRACKET_MAX_ITERATIONS, GOLDEN_RATIO, TINY};

/// 包围一个局部极小值的三元组: `b` 位于 `a` 与 `c` 之间, 且 `f(b) <= f(a)`, `f(b) <= f(c)`.
///
/// `a` 与 `c` 的大小关系不确定.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bracket {
    /// 一端.
    pub a: f64,
    /// 中间点.
    pub b: f64,
    /// 另一端.
    pub c: f64,
    /// `f(a)`.
    pub fa: f64,
    /// `f(b)`.
    pub fb: f64,
    /// `f(c)`.
    pub fc: f64,
}

impl Bracket {
    /// 区间左端.
    #[inline]
    pub fn lower(&self) -> f64 {
        self.a.min(self.c)
    }

    /// 区间右端.
    #[inline]
    pub fn upper(&self) -> f64 {
        self.a.max(self.c)
    }
}

/// `|a|` 带上 `b` 的符号.
#[inline]
pub(super) fn sign(a: f64, b: f64) -> f64 {
    if b >= 0.0 {
        a.abs()
    } else {
        -a.abs()
    }
}

/// 从 `a`, `b` 出发, 沿下降方向以黄金比例步长和抛物线外插扩展, 找到包围极小值的区间.
///
/// `a == b` 时取 `b = a + 1`. 抛物线外插的步长不超过当前步长的
/// `BRACKET_GROWTH_LIMIT` 倍.
///
/// # 注意
///
/// 单调函数没有包围区间, 扩展 `BRACKET_MAX_ITERATIONS` 次后返回
/// [`MinimizeError::BracketNotFound`].
pub fn enclose<F>(mut a: f64, mut b: f64, f: &mut F) -> MinimizeResult<Bracket>
where
    F: FnMut(f64) -> f64,
{
    if a == b {
        b = a + 1.0;
    }
    let mut fa = f(a);
    let mut fb = f(b);
    if fb > fa {
        std::mem::swap(&mut a, &mut b);
        std::mem::swap(&mut fa, &mut fb);
    }
    let mut c = b + GOLDEN_RATIO * (b - a);
    let mut fc = f(c);

    let mut iterations = 0;
    while fb > fc {
        iterations += 1;
        if iterations > BRACKET_MAX_ITERATIONS {
            return Err(MinimizeError::BracketNotFound {
                iterations: BRACKET_MAX_ITERATIONS,
            });
        }

        // 过 (a, b, c) 的抛物线的极小点.
        let r = (b - a) * (fb - fc);
        let q = (b - c) * (fb - fa);
        let mut u = b - ((b - c) * q - (b - a) * r) / (2.0 * sign((q - r).abs().max(TINY), q - r));
        let ulim = b + BRACKET_GROWTH_LIMIT * (c - b);
        let mut fu;

        if (b - u) * (u - c) > 0.0 {
            fu = f(u);
            if fu < fc {
                return Ok(Bracket {
                    a: b,
                    b: u,
                    c,
                    fa: fb,
                    fb: fu,
                    fc,
                });
            } else if fu > fb {
                return Ok(Bracket {
                    a,
                    b,
                    c: u,
                    fa,
                    fb,
                    fc: fu,
                });
            }
            u = c + GOLDEN_RATIO * (c - b);
            fu = f(u);
        } else if (c - u) * (u - ulim) > 0.0 {
            fu = f(u);
            if fu < fc {
                let next = u + GOLDEN_RATIO * (u - c);
                b = c;
                c = u;
                u = next;
                fb = fc;
                fc = fu;
                fu = f(u);
            }
        } else if (u - ulim) * (ulim - c) >= 0.0 {
            u = ulim;
            fu = f(u);
        } else {
            u = c + GOLDEN_RATIO * (c - b);
            fu = f(u);
        }

        a = b;
        b = c;
        c = u;
        fa = fb;
        fb = fc;
        fc = fu;
    }

    Ok(Bracket { a, b, c, fa, fb, fc })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_bracket(br: &Bracket) -> bool {
        br.lower() < br.b && br.b < br.upper() && br.fb <= br.fa && br.fb <= br.fc
    }

    #[test]
    fn test_enclose_parabola() {
        let mut f = |x: f64| (x - 3.0) * (x - 3.0);
        let br = enclose(0.0, 5.0, &mut f).unwrap();
        assert!(is_bracket(&br));
        assert!(br.lower() <= 3.0 && 3.0 <= br.upper());

        // 从远处出发需要多次扩展.
        let br = enclose(-100.0, -99.0, &mut f).unwrap();
        assert!(is_bracket(&br));
        assert!(br.lower() <= 3.0 && 3.0 <= br.upper());

        // 起点相同.
        let br = enclose(10.0, 10.0, &mut f).unwrap();
        assert!(is_bracket(&br));
    }

    #[test]
    fn test_enclose_monotone() {
        assert_eq!(
            enclose(0.0, 1.0, &mut |x| x),
            Err(MinimizeError::BracketNotFound {
                iterations: BRACKET_MAX_ITERATIONS
            })
        );
        assert!(enclose(0.0, 1.0, &mut |x: f64| 1.0 - 2.0 * x).is_err());
    }
}
