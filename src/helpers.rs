// This file implements the modular arithmetic of FIPS 204 section 7.5 / appendix A along with
// a handful of constant-time utilities shared across the crate.

use crate::types::{R, T};
use crate::Q;


/// If the condition is not met, return an error message. Borrowed from the `anyhow` crate.
macro_rules! ensure {
    ($cond:expr, $msg:literal $(,)?) => {
        if !$cond {
            return Err($msg);
        }
    };
}

pub(crate) use ensure; // make available throughout crate


/// `q^{-1} mod 2^32`
const QINV: i32 = 58_728_449;

/// `2^64 mod q`, used to move values into the Montgomery domain.
#[allow(clippy::cast_possible_truncation)]
const R2_MOD_Q: i64 = ((1_i128 << 64) % (Q as i128)) as i64;


/// Bit length required to express `a` in bits
pub(crate) const fn bit_length(a: i32) -> usize { a.ilog2() as usize + 1 }


/// # Algorithm 49: `MontgomeryReduce(a)` on page 50.
/// Computes `a · 2^{−32} mod q`.
///
/// **Input**: integer `a` with `−2^31·q ≤ a ≤ 2^31·q`. <br>
/// **Output**: `r` with `r ≡ a · 2^{−32} (mod q)` and `−q < r < q`.
#[inline(always)]
#[allow(clippy::inline_always, clippy::cast_possible_truncation)]
pub(crate) const fn mont_reduce(a: i64) -> i32 {
    // t = a · q^{-1} mod 2^32, so that a − t·q is divisible by 2^32
    let t = (a as i32).wrapping_mul(QINV);
    ((a - (t as i64) * (Q as i64)) >> 32) as i32
}


/// Reduce a 32-bit value mod q without full normalization.
///
/// **Input**: `a ≤ 2^31 − 2^22 − 1`. <br>
/// **Output**: `r ≡ a (mod q)` with `−6_283_009 ≤ r ≤ 6_283_007`.
#[inline(always)]
#[allow(clippy::inline_always)]
pub(crate) const fn reduce32(a: i32) -> i32 {
    let x = (a + (1 << 22)) >> 23; // +2^22 ensures quotient is never 'too low'
    a - x * Q
}


/// Add `q` when `a` is negative; arithmetic mask rather than a branch.
#[inline(always)]
#[allow(clippy::inline_always)]
pub(crate) const fn caddq(a: i32) -> i32 { a + ((a >> 31) & Q) }


/// Fully reduce to the standard representative in `[0, q)`.
#[inline(always)]
#[allow(clippy::inline_always)]
pub(crate) const fn freeze(a: i32) -> i32 { caddq(reduce32(a)) }


/// `mod±`, see definition on page 6. For `a ∈ [0, q)` returns the representative in
/// `(−q/2, q/2]` using a mask rather than a comparison branch.
#[inline(always)]
#[allow(clippy::inline_always)]
pub(crate) const fn center_mod(a: i32) -> i32 {
    debug_assert!((a >= 0) & (a < Q), "center_mod: input out of range");
    a - (((Q / 2 - a) >> 31) & Q)
}


/// Converts each coefficient into the Montgomery domain, i.e., multiplies by `2^32 mod q`.
///
/// **Input**: coefficients with `|a| < 2^31` (all NTT outputs qualify). <br>
/// **Output**: coefficients in `(−q, q)`.
pub(crate) fn to_mont<const KL: usize>(t: &[T; KL]) -> [T; KL] {
    core::array::from_fn(|k| T(core::array::from_fn(|n| mont_reduce(i64::from(t[k].0[n]) * R2_MOD_Q))))
}


/// Checks the infinity norm of a polynomial vector against `bound`. Coefficients are expected
/// to come out of `reduce32()` (or be otherwise centered so that `|a| < q`). The absolute value
/// and comparison are computed with masks across every coefficient; the only value that may be
/// branched on by the caller is the single returned decision.
///
/// Returns `true` when any coefficient has `|a| ≥ bound`.
#[allow(clippy::cast_sign_loss)]
pub(crate) fn check_norm<const KL: usize>(w: &[R; KL], bound: i32) -> bool {
    debug_assert!(bound <= (Q - 1) / 8, "check_norm: bound too large");
    let mut fail = 0u32;
    for poly in w {
        for &a in &poly.0 {
            // |a| without a branch: subtract 2a when a is negative
            let mask = a >> 31;
            let abs = a - (mask & (2 * a));
            // (bound - 1 - abs) is negative exactly when abs >= bound
            fail |= ((bound - 1 - abs) >> 31) as u32;
        }
    }
    // Declassify: the rejection decision itself is public.
    fail != 0
}


/// `mod±` applied to every coefficient of a `[0, q)`-valued vector, ready for [`check_norm`].
pub(crate) fn center_vec<const KL: usize>(w: &[R; KL]) -> [R; KL] {
    core::array::from_fn(|k| R(core::array::from_fn(|n| center_mod(w[k].0[n]))))
}
