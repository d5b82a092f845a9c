// This file implements functionality from FIPS 204 section 7.4 High Order / Low Order Bits and Hints

use crate::helpers::freeze;
use crate::types::{Zq, R, R0};
use crate::{D, Q};


/// # Algorithm 35: `Power2Round(r)` on page 40.
/// Decomposes `r` into `(r1, r0)` such that `r ≡ r1·2^d + r0 mod q`, without branching.
///
/// **Input**: `r ∈ [0, q)` <br>
/// **Output**: `(r1, r0)` with `r1 ∈ [0, 2^10)` and `r0 ∈ (−2^{d−1}, 2^{d−1}]`
pub(crate) fn power2round(r: Zq) -> (Zq, Zq) {
    debug_assert!((0..Q).contains(&r), "Alg 35: r out of range");
    // 1: r+ ← r mod q
    // 2: r0 ← r+ mod± 2^d
    // 3: return ((r+ − r0)/2^d, r0)
    let r1 = (r + (1 << (D - 1)) - 1) >> D;
    let r0 = r - (r1 << D);
    (r1, r0)
}


/// # Algorithm 36: `Decompose(r)` on page 40.
/// Decomposes `r` into `(r1, r0)` such that `r ≡ r1·(2γ2) + r0 mod q`. The division by `2γ2`
/// is done with multiply-and-shift and the corner case `r+ − r0 = q − 1` with masks, so the
/// running time is independent of `r`. Only the `γ2` branch (a parameter) is taken.
///
/// **Input**: `r ∈ [0, q)` <br>
/// **Output**: `(r1, r0)` with `r1 ∈ [0, (q − 1)/(2γ2))` and `r0 ∈ [−γ2, γ2]`
pub(crate) fn decompose(gamma2: i32, r: Zq) -> (Zq, Zq) {
    debug_assert!((0..Q).contains(&r), "Alg 36: r out of range");
    debug_assert!((gamma2 == (Q - 1) / 32) | (gamma2 == (Q - 1) / 88), "Alg 36: bad gamma2");

    // ⌈r / 128⌉, then ⌊r1 / (2γ2 / 128)⌉ by a fixed-point reciprocal
    let mut r1 = (r + 127) >> 7;
    if gamma2 == (Q - 1) / 32 {
        r1 = (r1 * 1025 + (1 << 21)) >> 22;
        r1 &= 15; // 16 → 0
    } else {
        r1 = (r1 * 11275 + (1 << 23)) >> 24;
        r1 ^= ((43 - r1) >> 31) & r1; // 44 → 0
    }

    // r0 ← r+ − r1·2γ2, centered; in the corner case this lands on r+ − q
    let mut r0 = r - r1 * 2 * gamma2;
    r0 -= (((Q - 1) / 2 - r0) >> 31) & Q;
    (r1, r0)
}


/// # Algorithm 37: `HighBits(r)` on page 40.
pub(crate) fn high_bits(gamma2: i32, r: Zq) -> Zq { decompose(gamma2, r).0 }


/// # Algorithm 38: `LowBits(r)` on page 41.
pub(crate) fn low_bits(gamma2: i32, r: Zq) -> Zq { decompose(gamma2, r).1 }


/// # Algorithm 39: `MakeHint(z, r)` on page 41.
/// Computes the hint bit indicating whether adding `z` to `r` alters the high bits of `r`.
///
/// **Input**: `r ∈ [0, q)`, `|z| < q` <br>
/// **Output**: hint bit as `0` or `1`
pub(crate) fn make_hint(gamma2: i32, z: Zq, r: Zq) -> Zq {
    // 1: r1 ← HighBits(r)
    let r1 = high_bits(gamma2, r);

    // 2: v1 ← HighBits(r + z)
    let v1 = high_bits(gamma2, freeze(r + z));

    // 3: return [[r1 ≠ v1]]
    i32::from(r1 != v1)
}


/// # Algorithm 40: `UseHint(h, r)` on page 41.
/// Returns the high bits of `r` adjusted according to hint `h`. Only used on public data.
///
/// **Input**: `h ∈ {0, 1}`, `r ∈ [0, q)` <br>
/// **Output**: `r1 ∈ [0, (q − 1)/(2γ2))`
pub(crate) fn use_hint(gamma2: i32, h: Zq, r: Zq) -> Zq {
    // 1: m ← (q − 1)/(2γ2)
    let m = (Q - 1) / (2 * gamma2);

    // 2: (r1, r0) ← Decompose(r)
    let (r1, r0) = decompose(gamma2, r);

    // 3: if h = 1 and r0 > 0 return (r1 + 1) mod m
    // 4: if h = 1 and r0 ≤ 0 return (r1 − 1) mod m
    // 5: return r1
    match (h == 1, r0 > 0) {
        (true, true) => (r1 + 1).rem_euclid(m),
        (true, false) => (r1 - 1).rem_euclid(m),
        (false, _) => r1,
    }
}


/// `Power2Round` applied to every coefficient of a `[0, q)`-valued vector; returns `(t1, t0)`.
pub(crate) fn power2round_vec<const K: usize>(t: &[R; K]) -> ([R; K], [R; K]) {
    let (mut t1, mut t0) = ([R0; K], [R0; K]);
    for k in 0..K {
        for n in 0..256 {
            (t1[k].0[n], t0[k].0[n]) = power2round(t[k].0[n]);
        }
    }
    (t1, t0)
}


/// `Decompose` applied to every coefficient of a `[0, q)`-valued vector; returns `(w1, w0)`.
pub(crate) fn decompose_vec<const K: usize>(gamma2: i32, w: &[R; K]) -> ([R; K], [R; K]) {
    let (mut w1, mut w0) = ([R0; K], [R0; K]);
    for k in 0..K {
        for n in 0..256 {
            (w1[k].0[n], w0[k].0[n]) = decompose(gamma2, w[k].0[n]);
        }
    }
    (w1, w0)
}


/// `MakeHint` applied coefficient-wise; `r` must be `[0, q)`-valued.
pub(crate) fn make_hint_vec<const K: usize>(gamma2: i32, z: &[R; K], r: &[R; K]) -> [R; K] {
    core::array::from_fn(|k| R(core::array::from_fn(|n| make_hint(gamma2, z[k].0[n], r[k].0[n]))))
}


/// `UseHint` applied coefficient-wise; `r` must be `[0, q)`-valued.
pub(crate) fn use_hint_vec<const K: usize>(gamma2: i32, h: &[R; K], r: &[R; K]) -> [R; K] {
    core::array::from_fn(|k| R(core::array::from_fn(|n| use_hint(gamma2, h[k].0[n], r[k].0[n]))))
}
