// This file implements functionality from FIPS 204 section 7.5 `NTT` and `NTT^{−1}`

use crate::helpers::{freeze, mont_reduce};
use crate::types::{R, T};
use crate::{Q, ZETA};


/// Table of `ζ^{BitRev8(i)} · 2^32 mod q` for `i ∈ 0..256`, centered in `(−q/2, q/2]`.
/// Built at compile time; this is the only static in the crate.
pub(crate) static ZETA_TABLE_MONT: [i32; 256] = gen_zeta_table_mont();


#[allow(clippy::cast_possible_truncation)]
const fn gen_zeta_table_mont() -> [i32; 256] {
    let mut result = [0i32; 256];
    let mut i = 0;
    while i < 256 {
        let brv = (i as u8).reverse_bits() as u32;
        let z = pow_mod_q(ZETA, brv);
        // Montgomery form, then center
        let z = ((z as i64) << 32).rem_euclid(Q as i64) as i32;
        result[i] = if z > Q / 2 { z - Q } else { z };
        i += 1;
    }
    result
}


/// `g^e mod q` by square-and-multiply; only used at compile time.
#[allow(clippy::cast_possible_truncation)]
const fn pow_mod_q(g: i32, e: u32) -> i32 {
    let g = g as i64;
    let mut result = 1i64;
    let mut base = g;
    let mut e = e;
    while e > 0 {
        if e & 1 == 1 {
            result = (result * base).rem_euclid(Q as i64);
        }
        base = (base * base).rem_euclid(Q as i64);
        e >>= 1;
    }
    result as i32
}


/// A single Cooley–Tukey layer over one block: for `j ∈ start..start+len` computes
/// `t ← zeta · w[j + len]`, `w[j + len] ← w[j] − t`, `w[j] ← w[j] + t`.
///
/// **Input**: `zeta` in Montgomery form with `|zeta| ≤ q/2`; every `|w[j]|` in the block
/// `< bound − q`. <br>
/// **Output**: every `|w[j]|` in the block `< bound`.
pub(crate) fn butterfly_block(w: &mut [i32; 256], zeta: i32, start: usize, len: usize, bound: i32) {
    debug_assert!((len > 0) & (start + 2 * len <= 256), "butterfly_block: block out of range");
    debug_assert!(zeta.abs() <= Q / 2, "butterfly_block: zeta out of range");
    debug_assert!(
        w[start..start + 2 * len].iter().all(|&e| e.abs() < bound - Q),
        "butterfly_block: input exceeds bound − q"
    );
    for j in start..(start + len) {
        // |t| < q, so the outputs grow by at most q
        let t = mont_reduce(i64::from(zeta) * i64::from(w[j + len]));
        w[j + len] = w[j] - t;
        w[j] += t;
    }
    debug_assert!(
        w[start..start + 2 * len].iter().all(|&e| e.abs() < bound),
        "butterfly_block: output exceeds bound"
    );
}


/// # Algorithm 41: `NTT(w)` on page 43.
/// Computes the Number-Theoretic Transform of each polynomial in a vector.
///
/// **Input**: polynomials `w(X) = ∑_{j=0}^{255} w_j X^j ∈ R_q` with every `|w_j| < q` <br>
/// **Output**: `w_hat = (w_hat[0], ... , w_hat[255]) ∈ T_q` with every `|w_hat[j]| < 9q`
pub(crate) fn ntt<const KL: usize>(w: &[R; KL]) -> [T; KL] {
    // 1: for j from 0 to 255 do
    // 2: w_hat[j] ← w_j
    // 3: end for
    let mut w_hat: [T; KL] = core::array::from_fn(|x| T(w[x].0));

    for w_poly in &mut w_hat {
        debug_assert!(w_poly.below_q(), "Alg 41: input coefficient not below q");

        // 4: m ← 0
        let mut m = 0;

        // 5: len ← 128
        let mut len = 128;

        // layer number, starting at 1; outputs of layer ℓ are below (ℓ + 1)·q
        let mut layer = 1;

        // 6: while len ≥ 1 do
        while len >= 1 {
            //
            // 7: start ← 0
            let mut start = 0;

            // 8: while start < 256 do
            while start < 256 {
                //
                // 9: m ← m + 1
                m += 1;

                // 10: z ← zetas[m]
                // 11-15: butterfly over w_hat[start..start + 2·len]
                butterfly_block(&mut w_poly.0, ZETA_TABLE_MONT[m], start, len, (layer + 1) * Q);

                // 16: start ← start + 2 · len
                start += 2 * len;
            }

            // 18: len ← ⌊len/2⌋
            len >>= 1;
            layer += 1;
        }
    }

    // 20: return ŵ
    w_hat
}


/// # Algorithm 42: `NTT^{−1}(w_hat)` on page 44.
/// Computes the inverse of the Number-Theoretic Transform of each polynomial in a vector.
///
/// **Input**: `w_hat = (w_hat[0], ... , w_hat[255]) ∈ T_q` with every `|w_hat[j]| < q` <br>
/// **Output**: polynomials `w(X) = ∑_{j=0}^{255} w_j X^j ∈ R_q` with every `w_j ∈ [0, q)`
pub(crate) fn inv_ntt<const KL: usize>(w_hat: &[T; KL]) -> [R; KL] {
    // 2^24 mod q; Montgomery multiplication by this scales by 256^{−1}
    const F_MONT: i64 = 16_382;

    // 1: for j from 0 to 255 do
    // 2: w_j ← w_hat[j]
    // 3: end for
    let mut w_out: [R; KL] = core::array::from_fn(|x| R(w_hat[x].0));

    for w_poly in &mut w_out {
        debug_assert!(T(w_poly.0).below_q(), "Alg 42: input coefficient not below q");

        // 4: m ← 256
        let mut m = 256;

        // 5: len ← 1
        let mut len = 1;

        // 6: while len < 256 do
        while len < 256 {
            //
            // 7: start ← 0
            let mut start = 0;

            // 8: while start < 256 do
            while start < 256 {
                //
                // 9: m ← m − 1
                m -= 1;

                // 10: z ← −zetas[m]
                let zeta = i64::from(-ZETA_TABLE_MONT[m]);

                // 11: for j from start to start + len − 1 do
                for j in start..(start + len) {
                    //
                    // 12: t ← w_j
                    let t = w_poly.0[j];

                    // 13: w_j ← t + w_{j+len}; the unreduced sums stay below 256·q < 2^31
                    w_poly.0[j] = t + w_poly.0[j + len];

                    // 14: w_{j+len} ← t − w_{j+len}
                    // 15: w_{j+len} ← z · w_{j+len}
                    w_poly.0[j + len] = mont_reduce(zeta * i64::from(t - w_poly.0[j + len]));
                }

                // 17: start ← start + 2 · len
                start += 2 * len;
            }

            // 19: len ← 2 · len
            len <<= 1;
        }

        // 21: f ← 8347681          ▷ f = 256^{−1} mod q
        // 22: for j from 0 to 255 do
        // 23: w_j ← f · w_j
        for i in &mut w_poly.0 {
            *i = freeze(mont_reduce(F_MONT * i64::from(*i)));
        }
    }

    // 25: return w
    w_out
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::helpers::{reduce32, to_mont};
    use proptest::prelude::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn random_r(rng: &mut impl Rng) -> R { R(core::array::from_fn(|_| rng.gen_range(-Q + 1..Q))) }

    #[test]
    fn test_zeta_table() {
        assert_eq!(
            ZETA_TABLE_MONT[..8],
            [-4_186_625, 25_847, -2_608_894, -518_909, 237_124, -777_960, -876_248, 466_468]
        );
        assert!(ZETA_TABLE_MONT.iter().all(|z| z.abs() <= Q / 2));
        // zeta^{brv(1)} = zeta^128 is a square root of −1
        let z = i64::from(mont_reduce(i64::from(ZETA_TABLE_MONT[1])));
        assert_eq!((z * z).rem_euclid(i64::from(Q)), i64::from(Q - 1));
    }

    #[test]
    fn test_ntt_inverse() {
        let mut rng = ChaCha8Rng::seed_from_u64(123);
        for _ in 0..200 {
            let w = [random_r(&mut rng), random_r(&mut rng)];
            let w_hat = ntt(&w);
            assert!(w_hat.iter().all(|p| p.0.iter().all(|&e| e.abs() < 9 * Q)));
            // inv_ntt requires |coeff| < q
            let w_hat_small: [T; 2] = core::array::from_fn(|k| T(core::array::from_fn(|n| reduce32(w_hat[k].0[n]))));
            let w_back = inv_ntt(&w_hat_small);
            for k in 0..2 {
                for n in 0..256 {
                    assert_eq!(w_back[k].0[n], w[k].0[n].rem_euclid(Q));
                }
            }
        }
    }

    #[test]
    fn test_ntt_multiplication() {
        // x · x^255 = x^256 = −1 in R_q
        let mut a = R([0; 256]);
        a.0[1] = 1;
        let mut b = R([0; 256]);
        b.0[255] = 1;
        let a_hat = ntt(&[a]);
        let b_hat = to_mont(&ntt(&[b]));
        let c_hat = [T(core::array::from_fn(|n| mont_reduce(i64::from(a_hat[0].0[n]) * i64::from(b_hat[0].0[n]))))];
        let c = inv_ntt(&c_hat);
        assert_eq!(c[0].0[0], Q - 1);
        assert!(c[0].0[1..].iter().all(|&e| e == 0));
    }

    // Walk the full forward schedule by hand, checking every (layer, block) pair against the
    // bound convention with worst-case inputs.
    #[test]
    fn test_butterfly_schedule_bounds() {
        let mut w = [Q - 1; 256];
        let mut m = 0;
        let mut len = 128;
        let mut layer = 1;
        while len >= 1 {
            let bound = (layer + 1) * Q;
            let mut start = 0;
            while start < 256 {
                m += 1;
                assert!(w[start..start + 2 * len].iter().all(|&e| e.abs() < bound - Q));
                butterfly_block(&mut w, ZETA_TABLE_MONT[m], start, len, bound);
                assert!(w[start..start + 2 * len].iter().all(|&e| e.abs() < bound));
                start += 2 * len;
            }
            len >>= 1;
            layer += 1;
        }
        assert_eq!(m, 255);
        assert!(w.iter().all(|&e| e.abs() < 9 * Q));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_butterfly_block_bound(
            seed in any::<u64>(), layer in 1i32..=8, block in 0usize..128, zeta_idx in 1usize..256
        ) {
            let len = 128usize >> (layer - 1);
            let start = (block % (128 / len)) * 2 * len;
            let bound = (layer + 1) * Q;
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut w = [0i32; 256];
            for e in &mut w[start..start + 2 * len] {
                *e = rng.gen_range(-(bound - Q) + 1..bound - Q);
            }
            butterfly_block(&mut w, ZETA_TABLE_MONT[zeta_idx], start, len, bound);
            prop_assert!(w[start..start + 2 * len].iter().all(|&e| e.abs() < bound));
        }

        #[test]
        fn prop_ntt_roundtrip(seed in any::<u64>()) {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let w = [random_r(&mut rng)];
            let w_hat = ntt(&w);
            let w_hat: [T; 1] = [T(core::array::from_fn(|n| reduce32(w_hat[0].0[n])))];
            let w_back = inv_ntt(&w_hat);
            for n in 0..256 {
                prop_assert_eq!(w_back[0].0[n], w[0].0[n].rem_euclid(Q));
            }
        }
    }
}
