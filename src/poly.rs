// Polynomial and polynomial-vector arithmetic over R_q and T_q. Products in T_q are Montgomery
// products, so exactly one operand of each product is expected to be in Montgomery form (see
// `helpers::to_mont`), leaving the result as the plain product mod q.

use crate::helpers::{mont_reduce, reduce32};
use crate::types::{R, T};


/// Pointwise Montgomery product of two NTT-domain polynomials.
///
/// **Input**: `|a[n] · b[n]| ≤ 2^31·q` (e.g., one operand below `q`, the other below `9q`) <br>
/// **Output**: `c[n] ≡ a[n] · b[n] · 2^{−32}`, with every `|c[n]| < q`
pub(crate) fn pointwise_montgomery(a: &T, b: &T) -> T {
    T(core::array::from_fn(|n| mont_reduce(i64::from(a.0[n]) * i64::from(b.0[n]))))
}


/// Multiplies every polynomial of a vector by the same polynomial `c`, pointwise in `T_q`.
/// The output vector has the same length as the input and every coefficient is below `q`.
pub(crate) fn polyvec_pointwise_poly_montgomery<const KL: usize>(c: &T, v: &[T; KL]) -> [T; KL] {
    core::array::from_fn(|k| pointwise_montgomery(c, &v[k]))
}


/// Matrix-vector product `A_hat ∘ u_hat` in `T_q`, with `A_hat` in Montgomery form.
///
/// **Input**: `|a_hat| < q`, `|u_hat| < 9q` <br>
/// **Output**: `K` polynomials with every coefficient reduced by `reduce32()` (so below `q`)
pub(crate) fn mat_vec_mul<const K: usize, const L: usize>(a_hat: &[[T; L]; K], u_hat: &[T; L]) -> [T; K] {
    let mut w_hat = [T([0; 256]); K];
    for k in 0..K {
        for l in 0..L {
            let p = pointwise_montgomery(&a_hat[k][l], &u_hat[l]);
            // at most L = 7 terms, each below q
            for n in 0..256 {
                w_hat[k].0[n] += p.0[n];
            }
        }
        for n in 0..256 {
            w_hat[k].0[n] = reduce32(w_hat[k].0[n]);
        }
    }
    w_hat
}


/// Coefficient-wise vector addition in `R_q`, without reduction.
pub(crate) fn add_vector<const KL: usize>(a: &[R; KL], b: &[R; KL]) -> [R; KL] {
    core::array::from_fn(|k| R(core::array::from_fn(|n| a[k].0[n] + b[k].0[n])))
}


/// Coefficient-wise vector subtraction in `T_q`; the result is brought back below `q` with
/// `reduce32()` so that it may be handed to `inv_ntt()`.
pub(crate) fn sub_vector_ntt<const KL: usize>(a: &[T; KL], b: &[T; KL]) -> [T; KL] {
    core::array::from_fn(|k| T(core::array::from_fn(|n| reduce32(a[k].0[n] - b[k].0[n]))))
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::helpers::to_mont;
    use crate::ntt::{inv_ntt, ntt};
    use crate::Q;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn schoolbook(a: &R, b: &R) -> R {
        let mut c = [0i64; 256];
        for i in 0..256 {
            for j in 0..256 {
                let p = i64::from(a.0[i]) * i64::from(b.0[j]);
                if i + j < 256 {
                    c[i + j] += p;
                } else {
                    c[i + j - 256] -= p;
                }
            }
        }
        #[allow(clippy::cast_possible_truncation)]
        R(core::array::from_fn(|n| c[n].rem_euclid(i64::from(Q)) as i32))
    }

    fn random_r(rng: &mut impl Rng, bound: i32) -> R {
        R(core::array::from_fn(|_| rng.gen_range(-bound + 1..bound)))
    }

    #[test]
    fn test_pointwise_matches_schoolbook() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..10 {
            let a = random_r(&mut rng, Q);
            let b = random_r(&mut rng, 5);
            let a_hat = to_mont(&ntt(&[a]));
            let b_hat = ntt(&[b]);
            let c = inv_ntt(&[pointwise_montgomery(&a_hat[0], &b_hat[0])]);
            assert_eq!(c[0], schoolbook(&a, &b));
        }
    }

    #[test]
    fn test_polyvec_pointwise_shape_and_bound() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let c = to_mont(&ntt(&[random_r(&mut rng, 2)]));
        let v: [R; 6] = core::array::from_fn(|_| random_r(&mut rng, Q));
        let v_hat = ntt(&v);
        let out = polyvec_pointwise_poly_montgomery(&c[0], &v_hat);
        assert_eq!(out.len(), 6);
        assert!(out.iter().all(T::below_q));
        // each polynomial is still the product of c with the matching input
        let back = inv_ntt(&out);
        let c_r = inv_ntt(&[T(core::array::from_fn(|n| mont_reduce(i64::from(c[0].0[n]))))]);
        for k in 0..6 {
            assert_eq!(back[k], schoolbook(&c_r[0], &v[k]));
        }
    }

    #[test]
    fn test_mat_vec_mul_bound() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        // worst-case magnitudes: Montgomery matrix entries near q, vector entries near 9q
        let a_hat: [[T; 7]; 8] =
            core::array::from_fn(|_| core::array::from_fn(|_| T(core::array::from_fn(|_| rng.gen_range(-Q + 1..Q)))));
        let u_hat: [T; 7] = core::array::from_fn(|_| T(core::array::from_fn(|_| rng.gen_range(-9 * Q + 1..9 * Q))));
        let w_hat = mat_vec_mul(&a_hat, &u_hat);
        assert!(w_hat.iter().all(T::below_q));
    }
}
