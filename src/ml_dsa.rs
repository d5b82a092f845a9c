// This file implements functionality from FIPS 204 section 6: ML-DSA Internal Functions
// (key generation, signing and verification), plus key (de)serialization support.

use crate::encodings::{pk_decode, pk_encode, sig_decode, sig_encode, sk_decode, sk_encode, w1_encode};
use crate::hashing::{expand_a, expand_mask, h_xof, hash_message, sample_in_ball, sample_s1_s2};
use crate::helpers::{caddq, center_vec, check_norm, freeze, to_mont};
use crate::high_low::{decompose_vec, low_bits, make_hint_vec, power2round_vec, use_hint_vec};
use crate::ntt::{inv_ntt, ntt};
use crate::poly::{add_vector, mat_vec_mul, polyvec_pointwise_poly_montgomery, sub_vector_ntt};
use crate::types::{Ph, PrivateKey, PublicKey, R, T};
use crate::D;
use rand_core::CryptoRngCore;
use sha3::digest::XofReader;
use subtle::ConstantTimeEq;
use zeroize::Zeroize;


/// Algorithm 1 `ML-DSA.KeyGen()` on page 17, drawing the seed `ξ` from the supplied RNG.
///
/// # Errors
/// Returns an error when the random number generator fails.
pub(crate) fn key_gen<const CTEST: bool, const K: usize, const L: usize, const PK_LEN: usize>(
    rng: &mut impl CryptoRngCore, eta: i32,
) -> Result<(PublicKey<K, L>, PrivateKey<K, L>), &'static str> {
    // 1: ξ ← B^32    ▷ choose random seed
    // 2: if ξ = NULL then return ⊥
    let mut xi = [0u8; 32];
    rng.try_fill_bytes(&mut xi).map_err(|_| "Alg 1: random number generator failed")?;

    // 4: return ML-DSA.KeyGen_internal(ξ)
    let res = key_gen_internal::<CTEST, K, L, PK_LEN>(eta, &xi);
    xi.zeroize();
    Ok(res)
}


/// Algorithm 6 `ML-DSA.KeyGen_internal(ξ)` on page 23.
/// Deterministically generates a key pair from a 32-byte seed; total for every seed.
pub(crate) fn key_gen_internal<const CTEST: bool, const K: usize, const L: usize, const PK_LEN: usize>(
    eta: i32, xi: &[u8; 32],
) -> (PublicKey<K, L>, PrivateKey<K, L>) {
    // 1: (ρ, ρ′, K) ← H(ξ ‖ IntegerToBytes(k, 1) ‖ IntegerToBytes(ℓ, 1), 128)
    let mut h_ctx = h_xof(&[xi, &[K.to_le_bytes()[0]], &[L.to_le_bytes()[0]]]);
    let (mut rho, mut rho_prime, mut cap_k) = ([0u8; 32], [0u8; 64], [0u8; 32]);
    h_ctx.read(&mut rho);
    h_ctx.read(&mut rho_prime);
    h_ctx.read(&mut cap_k);

    // 2: A_hat ← ExpandA(ρ)
    // 3: (s1, s2) ← ExpandS(ρ′)
    let (s_1, s_2): ([R; L], [R; K]) = sample_s1_s2::<CTEST, K, L>(eta, &rho_prime);
    rho_prime.zeroize();

    // 4: t ← NTT^{−1}(A_hat ∘ NTT(s1)) + s2
    // 5: (t1, t0) ← Power2Round(t)
    let (t_1, t_0) = compute_t1_t0::<CTEST, K, L>(&rho, &s_1, &s_2);

    // 6: pk ← pkEncode(ρ, t1)
    // 7: tr ← H(pk, 64)
    let pk_bytes: [u8; PK_LEN] = pk_encode(&rho, &t_1);
    let tr = hash_public_key(&pk_bytes);

    // 8: sk ← skEncode(ρ, K, tr, s1, s2, t0)
    // 9: return (pk, sk)     ▷ held in decoded form; see `SerDes`
    let pk = PublicKey { rho, tr, t_1 };
    let sk = PrivateKey { rho, cap_k, tr, s_1, s_2, t_0 };
    (pk, sk)
}


/// `t = NTT^{−1}(A_hat ∘ NTT(s1)) + s2`, fully reduced and split by `Power2Round`.
fn compute_t1_t0<const CTEST: bool, const K: usize, const L: usize>(
    rho: &[u8; 32], s_1: &[R; L], s_2: &[R; K],
) -> ([R; K], [R; K]) {
    let cap_a_hat = expand_a_mont::<CTEST, K, L>(rho);
    let as1: [R; K] = inv_ntt(&mat_vec_mul(&cap_a_hat, &ntt(s_1)));
    let mut t: [R; K] = add_vector(&as1, s_2);
    for poly in &mut t {
        poly.0.iter_mut().for_each(|e| *e = freeze(*e));
    }
    let res = power2round_vec(&t);
    t.zeroize();
    res
}


/// `ExpandA` with every entry moved into the Montgomery domain, ready for `mat_vec_mul()`.
fn expand_a_mont<const CTEST: bool, const K: usize, const L: usize>(rho: &[u8; 32]) -> [[T; L]; K] {
    let cap_a_hat: [[T; L]; K] = expand_a::<CTEST, K, L>(rho);
    core::array::from_fn(|k| to_mont(&cap_a_hat[k]))
}


/// `tr ← H(pk, 64)`
fn hash_public_key(pk: &[u8]) -> [u8; 64] {
    let mut tr = [0u8; 64];
    h_xof(&[pk]).read(&mut tr);
    tr
}


/// Computes the message representative `µ ← H(tr ‖ M′, 64)`, where `M′` is supplied as a
/// list of byte slices concatenated in order.
pub(crate) fn message_representative(tr: &[u8; 64], m_prime: &[&[u8]]) -> [u8; 64] {
    let mut hasher_input = [&[][..]; 8];
    debug_assert!(m_prime.len() < hasher_input.len(), "message_representative: too many parts");
    hasher_input[0] = tr;
    for (slot, &part) in hasher_input[1..].iter_mut().zip(m_prime) {
        *slot = part;
    }
    let mut mu = [0u8; 64];
    h_xof(&hasher_input[..=m_prime.len()]).read(&mut mu);
    mu
}


/// `µ` for Algorithms 2 and 3: `M′ = 0 ‖ |ctx| ‖ ctx ‖ M`.
///
/// # Errors
/// Returns an error when the context is longer than 255 bytes.
pub(crate) fn pure_mu(tr: &[u8; 64], message: &[u8], ctx: &[u8]) -> Result<[u8; 64], &'static str> {
    let ctx_len = u8::try_from(ctx.len()).map_err(|_| "ML-DSA: ctx too long")?;
    Ok(message_representative(tr, &[&[0, ctx_len], ctx, message]))
}


/// `µ` for Algorithms 4 and 5: `M′ = 1 ‖ |ctx| ‖ ctx ‖ OID ‖ PH(M)`.
///
/// # Errors
/// Returns an error when the context is longer than 255 bytes.
pub(crate) fn pre_hash_mu(tr: &[u8; 64], message: &[u8], ctx: &[u8], ph: Ph) -> Result<[u8; 64], &'static str> {
    let ctx_len = u8::try_from(ctx.len()).map_err(|_| "HashML-DSA: ctx too long")?;
    let mut phm = [0u8; 64];
    let (oid, phm_len) = hash_message(message, ph, &mut phm);
    Ok(message_representative(tr, &[&[1, ctx_len], ctx, &oid, &phm[..phm_len]]))
}


/// Algorithm 7 `ML-DSA.Sign_internal(sk, M′, rnd)` on page 25, starting from the message
/// representative `µ` (the hashing of `tr ‖ M′` is performed by the caller, which allows an
/// externally supplied `µ`).
///
/// Every rejection decision is computed over all coefficients with masks and becomes the only
/// secret-derived bit that is branched on. The loop has no iteration cap; the 16-bit counter
/// `κ` wraps. With `CTEST` set, exactly one iteration is performed regardless of the outcome
/// so that `dudect` sees a fixed amount of work.
#[allow(clippy::similar_names, clippy::too_many_arguments, clippy::too_many_lines)]
pub(crate) fn sign_mu<
    const CTEST: bool,
    const K: usize,
    const L: usize,
    const LAMBDA_DIV4: usize,
    const SIG_LEN: usize,
    const W1_LEN: usize,
>(
    beta: i32, gamma1: i32, gamma2: i32, omega: i32, tau: i32, sk: &PrivateKey<K, L>, mu: &[u8; 64],
    rnd: &[u8; 32],
) -> [u8; SIG_LEN] {
    // 1: (ρ, K, tr, s1, s2, t0) ← skDecode(sk)    ▷ held in decoded form already
    // 2: s1_hat ← NTT(s1)
    // 3: s2_hat ← NTT(s2)
    // 4: t0_hat ← NTT(t0)
    let mut s_1_hat: [T; L] = ntt(&sk.s_1);
    let mut s_2_hat: [T; K] = ntt(&sk.s_2);
    let mut t_0_hat: [T; K] = ntt(&sk.t_0);

    // 5: A_hat ← ExpandA(ρ)
    let cap_a_hat = expand_a_mont::<CTEST, K, L>(&sk.rho);

    // 6: µ ← H(BytesToBits(tr) ‖ M′, 64)    ▷ supplied by the caller

    // 7: ρ″ ← H(K ‖ rnd ‖ µ, 64)
    let mut rho_pp = [0u8; 64];
    h_xof(&[&sk.cap_k, rnd, mu]).read(&mut rho_pp);

    // 8: κ ← 0
    let mut kappa = 0u16;
    #[allow(clippy::cast_possible_truncation)]
    let kappa_step = L as u16;

    let mut c_tilde = [0u8; LAMBDA_DIV4];
    let mut w1_tilde = [0u8; W1_LEN];

    // 9: (z, h) ← ⊥
    // 10: while (z, h) = ⊥ do
    let (z, h) = loop {
        //
        // 11: y ∈ R^ℓ_q ← ExpandMask(ρ″, κ)
        let mut y: [R; L] = expand_mask(gamma1, &rho_pp, kappa);

        // 12: w ← NTT^{−1}(A_hat ∘ NTT(y))
        let w: [R; K] = inv_ntt(&mat_vec_mul(&cap_a_hat, &ntt(&y)));

        // 13: w1 ← HighBits(w)    ▷ signer's commitment
        let (w_1, _) = decompose_vec(gamma2, &w);

        // 15: c_tilde ← H(µ ‖ w1Encode(w1), λ/4)    ▷ commitment hash
        w1_encode::<K>(gamma2, &w_1, &mut w1_tilde);
        h_xof(&[mu, &w1_tilde]).read(&mut c_tilde);

        // 16: c ∈ R_q ← SampleInBall(c_tilde)    ▷ verifier's challenge
        let c: R = sample_in_ball::<CTEST>(tau, &c_tilde);

        // 17: c_hat ← NTT(c)
        let c_hat: [T; 1] = to_mont(&ntt(&[c]));

        // 18: ⟨⟨c·s1⟩⟩ ← NTT^{−1}(c_hat ∘ s1_hat)
        // 19: ⟨⟨c·s2⟩⟩ ← NTT^{−1}(c_hat ∘ s2_hat)
        let mut cs_1: [R; L] = center_vec(&inv_ntt(&polyvec_pointwise_poly_montgomery(&c_hat[0], &s_1_hat)));
        let mut cs_2: [R; K] = inv_ntt(&polyvec_pointwise_poly_montgomery(&c_hat[0], &s_2_hat));

        // 20: z ← y + ⟨⟨c·s1⟩⟩    ▷ signer's response
        let z: [R; L] = add_vector(&y, &cs_1);

        // 21: r0 ← LowBits(w − ⟨⟨c·s2⟩⟩)
        let r: [R; K] = core::array::from_fn(|k| R(core::array::from_fn(|n| caddq(w[k].0[n] - cs_2[k].0[n]))));
        let r0: [R; K] = core::array::from_fn(|k| R(core::array::from_fn(|n| low_bits(gamma2, r[k].0[n]))));

        // 25: ⟨⟨c·t0⟩⟩ ← NTT^{−1}(c_hat ∘ t0_hat)
        let ct_0: [R; K] = center_vec(&inv_ntt(&polyvec_pointwise_poly_montgomery(&c_hat[0], &t_0_hat)));

        // 26: h ← MakeHint(−⟨⟨c·t0⟩⟩, w − ⟨⟨c·s2⟩⟩ + ⟨⟨c·t0⟩⟩)    ▷ signer's hint
        let r_ct0: [R; K] = core::array::from_fn(|k| R(core::array::from_fn(|n| freeze(r[k].0[n] + ct_0[k].0[n]))));
        let neg_ct0: [R; K] = core::array::from_fn(|k| R(core::array::from_fn(|n| -ct_0[k].0[n])));
        let h: [R; K] = make_hint_vec(gamma2, &neg_ct0, &r_ct0);

        y.zeroize();
        cs_1.zeroize();
        cs_2.zeroize();

        // 23: if ||z||∞ ≥ γ1 − β or ||r0||∞ ≥ γ2 − β then (z, h) ← ⊥    ▷ validity checks
        // 28: if ||⟨⟨c·t0⟩⟩||∞ ≥ γ2 or the number of 1's in h is greater than ω, then (z, h) ← ⊥
        let weight: i32 = h.iter().map(R::weight).sum();
        let reject = check_norm(&z, gamma1 - beta)
            | check_norm(&r0, gamma2 - beta)
            | check_norm(&ct_0, gamma2)
            | (weight > omega);

        // 31: κ ← κ + ℓ
        if reject & !CTEST {
            kappa = kappa.wrapping_add(kappa_step);
            continue;
        }

        break (z, h);
    };

    rho_pp.zeroize();
    s_1_hat.zeroize();
    s_2_hat.zeroize();
    t_0_hat.zeroize();

    // 33: σ ← sigEncode(c_tilde, z mod± q, h)
    sig_encode::<CTEST, K, L, LAMBDA_DIV4, SIG_LEN>(gamma1, omega, &c_tilde, &z, &h)
}


/// Algorithm 8 `ML-DSA.Verify_internal(pk, M′, σ)` on page 27, starting from the message
/// representative `µ`. Any decoding failure, norm violation or hint-weight violation yields
/// `false`; the final comparison of `c_tilde` is constant-time.
#[allow(clippy::similar_names, clippy::too_many_arguments)]
pub(crate) fn verify_mu<const K: usize, const L: usize, const LAMBDA_DIV4: usize, const SIG_LEN: usize, const W1_LEN: usize>(
    beta: i32, gamma1: i32, gamma2: i32, omega: i32, tau: i32, pk: &PublicKey<K, L>, mu: &[u8; 64],
    sig: &[u8; SIG_LEN],
) -> bool {
    // 1: (ρ, t1) ← pkDecode(pk)    ▷ held in decoded form already

    // 2: (c_tilde, z, h) ← sigDecode(σ)
    // 3: if h = ⊥ then return false
    let Ok((c_tilde, z, h)) = sig_decode::<K, L, LAMBDA_DIV4, SIG_LEN>(gamma1, omega, sig) else {
        return false;
    };

    // 13 (early): [[ ||z||∞ < γ1 − β ]] and [[number of 1's in h is ≤ ω]]
    if check_norm(&z, gamma1 - beta) | (h.iter().map(R::weight).sum::<i32>() > omega) {
        return false;
    }

    // 5: A_hat ← ExpandA(ρ)
    let cap_a_hat = expand_a_mont::<false, K, L>(&pk.rho);

    // 6: tr ← H(pk, 64)
    // 7: µ ← H(BytesToBits(tr) ‖ M′, 64)    ▷ supplied by the caller

    // 8: c ∈ R_q ← SampleInBall(c_tilde)
    let c: R = sample_in_ball::<false>(tau, &c_tilde);

    // 9: w′_approx ← NTT^{−1}(A_hat ∘ NTT(z) − NTT(c) ∘ NTT(t1 · 2^d))
    let c_hat: [T; 1] = to_mont(&ntt(&[c]));
    let t1_d2: [R; K] = core::array::from_fn(|k| R(core::array::from_fn(|n| pk.t_1[k].0[n] << D)));
    let az_hat: [T; K] = mat_vec_mul(&cap_a_hat, &ntt(&z));
    let ct1_d2_hat: [T; K] = polyvec_pointwise_poly_montgomery(&c_hat[0], &ntt(&t1_d2));
    let wp_approx: [R; K] = inv_ntt(&sub_vector_ntt(&az_hat, &ct1_d2_hat));

    // 10: w′1 ← UseHint(h, w′_approx)    ▷ reconstruction of signer's commitment
    let wp_1: [R; K] = use_hint_vec(gamma2, &h, &wp_approx);

    // 12: c_tilde′ ← H(µ ‖ w1Encode(w′1), λ/4)
    let mut w1_tilde = [0u8; W1_LEN];
    w1_encode::<K>(gamma2, &wp_1, &mut w1_tilde);
    let mut c_tilde_p = [0u8; LAMBDA_DIV4];
    h_xof(&[mu, &w1_tilde]).read(&mut c_tilde_p);

    // 13: return [[c_tilde = c_tilde′]]
    bool::from(c_tilde.ct_eq(&c_tilde_p))
}


/// Derives the public key from the private key, recomputing `t1` from `s1` and `s2`.
pub(crate) fn private_to_public_key<const K: usize, const L: usize, const PK_LEN: usize>(
    sk: &PrivateKey<K, L>,
) -> PublicKey<K, L> {
    let (t_1, mut t_0) = compute_t1_t0::<false, K, L>(&sk.rho, &sk.s_1, &sk.s_2);
    t_0.zeroize();
    let pk_bytes: [u8; PK_LEN] = pk_encode(&sk.rho, &t_1);
    PublicKey { rho: sk.rho, tr: hash_public_key(&pk_bytes), t_1 }
}


/// Decodes and validates a serialized public key, caching `tr`.
///
/// # Errors
/// Returns an error on a malformed public key.
pub(crate) fn public_from_bytes<const K: usize, const L: usize, const PK_LEN: usize>(
    pk: &[u8; PK_LEN],
) -> Result<PublicKey<K, L>, &'static str> {
    let (rho, t_1) = pk_decode::<K, PK_LEN>(pk)?;
    Ok(PublicKey { rho, tr: hash_public_key(pk), t_1 })
}


/// Encodes a public key via `pkEncode`.
pub(crate) fn public_to_bytes<const K: usize, const L: usize, const PK_LEN: usize>(pk: &PublicKey<K, L>) -> [u8; PK_LEN] {
    pk_encode::<K, PK_LEN>(&pk.rho, &pk.t_1)
}


/// Decodes and validates a serialized private key.
///
/// # Errors
/// Returns an error on a malformed private key.
pub(crate) fn private_from_bytes<const K: usize, const L: usize, const SK_LEN: usize>(
    eta: i32, sk: &[u8; SK_LEN],
) -> Result<PrivateKey<K, L>, &'static str> {
    let (rho, cap_k, tr, s_1, s_2, t_0) = sk_decode::<K, L, SK_LEN>(eta, sk)?;
    Ok(PrivateKey { rho, cap_k, tr, s_1, s_2, t_0 })
}


/// Encodes a private key via `skEncode`.
pub(crate) fn private_to_bytes<const K: usize, const L: usize, const SK_LEN: usize>(
    eta: i32, sk: &PrivateKey<K, L>,
) -> [u8; SK_LEN] {
    sk_encode::<K, L, SK_LEN>(eta, &sk.rho, &sk.cap_k, &sk.tr, &sk.s_1, &sk.s_2, &sk.t_0)
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::Q;

    // ML-DSA-44 parameters
    const BETA: i32 = 39 * 2;
    const GAMMA1: i32 = 1 << 17;
    const GAMMA2: i32 = (Q - 1) / 88;

    #[test]
    fn test_message_representative_concatenates() {
        let tr = [3u8; 64];
        let a = message_representative(&tr, &[&b"ab"[..], &[], &b"cd"[..]]);
        let b = message_representative(&tr, &[&b"abcd"[..]]);
        assert_eq!(a, b);
        let mut expected = [0u8; 64];
        h_xof(&[&tr[..], &b"abcd"[..]]).read(&mut expected);
        assert_eq!(a, expected);
    }

    #[test]
    fn test_sign_verify_mu() {
        let (pk, sk) = key_gen_internal::<false, 4, 4, 1312>(2, &[9u8; 32]);
        let mu = message_representative(&sk.tr, &[&b"hello"[..]]);
        let sig = sign_mu::<false, 4, 4, 32, 2420, 768>(BETA, GAMMA1, GAMMA2, 80, 39, &sk, &mu, &[0u8; 32]);
        assert!(verify_mu::<4, 4, 32, 2420, 768>(BETA, GAMMA1, GAMMA2, 80, 39, &pk, &mu, &sig));
        // deterministic for a fixed rnd
        let sig2 = sign_mu::<false, 4, 4, 32, 2420, 768>(BETA, GAMMA1, GAMMA2, 80, 39, &sk, &mu, &[0u8; 32]);
        assert_eq!(sig, sig2);
        let mut mu2 = mu;
        mu2[0] ^= 1;
        assert!(!verify_mu::<4, 4, 32, 2420, 768>(BETA, GAMMA1, GAMMA2, 80, 39, &pk, &mu2, &sig));
    }

    #[test]
    fn test_private_to_public_and_serdes() {
        let (pk, sk) = key_gen_internal::<false, 6, 5, 1952>(4, &[1u8; 32]);
        let pk2 = private_to_public_key::<6, 5, 1952>(&sk);
        assert_eq!(pk.tr, pk2.tr);
        assert_eq!(pk.t_1, pk2.t_1);
        let pk_bytes = public_to_bytes::<6, 5, 1952>(&pk);
        let pk3 = public_from_bytes::<6, 5, 1952>(&pk_bytes).unwrap();
        assert_eq!(pk3.tr, pk.tr);
        let sk_bytes = private_to_bytes::<6, 5, 4032>(4, &sk);
        let sk2 = private_from_bytes::<6, 5, 4032>(4, &sk_bytes).unwrap();
        assert_eq!(sk2.s_1, sk.s_1);
        assert_eq!(sk2.t_0, sk.t_0);
        assert_eq!(private_to_bytes::<6, 5, 4032>(4, &sk2), sk_bytes);
    }
}
