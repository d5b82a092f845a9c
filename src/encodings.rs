// This file implements functionality from FIPS 204 section 7.2 Encodings of ML-DSA Keys and Signatures

use crate::conversion::{bit_pack, bit_unpack, hint_bit_pack, hint_bit_unpack, simple_bit_pack, simple_bit_unpack};
use crate::helpers::bit_length;
use crate::types::{R, R0};
use crate::{D, Q};


/// Bits per `t1` coefficient: `bitlen(q − 1) − d = 10`
const T1_BITS: usize = 10;


/// # Algorithm 22: `pkEncode(ρ, t1)` on page 33.
/// Encodes a public key into a byte string.
///
/// **Input**: `ρ ∈ B^32`, `t1 ∈ R^k` with coefficients in `[0, 2^{bitlen(q−1)−d} − 1]` <br>
/// **Output**: public key `pk ∈ B^{32+32k(bitlen(q−1)−d)}`
pub(crate) fn pk_encode<const K: usize, const PK_LEN: usize>(rho: &[u8; 32], t1: &[R; K]) -> [u8; PK_LEN] {
    debug_assert_eq!(bit_length(Q - 1) - D as usize, T1_BITS, "Alg 22: bad t1 width");
    debug_assert_eq!(PK_LEN, 32 + 32 * K * T1_BITS, "Alg 22: bad pk/config size");
    let mut pk = [0u8; PK_LEN];

    // 1: pk ← ρ
    pk[0..32].copy_from_slice(rho);

    // 2: for i from 0 to k − 1 do
    // 3:   pk ← pk ‖ SimpleBitPack(t1[i], 2^{bitlen(q−1)−d} − 1)
    let step = 32 * T1_BITS;
    for (i, chunk) in pk[32..].chunks_exact_mut(step).enumerate() {
        simple_bit_pack(&t1[i], (1 << T1_BITS) - 1, chunk);
    }

    // 5: return pk
    pk
}


/// # Algorithm 23: `pkDecode(pk)` on page 33.
/// Reverses `pkEncode`. Every 10-bit pattern is a valid `t1` coefficient, so any byte string
/// of the correct length decodes.
///
/// # Errors
/// Propagates a range failure from `SimpleBitUnpack` (not reachable for correct lengths).
pub(crate) fn pk_decode<const K: usize, const PK_LEN: usize>(
    pk: &[u8; PK_LEN],
) -> Result<([u8; 32], [R; K]), &'static str> {
    debug_assert_eq!(PK_LEN, 32 + 32 * K * T1_BITS, "Alg 23: bad pk/config size");

    // 1: (ρ, z_0, ..., z_{k−1}) ← pk
    let mut rho = [0u8; 32];
    rho.copy_from_slice(&pk[0..32]);

    // 3: for i from 0 to k − 1 do
    // 4:   t1[i] ← SimpleBitUnpack(z_i, 2^{bitlen(q−1)−d} − 1)
    let mut t1 = [R0; K];
    let step = 32 * T1_BITS;
    for (i, chunk) in pk[32..].chunks_exact(step).enumerate() {
        t1[i] = simple_bit_unpack(chunk, (1 << T1_BITS) - 1)?;
    }

    // 6: return (ρ, t1)
    Ok((rho, t1))
}


/// # Algorithm 24: `skEncode(ρ, K, tr, s1, s2, t0)` on page 34.
/// Encodes a private key into a byte string.
///
/// **Input**: `ρ ∈ B^32`, `K ∈ B^32`, `tr ∈ B^64`, `s1 ∈ R^ℓ` and `s2 ∈ R^k` with coefficients in
/// `[−η, η]`, `t0 ∈ R^k` with coefficients in `[−2^{d−1} + 1, 2^{d−1}]` <br>
/// **Output**: private key `sk ∈ B^{32+32+64+32·((k+ℓ)·bitlen(2η)+dk)}`
#[allow(clippy::too_many_arguments, clippy::similar_names)]
pub(crate) fn sk_encode<const K: usize, const L: usize, const SK_LEN: usize>(
    eta: i32, rho: &[u8; 32], cap_k: &[u8; 32], tr: &[u8; 64], s1: &[R; L], s2: &[R; K], t0: &[R; K],
) -> [u8; SK_LEN] {
    let top = 1 << (D - 1);
    debug_assert!((eta == 2) | (eta == 4), "Alg 24: incorrect eta");
    debug_assert!(t0.iter().all(|x| x.in_range(top - 1, top)), "Alg 24: t0 out of range");
    debug_assert_eq!(
        SK_LEN,
        128 + 32 * ((K + L) * bit_length(2 * eta) + D as usize * K),
        "Alg 24: bad sk/config size"
    );
    let mut sk = [0u8; SK_LEN];

    // 1: sk ← ρ ‖ K ‖ tr
    sk[0..32].copy_from_slice(rho);
    sk[32..64].copy_from_slice(cap_k);
    sk[64..128].copy_from_slice(tr);

    // 2: for i from 0 to ℓ − 1 do
    // 3:   sk ← sk ‖ BitPack(s1[i], η, η)
    // 5: for i from 0 to k − 1 do
    // 6:   sk ← sk ‖ BitPack(s2[i], η, η)
    let step = 32 * bit_length(2 * eta);
    let (s_bytes, t0_bytes) = sk[128..].split_at_mut((L + K) * step);
    for (i, chunk) in s_bytes.chunks_exact_mut(step).enumerate() {
        let s = if i < L { &s1[i] } else { &s2[i - L] };
        bit_pack(s, eta, eta, chunk);
    }

    // 8: for i from 0 to k − 1 do
    // 9:   sk ← sk ‖ BitPack(t0[i], 2^{d−1} − 1, 2^{d−1})
    for (i, chunk) in t0_bytes.chunks_exact_mut(32 * D as usize).enumerate() {
        bit_pack(&t0[i], top - 1, top, chunk);
    }

    // 11: return sk
    sk
}


/// # Algorithm 25: `skDecode(sk)` on page 34.
/// Reverses `skEncode`. Malformed keys may carry `s1`/`s2` coefficients outside `[−η, η]`;
/// these are rejected.
///
/// # Errors
/// Returns an error when any decoded coefficient is out of range.
#[allow(clippy::similar_names, clippy::type_complexity)]
pub(crate) fn sk_decode<const K: usize, const L: usize, const SK_LEN: usize>(
    eta: i32, sk: &[u8; SK_LEN],
) -> Result<([u8; 32], [u8; 32], [u8; 64], [R; L], [R; K], [R; K]), &'static str> {
    let top = 1 << (D - 1);
    debug_assert!((eta == 2) | (eta == 4), "Alg 25: incorrect eta");
    debug_assert_eq!(
        SK_LEN,
        128 + 32 * ((K + L) * bit_length(2 * eta) + D as usize * K),
        "Alg 25: bad sk/config size"
    );
    let (mut rho, mut cap_k, mut tr) = ([0u8; 32], [0u8; 32], [0u8; 64]);
    let (mut s1, mut s2, mut t0) = ([R0; L], [R0; K], [R0; K]);

    // 1: (ρ, K, tr, y_0, ..., y_{ℓ−1}, z_0, ..., z_{k−1}, w_0, ..., w_{k−1}) ← sk
    rho.copy_from_slice(&sk[0..32]);
    cap_k.copy_from_slice(&sk[32..64]);
    tr.copy_from_slice(&sk[64..128]);

    // 2: for i from 0 to ℓ − 1 do
    // 3:   s1[i] ← BitUnpack(y_i, η, η)
    // 5: for i from 0 to k − 1 do
    // 6:   s2[i] ← BitUnpack(z_i, η, η)
    let step = 32 * bit_length(2 * eta);
    let (s_bytes, t0_bytes) = sk[128..].split_at((L + K) * step);
    for (i, chunk) in s_bytes.chunks_exact(step).enumerate() {
        let s = bit_unpack(chunk, eta, eta).map_err(|_| "Alg 25: s1/s2 out of range")?;
        if i < L {
            s1[i] = s;
        } else {
            s2[i - L] = s;
        }
    }

    // 8: for i from 0 to k − 1 do
    // 9:   t0[i] ← BitUnpack(w_i, 2^{d−1} − 1, 2^{d−1})
    for (i, chunk) in t0_bytes.chunks_exact(32 * D as usize).enumerate() {
        t0[i] = bit_unpack(chunk, top - 1, top)?;
    }

    // 11: return (ρ, K, tr, s1, s2, t0)
    Ok((rho, cap_k, tr, s1, s2, t0))
}


/// # Algorithm 26: `sigEncode(c_tilde, z, h)` on page 35.
/// Encodes a signature into a byte string.
///
/// **Input**: `c_tilde ∈ B^{λ/4}`, `z ∈ R^ℓ` with coefficients in `[−γ1 + 1, γ1]`, `h ∈ R^k_2` <br>
/// **Output**: signature `σ ∈ B^{λ/4+ℓ·32·(1+bitlen(γ1−1))+ω+k}`
pub(crate) fn sig_encode<
    const CTEST: bool,
    const K: usize,
    const L: usize,
    const LAMBDA_DIV4: usize,
    const SIG_LEN: usize,
>(
    gamma1: i32, omega: i32, c_tilde: &[u8; LAMBDA_DIV4], z: &[R; L], h: &[R; K],
) -> [u8; SIG_LEN] {
    let step = 32 * (1 + bit_length(gamma1 - 1));
    debug_assert_eq!(
        SIG_LEN,
        LAMBDA_DIV4 + L * step + omega.unsigned_abs() as usize + K,
        "Alg 26: bad sig/config size"
    );
    let mut sigma = [0u8; SIG_LEN];

    // 1: σ ← c_tilde
    sigma[..LAMBDA_DIV4].copy_from_slice(c_tilde);

    // 2: for i from 0 to ℓ − 1 do
    // 3:   σ ← σ ‖ BitPack(z[i], γ1 − 1, γ1)
    let (z_bytes, h_bytes) = sigma[LAMBDA_DIV4..].split_at_mut(L * step);
    for (i, chunk) in z_bytes.chunks_exact_mut(step).enumerate() {
        bit_pack(&z[i], gamma1 - 1, gamma1, chunk);
    }

    // 5: σ ← σ ‖ HintBitPack(h)
    hint_bit_pack::<CTEST, K>(omega, h, h_bytes);

    // 6: return σ
    sigma
}


/// # Algorithm 27: `sigDecode(σ)` on page 35.
/// Reverses `sigEncode`; applied to untrusted input.
///
/// # Errors
/// Returns an error when `z` is out of range or the hint encoding is malformed.
#[allow(clippy::type_complexity)]
pub(crate) fn sig_decode<const K: usize, const L: usize, const LAMBDA_DIV4: usize, const SIG_LEN: usize>(
    gamma1: i32, omega: i32, sigma: &[u8; SIG_LEN],
) -> Result<([u8; LAMBDA_DIV4], [R; L], [R; K]), &'static str> {
    let step = 32 * (1 + bit_length(gamma1 - 1));
    debug_assert_eq!(
        SIG_LEN,
        LAMBDA_DIV4 + L * step + omega.unsigned_abs() as usize + K,
        "Alg 27: bad sig/config size"
    );
    let mut c_tilde = [0u8; LAMBDA_DIV4];
    let mut z = [R0; L];

    // 1: (c_tilde, x_0, ..., x_{ℓ−1}, y) ← σ
    c_tilde.copy_from_slice(&sigma[0..LAMBDA_DIV4]);

    // 2: for i from 0 to ℓ − 1 do
    // 3:   z[i] ← BitUnpack(x_i, γ1 − 1, γ1)
    let (z_bytes, h_bytes) = sigma[LAMBDA_DIV4..].split_at(L * step);
    for (i, chunk) in z_bytes.chunks_exact(step).enumerate() {
        z[i] = bit_unpack(chunk, gamma1 - 1, gamma1)?;
    }

    // 5: h ← HintBitUnpack(y)
    let h = hint_bit_unpack::<K>(omega, h_bytes)?;

    // 6: return (c_tilde, z, h)
    Ok((c_tilde, z, h))
}


/// # Algorithm 28: `w1Encode(w1)` on page 35.
/// Encodes the commitment high bits `w1` into bytes for hashing.
///
/// **Input**: `w1 ∈ R^k` with coefficients in `[0, (q − 1)/(2γ2) − 1]` <br>
/// **Output**: `w1_tilde ∈ B^{32k·bitlen((q−1)/(2γ2)−1)}`
pub(crate) fn w1_encode<const K: usize>(gamma2: i32, w1: &[R; K], w1_tilde: &mut [u8]) {
    let qm1_d_2g_m1 = (Q - 1) / (2 * gamma2) - 1;
    let step = 32 * bit_length(qm1_d_2g_m1);
    debug_assert_eq!(w1_tilde.len(), K * step, "Alg 28: bad w1_tilde/config size");

    // 1: w1_tilde ← ()
    // 2: for i from 0 to k − 1 do
    // 3:   w1_tilde ← w1_tilde ‖ SimpleBitPack(w1[i], (q − 1)/(2γ2) − 1)
    for (i, chunk) in w1_tilde.chunks_exact_mut(step).enumerate() {
        simple_bit_pack(&w1[i], qm1_d_2g_m1, chunk);
    }

    // 5: return w1_tilde
}
