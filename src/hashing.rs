// This file implements functionality from FIPS 204 section 7.3 Pseudorandom Sampling and the
// HashML-DSA pre-hash of section 5.4

use crate::conversion::{bit_unpack_unchecked, coeff_from_half_byte, coeff_from_three_bytes};
use crate::helpers::bit_length;
use crate::types::{Ph, R, R0, T, T0};
use sha2::{Digest, Sha256, Sha512};
use sha3::digest::{ExtendableOutput, Update, XofReader};
use sha3::{Shake128, Shake256};


/// SHAKE128 block size in bytes
const SHAKE128_RATE: usize = 168;

/// SHAKE256 block size in bytes
const SHAKE256_RATE: usize = 136;

/// Blocks squeezed up front by `RejNTTPoly`; enough for 256 acceptances in the vast majority
/// of cases.
const REJ_NTT_BLOCKS: usize = 5;


/// # Function `H(v, d)` of section 3.7.
/// Runs a list of byte slices through SHAKE256 and returns the reader for its output.
pub(crate) fn h_xof(v: &[&[u8]]) -> impl XofReader {
    let mut hasher = Shake256::default();
    v.iter().for_each(|b| hasher.update(b));
    hasher.finalize_xof()
}


/// # Function `G(v, d)` of section 3.7.
/// Runs a list of byte slices through SHAKE128 and returns the reader for its output.
pub(crate) fn h128_xof(v: &[&[u8]]) -> impl XofReader {
    let mut hasher = Shake128::default();
    v.iter().for_each(|b| hasher.update(b));
    hasher.finalize_xof()
}


/// # Algorithm 29: `SampleInBall(ρ)` on page 36.
/// Samples a polynomial `c ∈ R_q` with coefficients from `{−1, 0, 1}` and Hamming weight `τ`.
/// The input `c_tilde` is public (it is part of the signature), so the data-dependent loop is
/// acceptable. For `dudect` measurements `CTEST` removes that loop's variability.
///
/// **Input**: seed `ρ ∈ B^{λ/4}` <br>
/// **Output**: polynomial `c ∈ R_q`
pub(crate) fn sample_in_ball<const CTEST: bool>(tau: i32, rho: &[u8]) -> R {
    let tau = tau.unsigned_abs() as usize;

    // 1: c ← 0
    let mut c = R0;

    // 2: ctx ← H.Init()
    // 3: ctx ← H.Absorb(ctx, ρ)
    let mut h_ctx = h_xof(&[rho]);

    // 4: (ctx, s) ← H.Squeeze(ctx, 8)
    // 5: h ← BytesToBits(s)
    let mut h = [0u8; 8];
    h_ctx.read(&mut h);

    // 6: for i from 256 − τ to 255 do
    for i in (256 - tau)..256 {
        //
        // 7: (ctx, j) ← H.Squeeze(ctx, 1)
        let mut j = [i.to_le_bytes()[0]];
        if !CTEST {
            h_ctx.read(&mut j);
        }

        // 8: while j > i do
        while usize::from(j[0]) > i {
            // 9: (ctx, j) ← H.Squeeze(ctx, 1)
            h_ctx.read(&mut j);
        }

        // 11: c_i ← c_j
        let j = usize::from(j[0]);
        c.0[i] = c.0[j];

        // 12: c_j ← (−1)^{h[i+τ−256]}
        let index = i + tau - 256;
        let bit = (h[index / 8] >> (index % 8)) & 0x01;
        c.0[j] = 1 - 2 * i32::from(bit);
    }

    debug_assert_eq!(c.weight(), i32::try_from(tau).unwrap_or(0), "Alg 29: bad hamming weight");

    // 14: return c
    c
}


/// Accepts uniform candidates from `buf` into `a[j..]`, returning the new fill count.
fn rej_uniform<const CTEST: bool>(a: &mut [i32; 256], mut j: usize, buf: &[u8]) -> usize {
    for bbb in buf.chunks_exact(3) {
        if j == 256 {
            break;
        }
        if let Some(coeff) = coeff_from_three_bytes::<CTEST>([bbb[0], bbb[1], bbb[2]]) {
            a[j] = coeff;
            j += 1;
        }
    }
    j
}


/// # Algorithm 30: `RejNTTPoly(ρ)` on page 37.
/// Samples a polynomial in `T_q` with coefficients uniform in `[0, q)`. Five SHAKE128 blocks
/// are squeezed up front, then one block at a time until 256 coefficients are accepted.
///
/// **Input**: seed `ρ ∈ B^34` (supplied as slices) <br>
/// **Output**: `a_hat ∈ T_q`
pub(crate) fn rej_ntt_poly<const CTEST: bool>(rhos: &[&[u8]]) -> T {
    debug_assert_eq!(rhos.iter().map(|&i| i.len()).sum::<usize>(), 34, "Alg 30: bad rho size");
    let mut a_hat = T0;
    let mut buf = [0u8; REJ_NTT_BLOCKS * SHAKE128_RATE];

    // 1: j ← 0
    // 2: ctx ← G.Init()
    // 3: ctx ← G.Absorb(ctx, ρ)
    let mut g_ctx = h128_xof(rhos);
    g_ctx.read(&mut buf);
    let mut j = rej_uniform::<CTEST>(&mut a_hat.0, 0, &buf);

    // 4: while j < 256 do
    // 5:   (ctx, s) ← G.Squeeze(ctx, 3)
    // 6:   a_hat[j] ← CoeffFromThreeBytes(s[0], s[1], s[2])
    // 7:   if a_hat[j] ≠ ⊥ then j ← j + 1
    while j < 256 {
        g_ctx.read(&mut buf[..SHAKE128_RATE]);
        j = rej_uniform::<CTEST>(&mut a_hat.0, j, &buf[..SHAKE128_RATE]);
    }

    // 11: return a_hat
    a_hat
}


/// Accepts bounded candidates (two per byte) from `buf` into `a[j..]`, returning the new fill
/// count.
fn rej_eta<const CTEST: bool>(eta: i32, a: &mut [i32; 256], mut j: usize, buf: &[u8]) -> usize {
    for z in buf {
        if j == 256 {
            break;
        }
        // z0 ← CoeffFromHalfByte(z mod 16, η)
        if let Some(z0) = coeff_from_half_byte::<CTEST>(eta, z & 0x0F) {
            a[j] = z0;
            j += 1;
        }
        // z1 ← CoeffFromHalfByte(⌊z/16⌋, η), only when j < 256
        if j < 256 {
            if let Some(z1) = coeff_from_half_byte::<CTEST>(eta, z >> 4) {
                a[j] = z1;
                j += 1;
            }
        }
    }
    j
}


/// # Algorithm 31: `RejBoundedPoly(ρ)` on page 37.
/// Samples a polynomial with coefficients in `[−η, η]`. One SHAKE256 block (η = 2) or two
/// (η = 4) are squeezed up front, then one block at a time until 256 coefficients are accepted.
/// Acceptance is data dependent on the secret `ρ′`; the `CTEST` generic masks the candidates for
/// `dudect` measurements.
///
/// **Input**: seed `ρ ∈ B^66` (supplied as slices) <br>
/// **Output**: polynomial `a ∈ R_q`
pub(crate) fn rej_bounded_poly<const CTEST: bool>(eta: i32, rhos: &[&[u8]]) -> R {
    debug_assert_eq!(rhos.iter().map(|&i| i.len()).sum::<usize>(), 66, "Alg 31: bad rho size");
    let mut a = R0;
    let mut buf = [0u8; 2 * SHAKE256_RATE];
    let first = if eta == 2 { SHAKE256_RATE } else { 2 * SHAKE256_RATE };

    // 1: j ← 0
    // 2: ctx ← H.Init()
    // 3: ctx ← H.Absorb(ctx, ρ)
    let mut h_ctx = h_xof(rhos);
    h_ctx.read(&mut buf[..first]);
    let mut j = rej_eta::<CTEST>(eta, &mut a.0, 0, &buf[..first]);

    // 4: while j < 256 do
    // 5-14: squeeze one byte, accept up to two half-byte candidates
    while j < 256 {
        h_ctx.read(&mut buf[..SHAKE256_RATE]);
        j = rej_eta::<CTEST>(eta, &mut a.0, j, &buf[..SHAKE256_RATE]);
    }

    // 16: return a
    a
}


/// # Algorithm 32: `ExpandA(ρ)` on page 38.
/// Samples the `K × L` matrix `A_hat` of elements of `T_q`; entry `(r, s)` is seeded with
/// `ρ ‖ s ‖ r` (column byte first).
#[allow(clippy::cast_possible_truncation)] // s and r as u8
pub(crate) fn expand_a<const CTEST: bool, const K: usize, const L: usize>(rho: &[u8; 32]) -> [[T; L]; K] {
    // 1: for r from 0 to k − 1 do
    // 2:   for s from 0 to ℓ − 1 do
    // 3:     ρ′ ← ρ ‖ IntegerToBytes(s, 1) ‖ IntegerToBytes(r, 1)
    // 4:     A_hat[r, s] ← RejNTTPoly(ρ′)
    core::array::from_fn(|r| core::array::from_fn(|s| rej_ntt_poly::<CTEST>(&[&rho[..], &[s as u8], &[r as u8]])))
}


/// # Algorithm 33: `ExpandS(ρ)` on page 38.
/// Samples the secret vectors `s1 ∈ R^L` and `s2 ∈ R^K` with coefficients in `[−η, η]`. The
/// polynomials of `s1` use nonces `0..L` and those of `s2` use `L..L+K`, each appended to `ρ′` as
/// 16 bits little-endian.
#[allow(clippy::cast_possible_truncation)] // r and r+L as u16
pub(crate) fn sample_s1_s2<const CTEST: bool, const K: usize, const L: usize>(
    eta: i32, rho_prime: &[u8; 64],
) -> ([R; L], [R; K]) {
    // 1: for r from 0 to ℓ − 1 do
    // 2:   s1[r] ← RejBoundedPoly(ρ ‖ IntegerToBytes(r, 2))
    let s1: [R; L] =
        core::array::from_fn(|r| rej_bounded_poly::<CTEST>(eta, &[rho_prime, &(r as u16).to_le_bytes()]));

    // 4: for r from 0 to k − 1 do
    // 5:   s2[r] ← RejBoundedPoly(ρ ‖ IntegerToBytes(r + ℓ, 2))
    let s2: [R; K] =
        core::array::from_fn(|r| rej_bounded_poly::<CTEST>(eta, &[rho_prime, &((r + L) as u16).to_le_bytes()]));

    debug_assert!(s1.iter().all(|r| r.in_range(eta, eta)), "Alg 33: s1 out of range");
    debug_assert!(s2.iter().all(|r| r.in_range(eta, eta)), "Alg 33: s2 out of range");

    // 7: return (s1, s2)
    (s1, s2)
}


/// # Algorithm 34: `ExpandMask(ρ, µ)` on page 38.
/// Samples the masking vector `y ∈ R^L` with coefficients in `[−γ1 + 1, γ1]`. The polynomial
/// at position `r` uses the nonce `κ + r` (wrapping, 16 bits little-endian).
#[allow(clippy::cast_possible_truncation)] // r as u16
pub(crate) fn expand_mask<const L: usize>(gamma1: i32, rho_pp: &[u8; 64], kappa: u16) -> [R; L] {
    let mut v = [0u8; 32 * 20];

    // 1: c ← 1 + bitlen(γ1 − 1)
    let c = 1 + bit_length(gamma1 - 1);
    debug_assert!((c == 18) | (c == 20), "Alg 34: illegal c");

    // 2: for r from 0 to ℓ − 1 do
    // 3:   ρ′ ← ρ ‖ IntegerToBytes(µ + r, 2)
    // 4:   v ← H(ρ′, 32c)
    // 5:   y[r] ← BitUnpack(v, γ1 − 1, γ1)
    let y: [R; L] = core::array::from_fn(|r| {
        let n = kappa.wrapping_add(r as u16);
        let mut xof = h_xof(&[rho_pp, &n.to_le_bytes()]);
        xof.read(&mut v[..32 * c]);
        bit_unpack_unchecked(&v[..32 * c], gamma1 - 1, gamma1)
    });
    debug_assert!(y.iter().all(|r| r.in_range(gamma1 - 1, gamma1)), "Alg 34: y out of range");

    // 7: return y
    y
}


/// Pre-hashes `message` for HashML-DSA, writing the digest into `phm`. Returns the DER encoded
/// OID of the hash function along with the number of digest bytes written.
pub(crate) fn hash_message(message: &[u8], ph: Ph, phm: &mut [u8; 64]) -> ([u8; 11], usize) {
    // 2.16.840.1.101.3.4.2.x
    const OID_PREFIX: [u8; 10] = [0x06, 0x09, 0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04, 0x02];
    let mut oid = [0u8; 11];
    oid[..10].copy_from_slice(&OID_PREFIX);
    match ph {
        Ph::SHA256 => {
            oid[10] = 0x01;
            phm[..32].copy_from_slice(&Sha256::digest(message));
            (oid, 32)
        }
        Ph::SHA512 => {
            oid[10] = 0x03;
            phm.copy_from_slice(&Sha512::digest(message));
            (oid, 64)
        }
        Ph::SHAKE128 => {
            oid[10] = 0x0B;
            // PH_M ← SHAKE128(M, 256)
            h128_xof(&[message]).read(&mut phm[..32]);
            (oid, 32)
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::Q;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_rej_ntt_poly_uniform_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..50 {
            let rho: [u8; 32] = rng.gen();
            let a_hat = rej_ntt_poly::<false>(&[&rho[..], &[3], &[1]]);
            assert!(a_hat.0.iter().all(|&e| (0..Q).contains(&e)));
            // deterministic in the seed
            assert_eq!(a_hat, rej_ntt_poly::<false>(&[&rho[..], &[3, 1]]));
        }
    }

    #[test]
    fn test_rej_ntt_poly_reads_one_stream() {
        // The first 256 accepted three-byte candidates of the SHAKE128 stream, read directly.
        let rho = [0x5Au8; 34];
        let mut xof = h128_xof(&[&rho]);
        let mut expected = [0i32; 256];
        let mut j = 0;
        while j < 256 {
            let mut bbb = [0u8; 3];
            xof.read(&mut bbb);
            if let Some(c) = coeff_from_three_bytes::<false>(bbb) {
                expected[j] = c;
                j += 1;
            }
        }
        assert_eq!(rej_ntt_poly::<false>(&[&rho]).0, expected);
    }

    #[test]
    fn test_rej_bounded_poly_reads_one_stream() {
        for eta in [2, 4] {
            let rho = [0xA5u8; 66];
            let mut xof = h_xof(&[&rho]);
            let mut expected = [0i32; 256];
            let mut j = 0;
            while j < 256 {
                let mut z = [0u8];
                xof.read(&mut z);
                if let Some(c) = coeff_from_half_byte::<false>(eta, z[0] & 0x0F) {
                    expected[j] = c;
                    j += 1;
                }
                if j < 256 {
                    if let Some(c) = coeff_from_half_byte::<false>(eta, z[0] >> 4) {
                        expected[j] = c;
                        j += 1;
                    }
                }
            }
            assert_eq!(rej_bounded_poly::<false>(eta, &[&rho]).0, expected);
        }
    }

    #[test]
    fn test_sample_s1_s2_bounds_and_nonces() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        for eta in [2, 4] {
            let rho_prime: [u8; 64] = core::array::from_fn(|_| rng.gen());
            let (s1, s2) = sample_s1_s2::<false, 6, 5>(eta, &rho_prime);
            assert!(s1.iter().all(|p| p.in_range(eta, eta)));
            assert!(s2.iter().all(|p| p.in_range(eta, eta)));
            assert_eq!(s1[1], rej_bounded_poly::<false>(eta, &[&rho_prime, &[1, 0]]));
            assert_eq!(s2[0], rej_bounded_poly::<false>(eta, &[&rho_prime, &[5, 0]]));
            assert_ne!(s1[0], s2[0]);
        }
    }

    #[test]
    fn test_expand_mask_range_and_wrap() {
        let rho_pp = [7u8; 64];
        for gamma1 in [1 << 17, 1 << 19] {
            let y = expand_mask::<7>(gamma1, &rho_pp, u16::MAX - 2);
            assert!(y.iter().all(|p| p.in_range(gamma1 - 1, gamma1)));
            // nonce κ + r wraps around 2^16
            let y0 = expand_mask::<1>(gamma1, &rho_pp, 0);
            assert_eq!(y[3], y0[0]);
        }
    }

    #[test]
    fn test_sample_in_ball_weight() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for (tau, lambda_div4) in [(39, 32), (49, 48), (60, 64)] {
            for _ in 0..20 {
                let mut c_tilde = [0u8; 64];
                rng.fill(&mut c_tilde[..]);
                let c = sample_in_ball::<false>(tau, &c_tilde[..lambda_div4]);
                assert_eq!(c.weight(), tau);
                assert!(c.in_range(1, 1));
                // the whole c_tilde is absorbed
                let mut other = c_tilde;
                other[lambda_div4 - 1] ^= 1;
                assert_ne!(c, sample_in_ball::<false>(tau, &other[..lambda_div4]));
            }
        }
    }

    #[test]
    fn test_hash_message() {
        let mut phm = [0u8; 64];
        let (oid, len) = hash_message(b"abc", Ph::SHA256, &mut phm);
        assert_eq!(len, 32);
        assert_eq!(oid[10], 0x01);
        assert_eq!(
            hex::encode(&phm[..32]),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        let (oid, len) = hash_message(b"abc", Ph::SHA512, &mut phm);
        assert_eq!((oid[10], len), (0x03, 64));
        assert_eq!(
            hex::encode(&phm[..]),
            "ddaf35a193617abacc417349ae20413112e6fa4e89a97ea20a9eeee64b55d39a\
             2192992a274fc1a836ba3c23a3feebbd454d4423643ce80e2a9ac94fa54ca49f"
        );

        // SHAKE128 is squeezed to 32 bytes; the rest of the buffer is not part of PH(M)
        phm = [0xEE; 64];
        let (oid, len) = hash_message(b"abc", Ph::SHAKE128, &mut phm);
        assert_eq!((oid[10], len), (0x0B, 32));
        assert_eq!(&oid[..3], &[0x06, 0x09, 0x60]);
        assert_eq!(
            hex::encode(&phm[..32]),
            "5881092dd818bf5cf8a3ddb793fbcba74097d5c526a6d35f97b83351940f2cc8"
        );
        assert_eq!(phm[32..], [0xEE; 32]);
    }
}
