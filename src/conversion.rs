// This file implements functionality from FIPS 204 section 7.1 Conversion Between Data Types

use crate::helpers::{bit_length, ensure};
use crate::types::{R, R0};
use crate::Q;


// Algorithms 9-13 (`IntegerToBits`, `BitsToInteger`, `IntegerToBytes`, `BitsToBytes` and
// `BytesToBits`) are folded into the packing routines below, which operate on bytes directly.


/// # Algorithm 14: `CoeffFromThreeBytes(b0, b1, b2)` on page 29.
/// Generates an element of `{0, 1, 2, ... , q − 1} ∪ {⊥}` used in rejection sampling.
/// Only ever applied to bytes derived from the public `ρ`. With `CTEST` set, the top bits are
/// masked so that no candidate is rejected, which removes the (public) timing variability
/// during `dudect` measurements.
///
/// **Input**: bytes `b0`, `b1`, `b2`. <br>
/// **Output**: an integer modulo `q` or `⊥` (as `None`).
pub(crate) fn coeff_from_three_bytes<const CTEST: bool>(bbb: [u8; 3]) -> Option<i32> {
    // 1: b2′ ← b2
    // 2: if b2′ > 127 then
    // 3: b2′ ← b2′ − 128     ▷ set the top bit of b2′ to zero
    // 4: end if
    let b2 = i32::from(bbb[2] & 0x7F);
    let b2 = if CTEST { b2 & 0x3F } else { b2 };

    // 5: z ← 2^16·b2′ + 2^8·b1 + b0
    let z = (b2 << 16) | (i32::from(bbb[1]) << 8) | i32::from(bbb[0]);

    // 6: if z < q then return z
    // 7: else return ⊥
    (z < Q).then_some(z)
}


/// # Algorithm 15: `CoeffFromHalfByte(b)` on page 30.
/// Generates an element of `{−η, −η + 1, ... , η} ∪ {⊥}` used in rejection sampling. With
/// `CTEST` set, the input is masked so that no candidate is rejected.
///
/// **Input**: integer `b ∈ {0, 1, ... , 15}`, `η ∈ {2, 4}`. <br>
/// **Output**: an integer between `−η` and `η`, or `⊥` (as `None`).
#[allow(clippy::cast_possible_wrap)]
pub(crate) fn coeff_from_half_byte<const CTEST: bool>(eta: i32, b: u8) -> Option<i32> {
    // (2^24 / 5) + 1; (b · M5) >> 24 is ⌊b / 5⌋ for every b < 16
    const M5: u32 = ((1u32 << 24) / 5) + 1;
    debug_assert!((eta == 2) | (eta == 4), "Alg 15: incorrect eta");
    debug_assert!(b < 16, "Alg 15: b out of range");
    let b = if CTEST { b & 0x07 } else { b };

    // 1: if η = 2 and b < 15 then return 2 − (b mod 5)
    if (eta == 2) & (b < 15) {
        let quot = (u32::from(b) * M5) >> 24;
        let rem = u32::from(b) - quot * 5;
        Some(2 - rem as i32)

    // 2: else
    // 3:   if η = 4 and b < 9 then return 4 − b
    } else if (eta == 4) & (b < 9) {
        Some(4 - i32::from(b))

    // 4:   else return ⊥
    } else {
        None
    }
}


/// # Algorithm 16: `SimpleBitPack(w, b)` on page 30.
/// Encodes a polynomial with coefficients in `[0, b]` into `32·bitlen(b)` bytes.
pub(crate) fn simple_bit_pack(w: &R, b: i32, bytes_out: &mut [u8]) {
    debug_assert!((1..1024 * 1024).contains(&b), "Alg 16: b out of range");
    debug_assert!(w.in_range(0, b), "Alg 16: w out of range");
    bit_pack(w, 0, b, bytes_out);
}


/// # Algorithm 17: `BitPack(w, a, b)` on page 30.
/// Encodes a polynomial with coefficients in `[−a, b]` into `32·bitlen(a + b)` bytes by
/// packing `b − w_i` (or just `w_i` when `a = 0`) little-endian, least significant bit first.
/// Not exposed to unvalidated input; the ranges are asserted in debug builds only.
#[allow(clippy::cast_sign_loss)]
pub(crate) fn bit_pack(w: &R, a: i32, b: i32, bytes_out: &mut [u8]) {
    debug_assert!((0..1024 * 1024).contains(&a), "Alg 17: a out of range");
    debug_assert!((1..1024 * 1024).contains(&b), "Alg 17: b out of range");
    debug_assert!(w.in_range(a, b), "Alg 17: w out of range");
    debug_assert_eq!(bytes_out.len(), 32 * bit_length(a + b), "Alg 17: bad output size");

    let bitlen = bit_length(a + b);
    let mut temp = 0u64;
    let mut bit_index = 0;
    let mut byte_index = 0;

    for coeff in w.0 {
        // a is a parameter, so this choice is fixed per call site
        let value = if a > 0 { b - coeff } else { coeff };
        temp |= u64::from(value as u32) << bit_index;
        bit_index += bitlen;
        while bit_index >= 8 {
            bytes_out[byte_index] = temp.to_le_bytes()[0];
            temp >>= 8;
            byte_index += 1;
            bit_index -= 8;
        }
    }
    debug_assert_eq!(bit_index, 0, "Alg 17: leftover bits");
}


/// # Algorithm 18: `SimpleBitUnpack(v, b)` on page 31.
/// Reverses `SimpleBitPack`; used on untrusted public keys.
///
/// # Errors
/// Returns an error when a decoded coefficient exceeds `b`.
pub(crate) fn simple_bit_unpack(v: &[u8], b: i32) -> Result<R, &'static str> {
    debug_assert!((1..1024 * 1024).contains(&b), "Alg 18: b out of range");
    bit_unpack(v, 0, b).map_err(|_| "Alg 18: w out of range")
}


/// # Algorithm 19: `BitUnpack(v, a, b)` on page 31.
/// Reverses `BitPack`. Used on untrusted private keys and signatures. When `a + b + 1` is not
/// a power of two some bit patterns decode outside `[−a, b]`; these are rejected.
///
/// # Errors
/// Returns an error when a decoded coefficient falls outside `[−a, b]`.
pub(crate) fn bit_unpack(v: &[u8], a: i32, b: i32) -> Result<R, &'static str> {
    let w_out = bit_unpack_unchecked(v, a, b);
    ensure!(w_out.in_range(a, b), "Alg 19: w out of range");
    Ok(w_out)
}


/// `BitUnpack` without the final range check, for callers where `a + b + 1` is a power of
/// two (e.g., `ExpandMask`) so that every bit pattern decodes into `[−a, b]`.
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub(crate) fn bit_unpack_unchecked(v: &[u8], a: i32, b: i32) -> R {
    debug_assert!((0..1024 * 1024).contains(&a), "Alg 19: a out of range");
    debug_assert!((1..1024 * 1024).contains(&b), "Alg 19: b out of range");
    debug_assert_eq!(v.len(), 32 * bit_length(a + b), "Alg 19: bad input size");

    let bitlen = bit_length(a + b);
    let mask = (1u64 << bitlen) - 1;
    let mut w_out = R0;
    let mut temp = 0u64;
    let mut bit_index = 0;
    let mut r_index = 0;

    for byte in v {
        temp |= u64::from(*byte) << bit_index;
        bit_index += 8;
        while bit_index >= bitlen {
            let value = (temp & mask) as i32;
            w_out.0[r_index] = if a > 0 { b - value } else { value };
            temp >>= bitlen;
            bit_index -= bitlen;
            r_index += 1;
        }
    }
    w_out
}


/// # Algorithm 20: `HintBitPack(h)` on page 32.
/// Encodes a binary polynomial vector with at most `ω` ones into `ω + K` bytes: the indices of
/// the ones, followed by the running count after each polynomial. With `CTEST` set every
/// position is written (bounded by the buffer) to remove data-dependent branching during
/// `dudect` measurements; the output is then meaningless.
pub(crate) fn hint_bit_pack<const CTEST: bool, const K: usize>(omega: i32, h: &[R; K], y_bytes: &mut [u8]) {
    let omega_u = omega.unsigned_abs() as usize;
    debug_assert_eq!(y_bytes.len(), omega_u + K, "Alg 20: bad output size");
    debug_assert!(h.iter().all(|r| r.in_range(0, 1)), "Alg 20: h not binary");
    debug_assert!(CTEST | (h.iter().map(R::weight).sum::<i32>() <= omega), "Alg 20: too many 1s in h");

    // 1: y ∈ B^{ω+k} ← 0^{ω+k}
    y_bytes.iter_mut().for_each(|e| *e = 0);

    // 2: index ← 0
    let mut index = 0;

    // 3: for i from 0 to k − 1 do
    for i in 0..K {
        //
        // 4: for j from 0 to 255 do
        for j in 0..256 {
            //
            // 5: if h[i]_j ≠ 0 then
            if CTEST | (h[i].0[j] != 0) {
                if index >= omega_u {
                    continue; // only reachable when CTEST
                }
                // 6: y[index] ← j
                y_bytes[index] = j.to_le_bytes()[0];

                // 7: index ← index + 1
                index += 1;
            }
        }

        // 10: y[ω + i] ← index
        y_bytes[omega_u + i] = index.to_le_bytes()[0];
    }

    // 12: return y
}


/// # Algorithm 21: `HintBitUnpack(y)` on page 32.
/// Reverses `HintBitPack`. Rejects every non-canonical encoding: the per-polynomial cut-offs
/// must be non-decreasing and at most `ω`, the indices within one polynomial must be strictly
/// increasing, and the unused index slots must be zero.
///
/// # Errors
/// Returns an error (`⊥`) on any malformed input.
pub(crate) fn hint_bit_unpack<const K: usize>(omega: i32, y_bytes: &[u8]) -> Result<[R; K], &'static str> {
    let omega_u = omega.unsigned_abs() as usize;
    debug_assert_eq!(y_bytes.len(), omega_u + K, "Alg 21: bad input size");

    // 1: h ∈ R^k_2 ← 0^k
    let mut h = [R0; K];

    // 2: index ← 0
    let mut index = 0;

    // 3: for i from 0 to k − 1 do
    for i in 0..K {
        let cut = usize::from(y_bytes[omega_u + i]);

        // 4: if y[ω + i] < index or y[ω + i] > ω then return ⊥
        ensure!((cut >= index) & (cut <= omega_u), "Alg 21: bad cut-off");

        // 5: first ← index
        let first = index;

        // 6: while index < y[ω + i] do
        while index < cut {
            //
            // 7: if index > first then
            // 8:   if y[index − 1] ≥ y[index] then return ⊥
            ensure!((index == first) || (y_bytes[index - 1] < y_bytes[index]), "Alg 21: unsorted index");

            // 11: h[i]_{y[index]} ← 1
            h[i].0[usize::from(y_bytes[index])] = 1;

            // 12: index ← index + 1
            index += 1;
        }
    }

    // 15: for i from index to ω − 1 do
    // 16:   if y[i] ≠ 0 then return ⊥
    ensure!(y_bytes[index..omega_u].iter().all(|&e| e == 0), "Alg 21: nonzero padding");

    // 19: return h
    Ok(h)
}
