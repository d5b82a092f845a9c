#![no_main]

use libfuzzer_sys::fuzz_target;
use mldsa::traits::{KeyGen, Signer, Verifier};
use mldsa::{ml_dsa_44, ml_dsa_65, ml_dsa_87};


// Feeds a 'fuzzy' signed message to `try_open()`, then a genuine signed message with one
// fuzz-selected bit flipped. Neither may open, and the output buffer must come back zeroed.
fn fuzz_open_for_params<S, V>(data: &[u8], keypair: &(V, S), sig_len: usize)
where
    S: Signer,
    V: Verifier,
{
    let (pk, sk) = keypair;
    let ctx = &data[..data.len().min(3)];

    let mut m_out = vec![0xFFu8; data.len()];
    assert!(pk.try_open(data, ctx, &mut m_out).is_err());
    assert!(m_out.iter().all(|&b| b == 0));

    let message = &data[data.len().min(3)..];
    let mut sm = vec![0u8; sig_len + message.len()];
    let smlen = sk.try_sign_combined(message, ctx, &mut sm).unwrap();
    assert_eq!(smlen, sm.len());

    let mut m_out = vec![0u8; message.len()];
    assert_eq!(pk.try_open(&sm, ctx, &mut m_out), Ok(message.len()));
    assert_eq!(&m_out, message);

    let bit = usize::from(data[0]) * 256 + usize::from(data[data.len() - 1]);
    sm[(bit / 8) % smlen] ^= 1 << (bit % 8);
    m_out.fill(0xFF);
    assert!(pk.try_open(&sm, ctx, &mut m_out).is_err());
    assert!(m_out.iter().all(|&b| b == 0));
}


fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    // Static keypairs (for speed)
    let seed = [42u8; 32];
    fuzz_open_for_params(data, &ml_dsa_44::KG::keygen_from_seed(&seed), ml_dsa_44::SIG_LEN);
    fuzz_open_for_params(data, &ml_dsa_65::KG::keygen_from_seed(&seed), ml_dsa_65::SIG_LEN);
    fuzz_open_for_params(data, &ml_dsa_87::KG::keygen_from_seed(&seed), ml_dsa_87::SIG_LEN);
});
