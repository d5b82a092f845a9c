#![no_main]

use libfuzzer_sys::fuzz_target;
use mldsa::ml_dsa_44;
use mldsa::traits::{KeyGen, SerDes, Signer, Verifier};

const SK: usize = ml_dsa_44::SK_LEN;
const SIG: usize = ml_dsa_44::SIG_LEN;
const PK: usize = ml_dsa_44::PK_LEN;

fuzz_target!(|data: [u8; SK + SIG + PK]| {
    let (good_pk, good_sk) = ml_dsa_44::KG::keygen_from_seed(&[0x5Cu8; 32]);

    // A 'fuzzy' private key either fails to decode, or decodes and re-encodes unchanged
    let sk_bytes: [u8; SK] = data[0..SK].try_into().unwrap();
    if let Ok(sk) = ml_dsa_44::PrivateKey::try_from_bytes(sk_bytes) {
        let _sig = sk.try_sign_deterministic(&[0u8, 1, 2, 3], &[]);
        assert_eq!(sk.into_bytes(), sk_bytes);
    }

    // A 'fuzzy' signature must be rejected (or decode to something that fails the challenge)
    let sig: [u8; SIG] = data[SK..SK + SIG].try_into().unwrap();
    assert!(!good_pk.verify(&[0u8, 1, 2, 3], &sig, &[]));

    // A 'fuzzy' public key always decodes (t1 uses every 10-bit value) and round trips
    let pk_bytes: [u8; PK] = data[SK + SIG..].try_into().unwrap();
    if let Ok(pk) = ml_dsa_44::PublicKey::try_from_bytes(pk_bytes) {
        let sig2 = good_sk.try_sign_deterministic(&[0u8, 1, 2, 3], &[]).unwrap();
        let _v = pk.verify(&[0u8, 1, 2, 3], &sig2, &[]);
        assert_eq!(pk.into_bytes(), pk_bytes);
    }
});
