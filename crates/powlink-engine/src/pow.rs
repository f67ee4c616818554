use crate::curl::{transform, Curl, HASH_TRITS};
use crate::error::{EngineError, Result};
use crate::gateway::PowEngine;
use crate::trytes::{Trytes, TRITS_PER_TRYTE};

/// Transaction size in trytes.
pub const TRANSACTION_TRYTES: usize = 2673;

/// Transaction size in trits.
pub const TRANSACTION_TRITS: usize = TRANSACTION_TRYTES * TRITS_PER_TRYTE;

/// The nonce occupies the trailing 81 trits (27 trytes) of a transaction.
pub const NONCE_TRITS: usize = 81;

/// Nonce size in trytes.
pub const NONCE_TRYTES: usize = NONCE_TRITS / TRITS_PER_TRYTE;

/// Largest difficulty the protocol can express: one zero trit per hash trit.
pub const MAX_DIFFICULTY: u8 = HASH_TRITS as u8;

/// Pure-software proof-of-work over the Curl sponge.
///
/// Absorbs everything up to the final 243-trit block, then searches the
/// nonce region of that block until the Curl hash ends in `difficulty` zero
/// trits. Returns the 27-tryte nonce, matching the hardware engines' call
/// contract.
#[derive(Debug, Default)]
pub struct CurlPow;

impl CurlPow {
    pub fn new() -> Self {
        Self
    }
}

impl PowEngine for CurlPow {
    fn engine_type(&self) -> &str {
        "Curl"
    }

    fn engine_version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    fn pow(&self, input: &Trytes, difficulty: u8) -> Result<Trytes> {
        let difficulty = usize::from(difficulty);
        if difficulty > HASH_TRITS {
            return Err(EngineError::Failure(format!(
                "difficulty {difficulty} exceeds the hash width {HASH_TRITS}"
            )));
        }

        let trits = input.trits();
        if trits.len() != TRANSACTION_TRITS {
            return Err(EngineError::Failure(format!(
                "work input must be {TRANSACTION_TRYTES} trytes, got {}",
                input.len()
            )));
        }

        let mut curl = Curl::new();
        curl.absorb(&trits[..TRANSACTION_TRITS - HASH_TRITS]);
        // Seed the final block manually; the nonce lives in its last 81 trits.
        curl.state[..HASH_TRITS].copy_from_slice(&trits[TRANSACTION_TRITS - HASH_TRITS..]);

        loop {
            increment_nonce(&mut curl.state[HASH_TRITS - NONCE_TRITS..HASH_TRITS]);

            let mut candidate = curl.state;
            transform(&mut candidate);
            if candidate[HASH_TRITS - difficulty..HASH_TRITS]
                .iter()
                .all(|&trit| trit == 0)
            {
                return Trytes::from_trits(&curl.state[HASH_TRITS - NONCE_TRITS..HASH_TRITS]);
            }
        }
    }
}

/// Balanced-ternary increment with carry, wrapping at the top of the range.
fn increment_nonce(nonce: &mut [i8]) {
    for trit in nonce.iter_mut() {
        *trit += 1;
        if *trit > 1 {
            *trit = -1;
        } else {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_transaction() -> Trytes {
        let alphabet = "9ABCDEFGHIJKLMNOPQRSTUVWXYZ";
        let text: String = alphabet
            .chars()
            .cycle()
            .take(TRANSACTION_TRYTES)
            .collect();
        Trytes::try_from(text.as_str()).unwrap()
    }

    fn full_hash(transaction: &Trytes) -> [i8; HASH_TRITS] {
        let mut curl = Curl::new();
        curl.absorb(&transaction.trits());
        curl.squeeze()
    }

    #[test]
    fn nonce_satisfies_the_difficulty() {
        let difficulty = 3u8;
        let input = sample_transaction();
        let nonce = CurlPow::new().pow(&input, difficulty).unwrap();
        assert_eq!(nonce.len(), NONCE_TRYTES);

        let completed = format!(
            "{}{}",
            &input.as_str()[..TRANSACTION_TRYTES - NONCE_TRYTES],
            nonce
        );
        let completed = Trytes::try_from(completed.as_str()).unwrap();
        let hash = full_hash(&completed);
        assert!(hash[HASH_TRITS - 3..].iter().all(|&t| t == 0));
    }

    #[test]
    fn zero_difficulty_accepts_the_first_candidate() {
        let input = sample_transaction();
        let nonce = CurlPow::new().pow(&input, 0).unwrap();
        assert_eq!(nonce.len(), NONCE_TRYTES);
    }

    #[test]
    fn wrong_length_input_is_an_engine_failure() {
        let short = Trytes::try_from("ABC").unwrap();
        let err = CurlPow::new().pow(&short, 1).unwrap_err();
        assert!(matches!(err, EngineError::Failure(_)));
    }

    #[test]
    fn search_is_deterministic() {
        let input = sample_transaction();
        let first = CurlPow::new().pow(&input, 2).unwrap();
        let second = CurlPow::new().pow(&input, 2).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn increment_carries_through_the_nonce() {
        let mut nonce = [1i8, 1, 0];
        increment_nonce(&mut nonce);
        assert_eq!(nonce, [-1, -1, 1]);

        let mut zero = [0i8; 3];
        increment_nonce(&mut zero);
        assert_eq!(zero, [1, 0, 0]);
    }
}
