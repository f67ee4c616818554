//! Curl-P-81 ternary sponge.

/// Trits per hash (and per absorbed block).
pub const HASH_TRITS: usize = 243;

/// Trits in the sponge state.
pub const STATE_TRITS: usize = 729;

const ROUNDS: usize = 81;

/// Indexed by `a + (b << 2) + 5` for trit pairs `a`, `b`; the two `2`
/// entries are unreachable padding.
const TRUTH_TABLE: [i8; 11] = [1, 0, -1, 2, 1, -1, 0, 2, -1, 1, 0];

const fn build_rotation_indices() -> [usize; STATE_TRITS + 1] {
    let mut indices = [0usize; STATE_TRITS + 1];
    let mut i = 0;
    while i < STATE_TRITS {
        indices[i + 1] = if indices[i] < 365 {
            indices[i] + 364
        } else {
            indices[i] - 365
        };
        i += 1;
    }
    indices
}

static ROTATION_INDICES: [usize; STATE_TRITS + 1] = build_rotation_indices();

/// Run the 81-round Curl permutation in place.
pub(crate) fn transform(state: &mut [i8; STATE_TRITS]) {
    let mut scratch = [0i8; STATE_TRITS];
    for _ in 0..ROUNDS {
        scratch.copy_from_slice(state);
        for (i, trit) in state.iter_mut().enumerate() {
            let a = scratch[ROTATION_INDICES[i]];
            let b = scratch[ROTATION_INDICES[i + 1]];
            *trit = TRUTH_TABLE[(a + (b << 2) + 5) as usize];
        }
    }
}

/// The Curl sponge. Absorb whole-block multiples of [`HASH_TRITS`] trits,
/// then squeeze 243-trit hashes.
#[derive(Debug, Clone)]
pub struct Curl {
    pub(crate) state: [i8; STATE_TRITS],
}

impl Default for Curl {
    fn default() -> Self {
        Self::new()
    }
}

impl Curl {
    pub fn new() -> Self {
        Self {
            state: [0; STATE_TRITS],
        }
    }

    /// Absorb trits in blocks of up to [`HASH_TRITS`].
    pub fn absorb(&mut self, trits: &[i8]) {
        for block in trits.chunks(HASH_TRITS) {
            self.state[..block.len()].copy_from_slice(block);
            transform(&mut self.state);
        }
    }

    /// Produce the next 243-trit hash.
    pub fn squeeze(&mut self) -> [i8; HASH_TRITS] {
        let mut out = [0i8; HASH_TRITS];
        out.copy_from_slice(&self.state[..HASH_TRITS]);
        transform(&mut self.state);
        out
    }

    /// Reset the sponge to its initial state.
    pub fn reset(&mut self) {
        self.state = [0; STATE_TRITS];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trytes::Trytes;

    fn hash_of(text: &str) -> [i8; HASH_TRITS] {
        let trytes = Trytes::try_from(text).unwrap();
        let mut curl = Curl::new();
        curl.absorb(&trytes.trits());
        curl.squeeze()
    }

    #[test]
    fn deterministic() {
        assert_eq!(hash_of("POWLINK"), hash_of("POWLINK"));
    }

    #[test]
    fn different_inputs_diverge() {
        assert_ne!(hash_of("POWLINK"), hash_of("POWLINL"));
        assert_ne!(hash_of("AAA"), hash_of("AAB"));
    }

    #[test]
    fn output_trits_are_balanced() {
        for trit in hash_of("ZZZZZZZZZ") {
            assert!((-1..=1).contains(&trit));
        }
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut curl = Curl::new();
        curl.absorb(&Trytes::try_from("ABC").unwrap().trits());
        curl.reset();

        let mut fresh = Curl::new();
        assert_eq!(curl.squeeze(), fresh.squeeze());
    }

    #[test]
    fn repeated_squeeze_advances_the_sponge() {
        let mut curl = Curl::new();
        curl.absorb(&Trytes::try_from("NINE9NINE").unwrap().trits());
        let first = curl.squeeze();
        let second = curl.squeeze();
        assert_ne!(first, second);
    }

    #[test]
    fn multi_block_absorb_differs_from_single_block() {
        // 81 trytes = exactly one block; 162 trytes = two.
        let one = "A".repeat(81);
        let two = "A".repeat(162);
        assert_ne!(hash_of(&one), hash_of(&two));
    }
}
