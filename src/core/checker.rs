/// Bytes the transformed candidate has to equal.
pub const TARGET: [u8; 8] = [0x7b, 0x76, 0x7b, 0x7e, 0x75, 0x6e, 0x60, 0x69];

const PRE_MASK: u8 = 0x5a;
const POST_MASK: u8 = 0xa5;
const STEP: usize = 3;

/// Positional offset added between the two masks. Wraps like the byte math.
fn offset(index: usize) -> u8 {
    index.wrapping_mul(STEP) as u8
}

pub fn transform(byte: u8, index: usize) -> u8 {
    (byte ^ PRE_MASK).wrapping_add(offset(index)) ^ POST_MASK
}

/// Undoes [`transform`] for the same index.
pub fn inverse(byte: u8, index: usize) -> u8 {
    (byte ^ POST_MASK).wrapping_sub(offset(index)) ^ PRE_MASK
}

#[derive(Debug, Clone, PartialEq)]
pub struct Checker {
    target: Vec<u8>,
}

impl Default for Checker {
    fn default() -> Self {
        Checker {
            target: TARGET.to_vec(),
        }
    }
}

impl Checker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_target(target: &[u8]) -> Self {
        Checker {
            target: target.to_vec(),
        }
    }

    pub fn target(&self) -> &[u8] {
        &self.target
    }

    pub fn is_match(&self, candidate: &[u8]) -> bool {
        if candidate.len() != self.target.len() {
            return false;
        }

        candidate
            .iter()
            .zip(&self.target)
            .enumerate()
            .all(|(i, (&b, &t))| transform(b, i) == t)
    }

    /// The only candidate accepted by this checker.
    pub fn secret(&self) -> Vec<u8> {
        self.target
            .iter()
            .enumerate()
            .map(|(i, &t)| inverse(t, i))
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use proptest::prelude::*;

    const SECRET: [u8; 8] = [0x84, 0x8a, 0x82, 0x88, 0x9e, 0xe6, 0xe9, 0xed];

    #[test]
    fn test_secret_decodes_target() {
        let checker = Checker::new();
        assert_eq!(checker.secret(), SECRET.to_vec());
        assert!(checker.is_match(&SECRET));
    }

    #[test]
    fn test_transform_matches_arithmetic() {
        // 0x84 ^ 0x5a = 0xde, + 0 = 0xde, ^ 0xa5 = 0x7b
        assert_eq!(transform(0x84, 0), 0x7b);
        // 0xff ^ 0x5a = 0xa5, + 0xff = 0xa4 (wrapped), ^ 0xa5 = 0x01
        assert_eq!(transform(0xff, 85), 0x01);
    }

    #[test]
    fn test_wrong_length_rejected() {
        let checker = Checker::new();
        assert!(!checker.is_match(b""));
        assert!(!checker.is_match(&SECRET[..7]));

        let mut longer = SECRET.to_vec();
        longer.push(b'\n');
        assert!(!checker.is_match(&longer));
    }

    #[test]
    fn test_single_byte_change_rejected() {
        let checker = Checker::new();
        for i in 0..SECRET.len() {
            let mut candidate = SECRET;
            candidate[i] = candidate[i].wrapping_add(1);
            assert!(!checker.is_match(&candidate), "index {i} still matched");
        }
    }

    #[test]
    fn test_custom_target() {
        let plain = b"FLAG";
        let target: Vec<u8> = plain
            .iter()
            .enumerate()
            .map(|(i, &b)| transform(b, i))
            .collect();
        let checker = Checker::with_target(&target);
        assert_eq!(checker.secret(), plain.to_vec());
        assert!(checker.is_match(plain));
        assert!(!checker.is_match(b"FLAF"));
    }

    proptest! {
        #[test]
        fn prop_inverse_undoes_transform(byte: u8, index in 0usize..4096) {
            prop_assert_eq!(inverse(transform(byte, index), index), byte);
        }

        #[test]
        fn prop_other_lengths_never_match(
            candidate in proptest::collection::vec(any::<u8>(), 0..64)
        ) {
            prop_assume!(candidate.len() != TARGET.len());
            prop_assert!(!Checker::new().is_match(&candidate));
        }

        #[test]
        fn prop_is_match_is_deterministic(candidate in proptest::collection::vec(any::<u8>(), 8)) {
            let checker = Checker::new();
            let first = checker.is_match(&candidate);
            prop_assert_eq!(first, checker.is_match(&candidate));
            prop_assert_eq!(first, candidate == SECRET.to_vec());
        }
    }
}
