use rayon::prelude::*;

use crate::core::checker::Checker;
use crate::core::crackme::Crackme;
use crate::core::error::LabError;

pub const DEFAULT_MAX_LEN: usize = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct SearchSpace {
    pub charset: Vec<u8>,
    pub max_len: usize,
}

impl Default for SearchSpace {
    fn default() -> Self {
        SearchSpace {
            charset: (0x20..=0x7e).collect(),
            max_len: DEFAULT_MAX_LEN,
        }
    }
}

impl SearchSpace {
    pub fn new(charset: &[u8], max_len: usize) -> Result<Self, LabError> {
        let mut deduped = Vec::with_capacity(charset.len());
        for &b in charset {
            if !deduped.contains(&b) {
                deduped.push(b);
            }
        }

        if deduped.is_empty() {
            return Err(LabError::EmptyCharset);
        }

        Ok(SearchSpace {
            charset: deduped,
            max_len,
        })
    }

    /// Number of candidates of exactly `len` bytes, `None` when it does not
    /// fit in a `usize`.
    pub fn count(&self, len: usize) -> Option<usize> {
        let len = u32::try_from(len).ok()?;
        self.charset.len().checked_pow(len)
    }

    /// Candidates of every length up to `max_len`, `None` on overflow.
    pub fn total(&self) -> Option<usize> {
        (0..=self.max_len).try_fold(0usize, |acc, len| acc.checked_add(self.count(len)?))
    }

    /// Candidate number `index` among those of `len` bytes. The first
    /// charset byte is the most significant digit so ordering follows the
    /// charset.
    pub fn candidate(&self, mut index: usize, len: usize) -> Vec<u8> {
        let base = self.charset.len();
        let mut out = vec![0u8; len];
        for slot in out.iter_mut().rev() {
            *slot = self.charset[index % base];
            index /= base;
        }
        out
    }
}

/// Recovers the accepted input of an obfuscation checker directly.
pub fn solve_obf(checker: &Checker) -> Vec<u8> {
    checker.secret()
}

/// Tries every candidate of the space, shortest first. Returns the first
/// accepted one in charset order.
pub fn brute_force(crackme: &dyn Crackme, space: &SearchSpace) -> Option<Vec<u8>> {
    for len in 0..=space.max_len {
        let Some(total) = space.count(len) else {
            tracing::warn!(len, "search space too large, stopping");
            return None;
        };
        tracing::debug!(crackme = crackme.name(), len, total, "searching");

        let found = (0..total)
            .into_par_iter()
            .find_first(|&index| crackme.check(&space.candidate(index, len)));

        if let Some(index) = found {
            return Some(space.candidate(index, len));
        }
    }

    None
}

/// Picks the cheapest way to recover an input for a crackme by name.
pub fn solve(crackme: &dyn Crackme, space: &SearchSpace) -> Option<Vec<u8>> {
    if crackme.name() == "obf" {
        let secret = solve_obf(&Checker::new());
        if crackme.check(&secret) {
            return Some(secret);
        }
    }

    brute_force(crackme, space)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::crackme::{
        GuessCrackme, ObfCrackme, PasswordCrackme, hash_guess, hash_password,
    };

    #[test]
    fn test_space_dedups_and_rejects_empty() {
        let space = SearchSpace::new(b"abca", 2).unwrap();
        assert_eq!(space.charset, b"abc".to_vec());
        assert!(matches!(SearchSpace::new(b"", 2), Err(LabError::EmptyCharset)));
    }

    #[test]
    fn test_candidate_ordering() {
        let space = SearchSpace::new(b"ab", 3).unwrap();
        assert_eq!(space.count(3), Some(8));
        assert_eq!(space.candidate(0, 3), b"aaa".to_vec());
        assert_eq!(space.candidate(1, 3), b"aab".to_vec());
        assert_eq!(space.candidate(7, 3), b"bbb".to_vec());
        assert_eq!(space.candidate(0, 0), Vec::<u8>::new());
    }

    #[test]
    fn test_count_overflow() {
        let space = SearchSpace::default();
        assert_eq!(space.count(1), Some(95));
        assert_eq!(space.count(64), None);
        assert_eq!(space.total(), Some(82_317_121));
        assert_eq!(SearchSpace::new(b"ab", 3).unwrap().total(), Some(15));
        assert_eq!(SearchSpace { max_len: 64, ..space }.total(), None);
    }

    #[test]
    fn test_solve_obf() {
        let secret = solve_obf(&Checker::new());
        assert!(ObfCrackme::default().check(&secret));
        assert_eq!(
            solve(&ObfCrackme::default(), &SearchSpace::default()),
            Some(secret)
        );
    }

    #[test]
    fn test_brute_force_password() {
        let crackme = PasswordCrackme::with_target(hash_password(b"cab"));
        let space = SearchSpace::new(b"abc", 3).unwrap();
        let found = brute_force(&crackme, &space).unwrap();
        assert!(crackme.check(&found));
        assert!(found.len() <= 3);
    }

    #[test]
    fn test_brute_force_guess() {
        let crackme = GuessCrackme::with_target(hash_guess(b"zz"));
        let space = SearchSpace::new(b"xyz", 2).unwrap();
        assert_eq!(brute_force(&crackme, &space), Some(b"zz".to_vec()));
    }

    #[test]
    fn test_brute_force_prefers_empty() {
        let crackme = GuessCrackme::with_target(0);
        let space = SearchSpace::new(b"ab", 2).unwrap();
        assert_eq!(brute_force(&crackme, &space), Some(vec![]));
    }

    #[test]
    fn test_brute_force_not_found() {
        let crackme = PasswordCrackme::default();
        let space = SearchSpace::new(b"a", 3).unwrap();
        assert_eq!(brute_force(&crackme, &space), None);
    }
}
