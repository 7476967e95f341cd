//! Short code allocation.
//!
//! Codes are drawn from a [`CodeSource`] and checked against the set of codes
//! already in use. Each length gets a fixed number of attempts; when they are
//! all taken the length grows by one, up to a ceiling. Allocation therefore
//! always terminates, either with a free code or with
//! [`PocketlinkError::CodeSpaceExhausted`].

use crate::config::ShortenerConfig;
use crate::errors::{PocketlinkError, Result};
use crate::utils::generate_random_code;

pub trait CodeSource: Send + Sync {
    fn next_code(&self, length: usize) -> String;
}

/// Uniform draws from the 62-character alphanumeric alphabet.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomCodes;

impl CodeSource for RandomCodes {
    fn next_code(&self, length: usize) -> String {
        generate_random_code(length)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocationPolicy {
    pub initial_length: usize,
    pub max_length: usize,
    pub attempts_per_length: u32,
}

impl From<&ShortenerConfig> for AllocationPolicy {
    fn from(config: &ShortenerConfig) -> Self {
        Self {
            initial_length: config.code_length,
            max_length: config.max_code_length.max(config.code_length),
            attempts_per_length: config.max_attempts_per_length.max(1),
        }
    }
}

impl Default for AllocationPolicy {
    fn default() -> Self {
        Self::from(&ShortenerConfig::default())
    }
}

/// A code that passed the availability check, plus how many draws it took.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    pub code: String,
    pub attempts: u32,
}

pub fn allocate_code<F>(
    source: &dyn CodeSource,
    policy: AllocationPolicy,
    is_taken: F,
) -> Result<Allocation>
where
    F: Fn(&str) -> bool,
{
    let mut attempts = 0u32;

    for length in policy.initial_length..=policy.max_length {
        for _ in 0..policy.attempts_per_length {
            attempts += 1;
            let code = source.next_code(length);
            if !is_taken(&code) {
                return Ok(Allocation { code, attempts });
            }
        }
    }

    Err(PocketlinkError::code_space_exhausted(format!(
        "No free short code found after {} attempts (lengths {}..={})",
        attempts, policy.initial_length, policy.max_length
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::VecDeque;

    /// Hands out a fixed script of codes, then repeats the last one.
    struct Scripted {
        codes: Mutex<VecDeque<String>>,
    }

    impl Scripted {
        fn new(codes: &[&str]) -> Self {
            Self {
                codes: Mutex::new(codes.iter().map(|c| c.to_string()).collect()),
            }
        }
    }

    impl CodeSource for Scripted {
        fn next_code(&self, length: usize) -> String {
            let mut codes = self.codes.lock();
            match codes.len() {
                0 => "x".repeat(length),
                1 => codes[0].clone(),
                _ => codes.pop_front().unwrap_or_default(),
            }
        }
    }

    /// Always the same code for a given length.
    struct SameLetter;

    impl CodeSource for SameLetter {
        fn next_code(&self, length: usize) -> String {
            "a".repeat(length)
        }
    }

    #[test]
    fn test_first_free_code_wins() {
        let source = Scripted::new(&["taken1", "free01"]);
        let allocation =
            allocate_code(&source, AllocationPolicy::default(), |c| c == "taken1").unwrap();
        assert_eq!(allocation.code, "free01");
        assert_eq!(allocation.attempts, 2);
    }

    #[test]
    fn test_widens_when_length_exhausted() {
        let policy = AllocationPolicy {
            initial_length: 6,
            max_length: 8,
            attempts_per_length: 3,
        };
        let allocation = allocate_code(&SameLetter, policy, |c| c.len() == 6).unwrap();
        assert_eq!(allocation.code, "aaaaaaa");
        assert_eq!(allocation.attempts, 4);
    }

    #[test]
    fn test_gives_up_after_ceiling() {
        let policy = AllocationPolicy {
            initial_length: 4,
            max_length: 5,
            attempts_per_length: 2,
        };
        let result = allocate_code(&SameLetter, policy, |_| true);
        assert!(matches!(result, Err(PocketlinkError::CodeSpaceExhausted(_))));
    }

    #[test]
    fn test_random_codes_have_requested_length() {
        let code = RandomCodes.next_code(6);
        assert_eq!(code.len(), 6);
        assert!(code.bytes().all(|b| b.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_policy_from_config_never_shrinks() {
        let config = ShortenerConfig {
            code_length: 8,
            max_code_length: 4,
            max_attempts_per_length: 0,
            ..ShortenerConfig::default()
        };
        let policy = AllocationPolicy::from(&config);
        assert_eq!(policy.max_length, 8);
        assert_eq!(policy.attempts_per_length, 1);
    }
}
