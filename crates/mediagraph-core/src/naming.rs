//! Object name generation.
//!
//! Keys have the form `[<tag><digits>/]<body>.<suffix>`: an optional shard
//! prefix that spreads objects over storage partitions, a random alphanumeric
//! body, and the declared media subtype as suffix. Uniqueness is probabilistic;
//! nothing checks the store for collisions.

use std::fmt::{Display, Formatter, Result as FmtResult};

use rand::distr::Alphanumeric;
use rand::Rng;

/// Characters the random body is drawn from.
pub const BODY_ALPHABET: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Suffix used when the declared subtype has no usable characters.
const FALLBACK_SUFFIX: &str = "bin";

/// Shard prefix settings: `<tag><digits>/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShardPrefix {
    pub tag: char,
    pub digits: usize,
}

/// A generated object key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectKey(String);

impl ObjectKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl Display for ObjectKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

/// Produces collision-resistant object keys.
///
/// Holds configuration only. Randomness is either the calling thread's
/// generator (`generate`) or one supplied by the caller (`generate_with`), so
/// concurrent requests never share a seeded generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameGenerator {
    body_length: usize,
    shard: Option<ShardPrefix>,
}

impl NameGenerator {
    pub fn new(body_length: usize, shard: Option<ShardPrefix>) -> Self {
        Self {
            body_length,
            shard: shard.filter(|prefix| prefix.digits > 0),
        }
    }

    pub fn body_length(&self) -> usize {
        self.body_length
    }

    pub fn shard(&self) -> Option<ShardPrefix> {
        self.shard
    }

    /// Generate a key using the thread-local generator.
    pub fn generate(&self, suffix: &str) -> ObjectKey {
        self.generate_with(&mut rand::rng(), suffix)
    }

    /// Generate a key from an explicit randomness source.
    pub fn generate_with<R: Rng + ?Sized>(&self, rng: &mut R, suffix: &str) -> ObjectKey {
        let prefix_len = self.shard.map(|prefix| prefix.digits + 2).unwrap_or(0);
        let mut key = String::with_capacity(prefix_len + self.body_length + suffix.len() + 1);

        if let Some(prefix) = self.shard {
            key.push(prefix.tag);
            key.extend((0..prefix.digits).map(|_| char::from(rng.random_range(b'0'..=b'9'))));
            key.push('/');
        }

        key.extend((0..self.body_length).map(|_| char::from(rng.sample(Alphanumeric))));
        key.push('.');
        key.push_str(&sanitize_suffix(suffix));

        ObjectKey(key)
    }
}

/// Keep the subtype usable as a key suffix: lowercase, no path separators.
fn sanitize_suffix(suffix: &str) -> String {
    let cleaned: String = suffix
        .trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        .map(|c| c.to_ascii_lowercase())
        .collect();
    if cleaned.is_empty() {
        FALLBACK_SUFFIX.to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn body_of(key: &str) -> &str {
        let without_prefix = key.rsplit_once('/').map(|(_, rest)| rest).unwrap_or(key);
        without_prefix.split_once('.').map(|(body, _)| body).unwrap()
    }

    #[test]
    fn test_generate_without_shard() {
        let generator = NameGenerator::new(22, None);
        let key = generator.generate("png");
        let (body, suffix) = key.as_str().split_once('.').unwrap();
        assert_eq!(body.len(), 22);
        assert_eq!(suffix, "png");
        assert!(!key.as_str().contains('/'));
    }

    #[test]
    fn test_generate_with_shard_prefix() {
        let generator = NameGenerator::new(12, Some(ShardPrefix { tag: 'x', digits: 7 }));
        let key = generator.generate("jpeg");
        let (prefix, rest) = key.as_str().split_once('/').unwrap();
        assert_eq!(prefix.len(), 8);
        assert!(prefix.starts_with('x'));
        assert!(prefix[1..].chars().all(|c| c.is_ascii_digit()));
        assert!(rest.ends_with(".jpeg"));
        assert_eq!(body_of(key.as_str()).len(), 12);
    }

    #[test]
    fn test_zero_digit_shard_is_disabled() {
        let generator = NameGenerator::new(11, Some(ShardPrefix { tag: 'v', digits: 0 }));
        assert!(generator.shard().is_none());
        assert!(!generator.generate("png").as_str().contains('/'));
    }

    #[test]
    fn test_bodies_use_alphanumeric_alphabet_and_do_not_collide() {
        let generator = NameGenerator::new(12, Some(ShardPrefix { tag: 'x', digits: 7 }));
        let mut seen = HashSet::new();
        for _ in 0..10_000 {
            let key = generator.generate("png");
            let body = body_of(key.as_str());
            assert_eq!(body.len(), 12);
            assert!(body.chars().all(|c| BODY_ALPHABET.contains(c)));
            assert!(seen.insert(key.into_string()), "duplicate key generated");
        }
    }

    #[test]
    fn test_seeded_generator_is_deterministic() {
        let generator = NameGenerator::new(16, None);
        let a = generator.generate_with(&mut StdRng::seed_from_u64(7), "png");
        let b = generator.generate_with(&mut StdRng::seed_from_u64(7), "png");
        let c = generator.generate_with(&mut StdRng::seed_from_u64(8), "png");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_suffix_is_sanitised() {
        let generator = NameGenerator::new(11, None);
        assert!(generator.generate("SVG+XML").as_str().ends_with(".svg+xml"));
        assert!(generator.generate("../etc").as_str().ends_with("..etc"));
        assert!(generator.generate("").as_str().ends_with(".bin"));
    }

    #[test]
    fn test_concurrent_generation_stays_unique() {
        let generator = NameGenerator::new(12, None);
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let generator = generator.clone();
                std::thread::spawn(move || {
                    (0..2_500)
                        .map(|_| generator.generate("png").into_string())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for key in handle.join().unwrap() {
                assert!(seen.insert(key));
            }
        }
        assert_eq!(seen.len(), 10_000);
    }
}
