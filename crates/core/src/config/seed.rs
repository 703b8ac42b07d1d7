use derive_more::Display;
use fnv::FnvHasher;
use serde::{de::Visitor, Deserialize, Deserializer, Serialize, Serializer};
use std::{
    convert::TryFrom,
    fmt,
    hash::{Hash, Hasher},
};

/// RNG seed for world generation. Can be given as a number or as any text.
///
/// When deserializing:
/// - A non-negative integer that fits into `u64` is used as-is
/// - A string that parses into a `u64` is stored as that integer
/// - Any other string is kept as text, and hashed when the seed is used
/// - Anything else (negative number, float, array, etc.) is an error
///
/// A seed is always serialized as a **string**. JSON and TOML can't reliably
/// hold a full 64-bit unsigned integer, so a stringified seed is the only way
/// to guarantee it comes back as the same number.
#[derive(Clone, Debug, Display, PartialEq, Eq)]
pub enum Seed {
    /// An integer seed, which can be used directly
    Int(u64),
    /// A textual seed, which is hashed into a `u64` before use
    Text(String),
}

impl Seed {
    /// Multiplier used to spread chunk indexes across the seed space. This is
    /// the 64-bit golden ratio, the same constant SplitMix64 steps by.
    const CHUNK_SEED_STEP: u64 = 0x9e37_79b9_7f4a_7c15;

    /// Convert the seed to a `u64`, so it can actually be fed to an RNG
    pub fn to_u64(&self) -> u64 {
        match self {
            Self::Int(seed) => *seed,
            Self::Text(text) => {
                let mut hasher = FnvHasher::default();
                text.hash(&mut hasher);
                hasher.finish()
            }
        }
    }

    /// Derive the seed for the chunk at the given index. Chunk 0 always gets
    /// the world seed itself, so a single-chunk world matches a standalone
    /// grid generated from the same seed. Every other chunk gets a distinct
    /// value.
    pub fn chunk_seed(&self, index: usize) -> u64 {
        self.to_u64()
            .wrapping_add((index as u64).wrapping_mul(Self::CHUNK_SEED_STEP))
    }
}

impl Default for Seed {
    fn default() -> Self {
        Self::Int(0)
    }
}

impl From<u64> for Seed {
    fn from(seed: u64) -> Self {
        Self::Int(seed)
    }
}

// Parse as an int if possible, otherwise hang onto the text to hash later
impl From<&str> for Seed {
    fn from(seed: &str) -> Self {
        match seed.parse::<u64>() {
            Ok(seed) => Self::Int(seed),
            Err(_) => Self::Text(seed.into()),
        }
    }
}

impl Serialize for Seed {
    fn serialize<S: Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Seed {
    fn deserialize<D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Self, D::Error> {
        // Could be a number or a string, so no type hint
        deserializer.deserialize_any(SeedVisitor)
    }
}

struct SeedVisitor;

impl<'de> Visitor<'de> for SeedVisitor {
    type Value = Seed;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a positive integer or string")
    }

    // Smaller int types are forwarded to these two by serde's defaults

    fn visit_u64<E: serde::de::Error>(self, value: u64) -> Result<Seed, E> {
        Ok(Seed::Int(value))
    }

    fn visit_i64<E: serde::de::Error>(self, value: i64) -> Result<Seed, E> {
        u64::try_from(value)
            .map(Seed::Int)
            .map_err(|_| E::custom(format!("u64 out of range: {}", value)))
    }

    fn visit_str<E: serde::de::Error>(self, value: &str) -> Result<Seed, E> {
        Ok(value.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_test::{
        assert_de_tokens, assert_de_tokens_error, assert_ser_tokens, Token,
    };

    #[test]
    fn test_from_str() {
        assert_eq!(Seed::from("400"), Seed::Int(400));
        assert_eq!(Seed::from("-1"), Seed::Text("-1".into()));
        assert_eq!(Seed::from("cave"), Seed::Text("cave".into()));
    }

    #[test]
    fn test_to_u64() {
        assert_eq!(Seed::Int(400).to_u64(), 400);

        // Text gets hashed, and hashing has to be stable between calls
        let text = Seed::Text("cave".into());
        assert_eq!(text.to_u64(), text.clone().to_u64());
        assert_ne!(text.to_u64(), Seed::Text("caves".into()).to_u64());
    }

    #[test]
    fn test_chunk_seed() {
        let seed = Seed::Int(400);
        // First chunk uses the world seed untouched
        assert_eq!(seed.chunk_seed(0), 400);
        assert_ne!(seed.chunk_seed(1), 400);
        assert_ne!(seed.chunk_seed(1), seed.chunk_seed(2));

        // Wrapping, not overflowing
        assert_eq!(
            Seed::Int(u64::MAX).chunk_seed(1),
            Seed::CHUNK_SEED_STEP - 1
        );
    }

    #[test]
    fn test_serialize() {
        assert_ser_tokens(&Seed::Int(400), &[Token::Str("400")]);
        assert_ser_tokens(&Seed::Text("cave".into()), &[Token::Str("cave")]);
    }

    #[test]
    fn test_deserialize() {
        assert_de_tokens(&Seed::Int(400), &[Token::U64(400)]);
        assert_de_tokens(&Seed::Int(400), &[Token::U16(400)]);
        assert_de_tokens(&Seed::Int(400), &[Token::Str("400")]);
        assert_de_tokens(&Seed::Text("cave".into()), &[Token::Str("cave")]);

        assert_de_tokens_error::<Seed>(
            &[Token::I32(-1)],
            "u64 out of range: -1",
        );
        assert_de_tokens_error::<Seed>(
            &[Token::Bool(false)],
            "invalid type: boolean `false`, \
            expected a positive integer or string",
        );
    }
}
