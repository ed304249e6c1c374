use core::hash::BuildHasher;
use core::hash::Hasher;

/// Maps a key to the 64-bit code the table stores in place of the key.
///
/// Implementations must be deterministic for the lifetime of any table they
/// are used with: the same key must always produce the same code. Tables only
/// ever compare codes, so two keys with the same code are indistinguishable.
///
/// Any `Fn(&str) -> u64` is a `HashCoder`, which is convenient for tests that
/// need to pin keys to specific buckets.
///
/// # Examples
///
/// ```rust
/// use hophash::HashCoder;
///
/// let coder = |key: &str| key.len() as u64;
/// assert_eq!(coder.code("four"), 4);
/// ```
pub trait HashCoder {
    /// Returns the hash code for `key`.
    fn code(&self, key: &str) -> u64;
}

impl<F> HashCoder for F
where
    F: Fn(&str) -> u64,
{
    #[inline]
    fn code(&self, key: &str) -> u64 {
        self(key)
    }
}

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// 64-bit FNV-1a hasher.
#[derive(Debug, Clone, Copy)]
pub struct FnvHasher {
    state: u64,
}

impl Default for FnvHasher {
    fn default() -> Self {
        Self {
            state: FNV_OFFSET_BASIS,
        }
    }
}

impl Hasher for FnvHasher {
    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.state ^= byte as u64;
            self.state = self.state.wrapping_mul(FNV_PRIME);
        }
    }

    #[inline]
    fn finish(&self) -> u64 {
        self.state
    }
}

/// Hash coder computing 64-bit FNV-1a over the raw UTF-8 bytes of the key.
///
/// ```rust
/// use hophash::HashCoder;
/// use hophash::hash_coder::Fnv1a;
///
/// assert_eq!(Fnv1a.code(""), 0xcbf29ce484222325);
/// assert_eq!(Fnv1a.code("a"), 0xaf63dc4c8601ec8c);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Fnv1a;

impl HashCoder for Fnv1a {
    #[inline]
    fn code(&self, key: &str) -> u64 {
        let mut hasher = FnvHasher::default();
        hasher.write(key.as_bytes());
        hasher.finish()
    }
}

/// Adapts a [`BuildHasher`] into a [`HashCoder`].
///
/// The builder must produce identically-seeded hashers every time it is
/// asked, otherwise entries become unreachable. Randomly seeded builders are
/// fine as long as the same builder instance stays with the table.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildHasherCoder<S> {
    hash_builder: S,
}

impl<S> BuildHasherCoder<S> {
    /// Wraps `hash_builder`.
    pub fn new(hash_builder: S) -> Self {
        Self { hash_builder }
    }

    /// Returns a reference to the wrapped builder.
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }
}

impl<S: BuildHasher> HashCoder for BuildHasherCoder<S> {
    #[inline]
    fn code(&self, key: &str) -> u64 {
        self.hash_builder.hash_one(key)
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "foldhash")] {
        /// The coder used when none is specified: foldhash with a fixed seed.
        pub type DefaultCoder = BuildHasherCoder<foldhash::fast::FixedState>;
    } else {
        /// The coder used when none is specified: FNV-1a.
        pub type DefaultCoder = Fnv1a;
    }
}
