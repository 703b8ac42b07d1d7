use rand::SeedableRng;
use rand_pcg::Pcg64;
use std::ops::{Deref, DerefMut};

/// Temporarily reseeds a shared RNG. On creation, the RNG's current state is
/// stashed and the RNG is reseeded. When the guard is dropped, the stashed
/// state is put back. This happens on every exit path (including early
/// returns and panics), so whoever owns the RNG never sees our draws.
///
/// The guard derefs to the RNG, so it can be passed anywhere that takes
/// `&mut impl Rng`.
#[derive(Debug)]
pub struct ReseedGuard<'a> {
    rng: &'a mut Pcg64,
    saved: Pcg64,
}

impl<'a> ReseedGuard<'a> {
    pub fn new(rng: &'a mut Pcg64, seed: u64) -> Self {
        let saved = std::mem::replace(rng, Pcg64::seed_from_u64(seed));
        Self { rng, saved }
    }
}

impl Deref for ReseedGuard<'_> {
    type Target = Pcg64;

    fn deref(&self) -> &Self::Target {
        &*self.rng
    }
}

impl DerefMut for ReseedGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.rng
    }
}

impl Drop for ReseedGuard<'_> {
    fn drop(&mut self) {
        std::mem::swap(self.rng, &mut self.saved);
    }
}
