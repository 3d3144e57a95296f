// rng.rs - xorshift32
//
// Animation only needs cheap, well-spread noise, not statistical quality.
// Each scene owns its own stream so scenes never share mutable state.

pub struct Rng(u32);

impl Rng {
    pub fn new(seed: u32) -> Self {
        // xorshift is stuck at zero forever
        Self(if seed == 0 { 0xDEADBEEF } else { seed })
    }

    /// Seed from the host's entropy.
    pub fn from_host() -> Self {
        #[cfg(target_arch = "wasm32")]
        let seed = (js_sys::Math::random() * u32::MAX as f64) as u32;

        #[cfg(not(target_arch = "wasm32"))]
        let seed = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.subsec_nanos() ^ d.as_secs() as u32)
            .unwrap_or(0);

        Self::new(seed)
    }

    /// Independent stream for a child scene.
    pub fn fork(&mut self) -> Rng {
        self.next_u32();
        Rng::new(self.0.rotate_left(16) ^ 0x9E37_79B9)
    }

    #[inline(always)]
    fn next_u32(&mut self) -> u32 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 17;
        self.0 ^= self.0 << 5;
        self.0
    }

    /// Uniform in [0, 1).
    #[inline(always)]
    pub fn next(&mut self) -> f32 {
        (self.next_u32() >> 8) as f32 * (1.0 / 16777216.0)
    }

    /// Uniform in [min, max).
    #[inline]
    pub fn range(&mut self, min: f32, max: f32) -> f32 {
        let v = min + (max - min) * self.next();
        if v >= max && max > min { min } else { v }
    }

    #[inline]
    pub fn between(&mut self, (min, max): (f32, f32)) -> f32 {
        self.range(min, max)
    }

    /// Uniform index in 0..n. `n` must be non-zero.
    #[inline]
    pub fn index(&mut self, n: usize) -> usize {
        ((self.next() * n as f32) as usize).min(n - 1)
    }

    #[inline]
    pub fn chance(&mut self, p: f32) -> bool {
        self.next() < p
    }
}
