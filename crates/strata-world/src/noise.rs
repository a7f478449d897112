use fastnoise_lite::{FastNoiseLite, NoiseType};

/// Offset that keeps samples off the integer lattice, where gradient noise is flat.
const LATTICE_NUDGE: f32 = 0.1;

/// Deterministic coherent 2D noise in `[0,1]`.
pub trait NoiseSource: Send + Sync {
    fn sample_2d(&self, x: f32, y: f32) -> f32;
}

/// Seeded Perlin noise. The seed selects the gradient permutation.
pub struct PerlinNoise {
    noise: FastNoiseLite,
}

impl PerlinNoise {
    pub fn new(seed: i32) -> Self {
        let mut noise = FastNoiseLite::with_seed(seed);
        noise.set_noise_type(Some(NoiseType::Perlin));
        // Callers pre-scale coordinates.
        noise.set_frequency(Some(1.0));
        Self { noise }
    }
}

impl NoiseSource for PerlinNoise {
    #[inline]
    fn sample_2d(&self, x: f32, y: f32) -> f32 {
        ((self.noise.get_noise_2d(x, y) + 1.0) * 0.5).clamp(0.0, 1.0)
    }
}

/// Constant output, handy for flat test terrain.
pub struct ConstantNoise(pub f32);

impl NoiseSource for ConstantNoise {
    #[inline]
    fn sample_2d(&self, _x: f32, _y: f32) -> f32 {
        self.0
    }
}

/// Column noise at world `(x, z)`; `scale` is in cycles per chunk.
#[inline]
pub fn perlin_2d(
    noise: &dyn NoiseSource,
    x: f32,
    z: f32,
    offset: f32,
    scale: f32,
    chunk_width: usize,
) -> f32 {
    let w = chunk_width as f32;
    let sx = (x + offset + LATTICE_NUDGE) / w * scale;
    let sz = (z + offset + LATTICE_NUDGE) / w * scale;
    noise.sample_2d(sx, sz)
}

/// Volumetric noise as the mean of the six ordered axis-pair samples.
#[inline]
pub fn perlin_3d(noise: &dyn NoiseSource, x: f32, y: f32, z: f32, offset: f32, scale: f32) -> f32 {
    let a = (x + offset + LATTICE_NUDGE) * scale;
    let b = (y + offset + LATTICE_NUDGE) * scale;
    let c = (z + offset + LATTICE_NUDGE) * scale;
    let ab = noise.sample_2d(a, b);
    let bc = noise.sample_2d(b, c);
    let ac = noise.sample_2d(a, c);
    let ba = noise.sample_2d(b, a);
    let cb = noise.sample_2d(c, b);
    let ca = noise.sample_2d(c, a);
    (ab + bc + ac + ba + cb + ca) / 6.0
}
