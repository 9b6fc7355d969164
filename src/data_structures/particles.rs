//! Firework particles and the slot arena that stores them.
//!
//! Particles live in a [`ParticleArena`]: a vector of slots plus an
//! index-based free list. Removing a particle frees its slot without moving any
//! other particle, so the per-frame update can drop expired particles while
//! iterating without skipping or revisiting neighbours. Freed slots are reused
//! before the arena grows.

use std::fmt;

/// A colour in HSL notation (hue in degrees, saturation and lightness in percent).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hsl {
    pub hue: f32,
    pub saturation: f32,
    pub lightness: f32,
}

impl Hsl {
    pub fn new(hue: f32, saturation: f32, lightness: f32) -> Self {
        Self {
            hue,
            saturation,
            lightness,
        }
    }

    /// Linear interpretation of the CSS `hsl()` function, alpha is always 1.
    pub fn to_rgba(self) -> [f32; 4] {
        let s = (self.saturation / 100.0).clamp(0.0, 1.0);
        let l = (self.lightness / 100.0).clamp(0.0, 1.0);
        let h = self.hue.rem_euclid(360.0) / 60.0;

        let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let x = c * (1.0 - (h % 2.0 - 1.0).abs());
        let (r, g, b) = match h as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        let m = l - c / 2.0;
        [r + m, g + m, b + m, 1.0]
    }
}

impl fmt::Display for Hsl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hsl({}, {}%, {}%)",
            self.hue, self.saturation, self.lightness
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub life: i32,
    pub color: Hsl,
}

impl Particle {
    pub fn new(x: f32, y: f32, vx: f32, vy: f32, life: i32, color: Hsl) -> Self {
        Self {
            x,
            y,
            vx,
            vy,
            life,
            color,
        }
    }

    /// Advance by one frame. Returns whether the particle is still alive.
    pub fn update(&mut self, gravity: f32) -> bool {
        self.vy += gravity;
        self.x += self.vx;
        self.y += self.vy;
        self.life -= 1;
        self.life > 0
    }

    pub fn to_raw(&self, radius: f32) -> ParticleRaw {
        ParticleRaw {
            position: [self.x, self.y],
            radius,
            _padding: 0.0,
            color: self.color.to_rgba(),
        }
    }
}

#[derive(Clone, Debug)]
enum Slot {
    Live(Particle),
    Free { next: Option<usize> },
}

#[derive(Clone, Debug, Default)]
pub struct ParticleArena {
    slots: Vec<Slot>,
    free_head: Option<usize>,
    live: usize,
    cap: Option<usize>,
}

impl ParticleArena {
    /// An arena that grows without bound.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-size the slot vector. Growth past `capacity` is still allowed.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            ..Default::default()
        }
    }

    /// An arena that refuses inserts once `cap` particles are alive.
    pub fn bounded(cap: usize) -> Self {
        Self {
            slots: Vec::with_capacity(cap),
            cap: Some(cap),
            ..Default::default()
        }
    }

    /// Number of live particles.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Number of slots ever allocated (live + free).
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Store a particle and return its slot index, or `None` if the cap is reached.
    pub fn insert(&mut self, particle: Particle) -> Option<usize> {
        if self.cap.is_some_and(|cap| self.live >= cap) {
            return None;
        }
        self.live += 1;
        match self.free_head {
            Some(idx) => {
                if let Slot::Free { next } = self.slots[idx] {
                    self.free_head = next;
                }
                self.slots[idx] = Slot::Live(particle);
                Some(idx)
            }
            None => {
                self.slots.push(Slot::Live(particle));
                Some(self.slots.len() - 1)
            }
        }
    }

    pub fn get(&self, idx: usize) -> Option<&Particle> {
        match self.slots.get(idx) {
            Some(Slot::Live(particle)) => Some(particle),
            _ => None,
        }
    }

    pub fn remove(&mut self, idx: usize) -> Option<Particle> {
        match self.slots.get(idx) {
            Some(Slot::Live(_)) => {
                let slot = std::mem::replace(
                    &mut self.slots[idx],
                    Slot::Free {
                        next: self.free_head,
                    },
                );
                self.free_head = Some(idx);
                self.live -= 1;
                match slot {
                    Slot::Live(particle) => Some(particle),
                    Slot::Free { .. } => None,
                }
            }
            _ => None,
        }
    }

    /// Visit every live particle exactly once and free those for which `keep`
    /// returns false.
    pub fn retain_mut(&mut self, mut keep: impl FnMut(&mut Particle) -> bool) {
        for idx in 0..self.slots.len() {
            let alive = match &mut self.slots[idx] {
                Slot::Live(particle) => keep(particle),
                Slot::Free { .. } => continue,
            };
            if !alive {
                self.remove(idx);
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.slots.iter().filter_map(|slot| match slot {
            Slot::Live(particle) => Some(particle),
            Slot::Free { .. } => None,
        })
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.free_head = None;
        self.live = 0;
    }
}

/**
 * Per-particle data stored in the instance buffer of the particle pipeline.
 */
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ParticleRaw {
    position: [f32; 2],
    radius: f32,
    _padding: f32,
    color: [f32; 4],
}

impl crate::data_structures::model::Vertex for ParticleRaw {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<ParticleRaw>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 4]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}
