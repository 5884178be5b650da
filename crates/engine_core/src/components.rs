//! Common ECS components used across the engine.

/// Emissive tint applied to a hovered interactive object (`0x555555`).
pub const HOVER_EMISSIVE: [f32; 3] = [0x55 as f32 / 255.0; 3];

/// Convert a packed `0xRRGGBB` colour into linear-ish float channels.
pub fn rgb_from_hex(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    ]
}

/// Surface appearance of a mesh as far as interaction cares about it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub base_color: [f32; 4],
    pub emissive: [f32; 3],
}

impl Default for Material {
    fn default() -> Self {
        Self {
            base_color: [1.0, 1.0, 1.0, 1.0],
            emissive: [0.0; 3],
        }
    }
}

impl Material {
    pub fn new(base_color: [f32; 4], emissive: [f32; 3]) -> Self {
        Self {
            base_color,
            emissive,
        }
    }

    /// Copy of this material with its emissive channel replaced.
    pub fn with_emissive(&self, emissive: [f32; 3]) -> Self {
        Self {
            emissive,
            ..*self
        }
    }
}

/// Snapshot of a mesh's material taken before any highlight was applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OriginalAppearance(pub Material);

/// Name of the scene node an entity was created from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SceneName(pub String);

impl SceneName {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn contains(&self, pattern: &str) -> bool {
        self.0.contains(pattern)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hover_tint_is_a_third_grey() {
        for c in HOVER_EMISSIVE {
            assert!((c - 0x55 as f32 / 255.0).abs() < f32::EPSILON);
        }
    }

    #[test]
    fn hex_unpacks_channels() {
        assert_eq!(rgb_from_hex(0xff0000), [1.0, 0.0, 0.0]);
        assert_eq!(rgb_from_hex(0x555555), HOVER_EMISSIVE);
    }

    #[test]
    fn with_emissive_keeps_base_color() {
        let m = Material::new([0.2, 0.3, 0.4, 1.0], [0.0; 3]);
        let h = m.with_emissive(HOVER_EMISSIVE);
        assert_eq!(h.base_color, m.base_color);
        assert_eq!(h.emissive, HOVER_EMISSIVE);
    }
}
