//! Analysis window tables.

use prism_core::WindowKind;

/// Pre-computed window applied to each frame before the transform.
///
/// Tables are normalized so their mean is 1, which keeps a sine's peak bin
/// magnitude at `amplitude * size / 2` regardless of the window shape.
#[derive(Debug, Clone)]
pub struct Window {
    kind: WindowKind,
    table: Vec<f32>,
}

impl Window {
    pub fn new(kind: WindowKind, size: usize) -> Self {
        let mut table: Vec<f32> = (0..size).map(|i| coefficient(kind, i, size)).collect();

        let sum: f32 = table.iter().sum();
        if sum > 0.0 {
            let factor = size as f32 / sum;
            for w in &mut table {
                *w *= factor;
            }
        }

        Self { kind, table }
    }

    pub fn kind(&self) -> WindowKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn table(&self) -> &[f32] {
        &self.table
    }

    /// Multiply `frame` by the window in place.
    #[inline]
    pub fn apply(&self, frame: &mut [f32]) {
        debug_assert_eq!(frame.len(), self.table.len());
        for (sample, &w) in frame.iter_mut().zip(&self.table) {
            *sample *= w;
        }
    }
}

fn coefficient(kind: WindowKind, i: usize, size: usize) -> f32 {
    if size < 2 {
        return 1.0;
    }
    let phase = 2.0 * core::f32::consts::PI * i as f32 / (size - 1) as f32;
    match kind {
        WindowKind::Hamming => 0.54 - 0.46 * phase.cos(),
        WindowKind::Hann => 0.5 - 0.5 * phase.cos(),
        WindowKind::Rectangular => 1.0,
    }
}
