//! Flat cloud layer above the world, meshed as greedy-merged quads.

use voxisle_core::constants::CHUNK_SIZE;

use crate::config::WorldDims;
use crate::noise_field::NoiseField;

/// Noise frequency of the cloud pattern.
pub const CLOUD_FREQUENCY: f64 = 0.13;

/// Noise value at or above which a cell is cloud.
pub const CLOUD_THRESHOLD: f64 = 0.2;

/// Cloud coverage over the world's XZ footprint, one cell per voxel column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CloudLayer {
    width: usize,
    depth: usize,
    altitude: u16,
    cells: Vec<bool>,
}

impl CloudLayer {
    /// Sample cloud coverage for a world.
    pub fn generate(noise: &NoiseField, dims: WorldDims) -> Self {
        let width = dims.width as usize * CHUNK_SIZE;
        let depth = dims.depth as usize * CHUNK_SIZE;
        let mut cells = vec![false; width * depth];
        for z in 0..depth {
            for x in 0..width {
                cells[x + width * z] = noise.noise2(
                    CLOUD_FREQUENCY * x as f64,
                    CLOUD_FREQUENCY * z as f64,
                ) >= CLOUD_THRESHOLD;
            }
        }
        Self {
            width,
            depth,
            altitude: cloud_altitude(dims),
            cells,
        }
    }

    /// Build a layer from an explicit row-major mask (`x + width * z`).
    ///
    /// # Panics
    ///
    /// Panics if the mask length is not `width * depth`.
    pub fn from_mask(width: usize, depth: usize, altitude: u16, cells: Vec<bool>) -> Self {
        assert_eq!(cells.len(), width * depth, "cloud mask has wrong length");
        Self {
            width,
            depth,
            altitude,
            cells,
        }
    }

    /// Footprint width in cells.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Footprint depth in cells.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Height of the cloud plane in voxels.
    pub fn altitude(&self) -> u16 {
        self.altitude
    }

    /// Whether the cell at `(x, z)` is cloud. Cells outside the footprint are not.
    pub fn is_cloud(&self, x: usize, z: usize) -> bool {
        x < self.width && z < self.depth && self.cells[x + self.width * z]
    }

    /// Number of cloud cells.
    pub fn coverage(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// Mesh the layer as two triangles per merged rectangle.
    ///
    /// Rectangles grow along +x first, then along +z as far as every column
    /// of the run allows.
    #[cfg_attr(feature = "profiling", tracing::instrument(level = "trace", skip_all))]
    pub fn build_mesh(&self) -> Vec<[u16; 3]> {
        let (width, depth) = (self.width, self.depth);
        let open = |visited: &[bool], x: usize, z: usize| {
            let i = x + width * z;
            self.cells[i] && !visited[i]
        };

        let mut visited = vec![false; self.cells.len()];
        let mut vertices = Vec::new();
        for z in 0..depth {
            for x in 0..width {
                if !open(&visited, x, z) {
                    continue;
                }

                let mut run = 1;
                while x + run < width && open(&visited, x + run, z) {
                    run += 1;
                }

                let mut rows = depth - z;
                for ix in x..x + run {
                    let mut column = 1;
                    while z + column < depth && open(&visited, ix, z + column) {
                        column += 1;
                    }
                    rows = rows.min(column);
                }

                for iz in z..z + rows {
                    visited[x + width * iz..x + run + width * iz].fill(true);
                }

                let h = self.altitude;
                let (x0, z0) = (x as u16, z as u16);
                let (x1, z1) = ((x + run) as u16, (z + rows) as u16);
                let v0 = [x0, h, z0];
                let v1 = [x1, h, z1];
                let v2 = [x1, h, z0];
                let v3 = [x0, h, z1];
                vertices.extend_from_slice(&[v0, v1, v2, v0, v3, v1]);
            }
        }
        vertices
    }
}

/// Cloud plane height: twice the world's voxel height.
pub fn cloud_altitude(dims: WorldDims) -> u16 {
    u16::try_from(2 * dims.height as usize * CHUNK_SIZE).unwrap_or(u16::MAX)
}

/// Cloud vertices as bytes, ready for a GPU buffer upload.
pub fn cloud_bytes(vertices: &[[u16; 3]]) -> &[u8] {
    bytemuck::cast_slice(vertices)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quads(vertices: &[[u16; 3]]) -> Vec<([u16; 3], [u16; 3])> {
        vertices.chunks_exact(6).map(|q| (q[0], q[1])).collect()
    }

    #[test]
    fn full_mask_is_one_quad() {
        let layer = CloudLayer::from_mask(5, 4, 96, vec![true; 20]);
        let vertices = layer.build_mesh();
        assert_eq!(vertices.len(), 6);
        assert_eq!(
            vertices,
            vec![
                [0, 96, 0],
                [5, 96, 4],
                [5, 96, 0],
                [0, 96, 0],
                [0, 96, 4],
                [5, 96, 4]
            ]
        );
    }

    #[test]
    fn empty_mask_has_no_vertices() {
        let layer = CloudLayer::from_mask(3, 3, 10, vec![false; 9]);
        assert!(layer.build_mesh().is_empty());
    }

    #[test]
    fn checkerboard_is_one_quad_per_cell() {
        let (w, d) = (4, 4);
        let cells = (0..w * d).map(|i| (i % w + i / w) % 2 == 0).collect();
        let layer = CloudLayer::from_mask(w, d, 10, cells);
        let vertices = layer.build_mesh();
        assert_eq!(vertices.len(), 8 * 6);
        for (v0, v1) in quads(&vertices) {
            assert_eq!(v1[0] - v0[0], 1);
            assert_eq!(v1[2] - v0[2], 1);
        }
    }

    #[test]
    fn ragged_run_uses_shortest_column() {
        // x:  0 1 2
        // z0: # # #
        // z1: # # .
        // z2: # # .
        #[rustfmt::skip]
        let cells = vec![
            true, true, true,
            true, true, false,
            true, true, false,
        ];
        let layer = CloudLayer::from_mask(3, 3, 10, cells);
        let quads = quads(&layer.build_mesh());
        assert_eq!(
            quads,
            vec![
                ([0, 10, 0], [3, 10, 1]),
                ([0, 10, 1], [2, 10, 3]),
            ]
        );
    }

    #[test]
    fn merged_quads_cover_every_cloud_cell_once() {
        let noise = NoiseField::new(42);
        let layer = CloudLayer::generate(&noise, WorldDims::new(1, 1, 1));
        let mut covered = vec![0u8; layer.width() * layer.depth()];
        for (v0, v1) in quads(&layer.build_mesh()) {
            for z in v0[2]..v1[2] {
                for x in v0[0]..v1[0] {
                    covered[usize::from(x) + layer.width() * usize::from(z)] += 1;
                }
            }
        }
        for z in 0..layer.depth() {
            for x in 0..layer.width() {
                let expected = u8::from(layer.is_cloud(x, z));
                assert_eq!(covered[x + layer.width() * z], expected);
            }
        }
    }

    #[test]
    fn generated_layer_sits_above_world() {
        let noise = NoiseField::new(1);
        let dims = WorldDims::new(2, 3, 1);
        let layer = CloudLayer::generate(&noise, dims);
        assert_eq!(layer.altitude(), 2 * 3 * CHUNK_SIZE as u16);
        assert_eq!(layer.width(), 2 * CHUNK_SIZE);
        assert!(layer.build_mesh().iter().all(|v| v[1] == layer.altitude()));
        assert_eq!(CloudLayer::generate(&noise, dims), layer);
    }

    #[test]
    fn bytes_view_matches_vertices() {
        let vertices = vec![[1u16, 2, 3]; 6];
        assert_eq!(cloud_bytes(&vertices).len(), 36);
    }
}
