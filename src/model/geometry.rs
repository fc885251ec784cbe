use thiserror::Error;

/// Validation failures for mesh geometry handed over by the animation engine.
#[derive(Debug, Error, PartialEq)]
pub enum GeometryError {
    #[error("vertex array has {actual} floats, expected {expected} for {vertex_count} vertices")]
    VertexLength {
        vertex_count: usize,
        expected: usize,
        actual: usize,
    },

    #[error("uv array has {actual} floats, expected {expected}")]
    UvLength { expected: usize, actual: usize },

    #[error("index count {0} is not a multiple of 3")]
    PartialTriangle(usize),

    #[error("index {index} at position {position} is out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        position: usize,
        index: u16,
        vertex_count: usize,
    },

    #[error("weight table covers {actual} vertices, mesh has {expected}")]
    WeightVertexCount { expected: usize, actual: usize },

    #[error("weight table lists {listed} influences but stores {stored}")]
    WeightInfluenceCount { listed: usize, stored: usize },
}

/// One bone's contribution to a skinned vertex.
///
/// `x`/`y` is the vertex position in that bone's local space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoneInfluence {
    pub bone: usize,
    pub weight: f32,
    pub x: f32,
    pub y: f32,
}

/// Per-vertex bone weights, stored flat.
///
/// Vertex `i` owns the next `bone_counts[i]` entries of `influences`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeightTable {
    pub bone_counts: Vec<u16>,
    pub influences: Vec<BoneInfluence>,
}

impl WeightTable {
    /// Build from nested per-vertex influence lists.
    pub fn from_vertices<I>(vertices: I) -> Self
    where
        I: IntoIterator,
        I::Item: IntoIterator<Item = BoneInfluence>,
    {
        let mut table = Self::default();
        for vertex in vertices {
            let before = table.influences.len();
            table.influences.extend(vertex);
            table
                .bone_counts
                .push((table.influences.len() - before) as u16);
        }
        table
    }

    pub fn vertex_count(&self) -> usize {
        self.bone_counts.len()
    }

    /// Iterate `(vertex index, influences)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[BoneInfluence])> {
        let mut offset = 0;
        self.bone_counts
            .iter()
            .enumerate()
            .map(move |(i, &count)| {
                let start = offset.min(self.influences.len());
                let end = (offset + count as usize).min(self.influences.len());
                offset += count as usize;
                (i, &self.influences[start..end])
            })
    }
}

/// Triangle mesh of a mesh display, in the slot's local space.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Geometry {
    pub vertex_count: usize,
    /// Flat `(x, y)` pairs.
    pub vertices: Vec<f32>,
    /// Flat `(u, v)` pairs relative to the atlas region, in `[0, 1]`.
    pub uvs: Vec<f32>,
    /// Three entries per triangle.
    pub indices: Vec<u16>,
    pub weight: Option<WeightTable>,
}

impl Geometry {
    pub fn new(vertices: Vec<f32>, uvs: Vec<f32>, indices: Vec<u16>) -> Self {
        Self {
            vertex_count: vertices.len() / 2,
            vertices,
            uvs,
            indices,
            weight: None,
        }
    }

    pub fn with_weight(mut self, weight: WeightTable) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn is_weighted(&self) -> bool {
        self.weight.is_some()
    }

    /// Check array lengths, index ranges and weight table shape.
    pub fn validate(&self) -> Result<(), GeometryError> {
        let expected = self.vertex_count * 2;
        if self.vertices.len() != expected {
            return Err(GeometryError::VertexLength {
                vertex_count: self.vertex_count,
                expected,
                actual: self.vertices.len(),
            });
        }
        if self.uvs.len() != expected {
            return Err(GeometryError::UvLength {
                expected,
                actual: self.uvs.len(),
            });
        }
        if self.indices.len() % 3 != 0 {
            return Err(GeometryError::PartialTriangle(self.indices.len()));
        }
        if let Some((position, &index)) = self
            .indices
            .iter()
            .enumerate()
            .find(|&(_, &index)| index as usize >= self.vertex_count)
        {
            return Err(GeometryError::IndexOutOfRange {
                position,
                index,
                vertex_count: self.vertex_count,
            });
        }
        if let Some(weight) = &self.weight {
            if weight.vertex_count() != self.vertex_count {
                return Err(GeometryError::WeightVertexCount {
                    expected: self.vertex_count,
                    actual: weight.vertex_count(),
                });
            }
            let listed: usize = weight.bone_counts.iter().map(|&c| c as usize).sum();
            if listed != weight.influences.len() {
                return Err(GeometryError::WeightInfluenceCount {
                    listed,
                    stored: weight.influences.len(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Geometry {
        Geometry::new(
            vec![0.0, 0.0, 10.0, 0.0, 0.0, 10.0],
            vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
            vec![0, 1, 2],
        )
    }

    #[test]
    fn test_valid_triangle() {
        let geometry = triangle();
        assert_eq!(geometry.vertex_count, 3);
        assert_eq!(geometry.validate(), Ok(()));
    }

    #[test]
    fn test_index_out_of_range() {
        let mut geometry = triangle();
        geometry.indices = vec![0, 1, 3];
        assert_eq!(
            geometry.validate(),
            Err(GeometryError::IndexOutOfRange {
                position: 2,
                index: 3,
                vertex_count: 3,
            })
        );
    }

    #[test]
    fn test_uv_length_mismatch() {
        let mut geometry = triangle();
        geometry.uvs.pop();
        assert!(matches!(
            geometry.validate(),
            Err(GeometryError::UvLength { .. })
        ));
    }

    #[test]
    fn test_weight_table_shape() {
        let influence = |bone| BoneInfluence {
            bone,
            weight: 1.0,
            x: 0.0,
            y: 0.0,
        };
        let table = WeightTable::from_vertices(vec![
            vec![influence(0)],
            vec![influence(0), influence(1)],
            vec![influence(1)],
        ]);
        assert_eq!(table.bone_counts, vec![1, 2, 1]);

        let spans: Vec<usize> = table.iter().map(|(_, inf)| inf.len()).collect();
        assert_eq!(spans, vec![1, 2, 1]);

        let geometry = triangle().with_weight(table.clone());
        assert_eq!(geometry.validate(), Ok(()));

        let mut short = table;
        short.bone_counts.pop();
        let geometry = triangle().with_weight(short);
        assert!(matches!(
            geometry.validate(),
            Err(GeometryError::WeightVertexCount { .. })
        ));
    }
}
