//! Typed reads from `<source>` arrays.
//!
//! A [`SourceReader`] binds one source to a semantic by resolving its
//! accessor params against a list of accepted name chains. Reads are fully
//! bounds checked and return `None` for sentinel indices, short arrays, and
//! accessors that lie about their count.

use glam::Mat4;
use smallvec::SmallVec;

use crate::dom::Source;

// Accepted accessor param layouts per semantic. Earlier chains win; a chain
// matches only if every name in it is present.
pub const PARAMS_POSITION: &[&[&str]] = &[&["X", "Y", "Z"]];
pub const PARAMS_NORMAL: &[&[&str]] = &[&["X", "Y", "Z"]];
pub const PARAMS_COLOR: &[&[&str]] = &[&["R", "G", "B", "A"], &["R", "G", "B"]];
pub const PARAMS_UV: &[&[&str]] = &[&["S", "T"], &["U", "V"], &["X", "Y"]];
pub const PARAMS_JOINT: &[&[&str]] = &[&["JOINT"]];
pub const PARAMS_WEIGHT: &[&[&str]] = &[&["WEIGHT"]];
pub const PARAMS_INV_BIND: &[&[&str]] = &[&["TRANSFORM"]];

/// A source bound to a semantic, with param positions resolved to element
/// offsets inside each stride.
#[derive(Debug, Clone)]
pub struct SourceReader<'a> {
    floats: &'a [f32],
    names: &'a [String],
    count: usize,
    stride: usize,
    offsets: SmallVec<[usize; 4]>,
}

impl<'a> SourceReader<'a> {
    /// Bind `source` using the first param chain that matches completely.
    /// Returns `None` when the source has no accessor or no chain can be
    /// satisfied.
    pub fn new(source: &'a Source, chains: &[&[&str]]) -> Option<Self> {
        let accessor = source.accessor()?;

        let mut offsets = SmallVec::new();
        'chains: for chain in chains {
            offsets.clear();
            for wanted in *chain {
                match accessor
                    .param
                    .iter()
                    .position(|p| p.name.as_deref() == Some(*wanted))
                {
                    Some(pos) => offsets.push(pos),
                    None => continue 'chains,
                }
            }

            let floats = source.floats();
            let names = source.names();
            let stride = (accessor.stride as usize).max(1);
            let available = if floats.is_empty() { names.len() } else { floats.len() };
            let count = (accessor.count as usize).min(available / stride);
            return Some(Self { floats, names, count, stride, offsets });
        }
        None
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    fn base(&self, index: i32) -> Option<usize> {
        if index < 0 || index as usize >= self.count {
            return None;
        }
        Some(index as usize * self.stride)
    }

    pub fn read_f32(&self, index: i32) -> Option<f32> {
        let base = self.base(index)?;
        self.floats.get(base + *self.offsets.first()?).copied()
    }

    pub fn read_vec2(&self, index: i32) -> Option<[f32; 2]> {
        let base = self.base(index)?;
        if self.offsets.len() < 2 {
            return None;
        }
        Some([
            *self.floats.get(base + self.offsets[0])?,
            *self.floats.get(base + self.offsets[1])?,
        ])
    }

    pub fn read_vec3(&self, index: i32) -> Option<[f32; 3]> {
        let base = self.base(index)?;
        if self.offsets.len() < 3 {
            return None;
        }
        Some([
            *self.floats.get(base + self.offsets[0])?,
            *self.floats.get(base + self.offsets[1])?,
            *self.floats.get(base + self.offsets[2])?,
        ])
    }

    /// Read an RGBA color. Three-component sources get an opaque alpha.
    pub fn read_color(&self, index: i32) -> Option<[f32; 4]> {
        let base = self.base(index)?;
        let rgb = [
            *self.floats.get(base + *self.offsets.first()?)?,
            *self.floats.get(base + *self.offsets.get(1)?)?,
            *self.floats.get(base + *self.offsets.get(2)?)?,
        ];
        let a = match self.offsets.get(3) {
            Some(off) => *self.floats.get(base + off)?,
            None => 1.0,
        };
        Some([rgb[0], rgb[1], rgb[2], a])
    }

    pub fn read_name(&self, index: i32) -> Option<&'a str> {
        let base = self.base(index)?;
        self.names
            .get(base + *self.offsets.first()?)
            .map(String::as_str)
    }

    /// Read a 4x4 matrix, converting from the document's row-major layout.
    pub fn read_mat4(&self, index: i32) -> Option<Mat4> {
        let start = self.base(index)? + *self.offsets.first()?;
        let slice = self.floats.get(start..start + 16)?;
        let mut arr = [0.0f32; 16];
        arr.copy_from_slice(slice);
        Some(Mat4::from_cols_array(&arr).transpose())
    }
}
