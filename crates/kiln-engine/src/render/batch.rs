//! Batch bookkeeping: items, Z buckets, and merging into draw runs.

use super::vertex::PrimitiveType;
use crate::api::{PrimitiveMode, ProgramId, TextureId};

/// A closed run of staged vertices sharing texture, program and Z.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BatchItem {
    pub primitive: PrimitiveType,
    pub texture: TextureId,
    pub program: ProgramId,
    pub z: f32,
    pub first: u32,
    pub count: u32,
}

impl BatchItem {
    /// Items that can share one draw call when adjacent.
    fn merges_with(&self, other: &BatchItem) -> bool {
        self.texture == other.texture
            && self.program == other.program
            && self.z == other.z
            && self.primitive.draw_mode() == other.primitive.draw_mode()
    }
}

/// Z bucket, drawn in declaration order.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RenderBucket {
    Negative,
    Neutral,
    Positive,
}

impl RenderBucket {
    pub const ORDER: [RenderBucket; 3] = [RenderBucket::Negative, RenderBucket::Neutral, RenderBucket::Positive];

    /// NaN and `-0.0` land in `Neutral`.
    pub fn for_z(z: f32) -> Self {
        if z < 0.0 {
            RenderBucket::Negative
        } else if z > 0.0 {
            RenderBucket::Positive
        } else {
            RenderBucket::Neutral
        }
    }

    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

/// One indexed draw call.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DrawRun {
    pub texture: TextureId,
    pub program: ProgramId,
    pub mode: PrimitiveMode,
    /// First index in the frame's index stream.
    pub start: u32,
    pub count: u32,
}

#[derive(Debug, Default)]
pub struct Buckets {
    items: [Vec<BatchItem>; 3],
}

impl Buckets {
    pub fn push(&mut self, item: BatchItem) {
        self.items[RenderBucket::for_z(item.z).index()].push(item);
    }

    pub fn bucket(&self, bucket: RenderBucket) -> &[BatchItem] {
        &self.items[bucket.index()]
    }

    pub fn len(&self) -> usize {
        self.items.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.iter().all(Vec::is_empty)
    }

    pub fn clear(&mut self) {
        self.items.iter_mut().for_each(Vec::clear);
    }

    /// Stable-sorts the signed buckets by ascending Z; `Neutral` keeps
    /// submission order.
    pub fn sort(&mut self) {
        for bucket in [RenderBucket::Negative, RenderBucket::Positive] {
            self.items[bucket.index()].sort_by(|a, b| a.z.total_cmp(&b.z));
        }
    }

    /// Items in draw order. Call [`sort`](Self::sort) first.
    pub fn iter(&self) -> impl Iterator<Item = &BatchItem> {
        RenderBucket::ORDER.into_iter().flat_map(|b| self.bucket(b).iter())
    }

    /// Expands every item into `indices` and merges adjacent compatible
    /// items into runs.
    pub fn build_runs(&self, indices: &mut Vec<u32>, runs: &mut Vec<DrawRun>) {
        let mut prev: Option<&BatchItem> = None;
        for item in self.iter() {
            let start = indices.len() as u32;
            item.primitive.emit_indices(item.first, item.count, indices);
            let count = indices.len() as u32 - start;
            if count == 0 {
                continue;
            }

            match runs.last_mut() {
                Some(run) if prev.is_some_and(|p| p.merges_with(item)) => run.count += count,
                _ => runs.push(DrawRun {
                    texture: item.texture,
                    program: item.program,
                    mode: item.primitive.draw_mode(),
                    start,
                    count,
                }),
            }
            prev = Some(item);
        }
    }
}
