//! Fresh id allocation for merged output.

use crate::coco::{AnnotationId, ImageId, LicenseId};

/// Strictly increasing counter for one id space. Never hands out an id twice.
#[derive(Clone, Copy, Debug)]
struct IdCounter {
    next: u64,
}

impl IdCounter {
    fn starting_at(first: u64) -> Self {
        Self { next: first }
    }

    fn take(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }
}

/// Per-kind id counters threaded through a single merge call.
///
/// Every merge owns its allocator, so concurrent or repeated merges never
/// share numbering state. Ids skipped by dropped entities are not reused.
#[derive(Clone, Debug)]
pub struct IdAllocator {
    images: IdCounter,
    annotations: IdCounter,
    licenses: IdCounter,
}

impl IdAllocator {
    /// All counters start at 1, the COCO convention.
    pub fn new() -> Self {
        Self {
            images: IdCounter::starting_at(1),
            annotations: IdCounter::starting_at(1),
            licenses: IdCounter::starting_at(1),
        }
    }

    pub fn next_image(&mut self) -> ImageId {
        ImageId::new(self.images.take())
    }

    pub fn next_annotation(&mut self) -> AnnotationId {
        AnnotationId::new(self.annotations.take())
    }

    pub fn next_license(&mut self) -> LicenseId {
        LicenseId::new(self.licenses.take())
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}
