//! Peak heap accounting for measured phases.
//!
//! Binaries that want heap figures install [`TrackingAllocator`] as their
//! global allocator; without it every peak reads as zero.

use std::alloc::{GlobalAlloc, Layout};
use std::sync::atomic::{AtomicUsize, Ordering};

static LIVE_BYTES: AtomicUsize = AtomicUsize::new(0);
static PEAK_BYTES: AtomicUsize = AtomicUsize::new(0);
static BASELINE: AtomicUsize = AtomicUsize::new(0);

pub struct TrackingAllocator<A: GlobalAlloc + Sync + 'static> {
    inner: &'static A,
}

impl<A: GlobalAlloc + Sync + 'static> TrackingAllocator<A> {
    pub const fn new(inner: &'static A) -> Self {
        Self { inner }
    }
}

unsafe impl<A: GlobalAlloc + Sync + 'static> GlobalAlloc
    for TrackingAllocator<A>
{
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = unsafe { self.inner.alloc(layout) };
        if !ptr.is_null() {
            record_alloc(layout.size());
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        unsafe { self.inner.dealloc(ptr, layout) };
        LIVE_BYTES.fetch_sub(layout.size(), Ordering::SeqCst);
    }
}

fn record_alloc(size: usize) {
    let live = LIVE_BYTES.fetch_add(size, Ordering::SeqCst) + size;
    let above_baseline = live.saturating_sub(BASELINE.load(Ordering::SeqCst));
    let mut peak = PEAK_BYTES.load(Ordering::SeqCst);

    while above_baseline > peak {
        match PEAK_BYTES.compare_exchange_weak(
            peak,
            above_baseline,
            Ordering::SeqCst,
            Ordering::SeqCst,
        ) {
            Ok(_) => break,
            Err(observed) => peak = observed,
        }
    }
}

/// Starts a new measurement window at the current live heap size.
pub fn reset_peak() {
    BASELINE.store(LIVE_BYTES.load(Ordering::SeqCst), Ordering::SeqCst);
    PEAK_BYTES.store(0, Ordering::SeqCst);
}

/// Highest heap usage above the baseline since the last [`reset_peak`].
pub fn peak_bytes() -> usize {
    PEAK_BYTES.load(Ordering::SeqCst)
}

/// Whether a [`TrackingAllocator`] is installed. Any running program holds
/// some heap, so live bytes stay at zero only when nothing is tracked.
pub fn is_tracking() -> bool {
    LIVE_BYTES.load(Ordering::SeqCst) > 0
}

#[cfg(test)]
mod tests {
    use super::{is_tracking, peak_bytes, reset_peak};

    // The test binary runs on the system allocator.
    #[test]
    fn untracked_programs_report_no_heap() {
        reset_peak();
        let buffer = vec![0_u8; 4096];
        assert_eq!(buffer.len(), 4096);
        assert!(!is_tracking());
        assert_eq!(peak_bytes(), 0);
    }
}

