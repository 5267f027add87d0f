// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `CarSegment`: a mapped `"/car<name>"` POSIX shared-memory object plus the
//! spinlock/generation-counter pair that stand in for the process-shared
//! mutex and condvar described in `SPEC_FULL.md` §9. Every accessor below
//! that touches `RawSegment` fields is reachable only through a held
//! `SegmentGuard`, so there is exactly one place (`lock`) where the unsafe
//! dereference of the mapped pointer happens.

use std::num::NonZeroUsize;
use std::os::fd::OwnedFd;
use std::ptr::NonNull;
use std::sync::atomic::Ordering;
use std::time::Duration;

use nix::fcntl::OFlag;
use nix::sys::mman::{mmap, munmap, shm_open, shm_unlink, MapFlags, ProtFlags};
use nix::sys::stat::Mode;
use nix::unistd::ftruncate;

use elevator_proto::Floor;
use elevator_proto::Status;

use crate::error::ShmError;
use crate::layout::{status_from_code, status_to_code, RawSegment, LOCKED, UNLOCKED};

const SPIN_POLL: Duration = Duration::from_micros(200);

/// A mapped car segment. Dropping it unmaps the memory; the backing object
/// itself is only unlinked by whoever created it (mirrors `car.c`, which
/// owns the segment's lifetime, vs. `safety.c`/`internal.c`, which merely
/// attach to it).
pub struct CarSegment {
    ptr: NonNull<RawSegment>,
    _fd: OwnedFd,
    name: String,
    owns_unlink: bool,
}

// SAFETY: the pointee lives in a POSIX shared-memory mapping shared across
// processes, not thread-local memory; every field is an atomic and all
// cross-field invariants are only read/written while `lock_word` is held.
// raw pointer in CarSegment otherwise makes it neither Send nor Sync
#[allow(unsafe_code)]
unsafe impl Send for CarSegment {}
#[allow(unsafe_code)]
unsafe impl Sync for CarSegment {}

fn shm_name(car_name: &str) -> Result<String, ShmError> {
    let name = format!("/car{car_name}");
    if name.len() >= 255 {
        return Err(ShmError::NameTooLong);
    }
    Ok(name)
}

impl CarSegment {
    /// Create the segment if absent, or attach to an existing one. Mirrors
    /// `car.c`'s `init_shared_memory`: try `O_CREAT | O_EXCL` first; if the
    /// object already exists, fall back to opening it for read/write
    /// without re-initializing its contents.
    pub fn create_or_open(car_name: &str, low: Floor, high: Floor) -> Result<Self, ShmError> {
        let name = shm_name(car_name)?;
        let size = std::mem::size_of::<RawSegment>();

        let (fd, created) = match shm_open(
            name.as_str(),
            OFlag::O_CREAT | OFlag::O_EXCL | OFlag::O_RDWR,
            Mode::S_IRUSR | Mode::S_IWUSR,
        ) {
            Ok(fd) => (fd, true),
            Err(nix::errno::Errno::EEXIST) => {
                let fd = shm_open(name.as_str(), OFlag::O_RDWR, Mode::empty())
                    .map_err(|e| ShmError::Open(e.into()))?;
                (fd, false)
            }
            Err(e) => return Err(ShmError::Open(e.into())),
        };

        if created {
            ftruncate(&fd, size as i64).map_err(|e| ShmError::Truncate(e.into()))?;
        }

        let ptr = map_segment(&fd, size)?;

        if created {
            // SAFETY: we just created and sized this mapping; no other
            // process can have attached to it yet.
            // initialize() dereferences a raw pointer into the mapping
            #[allow(unsafe_code)]
            unsafe {
                initialize(ptr.as_ptr(), low, high)
            };
        }

        Ok(Self { ptr, _fd: fd, name, owns_unlink: created })
    }

    /// Attach to an existing segment without creating it. Mirrors
    /// `safety.c`/`internal.c`/`controller.c`, none of which own the
    /// segment's lifecycle.
    pub fn open_existing(car_name: &str) -> Result<Self, ShmError> {
        let name = shm_name(car_name)?;
        let size = std::mem::size_of::<RawSegment>();
        let fd = shm_open(name.as_str(), OFlag::O_RDWR, Mode::empty())
            .map_err(|e| ShmError::Open(e.into()))?;
        let ptr = map_segment(&fd, size)?;
        Ok(Self { ptr, _fd: fd, name, owns_unlink: false })
    }

    // dereferencing the mapped segment pointer requires unsafe
    #[allow(unsafe_code)]
    fn raw(&self) -> &RawSegment {
        // SAFETY: `ptr` stays valid for the lifetime of `self`; the mapping
        // is only torn down in `Drop`.
        unsafe { self.ptr.as_ref() }
    }

    /// Acquire the spinlock, polling at a short fixed interval. There is no
    /// true blocking primitive available across unrelated processes without
    /// `pthread_mutex_t`, so this trades a little CPU for simplicity -- the
    /// poll interval is well under the car's own tick granularity.
    pub async fn lock(&self) -> SegmentGuard<'_> {
        loop {
            if self
                .raw()
                .lock_word
                .compare_exchange(UNLOCKED, LOCKED, Ordering::Acquire, Ordering::Relaxed)
                .is_ok()
            {
                return SegmentGuard { segment: self };
            }
            tokio::time::sleep(SPIN_POLL).await;
        }
    }

    /// Bump the generation counter, waking anyone parked in `wait_until`.
    /// Stands in for `pthread_cond_broadcast`.
    pub async fn signal(&self) {
        let guard = self.lock().await;
        guard.segment.raw().generation.fetch_add(1, Ordering::AcqRel);
    }

    /// Block until the next signal, regardless of what changed. Stands in
    /// for a bare `pthread_cond_wait` with no predicate -- the shape the
    /// safety supervisor uses, since it re-validates the whole segment on
    /// every wake rather than waiting for one specific condition.
    pub async fn wait_for_signal(&self) {
        let seen = self.raw().generation.load(Ordering::Acquire);
        loop {
            tokio::time::sleep(SPIN_POLL).await;
            if self.raw().generation.load(Ordering::Acquire) != seen {
                return;
            }
        }
    }

    /// Poll `predicate` under the lock until it returns `true`, releasing
    /// the lock between attempts so other waiters and the lock holder that
    /// would satisfy the predicate can make progress. Stands in for
    /// `pthread_cond_wait`'s predicate loop.
    pub async fn wait_until(&self, mut predicate: impl FnMut(&SegmentGuard<'_>) -> bool) {
        loop {
            let seen_generation = {
                let guard = self.lock().await;
                if predicate(&guard) {
                    return;
                }
                guard.segment.raw().generation.load(Ordering::Acquire)
            };
            loop {
                tokio::time::sleep(SPIN_POLL).await;
                let current = self.raw().generation.load(Ordering::Acquire);
                if current != seen_generation {
                    break;
                }
            }
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for CarSegment {
    // munmap requires unsafe for the raw mapping teardown
    #[allow(unsafe_code)]
    fn drop(&mut self) {
        let size = std::mem::size_of::<RawSegment>();
        // SAFETY: `ptr` was produced by `mmap` with this exact length and is
        // not used again after this call.
        unsafe {
            let _ = munmap(self.ptr.cast(), size);
        }
        if self.owns_unlink {
            let _ = shm_unlink(self.name.as_str());
        }
    }
}

// mmap requires unsafe for the raw memory mapping
#[allow(unsafe_code)]
fn map_segment(fd: &OwnedFd, size: usize) -> Result<NonNull<RawSegment>, ShmError> {
    let len = NonZeroUsize::new(size).expect("RawSegment is never zero-sized");
    // SAFETY: `fd` is a valid, sized shared-memory descriptor; the mapping
    // is read/write and privately visible only in the sense that writes are
    // shared with every other mapper of the same object, which is the point.
    let ptr = unsafe {
        mmap(
            None,
            len,
            ProtFlags::PROT_READ | ProtFlags::PROT_WRITE,
            MapFlags::MAP_SHARED,
            Some(fd),
            0,
        )
    }
    .map_err(|e| ShmError::Map(e.into()))?;
    Ok(ptr.cast())
}

/// SAFETY: caller guarantees exclusive access to a freshly mapped, correctly
/// sized segment.
// dereferences a raw pointer into the freshly mapped segment
#[allow(unsafe_code)]
unsafe fn initialize(ptr: *mut RawSegment, low: Floor, high: Floor) {
    let raw = &*ptr;
    raw.lock_word.store(UNLOCKED, Ordering::Relaxed);
    raw.generation.store(0, Ordering::Relaxed);
    raw.current_floor.store(low.as_int(), Ordering::Relaxed);
    raw.destination_floor.store(low.as_int(), Ordering::Relaxed);
    raw.status.store(status_to_code(Status::Closed), Ordering::Relaxed);
    raw.open_button.store(false, Ordering::Relaxed);
    raw.close_button.store(false, Ordering::Relaxed);
    raw.door_obstruction.store(false, Ordering::Relaxed);
    raw.overload.store(false, Ordering::Relaxed);
    raw.emergency_stop.store(false, Ordering::Relaxed);
    raw.individual_service_mode.store(false, Ordering::Relaxed);
    raw.emergency_mode.store(false, Ordering::Relaxed);
    raw.safety_system.store(1, Ordering::Relaxed);
    let _ = high; // range is validated by callers; only `low` seeds the initial position.
}

/// A held lock on a [`CarSegment`]. All field access goes through here so
/// that nothing can read or write the segment without holding `lock_word`.
pub struct SegmentGuard<'a> {
    segment: &'a CarSegment,
}

impl SegmentGuard<'_> {
    pub fn current_floor(&self) -> Floor {
        let raw = self.segment.raw().current_floor.load(Ordering::Relaxed);
        Floor::from_int(raw).unwrap_or(Floor::ground())
    }

    pub fn set_current_floor(&self, floor: Floor) {
        self.segment.raw().current_floor.store(floor.as_int(), Ordering::Relaxed);
    }

    pub fn destination_floor(&self) -> Floor {
        let raw = self.segment.raw().destination_floor.load(Ordering::Relaxed);
        Floor::from_int(raw).unwrap_or(Floor::ground())
    }

    pub fn set_destination_floor(&self, floor: Floor) {
        self.segment.raw().destination_floor.store(floor.as_int(), Ordering::Relaxed);
    }

    pub fn status(&self) -> Status {
        let code = self.segment.raw().status.load(Ordering::Relaxed);
        status_from_code(code).unwrap_or(Status::Between)
    }

    pub fn set_status(&self, status: Status) {
        self.segment.raw().status.store(status_to_code(status), Ordering::Relaxed);
    }

    pub fn open_button(&self) -> bool {
        self.segment.raw().open_button.load(Ordering::Relaxed)
    }

    pub fn set_open_button(&self, v: bool) {
        self.segment.raw().open_button.store(v, Ordering::Relaxed);
    }

    pub fn close_button(&self) -> bool {
        self.segment.raw().close_button.load(Ordering::Relaxed)
    }

    pub fn set_close_button(&self, v: bool) {
        self.segment.raw().close_button.store(v, Ordering::Relaxed);
    }

    pub fn door_obstruction(&self) -> bool {
        self.segment.raw().door_obstruction.load(Ordering::Relaxed)
    }

    pub fn set_door_obstruction(&self, v: bool) {
        self.segment.raw().door_obstruction.store(v, Ordering::Relaxed);
    }

    pub fn overload(&self) -> bool {
        self.segment.raw().overload.load(Ordering::Relaxed)
    }

    pub fn set_overload(&self, v: bool) {
        self.segment.raw().overload.store(v, Ordering::Relaxed);
    }

    pub fn emergency_stop(&self) -> bool {
        self.segment.raw().emergency_stop.load(Ordering::Relaxed)
    }

    pub fn set_emergency_stop(&self, v: bool) {
        self.segment.raw().emergency_stop.store(v, Ordering::Relaxed);
    }

    pub fn individual_service_mode(&self) -> bool {
        self.segment.raw().individual_service_mode.load(Ordering::Relaxed)
    }

    pub fn set_individual_service_mode(&self, v: bool) {
        self.segment.raw().individual_service_mode.store(v, Ordering::Relaxed);
    }

    pub fn emergency_mode(&self) -> bool {
        self.segment.raw().emergency_mode.load(Ordering::Relaxed)
    }

    pub fn set_emergency_mode(&self, v: bool) {
        self.segment.raw().emergency_mode.store(v, Ordering::Relaxed);
    }

    /// The heartbeat counter. Only the car increments it (1 -> 2 -> 3,
    /// escalating to emergency at 3); only the safety process resets it to
    /// 1. See `SPEC_FULL.md` §9 for why the direction is asymmetric.
    pub fn safety_system(&self) -> u8 {
        self.segment.raw().safety_system.load(Ordering::Relaxed)
    }

    pub fn set_safety_system(&self, v: u8) {
        self.segment.raw().safety_system.store(v, Ordering::Relaxed);
    }
}

impl Drop for SegmentGuard<'_> {
    fn drop(&mut self) {
        self.segment.raw().lock_word.store(UNLOCKED, Ordering::Release);
    }
}

/// Validate the §3 cross-field invariants against a held guard. Shared by
/// the safety supervisor and by tests so the two never drift apart.
pub fn check_consistency(guard: &SegmentGuard<'_>) -> bool {
    let obstruction_implies_door_moving = !guard.door_obstruction()
        || matches!(guard.status(), Status::Opening | Status::Closing);
    obstruction_implies_door_moving
}
