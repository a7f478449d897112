//! World index, chunk streaming, edit entry point, and worker orchestration.
#![forbid(unsafe_code)]

mod behaviour;
mod config;
mod field;
mod index;
mod queues;
mod tick;

pub use behaviour::{BehaviourSet, BlockBehaviour, VoxelView};
pub use config::EngineConfig;
pub use index::{ChunkHandle, ChunkState, IndexStats, WorldIndex};
pub use queues::QueueStats;
pub use tick::TickLoop;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use hashbrown::HashSet;
use rayon::{ThreadPool, ThreadPoolBuilder};
use strata_blocks::{BlockId, BlockRegistry, Face, Orientation};
use strata_chunk::{ChunkData, NeighborBorders, VoxelState, generate_chunk};
use strata_edit::{PendingEdits, PendingStats, affected_chunks};
use strata_geom::Vec3;
use strata_io::{ChunkRecord, IoWorker, PersistError, WorldStore};
use strata_lighting::{light_new_chunk, relight_after_edit};
use strata_mesh_cpu::{ChunkMesh, build_chunk_mesh};
use strata_world::{ChunkCoord, TerrainGenerator, VoxelMod, VoxelPos, World};

use crate::field::LockedField;
use crate::queues::WorkQueues;

pub(crate) fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn read<T>(l: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    l.read().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn write<T>(l: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    l.write().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
    #[error("I/O worker: {0}")]
    Io(#[from] std::io::Error),
    #[error("saved world layout {store:?} does not match generator layout {generator:?}")]
    LayoutMismatch { store: World, generator: World },
    #[error("invalid world layout: {0}")]
    InvalidLayout(String),
}

/// What [`Runtime::edit_voxel`] did with a request.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EditResult {
    Applied,
    /// The voxel already holds that id; nothing was recomputed.
    Unchanged,
    /// The chunk is not populated yet; the edit replays when it is.
    Deferred,
    /// Outside the world, or an unknown block id.
    Rejected,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RuntimeStats {
    pub chunks: IndexStats,
    pub queues: QueueStats,
    pub pending: PendingStats,
    pub generated: u64,
    pub loaded_from_disk: u64,
    pub load_failures: u64,
    pub meshes_built: u64,
    pub edits_applied: u64,
    pub saves_submitted: u64,
    pub save_failures: u64,
}

#[derive(Default)]
struct Counters {
    generated: AtomicU64,
    loaded_from_disk: AtomicU64,
    load_failures: AtomicU64,
    meshes_built: AtomicU64,
    edits_applied: AtomicU64,
    saves_submitted: AtomicU64,
    save_failures: AtomicU64,
}

impl Counters {
    #[inline]
    fn bump(counter: &AtomicU64, n: u64) {
        counter.fetch_add(n, Ordering::Relaxed);
    }
}

struct Shared {
    config: EngineConfig,
    world: World,
    reg: Arc<BlockRegistry>,
    generator: Arc<TerrainGenerator>,
    store: Option<Arc<WorldStore>>,
    io: Option<IoWorker>,
    behaviours: BehaviourSet,
    index: WorldIndex,
    pending: Mutex<PendingEdits>,
    // Held for every light update. Its holder is the only thread that locks
    // several chunks at once.
    light_lock: Mutex<()>,
    queues: WorkQueues,
    pool: ThreadPool,
    player_chunk: Mutex<Option<ChunkCoord>>,
    counters: Counters,
}

/// Handle to the running engine. Cheap to clone; every clone drives the same world.
#[derive(Clone)]
pub struct Runtime {
    shared: Arc<Shared>,
}

impl Runtime {
    pub fn new(
        config: EngineConfig,
        reg: Arc<BlockRegistry>,
        generator: Arc<TerrainGenerator>,
        store: Option<Arc<WorldStore>>,
        behaviours: BehaviourSet,
    ) -> Result<Self, RuntimeError> {
        let world = *generator.world();
        world.validate().map_err(RuntimeError::InvalidLayout)?;
        if let Some(store) = &store {
            if store.world() != world {
                return Err(RuntimeError::LayoutMismatch {
                    store: store.world(),
                    generator: world,
                });
            }
        }
        let workers = config.effective_workers();
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("strata-worker-{i}"))
            .build()?;
        let io = match &store {
            Some(s) => Some(IoWorker::spawn(Arc::clone(s))?),
            None => None,
        };
        log::info!(
            "runtime: {} workers, view distance {}, load distance {}, {} behaviours",
            workers,
            config.view_distance,
            config.effective_load_distance(),
            behaviours.len()
        );
        Ok(Self {
            shared: Arc::new(Shared {
                config,
                world,
                reg,
                generator,
                store,
                io,
                behaviours,
                index: WorldIndex::new(),
                pending: Mutex::new(PendingEdits::new(world)),
                light_lock: Mutex::new(()),
                queues: WorkQueues::new(),
                pool,
                player_chunk: Mutex::new(None),
                counters: Counters::default(),
            }),
        })
    }

    #[inline]
    pub fn world(&self) -> World {
        self.shared.world
    }

    #[inline]
    pub fn registry(&self) -> &BlockRegistry {
        &self.shared.reg
    }

    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.shared.config
    }

    pub fn chunk_state(&self, c: ChunkCoord) -> Option<ChunkState> {
        self.shared.index.state(c)
    }

    /// `None` when `p` is outside the world or its chunk is not populated.
    pub fn get_voxel(&self, p: VoxelPos) -> Option<VoxelState> {
        let (c, x, y, z) = self.shared.world.split(p)?;
        let handle = self.shared.index.handle(c)?;
        let v = read(&handle).get_local(x, y, z);
        Some(v)
    }

    /// Collision query. Unloaded space is not solid.
    pub fn check_solid(&self, p: VoxelPos) -> bool {
        self.get_voxel(p)
            .is_some_and(|v| self.shared.reg.is_solid(v.id))
    }

    /// The chunk's voxels once populated. With `create`, an unloaded chunk starts
    /// loading in the background and a later call returns it.
    pub fn request_chunk(&self, c: ChunkCoord, create: bool) -> Option<ChunkHandle> {
        let s = &*self.shared;
        if !s.world.chunk_in_world(c) {
            return None;
        }
        if let Some(h) = s.index.handle(c) {
            return Some(h);
        }
        if create && s.index.begin_loading(c) {
            self.start_load(c);
        }
        None
    }

    /// Player-initiated placement or removal.
    ///
    /// The edit is applied and relit before any mesh rebuild is queued. Rebuilds for
    /// the edited chunk and any seam neighbours jump ahead of streaming work.
    pub fn edit_voxel(&self, p: VoxelPos, id: BlockId, orientation: Orientation) -> EditResult {
        let s = &*self.shared;
        if s.reg.get(id).is_none() {
            log::warn!("edit at {:?}: unknown block id {}", p, id);
            return EditResult::Rejected;
        }
        let (result, rebuild) = {
            let _light = lock(&s.light_lock);
            self.edit_locked(VoxelMod {
                pos: p,
                id,
                orientation,
            })
        };
        // Reversed so the edited chunk ends up at the very front.
        for c in rebuild.iter().rev() {
            self.queue_mesh(*c, true);
        }
        match result {
            EditResult::Applied => {
                log::debug!(target: "events", "edit ({}, {}, {}) -> block {}", p.x, p.y, p.z, id)
            }
            EditResult::Deferred => {
                log::debug!(target: "events", "edit ({}, {}, {}) deferred until its chunk loads", p.x, p.y, p.z)
            }
            EditResult::Unchanged | EditResult::Rejected => {}
        }
        result
    }

    /// Recomputes the view window when the player has crossed into another chunk.
    /// Returns false when the player is still in the same chunk.
    pub fn update_player_position(&self, pos: Vec3) -> bool {
        let s = &*self.shared;
        let center = s.world.chunk_of(VoxelPos::from_vec3(pos));
        {
            let mut last = lock(&s.player_chunk);
            if *last == Some(center) {
                return false;
            }
            *last = Some(center);
        }
        self.recenter(center);
        true
    }

    /// One built mesh, oldest first. Meant for the thread that owns rendering.
    pub fn drain_ready_mesh(&self) -> Option<ChunkMesh> {
        self.shared.queues.pop_draw()
    }

    /// Runs the behaviour of every active voxel in `c` once.
    /// Returns how many of the requested edits were applied.
    pub fn tick_active_voxels(&self, c: ChunkCoord) -> usize {
        let s = &*self.shared;
        let Some(handle) = s.index.handle(c) else {
            return 0;
        };
        let active: Vec<VoxelPos> = {
            let chunk = read(&handle);
            chunk
                .active_voxels()
                .into_iter()
                .map(|(x, y, z)| chunk.global_of(x, y, z))
                .collect()
        };
        let mut requests = Vec::new();
        for p in active {
            let Some(v) = self.get_voxel(p) else {
                continue;
            };
            match s.behaviours.get(v.id) {
                Some(b) if s.reg.is_active(v.id) && b.is_active(self, p) => {
                    requests.extend(b.behave(self, p));
                }
                _ => {
                    if let Some((_, x, y, z)) = s.world.split(p) {
                        write(&handle).set_active(x, y, z, false);
                    }
                }
            }
        }
        requests
            .into_iter()
            .filter(|m| self.edit_voxel(m.pos, m.id, m.orientation) == EditResult::Applied)
            .count()
    }

    /// Ticks every active chunk.
    pub fn tick_all(&self) -> usize {
        self.shared
            .index
            .coords_in(ChunkState::Active)
            .into_iter()
            .map(|c| self.tick_active_voxels(c))
            .sum()
    }

    /// Writes the world record and hands every dirty chunk to the I/O worker.
    /// Returns the number of chunks submitted. Without a store this does nothing.
    pub fn save(&self) -> Result<usize, PersistError> {
        let s = &*self.shared;
        let (Some(store), Some(io)) = (&s.store, &s.io) else {
            return Ok(0);
        };
        self.requeue_failed_saves();
        store.save_world()?;
        let mut handles: Vec<_> = s.index.handles().into_iter().collect();
        handles.sort_by_key(|(c, _)| *c);
        let mut submitted = 0usize;
        for (c, handle) in handles {
            let record = {
                let mut chunk = write(&handle);
                if !chunk.is_dirty() {
                    continue;
                }
                chunk.clear_dirty();
                ChunkRecord::from_chunk(&chunk)
            };
            if io.submit(record) {
                submitted += 1;
            } else {
                write(&handle).mark_dirty();
                log::warn!(target: "events", "I/O worker gone; chunk ({}, {}) stays dirty", c.cx, c.cz);
            }
        }
        Counters::bump(&s.counters.saves_submitted, submitted as u64);
        log::info!(target: "events", "saving world '{}': {} dirty chunks", store.record().name, submitted);
        Ok(submitted)
    }

    /// Blocks until no load or mesh job is queued or running and every submitted
    /// save has been written.
    pub fn flush(&self) {
        let s = &*self.shared;
        s.queues.wait_idle();
        if let Some(io) = &s.io {
            io.flush();
        }
        self.requeue_failed_saves();
    }

    pub fn stats(&self) -> RuntimeStats {
        let s = &*self.shared;
        let c = &s.counters;
        RuntimeStats {
            chunks: s.index.stats(),
            queues: s.queues.stats(),
            pending: lock(&s.pending).stats(),
            generated: c.generated.load(Ordering::Relaxed),
            loaded_from_disk: c.loaded_from_disk.load(Ordering::Relaxed),
            load_failures: c.load_failures.load(Ordering::Relaxed),
            meshes_built: c.meshes_built.load(Ordering::Relaxed),
            edits_applied: c.edits_applied.load(Ordering::Relaxed),
            saves_submitted: c.saves_submitted.load(Ordering::Relaxed),
            save_failures: c.save_failures.load(Ordering::Relaxed),
        }
    }

    fn spawn_job(&self, job: impl FnOnce(&Runtime) + Send + 'static) {
        self.shared.queues.job_started();
        let rt = self.clone();
        self.shared.pool.spawn(move || {
            job(&rt);
            rt.shared.queues.job_finished();
        });
    }

    /// Queues a rebuild for `c` if it is active. Inactive chunks rebuild when reactivated.
    fn queue_mesh(&self, c: ChunkCoord, priority: bool) {
        let s = &*self.shared;
        if s.index.state(c) != Some(ChunkState::Active) {
            return;
        }
        if s.queues.push_update(c, priority) {
            self.spawn_job(|rt| rt.run_mesh_job());
        }
    }

    fn recenter(&self, center: ChunkCoord) {
        let s = &*self.shared;
        let view: HashSet<ChunkCoord> = self
            .window(center, s.config.view_distance)
            .into_iter()
            .collect();
        // The window moves first so chunks finishing population land in the right state.
        let change = s.index.set_view(view);
        let mut load = self.window(center, s.config.effective_load_distance());
        load.sort_by_key(|c| c.distance_sq(center));
        for c in load {
            self.request_chunk(c, true);
        }
        for c in &change.activated {
            self.queue_mesh(*c, false);
        }
        log::debug!(
            target: "events",
            "player in chunk ({}, {}): {} activated, {} deactivated",
            center.cx,
            center.cz,
            change.activated.len(),
            change.deactivated.len()
        );
    }

    /// Square of chunks around `center`, clipped to the world.
    fn window(&self, center: ChunkCoord, radius: i32) -> Vec<ChunkCoord> {
        window_around(&self.shared.world, center, radius)
    }

    fn run_mesh_job(&self) {
        let s = &*self.shared;
        let Some(c) = s.queues.pop_update() else {
            return;
        };
        if s.index.state(c) != Some(ChunkState::Active) {
            return;
        }
        let Some(handle) = s.index.handle(c) else {
            return;
        };
        let (w, h) = (s.world.chunk_width, s.world.chunk_height);
        let borders = NeighborBorders::capture(w, h, w, |side| {
            let (dx, dz) = side.offset();
            let neighbor = s.index.handle(c.offset(dx, dz))?;
            let plane = read(&neighbor).border_plane(side.opposite());
            Some(plane)
        });
        let mesh = {
            let chunk = read(&handle);
            build_chunk_mesh(&chunk, &borders, &s.reg)
        };
        Counters::bump(&s.counters.meshes_built, 1);
        s.queues.push_draw(mesh);
    }

    /// Reads the saved copy on the I/O thread, then finishes on the pool. The
    /// pending read counts as a running job so `flush` waits for it.
    fn start_load(&self, c: ChunkCoord) {
        let s = &*self.shared;
        if let Some(io) = &s.io {
            s.queues.job_started();
            let rt = self.clone();
            let sent = io.load(
                c,
                Box::new(move |loaded| {
                    rt.spawn_job(move |rt| rt.run_load_job(c, loaded));
                    rt.shared.queues.job_finished();
                }),
            );
            if sent {
                return;
            }
            s.queues.job_finished();
            log::warn!(target: "events", "I/O worker gone; chunk ({}, {}) generated without reading", c.cx, c.cz);
        }
        self.spawn_job(move |rt| rt.run_load_job(c, Ok(None)));
    }

    fn run_load_job(&self, c: ChunkCoord, loaded: Result<Option<ChunkData>, PersistError>) {
        let (data, mods) = self.load_or_generate(c, loaded);
        self.integrate_chunk(data, mods);
    }

    /// Saved copy first; a missing or unreadable file falls back to generation.
    fn load_or_generate(
        &self,
        c: ChunkCoord,
        loaded: Result<Option<ChunkData>, PersistError>,
    ) -> (ChunkData, Vec<VoxelMod>) {
        let s = &*self.shared;
        let mut damaged = false;
        match loaded {
            Ok(Some(data)) => {
                Counters::bump(&s.counters.loaded_from_disk, 1);
                log::debug!(target: "events", "chunk ({}, {}) loaded from disk", c.cx, c.cz);
                return (data, Vec::new());
            }
            Ok(None) => {}
            Err(e) => {
                Counters::bump(&s.counters.load_failures, 1);
                log::warn!(target: "events", "chunk ({}, {}) unreadable, regenerating: {}", c.cx, c.cz, e);
                damaged = true;
            }
        }
        let mut generated = generate_chunk(&s.generator, c);
        if damaged {
            // Overwrite the bad file on the next save.
            generated.data.mark_dirty();
        }
        Counters::bump(&s.counters.generated, 1);
        (generated.data, generated.mods)
    }

    /// Publishes a loaded chunk: replays queued edits, lights it against its
    /// neighbours, fills its active set and routes flora that spills over.
    fn integrate_chunk(&self, mut data: ChunkData, mods: Vec<VoxelMod>) {
        let s = &*self.shared;
        let c = data.coord;
        let mut rebuild: HashSet<ChunkCoord> = HashSet::new();
        let state = {
            let _light = lock(&s.light_lock);

            let mut foreign = Vec::new();
            for m in mods {
                match data.local_of(m.pos) {
                    Some((x, y, z)) => data.set_raw(x, y, z, m.id, m.orientation),
                    None => foreign.push(m),
                }
            }
            // Saved so a later session loads it instead of regenerating and
            // stamping the spill over edits made since.
            if !foreign.is_empty() {
                data.mark_dirty();
            }
            // Queued edits go on top of this chunk's own flora.
            let queued = lock(&s.pending).take(c);
            if !queued.is_empty() {
                for m in &queued {
                    if let Some((x, y, z)) = data.local_of(m.pos) {
                        data.set_raw(x, y, z, m.id, m.orientation);
                    }
                }
                data.mark_dirty();
                log::debug!(target: "events", "replayed {} queued edits into chunk ({}, {})", queued.len(), c.cx, c.cz);
            }

            let (handle, state) = s.index.finish_loading(data);
            {
                let handles = s.index.handles();
                let mut field = LockedField::new(s.world, &handles);
                let w = s.world.chunk_width;
                light_new_chunk(&mut field, &s.reg, s.world.chunk_origin(c), w, w);
                rebuild.extend(field.into_touched());
            }
            self.scan_active(&handle);
            for m in foreign {
                let (_, more) = self.edit_locked(m);
                rebuild.extend(more);
            }
            state
        };

        self.queue_mesh(c, false);
        for n in c.neighbors4() {
            self.queue_mesh(n, false);
        }
        let mut rest: Vec<ChunkCoord> = rebuild.into_iter().filter(|t| *t != c).collect();
        rest.sort();
        for t in rest {
            self.queue_mesh(t, false);
        }
        log::info!(target: "events", "chunk ({}, {}) populated, {:?}", c.cx, c.cz, state);
    }

    /// Applies one voxel change. The caller holds the light lock.
    /// Returns the result and the chunks whose meshes it invalidated.
    fn edit_locked(&self, m: VoxelMod) -> (EditResult, Vec<ChunkCoord>) {
        let s = &*self.shared;
        let Some((c, x, y, z)) = s.world.split(m.pos) else {
            return (EditResult::Rejected, Vec::new());
        };
        let Some(handle) = s.index.handle(c) else {
            lock(&s.pending).push(m);
            return (EditResult::Deferred, Vec::new());
        };
        let modified =
            write(&handle).modify(x as i32, y as i32, z as i32, m.id, m.orientation, &s.reg);
        let Some(modified) = modified else {
            return (EditResult::Unchanged, Vec::new());
        };
        let touched = {
            let handles = s.index.handles();
            let mut field = LockedField::new(s.world, &handles);
            relight_after_edit(&mut field, &s.reg, m.pos, modified.old_id);
            field.into_touched()
        };
        self.refresh_active_around(m.pos);
        Counters::bump(&s.counters.edits_applied, 1);

        let mut rebuild = affected_chunks(&s.world, m.pos);
        let mut extra: Vec<ChunkCoord> = touched.into_iter().filter(|t| !rebuild.contains(t)).collect();
        extra.sort();
        rebuild.extend(extra);
        (EditResult::Applied, rebuild)
    }

    fn voxel_is_active(&self, p: VoxelPos, id: BlockId) -> bool {
        let s = &*self.shared;
        s.reg.is_active(id)
            && s.behaviours
                .get(id)
                .is_some_and(|b| b.is_active(self, p))
    }

    /// Re-evaluates active membership for `p` and its six neighbours.
    fn refresh_active_around(&self, p: VoxelPos) {
        let s = &*self.shared;
        let around = Face::ALL.iter().map(|f| p.offset(f.delta()));
        for q in std::iter::once(p).chain(around) {
            let Some((c, x, y, z)) = s.world.split(q) else {
                continue;
            };
            let Some(handle) = s.index.handle(c) else {
                continue;
            };
            let id = read(&handle).get_local(x, y, z).id;
            let active = self.voxel_is_active(q, id);
            write(&handle).set_active(x, y, z, active);
        }
    }

    /// Fills the active set of a freshly populated chunk.
    fn scan_active(&self, handle: &ChunkHandle) {
        let s = &*self.shared;
        if s.behaviours.is_empty() {
            return;
        }
        let candidates: Vec<(usize, usize, usize, VoxelPos, BlockId)> = {
            let chunk = read(handle);
            let mut out = Vec::new();
            for y in 0..chunk.sy {
                for z in 0..chunk.sz {
                    for x in 0..chunk.sx {
                        let id = chunk.get_local(x, y, z).id;
                        if s.reg.is_active(id) && s.behaviours.get(id).is_some() {
                            out.push((x, y, z, chunk.global_of(x, y, z), id));
                        }
                    }
                }
            }
            out
        };
        let live: Vec<(usize, usize, usize)> = candidates
            .into_iter()
            .filter(|&(.., p, id)| self.voxel_is_active(p, id))
            .map(|(x, y, z, ..)| (x, y, z))
            .collect();
        if live.is_empty() {
            return;
        }
        let mut chunk = write(handle);
        for (x, y, z) in live {
            chunk.set_active(x, y, z, true);
        }
    }

    /// Failed background writes put their chunks back on the dirty list.
    fn requeue_failed_saves(&self) {
        let s = &*self.shared;
        let Some(io) = &s.io else {
            return;
        };
        for f in io.drain_failures() {
            Counters::bump(&s.counters.save_failures, 1);
            if let Some(h) = s.index.handle(f.coord) {
                write(&h).mark_dirty();
            }
            log::warn!(
                target: "events",
                "chunk ({}, {}) stays dirty after a failed save: {}",
                f.coord.cx,
                f.coord.cz,
                f.message
            );
        }
    }
}

impl VoxelView for Runtime {
    fn voxel(&self, p: VoxelPos) -> Option<VoxelState> {
        self.get_voxel(p)
    }
}

/// Square of chunks within `radius` of `center`, clipped to the world first so
/// any radius is safe.
fn window_around(world: &World, center: ChunkCoord, radius: i32) -> Vec<ChunkCoord> {
    let r = radius.max(0);
    let last = i32::try_from(world.world_size_chunks)
        .unwrap_or(i32::MAX)
        .saturating_sub(1);
    let (x0, x1) = (center.cx.saturating_sub(r).max(0), center.cx.saturating_add(r).min(last));
    let (z0, z1) = (center.cz.saturating_sub(r).max(0), center.cz.saturating_add(r).min(last));
    let mut out = Vec::new();
    if x0 > x1 || z0 > z1 {
        return out;
    }
    out.reserve(((x1 - x0 + 1) as usize) * ((z1 - z0 + 1) as usize));
    for cz in z0..=z1 {
        for cx in x0..=x1 {
            out.push(ChunkCoord::new(cx, cz));
        }
    }
    out
}
