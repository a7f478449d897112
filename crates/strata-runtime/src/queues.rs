use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};

use hashbrown::HashSet;
use strata_mesh_cpu::ChunkMesh;
use strata_world::ChunkCoord;

use crate::lock;

struct QueueState {
    update: VecDeque<ChunkCoord>,
    queued: HashSet<ChunkCoord>,
    draw: VecDeque<ChunkMesh>,
    jobs: usize,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct QueueStats {
    pub update: usize,
    pub draw: usize,
    pub jobs: usize,
}

/// Update queue (chunks waiting for a mesh build) and draw queue (built meshes
/// waiting for the renderer), behind one lock. Also counts outstanding worker jobs
/// so callers can wait for the pipeline to go idle.
pub(crate) struct WorkQueues {
    state: Mutex<QueueState>,
    idle: Condvar,
}

impl WorkQueues {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                update: VecDeque::new(),
                queued: HashSet::new(),
                draw: VecDeque::new(),
                jobs: 0,
            }),
            idle: Condvar::new(),
        }
    }

    /// Queues `c` for a rebuild. Priority entries go to the front.
    /// Returns true when `c` was not queued before, i.e. one more worker pass is needed.
    pub fn push_update(&self, c: ChunkCoord, priority: bool) -> bool {
        let mut s = lock(&self.state);
        if !s.queued.insert(c) {
            if priority {
                if let Some(i) = s.update.iter().position(|q| *q == c) {
                    s.update.remove(i);
                }
                s.update.push_front(c);
            }
            return false;
        }
        if priority {
            s.update.push_front(c);
        } else {
            s.update.push_back(c);
        }
        true
    }

    pub fn pop_update(&self) -> Option<ChunkCoord> {
        let mut s = lock(&self.state);
        let c = s.update.pop_front()?;
        s.queued.remove(&c);
        Some(c)
    }

    /// A newer mesh replaces one for the same chunk that was never drained.
    pub fn push_draw(&self, mesh: ChunkMesh) {
        let mut s = lock(&self.state);
        s.draw.retain(|m| m.coord != mesh.coord);
        s.draw.push_back(mesh);
    }

    pub fn pop_draw(&self) -> Option<ChunkMesh> {
        lock(&self.state).draw.pop_front()
    }

    pub fn job_started(&self) {
        lock(&self.state).jobs += 1;
    }

    pub fn job_finished(&self) {
        let mut s = lock(&self.state);
        s.jobs = s.jobs.saturating_sub(1);
        if s.jobs == 0 {
            self.idle.notify_all();
        }
    }

    /// Blocks until no worker job is queued or running.
    pub fn wait_idle(&self) {
        let mut s = lock(&self.state);
        while s.jobs > 0 {
            s = self
                .idle
                .wait(s)
                .unwrap_or_else(std::sync::PoisonError::into_inner);
        }
    }

    pub fn stats(&self) -> QueueStats {
        let s = lock(&self.state);
        QueueStats {
            update: s.update.len(),
            draw: s.draw.len(),
            jobs: s.jobs,
        }
    }
}
