use nix::unistd::Pid;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Running,
    CompletedUnreaped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Job {
    pub pid: Pid,
    pub state: JobState,
}

/// Background jobs in launch order. Occupied entries are always contiguous
/// from index 0; removing one shifts every later job left.
#[derive(Debug)]
pub struct JobTable {
    jobs: Vec<Job>,
    capacity: usize,
}

impl JobTable {
    pub fn new(capacity: usize) -> Self {
        JobTable {
            jobs: Vec::with_capacity(capacity.min(64)),
            capacity,
        }
    }

    /// Starts tracking `pid`. Returns false, tracking nothing, when full.
    pub fn insert(&mut self, pid: Pid) -> bool {
        if self.jobs.len() >= self.capacity {
            debug!("job table full ({}), pid {} not tracked", self.capacity, pid);
            return false;
        }
        self.jobs.push(Job {
            pid,
            state: JobState::Running,
        });
        true
    }

    pub fn mark_completed(&mut self, pid: Pid) -> bool {
        match self.jobs.iter_mut().find(|job| job.pid == pid) {
            Some(job) => {
                job.state = JobState::CompletedUnreaped;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, pid: Pid) -> Option<Job> {
        let index = self.jobs.iter().position(|job| job.pid == pid)?;
        Some(self.jobs.remove(index))
    }

    pub fn contains(&self, pid: Pid) -> bool {
        self.jobs.iter().any(|job| job.pid == pid)
    }

    #[cfg(test)]
    pub fn state(&self, pid: Pid) -> Option<JobState> {
        self.jobs.iter().find(|job| job.pid == pid).map(|job| job.state)
    }

    pub fn pids(&self) -> impl Iterator<Item = Pid> + '_ {
        self.jobs.iter().map(|job| job.pid)
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
