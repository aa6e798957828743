//! [`CoreWarrior`] tracks one warrior's live processes within a [`super::Core`]:
//! a round-robin list of program-counter addresses and an index saying whose
//! turn is next.

/// One warrior's share of the scheduler: its live process pointers and
/// whose turn is next. A warrior with an empty `processes` list has lost.
#[derive(Clone, Debug)]
pub struct CoreWarrior {
    pub name: String,
    pub color: Option<(u8, u8, u8)>,
    processes: Vec<i32>,
    current_index: usize,
}

impl CoreWarrior {
    pub fn new(name: String) -> Self {
        Self {
            name,
            color: None,
            processes: Vec::new(),
            current_index: 0,
        }
    }

    pub fn is_alive(&self) -> bool {
        !self.processes.is_empty()
    }

    pub fn process_count(&self) -> usize {
        self.processes.len()
    }

    /// The address of the process that is about to execute, if any.
    pub fn current_pointer(&self) -> Option<i32> {
        self.processes.get(self.current_index).copied()
    }

    /// Overwrite the current process's pointer, e.g. after a jump.
    pub fn set_current_pointer(&mut self, address: i32) {
        if let Some(slot) = self.processes.get_mut(self.current_index) {
            *slot = address;
        }
    }

    /// Enqueue a new process (e.g. from `SPL`) immediately behind the
    /// currently-running one, not at the tail of the queue.
    pub fn add_process(&mut self, address: i32) {
        if self.processes.is_empty() {
            self.processes.push(address);
        } else {
            self.processes.insert(self.current_index + 1, address);
        }
    }

    /// Hand the turn to the next process in round-robin order.
    pub fn next_process(&mut self) {
        if !self.processes.is_empty() {
            self.current_index = (self.current_index + 1) % self.processes.len();
        }
    }

    /// Kill the current process. Removing it shifts every later process
    /// back by one slot, which already leaves `current_index` pointing at
    /// what used to be the next process in line; only the case where the
    /// killed process was the last slot needs an explicit wrap to the front.
    pub fn kill_current_process(&mut self) {
        if self.processes.is_empty() {
            return;
        }
        self.processes.remove(self.current_index);
        if self.current_index >= self.processes.len() {
            self.current_index = 0;
        }
    }
}
