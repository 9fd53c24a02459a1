use crate::parameters::ParameterSet;

/// Linear undo/redo history of fitted parameter states
///
/// Navigation only moves the index. Recording a new fit drops every state
/// after the index first.
#[derive(Debug, Clone, Default)]
pub struct FitHistory {
    snapshots: Vec<ParameterSet>,
    index: usize,
}

impl FitHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a fit going from `before` to `after`
    ///
    /// The first fit also records `before` so it can be stepped back to.
    pub fn record(&mut self, before: ParameterSet, after: ParameterSet) {
        if self.snapshots.is_empty() {
            self.snapshots.push(before);
        } else {
            self.snapshots.truncate(self.index + 1);
        }
        self.snapshots.push(after);
        self.index = self.snapshots.len() - 1;
    }

    pub fn step_back(&mut self) -> Option<&ParameterSet> {
        if !self.can_step_back() {
            return None;
        }
        self.index -= 1;
        self.snapshots.get(self.index)
    }

    pub fn step_forward(&mut self) -> Option<&ParameterSet> {
        if !self.can_step_forward() {
            return None;
        }
        self.index += 1;
        self.snapshots.get(self.index)
    }

    pub fn can_step_back(&self) -> bool {
        self.index > 0
    }

    pub fn can_step_forward(&self) -> bool {
        self.index + 1 < self.snapshots.len()
    }

    pub fn current(&self) -> Option<&ParameterSet> {
        self.snapshots.get(self.index)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
        self.index = 0;
    }
}
