use crate::graph::FlowDocument;

pub const DEFAULT_MAX_RECORDS: usize = 100;

/// Snapshot history of the edited document.
///
/// `history[current_index]` is always the state currently shown.
#[derive(Clone, Debug)]
pub struct UndoStack {
    pub history: Vec<FlowDocument>,
    pub current_index: usize,
    pub max_records: usize,
    /// Key of the last merged push; a push with the same key replaces the top.
    merge_key: Option<String>,
}

impl Default for UndoStack {
    fn default() -> Self {
        Self {
            history: Vec::new(),
            current_index: 0,
            max_records: DEFAULT_MAX_RECORDS,
            merge_key: None,
        }
    }
}

impl UndoStack {
    pub fn new(initial: &FlowDocument, max_records: usize) -> Self {
        let mut stack = Self {
            max_records: max_records.max(1),
            ..Self::default()
        };
        stack.push(initial);
        stack
    }

    pub fn push(&mut self, document: &FlowDocument) {
        self.merge_key = None;
        self.push_snapshot(document);
    }

    /// Push, folding consecutive pushes with the same `key` into one record.
    /// Typing uses the node id as key so a run of keystrokes is one undo step.
    pub fn push_merged(&mut self, document: &FlowDocument, key: &str) {
        let at_top = self.current_index + 1 == self.history.len();
        if at_top && self.current_index > 0 && self.merge_key.as_deref() == Some(key) {
            self.history[self.current_index] = document.clone();
            return;
        }
        self.push_snapshot(document);
        self.merge_key = Some(key.to_string());
    }

    fn push_snapshot(&mut self, document: &FlowDocument) {
        // If we are not at the end, truncate future
        if self.current_index + 1 < self.history.len() {
            self.history.truncate(self.current_index + 1);
        }

        self.history.push(document.clone());
        self.current_index = self.history.len() - 1;

        if self.history.len() > self.max_records {
            self.history.remove(0);
            self.current_index = self.current_index.saturating_sub(1);
        }
    }

    pub fn undo(&mut self) -> Option<FlowDocument> {
        self.merge_key = None;
        if self.can_undo() {
            self.current_index -= 1;
            self.history.get(self.current_index).cloned()
        } else {
            None
        }
    }

    pub fn redo(&mut self) -> Option<FlowDocument> {
        self.merge_key = None;
        if self.can_redo() {
            self.current_index += 1;
            self.history.get(self.current_index).cloned()
        } else {
            None
        }
    }

    pub fn can_undo(&self) -> bool {
        self.current_index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.current_index + 1 < self.history.len()
    }
}
