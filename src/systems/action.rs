//! Discrete operating points shared by all simulated DER systems.

/// A single discrete operating point of a DER system.
///
/// Sign convention follows the feeder view: positive power is consumption,
/// negative power is generation/release.
#[derive(Debug, Clone)]
pub struct Action {
    /// Index of this action within its owning [`ActionSet`].
    pub idx: usize,
    /// Electric power in kilowatts (positive = consuming).
    pub el_power_kw: f32,
    /// Thermal power in kilowatts (positive = consuming, negative = releasing heat).
    pub th_power_kw: f32,
    /// Minimum number of steps the system must stay in this operating point.
    pub min_staying_steps: usize,
    /// Maximum number of steps the system may stay in this operating point.
    pub max_staying_steps: usize,
    /// Human-readable name used in step records and reports.
    pub name: String,
}

impl Action {
    /// Creates an action with no staying-time restrictions.
    pub fn new(idx: usize, el_power_kw: f32, th_power_kw: f32, name: impl Into<String>) -> Self {
        Self {
            idx,
            el_power_kw,
            th_power_kw,
            min_staying_steps: 0,
            max_staying_steps: usize::MAX,
            name: name.into(),
        }
    }

    /// Sets the staying-time window for mode-based systems (e.g. a CHP plant).
    pub fn with_staying(mut self, min_steps: usize, max_steps: usize) -> Self {
        self.min_staying_steps = min_steps;
        self.max_staying_steps = max_steps;
        self
    }
}

/// An ordered collection of actions with unique, dense indices.
#[derive(Debug, Clone, Default)]
pub struct ActionSet {
    actions: Vec<Action>,
}

impl ActionSet {
    /// Creates an empty action set.
    pub fn new() -> Self {
        Self {
            actions: Vec::new(),
        }
    }

    /// Adds an action.
    ///
    /// # Panics
    ///
    /// Panics if the action index does not equal the current length, i.e.
    /// actions must be registered densely and in order.
    pub fn add(&mut self, action: Action) {
        assert_eq!(
            action.idx,
            self.actions.len(),
            "action indices must be dense and in order"
        );
        self.actions.push(action);
    }

    /// Returns the action at `idx`.
    pub fn get(&self, idx: usize) -> &Action {
        &self.actions[idx]
    }

    /// Number of actions in the set.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Returns `true` when the set contains no actions.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Iterates over all actions in index order.
    pub fn iter(&self) -> impl Iterator<Item = &Action> {
        self.actions.iter()
    }
}
