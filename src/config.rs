/// Tunables for the lifecycle engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineConfig {
    /// When set, assigning a bid replaces the job budget with the bid amount.
    pub overwrite_budget_on_assign: bool,
}

impl EngineConfig {
    pub fn with_budget_overwrite(mut self, enabled: bool) -> Self {
        self.overwrite_budget_on_assign = enabled;
        self
    }
}
