use crate::galaxy::Scenario;

/// A top-level level: its zone list and scenarios.
///
/// The zone set is fixed once loaded. The first zone name is the main zone
/// every scenario resolves from.
#[derive(Debug, Clone, PartialEq)]
pub struct Galaxy {
    pub name: String,
    pub zone_names: Vec<String>,
    pub scenarios: Vec<Scenario>,
}

impl Galaxy {
    #[must_use]
    pub fn new(name: &str, zone_names: Vec<String>, scenarios: Vec<Scenario>) -> Self {
        Self {
            name: name.to_string(),
            zone_names,
            scenarios,
        }
    }

    #[must_use]
    pub fn main_zone(&self) -> Option<&str> {
        self.zone_names.first().map(String::as_str)
    }

    #[must_use]
    pub fn scenario(&self, index: usize) -> Option<&Scenario> {
        self.scenarios.get(index)
    }

    pub fn scenario_mut(&mut self, index: usize) -> Option<&mut Scenario> {
        self.scenarios.get_mut(index)
    }
}
