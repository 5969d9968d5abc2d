pub mod component_rules;
pub mod electrical;
pub mod references;
pub mod rules;
pub mod structure;
pub mod topology;

// Re-export for convenience
pub use component_rules::ComponentRule;
pub use electrical::ElectricalRule;
pub use references::ReferenceRule;
pub use rules::*;
pub use structure::check_structure;
pub use topology::TopologyRule;
