//! Built-in Component Library
//!
//! The JSON files under `components/` are compiled into the binary so the
//! validator works without any library on disk. The same directory (with
//! its `index.json`) can be served by [`DirectorySource`](super::DirectorySource)
//! or [`HttpSource`](super::HttpSource) and extended without recompiling.

use super::source::StaticSource;

const EMBEDDED_LED: &str = include_str!("../../components/led.json");
const EMBEDDED_RESISTOR: &str = include_str!("../../components/resistor.json");
const EMBEDDED_PUSH_BUTTON: &str = include_str!("../../components/push-button.json");
const EMBEDDED_PICO: &str = include_str!("../../components/raspberry-pi-pico.json");

/// Type name and raw document of every embedded component.
pub const BUILTIN_COMPONENTS: [(&str, &str); 4] = [
    ("led", EMBEDDED_LED),
    ("resistor", EMBEDDED_RESISTOR),
    ("push-button", EMBEDDED_PUSH_BUTTON),
    ("raspberry-pi-pico", EMBEDDED_PICO),
];

/// Source serving the embedded library.
pub fn embedded_source() -> StaticSource {
    BUILTIN_COMPONENTS
        .iter()
        .fold(StaticSource::new("builtin"), |source, (component_type, document)| {
            source.with_component(component_type, *document)
        })
}
