//! Fuzz target for layout JSON merged over the built-in presets.

#![no_main]

use bf_core::config::{PresetName, WorkbookLayout};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    for preset in PresetName::ALL {
        if let Ok(layout) = WorkbookLayout::from_json_over(&preset.layout(), data) {
            let _ = layout.validate();
        }
    }
});
