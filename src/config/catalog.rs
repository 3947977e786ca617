//! Built-in fixes for the circuit-synth package.
//!
//! Both patches target code shipped inside the installed package and are
//! expressed as exact before/after text. They are applied in the order
//! returned by [`builtin_patches`].

use crate::config::schema::PatchSpec;

/// Importable name of the package the built-in patches target.
pub const PACKAGE: &str = "circuit_synth";

pub const COMPONENT_PIN_KEY_ID: &str = "component-pin-number-key";
pub const LOADER_PIN_PRIORITY_ID: &str = "loader-pin-number-priority";

/// The netlist exporter keyed pins as `pin_id` while consumers read `number`.
const COMPONENT_PIN_KEY_OLD: &str = r#""pin_id": pin_num,"#;
const COMPONENT_PIN_KEY_NEW: &str = r#""number": pin_num,"#;

/// Name-first identification collapses same-named pins (several `GND` pins
/// on one part) into a single net entry.
const LOADER_PIN_PRIORITY_OLD: &str = r#"            # Enhanced pin identification - store the most specific identifier available
            pin_identifier = None

            # First check if name is available (most specific)
            if "name" in pin_data and pin_data["name"] != "~":
                pin_identifier = pin_data["name"]
                logger.debug(
                    f"Using pin name '{pin_identifier}' for {comp_ref} in net {net_name}"
                )
            # Then check for number
            elif "number" in pin_data:
                pin_identifier = str(pin_data["number"])
                logger.debug(
                    f"Using pin number '{pin_identifier}' for {comp_ref} in net {net_name}"
                )"#;

const LOADER_PIN_PRIORITY_NEW: &str = r#"            # Enhanced pin identification - prioritize number for uniqueness
            pin_identifier = None

            # First check for number (most unique/specific)
            if "number" in pin_data:
                pin_identifier = str(pin_data["number"])
                logger.debug(
                    f"Using pin number '{pin_identifier}' for {comp_ref} in net {net_name}"
                )
            # Then check if name is available
            elif "name" in pin_data and pin_data["name"] != "~":
                pin_identifier = pin_data["name"]
                logger.debug(
                    f"Using pin name '{pin_identifier}' for {comp_ref} in net {net_name}"
                )"#;

/// The fixed, ordered list of patches this tool applies.
pub fn builtin_patches() -> Vec<PatchSpec> {
    vec![
        PatchSpec::new(
            COMPONENT_PIN_KEY_ID,
            ["core", "component.py"],
            COMPONENT_PIN_KEY_OLD,
            COMPONENT_PIN_KEY_NEW,
        )
        .with_description("Fix pin number key mismatch in the netlist exporter"),
        PatchSpec::new(
            LOADER_PIN_PRIORITY_ID,
            ["kicad", "sch_gen", "circuit_loader.py"],
            LOADER_PIN_PRIORITY_OLD,
            LOADER_PIN_PRIORITY_NEW,
        )
        .with_description(
            "Prefer pin numbers over names to prevent collisions between same-named pins",
        ),
    ]
}
