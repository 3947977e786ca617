//! Synthetic circuit_synth installs used by the integration tests.

use std::fs;
use std::path::Path;
use tempfile::TempDir;

pub const COMPONENT_UNPATCHED: &str = r#"class Component:
    def to_netlist_pins(self):
        pins = []
        for pin_num, pin in self._pins.items():
            pins.append(
                {
                    "pin_id": pin_num,
                    "name": pin.name,
                    "func": pin.func,
                }
            )
        return pins
"#;

pub const COMPONENT_PATCHED: &str = r#"class Component:
    def to_netlist_pins(self):
        pins = []
        for pin_num, pin in self._pins.items():
            pins.append(
                {
                    "number": pin_num,
                    "name": pin.name,
                    "func": pin.func,
                }
            )
        return pins
"#;

pub const LOADER_UNPATCHED: &str = r#"import logging

logger = logging.getLogger(__name__)


def load_nets(circuit_data):
    nets = {}
    for net_name, net_pins in circuit_data.get("nets", {}).items():
        for pin_entry in net_pins:
            comp_ref = pin_entry["component"]
            pin_data = pin_entry["pin"]
            # Enhanced pin identification - store the most specific identifier available
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
                )
            if pin_identifier is None:
                logger.warning(f"No identifier for {comp_ref} pin in net {net_name}")
                continue

            nets.setdefault(net_name, []).append((comp_ref, pin_identifier))
    return nets
"#;

pub const LOADER_PATCHED: &str = r#"import logging

logger = logging.getLogger(__name__)


def load_nets(circuit_data):
    nets = {}
    for net_name, net_pins in circuit_data.get("nets", {}).items():
        for pin_entry in net_pins:
            comp_ref = pin_entry["component"]
            pin_data = pin_entry["pin"]
            # Enhanced pin identification - prioritize number for uniqueness
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
                )
            if pin_identifier is None:
                logger.warning(f"No identifier for {comp_ref} pin in net {net_name}")
                continue

            nets.setdefault(net_name, []).append((comp_ref, pin_identifier))
    return nets
"#;

/// Same function, but the comment above the fallback was reworded upstream.
pub const LOADER_DRIFTED: &str = r#"import logging

logger = logging.getLogger(__name__)


def load_nets(circuit_data):
    nets = {}
    for net_name, net_pins in circuit_data.get("nets", {}).items():
        for pin_entry in net_pins:
            comp_ref = pin_entry["component"]
            pin_data = pin_entry["pin"]
            # Enhanced pin identification - store the most specific identifier available
            pin_identifier = None

            # First check if name is available (most specific)
            if "name" in pin_data and pin_data["name"] != "~":
                pin_identifier = pin_data["name"]
                logger.debug(
                    f"Using pin name '{pin_identifier}' for {comp_ref} in net {net_name}"
                )
            # Fall back to the pin number
            elif "number" in pin_data:
                pin_identifier = str(pin_data["number"])
                logger.debug(
                    f"Using pin number '{pin_identifier}' for {comp_ref} in net {net_name}"
                )
            if pin_identifier is None:
                logger.warning(f"No identifier for {comp_ref} pin in net {net_name}")
                continue

            nets.setdefault(net_name, []).append((comp_ref, pin_identifier))
    return nets
"#;

pub const COMPONENT_PATH: &str = "core/component.py";
pub const LOADER_PATH: &str = "kicad/sch_gen/circuit_loader.py";

/// Create a library root containing the given files.
pub fn library(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("__init__.py"), "__version__ = \"0.0.0\"\n").unwrap();
    for (rel, content) in files {
        write(dir.path(), rel, content);
    }
    dir
}

/// A library root with both target files in their original, unpatched form.
pub fn unpatched_library() -> TempDir {
    library(&[
        (COMPONENT_PATH, COMPONENT_UNPATCHED),
        (LOADER_PATH, LOADER_UNPATCHED),
    ])
}

pub fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

pub fn read(root: &Path, rel: &str) -> String {
    fs::read_to_string(root.join(rel)).unwrap()
}
