//! Demo data for a fresh installation

use chrono::NaiveDate;

use super::{consumables::ConsumableRegistry, tools::ToolRegistry};
use crate::models::{Consumable, Tool};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

const TOOLS: [(i32, &str, (i32, u32, u32)); 5] = [
    (1, "FIB-01: Helios 600i", (2023, 4, 10)),
    (2, "FIB-04: G4", (2023, 4, 9)),
    (3, "FIB-05: H5", (2023, 4, 8)),
    (4, "TEM02 - Talos01", (2023, 4, 7)),
    (5, "TEM03 - Talos02", (2023, 4, 11)),
];

/// (tool, part, current hours, guaranteed hours, last replaced, scheduled replacement)
type PartRow = (&'static str, &'static str, u32, u32, (i32, u32, u32), (i32, u32, u32));

const PARTS: [PartRow; 6] = [
    ("FIB-01: Helios 600i", "Ion Source", 450, 500, (2023, 3, 15), (2023, 5, 15)),
    ("FIB-01: Helios 600i", "Electron Source", 1800, 2000, (2022, 12, 1), (2023, 6, 1)),
    ("FIB-04: G4", "Ion Source", 480, 500, (2023, 2, 1), (2023, 4, 20)),
    ("FIB-05: H5", "Ion Source", 300, 500, (2023, 3, 1), (2023, 7, 1)),
    ("TEM02 - Talos01", "Electron Source", 1950, 2000, (2022, 11, 15), (2023, 5, 1)),
    ("TEM03 - Talos02", "Electron Source", 1700, 2000, (2022, 12, 15), (2023, 6, 15)),
];

/// Derived status starts at `Up`; the first recompute sets the real values
pub fn demo_tools() -> ToolRegistry {
    ToolRegistry::from_tools(
        TOOLS
            .iter()
            .map(|&(id, name, (y, m, d))| Tool::new(id, name, date(y, m, d)))
            .collect(),
    )
}

pub fn demo_consumables() -> ConsumableRegistry {
    let parts = PARTS
        .iter()
        .zip(1..)
        .map(|(&(tool, name, current, guaranteed, (ly, lm, ld), (sy, sm, sd)), id)| Consumable {
            id,
            tool_name: tool.to_string(),
            name: name.to_string(),
            current_hours: Some(current),
            guaranteed_hours: Some(guaranteed),
            last_replaced: date(ly, lm, ld),
            scheduled_replacement: Some(date(sy, sm, sd)),
            remark: String::new(),
        })
        .collect();
    ConsumableRegistry::from_parts(parts, None)
}
