use crate::store::{CollectionConfig, MemoryStore, SharedStore};

use serde_json::{json, Value};
use std::sync::Arc;

/// Return a small set of material documents.
///
/// * mp-149: Si, cubic
/// * mp-7000 and mp-546794: SiO2 polymorphs
/// * mp-2133: ZnO, deprecated
/// * mp-19017: LiFePO4
pub(crate) fn materials_docs() -> Vec<Value> {
    vec![
        json!({
            "task_id": "mp-149",
            "formula_pretty": "Si",
            "formula_anonymous": "A",
            "chemsys": "Si",
            "elements": ["Si"],
            "nelements": 1,
            "composition": {"Si": 2.0},
            "composition_reduced": {"Si": 1.0},
            "nsites": 2,
            "volume": 40.89,
            "density": 2.28,
            "symmetry": {"crystal_system": "Cubic", "symbol": "Fd-3m", "number": 227},
            "task_ids": ["mp-149", "mp-1791788"],
            "deprecated_tasks": [],
            "deprecated": false,
            "version": "2021_03_22",
            "last_updated": "2021-03-04T10:11:12",
        }),
        json!({
            "task_id": "mp-7000",
            "formula_pretty": "SiO2",
            "formula_anonymous": "AB2",
            "chemsys": "O-Si",
            "elements": ["O", "Si"],
            "nelements": 2,
            "composition": {"Si": 3.0, "O": 6.0},
            "composition_reduced": {"Si": 1.0, "O": 2.0},
            "nsites": 9,
            "volume": 113.01,
            "density": 2.65,
            "symmetry": {"crystal_system": "Trigonal", "symbol": "P3_221", "number": 154},
            "task_ids": ["mp-7000", "mp-556"],
            "deprecated_tasks": ["mp-556"],
            "deprecated": false,
            "version": "2021_03_22",
            "last_updated": "2021-03-05T10:11:12",
        }),
        json!({
            "task_id": "mp-546794",
            "formula_pretty": "SiO2",
            "formula_anonymous": "AB2",
            "chemsys": "O-Si",
            "elements": ["O", "Si"],
            "nelements": 2,
            "composition": {"Si": 2.0, "O": 4.0},
            "composition_reduced": {"Si": 1.0, "O": 2.0},
            "nsites": 6,
            "volume": 80.5,
            "density": 2.48,
            "symmetry": {"crystal_system": "Hexagonal", "symbol": "P6_422", "number": 181},
            "task_ids": ["mp-546794"],
            "deprecated_tasks": [],
            "deprecated": false,
            "version": "2021_03_22",
            "last_updated": "2021-03-06T10:11:12",
        }),
        json!({
            "task_id": "mp-2133",
            "formula_pretty": "ZnO",
            "formula_anonymous": "AB",
            "chemsys": "O-Zn",
            "elements": ["O", "Zn"],
            "nelements": 2,
            "composition": {"Zn": 2.0, "O": 2.0},
            "composition_reduced": {"Zn": 1.0, "O": 1.0},
            "nsites": 4,
            "volume": 49.4,
            "density": 5.47,
            "symmetry": {"crystal_system": "Hexagonal", "symbol": "P6_3mc", "number": 186},
            "task_ids": ["mp-2133", "mp-1000"],
            "deprecated_tasks": ["mp-1000"],
            "deprecated": true,
            "version": "2020_09_08",
            "last_updated": "2020-09-08T10:11:12",
        }),
        json!({
            "task_id": "mp-19017",
            "formula_pretty": "LiFePO4",
            "formula_anonymous": "ABCD4",
            "chemsys": "Fe-Li-O-P",
            "elements": ["Fe", "Li", "O", "P"],
            "nelements": 4,
            "composition": {"Li": 4.0, "Fe": 4.0, "P": 4.0, "O": 16.0},
            "composition_reduced": {"Li": 1.0, "Fe": 1.0, "P": 1.0, "O": 4.0},
            "nsites": 28,
            "volume": 300.2,
            "density": 3.49,
            "symmetry": {"crystal_system": "Orthorhombic", "symbol": "Pnma", "number": 62},
            "task_ids": ["mp-19017"],
            "deprecated_tasks": [],
            "deprecated": false,
            "version": "2021_03_22",
            "last_updated": "2021-03-07T10:11:12",
        }),
    ]
}

/// Return thermodynamic documents for the materials of [materials_docs].
pub(crate) fn thermo_docs() -> Vec<Value> {
    vec![
        json!({
            "task_id": "mp-149",
            "formula_pretty": "Si",
            "chemsys": "Si",
            "elements": ["Si"],
            "nelements": 1,
            "energy_per_atom": -5.42,
            "formation_energy_per_atom": 0.0,
            "energy_above_hull": 0.0,
            "is_stable": true,
            "last_updated": "2021-03-04T10:11:12",
        }),
        json!({
            "task_id": "mp-7000",
            "formula_pretty": "SiO2",
            "chemsys": "O-Si",
            "elements": ["O", "Si"],
            "nelements": 2,
            "energy_per_atom": -7.92,
            "formation_energy_per_atom": -3.08,
            "energy_above_hull": 0.0,
            "is_stable": true,
            "last_updated": "2021-03-05T10:11:12",
        }),
        json!({
            "task_id": "mp-546794",
            "formula_pretty": "SiO2",
            "chemsys": "O-Si",
            "elements": ["O", "Si"],
            "nelements": 2,
            "energy_per_atom": -7.89,
            "formation_energy_per_atom": -3.05,
            "energy_above_hull": 0.03,
            "is_stable": false,
            "last_updated": "2021-03-06T10:11:12",
        }),
    ]
}

/// Return a memory store holding `docs`.
pub(crate) async fn memory_store(name: &str, key: &str, docs: Vec<Value>) -> SharedStore {
    let config = CollectionConfig::new(name).with_key(key);
    Arc::new(MemoryStore::with_docs(config, docs).await.unwrap())
}
