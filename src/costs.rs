// src/costs.rs

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Purchase cost per unit, keyed by normalized product name.
const COST_ENTRIES: &[(&str, i64)] = &[
    ("PRIV BAR", 13500),
    ("SPACEMAN", 10500),
    ("VELOCITY", 11000),
    ("CHRIS BROWN 15000", 11000),
    ("SOLARIS", 14500),
    ("DEATH ROW", 5000),
    ("DEATH ROW 5K", 4800),
    ("SNOOPYSMOKE", 9000),
    ("BUGATTI", 5000),
    ("MTRX25K", 11600),
    ("MTRX12K", 9300),
    ("MOVEMENT", 8300),
    ("LOST MARY", 5000),
    ("ORION BAR", 8300),
    ("IJOY", 14000),
    ("AIRFUZE", 13700),
    ("JUDO", 13500),
    ("VERA", 10300),
    ("CZAR", 8500),
    ("MINTOPIA", 8500),
    ("SNOOPY30K", 15000),
    ("SPACEMAN 20K", 12500),
    ("CONNECT", 16000),
    ("HELLO SYNIX", 18100),
    ("CAPSULA THC", 8800),
    ("EQUATOR", 15000),
    ("URANUS", 10500),
    ("BATERIA THC", 7500),
    ("LENTES", 7500),
    ("ELF THC", 24000),
    ("MOTI", 8500),
    ("HUKMANIA", 8000),
    ("YOVO", 8000),
    ("PULSE", 45000),
    ("AIRPODS", 28000),
    ("CRAZYACE", 0),
    ("ELFBARTE", 5500),
    ("AIRBAR", 7500),
    ("EASE", 5000),
    ("LIGHT RISE", 0),
    ("SMARTH TC", 13000),
    ("NOS KYLINBAR", 12500),
    ("NICKYJAM", 9000),
    ("FUMEDESTILADO", 21500),
];

static BUILTIN: Lazy<CostTable> = Lazy::new(|| CostTable::from_entries(COST_ENTRIES));

/// Immutable lookup from normalized product name to unit cost.
///
/// Lookup is exact: callers are expected to pass names through
/// `heuristics::normalize_product_name` first.
#[derive(Debug, Clone)]
pub struct CostTable {
    costs: HashMap<String, i64>,
}

impl CostTable {
    /// The compiled-in table used by the pipeline.
    pub fn builtin() -> &'static CostTable {
        &BUILTIN
    }

    pub fn from_entries(entries: &[(&str, i64)]) -> Self {
        let costs = entries
            .iter()
            .map(|(name, cost)| ((*name).to_string(), *cost))
            .collect();
        Self { costs }
    }

    pub fn unit_cost(&self, normalized_name: &str) -> Option<i64> {
        self.costs.get(normalized_name).copied()
    }

    pub fn len(&self) -> usize {
        self.costs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.costs.is_empty()
    }
}
