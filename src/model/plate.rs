use std::collections::BTreeMap;

use crate::model::address::{PlateLayout, WellAddress};

/// The extracted contents of one wellplate: every addressable well mapped to
/// its absorbance value, with `None` for wells intentionally left empty.
#[derive(Debug, Clone)]
pub struct PlateData {
    pub layout: PlateLayout,
    wells: BTreeMap<WellAddress, Option<f64>>,
    numeric_count: usize,
}

impl PlateData {
    pub fn new(layout: PlateLayout) -> Self {
        PlateData {
            layout,
            wells: BTreeMap::new(),
            numeric_count: 0,
        }
    }

    pub fn insert(&mut self, address: WellAddress, value: Option<f64>) {
        if value.is_some() {
            self.numeric_count += 1;
        }
        self.wells.insert(address, value);
    }

    /// `None` when the address was never extracted, `Some(None)` for an
    /// extracted-but-empty well.
    pub fn get(&self, address: WellAddress) -> Option<Option<f64>> {
        self.wells.get(&address).copied()
    }

    pub fn numeric_wells(&self) -> usize {
        self.numeric_count
    }

    pub fn iter(&self) -> impl Iterator<Item = (WellAddress, Option<f64>)> + '_ {
        self.wells.iter().map(|(addr, value)| (*addr, *value))
    }

    /// The first well in loading order that holds a numeric value.
    pub fn first_numeric(&self) -> Option<WellAddress> {
        let mut current = self.layout.first_address();
        for _ in 0..self.layout.well_count() {
            if self.get(current).flatten().is_some() {
                return Some(current);
            }
            current = self.layout.next_address(current)?;
        }
        None
    }
}
