/// Number of absorbance values in a filled titration sample.
pub const VALUES_IN_A_SAMPLE: usize = 9;

/// One titration column: a label and its absorbance values top to bottom.
#[derive(Debug, Clone)]
pub struct TitrationSample {
    pub label: String,
    pub values: Vec<f64>,
}

impl TitrationSample {
    pub fn new(label: impl Into<String>) -> Self {
        TitrationSample {
            label: label.into(),
            values: Vec::with_capacity(VALUES_IN_A_SAMPLE),
        }
    }

    pub fn is_filled(&self) -> bool {
        self.values.len() == VALUES_IN_A_SAMPLE
    }

    pub fn add_value(&mut self, value: f64) {
        self.values.push(value);
    }
}

/// A group block discovered on a sheet: its title cell, the log-dilution
/// column and one sample column per titration.
#[derive(Debug, Clone)]
pub struct TitrationGroup {
    pub title: String,
    pub anchor: (usize, usize),
    pub dils: Vec<f64>,
    pub samples: Vec<TitrationSample>,
}

impl TitrationGroup {
    pub fn new(title: impl Into<String>, anchor: (usize, usize)) -> Self {
        TitrationGroup {
            title: title.into(),
            anchor,
            dils: Vec::new(),
            samples: Vec::new(),
        }
    }
}
