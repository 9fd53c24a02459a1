use crate::data::dataset::Dataset;
use crate::data::suffix::Suffix;
use crate::data::xye;
use crate::error::{ModelExpError, Result};
use std::path::Path;

/// Datasets of one experiment in registration order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataContainer {
    datasets: Vec<Dataset>,
}

impl DataContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a dataset; returns its index
    pub fn add(&mut self, dataset: Dataset) -> usize {
        self.datasets.push(dataset);
        self.datasets.len() - 1
    }

    /// Load an `.xye` file and register it
    pub fn load_xye<P: AsRef<Path>>(&mut self, path: P, suffix: Suffix) -> Result<usize> {
        let dataset = xye::load_xye(path, suffix)?;
        Ok(self.add(dataset))
    }

    pub fn n_datasets(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }

    pub fn get_dataset(&self, index: usize) -> Result<&Dataset> {
        self.datasets.get(index).ok_or(ModelExpError::DatasetIndex {
            index,
            len: self.datasets.len(),
        })
    }

    pub fn get_dataset_mut(&mut self, index: usize) -> Result<&mut Dataset> {
        let len = self.datasets.len();
        self.datasets
            .get_mut(index)
            .ok_or(ModelExpError::DatasetIndex { index, len })
    }

    /// First dataset with the given suffix
    pub fn find(&self, suffix: &Suffix) -> Option<&Dataset> {
        self.datasets.iter().find(|d| d.suffix() == suffix)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Dataset> {
        self.datasets.iter()
    }

    /// Total number of points over all datasets
    pub fn total_points(&self) -> usize {
        self.datasets.iter().map(Dataset::len).sum()
    }

    /// Slice every dataset to `min < x < max`
    pub fn slice_domain(&mut self, min: f64, max: f64) {
        for dataset in &mut self.datasets {
            dataset.slice_domain(min, max);
        }
    }

    pub fn restore_masked(&mut self) {
        for dataset in &mut self.datasets {
            dataset.restore_masked();
        }
    }
}

impl FromIterator<Dataset> for DataContainer {
    fn from_iter<I: IntoIterator<Item = Dataset>>(iter: I) -> Self {
        Self {
            datasets: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a DataContainer {
    type Item = &'a Dataset;
    type IntoIter = std::slice::Iter<'a, Dataset>;

    fn into_iter(self) -> Self::IntoIter {
        self.datasets.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn dataset(label: &str, n: usize) -> Dataset {
        let domain = ndarray::Array1::linspace(0.1, 1.0, n);
        let values = domain.mapv(|q: f64| 1.0 / q);
        let errors = values.mapv(|i: f64| 0.1 * i);
        Dataset::new(domain, values, errors, Suffix::from(label)).unwrap()
    }

    #[test]
    fn test_registration_order_and_lookup() {
        let mut data = DataContainer::new();
        assert_eq!(data.add(dataset("xrr", 5)), 0);
        assert_eq!(data.add(dataset("nr", 3)), 1);

        assert_eq!(data.n_datasets(), 2);
        assert_eq!(data.total_points(), 8);
        assert_eq!(data.get_dataset(1).unwrap().suffix().label(), "nr");
        assert_eq!(data.find(&Suffix::from("xrr")).unwrap().len(), 5);

        let err = data.get_dataset(2).unwrap_err();
        assert!(matches!(err, ModelExpError::DatasetIndex { index: 2, len: 2 }));
    }

    #[test]
    fn test_slice_all() {
        let mut data: DataContainer = vec![
            Dataset::new(
                array![1.0, 2.0, 3.0],
                array![1.0, 1.0, 1.0],
                array![1.0, 1.0, 1.0],
                Suffix::default(),
            )
            .unwrap(),
        ]
        .into_iter()
        .collect();

        data.slice_domain(1.5, 10.0);
        assert_eq!(data.get_dataset(0).unwrap().domain(), &array![2.0, 3.0]);
        data.restore_masked();
        assert_eq!(data.get_dataset(0).unwrap().len(), 3);
    }
}
