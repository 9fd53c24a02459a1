//! Result files.
//!
//! One block per dataset or model set:
//!
//! ```text
//!
//! #[[Data]] sa_p
//! #q / A-1	I / cm-1	sI / cm-1	Imodel / cm-1
//! 0.01	12.5	0.3	12.1
//! ```
//!
//! Data-only files drop the model column, model-only files keep the domain
//! and model columns.

use crate::data::{DataContainer, Suffix};
use crate::error::{ModelExpError, Result};
use crate::experiment::{check_alignment, AxisLabels};
use crate::model::ModelOutput;
use log::debug;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

fn write_block_header<W: Write>(writer: &mut W, suffix: &Suffix, columns: &[&str]) -> Result<()> {
    writeln!(writer)?;
    writeln!(writer, "#[[Data]] {}", suffix)?;
    writeln!(writer, "#{}", columns.join("\t"))?;
    Ok(())
}

/// Write data and/or model sets in the block format
///
/// With both present, the i-th model set must lie on the i-th dataset's
/// domain.
pub fn write_results<W: Write>(
    writer: &mut W,
    labels: &AxisLabels,
    data: Option<&DataContainer>,
    models: Option<&[ModelOutput]>,
) -> Result<()> {
    match (data, models) {
        (Some(data), Some(models)) => {
            if data.n_datasets() != models.len() {
                return Err(ModelExpError::ShapeMismatch(format!(
                    "{} datasets but {} model sets",
                    data.n_datasets(),
                    models.len()
                )));
            }
            let columns = [&*labels.domain, &*labels.value, &*labels.error, &*labels.model];
            for (dataset, model) in data.iter().zip(models) {
                check_alignment(dataset, model)?;
                write_block_header(writer, dataset.suffix(), &columns)?;
                for i in 0..dataset.len() {
                    writeln!(
                        writer,
                        "{}\t{}\t{}\t{}",
                        dataset.domain()[i],
                        dataset.values()[i],
                        dataset.errors()[i],
                        model.values[i]
                    )?;
                }
            }
        }
        (Some(data), None) => {
            let columns = [&*labels.domain, &*labels.value, &*labels.error];
            for dataset in data {
                write_block_header(writer, dataset.suffix(), &columns)?;
                for i in 0..dataset.len() {
                    writeln!(
                        writer,
                        "{}\t{}\t{}",
                        dataset.domain()[i],
                        dataset.values()[i],
                        dataset.errors()[i]
                    )?;
                }
            }
        }
        (None, Some(models)) => {
            let columns = [&*labels.domain, &*labels.model];
            for model in models {
                write_block_header(writer, &model.suffix, &columns)?;
                for (q, v) in model.domain.iter().zip(model.values.iter()) {
                    writeln!(writer, "{}\t{}", q, v)?;
                }
            }
        }
        (None, None) => {
            return Err(ModelExpError::Configuration(
                "nothing to export: neither data nor model is set".to_string(),
            ))
        }
    }
    Ok(())
}

/// Write results to a file, replacing it
pub fn save_results<P: AsRef<Path>>(
    path: P,
    labels: &AxisLabels,
    data: Option<&DataContainer>,
    models: Option<&[ModelOutput]>,
) -> Result<()> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    write_results(&mut writer, labels, data, models)?;
    writer.flush()?;
    debug!("saved results to {}", path.display());
    Ok(())
}
