// std imports
use std::collections::BTreeSet;

// 3rd party imports
use polars::prelude::DataFrame;

// internal imports
use crate::dataframe::errors::TableError;
use crate::dataframe::frame::{i64_values, is_unique_by};

/// Distinct (start, end) intervals sorted by start and end, rows with missing positions are ignored
///
fn intervals(df: &DataFrame) -> Result<Vec<(i64, i64)>, TableError> {
    let intervals: BTreeSet<(i64, i64)> = i64_values(df, "start")?
        .into_iter()
        .zip(i64_values(df, "end")?)
        .filter_map(|(start, end)| Some((start?, end?)))
        .collect();
    Ok(intervals.into_iter().collect())
}

/// Merges the peptides into covered regions (inclusive). Adjacent peptides form one region.
///
/// # Arguments
/// * `df` - Peptides with `start` and `end`
///
pub fn contiguous_peptides(df: &DataFrame) -> Result<Vec<(i64, i64)>, TableError> {
    let mut regions: Vec<(i64, i64)> = Vec::new();
    for (start, end) in intervals(df)? {
        match regions.last_mut() {
            Some(region) if start <= region.1 + 1 => region.1 = region.1.max(end),
            _ => regions.push((start, end)),
        }
    }
    Ok(regions)
}

/// Greedily selects peptides which do not overlap, starting with the first peptide
///
/// # Arguments
/// * `df` - Peptides with `start` and `end`
///
pub fn non_overlapping_peptides(df: &DataFrame) -> Result<Vec<(i64, i64)>, TableError> {
    let mut selected: Vec<(i64, i64)> = Vec::new();
    for (start, end) in intervals(df)? {
        match selected.last() {
            Some((_, last_end)) if start <= *last_end => continue,
            _ => selected.push((start, end)),
        }
    }
    Ok(selected)
}

/// Number of distinct peptides covering each residue from the first start to the last end
///
/// # Arguments
/// * `df` - Peptides with `start` and `end`
///
pub fn peptide_redundancy(df: &DataFrame) -> Result<(Vec<i64>, Vec<usize>), TableError> {
    let intervals = intervals(df)?;
    let (first, last) = match (
        intervals.iter().map(|(start, _)| *start).min(),
        intervals.iter().map(|(_, end)| *end).max(),
    ) {
        (Some(first), Some(last)) => (first, last),
        _ => return Ok((Vec::new(), Vec::new())),
    };
    let residues: Vec<i64> = (first..=last).collect();
    let mut redundancy = vec![0; residues.len()];
    for (start, end) in intervals {
        for count in redundancy[(start - first) as usize..=(end - first) as usize].iter_mut() {
            *count += 1;
        }
    }
    Ok((residues, redundancy))
}

/// Mean redundancy over the covered residues, `None` if nothing is covered
///
/// # Arguments
/// * `df` - Peptides with `start` and `end`
///
pub fn mean_redundancy(df: &DataFrame) -> Result<Option<f64>, TableError> {
    let (_, redundancy) = peptide_redundancy(df)?;
    let covered: Vec<usize> = redundancy.into_iter().filter(|count| *count > 0).collect();
    if covered.is_empty() {
        return Ok(None);
    }
    Ok(Some(
        covered.iter().sum::<usize>() as f64 / covered.len() as f64,
    ))
}

/// True if every row is a distinct peptide, i.e. (start, end) is unique
///
pub fn peptides_are_unique(df: &DataFrame) -> Result<bool, TableError> {
    is_unique_by(df, &["start", "end"])
}
