//! One-hot hero encodings for model training
//!
//! Downstream consumers turn stored rosters into fixed-width feature
//! vectors:
//!
//! - First-order: length `2N` (`N` = hero table size), `+1` at the
//!   hero's index for radiant picks, `-1` at `N + index` for dire.
//! - Second-order: an `N x N` matchup matrix flattened to its strict
//!   upper triangle, `+1` when the radiant hero has the lower index
//!   and `-1` when the dire hero does.
//!
//! All matrices are row-major `Vec<i8>`.

use thiserror::Error;

use super::meta;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FeatureError {
    #[error("Unknown hero id: {0}")]
    UnknownHero(i32),
    #[error("Duplicate hero across teams: {0}")]
    DuplicateHero(i32),
    #[error("Vector length {0} does not fit the expected matrix shape")]
    BadLength(usize),
}

fn hero_index(hero_id: i32) -> Result<usize, FeatureError> {
    meta::hero_index(hero_id).ok_or(FeatureError::UnknownHero(hero_id))
}

/// Per-side presence vector of length `2 * NUM_HEROES`.
pub fn first_order_vector(radiant: &[i32], dire: &[i32]) -> Result<Vec<i8>, FeatureError> {
    let n = meta::NUM_HEROES;
    let mut vector = vec![0i8; 2 * n];
    for &hero_id in radiant {
        vector[hero_index(hero_id)?] = 1;
    }
    for &hero_id in dire {
        vector[n + hero_index(hero_id)?] = -1;
    }
    Ok(vector)
}

/// Radiant-vs-dire matchup matrix, `NUM_HEROES` square.
///
/// For each cross-team pair, the cell above the diagonal records who
/// owned the lower-indexed hero. A hero appearing on both sides is an
/// encoding error.
pub fn second_order_matrix(radiant: &[i32], dire: &[i32]) -> Result<Vec<i8>, FeatureError> {
    let n = meta::NUM_HEROES;
    let mut matrix = vec![0i8; n * n];
    for &rad_id in radiant {
        for &dire_id in dire {
            let irh = hero_index(rad_id)?;
            let idh = hero_index(dire_id)?;
            if idh > irh {
                matrix[irh * n + idh] = 1;
            } else if idh < irh {
                matrix[idh * n + irh] = -1;
            } else {
                return Err(FeatureError::DuplicateHero(rad_id));
            }
        }
    }
    Ok(matrix)
}

/// Strict upper triangle of a square matrix, row by row.
pub fn flatten_upper(matrix: &[i8]) -> Result<Vec<i8>, FeatureError> {
    let n = (matrix.len() as f64).sqrt().round() as usize;
    if n * n != matrix.len() {
        return Err(FeatureError::BadLength(matrix.len()));
    }
    let mut flat = Vec::with_capacity(n.saturating_sub(1) * n / 2);
    for i in 0..n {
        for j in (i + 1)..n {
            flat.push(matrix[i * n + j]);
        }
    }
    Ok(flat)
}

/// Rebuild a square matrix from its strict upper triangle.
///
/// `mirror` writes the negated value below the diagonal, recovering
/// the full antisymmetric matchup matrix.
pub fn unflatten_upper(flat: &[i8], mirror: bool) -> Result<Vec<i8>, FeatureError> {
    let n = ((1.0 + ((1 + 8 * flat.len()) as f64).sqrt()) / 2.0) as usize;
    if n * n.saturating_sub(1) / 2 != flat.len() {
        return Err(FeatureError::BadLength(flat.len()));
    }
    let mut matrix = vec![0i8; n * n];
    let mut cursor = 0;
    for i in 0..n {
        for j in (i + 1)..n {
            matrix[i * n + j] = flat[cursor];
            if mirror {
                matrix[j * n + i] = -flat[cursor];
            }
            cursor += 1;
        }
    }
    Ok(matrix)
}

/// Full feature row for one match: first-order vector followed by the
/// flattened second-order triangle.
pub fn match_vector(radiant: &[i32], dire: &[i32]) -> Result<Vec<i8>, FeatureError> {
    let mut row = first_order_vector(radiant, dire)?;
    let matchups = second_order_matrix(radiant, dire)?;
    row.extend(flatten_upper(&matchups)?);
    Ok(row)
}
