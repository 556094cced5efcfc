//! # Grid Resolution
//!
//! A row's width is divided into `grid` equal units. Sized columns claim a
//! fixed number of units; auto columns split whatever the sized ones leave
//! over. Resolution happens once, when the row is built, so a malformed row
//! is rejected before it ever reaches pagination.

use crate::error::{Error, Result};

/// Resolve the units each column occupies.
///
/// `sizes[i]` is `Some(units)` for a sized column and `None` for an auto
/// column. Auto columns receive an equal, possibly fractional, share of
/// the leftover units.
pub fn resolve_units(sizes: &[Option<usize>], grid: usize) -> Result<Vec<f64>> {
    if grid == 0 {
        return Err(Error::config("grid size must be at least 1"));
    }

    let mut claimed = 0usize;
    let mut auto_count = 0usize;
    for size in sizes {
        match size {
            Some(units) if *units == 0 || *units > grid => {
                return Err(Error::config(format!(
                    "column size {} is outside 1..={}",
                    units, grid
                )));
            }
            Some(units) => claimed += units,
            None => auto_count += 1,
        }
    }

    if claimed > grid {
        return Err(Error::config(format!(
            "columns claim {} units but the grid has {}",
            claimed, grid
        )));
    }

    let leftover = grid - claimed;
    if auto_count > 0 && leftover == 0 {
        return Err(Error::config(
            "auto columns need at least one unit left by the sized columns",
        ));
    }

    let auto_share = if auto_count > 0 {
        leftover as f64 / auto_count as f64
    } else {
        0.0
    };

    Ok(sizes
        .iter()
        .map(|size| size.map(|u| u as f64).unwrap_or(auto_share))
        .collect())
}

/// Convert resolved units into widths, in millimetres.
pub fn column_widths(units: &[f64], grid: usize, usable_width: f64) -> Vec<f64> {
    units
        .iter()
        .map(|u| usable_width * u / grid as f64)
        .collect()
}

/// Left edge of each column, starting at `origin`.
pub fn column_offsets(widths: &[f64], origin: f64) -> Vec<f64> {
    let mut x = origin;
    widths
        .iter()
        .map(|w| {
            let left = x;
            x += w;
            left
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sized_columns_keep_their_units() {
        let units = resolve_units(&[Some(4), Some(8)], 12).unwrap();
        assert_eq!(units, vec![4.0, 8.0]);
    }

    #[test]
    fn auto_columns_share_the_leftover() {
        let units = resolve_units(&[Some(6), None, None], 12).unwrap();
        assert_eq!(units, vec![6.0, 3.0, 3.0]);
    }

    #[test]
    fn all_auto_shares_the_grid_equally() {
        let units = resolve_units(&[None, None, None], 12).unwrap();
        assert_eq!(units, vec![4.0, 4.0, 4.0]);
    }

    #[test]
    fn oversubscribed_grid_is_rejected() {
        assert!(resolve_units(&[Some(8), Some(6)], 12).is_err());
        assert!(resolve_units(&[Some(13)], 12).is_err());
        assert!(resolve_units(&[Some(0)], 12).is_err());
    }

    #[test]
    fn auto_without_leftover_is_rejected() {
        assert!(resolve_units(&[Some(12), None], 12).is_err());
    }

    #[test]
    fn widths_and_offsets() {
        let widths = column_widths(&[3.0, 9.0], 12, 200.0);
        assert_eq!(widths, vec![50.0, 150.0]);
        assert_eq!(column_offsets(&widths, 10.0), vec![10.0, 60.0]);
    }
}
