//! Soft delete.
//!
//! A row carrying a deletion timestamp is invisible to every query and to
//! every mutation target lookup. Read paths filter through
//! [`SoftDelete::is_live`] or [`live`] rather than checking the timestamp
//! themselves.

use chrono::{DateTime, Utc};

/// A row that is removed by stamping a deletion time instead of erasing it.
pub trait SoftDelete {
    /// Deletion timestamp, if the row has been soft-deleted.
    fn deleted_at(&self) -> Option<DateTime<Utc>>;

    /// Returns true if the row has not been soft-deleted.
    fn is_live(&self) -> bool {
        self.deleted_at().is_none()
    }
}

/// Yields only the rows that have not been soft-deleted.
pub fn live<'a, T, I>(rows: I) -> impl Iterator<Item = &'a T>
where
    T: SoftDelete + 'a,
    I: IntoIterator<Item = &'a T>,
{
    rows.into_iter().filter(|row| row.is_live())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Row(Option<DateTime<Utc>>);

    impl SoftDelete for Row {
        fn deleted_at(&self) -> Option<DateTime<Utc>> {
            self.0
        }
    }

    #[test]
    fn test_live_skips_tombstoned_rows() {
        let rows = vec![Row(None), Row(Some(Utc::now())), Row(None)];
        assert_eq!(live(&rows).count(), 2);
        assert!(rows[0].is_live());
        assert!(!rows[1].is_live());
    }
}
