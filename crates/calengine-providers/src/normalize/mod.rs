//! Source normalizers: provider-shaped records to intermediate records.
//!
//! A normalizer never fails. A raw record missing an essential field (no
//! date at all, no title) yields zero records and a warning in the
//! [`Diagnostics`] sink; one raw record may yield several records (a contact
//! with a birthday and two anniversaries yields three).

mod contacts;
mod holidays;
mod tasks;

pub use contacts::{ContactNormalizer, EventMarkers};
pub use holidays::HolidayNormalizer;
pub use tasks::TaskNormalizer;

use calengine_core::Diagnostics;

/// Converts one provider record into zero or more intermediate records.
pub trait SourceNormalizer {
    type Raw;
    type Record;

    fn normalize(&self, raw: &Self::Raw, diagnostics: &mut Diagnostics) -> Vec<Self::Record>;

    /// Normalizes every record in `raws`, in order.
    fn normalize_all(&self, raws: &[Self::Raw], diagnostics: &mut Diagnostics) -> Vec<Self::Record> {
        raws.iter()
            .flat_map(|raw| self.normalize(raw, diagnostics))
            .collect()
    }
}
