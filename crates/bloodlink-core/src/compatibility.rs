//! ABO/Rh transfusion compatibility.
//!
//! [`can_donate`] is the single canonical relation. Both directional
//! queries are computed from it, so "who can I receive from" and "who can
//! I give to" cannot drift apart.

use std::collections::BTreeSet;

use crate::models::blood_group::BloodGroup;

/// `true` when red cells of `donor` may be transfused to `recipient`.
///
/// The donor's ABO antigens must be a subset of the recipient's, and an
/// Rh-positive donor may only give to an Rh-positive recipient.
pub fn can_donate(donor: BloodGroup, recipient: BloodGroup) -> bool {
    donor.abo().is_subset_of(recipient.abo()) && (!donor.rh_positive() || recipient.rh_positive())
}

/// Every group whose holders may donate to a recipient of `recipient`.
pub fn compatible_donor_groups(recipient: BloodGroup) -> BTreeSet<BloodGroup> {
    BloodGroup::ALL
        .into_iter()
        .filter(|&donor| can_donate(donor, recipient))
        .collect()
}

/// Every group a donor of `donor` may give to. Inverse of
/// [`compatible_donor_groups`].
pub fn compatible_recipient_groups(donor: BloodGroup) -> BTreeSet<BloodGroup> {
    BloodGroup::ALL
        .into_iter()
        .filter(|&recipient| can_donate(donor, recipient))
        .collect()
}
