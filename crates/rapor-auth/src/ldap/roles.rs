//! Role derivation from directory group names
//!
//! Group naming is inconsistent across directory environments (casing,
//! diacritics, prefixed codes), so matching is normalized substring
//! containment rather than equality. The admin check runs first; anything
//! without an admin keyword hit is a plain user.

use rapor_core::types::Role;
use rapor_core::utils::normalize;

/// Map a set of directory group names to an application role.
pub fn classify(group_names: &[String], admin_keywords: &[String]) -> Role {
    let keywords: Vec<String> = admin_keywords.iter().map(|k| normalize(k)).collect();

    for name in group_names {
        let name = normalize(name);
        if keywords.iter().any(|keyword| name.contains(keyword)) {
            return Role::Admin;
        }
    }

    Role::User
}
