//! Directory entry parsing
//!
//! The deployment's directory schema mixes canonical English attribute
//! names with Turkish display-name aliases, so every logical field is
//! resolved through an ordered alias chain: the canonical key first, then
//! the localized variants actually observed in production. Absent optional
//! attributes never fail the parse.

use std::collections::HashMap;

use rapor_core::utils::capitalize;

use super::types::DirectoryIdentity;

const USERNAME_KEYS: &[&str] = &["sAMAccountName"];
const EMAIL_KEYS: &[&str] = &["mail", "e-posta"];
const PRINCIPAL_KEYS: &[&str] = &["userPrincipalName"];
const GIVEN_NAME_KEYS: &[&str] = &["givenName", "ad"];
const SURNAME_KEYS: &[&str] = &["sn", "soyad"];
const DISPLAY_NAME_KEYS: &[&str] = &["cn", "displayName"];
const PHONE_KEYS: &[&str] = &["telephoneNumber", "mobile", "telefon"];
const DEPARTMENT_KEYS: &[&str] = &["department", "departman"];
const TITLE_KEYS: &[&str] = &["title", "unvan", "ünvan"];
const OFFICE_KEYS: &[&str] = &["physicalDeliveryOfficeName", "ofis"];
const DN_KEYS: &[&str] = &["distinguishedName", "dn"];
const MEMBER_OF_KEYS: &[&str] = &["memberOf"];

/// Convert a raw attribute bag into a [`DirectoryIdentity`].
///
/// `username` is the logon name the user typed, `domain` the logon domain
/// used for the constructed-email fallback, `default_group` the membership
/// assigned when the entry carries no `memberOf` at all.
pub fn parse_entry(
    attrs: &HashMap<String, Vec<String>>,
    username: &str,
    domain: &str,
    default_group: &str,
) -> DirectoryIdentity {
    let username = first_value(attrs, USERNAME_KEYS).unwrap_or_else(|| username.to_string());

    let email = first_value(attrs, EMAIL_KEYS)
        .or_else(|| first_value(attrs, PRINCIPAL_KEYS))
        .unwrap_or_else(|| format!("{}@{}", username, domain));

    let display_split = first_value(attrs, DISPLAY_NAME_KEYS).map(|name| split_display_name(&name));

    let first_name = first_value(attrs, GIVEN_NAME_KEYS)
        .or_else(|| display_split.as_ref().map(|(first, _)| first.clone()))
        .unwrap_or_else(|| capitalize(&username));

    let last_name = first_value(attrs, SURNAME_KEYS)
        .or_else(|| display_split.as_ref().map(|(_, last)| last.clone()))
        .unwrap_or_default();

    let groups = match all_values(attrs, MEMBER_OF_KEYS) {
        Some(members) => {
            let names: Vec<String> = members
                .iter()
                .map(|dn| common_name(dn))
                .filter(|name| !name.is_empty())
                .collect();
            if names.is_empty() {
                vec![default_group.to_string()]
            } else {
                names
            }
        }
        None => vec![default_group.to_string()],
    };

    DirectoryIdentity {
        username,
        email,
        first_name,
        last_name,
        phone: first_value(attrs, PHONE_KEYS),
        department: first_value(attrs, DEPARTMENT_KEYS),
        title: first_value(attrs, TITLE_KEYS),
        office: first_value(attrs, OFFICE_KEYS),
        distinguished_name: first_value(attrs, DN_KEYS),
        groups,
    }
}

/// First present, non-empty value across an alias chain. Single-element
/// arrays collapse to their scalar here.
fn first_value(attrs: &HashMap<String, Vec<String>>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| {
        lookup(attrs, key)?
            .iter()
            .map(|v| v.trim())
            .find(|v| !v.is_empty())
            .map(str::to_string)
    })
}

/// All values of the first present attribute in the alias chain. Used only
/// for the multi-valued membership field.
fn all_values<'a>(attrs: &'a HashMap<String, Vec<String>>, keys: &[&str]) -> Option<&'a [String]> {
    keys.iter()
        .find_map(|key| lookup(attrs, key))
        .map(Vec::as_slice)
}

fn lookup<'a>(attrs: &'a HashMap<String, Vec<String>>, key: &str) -> Option<&'a Vec<String>> {
    attrs.get(key).or_else(|| {
        attrs
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    })
}

/// Split a display/common name on the first whitespace boundary:
/// `"John van Doe"` -> `("John", "van Doe")`.
fn split_display_name(name: &str) -> (String, String) {
    let name = name.trim();
    match name.split_once(char::is_whitespace) {
        Some((first, rest)) => (first.to_string(), rest.trim().to_string()),
        None => (name.to_string(), String::new()),
    }
}

/// Reduce a membership value to its leading common-name component: the text
/// between `CN=` and the first following comma. Plain group names without a
/// DN structure pass through unchanged.
fn common_name(dn: &str) -> String {
    let bytes = dn.as_bytes();
    for i in 0..bytes.len().saturating_sub(2) {
        if bytes[i..i + 3].eq_ignore_ascii_case(b"CN=") {
            let rest = &dn[i + 3..];
            let end = rest.find(',').unwrap_or(rest.len());
            return rest[..end].trim().to_string();
        }
    }
    dn.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, &[&str])]) -> HashMap<String, Vec<String>> {
        pairs
            .iter()
            .map(|(k, vs)| {
                (
                    k.to_string(),
                    vs.iter().map(|v| v.to_string()).collect::<Vec<_>>(),
                )
            })
            .collect()
    }

    #[test]
    fn full_entry_parses_all_fields() {
        let attrs = attrs(&[
            ("sAMAccountName", &["JDoe"]),
            ("mail", &["john.doe@cashmgmt.net"]),
            ("givenName", &["John"]),
            ("sn", &["Doe"]),
            ("department", &["Sales"]),
            ("title", &["Account Manager"]),
            ("telephoneNumber", &["+90 212 555 0100"]),
            ("physicalDeliveryOfficeName", &["HQ"]),
            ("distinguishedName", &["CN=John Doe,OU=People,DC=cashmgmt,DC=net"]),
            (
                "memberOf",
                &[
                    "CN=Sales Team,OU=Groups,DC=cashmgmt,DC=net",
                    "CN=Domain Users,CN=Users,DC=cashmgmt,DC=net",
                ],
            ),
        ]);

        let identity = parse_entry(&attrs, "jdoe", "cashmgmt.net", "General Users");
        assert_eq!(identity.username, "JDoe");
        assert_eq!(identity.email, "john.doe@cashmgmt.net");
        assert_eq!(identity.first_name, "John");
        assert_eq!(identity.last_name, "Doe");
        assert_eq!(identity.department.as_deref(), Some("Sales"));
        assert_eq!(identity.title.as_deref(), Some("Account Manager"));
        assert_eq!(identity.office.as_deref(), Some("HQ"));
        assert_eq!(identity.groups, vec!["Sales Team", "Domain Users"]);
    }

    #[test]
    fn missing_names_fall_back_to_common_name_split() {
        let attrs = attrs(&[
            ("userPrincipalName", &["jdoe@corp.local"]),
            ("cn", &["John Doe"]),
        ]);

        let identity = parse_entry(&attrs, "jdoe", "cashmgmt.net", "General Users");
        assert_eq!(identity.email, "jdoe@corp.local");
        assert_eq!(identity.first_name, "John");
        assert_eq!(identity.last_name, "Doe");
    }

    #[test]
    fn empty_bag_synthesizes_identity_from_username() {
        let identity = parse_entry(&HashMap::new(), "mkaya", "cashmgmt.net", "General Users");
        assert_eq!(identity.username, "mkaya");
        assert_eq!(identity.email, "mkaya@cashmgmt.net");
        assert_eq!(identity.first_name, "Mkaya");
        assert_eq!(identity.last_name, "");
        assert_eq!(identity.groups, vec!["General Users".to_string()]);
    }

    #[test]
    fn localized_aliases_are_consulted_after_canonical_keys() {
        let attrs = attrs(&[
            ("e-posta", &["mkaya@cashmgmt.net"]),
            ("ad", &["Mehmet"]),
            ("soyad", &["Kaya"]),
            ("departman", &["Finans"]),
            ("unvan", &["Uzman"]),
            ("ofis", &["İstanbul"]),
            ("telefon", &["+90 212 555 0101"]),
        ]);

        let identity = parse_entry(&attrs, "mkaya", "cashmgmt.net", "General Users");
        assert_eq!(identity.email, "mkaya@cashmgmt.net");
        assert_eq!(identity.first_name, "Mehmet");
        assert_eq!(identity.last_name, "Kaya");
        assert_eq!(identity.department.as_deref(), Some("Finans"));
        assert_eq!(identity.title.as_deref(), Some("Uzman"));
        assert_eq!(identity.office.as_deref(), Some("İstanbul"));
        assert_eq!(identity.phone.as_deref(), Some("+90 212 555 0101"));
    }

    #[test]
    fn canonical_key_wins_over_alias() {
        let attrs = attrs(&[("mail", &["a@x.com"]), ("e-posta", &["b@x.com"])]);
        let identity = parse_entry(&attrs, "u", "x.com", "General Users");
        assert_eq!(identity.email, "a@x.com");
    }

    #[test]
    fn empty_values_are_skipped_in_alias_chains() {
        let attrs = attrs(&[("mail", &["", "  "]), ("e-posta", &["real@x.com"])]);
        let identity = parse_entry(&attrs, "u", "x.com", "General Users");
        assert_eq!(identity.email, "real@x.com");
    }

    #[test]
    fn member_of_reduces_to_common_name_component() {
        assert_eq!(common_name("CN=Sales Team,OU=Groups,DC=x"), "Sales Team");
        assert_eq!(common_name("cn=Mixed Case,ou=y"), "Mixed Case");
        assert_eq!(common_name("Plain Group Name"), "Plain Group Name");
        assert_eq!(common_name("CN=Tail Only"), "Tail Only");
    }

    #[test]
    fn single_string_membership_is_accepted() {
        let attrs = attrs(&[("memberOf", &["CN=Only Group,OU=Groups,DC=x"])]);
        let identity = parse_entry(&attrs, "u", "x.com", "General Users");
        assert_eq!(identity.groups, vec!["Only Group".to_string()]);
    }

    #[test]
    fn absent_membership_defaults_to_the_general_group() {
        let attrs = attrs(&[("mail", &["u@x.com"])]);
        let identity = parse_entry(&attrs, "u", "x.com", "Genel Kullanıcılar");
        assert_eq!(identity.groups, vec!["Genel Kullanıcılar".to_string()]);
    }
}
