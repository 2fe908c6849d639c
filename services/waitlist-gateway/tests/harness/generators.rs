// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Test data generators for submissions.

const LOCAL_PARTS: &[&str] = &[
    "a", "jane", "john.doe", "first_last", "user+tag", "x-y", "UPPER", "n0mb3rs", "o'brien",
];
const DOMAINS: &[&str] = &["b", "example", "mail.example", "sub-domain.school", "localhost1"];
const TLDS: &[&str] = &["com", "org", "co.uk", "io", "z", "education"];

/// Every combination of local part, domain and TLD: `local@domain.tld`.
pub fn valid_emails() -> Vec<String> {
    let mut out = Vec::new();
    for local in LOCAL_PARTS {
        for domain in DOMAINS {
            for tld in TLDS {
                out.push(format!("{local}@{domain}.{tld}"));
            }
        }
    }
    out
}

/// The address with its `@` removed.
pub fn without_at(email: &str) -> String {
    email.replace('@', "")
}

/// The address with every dot after the `@` removed.
pub fn without_domain_dot(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => format!("{local}@{}", domain.replace('.', "")),
        None => email.to_string(),
    }
}

/// The address with a space inserted into the domain.
pub fn with_whitespace(email: &str) -> String {
    email.replacen('.', " .", 1)
}

/// Distinct identities for spreading load.
pub fn identities(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| format!("member-{i}@waitlist.example.com"))
        .collect()
}

/// Role strings that differ from a valid label only by case or spacing.
pub fn near_miss_roles() -> Vec<String> {
    let mut out = Vec::new();
    for label in waitlist_gateway::Role::ALL.map(|r| r.label()) {
        out.push(label.to_lowercase());
        out.push(label.to_uppercase());
        out.push(label.replace(" / ", "/"));
        out.push(format!("{label} "));
        out.push(format!(" {label}x"));
    }
    out
}
