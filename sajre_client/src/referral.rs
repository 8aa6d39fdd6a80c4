//! Role-prefixed referral codes: `ADM-7KQ2ZP`, `VEN-...`, `MNT-...`, `USR-...`.

use crate::models::Role;
use rand::Rng;

/// Unambiguous alphabet: no `I`, `O`, `0` or `1`.
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
pub const CODE_LENGTH: usize = 6;
/// Prefix for role names outside the table.
pub const FALLBACK_PREFIX: &str = "GEN";

pub fn prefix_for(role: Role) -> &'static str {
    match role {
        Role::Admin => "ADM",
        Role::Vendor => "VEN",
        Role::Mentor => "MNT",
        Role::Student => "USR",
    }
}

pub fn random_code(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

/// Fresh code for `role`. Uniqueness is left to the backend.
pub fn make_referral_code(role: Role) -> String {
    format!("{}-{}", prefix_for(role), random_code(CODE_LENGTH))
}

/// Same as [`make_referral_code`] for an untyped role name; unknown names get
/// the `GEN` prefix.
pub fn make_referral_code_for(role_name: &str) -> String {
    let prefix = Role::parse(role_name).map(prefix_for).unwrap_or(FALLBACK_PREFIX);
    format!("{}-{}", prefix, random_code(CODE_LENGTH))
}

/// Role encoded in the code's prefix, if any.
pub fn role_from_code(code: &str) -> Option<Role> {
    if code.is_empty() {
        return None;
    }
    let prefix = code.split('-').next()?;
    Role::ALL.into_iter().find(|role| prefix_for(*role) == prefix)
}
