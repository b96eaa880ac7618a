use super::Identity;

/// Why a mutation was refused by the ownership policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    /// The record has no owner; only administrators may change shared records.
    ReadOnly,
    /// The record belongs to someone else.
    NotOwner,
}

/// Decide whether `actor` may update or delete a record owned by `owner`.
///
/// Administrators may mutate anything. A record without an owner is a shared
/// resource and is read-only for everyone else.
pub fn authorize_mutation(owner: Option<i64>, actor: &Identity) -> Result<(), Denial> {
    if actor.is_admin() {
        return Ok(());
    }
    match owner {
        None => Err(Denial::ReadOnly),
        Some(owner) if owner == actor.id => Ok(()),
        Some(_) => Err(Denial::NotOwner),
    }
}
