//! Membership service - registration, lookup, and account status.

use crate::error::{Error, Result};
use crate::store::Store;
use crate::{member, Member, MemberId, NewMember};
use chrono::NaiveDate;
use garde::Validate;

/// Register a new member, assigning the next free id.
pub fn register_member(
    store: &mut Store,
    new_member: NewMember,
    today: NaiveDate,
) -> Result<Member> {
    new_member.validate()?;

    let members: Vec<Member> = store.query(member::TABLE)?.decode()?;
    if members.iter().any(|m| m.email == new_member.email) {
        return Err(Error::DuplicateEmail(new_member.email));
    }

    let id = store.next_id(member::TABLE)?;
    let member = new_member.into_member(id, today);
    store.put(member::TABLE, &member::key(id), &member)?;
    Ok(member)
}

/// Look up a member by id.
pub fn find_member(store: &Store, member_id: MemberId) -> Result<Option<Member>> {
    Ok(store.get_as(member::TABLE, &member::key(member_id))?)
}

/// All members, in name order.
pub fn list_members(store: &Store) -> Result<Vec<Member>> {
    let mut members: Vec<Member> = store.query(member::TABLE)?.decode()?;
    members.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
    Ok(members)
}

/// Members currently allowed to borrow, in name order.
pub fn list_active_members(store: &Store) -> Result<Vec<Member>> {
    let mut members = list_members(store)?;
    members.retain(|m| m.active);
    Ok(members)
}

/// Deactivate a member's account.
///
/// Blocked while the member has open loans, so an active loan can always
/// resolve its member.
pub fn deactivate_member(store: &mut Store, member_id: MemberId) -> Result<Member> {
    let mut member = find_member(store, member_id)?.ok_or(Error::MemberNotFound(member_id))?;
    if member.loans_outstanding > 0 {
        return Err(Error::OutstandingLoans(member_id));
    }

    member.active = false;
    store.put(member::TABLE, &member::key(member_id), &member)?;
    Ok(member)
}

/// Reactivate a previously deactivated account.
pub fn reactivate_member(store: &mut Store, member_id: MemberId) -> Result<Member> {
    let mut member = find_member(store, member_id)?.ok_or(Error::MemberNotFound(member_id))?;
    member.active = true;
    store.put(member::TABLE, &member::key(member_id), &member)?;
    Ok(member)
}
