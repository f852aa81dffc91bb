//! Transition rules of a gift's reservation state.
//!
//! ```text
//! OPEN --reserve / mark_by_proxy--> RESERVED
//! RESERVED --release--> OPEN
//! ```
//!
//! These checks are pure; `gifts.rs` runs them inside the transaction that
//! performs the write.

use uuid::Uuid;

use wunschbox_types::models::{Gift, GiftState, Role};

use crate::error::{StoreError, StoreResult};

/// A reserved gift is never taken over, whoever asks.
pub fn check_reserve(gift: &Gift) -> StoreResult<()> {
    match gift.state() {
        GiftState::Open => Ok(()),
        GiftState::Reserved => Err(StoreError::AlreadyReserved),
    }
}

/// Parents may release any reservation. Relatives only their own.
pub fn check_release(gift: &Gift, actor_id: Uuid, actor_role: Role) -> StoreResult<()> {
    if gift.state() == GiftState::Open {
        return Err(StoreError::NotReserved);
    }
    match actor_role {
        Role::Parent => Ok(()),
        Role::Relative if gift.gifted_by_user_id == Some(actor_id) => Ok(()),
        Role::Relative => Err(StoreError::Forbidden),
    }
}

/// In-app message sent to parents when someone reserves a gift.
pub fn reservation_message(reserver_name: &str, gift: &Gift) -> String {
    format!("{} schenkt \"{}\" an {}", reserver_name, gift.title, gift.child_name)
}
