use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};
use tracing::info;
use uuid::Uuid;

use wunschbox_types::api::{CreateGiftRequest, UpdateGiftRequest};
use wunschbox_types::listing::GiftFilter;
use wunschbox_types::models::{Category, Gift, Priority, Role};

use crate::error::{StoreError, StoreResult, require_text};
use crate::models::{GIFT_COLUMNS, gift_row};
use crate::notifications::insert_notification;
use crate::reservation::{check_release, check_reserve, reservation_message};
use crate::{Database, now_millis};

const DEFAULT_TITLE: &str = "Unbenannt";
const DEFAULT_CURRENCY: &str = "CHF";

impl Database {
    pub fn create_gift(&self, req: &CreateGiftRequest) -> StoreResult<Gift> {
        let gift = Gift {
            id: Uuid::new_v4(),
            title: req
                .title
                .clone()
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            purpose: req.purpose.clone().unwrap_or_default(),
            price_min: req.price_min.unwrap_or(0.0),
            price_max: req.price_max.unwrap_or(0.0),
            currency: req
                .currency
                .clone()
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            image_url: req.image_url.clone().unwrap_or_default(),
            shop_url: req.shop_url.clone().unwrap_or_default(),
            child_name: req.child_name.trim().to_string(),
            priority: req.priority.unwrap_or(Priority::Medium),
            category: req.category.unwrap_or(Category::Spielzeug),
            is_gifted: false,
            gifted_by_user_id: None,
            gifted_by_user_name: None,
            created_at: now_millis(),
        };
        validate_content(&gift)?;

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO gifts (id, title, purpose, price_min, price_max, currency, image_url, shop_url,
                                    child_name, priority, category, is_gifted, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, 0, ?12)",
                params![
                    gift.id.to_string(),
                    gift.title,
                    gift.purpose,
                    gift.price_min,
                    gift.price_max,
                    gift.currency,
                    gift.image_url,
                    gift.shop_url,
                    gift.child_name,
                    gift.priority.as_str(),
                    gift.category.as_str(),
                    gift.created_at,
                ],
            )?;
            Ok(())
        })?;

        info!("Gift {} created for {}", gift.id, gift.child_name);
        Ok(gift)
    }

    pub fn get_gift(&self, id: Uuid) -> StoreResult<Gift> {
        self.with_conn(|conn| query_gift(conn, id)?.ok_or(StoreError::NotFound))
    }

    /// Filtered gifts in display order.
    pub fn list_gifts(&self, filter: &GiftFilter) -> StoreResult<Vec<Gift>> {
        let gifts = self.with_conn(|conn| {
            let sql = format!("SELECT {} FROM gifts", GIFT_COLUMNS);
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], gift_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })?;

        Ok(filter.apply(gifts))
    }

    /// OPEN -> RESERVED for the acting user, plus one notification for the
    /// parents, committed together.
    pub fn reserve_gift(&self, gift_id: Uuid, user_id: Uuid, user_name: &str) -> StoreResult<Gift> {
        require_text("user name", user_name)?;

        self.with_conn_mut(|conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let mut gift = query_gift(&tx, gift_id)?.ok_or(StoreError::NotFound)?;
            check_reserve(&gift)?;

            let changed = tx.execute(
                "UPDATE gifts SET is_gifted = 1, gifted_by_user_id = ?2, gifted_by_user_name = ?3
                 WHERE id = ?1 AND is_gifted = 0",
                params![gift_id.to_string(), user_id.to_string(), user_name],
            )?;
            if changed == 0 {
                return Err(StoreError::AlreadyReserved);
            }

            gift.is_gifted = true;
            gift.gifted_by_user_id = Some(user_id);
            gift.gifted_by_user_name = Some(user_name.to_string());

            insert_notification(&tx, &reservation_message(user_name, &gift), Role::Parent)?;
            tx.commit()?;

            info!("Gift {} reserved by {}", gift_id, user_id);
            Ok(gift)
        })
    }

    /// RESERVED -> OPEN. Relatives may only undo their own reservation.
    pub fn release_gift(&self, gift_id: Uuid, actor_id: Uuid, actor_role: Role) -> StoreResult<Gift> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let mut gift = query_gift(&tx, gift_id)?.ok_or(StoreError::NotFound)?;
            check_release(&gift, actor_id, actor_role)?;

            let changed = tx.execute(
                "UPDATE gifts SET is_gifted = 0, gifted_by_user_id = NULL, gifted_by_user_name = NULL
                 WHERE id = ?1 AND is_gifted = 1",
                [gift_id.to_string()],
            )?;
            if changed == 0 {
                return Err(StoreError::NotReserved);
            }
            tx.commit()?;

            gift.is_gifted = false;
            gift.gifted_by_user_id = None;
            gift.gifted_by_user_name = None;

            info!("Gift {} released by {} ({})", gift_id, actor_id, actor_role);
            Ok(gift)
        })
    }

    /// Parent records a gift given by someone without an account. Never
    /// overrides an existing reservation and sends no notification.
    pub fn mark_gift_by_proxy(&self, gift_id: Uuid, proxy_name: &str, parent_id: Uuid) -> StoreResult<Gift> {
        let proxy_name = proxy_name.trim();
        require_text("proxy name", proxy_name)?;

        self.with_conn_mut(|conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let mut gift = query_gift(&tx, gift_id)?.ok_or(StoreError::NotFound)?;
            check_reserve(&gift)?;

            let changed = tx.execute(
                "UPDATE gifts SET is_gifted = 1, gifted_by_user_id = ?2, gifted_by_user_name = ?3
                 WHERE id = ?1 AND is_gifted = 0",
                params![gift_id.to_string(), parent_id.to_string(), proxy_name],
            )?;
            if changed == 0 {
                return Err(StoreError::AlreadyReserved);
            }
            tx.commit()?;

            gift.is_gifted = true;
            gift.gifted_by_user_id = Some(parent_id);
            gift.gifted_by_user_name = Some(proxy_name.to_string());

            info!("Gift {} marked for {} by {}", gift_id, proxy_name, parent_id);
            Ok(gift)
        })
    }

    /// Replaces content fields. Id, creation time and reservation are not
    /// columns of this UPDATE, so an edit cannot clear a reservation.
    pub fn update_gift(&self, gift_id: Uuid, patch: &UpdateGiftRequest) -> StoreResult<Gift> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let mut gift = query_gift(&tx, gift_id)?.ok_or(StoreError::NotFound)?;
            apply_patch(&mut gift, patch);
            validate_content(&gift)?;

            tx.execute(
                "UPDATE gifts SET title = ?2, purpose = ?3, price_min = ?4, price_max = ?5, currency = ?6,
                                  image_url = ?7, shop_url = ?8, child_name = ?9, priority = ?10, category = ?11
                 WHERE id = ?1",
                params![
                    gift_id.to_string(),
                    gift.title,
                    gift.purpose,
                    gift.price_min,
                    gift.price_max,
                    gift.currency,
                    gift.image_url,
                    gift.shop_url,
                    gift.child_name,
                    gift.priority.as_str(),
                    gift.category.as_str(),
                ],
            )?;
            tx.commit()?;

            Ok(gift)
        })
    }

    pub fn delete_gift(&self, gift_id: Uuid) -> StoreResult<()> {
        self.with_conn(|conn| {
            let deleted = conn.execute("DELETE FROM gifts WHERE id = ?1", [gift_id.to_string()])?;
            if deleted == 0 {
                return Err(StoreError::NotFound);
            }
            info!("Gift {} deleted", gift_id);
            Ok(())
        })
    }
}

pub(crate) fn query_gift(conn: &Connection, id: Uuid) -> StoreResult<Option<Gift>> {
    let sql = format!("SELECT {} FROM gifts WHERE id = ?1", GIFT_COLUMNS);
    let gift = conn
        .query_row(&sql, [id.to_string()], gift_row)
        .optional()?;
    Ok(gift)
}

fn apply_patch(gift: &mut Gift, patch: &UpdateGiftRequest) {
    if let Some(v) = &patch.title {
        gift.title = v.clone();
    }
    if let Some(v) = &patch.purpose {
        gift.purpose = v.clone();
    }
    if let Some(v) = patch.price_min {
        gift.price_min = v;
    }
    if let Some(v) = patch.price_max {
        gift.price_max = v;
    }
    if let Some(v) = &patch.currency {
        gift.currency = v.clone();
    }
    if let Some(v) = &patch.image_url {
        gift.image_url = v.clone();
    }
    if let Some(v) = &patch.shop_url {
        gift.shop_url = v.clone();
    }
    if let Some(v) = &patch.child_name {
        gift.child_name = v.trim().to_string();
    }
    if let Some(v) = patch.priority {
        gift.priority = v;
    }
    if let Some(v) = patch.category {
        gift.category = v;
    }
}

fn validate_content(gift: &Gift) -> StoreResult<()> {
    require_text("title", &gift.title)?;
    require_text("childName", &gift.child_name)?;
    require_text("currency", &gift.currency)?;
    if !gift.price_min.is_finite() || !gift.price_max.is_finite() {
        return Err(StoreError::Invalid("prices must be finite numbers".into()));
    }
    if gift.price_min < 0.0 || gift.price_min > gift.price_max {
        return Err(StoreError::Invalid(
            "priceMin must be between 0 and priceMax".into(),
        ));
    }
    Ok(())
}
