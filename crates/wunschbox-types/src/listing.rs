use std::cmp::Ordering;

use serde::Deserialize;

use crate::models::{Category, Gift};

/// Display order for gift lists: open gifts before reserved ones, then
/// priority descending, then newest first.
pub fn display_order(a: &Gift, b: &Gift) -> Ordering {
    a.is_gifted
        .cmp(&b.is_gifted)
        .then_with(|| b.priority.weight().cmp(&a.priority.weight()))
        .then_with(|| b.created_at.cmp(&a.created_at))
}

pub fn sort_for_display(gifts: &mut [Gift]) {
    gifts.sort_by(display_order);
}

/// Optional filters of the gift list (`?child=Lina&category=Sport`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GiftFilter {
    pub child: Option<String>,
    pub category: Option<Category>,
}

impl GiftFilter {
    pub fn matches(&self, gift: &Gift) -> bool {
        let child_ok = self.child.as_deref().is_none_or(|c| gift.child_name == c);
        let category_ok = self.category.is_none_or(|c| gift.category == c);
        child_ok && category_ok
    }

    /// Filters and orders in one pass, the way the list endpoint returns them.
    pub fn apply(&self, gifts: Vec<Gift>) -> Vec<Gift> {
        let mut out: Vec<Gift> = gifts.into_iter().filter(|g| self.matches(g)).collect();
        sort_for_display(&mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::models::Priority;

    fn gift(title: &str, priority: Priority, is_gifted: bool, created_at: i64) -> Gift {
        Gift {
            id: Uuid::new_v4(),
            title: title.into(),
            purpose: String::new(),
            price_min: 0.0,
            price_max: 0.0,
            currency: "CHF".into(),
            image_url: String::new(),
            shop_url: String::new(),
            child_name: "Lina".into(),
            priority,
            category: Category::Spielzeug,
            is_gifted,
            gifted_by_user_id: is_gifted.then(Uuid::new_v4),
            gifted_by_user_name: is_gifted.then(|| "Oma".to_string()),
            created_at,
        }
    }

    fn titles(gifts: &[Gift]) -> Vec<&str> {
        gifts.iter().map(|g| g.title.as_str()).collect()
    }

    #[test]
    fn higher_priority_beats_newer() {
        let mut gifts = vec![
            gift("Malset", Priority::Medium, false, 200),
            gift("LEGO", Priority::High, false, 100),
        ];
        sort_for_display(&mut gifts);
        assert_eq!(titles(&gifts), ["LEGO", "Malset"]);
    }

    #[test]
    fn reserved_gifts_sink_below_open_ones() {
        let mut gifts = vec![
            gift("Velo", Priority::High, true, 500),
            gift("Socken", Priority::Low, false, 10),
            gift("Buch", Priority::Low, false, 20),
            gift("Puzzle", Priority::Medium, true, 300),
        ];
        sort_for_display(&mut gifts);
        assert_eq!(titles(&gifts), ["Buch", "Socken", "Velo", "Puzzle"]);
    }

    #[test]
    fn filter_by_child_and_category() {
        let mut other = gift("Trikot", Priority::High, false, 1);
        other.child_name = "Levin".into();
        other.category = Category::Sport;
        let gifts = vec![gift("LEGO", Priority::High, false, 2), other];

        let filter = GiftFilter {
            child: Some("Levin".into()),
            category: None,
        };
        assert_eq!(titles(&filter.apply(gifts.clone())), ["Trikot"]);

        let filter = GiftFilter {
            child: None,
            category: Some(Category::Spielzeug),
        };
        assert_eq!(titles(&filter.apply(gifts)), ["LEGO"]);
    }
}
